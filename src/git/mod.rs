//! Git operations: read-only queries and history mutation.

pub mod extract;
pub mod mutator;
pub mod repository;

pub use extract::extract_context;
pub use mutator::GitMutator;
pub use repository::GitRepository;

/// Number of hex characters to show in abbreviated commit hashes.
pub const SHORT_HASH_LEN: usize = 8;
