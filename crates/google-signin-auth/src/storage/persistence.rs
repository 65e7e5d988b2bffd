//! Unit-of-work boundary.

use async_trait::async_trait;

use crate::AuthResult;

/// Flushes pending repository writes.
///
/// Backends that stage writes (e.g. inside a database transaction) commit
/// them here, all at once. Backends that write through may treat this as a
/// no-op.
#[async_trait]
pub trait PersistenceManager: Send + Sync {
    /// Persists all pending changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the changes could not be committed.
    async fn persist_all(&self) -> AuthResult<()>;
}
