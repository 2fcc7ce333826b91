pub mod cache;
pub mod passage;

use crate::lookup::LookupError;

/// Produces reading passages. Implementations may block; callers run them off
/// the UI thread.
pub trait PassageSource: Send + Sync {
    fn generate(&self) -> Result<String, LookupError>;
}
