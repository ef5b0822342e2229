/// Unique id generation
///
/// Services never call `Uuid::new_v4()` directly; they receive an
/// [`IdGenerator`] so tests can pin the ids they expect.
use uuid::Uuid;

/// Source of globally unique identifiers
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh identifier
    fn new_id(&self) -> Uuid;
}

/// Random (v4) UUID generator used in production
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn new_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}
