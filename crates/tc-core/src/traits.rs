//! Core traits shared by the domain crates

use chrono::{DateTime, Utc};

/// Primary key type
pub type Id = i64;

/// Trait for entities that have a primary key
pub trait Identifiable {
    fn id(&self) -> Option<Id>;
    fn is_persisted(&self) -> bool {
        self.id().is_some()
    }
    fn is_new_record(&self) -> bool {
        !self.is_persisted()
    }
}

/// Trait for entities with timestamps (created_at, updated_at)
pub trait Timestamped {
    fn created_at(&self) -> Option<DateTime<Utc>>;
    fn updated_at(&self) -> Option<DateTime<Utc>>;
}

/// Trait for soft-deletable entities
pub trait SoftDeletable {
    fn deleted_at(&self) -> Option<DateTime<Utc>>;
    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}

/// Trait for entities that track who created/updated them
pub trait Auditable {
    fn created_by_id(&self) -> Option<Id>;
    fn updated_by_id(&self) -> Option<Id>;
}

/// Base trait for all domain entities
pub trait Entity: Identifiable + Timestamped + Send + Sync {
    /// The database table name
    const TABLE_NAME: &'static str;

    /// Human-readable type name for error messages
    const TYPE_NAME: &'static str;
}

/// Caller context for permission checks
///
/// The hosting layer resolves the session user into this; the core only ever
/// asks these questions.
pub trait UserContext: Send + Sync {
    fn id(&self) -> Id;
    fn is_admin(&self) -> bool;
    fn department_id(&self) -> Option<Id>;
    /// Whether the user holds a top-leadership position (required for the
    /// directing role on assignments).
    fn holds_top_leadership_role(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub {
        id: Option<Id>,
    }

    impl Identifiable for Stub {
        fn id(&self) -> Option<Id> {
            self.id
        }
    }

    #[test]
    fn test_persistence_flags() {
        assert!(Stub { id: Some(1) }.is_persisted());
        assert!(Stub { id: None }.is_new_record());
    }
}
