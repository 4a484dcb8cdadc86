//! User and department models
//!
//! Tables: users, departments
//!
//! Staff records exist here to support per-department KPI grouping and the
//! Director-role eligibility check; account administration screens live
//! outside this core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tc_core::traits::{Entity, Id, Identifiable, Timestamped};
use validator::Validate;

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Option<Id>,

    /// Full display name
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// Login name (unique)
    #[validate(length(min = 1, max = 255))]
    pub login: String,

    pub department_id: Option<Id>,

    /// Whether user is admin
    #[serde(default)]
    pub admin: bool,

    /// Top-leadership position; gates the directing assignment role
    #[serde(default)]
    pub top_leadership: bool,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for User {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            login: String::new(),
            department_id: None,
            admin: false,
            top_leadership: false,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Identifiable for User {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for User {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for User {
    const TABLE_NAME: &'static str = "users";
    const TYPE_NAME: &'static str = "User";
}

impl User {
    pub fn new(name: impl Into<String>, login: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            login: login.into(),
            ..Default::default()
        }
    }
}

/// Department entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Option<Id>,

    #[validate(length(min = 1, max = 255))]
    pub name: String,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Identifiable for Department {
    fn id(&self) -> Option<Id> {
        self.id
    }
}

impl Timestamped for Department {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Entity for Department {
    const TABLE_NAME: &'static str = "departments";
    const TYPE_NAME: &'static str = "Department";
}

impl Department {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_defaults() {
        let user = User::new("Nguyễn Văn An", "nva");
        assert!(!user.admin);
        assert!(!user.top_leadership);
        assert_eq!(user.department_id, None);
    }
}
