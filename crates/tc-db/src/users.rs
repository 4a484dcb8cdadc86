//! User and department repository
//!
//! Read side of the staff directory; account administration lives in the
//! (external) admin screens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tc_core::result::TcResult;
use tc_core::traits::Id;
use tc_models::{Department, User};
use tc_services::UserDirectory;

use crate::repository::RepositoryResult;

const USER_COLUMNS: &str =
    "id, name, login, department_id, admin, top_leadership, created_at, updated_at";

/// User database row
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub login: String,
    pub department_id: Option<i64>,
    pub admin: bool,
    pub top_leadership: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub fn into_user(self) -> User {
        User {
            id: Some(self.id),
            name: self.name,
            login: self.login,
            department_id: self.department_id,
            admin: self.admin,
            top_leadership: self.top_leadership,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}

/// Department database row
#[derive(Debug, Clone, FromRow)]
pub struct DepartmentRow {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DepartmentRow {
    pub fn into_department(self) -> Department {
        Department {
            id: Some(self.id),
            name: self.name,
            created_at: Some(self.created_at),
            updated_at: Some(self.updated_at),
        }
    }
}

/// User repository implementation
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Id) -> RepositoryResult<Option<UserRow>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn find_all(&self) -> RepositoryResult<Vec<UserRow>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY name ASC, id ASC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_all_departments(&self) -> RepositoryResult<Vec<DepartmentRow>> {
        let rows = sqlx::query_as::<_, DepartmentRow>(
            "SELECT id, name, created_at, updated_at FROM departments ORDER BY name ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    async fn find_user(&self, id: Id) -> TcResult<Option<User>> {
        Ok(self.find_by_id(id).await?.map(UserRow::into_user))
    }

    async fn users(&self) -> TcResult<Vec<User>> {
        let rows = self.find_all().await?;
        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    async fn departments(&self) -> TcResult<Vec<Department>> {
        let rows = self.find_all_departments().await?;
        Ok(rows
            .into_iter()
            .map(DepartmentRow::into_department)
            .collect())
    }
}
