//! Persistence seams for the scheduler.
//!
//! The scheduler only ever talks to `LeaveStore` and `EmployeeDirectory`,
//! both handed to it as `Arc<dyn ...>` so the MySQL backend and the
//! in-memory backend are interchangeable.

pub mod memory;
pub mod mysql;
pub mod name_cache;

use async_trait::async_trait;
use derive_more::Display;

use crate::model::employee::{Employee, NewEmployee};
use crate::model::leave::{LeaveRecord, ValidatedLeave};

#[derive(Debug, Display)]
pub enum StoreError {
    #[display(fmt = "database error: {}", _0)]
    Database(sqlx::Error),

    #[display(fmt = "migration failed: {}", _0)]
    Migrate(sqlx::migrate::MigrateError),

    /// A write was refused by an integrity rule (e.g. dangling employee id).
    #[display(fmt = "constraint violation: {}", _0)]
    Constraint(String),

    /// A stored row could not be mapped back to the domain model.
    #[display(fmt = "corrupt row: {}", _0)]
    Corrupt(String),

    #[display(fmt = "in-memory store lock poisoned")]
    Poisoned,
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Database(e) => Some(e),
            StoreError::Migrate(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Migrate(err)
    }
}

/// CRUD primitives over leave records.
///
/// `update` and `delete` report a missing id as `Ok(false)`; the scheduler
/// turns that into `NotFound`.
#[async_trait]
pub trait LeaveStore: Send + Sync {
    /// Persist a new record and return the freshly assigned id.
    async fn insert(&self, leave: &ValidatedLeave) -> Result<u64, StoreError>;

    async fn update(&self, id: u64, leave: &ValidatedLeave) -> Result<bool, StoreError>;

    async fn delete(&self, id: u64) -> Result<bool, StoreError>;

    async fn find_by_id(&self, id: u64) -> Result<Option<LeaveRecord>, StoreError>;

    async fn find_all_by_employee(&self, employee_id: u64) -> Result<Vec<LeaveRecord>, StoreError>;

    /// All records in id order.
    async fn find_all(&self) -> Result<Vec<LeaveRecord>, StoreError>;

    /// Up to `limit` records in id order starting at `offset`, optionally
    /// only one employee's, plus the total count of matching records.
    async fn find_page(
        &self,
        employee_id: Option<u64>,
        limit: u32,
        offset: u64,
    ) -> Result<(Vec<LeaveRecord>, u64), StoreError>;
}

/// Employee identity owner.
///
/// `resolve_id` does exact matching on the display name. When two employees
/// share a name the lowest id wins; this is a known limitation of name-based
/// lookup.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Display names in id (insertion) order.
    async fn list_names(&self) -> Result<Vec<String>, StoreError>;

    /// `Ok(None)` when no employee carries that display name.
    async fn resolve_id(&self, name: &str) -> Result<Option<u64>, StoreError>;

    async fn list(&self) -> Result<Vec<Employee>, StoreError>;

    async fn get(&self, id: u64) -> Result<Option<Employee>, StoreError>;

    async fn create(&self, employee: &NewEmployee) -> Result<Employee, StoreError>;

    /// `Ok(None)` when the id does not exist.
    async fn update(&self, id: u64, employee: &NewEmployee) -> Result<Option<Employee>, StoreError>;

    /// Removes the employee together with all of their leave records.
    async fn delete(&self, id: u64) -> Result<bool, StoreError>;
}
