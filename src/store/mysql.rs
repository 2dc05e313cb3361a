use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, MySqlPool};

use super::name_cache::NameCache;
use super::{EmployeeDirectory, LeaveStore, StoreError};
use crate::model::employee::{Employee, NewEmployee};
use crate::model::leave::{DateSpan, LeaveRecord, LeaveType, ValidatedLeave};

/// MySQL integrity-constraint SQLSTATE (FK, unique).
const SQLSTATE_CONSTRAINT: &str = "23000";

fn write_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some(SQLSTATE_CONSTRAINT) {
            return StoreError::Constraint(db_err.message().to_string());
        }
    }
    StoreError::Database(e)
}

#[derive(FromRow)]
struct LeaveRow {
    id: u64,
    employee_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    leave_type: String,
}

impl TryFrom<LeaveRow> for LeaveRecord {
    type Error = StoreError;

    fn try_from(row: LeaveRow) -> Result<Self, Self::Error> {
        let span = DateSpan::new(row.start_date, row.end_date).ok_or_else(|| {
            StoreError::Corrupt(format!("holiday {} has an empty date range", row.id))
        })?;
        let leave_type = row.leave_type.parse::<LeaveType>().map_err(|_| {
            StoreError::Corrupt(format!(
                "holiday {} has unknown type '{}'",
                row.id, row.leave_type
            ))
        })?;

        Ok(LeaveRecord {
            id: row.id,
            employee_id: row.employee_id,
            span,
            leave_type,
        })
    }
}

fn into_records(rows: Vec<LeaveRow>) -> Result<Vec<LeaveRecord>, StoreError> {
    rows.into_iter().map(LeaveRecord::try_from).collect()
}

pub struct MySqlLeaveStore {
    pool: MySqlPool,
}

impl MySqlLeaveStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaveStore for MySqlLeaveStore {
    async fn insert(&self, leave: &ValidatedLeave) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO holidays (employee_id, start_date, end_date, leave_type)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(leave.employee_id)
        .bind(leave.span.start)
        .bind(leave.span.end)
        .bind(leave.leave_type.to_string())
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        Ok(result.last_insert_id())
    }

    async fn update(&self, id: u64, leave: &ValidatedLeave) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE holidays
            SET employee_id = ?, start_date = ?, end_date = ?, leave_type = ?
            WHERE id = ?
            "#,
        )
        .bind(leave.employee_id)
        .bind(leave.span.start)
        .bind(leave.span.end)
        .bind(leave.leave_type.to_string())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        if result.rows_affected() > 0 {
            return Ok(true);
        }

        // MySQL reports 0 affected rows when nothing changed, so check existence
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM holidays WHERE id = ? LIMIT 1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists > 0)
    }

    async fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM holidays WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<LeaveRecord>, StoreError> {
        let row = sqlx::query_as::<_, LeaveRow>(
            r#"
            SELECT id, employee_id, start_date, end_date, leave_type
            FROM holidays
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(LeaveRecord::try_from).transpose()
    }

    async fn find_all_by_employee(&self, employee_id: u64) -> Result<Vec<LeaveRecord>, StoreError> {
        let rows = sqlx::query_as::<_, LeaveRow>(
            r#"
            SELECT id, employee_id, start_date, end_date, leave_type
            FROM holidays
            WHERE employee_id = ?
            ORDER BY start_date, id
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    async fn find_all(&self) -> Result<Vec<LeaveRecord>, StoreError> {
        let rows = sqlx::query_as::<_, LeaveRow>(
            r#"
            SELECT id, employee_id, start_date, end_date, leave_type
            FROM holidays
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    async fn find_page(
        &self,
        employee_id: Option<u64>,
        limit: u32,
        offset: u64,
    ) -> Result<(Vec<LeaveRecord>, u64), StoreError> {
        let where_sql = if employee_id.is_some() {
            " WHERE employee_id = ?"
        } else {
            ""
        };

        // COUNT query
        let count_sql = format!("SELECT COUNT(*) FROM holidays{}", where_sql);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(id) = employee_id {
            count_query = count_query.bind(id);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        // DATA query
        let data_sql = format!(
            r#"
            SELECT id, employee_id, start_date, end_date, leave_type
            FROM holidays{}
            ORDER BY id
            LIMIT ? OFFSET ?
            "#,
            where_sql
        );
        let mut data_query = sqlx::query_as::<_, LeaveRow>(&data_sql);
        if let Some(id) = employee_id {
            data_query = data_query.bind(id);
        }
        let rows = data_query
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((into_records(rows)?, total.max(0) as u64))
    }
}

/// Employee table access with a name -> id cache in front of `resolve_id`.
///
/// Only hits are cached; every employee mutation made through this directory
/// clears the cache, and a lookup that raced such a mutation is not cached.
pub struct MySqlEmployeeDirectory {
    pool: MySqlPool,
    names: Option<NameCache>,
}

impl MySqlEmployeeDirectory {
    /// A zero `cache_ttl` disables the name cache.
    pub fn new(pool: MySqlPool, cache_ttl: Duration) -> Self {
        let names = (!cache_ttl.is_zero()).then(|| NameCache::new(cache_ttl));
        Self { pool, names }
    }

    fn invalidate_names(&self) {
        if let Some(names) = &self.names {
            names.clear();
        }
    }
}

#[async_trait]
impl EmployeeDirectory for MySqlEmployeeDirectory {
    async fn list_names(&self) -> Result<Vec<String>, StoreError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT CONCAT(first_name, ' ', last_name) FROM employees ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    async fn resolve_id(&self, name: &str) -> Result<Option<u64>, StoreError> {
        let mut ticket = None;
        if let Some(names) = &self.names {
            if let Some(id) = names.get(name).await {
                return Ok(Some(id));
            }
            ticket = Some(names.ticket());
        }

        let id = sqlx::query_scalar::<_, u64>(
            r#"
            SELECT id
            FROM employees
            WHERE CAST(CONCAT(first_name, ' ', last_name) AS BINARY) = CAST(? AS BINARY)
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        if let (Some(names), Some(ticket), Some(id)) = (&self.names, ticket, id) {
            names.store(ticket, name, id).await;
        }

        Ok(id)
    }

    async fn list(&self) -> Result<Vec<Employee>, StoreError> {
        let employees = sqlx::query_as::<_, Employee>(
            "SELECT id, first_name, last_name, email, phone FROM employees ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    async fn get(&self, id: u64) -> Result<Option<Employee>, StoreError> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT id, first_name, last_name, email, phone FROM employees WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    async fn create(&self, employee: &NewEmployee) -> Result<Employee, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO employees (first_name, last_name, email, phone)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.email)
        .bind(&employee.phone)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        self.invalidate_names();

        Ok(Employee {
            id: result.last_insert_id(),
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            email: employee.email.clone(),
            phone: employee.phone.clone(),
        })
    }

    async fn update(&self, id: u64, employee: &NewEmployee) -> Result<Option<Employee>, StoreError> {
        sqlx::query(
            r#"
            UPDATE employees
            SET first_name = ?, last_name = ?, email = ?, phone = ?
            WHERE id = ?
            "#,
        )
        .bind(&employee.first_name)
        .bind(&employee.last_name)
        .bind(&employee.email)
        .bind(&employee.phone)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(write_error)?;

        self.invalidate_names();

        self.get(id).await
    }

    async fn delete(&self, id: u64) -> Result<bool, StoreError> {
        // holidays rows go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.invalidate_names();

        Ok(result.rows_affected() > 0)
    }
}
