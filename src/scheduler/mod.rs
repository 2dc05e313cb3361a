//! Holiday scheduling core.
//!
//! A leave request moves `LeaveCandidate` (proposed) -> `ValidatedLeave`
//! -> `LeaveRecord` (committed). Any failure on the way rejects the request
//! before the store is touched.

mod conflict;
pub mod locks;


use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::error::HrmError;
use crate::model::leave::{DateSpan, LeaveCandidate, LeaveRecord, LeaveType, LeaveView, ValidatedLeave};
use crate::store::{EmployeeDirectory, LeaveStore, StoreError};
use conflict::{check_no_conflict, first_overlap, parse_span};
use locks::EmployeeLocks;

fn store_failure(op: &'static str) -> impl FnOnce(StoreError) -> HrmError {
    move |e| {
        error!(error = %e, op, "Store call failed");
        HrmError::Store(e)
    }
}

pub struct HolidayScheduler {
    leaves: Arc<dyn LeaveStore>,
    directory: Arc<dyn EmployeeDirectory>,
    locks: EmployeeLocks,
}

impl HolidayScheduler {
    pub fn new(leaves: Arc<dyn LeaveStore>, directory: Arc<dyn EmployeeDirectory>) -> Self {
        Self {
            leaves,
            directory,
            locks: EmployeeLocks::new(),
        }
    }

    /// Checks a candidate in order: employee, date format, date order, type.
    pub async fn validate(&self, candidate: &LeaveCandidate) -> Result<ValidatedLeave, HrmError> {
        let employee_id = self
            .directory
            .resolve_id(&candidate.employee_name)
            .await
            .map_err(store_failure("resolve_employee"))?
            .ok_or_else(|| HrmError::UnknownEmployee {
                name: candidate.employee_name.clone(),
            })?;

        let span = parse_span(&candidate.start_date, &candidate.end_date)?;

        let leave_type = candidate
            .leave_type
            .parse::<LeaveType>()
            .map_err(|_| HrmError::InvalidType {
                value: candidate.leave_type.clone(),
            })?;

        Ok(ValidatedLeave {
            employee_id,
            span,
            leave_type,
        })
    }

    /// True if any committed record of the employee, other than `exclude`,
    /// intersects `span`.
    pub async fn has_conflict(
        &self,
        employee_id: u64,
        span: &DateSpan,
        exclude: Option<u64>,
    ) -> Result<bool, HrmError> {
        let existing = self.employee_leaves(employee_id).await?;
        Ok(first_overlap(&existing, span, exclude).is_some())
    }

    async fn employee_leaves(&self, employee_id: u64) -> Result<Vec<LeaveRecord>, HrmError> {
        self.leaves
            .find_all_by_employee(employee_id)
            .await
            .map_err(store_failure("find_all_by_employee"))
    }

    async fn ensure_free(
        &self,
        leave: &ValidatedLeave,
        exclude: Option<u64>,
    ) -> Result<(), HrmError> {
        let existing = self.employee_leaves(leave.employee_id).await?;
        check_no_conflict(&existing, &leave.span, exclude).inspect_err(|e| {
            warn!(
                employee_id = leave.employee_id,
                start = %leave.span.start,
                end = %leave.span.end,
                reason = %e,
                "Leave rejected"
            );
        })
    }

    /// Re-checks under the employee lock that the resolved employee still
    /// exists; it may have been removed since `validate` looked it up.
    async fn ensure_employee(&self, leave: &ValidatedLeave, name: &str) -> Result<(), HrmError> {
        let exists = self
            .directory
            .get(leave.employee_id)
            .await
            .map_err(store_failure("get_employee"))?
            .is_some();
        if !exists {
            warn!(employee_id = leave.employee_id, "Employee removed during validation");
            return Err(HrmError::UnknownEmployee {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    pub async fn add(&self, candidate: &LeaveCandidate) -> Result<LeaveRecord, HrmError> {
        let leave = self.validate(candidate).await?;

        let _guard = self.locks.acquire(&[leave.employee_id]).await;
        self.ensure_employee(&leave, &candidate.employee_name).await?;
        self.ensure_free(&leave, None).await?;

        let id = self
            .leaves
            .insert(&leave)
            .await
            .map_err(store_failure("insert"))?;

        info!(leave_id = id, employee_id = leave.employee_id, "Leave committed");
        Ok(LeaveRecord::from_validated(id, leave))
    }

    /// Replaces every field of record `id` except the id itself. The record's
    /// own previous span is ignored by the conflict check.
    pub async fn modify(&self, id: u64, candidate: &LeaveCandidate) -> Result<LeaveRecord, HrmError> {
        let existing = self
            .leaves
            .find_by_id(id)
            .await
            .map_err(store_failure("find_by_id"))?
            .ok_or(HrmError::NotFound { id })?;

        let leave = self.validate(candidate).await?;

        let _guard = self
            .locks
            .acquire(&[existing.employee_id, leave.employee_id])
            .await;
        self.ensure_employee(&leave, &candidate.employee_name).await?;
        self.ensure_free(&leave, Some(id)).await?;

        let updated = self
            .leaves
            .update(id, &leave)
            .await
            .map_err(store_failure("update"))?;
        if !updated {
            // deleted while we were validating
            return Err(HrmError::NotFound { id });
        }

        info!(leave_id = id, employee_id = leave.employee_id, "Leave modified");
        Ok(LeaveRecord::from_validated(id, leave))
    }

    pub async fn delete(&self, id: u64) -> Result<(), HrmError> {
        let removed = self
            .leaves
            .delete(id)
            .await
            .map_err(store_failure("delete"))?;
        if !removed {
            return Err(HrmError::NotFound { id });
        }

        info!(leave_id = id, "Leave deleted");
        Ok(())
    }

    pub async fn get(&self, id: u64) -> Result<LeaveView, HrmError> {
        let record = self
            .leaves
            .find_by_id(id)
            .await
            .map_err(store_failure("find_by_id"))?
            .ok_or(HrmError::NotFound { id })?;

        let name = self
            .directory
            .get(record.employee_id)
            .await
            .map_err(store_failure("get_employee"))?
            .map(|e| e.display_name());

        Ok(LeaveView::new(&record, name))
    }

    /// Every committed record in id order, joined with employee names.
    pub async fn list(&self) -> Result<Vec<LeaveView>, HrmError> {
        let (records, employees) =
            futures::try_join!(self.leaves.find_all(), self.directory.list())
                .map_err(store_failure("list"))?;

        let names: HashMap<u64, String> = employees
            .into_iter()
            .map(|e| (e.id, e.display_name()))
            .collect();

        debug!(count = records.len(), "Listing leave records");
        Ok(records
            .iter()
            .map(|r| LeaveView::new(r, names.get(&r.employee_id).cloned()))
            .collect())
    }

    /// One page of records in id order, optionally for a single employee,
    /// plus the total number of matching records.
    pub async fn list_page(
        &self,
        employee_id: Option<u64>,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<LeaveView>, u64), HrmError> {
        let offset = u64::from(page.saturating_sub(1)) * u64::from(per_page);
        let (records, total) = self
            .leaves
            .find_page(employee_id, per_page, offset)
            .await
            .map_err(store_failure("find_page"))?;

        let mut names: HashMap<u64, Option<String>> = HashMap::new();
        for record in &records {
            if !names.contains_key(&record.employee_id) {
                let name = self
                    .directory
                    .get(record.employee_id)
                    .await
                    .map_err(store_failure("get_employee"))?
                    .map(|e| e.display_name());
                names.insert(record.employee_id, name);
            }
        }

        let views = records
            .iter()
            .map(|r| LeaveView::new(r, names.get(&r.employee_id).cloned().flatten()))
            .collect();
        Ok((views, total))
    }

    /// Deletes an employee and, through the store, all of their leave.
    ///
    /// Holds the employee's lock so no add or modify for them interleaves.
    pub async fn remove_employee(&self, employee_id: u64) -> Result<(), HrmError> {
        let guard = self.locks.acquire(&[employee_id]).await;
        let removed = self
            .directory
            .delete(employee_id)
            .await
            .map_err(store_failure("delete_employee"))?;
        drop(guard);

        if !removed {
            return Err(HrmError::NotFound { id: employee_id });
        }

        self.locks.forget(employee_id);
        info!(employee_id, "Employee removed with their leave records");
        Ok(())
    }
}
