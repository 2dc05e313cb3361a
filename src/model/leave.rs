use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Wire and storage format for leave dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
    ToSchema,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum LeaveType {
    Paid,
    Sick,
    Unpaid,
}

/// Closed date interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    /// Returns `None` unless `end` is strictly after `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (end > start).then_some(Self { start, end })
    }

    /// Touching endpoints count as an overlap.
    pub fn overlaps(&self, other: &DateSpan) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Raw leave request as it arrives from a caller, before any validation.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LeaveCandidate {
    #[schema(example = "John Doe")]
    pub employee_name: String,
    #[schema(example = "2026-01-05")]
    pub start_date: String,
    #[schema(example = "2026-01-09")]
    pub end_date: String,
    #[schema(example = "PAID")]
    pub leave_type: String,
}

/// A candidate that passed validation but has not been persisted yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedLeave {
    pub employee_id: u64,
    pub span: DateSpan,
    pub leave_type: LeaveType,
}

/// A committed leave record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveRecord {
    pub id: u64,
    pub employee_id: u64,
    pub span: DateSpan,
    pub leave_type: LeaveType,
}

impl LeaveRecord {
    pub fn from_validated(id: u64, leave: ValidatedLeave) -> Self {
        Self {
            id,
            employee_id: leave.employee_id,
            span: leave.span,
            leave_type: leave.leave_type,
        }
    }
}

/// Leave record joined with the employee display name, for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 3,
    "employee_name": "John Doe",
    "start_date": "2026-01-05",
    "end_date": "2026-01-09",
    "leave_type": "PAID",
    "days": 5
}))]
pub struct LeaveView {
    pub id: u64,
    pub employee_id: u64,
    /// `None` only if the employee vanished between the two reads of a listing
    pub employee_name: Option<String>,
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
    pub days: i64,
}

impl LeaveView {
    pub fn new(record: &LeaveRecord, employee_name: Option<String>) -> Self {
        Self {
            id: record.id,
            employee_id: record.employee_id,
            employee_name,
            start_date: record.span.start,
            end_date: record.span.end,
            leave_type: record.leave_type,
            days: record.span.days(),
        }
    }
}
