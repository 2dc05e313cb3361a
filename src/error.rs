use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::NaiveDate;
use derive_more::Display;
use serde_json::json;

use crate::store::StoreError;

/// Every way a leave or employee operation can be rejected.
///
/// Validation kinds are produced before any store mutation, so a rejected
/// operation never leaves partial state behind.
#[derive(Debug, Display)]
pub enum HrmError {
    #[display(fmt = "unknown employee: {}", name)]
    UnknownEmployee { name: String },

    #[display(fmt = "invalid date '{}': expected YYYY-MM-DD", value)]
    InvalidDateFormat { value: String },

    #[display(fmt = "end date {} must be after start date {}", end, start)]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[display(fmt = "invalid leave type '{}': expected PAID, SICK or UNPAID", value)]
    InvalidType { value: String },

    #[display(
        fmt = "employee already has leave #{} from {} to {}",
        id,
        start,
        end
    )]
    OverlapConflict {
        id: u64,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[display(fmt = "record not found: {}", id)]
    NotFound { id: u64 },

    #[display(fmt = "invalid employee: {}", reason)]
    InvalidEmployee { reason: &'static str },

    #[display(fmt = "store error: {}", _0)]
    Store(StoreError),
}

impl std::error::Error for HrmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HrmError::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for HrmError {
    fn from(err: StoreError) -> Self {
        HrmError::Store(err)
    }
}

impl HrmError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            HrmError::UnknownEmployee { .. } => "UnknownEmployee",
            HrmError::InvalidDateFormat { .. } => "InvalidDateFormat",
            HrmError::InvalidDateRange { .. } => "InvalidDateRange",
            HrmError::InvalidType { .. } => "InvalidType",
            HrmError::OverlapConflict { .. } => "OverlapConflict",
            HrmError::NotFound { .. } => "NotFound",
            HrmError::InvalidEmployee { .. } => "InvalidEmployee",
            HrmError::Store(_) => "StoreError",
        }
    }
}

impl ResponseError for HrmError {
    fn status_code(&self) -> StatusCode {
        match self {
            HrmError::UnknownEmployee { .. }
            | HrmError::InvalidDateFormat { .. }
            | HrmError::InvalidDateRange { .. }
            | HrmError::InvalidType { .. }
            | HrmError::InvalidEmployee { .. } => StatusCode::BAD_REQUEST,
            HrmError::OverlapConflict { .. } => StatusCode::CONFLICT,
            HrmError::NotFound { .. } => StatusCode::NOT_FOUND,
            HrmError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            HrmError::OverlapConflict { id, start, end } => json!({
                "error": self.kind(),
                "message": self.to_string(),
                "conflict": {
                    "id": id,
                    "start_date": start,
                    "end_date": end,
                }
            }),
            // store details are logged where they happen, never sent to clients
            HrmError::Store(_) => json!({
                "error": self.kind(),
                "message": "Internal Server Error",
            }),
            _ => json!({
                "error": self.kind(),
                "message": self.to_string(),
            }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    fn body_json(err: &HrmError) -> serde_json::Value {
        let bytes = err.error_response().into_body().try_into_bytes().unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn validation_errors_map_to_bad_request() {
        let err = HrmError::InvalidType {
            value: "HOLIDAY".into(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(&err)["error"], "InvalidType");
    }

    #[test]
    fn conflict_body_names_the_conflicting_record() {
        let err = HrmError::OverlapConflict {
            id: 12,
            start: date("2024-01-01"),
            end: date("2024-01-10"),
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let body = body_json(&err);
        assert_eq!(body["conflict"]["id"], 12);
        assert_eq!(body["conflict"]["start_date"], "2024-01-01");
        assert_eq!(body["conflict"]["end_date"], "2024-01-10");
        assert_eq!(
            body["message"],
            "employee already has leave #12 from 2024-01-01 to 2024-01-10"
        );
    }

    #[test]
    fn store_errors_hide_details() {
        let err = HrmError::from(StoreError::Poisoned);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(&err)["message"], "Internal Server Error");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = HrmError::NotFound { id: 99 };
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "record not found: 99");
    }
}
