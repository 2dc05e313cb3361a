use chrono::NaiveDate;

use crate::error::HrmError;
use crate::model::leave::{DATE_FORMAT, DateSpan, LeaveRecord};

/// Strict `YYYY-MM-DD`. chrono alone also accepts unpadded, space-padded
/// and signed fields, so the shape is checked byte by byte first.
pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, HrmError> {
    let well_formed = value.len() == 10
        && value.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(HrmError::InvalidDateFormat {
            value: value.to_string(),
        });
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| HrmError::InvalidDateFormat {
        value: value.to_string(),
    })
}

pub(crate) fn parse_span(start: &str, end: &str) -> Result<DateSpan, HrmError> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    DateSpan::new(start, end).ok_or(HrmError::InvalidDateRange { start, end })
}

/// First record in `existing` whose span intersects `span`, skipping `exclude`.
///
/// Linear scan; an employee only has tens of records.
pub(crate) fn first_overlap<'a>(
    existing: &'a [LeaveRecord],
    span: &DateSpan,
    exclude: Option<u64>,
) -> Option<&'a LeaveRecord> {
    existing
        .iter()
        .filter(|r| Some(r.id) != exclude)
        .find(|r| r.span.overlaps(span))
}

pub(crate) fn check_no_conflict(
    existing: &[LeaveRecord],
    span: &DateSpan,
    exclude: Option<u64>,
) -> Result<(), HrmError> {
    match first_overlap(existing, span, exclude) {
        Some(r) => Err(HrmError::OverlapConflict {
            id: r.id,
            start: r.span.start,
            end: r.span.end,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::leave::LeaveType;

    fn span(start: &str, end: &str) -> DateSpan {
        parse_span(start, end).unwrap()
    }

    fn record(id: u64, start: &str, end: &str) -> LeaveRecord {
        LeaveRecord {
            id,
            employee_id: 1,
            span: span(start, end),
            leave_type: LeaveType::Paid,
        }
    }

    #[test]
    fn parse_date_requires_padded_iso_format() {
        assert!(parse_date("2024-01-05").is_ok());
        for bad in [
            "2024-1-5",
            "05/01/2024",
            "2024-02-30",
            "",
            "2024-01-05T00:00",
            "2024- 1-05",
            " 2024-1-05",
            "2024-01- 5",
            "+2024-1-05",
            "2024/01/05",
        ] {
            assert!(
                matches!(parse_date(bad), Err(HrmError::InvalidDateFormat { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn parse_span_checks_format_before_order() {
        let err = parse_span("2024-01-10", "junk").unwrap_err();
        assert!(matches!(err, HrmError::InvalidDateFormat { value } if value == "junk"));

        let err = parse_span("2024-01-10", "2024-01-10").unwrap_err();
        assert!(matches!(err, HrmError::InvalidDateRange { .. }));
    }

    #[test]
    fn shared_endpoint_is_a_conflict() {
        let existing = [record(1, "2024-01-01", "2024-01-10")];
        let hit = first_overlap(&existing, &span("2024-01-10", "2024-01-15"), None);
        assert_eq!(hit.map(|r| r.id), Some(1));
    }

    #[test]
    fn adjacent_day_is_not_a_conflict() {
        let existing = [record(1, "2024-01-01", "2024-01-10")];
        assert!(first_overlap(&existing, &span("2024-01-11", "2024-01-15"), None).is_none());
    }

    #[test]
    fn containment_in_either_direction_conflicts() {
        let existing = [record(1, "2024-01-01", "2024-01-31")];
        assert!(first_overlap(&existing, &span("2024-01-10", "2024-01-12"), None).is_some());

        let existing = [record(2, "2024-01-10", "2024-01-12")];
        assert!(first_overlap(&existing, &span("2024-01-01", "2024-01-31"), None).is_some());
    }

    #[test]
    fn overlap_is_symmetric() {
        let pairs = [
            (("2024-01-01", "2024-01-10"), ("2024-01-05", "2024-01-20")),
            (("2024-01-01", "2024-01-10"), ("2024-01-10", "2024-01-20")),
            (("2024-01-01", "2024-01-10"), ("2024-01-11", "2024-01-20")),
            (("2024-03-01", "2024-03-02"), ("2024-01-01", "2024-12-31")),
        ];
        for ((a0, a1), (b0, b1)) in pairs {
            let a = span(a0, a1);
            let b = span(b0, b1);
            assert_eq!(a.overlaps(&b), b.overlaps(&a), "{a:?} vs {b:?}");
        }
    }

    #[test]
    fn excluded_record_is_ignored() {
        let existing = [
            record(1, "2024-01-01", "2024-01-10"),
            record(2, "2024-02-01", "2024-02-10"),
        ];
        let shifted = span("2024-01-03", "2024-01-12");
        assert!(check_no_conflict(&existing, &shifted, Some(1)).is_ok());

        let err = check_no_conflict(&existing, &span("2024-01-05", "2024-02-02"), Some(1))
            .unwrap_err();
        assert!(matches!(err, HrmError::OverlapConflict { id: 2, .. }));
    }
}
