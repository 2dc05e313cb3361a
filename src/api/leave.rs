use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use super::page_bounds;
use crate::model::leave::{LeaveCandidate, LeaveView};
use crate::scheduler::HolidayScheduler;

#[derive(Deserialize, IntoParams)]
pub struct LeaveFilter {
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    /// Pagination page number (starts with 1)
    pub page: Option<u32>,
    /// Items per page (1..=100)
    pub per_page: Option<u32>,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "data": [
        {
            "id": 1,
            "employee_id": 3,
            "employee_name": "John Doe",
            "start_date": "2026-01-05",
            "end_date": "2026-01-09",
            "leave_type": "PAID",
            "days": 5
        }
    ],
    "page": 1,
    "per_page": 20,
    "total": 1
}))]
pub struct LeaveListResponse {
    pub data: Vec<LeaveView>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: u64,
}

/* =========================
Book leave
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = LeaveCandidate,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave committed", body = LeaveView),
        (status = 400, description = "Unknown employee, bad date, bad range or bad type", body = Object,
         example = json!({
            "error": "InvalidDateRange",
            "message": "end date 2026-01-01 must be after start date 2026-01-05"
         })),
        (status = 409, description = "Overlaps an existing leave of the same employee", body = Object,
         example = json!({
            "error": "OverlapConflict",
            "message": "employee already has leave #4 from 2026-01-01 to 2026-01-10",
            "conflict": { "id": 4, "start_date": "2026-01-01", "end_date": "2026-01-10" }
         }))
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    scheduler: web::Data<HolidayScheduler>,
    payload: web::Json<LeaveCandidate>,
) -> actix_web::Result<impl Responder> {
    let candidate = payload.into_inner();
    let record = scheduler.add(&candidate).await?;

    Ok(HttpResponse::Created().json(LeaveView::new(&record, Some(candidate.employee_name))))
}

/* =========================
Modify leave
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave record to modify")
    ),
    request_body = LeaveCandidate,
    responses(
        (status = 200, description = "Leave modified", body = LeaveView),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Leave record not found", body = Object, example = json!({
            "error": "NotFound",
            "message": "record not found: 9"
        })),
        (status = 409, description = "Overlaps another leave of the same employee")
    ),
    tag = "Leave"
)]
pub async fn modify_leave(
    scheduler: web::Data<HolidayScheduler>,
    path: web::Path<u64>,
    payload: web::Json<LeaveCandidate>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();
    let candidate = payload.into_inner();
    let record = scheduler.modify(leave_id, &candidate).await?;

    Ok(HttpResponse::Ok().json(LeaveView::new(&record, Some(candidate.employee_name))))
}

/* =========================
Delete leave
========================= */
#[utoipa::path(
    delete,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave record to delete")
    ),
    responses(
        (status = 200, description = "Leave deleted", body = Object, example = json!({
            "message": "Leave deleted"
        })),
        (status = 404, description = "Leave record not found")
    ),
    tag = "Leave"
)]
pub async fn delete_leave(
    scheduler: web::Data<HolidayScheduler>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    scheduler.delete(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave deleted"
    })))
}

/// for getting one leave record
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave record to fetch")
    ),
    responses(
        (status = 200, description = "Leave record found", body = LeaveView),
        (status = 404, description = "Leave record not found")
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    scheduler: web::Data<HolidayScheduler>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let view = scheduler.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(view))
}

/// for listing leave records
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse)
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    scheduler: web::Data<HolidayScheduler>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    let (page, per_page) = page_bounds(query.page, query.per_page);

    let (data, total) = scheduler
        .list_page(query.employee_id, page, per_page)
        .await?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data,
        page,
        per_page,
        total,
    }))
}
