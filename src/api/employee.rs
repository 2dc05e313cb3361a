use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use serde_json::json;
use tracing::{error, info};
use utoipa::ToSchema;

use super::{PageQuery, slice_page};
use crate::error::HrmError;
use crate::model::employee::{Employee, NewEmployee};
use crate::scheduler::HolidayScheduler;
use crate::store::{EmployeeDirectory, StoreError};

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    #[schema(
    example = json!([{
        "id": 1,
        "first_name": "John",
        "last_name": "Doe",
        "email": "john.doe@company.com",
        "phone": "+8801712345678"
    }])
)]
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: usize,
}

fn directory_failure(e: StoreError) -> HrmError {
    error!(error = %e, "Employee directory call failed");
    HrmError::Store(e)
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/v1/employee",
    request_body = NewEmployee,
    responses(
        (status = 201, description = "Employee created successfully", body = Employee),
        (status = 400, description = "Missing field or invalid email", body = Object, example = json!({
            "error": "InvalidEmployee",
            "message": "invalid employee: email must be a valid address"
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    directory: web::Data<dyn EmployeeDirectory>,
    payload: web::Json<NewEmployee>,
) -> actix_web::Result<impl Responder> {
    let employee = payload.into_inner().normalized()?;

    let created = directory
        .create(&employee)
        .await
        .map_err(directory_failure)?;

    info!(employee_id = created.id, "Employee created");
    Ok(HttpResponse::Created().json(created))
}

#[utoipa::path(
    get,
    path = "/api/v1/employee",
    params(PageQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    directory: web::Data<dyn EmployeeDirectory>,
    query: web::Query<PageQuery>,
) -> actix_web::Result<impl Responder> {
    let (page, per_page) = query.bounds();

    let employees = directory.list().await.map_err(directory_failure)?;
    let total = employees.len();

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: slice_page(employees, page, per_page),
        page,
        per_page,
        total,
    }))
}

/// Display names for selection inputs, in id order
#[utoipa::path(
    get,
    path = "/api/v1/employee/names",
    responses(
        (status = 200, description = "Employee display names", body = Vec<String>,
         example = json!(["John Doe", "Jane Roe"]))
    ),
    tag = "Employee"
)]
pub async fn list_employee_names(
    directory: web::Data<dyn EmployeeDirectory>,
) -> actix_web::Result<impl Responder> {
    let names = directory.list_names().await.map_err(directory_failure)?;
    Ok(HttpResponse::Ok().json(names))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    directory: web::Data<dyn EmployeeDirectory>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let employee = directory
        .get(employee_id)
        .await
        .map_err(directory_failure)?
        .ok_or(HrmError::NotFound { id: employee_id })?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/v1/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    request_body = NewEmployee,
    responses(
        (status = 200, description = "Employee updated successfully", body = Employee),
        (status = 400, description = "Missing field or invalid email"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    directory: web::Data<dyn EmployeeDirectory>,
    path: web::Path<u64>,
    payload: web::Json<NewEmployee>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let employee = payload.into_inner().normalized()?;

    let updated = directory
        .update(employee_id, &employee)
        .await
        .map_err(directory_failure)?
        .ok_or(HrmError::NotFound { id: employee_id })?;

    info!(employee_id, "Employee updated");
    Ok(HttpResponse::Ok().json(updated))
}

/// Delete Employee together with their leave records
#[utoipa::path(
    delete,
    path = "/api/v1/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    scheduler: web::Data<HolidayScheduler>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    scheduler.remove_employee(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
