use crate::api::employee::EmployeeListResponse;
use crate::api::leave::LeaveListResponse;
use crate::model::employee::{Employee, NewEmployee};
use crate::model::leave::{LeaveCandidate, LeaveType, LeaveView};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Leave API",
        version = "1.0.0",
        description = r#"
## Employee Leave Management

Books, modifies and cancels employee holidays while guaranteeing that no
employee ever holds two overlapping leave periods.

### 🔹 Key Features
- **Employee Directory**
  - Create, update, list and delete employees; list display names
- **Leave Scheduling**
  - Book leave (`PAID`, `SICK`, `UNPAID`) by employee display name
  - Overlap detection on closed date intervals: a shared end/start day is a conflict
  - Modify a booking in place; its own old period never blocks it

### 📦 Response Format
- JSON-based RESTful responses
- Errors carry a machine-readable `error` kind and a `message`
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::leave::leave_list,
        crate::api::leave::get_leave,
        crate::api::leave::create_leave,
        crate::api::leave::modify_leave,
        crate::api::leave::delete_leave,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::list_employee_names,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee
    ),
    components(
        schemas(
            LeaveCandidate,
            LeaveType,
            LeaveView,
            LeaveListResponse,
            Employee,
            NewEmployee,
            EmployeeListResponse
        )
    ),
    tags(
        (name = "Leave", description = "Leave scheduling APIs"),
        (name = "Employee", description = "Employee directory APIs"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/api/v1/leave",
            "/api/v1/leave/{leave_id}",
            "/api/v1/employee",
            "/api/v1/employee/names",
            "/api/v1/employee/{employee_id}",
        ] {
            assert!(paths.iter().any(|p| *p == expected), "missing {expected}");
        }
    }
}
