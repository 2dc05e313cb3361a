//! Employee leave management.
//!
//! The [`scheduler::HolidayScheduler`] owns the rules: dates are validated,
//! an employee can never hold two overlapping leave periods, and every
//! rejected request leaves the store untouched. Storage sits behind the
//! traits in [`store`]; the HTTP layer in [`api`] is a thin caller.

pub mod api;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod model;
pub mod routes;
pub mod scheduler;
pub mod state;
pub mod store;
