//! API routes

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::extractors::AppState;
use crate::handlers::{auth, branches, departments, employees, overtime, reports, users};

/// Create the complete API router
pub fn router() -> Router<AppState> {
    Router::new().nest("/api/v1", api_v1_router())
}

fn api_v1_router() -> Router<AppState> {
    Router::new()
        .merge(auth_router())
        .merge(organisation_router())
        .merge(employees_router())
        .merge(overtime_router())
        .merge(reports_router())
        .merge(users_router())
}

fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
}

fn organisation_router() -> Router<AppState> {
    Router::new()
        .route(
            "/branches",
            get(branches::list_branches).post(branches::create_branch),
        )
        .route(
            "/branches/:id",
            patch(branches::rename_branch).delete(branches::delete_branch),
        )
        .route(
            "/departments",
            get(departments::list_departments).post(departments::create_department),
        )
        .route(
            "/departments/:id",
            patch(departments::rename_department).delete(departments::delete_department),
        )
}

fn employees_router() -> Router<AppState> {
    Router::new()
        .route(
            "/employees",
            get(employees::list_employees).post(employees::create_employee),
        )
        .route(
            "/employees/:id",
            get(employees::get_employee)
                .patch(employees::update_employee)
                .delete(employees::delete_employee),
        )
        .route("/employees/:id/metrics", put(employees::update_metrics))
        .route("/employees/:id/scorecard", get(employees::get_scorecard))
        .route("/employees/:id/overtime", get(employees::employee_overtime))
}

fn overtime_router() -> Router<AppState> {
    Router::new()
        .route("/overtime", post(overtime::submit_overtime))
        .route("/overtime/queue", get(overtime::approval_queue))
        .route("/overtime/:id", axum::routing::delete(overtime::delete_overtime))
        .route("/overtime/:id/status", patch(overtime::update_status))
}

fn reports_router() -> Router<AppState> {
    Router::new()
        .route("/reports/kpi", get(reports::kpi_report))
        .route("/reports/overtime", get(reports::overtime_report))
}

fn users_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list_users).post(users::add_user))
        .route(
            "/users/:id",
            patch(users::update_user).delete(users::delete_user),
        )
}
