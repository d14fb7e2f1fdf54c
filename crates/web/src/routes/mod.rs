//! HTTP route handlers for the vendor portal.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database ping)
//!
//! # Auth
//! GET  /                       - Redirect to /dashboard or /login
//! GET  /login                  - Portal chooser
//! GET  /login/{portal}         - Login page (user, staff, admin)
//! POST /login/{portal}         - Login action (rate limited)
//! POST /logout                 - Logout
//! GET  /dashboard              - Redirect to the role's dashboard
//!
//! # Vendor (USER)
//! GET  /dashboard/user                     - Own applications
//! GET  /dashboard/user/{form_type}         - Application form (food, goods, workshop)
//! POST /dashboard/user/{form_type}         - Submit application
//! GET  /dashboard/user/forms/{id}          - Application detail and scheduler
//! POST /dashboard/user/forms/{id}/events   - Add an attendance day
//! POST /dashboard/user/forms/{id}/events/{event_id}/delete - Remove one
//!
//! # Staff (STAFF, ADMIN)
//! GET  /dashboard/staff                    - Counts and recent applications
//! GET  /dashboard/staff/submissions        - Application list
//! GET  /dashboard/staff/submissions/{id}   - Application detail
//! POST /dashboard/staff/submissions/{id}/status - Change status
//! GET  /dashboard/staff/vendors            - Vendor list
//!
//! # Admin (ADMIN)
//! GET  /dashboard/admin                    - Overview
//! GET  /dashboard/admin/applications       - Filterable application list
//! POST /dashboard/admin/applications/bulk  - Approve or reject selected
//! GET  /dashboard/admin/applications/{id}  - Application detail
//! POST /dashboard/admin/applications/{id}/status - Change status
//! GET  /dashboard/admin/vendors            - Vendors with shop counts
//! GET  /dashboard/admin/events             - All scheduled days by month
//! GET  /dashboard/admin/reports            - Counts per status
//! GET  /dashboard/admin/security           - All accounts
//!
//! # JSON API
//! POST   /api/forms/submit                 - Submit an application
//! PATCH  /api/forms/{id}/status            - Change status (STAFF, ADMIN)
//! POST   /api/admin/applications/bulk      - Bulk approve/reject (ADMIN)
//! POST   /api/events                       - Create event (owner)
//! PATCH  /api/events/{id}                  - Update event (owner)
//! DELETE /api/events/{id}                  - Delete event (owner)
//! ```

pub mod admin;
pub mod api;
pub mod auth;
pub mod health;
pub mod review;
pub mod staff;
pub mod vendor;

use axum::{
    Router,
    handler::Handler,
    routing::{get, patch, post},
};

use crate::middleware::login_rate_limiter;
use crate::state::AppState;

/// Create the login and logout routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(auth::index))
        .route("/login", get(auth::portal_chooser))
        .route(
            "/login/{portal}",
            get(auth::login_page).post(auth::login.layer(login_rate_limiter())),
        )
        .route("/logout", post(auth::logout))
        .route("/dashboard", get(auth::dashboard))
}

/// Create the vendor dashboard routes router.
pub fn vendor_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(vendor::dashboard))
        .route("/forms/{id}", get(vendor::form_detail))
        .route("/forms/{id}/events", post(vendor::add_event))
        .route(
            "/forms/{id}/events/{event_id}/delete",
            post(vendor::delete_event),
        )
        .route(
            "/{form_type}",
            get(vendor::application_form).post(vendor::submit_application),
        )
}

/// Create the staff dashboard routes router.
pub fn staff_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(staff::dashboard))
        .route("/submissions", get(staff::submissions))
        .route("/submissions/{id}", get(staff::submission_detail))
        .route("/submissions/{id}/status", post(staff::update_status))
        .route("/vendors", get(staff::vendors))
}

/// Create the admin dashboard routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard))
        .route("/applications", get(admin::applications))
        .route("/applications/bulk", post(admin::bulk_update))
        .route("/applications/{id}", get(admin::application_detail))
        .route("/applications/{id}/status", post(admin::update_status))
        .route("/vendors", get(admin::vendors))
        .route("/events", get(admin::events))
        .route("/reports", get(admin::reports))
        .route("/security", get(admin::security))
}

/// Create the JSON API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/forms/submit", post(api::forms::submit))
        .route("/forms/{id}/status", patch(api::forms::update_status))
        .route(
            "/admin/applications/bulk",
            post(api::applications::bulk_update),
        )
        .route("/events", post(api::events::create))
        .route(
            "/events/{id}",
            patch(api::events::update).delete(api::events::delete),
        )
}

/// Create all routes for the portal.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(auth_routes())
        .nest("/dashboard/user", vendor_routes())
        .nest("/dashboard/staff", staff_routes())
        .nest("/dashboard/admin", admin_routes())
        .nest("/api", api_routes())
}
