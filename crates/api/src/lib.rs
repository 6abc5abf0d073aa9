pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public surface: waitlist capture, provider webhook, acceptance-page
    // resolution.
    let public_routes = Router::new()
        .route("/waitlist", post(routes::waitlist::join))
        .route("/webhooks/clerk", post(routes::webhook::clerk))
        .route("/invitations/{token}", get(routes::invite::invitation_info));

    // Authenticated surface (any signed-in account; the shop setup flow
    // happens here, before the caller holds a portal role).
    let account_routes = Router::new()
        .route("/me", get(routes::user::me))
        .route("/invite", post(routes::invite::create))
        .route("/invitations/accept", post(routes::invite::accept))
        .route("/shops", get(routes::shop::list).post(routes::shop::create));

    // Portal surface, role-gated at the router level.
    let portal_routes = Router::new()
        .route("/shops/{shop_id}", get(routes::shop::get))
        .route("/shops/{shop_id}", put(routes::shop::update))
        .route("/shops/{shop_id}/dashboard", get(routes::shop::dashboard))
        .route("/shops/{shop_id}/team", get(routes::team::members))
        .route("/shops/{shop_id}/invitations", get(routes::team::invitations))
        .route(
            "/shops/{shop_id}/invitations/{invitation_id}",
            delete(routes::team::revoke),
        )
        .route(
            "/shops/{shop_id}/mechanics",
            get(routes::mechanic::list).post(routes::mechanic::create),
        )
        .route(
            "/shops/{shop_id}/mechanics/{mechanic_id}",
            put(routes::mechanic::update),
        )
        .route(
            "/shops/{shop_id}/jobs",
            get(routes::job::list).post(routes::job::create),
        )
        .route("/shops/{shop_id}/jobs/{job_id}", put(routes::job::update))
        .route(
            "/shops/{shop_id}/appointments",
            get(routes::appointment::list).post(routes::appointment::create),
        )
        .route(
            "/shops/{shop_id}/appointments/{appointment_id}",
            put(routes::appointment::update),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware::require_portal_role,
        ));

    // Admin surface.
    let admin_routes = Router::new()
        .route("/waitlist", get(routes::admin::waitlist))
        .route("/users", get(routes::admin::users))
        .route("/shops", get(routes::admin::shops))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_admin));

    let api = Router::new()
        .merge(public_routes)
        .merge(account_routes)
        .nest("/portal", portal_routes)
        .nest("/admin", admin_routes);

    Router::new()
        .nest("/api", api)
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
