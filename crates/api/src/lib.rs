pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;
pub mod ws;

use axum::{
    Json, Router,
    extract::State,
    http::HeaderValue,
    routing::{get, post, put},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.app.cors_origins);

    let notification_routes = Router::new()
        .route("/", get(routes::notification::list))
        .route("/unread-count", get(routes::notification::unread_count))
        .route("/read", put(routes::notification::mark_many_read))
        .route(
            "/preferences",
            get(routes::notification::get_preferences)
                .put(routes::notification::update_preferences),
        )
        .route("/{notification_id}/read", put(routes::notification::mark_read));

    let organization_routes = Router::new()
        .route(
            "/",
            get(routes::organization::list).post(routes::organization::create),
        )
        .route(
            "/{organization_id}",
            get(routes::organization::get)
                .put(routes::organization::update)
                .delete(routes::organization::delete),
        )
        .route("/{organization_id}/event", post(routes::event::emit));

    let member_routes = Router::new()
        .route("/", get(routes::member::list).post(routes::member::add))
        .route("/{user_id}", axum::routing::delete(routes::member::remove));

    let invite_routes = Router::new().route(
        "/",
        get(routes::invite::list).post(routes::invite::create),
    );

    let public_invite_routes =
        Router::new().route("/{token}/accept", post(routes::invite::accept));

    let api = Router::new()
        .nest("/notification", notification_routes)
        .nest("/org", organization_routes)
        .nest("/org/{organization_id}/member", member_routes)
        .nest("/org/{organization_id}/invite", invite_routes)
        .nest("/invite", public_invite_routes);

    Router::new()
        .nest("/api", api)
        .route("/health", get(health_check))
        .route("/ws", get(ws::handler::ws_upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Any origin when none are configured, otherwise exactly the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(allowed)
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "connected_users": state.ws_storage.user_count(),
        "connections": state.ws_storage.connection_count(),
    }))
}
