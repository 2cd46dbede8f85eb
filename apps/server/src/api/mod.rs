use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    auth::{login, me, require_jwt},
    config::Config,
    main_lib::AppState,
};

mod audit;
mod chat;
mod company;
mod dashboard;
mod events;
mod health;
mod invoices;
mod maintenance;
mod notifications;
mod packages;
mod pilgrims;
mod regions;
mod reports;
mod shared;
mod transactions;
mod users;
mod vendors;

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let public = Router::new()
        .merge(health::router())
        .route("/auth/login", post(login));

    let protected = Router::new()
        .route("/auth/me", get(me))
        .merge(users::router())
        .merge(packages::router())
        .merge(pilgrims::router())
        .merge(transactions::router())
        .merge(invoices::router())
        .merge(vendors::router())
        .merge(notifications::router())
        .merge(audit::router())
        .merge(chat::router())
        .merge(dashboard::router())
        .merge(reports::router())
        .merge(company::router())
        .merge(regions::router())
        .merge(maintenance::router())
        .merge(events::router())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_jwt));

    Router::new()
        .nest("/api/v1", public.merge(protected))
        .with_state(state)
        .layer(cors)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
