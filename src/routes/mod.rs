// Route exports
pub mod discovery;
pub mod health;
pub mod subscriptions;

use actix_web::web;
use std::sync::Arc;

use crate::auth::JwtValidator;
use crate::errors::{handle_json_payload_error, handle_path_error, handle_query_payload_error, ApiError};
use crate::services::{DiscoveryService, SubscriptionService};

/// Application state shared across all handlers
///
/// Built once at startup; every client handle inside is constructed
/// explicitly and passed in.
#[derive(Clone)]
pub struct AppState {
    pub discovery: DiscoveryService,
    pub subscriptions: SubscriptionService,
    pub jwt: Arc<JwtValidator>,
}

/// State, extractor error handlers and routes for one `App`
pub fn configure_app(state: AppState) -> impl Fn(&mut web::ServiceConfig) + Clone {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::new(state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .configure(configure_routes);
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::configure)
            .configure(discovery::configure)
            .configure(subscriptions::configure)
            .default_service(web::to(not_found)),
    );
}

async fn not_found() -> Result<actix_web::HttpResponse, ApiError> {
    Err(ApiError::not_found("Not Found"))
}
