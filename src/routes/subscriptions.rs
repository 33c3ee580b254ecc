use actix_web::{web, HttpResponse};
use uuid::Uuid;
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::errors::ApiError;
use crate::models::CreateSubscriptionRequest;
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscriptions")
            .route("", web::get().to(list_subscriptions))
            .route("", web::post().to(create_subscription))
            .route("/packages", web::get().to(list_packages))
            .route("/current", web::get().to(current_subscription))
            .route("/{subscription_id}/cancel", web::post().to(cancel_subscription)),
    );
}

async fn list_packages(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let packages = state.subscriptions.list_packages().await?;
    Ok(HttpResponse::Ok().json(packages))
}

/// Subscribe to a VIP package
///
/// POST /api/v1/subscriptions
///
/// Request body:
/// ```json
/// { "package_id": "gold", "auto_renew": false }
/// ```
///
/// Rejected with 400 when the user already holds an active subscription.
async fn create_subscription(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<CreateSubscriptionRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    let subscription = state.subscriptions.create(&user.user_id, &body).await?;
    Ok(HttpResponse::Created().json(subscription))
}

async fn current_subscription(state: web::Data<AppState>, user: AuthenticatedUser) -> Result<HttpResponse, ApiError> {
    let subscription = state.subscriptions.current(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(subscription))
}

async fn list_subscriptions(state: web::Data<AppState>, user: AuthenticatedUser) -> Result<HttpResponse, ApiError> {
    let subscriptions = state.subscriptions.history(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(subscriptions))
}

async fn cancel_subscription(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let subscription = state.subscriptions.cancel(&user.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(subscription))
}
