use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::auth::AuthenticatedUser;
use crate::errors::ApiError;
use crate::models::{
    DiscoveryCardsQuery, InteractRequest, InteractionType, InteractionsQuery, PreferencesUpdate,
    UndoInteractionResponse,
};
use crate::routes::AppState;

/// Configure all discovery routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/discovery")
            .route("/cards", web::get().to(get_cards))
            .route("/interact", web::post().to(interact))
            .route("/interact/{provider_id}", web::delete().to(undo_interaction))
            .route("/interactions", web::get().to(list_interactions))
            .route("/stats", web::get().to(interaction_stats))
            .route("/preferences", web::get().to(get_preferences))
            .route("/preferences", web::put().to(update_preferences)),
    );
}

/// Discovery card feed
///
/// GET /api/v1/discovery/cards?min_age=21&max_age=35&gender_preference=female&sort_by=rating&limit=20&cursor={id}
///
/// `lat`/`lon` enable distance values, `sort_by=distance` and `max_distance_km`.
async fn get_cards(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<DiscoveryCardsQuery>,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;

    tracing::debug!("Fetching discovery cards for user {}", user.user_id);
    let response = state.discovery.get_cards(&user.user_id, &query).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Record a swipe
///
/// POST /api/v1/discovery/interact
///
/// Request body:
/// ```json
/// { "provider_id": "string", "interaction_type": "like|pass|super_like|block" }
/// ```
async fn interact(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<InteractRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;
    let interaction_type = body.interaction_type().map_err(ApiError::BadRequest)?;

    let interaction = state
        .discovery
        .interact(&user.user_id, &body.provider_id, interaction_type)
        .await?;

    Ok(HttpResponse::Ok().json(interaction))
}

/// Undo a swipe
///
/// DELETE /api/v1/discovery/interact/{provider_id}
async fn undo_interaction(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let provider_id = path.into_inner();
    let removed = state.discovery.undo_interaction(&user.user_id, &provider_id).await?;

    Ok(HttpResponse::Ok().json(UndoInteractionResponse { provider_id, removed }))
}

/// GET /api/v1/discovery/interactions?interaction_type=like
async fn list_interactions(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    query: web::Query<InteractionsQuery>,
) -> Result<HttpResponse, ApiError> {
    let interaction_type = query
        .interaction_type
        .as_deref()
        .map(str::parse::<InteractionType>)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    let interactions = state.discovery.list_interactions(&user.user_id, interaction_type).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "interactions": interactions,
        "count": interactions.len(),
    })))
}

async fn interaction_stats(state: web::Data<AppState>, user: AuthenticatedUser) -> Result<HttpResponse, ApiError> {
    let stats = state.discovery.interaction_stats(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(stats))
}

async fn get_preferences(state: web::Data<AppState>, user: AuthenticatedUser) -> Result<HttpResponse, ApiError> {
    let preferences = state.discovery.preferences(&user.user_id).await?;
    Ok(HttpResponse::Ok().json(preferences))
}

/// Replace stored discovery preferences
///
/// PUT /api/v1/discovery/preferences
async fn update_preferences(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<PreferencesUpdate>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    let preferences = state
        .discovery
        .update_preferences(&user.user_id, body.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(preferences))
}
