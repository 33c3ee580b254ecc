use serde::{Deserialize, Serialize};

use crate::models::domain::ProviderProfile;

/// Card rendered in the swiping UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryCard {
    pub id: String,
    pub display_name: String,
    pub age: i32,
    pub gender: String,
    pub hourly_rate: f64,
    pub is_verified: bool,
    pub rating: f64,
    pub review_count: i32,
    pub distance_km: Option<f64>,
    pub bio: Option<String>,
    pub photo_urls: Vec<String>,
    pub services: Vec<String>,
}

impl DiscoveryCard {
    pub fn from_profile(profile: ProviderProfile, distance_km: Option<f64>) -> Self {
        Self {
            id: profile.id,
            display_name: profile.display_name,
            age: profile.age,
            gender: profile.gender,
            hourly_rate: profile.hourly_rate,
            is_verified: profile.is_verified,
            rating: profile.rating,
            review_count: profile.review_count,
            distance_km,
            bio: profile.bio,
            photo_urls: profile.photo_urls,
            services: profile.services,
        }
    }
}

/// Response for the card feed endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryCardsResponse {
    pub providers: Vec<DiscoveryCard>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error body returned for every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Response for undoing an interaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoInteractionResponse {
    pub provider_id: String,
    pub removed: bool,
}
