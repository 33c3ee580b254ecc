use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{DiscoveryFilters, GeoPoint, InteractionType, SortBy};

/// Query string of the card feed
///
/// `gender_preference` is a comma separated list, e.g. `female,nonbinary`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DiscoveryCardsQuery {
    #[validate(range(min = 18, max = 99))]
    pub min_age: Option<i32>,
    #[validate(range(min = 18, max = 99))]
    pub max_age: Option<i32>,
    #[validate(range(min = 0.0))]
    pub min_price: Option<f64>,
    #[validate(range(min = 0.0))]
    pub max_price: Option<f64>,
    pub verified_only: Option<bool>,
    pub gender_preference: Option<String>,
    pub sort_by: Option<String>,
    #[validate(range(min = 0.0))]
    pub max_distance_km: Option<f64>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: Option<f64>,
    pub cursor: Option<String>,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<u16>,
}

impl DiscoveryCardsQuery {
    /// Filters explicitly set on this request
    pub fn filters(&self) -> Result<DiscoveryFilters, String> {
        for (name, value) in [
            ("min_price", self.min_price),
            ("max_price", self.max_price),
            ("max_distance_km", self.max_distance_km),
        ] {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(format!("{} must be a finite number", name));
            }
        }

        let sort_by = self
            .sort_by
            .as_deref()
            .map(str::parse::<SortBy>)
            .transpose()?;

        let gender_preferences = self.gender_preference.as_deref().map(|raw| {
            raw.split(',')
                .map(|g| g.trim().to_lowercase())
                .filter(|g| !g.is_empty())
                .collect::<Vec<_>>()
        });

        Ok(DiscoveryFilters {
            min_age: self.min_age,
            max_age: self.max_age,
            min_price: self.min_price,
            max_price: self.max_price,
            verified_only: self.verified_only,
            gender_preferences,
            sort_by,
            max_distance_km: self.max_distance_km,
        })
    }

    /// Caller location; both coordinates or neither
    pub fn origin(&self) -> Result<Option<GeoPoint>, String> {
        match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) if latitude.is_finite() && longitude.is_finite() => {
                Ok(Some(GeoPoint { latitude, longitude }))
            }
            (Some(_), Some(_)) => Err("lat and lon must be finite numbers".to_string()),
            (None, None) => Ok(None),
            _ => Err("lat and lon must be provided together".to_string()),
        }
    }
}

/// Body of `POST /discovery/interact`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InteractRequest {
    #[validate(length(min = 1))]
    pub provider_id: String,
    #[validate(length(min = 1))]
    pub interaction_type: String,
}

impl InteractRequest {
    pub fn interaction_type(&self) -> Result<InteractionType, String> {
        self.interaction_type.parse()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionsQuery {
    pub interaction_type: Option<String>,
}

/// Body of `PUT /discovery/preferences`
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PreferencesUpdate {
    #[validate(range(min = 18, max = 99))]
    pub min_age: Option<i32>,
    #[validate(range(min = 18, max = 99))]
    pub max_age: Option<i32>,
    #[validate(range(min = 0.0))]
    pub min_price: Option<f64>,
    #[validate(range(min = 0.0))]
    pub max_price: Option<f64>,
    pub verified_only: Option<bool>,
    pub gender_preferences: Option<Vec<String>>,
    pub sort_by: Option<SortBy>,
    #[validate(range(min = 0.0))]
    pub max_distance_km: Option<f64>,
}

impl From<PreferencesUpdate> for DiscoveryFilters {
    fn from(update: PreferencesUpdate) -> Self {
        Self {
            min_age: update.min_age,
            max_age: update.max_age,
            min_price: update.min_price,
            max_price: update.max_price,
            verified_only: update.verified_only,
            gender_preferences: update
                .gender_preferences
                .map(|list| list.into_iter().map(|g| g.trim().to_lowercase()).collect()),
            sort_by: update.sort_by,
            max_distance_km: update.max_distance_km,
        }
    }
}

/// Body of `POST /subscriptions`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSubscriptionRequest {
    #[validate(length(min = 1))]
    pub package_id: String,
    #[serde(default)]
    pub auto_renew: bool,
}
