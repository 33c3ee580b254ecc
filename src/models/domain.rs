use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Service-offering profile shown to seekers in discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub id: String,
    pub user_id: String,
    pub display_name: String,
    pub age: i32,
    pub gender: String,
    pub hourly_rate: f64,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: i32,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub photo_urls: Vec<String>,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl ProviderProfile {
    /// Location of the profile, when both coordinates are known
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint { latitude, longitude }),
            _ => None,
        }
    }
}

fn default_true() -> bool { true }

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Swipe-like action from a user toward a provider profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "interaction_type", rename_all = "snake_case")]
pub enum InteractionType {
    Like,
    Pass,
    SuperLike,
    Block,
}

impl InteractionType {
    pub const ALL: [InteractionType; 4] = [
        InteractionType::Like,
        InteractionType::Pass,
        InteractionType::SuperLike,
        InteractionType::Block,
    ];

    /// Weight persisted alongside the interaction row
    pub fn value(self) -> f64 {
        match self {
            InteractionType::Like => 1.0,
            InteractionType::SuperLike => 2.0,
            InteractionType::Block => -1.0,
            _ => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InteractionType::Like => "like",
            InteractionType::Pass => "pass",
            InteractionType::SuperLike => "super_like",
            InteractionType::Block => "block",
        }
    }
}

impl fmt::Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InteractionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "like" => Ok(InteractionType::Like),
            "pass" => Ok(InteractionType::Pass),
            "super_like" => Ok(InteractionType::SuperLike),
            "block" => Ok(InteractionType::Block),
            other => Err(format!(
                "Invalid interaction type '{}': must be one of like, pass, super_like, block",
                other
            )),
        }
    }
}

/// Recorded interaction, unique per (user, provider) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub id: Uuid,
    pub user_id: String,
    pub provider_id: String,
    pub interaction_type: InteractionType,
    pub value: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Named feed orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Rating,
    PriceLow,
    PriceHigh,
    Distance,
    Newest,
}

impl SortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Rating => "rating",
            SortBy::PriceLow => "price_low",
            SortBy::PriceHigh => "price_high",
            SortBy::Distance => "distance",
            SortBy::Newest => "newest",
        }
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rating" => Ok(SortBy::Rating),
            "price_low" => Ok(SortBy::PriceLow),
            "price_high" => Ok(SortBy::PriceHigh),
            "distance" => Ok(SortBy::Distance),
            "newest" => Ok(SortBy::Newest),
            other => Err(format!(
                "Invalid sort key '{}': must be one of rating, price_low, price_high, distance, newest",
                other
            )),
        }
    }
}

/// Filter set applied to the discovery feed
///
/// Every field is optional; unset request fields are filled from the
/// user's stored preferences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryFilters {
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub verified_only: Option<bool>,
    pub gender_preferences: Option<Vec<String>>,
    pub sort_by: Option<SortBy>,
    pub max_distance_km: Option<f64>,
}

/// Discovery preferences persisted per user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryPreferences {
    pub user_id: String,
    #[serde(flatten)]
    pub filters: DiscoveryFilters,
    pub updated_at: Option<DateTime<Utc>>,
}

impl DiscoveryPreferences {
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            filters: DiscoveryFilters::default(),
            updated_at: None,
        }
    }
}

/// Candidate query handed to the store
///
/// The store answers with at most `limit` eligible profiles in feed order
/// (sort key from `filters` and `origin`, id tie-break), strictly after
/// `anchor` when one is set, with `max_distance_km` already applied.
#[derive(Debug, Clone)]
pub struct CandidateQuery {
    pub viewer_id: String,
    pub filters: DiscoveryFilters,
    pub origin: Option<GeoPoint>,
    pub anchor: Option<ProviderProfile>,
    pub limit: usize,
}

/// Per-type interaction counts for a user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionStats {
    pub user_id: String,
    pub total: i64,
    pub likes: i64,
    pub super_likes: i64,
    pub passes: i64,
    pub blocks: i64,
    pub last_interaction_at: Option<DateTime<Utc>>,
}

/// Paid tier granting bundled premium services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VipPackage {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub duration_days: i32,
    pub services: Vec<String>,
    pub is_active: bool,
}

/// Catalogue seeded into fresh stores
pub fn default_packages() -> Vec<VipPackage> {
    let services = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    vec![
        VipPackage {
            id: "silver".to_string(),
            name: "Silver".to_string(),
            description: "Priority placement and unlimited likes".to_string(),
            price: 19.99,
            duration_days: 30,
            services: services(&["unlimited_likes", "priority_placement"]),
            is_active: true,
        },
        VipPackage {
            id: "gold".to_string(),
            name: "Gold".to_string(),
            description: "Silver plus daily super likes and read receipts".to_string(),
            price: 39.99,
            duration_days: 30,
            services: services(&["unlimited_likes", "priority_placement", "daily_super_likes", "read_receipts"]),
            is_active: true,
        },
        VipPackage {
            id: "platinum".to_string(),
            name: "Platinum".to_string(),
            description: "Gold plus concierge booking support".to_string(),
            price: 99.99,
            duration_days: 90,
            services: services(&[
                "unlimited_likes",
                "priority_placement",
                "daily_super_likes",
                "read_receipts",
                "concierge_booking",
            ]),
            is_active: true,
        },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "subscription_status", rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Pending,
    Active,
    Cancelled,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: String,
    pub package_id: String,
    pub status: SubscriptionStatus,
    pub auto_renew: bool,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// New active subscription to `package` starting at `now`
    pub fn start(user_id: &str, package: &VipPackage, auto_renew: bool, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            package_id: package.id.clone(),
            status: SubscriptionStatus::Active,
            auto_renew,
            started_at: now,
            expires_at: now + Duration::days(package.duration_days as i64),
            cancelled_at: None,
        }
    }

    /// Active and not yet lapsed
    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.status == SubscriptionStatus::Active && self.expires_at > now
    }
}
