// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    default_packages, BoundingBox, CandidateQuery, DiscoveryFilters, DiscoveryPreferences, GeoPoint, Interaction,
    InteractionStats, InteractionType, ProviderProfile, SortBy, Subscription, SubscriptionStatus, VipPackage,
};
pub use requests::{CreateSubscriptionRequest, DiscoveryCardsQuery, InteractRequest, InteractionsQuery, PreferencesUpdate};
pub use responses::{DiscoveryCard, DiscoveryCardsResponse, ErrorResponse, HealthResponse, UndoInteractionResponse};
