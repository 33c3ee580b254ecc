//! Companion Discovery - discovery feed and VIP subscription service
//!
//! This library provides the swiping feed of the companion booking platform:
//! filter merging, interaction-based exclusion, ordering and keyset
//! pagination, plus the VIP subscription rules, served over actix-web.

pub mod auth;
pub mod config;
pub mod core;
pub mod errors;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{haversine_distance, DiscoveryFeed, FeedPage, FeedRequest};
pub use errors::ApiError;
pub use models::{DiscoveryCard, DiscoveryCardsResponse, DiscoveryFilters, InteractionType, ProviderProfile};
pub use routes::{configure_app, AppState};
