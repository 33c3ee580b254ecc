//! Persistence seam for discovery and subscriptions.
//!
//! Handlers only see these traits; `PostgresStore` backs production and
//! `InMemoryStore` backs tests and local development.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    CandidateQuery, DiscoveryFilters, DiscoveryPreferences, Interaction, InteractionStats, InteractionType,
    ProviderProfile, Subscription, VipPackage,
};

/// Errors that can occur in a store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait DiscoveryStore: Send + Sync {
    async fn get_provider(&self, provider_id: &str) -> StoreResult<Option<ProviderProfile>>;

    /// Next `query.limit` active providers in feed order after `query.anchor`,
    /// matching `query.filters`, excluding the viewer's own profile and every
    /// provider the viewer already interacted with
    async fn query_candidates(&self, query: &CandidateQuery) -> StoreResult<Vec<ProviderProfile>>;

    async fn get_preferences(&self, user_id: &str) -> StoreResult<Option<DiscoveryPreferences>>;

    async fn save_preferences(&self, user_id: &str, filters: &DiscoveryFilters) -> StoreResult<DiscoveryPreferences>;

    /// Insert or update the single interaction row for (user, provider)
    async fn upsert_interaction(
        &self,
        user_id: &str,
        provider_id: &str,
        interaction_type: InteractionType,
    ) -> StoreResult<Interaction>;

    async fn list_interactions(
        &self,
        user_id: &str,
        interaction_type: Option<InteractionType>,
    ) -> StoreResult<Vec<Interaction>>;

    async fn remove_interaction(&self, user_id: &str, provider_id: &str) -> StoreResult<bool>;

    async fn interaction_stats(&self, user_id: &str) -> StoreResult<InteractionStats>;

    async fn health_check(&self) -> StoreResult<bool>;
}

#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn list_packages(&self) -> StoreResult<Vec<VipPackage>>;

    async fn get_package(&self, package_id: &str) -> StoreResult<Option<VipPackage>>;

    /// Active, unexpired subscription of the user
    async fn active_subscription(&self, user_id: &str) -> StoreResult<Option<Subscription>>;

    /// Persist `subscription`, failing with `Conflict` when the user already
    /// holds an active one. Lapsed active rows are marked expired first.
    async fn create_subscription(&self, subscription: &Subscription) -> StoreResult<Subscription>;

    async fn get_subscription(&self, subscription_id: uuid::Uuid) -> StoreResult<Option<Subscription>>;

    async fn list_subscriptions(&self, user_id: &str) -> StoreResult<Vec<Subscription>>;

    async fn cancel_subscription(&self, subscription_id: uuid::Uuid) -> StoreResult<Subscription>;
}
