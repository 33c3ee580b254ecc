//! In-memory implementation of the store traits.
//!
//! Mirrors the PostgreSQL semantics (one interaction row per pair, one active
//! subscription per user) and is used by tests and the `memory` database
//! backend for local development.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::core::{select_after_anchor, FeedRequest};
use crate::models::{
    default_packages, CandidateQuery, DiscoveryFilters, DiscoveryPreferences, Interaction, InteractionStats,
    InteractionType, ProviderProfile, Subscription, SubscriptionStatus, VipPackage,
};
use crate::services::store::{DiscoveryStore, StoreError, StoreResult, SubscriptionStore};

#[derive(Default)]
struct State {
    providers: HashMap<String, ProviderProfile>,
    preferences: HashMap<String, DiscoveryPreferences>,
    interactions: HashMap<(String, String), Interaction>,
    packages: Vec<VipPackage>,
    subscriptions: Vec<Subscription>,
}

pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    /// Empty store seeded with the default VIP catalogue
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State {
                packages: default_packages(),
                ..Default::default()
            }),
        }
    }

    pub fn with_providers(providers: impl IntoIterator<Item = ProviderProfile>) -> Self {
        Self {
            state: RwLock::new(State {
                providers: providers.into_iter().map(|p| (p.id.clone(), p)).collect(),
                packages: default_packages(),
                ..Default::default()
            }),
        }
    }

    /// Insert or replace a provider profile
    pub async fn put_provider(&self, provider: ProviderProfile) {
        let mut state = self.state.write().await;
        state.providers.insert(provider.id.clone(), provider);
    }

    pub async fn remove_provider(&self, provider_id: &str) -> bool {
        self.state.write().await.providers.remove(provider_id).is_some()
    }

    pub async fn put_package(&self, package: VipPackage) {
        let mut state = self.state.write().await;
        state.packages.retain(|p| p.id != package.id);
        state.packages.push(package);
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DiscoveryStore for InMemoryStore {
    async fn get_provider(&self, provider_id: &str) -> StoreResult<Option<ProviderProfile>> {
        Ok(self.state.read().await.providers.get(provider_id).cloned())
    }

    async fn query_candidates(&self, query: &CandidateQuery) -> StoreResult<Vec<ProviderProfile>> {
        let state = self.state.read().await;

        let eligible: Vec<ProviderProfile> = state
            .providers
            .values()
            .filter(|p| {
                !state
                    .interactions
                    .contains_key(&(query.viewer_id.clone(), p.id.clone()))
            })
            .cloned()
            .collect();

        let request = FeedRequest {
            viewer_id: &query.viewer_id,
            filters: &query.filters,
            origin: query.origin,
            anchor: query.anchor.as_ref(),
            limit: query.limit,
        };

        Ok(select_after_anchor(&request, eligible)
            .into_iter()
            .take(query.limit)
            .map(|candidate| candidate.profile)
            .collect())
    }

    async fn get_preferences(&self, user_id: &str) -> StoreResult<Option<DiscoveryPreferences>> {
        Ok(self.state.read().await.preferences.get(user_id).cloned())
    }

    async fn save_preferences(&self, user_id: &str, filters: &DiscoveryFilters) -> StoreResult<DiscoveryPreferences> {
        let preferences = DiscoveryPreferences {
            user_id: user_id.to_string(),
            filters: filters.clone(),
            updated_at: Some(Utc::now()),
        };
        self.state
            .write()
            .await
            .preferences
            .insert(user_id.to_string(), preferences.clone());
        Ok(preferences)
    }

    async fn upsert_interaction(
        &self,
        user_id: &str,
        provider_id: &str,
        interaction_type: InteractionType,
    ) -> StoreResult<Interaction> {
        let now = Utc::now();
        let mut state = self.state.write().await;

        let interaction = state
            .interactions
            .entry((user_id.to_string(), provider_id.to_string()))
            .and_modify(|existing| {
                existing.interaction_type = interaction_type;
                existing.value = interaction_type.value();
                existing.updated_at = now;
            })
            .or_insert_with(|| Interaction {
                id: Uuid::new_v4(),
                user_id: user_id.to_string(),
                provider_id: provider_id.to_string(),
                interaction_type,
                value: interaction_type.value(),
                created_at: now,
                updated_at: now,
            });

        Ok(interaction.clone())
    }

    async fn list_interactions(
        &self,
        user_id: &str,
        interaction_type: Option<InteractionType>,
    ) -> StoreResult<Vec<Interaction>> {
        let state = self.state.read().await;
        let mut interactions: Vec<Interaction> = state
            .interactions
            .values()
            .filter(|i| i.user_id == user_id)
            .filter(|i| interaction_type.map_or(true, |t| i.interaction_type == t))
            .cloned()
            .collect();

        interactions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.provider_id.cmp(&b.provider_id)));
        Ok(interactions)
    }

    async fn remove_interaction(&self, user_id: &str, provider_id: &str) -> StoreResult<bool> {
        Ok(self
            .state
            .write()
            .await
            .interactions
            .remove(&(user_id.to_string(), provider_id.to_string()))
            .is_some())
    }

    async fn interaction_stats(&self, user_id: &str) -> StoreResult<InteractionStats> {
        let state = self.state.read().await;
        let mut stats = InteractionStats {
            user_id: user_id.to_string(),
            ..Default::default()
        };

        for interaction in state.interactions.values().filter(|i| i.user_id == user_id) {
            stats.total += 1;
            match interaction.interaction_type {
                InteractionType::Like => stats.likes += 1,
                InteractionType::SuperLike => stats.super_likes += 1,
                InteractionType::Pass => stats.passes += 1,
                InteractionType::Block => stats.blocks += 1,
            }
            if stats.last_interaction_at.map_or(true, |last| interaction.updated_at > last) {
                stats.last_interaction_at = Some(interaction.updated_at);
            }
        }

        Ok(stats)
    }

    async fn health_check(&self) -> StoreResult<bool> {
        Ok(true)
    }
}

#[async_trait]
impl SubscriptionStore for InMemoryStore {
    async fn list_packages(&self) -> StoreResult<Vec<VipPackage>> {
        let state = self.state.read().await;
        let mut packages: Vec<VipPackage> = state.packages.iter().filter(|p| p.is_active).cloned().collect();
        packages.sort_by(|a, b| a.price.total_cmp(&b.price));
        Ok(packages)
    }

    async fn get_package(&self, package_id: &str) -> StoreResult<Option<VipPackage>> {
        let state = self.state.read().await;
        Ok(state.packages.iter().find(|p| p.id == package_id).cloned())
    }

    async fn active_subscription(&self, user_id: &str) -> StoreResult<Option<Subscription>> {
        let now = Utc::now();
        let state = self.state.read().await;
        Ok(state
            .subscriptions
            .iter()
            .find(|s| s.user_id == user_id && s.is_current(now))
            .cloned())
    }

    async fn create_subscription(&self, subscription: &Subscription) -> StoreResult<Subscription> {
        let now = Utc::now();
        let mut state = self.state.write().await;

        for existing in state.subscriptions.iter_mut() {
            if existing.user_id == subscription.user_id
                && existing.status == SubscriptionStatus::Active
                && !existing.is_current(now)
            {
                existing.status = SubscriptionStatus::Expired;
            }
        }

        if state
            .subscriptions
            .iter()
            .any(|s| s.user_id == subscription.user_id && s.status == SubscriptionStatus::Active)
        {
            return Err(StoreError::Conflict(format!(
                "user {} already has an active subscription",
                subscription.user_id
            )));
        }

        state.subscriptions.push(subscription.clone());
        Ok(subscription.clone())
    }

    async fn get_subscription(&self, subscription_id: Uuid) -> StoreResult<Option<Subscription>> {
        let state = self.state.read().await;
        Ok(state.subscriptions.iter().find(|s| s.id == subscription_id).cloned())
    }

    async fn list_subscriptions(&self, user_id: &str) -> StoreResult<Vec<Subscription>> {
        let state = self.state.read().await;
        let mut subscriptions: Vec<Subscription> =
            state.subscriptions.iter().filter(|s| s.user_id == user_id).cloned().collect();
        subscriptions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(subscriptions)
    }

    async fn cancel_subscription(&self, subscription_id: Uuid) -> StoreResult<Subscription> {
        let mut state = self.state.write().await;
        let subscription = state
            .subscriptions
            .iter_mut()
            .find(|s| s.id == subscription_id)
            .ok_or_else(|| StoreError::NotFound(format!("subscription {}", subscription_id)))?;

        subscription.status = SubscriptionStatus::Cancelled;
        subscription.cancelled_at = Some(Utc::now());
        Ok(subscription.clone())
    }
}
