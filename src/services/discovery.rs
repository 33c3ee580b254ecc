use std::sync::Arc;

use crate::core::{DiscoveryFeed, FeedRequest};
use crate::errors::ApiError;
use crate::models::{
    CandidateQuery, DiscoveryCardsQuery, DiscoveryCardsResponse, DiscoveryFilters, DiscoveryPreferences, Interaction,
    InteractionStats, InteractionType, PreferencesUpdate,
};
use crate::services::cache::{CacheKey, CacheManager};
use crate::services::store::DiscoveryStore;

/// Discovery operations: card feed, interactions and preferences
#[derive(Clone)]
pub struct DiscoveryService {
    store: Arc<dyn DiscoveryStore>,
    cache: Arc<CacheManager>,
    feed: DiscoveryFeed,
    default_page_size: usize,
}

impl DiscoveryService {
    pub fn new(
        store: Arc<dyn DiscoveryStore>,
        cache: Arc<CacheManager>,
        feed: DiscoveryFeed,
        default_page_size: usize,
    ) -> Self {
        Self {
            store,
            cache,
            default_page_size: feed.page_limit(default_page_size),
            feed,
        }
    }

    /// One page of the card feed for `user_id`
    pub async fn get_cards(&self, user_id: &str, query: &DiscoveryCardsQuery) -> Result<DiscoveryCardsResponse, ApiError> {
        let requested = query.filters().map_err(ApiError::BadRequest)?;
        let origin = query.origin().map_err(ApiError::BadRequest)?;

        let stored = self.preferences(user_id).await?;
        let filters = requested.merge_with(&stored.filters);
        filters.validate_ranges().map_err(ApiError::BadRequest)?;

        let anchor = match query.cursor.as_deref().filter(|c| !c.is_empty()) {
            Some(cursor) => Some(
                self.store
                    .get_provider(cursor)
                    .await?
                    .ok_or_else(|| ApiError::bad_request("Invalid cursor"))?,
            ),
            None => None,
        };

        let limit = self
            .feed
            .page_limit(query.limit.map(usize::from).unwrap_or(self.default_page_size));

        // One extra row tells whether another page exists
        let candidates = self
            .store
            .query_candidates(&CandidateQuery {
                viewer_id: user_id.to_string(),
                filters: filters.clone(),
                origin,
                anchor: anchor.clone(),
                limit: limit + 1,
            })
            .await?;

        let page = self.feed.build_page(
            &FeedRequest {
                viewer_id: user_id,
                filters: &filters,
                origin,
                anchor: anchor.as_ref(),
                limit,
            },
            candidates,
        );

        tracing::info!(
            "Returning {} cards for user {} (from {} candidates, has_more={})",
            page.cards.len(),
            user_id,
            page.total_candidates,
            page.has_more
        );

        Ok(DiscoveryCardsResponse {
            providers: page.cards,
            has_more: page.has_more,
            next_cursor: page.next_cursor,
        })
    }

    /// Record or update the user's interaction with a provider
    pub async fn interact(
        &self,
        user_id: &str,
        provider_id: &str,
        interaction_type: InteractionType,
    ) -> Result<Interaction, ApiError> {
        let provider = self
            .store
            .get_provider(provider_id)
            .await?
            .ok_or_else(|| ApiError::not_found("Provider not found"))?;

        if provider.user_id == user_id || provider.id == user_id {
            return Err(ApiError::bad_request("Cannot interact with your own profile"));
        }

        let interaction = self
            .store
            .upsert_interaction(user_id, provider_id, interaction_type)
            .await?;

        tracing::info!("User {} recorded {} on provider {}", user_id, interaction_type, provider_id);

        Ok(interaction)
    }

    /// Remove an interaction so the provider becomes eligible again
    pub async fn undo_interaction(&self, user_id: &str, provider_id: &str) -> Result<bool, ApiError> {
        let removed = self.store.remove_interaction(user_id, provider_id).await?;
        if !removed {
            return Err(ApiError::not_found("Interaction not found"));
        }

        tracing::info!("User {} undid interaction on provider {}", user_id, provider_id);
        Ok(removed)
    }

    pub async fn list_interactions(
        &self,
        user_id: &str,
        interaction_type: Option<InteractionType>,
    ) -> Result<Vec<Interaction>, ApiError> {
        Ok(self.store.list_interactions(user_id, interaction_type).await?)
    }

    pub async fn interaction_stats(&self, user_id: &str) -> Result<InteractionStats, ApiError> {
        Ok(self.store.interaction_stats(user_id).await?)
    }

    /// Stored preferences; an empty set when the user never saved any
    pub async fn preferences(&self, user_id: &str) -> Result<DiscoveryPreferences, ApiError> {
        let key = CacheKey::preferences(user_id);

        match self.cache.get::<DiscoveryPreferences>(&key).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(e) => tracing::warn!("Failed to read cached preferences for {}: {}", user_id, e),
        }

        let preferences = self
            .store
            .get_preferences(user_id)
            .await?
            .unwrap_or_else(|| DiscoveryPreferences::empty(user_id));

        if let Err(e) = self.cache.set(&key, &preferences).await {
            tracing::warn!("Failed to cache preferences for {}: {}", user_id, e);
        }

        Ok(preferences)
    }

    pub async fn update_preferences(
        &self,
        user_id: &str,
        update: PreferencesUpdate,
    ) -> Result<DiscoveryPreferences, ApiError> {
        let filters = DiscoveryFilters::from(update);
        filters.validate_ranges().map_err(ApiError::BadRequest)?;

        let saved = self.store.save_preferences(user_id, &filters).await?;

        if let Err(e) = self.cache.delete(&CacheKey::preferences(user_id)).await {
            tracing::warn!("Failed to invalidate cached preferences for {}: {}", user_id, e);
        }

        tracing::info!("Updated discovery preferences for user {}", user_id);
        Ok(saved)
    }

    pub async fn health_check(&self) -> bool {
        self.store.health_check().await.unwrap_or(false)
    }
}
