use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::models::{CreateSubscriptionRequest, Subscription, SubscriptionStatus, VipPackage};
use crate::services::cache::{CacheKey, CacheManager};
use crate::services::store::{StoreError, SubscriptionStore};

const ALREADY_ACTIVE: &str = "User already has an active subscription";

/// VIP package catalogue and subscriptions
#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn SubscriptionStore>,
    cache: Arc<CacheManager>,
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn SubscriptionStore>, cache: Arc<CacheManager>) -> Self {
        Self { store, cache }
    }

    pub async fn list_packages(&self) -> Result<Vec<VipPackage>, ApiError> {
        let key = CacheKey::packages();
        if let Ok(Some(packages)) = self.cache.get::<Vec<VipPackage>>(&key).await {
            return Ok(packages);
        }

        let packages = self.store.list_packages().await?;
        if let Err(e) = self.cache.set(&key, &packages).await {
            tracing::warn!("Failed to cache VIP packages: {}", e);
        }
        Ok(packages)
    }

    /// Subscribe `user_id` to a package; at most one active subscription per user
    pub async fn create(&self, user_id: &str, request: &CreateSubscriptionRequest) -> Result<Subscription, ApiError> {
        let package = self
            .store
            .get_package(&request.package_id)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| ApiError::not_found("Package not found"))?;

        if self.store.active_subscription(user_id).await?.is_some() {
            return Err(ApiError::bad_request(ALREADY_ACTIVE));
        }

        let subscription = Subscription::start(user_id, &package, request.auto_renew, Utc::now());
        let created = self
            .store
            .create_subscription(&subscription)
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => ApiError::bad_request(ALREADY_ACTIVE),
                other => other.into(),
            })?;

        tracing::info!(
            "User {} subscribed to {} until {}",
            user_id,
            package.id,
            created.expires_at
        );

        Ok(created)
    }

    pub async fn current(&self, user_id: &str) -> Result<Subscription, ApiError> {
        self.store
            .active_subscription(user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("No active subscription"))
    }

    pub async fn history(&self, user_id: &str) -> Result<Vec<Subscription>, ApiError> {
        Ok(self.store.list_subscriptions(user_id).await?)
    }

    /// Cancel one of the user's own active subscriptions
    pub async fn cancel(&self, user_id: &str, subscription_id: Uuid) -> Result<Subscription, ApiError> {
        let subscription = self
            .store
            .get_subscription(subscription_id)
            .await?
            .filter(|s| s.user_id == user_id)
            .ok_or_else(|| ApiError::not_found("Subscription not found"))?;

        if subscription.status != SubscriptionStatus::Active {
            return Err(ApiError::bad_request("Subscription is not active"));
        }

        let cancelled = self.store.cancel_subscription(subscription_id).await?;
        tracing::info!("User {} cancelled subscription {}", user_id, subscription_id);
        Ok(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory::InMemoryStore;

    fn service() -> SubscriptionService {
        SubscriptionService::new(Arc::new(InMemoryStore::new()), Arc::new(CacheManager::in_memory(10, 60)))
    }

    fn request(package_id: &str) -> CreateSubscriptionRequest {
        CreateSubscriptionRequest {
            package_id: package_id.to_string(),
            auto_renew: false,
        }
    }

    #[tokio::test]
    async fn test_second_active_subscription_rejected() {
        let svc = service();
        svc.create("u1", &request("gold")).await.unwrap();

        let err = svc.create("u1", &request("silver")).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == ALREADY_ACTIVE));
    }

    #[tokio::test]
    async fn test_resubscribe_after_cancel() {
        let svc = service();
        let first = svc.create("u1", &request("gold")).await.unwrap();
        svc.cancel("u1", first.id).await.unwrap();

        let second = svc.create("u1", &request("platinum")).await.unwrap();
        assert_eq!(second.status, SubscriptionStatus::Active);
        assert_eq!(svc.current("u1").await.unwrap().id, second.id);
        assert_eq!(svc.history("u1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_package() {
        let svc = service();
        assert!(matches!(
            svc.create("u1", &request("diamond")).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_inactive_package_not_offered() {
        let store = Arc::new(InMemoryStore::new());
        let mut retired = store.get_package("gold").await.unwrap().unwrap();
        retired.is_active = false;
        store.put_package(retired).await;

        let svc = SubscriptionService::new(store, Arc::new(CacheManager::in_memory(10, 60)));

        assert!(matches!(
            svc.create("u1", &request("gold")).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
        let ids: Vec<_> = svc.list_packages().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["silver", "platinum"]);
    }

    #[tokio::test]
    async fn test_cancel_foreign_subscription_not_found() {
        let svc = service();
        let sub = svc.create("u1", &request("gold")).await.unwrap();

        assert!(matches!(svc.cancel("u2", sub.id).await.unwrap_err(), ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_cancel_twice_rejected() {
        let svc = service();
        let sub = svc.create("u1", &request("gold")).await.unwrap();
        svc.cancel("u1", sub.id).await.unwrap();

        assert!(matches!(svc.cancel("u1", sub.id).await.unwrap_err(), ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_packages_sorted_by_price() {
        let packages = service().list_packages().await.unwrap();
        let ids: Vec<_> = packages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["silver", "gold", "platinum"]);
    }
}
