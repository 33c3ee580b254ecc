use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::time::Duration;
use uuid::Uuid;

use crate::core::FeedOrder;
use crate::models::{
    CandidateQuery, DiscoveryFilters, DiscoveryPreferences, GeoPoint, Interaction, InteractionStats, InteractionType,
    ProviderProfile, Subscription, VipPackage,
};
use crate::services::store::{DiscoveryStore, StoreError, StoreResult, SubscriptionStore};

const PROVIDER_COLUMNS: &str = "id, user_id, display_name, age, gender, hourly_rate, is_verified, rating, \
     review_count, latitude, longitude, bio, photo_urls, services, is_active, created_at";

const INTERACTION_COLUMNS: &str = "id, user_id, provider_id, interaction_type, value, created_at, updated_at";

const SUBSCRIPTION_COLUMNS: &str = "id, user_id, package_id, status, auto_renew, started_at, expires_at, cancelled_at";

/// PostgreSQL-backed store
///
/// The pool is built once at startup and handed to every request; sqlx
/// returns each connection to the pool when the query future completes.
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect and run pending migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Close the pool, waiting for checked-out connections to return
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn provider_from_row(row: &PgRow) -> Result<ProviderProfile, sqlx::Error> {
    Ok(ProviderProfile {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        display_name: row.try_get("display_name")?,
        age: row.try_get("age")?,
        gender: row.try_get("gender")?,
        hourly_rate: row.try_get("hourly_rate")?,
        is_verified: row.try_get("is_verified")?,
        rating: row.try_get("rating")?,
        review_count: row.try_get("review_count")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        bio: row.try_get("bio")?,
        photo_urls: row.try_get("photo_urls")?,
        services: row.try_get("services")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

fn interaction_from_row(row: &PgRow) -> Result<Interaction, sqlx::Error> {
    Ok(Interaction {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        provider_id: row.try_get("provider_id")?,
        interaction_type: row.try_get("interaction_type")?,
        value: row.try_get("value")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn preferences_from_row(row: &PgRow) -> Result<DiscoveryPreferences, sqlx::Error> {
    let sort_by: Option<String> = row.try_get("sort_by")?;

    Ok(DiscoveryPreferences {
        user_id: row.try_get("user_id")?,
        filters: DiscoveryFilters {
            min_age: row.try_get("min_age")?,
            max_age: row.try_get("max_age")?,
            min_price: row.try_get("min_price")?,
            max_price: row.try_get("max_price")?,
            verified_only: row.try_get("verified_only")?,
            gender_preferences: row.try_get("gender_preferences")?,
            // Unknown stored keys fall back to the default order
            sort_by: sort_by.and_then(|s| s.parse().ok()),
            max_distance_km: row.try_get("max_distance_km")?,
        },
        updated_at: row.try_get("updated_at")?,
    })
}

fn package_from_row(row: &PgRow) -> Result<VipPackage, sqlx::Error> {
    Ok(VipPackage {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: row.try_get("price")?,
        duration_days: row.try_get("duration_days")?,
        services: row.try_get("services")?,
        is_active: row.try_get("is_active")?,
    })
}

fn subscription_from_row(row: &PgRow) -> Result<Subscription, sqlx::Error> {
    Ok(Subscription {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        package_id: row.try_get("package_id")?,
        status: row.try_get("status")?,
        auto_renew: row.try_get("auto_renew")?,
        started_at: row.try_get("started_at")?,
        expires_at: row.try_get("expires_at")?,
        cancelled_at: row.try_get("cancelled_at")?,
    })
}

/// Ids compare bytewise, matching the in-process tie-break
const ID_ORDER: &str = r#"c.id COLLATE "C""#;

fn order_by(order: FeedOrder) -> String {
    let primary = match order {
        FeedOrder::Rating => "c.rating DESC, c.review_count DESC",
        FeedOrder::PriceAscending => "c.hourly_rate ASC",
        FeedOrder::PriceDescending => "c.hourly_rate DESC",
        FeedOrder::DistanceAscending => "c.distance_km ASC NULLS LAST",
        FeedOrder::Recency => "c.created_at DESC",
    };
    format!("{}, {}", primary, ID_ORDER)
}

enum Coordinate<'a> {
    Column(&'a str),
    Value(f64),
}

fn push_coordinate(sql: &mut QueryBuilder<'_, Postgres>, coordinate: &Coordinate<'_>) {
    match coordinate {
        Coordinate::Column(column) => {
            sql.push(column);
        }
        Coordinate::Value(value) => {
            sql.push_bind(*value).push("::DOUBLE PRECISION");
        }
    }
}

/// Haversine distance in km from `origin`, same formula as `core::distance`
fn push_haversine(sql: &mut QueryBuilder<'_, Postgres>, origin: GeoPoint, lat: Coordinate<'_>, lon: Coordinate<'_>) {
    sql.push("(6371.0 * 2 * ASIN(LEAST(1.0, SQRT(POWER(SIN(RADIANS(");
    push_coordinate(sql, &lat);
    sql.push(" - ")
        .push_bind(origin.latitude)
        .push("::DOUBLE PRECISION) / 2), 2) + COS(RADIANS(")
        .push_bind(origin.latitude)
        .push("::DOUBLE PRECISION)) * COS(RADIANS(");
    push_coordinate(sql, &lat);
    sql.push(")) * POWER(SIN(RADIANS(");
    push_coordinate(sql, &lon);
    sql.push(" - ")
        .push_bind(origin.longitude)
        .push("::DOUBLE PRECISION) / 2), 2)))))");
}

/// Rows strictly after `anchor` in `order`
///
/// The anchor's distance goes through the same SQL expression as the rows,
/// so the anchor itself never compares as "after".
fn push_seek(sql: &mut QueryBuilder<'_, Postgres>, order: FeedOrder, anchor: &ProviderProfile, origin: Option<GeoPoint>) {
    let id_after = format!(" AND {} > ", ID_ORDER);

    match order {
        FeedOrder::Rating => {
            sql.push("(c.rating < ")
                .push_bind(anchor.rating)
                .push(" OR (c.rating = ")
                .push_bind(anchor.rating)
                .push(" AND (c.review_count < ")
                .push_bind(anchor.review_count)
                .push(" OR (c.review_count = ")
                .push_bind(anchor.review_count)
                .push(id_after.as_str())
                .push_bind(anchor.id.clone())
                .push("))))");
        }
        FeedOrder::PriceAscending | FeedOrder::PriceDescending => {
            let beyond = if order == FeedOrder::PriceAscending { " > " } else { " < " };
            sql.push("(c.hourly_rate")
                .push(beyond)
                .push_bind(anchor.hourly_rate)
                .push(" OR (c.hourly_rate = ")
                .push_bind(anchor.hourly_rate)
                .push(id_after.as_str())
                .push_bind(anchor.id.clone())
                .push("))");
        }
        FeedOrder::Recency => {
            sql.push("(c.created_at < ")
                .push_bind(anchor.created_at)
                .push(" OR (c.created_at = ")
                .push_bind(anchor.created_at)
                .push(id_after.as_str())
                .push_bind(anchor.id.clone())
                .push("))");
        }
        FeedOrder::DistanceAscending => match (origin, anchor.location()) {
            (Some(origin), Some(location)) => {
                sql.push("(c.distance_km IS NULL OR c.distance_km > ");
                push_haversine(sql, origin, Coordinate::Value(location.latitude), Coordinate::Value(location.longitude));
                sql.push(" OR (c.distance_km = ");
                push_haversine(sql, origin, Coordinate::Value(location.latitude), Coordinate::Value(location.longitude));
                sql.push(id_after.as_str()).push_bind(anchor.id.clone()).push("))");
            }
            // Anchor without a distance sits among the trailing NULL rows
            _ => {
                sql.push("(c.distance_km IS NULL")
                    .push(id_after.as_str())
                    .push_bind(anchor.id.clone())
                    .push(")");
            }
        },
    }
}

#[async_trait]
impl DiscoveryStore for PostgresStore {
    async fn get_provider(&self, provider_id: &str) -> StoreResult<Option<ProviderProfile>> {
        let query = format!("SELECT {} FROM provider_profiles WHERE id = $1", PROVIDER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(provider_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(provider_from_row).transpose()?)
    }

    /// Next candidates in feed order, with prior interactions removed through
    /// a NOT EXISTS subquery over `discovery_interactions`
    ///
    /// Ordering, radius and the keyset seek past the anchor all run in SQL so
    /// only `query.limit` rows leave the database.
    async fn query_candidates(&self, query: &CandidateQuery) -> StoreResult<Vec<ProviderProfile>> {
        let filters = &query.filters;
        let order = FeedOrder::resolve(filters.sort_by, query.origin.is_some());

        let mut sql: QueryBuilder<'_, Postgres> = QueryBuilder::new("SELECT ");
        sql.push(PROVIDER_COLUMNS).push(" FROM (SELECT p.*, ");
        match query.origin {
            Some(origin) => {
                push_haversine(&mut sql, origin, Coordinate::Column("p.latitude"), Coordinate::Column("p.longitude"))
            }
            None => {
                sql.push("NULL::DOUBLE PRECISION");
            }
        }

        sql.push(" AS distance_km FROM provider_profiles p WHERE p.is_active = TRUE AND p.user_id <> ")
            .push_bind(query.viewer_id.as_str())
            .push(" AND p.id <> ")
            .push_bind(query.viewer_id.as_str())
            .push(" AND NOT EXISTS (SELECT 1 FROM discovery_interactions i WHERE i.user_id = ")
            .push_bind(query.viewer_id.as_str())
            .push(" AND i.provider_id = p.id)");

        if let Some(min_age) = filters.min_age {
            sql.push(" AND p.age >= ").push_bind(min_age);
        }
        if let Some(max_age) = filters.max_age {
            sql.push(" AND p.age <= ").push_bind(max_age);
        }
        if let Some(min_price) = filters.min_price {
            sql.push(" AND p.hourly_rate >= ").push_bind(min_price);
        }
        if let Some(max_price) = filters.max_price {
            sql.push(" AND p.hourly_rate <= ").push_bind(max_price);
        }
        if filters.verified_only() {
            sql.push(" AND p.is_verified = TRUE");
        }

        let genders: Vec<String> = filters
            .gender_preferences
            .iter()
            .flatten()
            .map(|g| g.to_lowercase())
            .collect();
        if !genders.is_empty() {
            sql.push(" AND lower(p.gender) = ANY(").push_bind(genders).push(")");
        }

        sql.push(") c WHERE TRUE");

        if let (Some(_), Some(radius)) = (query.origin, filters.max_distance_km) {
            sql.push(" AND c.distance_km <= ").push_bind(radius);
        }
        if let Some(anchor) = &query.anchor {
            sql.push(" AND ");
            push_seek(&mut sql, order, anchor, query.origin);
        }

        sql.push(" ORDER BY ")
            .push(order_by(order))
            .push(" LIMIT ")
            .push_bind(query.limit as i64);

        let rows = sql.build().fetch_all(&self.pool).await?;

        let candidates = rows
            .iter()
            .map(provider_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Queried {} candidates for {}", candidates.len(), query.viewer_id);

        Ok(candidates)
    }

    async fn get_preferences(&self, user_id: &str) -> StoreResult<Option<DiscoveryPreferences>> {
        let row = sqlx::query("SELECT * FROM discovery_preferences WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(preferences_from_row).transpose()?)
    }

    async fn save_preferences(&self, user_id: &str, filters: &DiscoveryFilters) -> StoreResult<DiscoveryPreferences> {
        let query = r#"
            INSERT INTO discovery_preferences
                (user_id, min_age, max_age, min_price, max_price, verified_only,
                 gender_preferences, sort_by, max_distance_km, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                min_age = EXCLUDED.min_age,
                max_age = EXCLUDED.max_age,
                min_price = EXCLUDED.min_price,
                max_price = EXCLUDED.max_price,
                verified_only = EXCLUDED.verified_only,
                gender_preferences = EXCLUDED.gender_preferences,
                sort_by = EXCLUDED.sort_by,
                max_distance_km = EXCLUDED.max_distance_km,
                updated_at = EXCLUDED.updated_at
            RETURNING *
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .bind(filters.min_age)
            .bind(filters.max_age)
            .bind(filters.min_price)
            .bind(filters.max_price)
            .bind(filters.verified_only)
            .bind(&filters.gender_preferences)
            .bind(filters.sort_by.map(|s| s.as_str()))
            .bind(filters.max_distance_km)
            .fetch_one(&self.pool)
            .await?;

        Ok(preferences_from_row(&row)?)
    }

    /// Uses INSERT ... ON CONFLICT so a repeat interaction updates the
    /// existing row (type, value, updated_at) and keeps its id.
    async fn upsert_interaction(
        &self,
        user_id: &str,
        provider_id: &str,
        interaction_type: InteractionType,
    ) -> StoreResult<Interaction> {
        let query = format!(
            r#"
            INSERT INTO discovery_interactions
                (id, user_id, provider_id, interaction_type, value, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            ON CONFLICT (user_id, provider_id)
            DO UPDATE SET
                interaction_type = EXCLUDED.interaction_type,
                value = EXCLUDED.value,
                updated_at = EXCLUDED.updated_at
            RETURNING {}
            "#,
            INTERACTION_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(provider_id)
            .bind(interaction_type)
            .bind(interaction_type.value())
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!("Recorded interaction: {} -> {} ({})", user_id, provider_id, interaction_type);

        Ok(interaction_from_row(&row)?)
    }

    async fn list_interactions(
        &self,
        user_id: &str,
        interaction_type: Option<InteractionType>,
    ) -> StoreResult<Vec<Interaction>> {
        let query = format!(
            r#"
            SELECT {}
            FROM discovery_interactions
            WHERE user_id = $1 AND ($2::interaction_type IS NULL OR interaction_type = $2)
            ORDER BY updated_at DESC, provider_id
            "#,
            INTERACTION_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id)
            .bind(interaction_type)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(interaction_from_row).collect::<Result<Vec<_>, _>>()?)
    }

    async fn remove_interaction(&self, user_id: &str, provider_id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM discovery_interactions WHERE user_id = $1 AND provider_id = $2")
            .bind(user_id)
            .bind(provider_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn interaction_stats(&self, user_id: &str) -> StoreResult<InteractionStats> {
        let query = r#"
            SELECT
                COUNT(*) as total,
                COUNT(*) FILTER (WHERE interaction_type = 'like') as likes,
                COUNT(*) FILTER (WHERE interaction_type = 'super_like') as super_likes,
                COUNT(*) FILTER (WHERE interaction_type = 'pass') as passes,
                COUNT(*) FILTER (WHERE interaction_type = 'block') as blocks,
                MAX(updated_at) as last_interaction_at
            FROM discovery_interactions
            WHERE user_id = $1
        "#;

        let row = sqlx::query(query).bind(user_id).fetch_one(&self.pool).await?;

        Ok(InteractionStats {
            user_id: user_id.to_string(),
            total: row.try_get("total")?,
            likes: row.try_get("likes")?,
            super_likes: row.try_get("super_likes")?,
            passes: row.try_get("passes")?,
            blocks: row.try_get("blocks")?,
            last_interaction_at: row.try_get("last_interaction_at")?,
        })
    }

    async fn health_check(&self) -> StoreResult<bool> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

#[async_trait]
impl SubscriptionStore for PostgresStore {
    async fn list_packages(&self) -> StoreResult<Vec<VipPackage>> {
        let rows = sqlx::query("SELECT * FROM vip_packages WHERE is_active = TRUE ORDER BY price")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(package_from_row).collect::<Result<Vec<_>, _>>()?)
    }

    async fn get_package(&self, package_id: &str) -> StoreResult<Option<VipPackage>> {
        let row = sqlx::query("SELECT * FROM vip_packages WHERE id = $1")
            .bind(package_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(package_from_row).transpose()?)
    }

    async fn active_subscription(&self, user_id: &str) -> StoreResult<Option<Subscription>> {
        let query = format!(
            "SELECT {} FROM subscriptions WHERE user_id = $1 AND status = 'active' AND expires_at > NOW()",
            SUBSCRIPTION_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(subscription_from_row).transpose()?)
    }

    /// Expires lapsed rows and inserts in one transaction; the partial
    /// unique index `uq_subscriptions_one_active` rejects a second active row.
    async fn create_subscription(&self, subscription: &Subscription) -> StoreResult<Subscription> {
        let mut tx = self.pool.begin().await?;

        let expired = sqlx::query(
            "UPDATE subscriptions SET status = 'expired' \
             WHERE user_id = $1 AND status = 'active' AND expires_at <= NOW()",
        )
        .bind(&subscription.user_id)
        .execute(&mut *tx)
        .await?;

        if expired.rows_affected() > 0 {
            tracing::info!(
                "Expired {} lapsed subscription(s) for user {}",
                expired.rows_affected(),
                subscription.user_id
            );
        }

        let query = format!(
            r#"
            INSERT INTO subscriptions ({cols})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {cols}
            "#,
            cols = SUBSCRIPTION_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(subscription.id)
            .bind(&subscription.user_id)
            .bind(&subscription.package_id)
            .bind(subscription.status)
            .bind(subscription.auto_renew)
            .bind(subscription.started_at)
            .bind(subscription.expires_at)
            .bind(subscription.cancelled_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => StoreError::Conflict(format!(
                    "user {} already has an active subscription",
                    subscription.user_id
                )),
                other => StoreError::SqlxError(other),
            })?;

        let created = subscription_from_row(&row)?;
        tx.commit().await?;

        Ok(created)
    }

    async fn get_subscription(&self, subscription_id: Uuid) -> StoreResult<Option<Subscription>> {
        let query = format!("SELECT {} FROM subscriptions WHERE id = $1", SUBSCRIPTION_COLUMNS);

        let row = sqlx::query(&query)
            .bind(subscription_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(subscription_from_row).transpose()?)
    }

    async fn list_subscriptions(&self, user_id: &str) -> StoreResult<Vec<Subscription>> {
        let query = format!(
            "SELECT {} FROM subscriptions WHERE user_id = $1 ORDER BY started_at DESC",
            SUBSCRIPTION_COLUMNS
        );

        let rows = sqlx::query(&query).bind(user_id).fetch_all(&self.pool).await?;

        Ok(rows.iter().map(subscription_from_row).collect::<Result<Vec<_>, _>>()?)
    }

    async fn cancel_subscription(&self, subscription_id: Uuid) -> StoreResult<Subscription> {
        let query = format!(
            "UPDATE subscriptions SET status = 'cancelled', cancelled_at = NOW() WHERE id = $1 RETURNING {}",
            SUBSCRIPTION_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(subscription_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("subscription {}", subscription_id)))?;

        Ok(subscription_from_row(&row)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn anchor() -> ProviderProfile {
        ProviderProfile {
            id: "p1".to_string(),
            user_id: "u-p1".to_string(),
            display_name: "p1".to_string(),
            age: 30,
            gender: "female".to_string(),
            hourly_rate: 100.0,
            is_verified: true,
            rating: 4.5,
            review_count: 12,
            latitude: Some(40.7),
            longitude: Some(-74.0),
            bio: None,
            photo_urls: vec![],
            services: vec![],
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn balanced(sql: &str) -> bool {
        sql.chars().filter(|c| *c == '(').count() == sql.chars().filter(|c| *c == ')').count()
    }

    #[test]
    fn test_order_by_ends_with_bytewise_id() {
        assert_eq!(
            order_by(FeedOrder::Rating),
            r#"c.rating DESC, c.review_count DESC, c.id COLLATE "C""#
        );
        assert!(order_by(FeedOrder::DistanceAscending).starts_with("c.distance_km ASC NULLS LAST"));
    }

    #[test]
    fn test_seek_clauses_are_well_formed() {
        let origin = GeoPoint { latitude: 40.0, longitude: -73.0 };
        let orders = [
            FeedOrder::Rating,
            FeedOrder::PriceAscending,
            FeedOrder::PriceDescending,
            FeedOrder::DistanceAscending,
            FeedOrder::Recency,
        ];

        for order in orders {
            let mut sql: QueryBuilder<'_, Postgres> = QueryBuilder::new("");
            push_seek(&mut sql, order, &anchor(), Some(origin));
            assert!(balanced(sql.sql()), "{:?}: {}", order, sql.sql());
            assert!(sql.sql().contains(r#"c.id COLLATE "C" > "#));
        }
    }

    #[test]
    fn test_distance_seek_without_anchor_location() {
        let mut unplaced = anchor();
        unplaced.latitude = None;
        unplaced.longitude = None;

        let mut sql: QueryBuilder<'_, Postgres> = QueryBuilder::new("");
        let origin = GeoPoint { latitude: 40.0, longitude: -73.0 };
        push_seek(&mut sql, FeedOrder::DistanceAscending, &unplaced, Some(origin));

        assert!(sql.sql().starts_with("(c.distance_km IS NULL AND"));
        assert!(balanced(sql.sql()));
    }

    #[test]
    fn test_haversine_expression_is_balanced() {
        let mut sql: QueryBuilder<'_, Postgres> = QueryBuilder::new("");
        let origin = GeoPoint { latitude: 0.0, longitude: 0.0 };
        push_haversine(&mut sql, origin, Coordinate::Column("p.latitude"), Coordinate::Column("p.longitude"));

        assert!(balanced(sql.sql()));
        assert!(sql.sql().contains("COS(RADIANS(p.latitude))"));
    }
}
