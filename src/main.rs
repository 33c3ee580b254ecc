use actix_cors::Cors;
use actix_web::{middleware, App, HttpServer};
use companion_discovery::auth::JwtValidator;
use companion_discovery::config::{DatabaseBackend, LoggingSettings, Settings};
use companion_discovery::core::DiscoveryFeed;
use companion_discovery::routes::{self, AppState};
use companion_discovery::services::{
    CacheManager, DiscoveryService, DiscoveryStore, InMemoryStore, PostgresStore, SubscriptionService,
    SubscriptionStore,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingSettings) {
    // RUST_LOG takes precedence over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing(&LoggingSettings::default());
            return Err(startup_error("Configuration error", e));
        }
    };

    init_tracing(&settings.logging);
    info!("Starting companion discovery service...");

    let cache_ttl = settings.cache.ttl_secs.unwrap_or(300);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(10_000);
    let cache = Arc::new(CacheManager::new(settings.cache.redis_url.as_deref(), l1_cache_size, cache_ttl).await);

    info!(
        "Cache manager initialized (L1: {} entries, TTL: {}s, redis: {})",
        l1_cache_size,
        cache_ttl,
        cache.has_redis()
    );

    let mut postgres: Option<Arc<PostgresStore>> = None;
    let (discovery_store, subscription_store) = match settings.database.backend {
        DatabaseBackend::Postgres => {
            let db = &settings.database;
            let url = db
                .url
                .as_deref()
                .ok_or_else(|| startup_error("Configuration error", "database.url is not set"))?;

            let store = Arc::new(
                PostgresStore::from_settings(
                    url,
                    db.max_connections,
                    db.min_connections,
                    db.acquire_timeout_secs,
                    db.idle_timeout_secs,
                )
                .await
                .map_err(|e| startup_error("PostgreSQL connection error", e))?,
            );
            info!("PostgreSQL store initialized (max: {} connections)", db.max_connections.unwrap_or(10));

            postgres = Some(store.clone());
            (
                store.clone() as Arc<dyn DiscoveryStore>,
                store as Arc<dyn SubscriptionStore>,
            )
        }
        DatabaseBackend::Memory => {
            warn!("Using the in-memory store; data is lost on restart");
            let store = Arc::new(InMemoryStore::new());
            (
                store.clone() as Arc<dyn DiscoveryStore>,
                store as Arc<dyn SubscriptionStore>,
            )
        }
    };

    let feed = DiscoveryFeed::new(settings.discovery.max_page_size);
    let app_state = AppState {
        discovery: DiscoveryService::new(
            discovery_store,
            cache.clone(),
            feed,
            settings.discovery.default_page_size,
        ),
        subscriptions: SubscriptionService::new(subscription_store, cache),
        jwt: Arc::new(JwtValidator::new(&settings.auth.jwt_secret, settings.auth.leeway_secs)),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    let result = HttpServer::new(move || {
        App::new()
            .configure(routes::configure_app(app_state.clone()))
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await;

    if let Some(store) = postgres {
        info!("Closing PostgreSQL pool");
        store.close().await;
    }

    result
}
