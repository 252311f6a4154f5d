use diesel::SqliteConnection;
use tera::Tera;

use crate::cache::{CacheLookup, CatalogCache};
use crate::config::Config;
use crate::db::{self, CircuitBreakerType, DbPool};
use crate::error::AppError;
use crate::models::Catalog;
use crate::query::{self, DbError};
use crate::templates;

/// Shared by every worker through `web::Data<AppState>`.
pub struct AppState {
    pub config: Config,
    pub pool: DbPool,
    pub cache: Option<CatalogCache>,
    pub circuit_breaker: CircuitBreakerType,
    pub templates: Tera,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, DbError> {
        let pool = db::init_pool(&config)?;

        let cache = match config.redis_url.as_deref() {
            Some(url) => {
                log::info!("caching catalog in redis at {url}");
                Some(CatalogCache::connect(url, config.cache_ttl_secs)?)
            }
            None => None,
        };

        Ok(Self {
            pool,
            cache,
            circuit_breaker: failsafe::Config::new().build(),
            templates: templates::load()?,
            config,
        })
    }

    /// Runs a query on the blocking pool, guarded by the circuit breaker.
    pub async fn db<F, T>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&SqliteConnection) -> Result<T, DbError> + Send + 'static,
        T: Send + 'static,
    {
        db::run(&self.pool, &self.circuit_breaker, f).await
    }

    pub async fn catalog(&self) -> Result<Catalog, AppError> {
        let lookup = match &self.cache {
            Some(cache) => cache.get().await,
            None => CacheLookup::Unavailable,
        };
        let write_back = match lookup {
            CacheLookup::Hit(catalog) => return Ok(catalog),
            CacheLookup::Miss => true,
            CacheLookup::Unavailable => false,
        };

        let catalog = self.db(query::load_catalog).await?;
        if let Some(cache) = self.cache.as_ref().filter(|_| write_back) {
            cache.put(catalog.clone()).await;
        }
        Ok(catalog)
    }

    pub async fn profile_id(&self, user_id: i32) -> Result<i32, AppError> {
        let profile = self
            .db(move |conn| query::get_or_create_profile(user_id, conn))
            .await?;
        Ok(profile.id)
    }
}
