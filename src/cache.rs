use std::ops::DerefMut;
use std::time::Duration;

use actix_web::web;
use diesel::r2d2;
use r2d2_redis::redis::{Commands, RedisError};
use r2d2_redis::RedisConnectionManager;

use crate::models::Catalog;
use crate::query::DbError;

pub type RedisPool = r2d2::Pool<RedisConnectionManager>;

const CACHE_POOL_MAX_OPEN: u32 = 16;
const CACHE_POOL_MIN_IDLE: u32 = 8;
const CACHE_POOL_EXPIRE_SECONDS: u64 = 60;
// a dead redis must not stall page loads
const CACHE_CONNECT_TIMEOUT_MILLIS: u64 = 250;

const CATALOG_KEY: &str = "random_food:catalog";

/// Outcome of a cache read.
#[derive(Debug, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(Catalog),
    Miss,
    /// redis could not be reached; writing back would only wait again
    Unavailable,
}

/// Best-effort redis cache for the category and type lists.
#[derive(Clone)]
pub struct CatalogCache {
    pool: RedisPool,
    ttl_secs: usize,
}

impl CatalogCache {
    pub fn connect(redis_url: &str, ttl_secs: usize) -> Result<Self, RedisError> {
        let manager = RedisConnectionManager::new(redis_url)?;
        // unchecked: startup proceeds without redis and the cache just misses
        let pool = r2d2::Pool::builder()
            .max_size(CACHE_POOL_MAX_OPEN)
            .max_lifetime(Some(Duration::from_secs(CACHE_POOL_EXPIRE_SECONDS)))
            .min_idle(Some(CACHE_POOL_MIN_IDLE))
            .connection_timeout(Duration::from_millis(CACHE_CONNECT_TIMEOUT_MILLIS))
            .build_unchecked(manager);
        Ok(Self { pool, ttl_secs })
    }

    fn read(&self) -> Result<Vec<u8>, DbError> {
        let mut conn = self.pool.get()?;
        let value: Vec<u8> = conn.deref_mut().get(CATALOG_KEY)?;
        Ok(value)
    }

    fn write(&self, catalog: &Catalog) -> Result<(), DbError> {
        let mut conn = self.pool.get()?;
        let value = catalog.to_u8()?;
        let _: () = conn.deref_mut().set_ex(CATALOG_KEY, value, self.ttl_secs)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), DbError> {
        let mut conn = self.pool.get()?;
        let _: () = conn.deref_mut().del(CATALOG_KEY)?;
        Ok(())
    }

    pub async fn get(&self) -> CacheLookup {
        let cache = self.clone();
        let value = match web::block(move || cache.read()).await {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                log::warn!("catalog cache read failed: {e}");
                return CacheLookup::Unavailable;
            }
            Err(e) => {
                log::warn!("catalog cache read failed: {e}");
                return CacheLookup::Unavailable;
            }
        };
        if value.is_empty() {
            return CacheLookup::Miss;
        }
        match Catalog::from_u8(value) {
            Ok(catalog) => CacheLookup::Hit(catalog),
            // stale layout from an older build, overwritten by the next put
            Err(e) => {
                log::warn!("discarding undecodable cached catalog: {e}");
                CacheLookup::Miss
            }
        }
    }

    pub async fn put(&self, catalog: Catalog) {
        let cache = self.clone();
        match web::block(move || cache.write(&catalog)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => log::warn!("catalog cache write failed: {e}"),
            Err(e) => log::warn!("catalog cache write failed: {e}"),
        }
    }

    /// Synchronous, for callers outside the actix runtime.
    pub fn invalidate(&self) {
        if let Err(e) = self.clear() {
            log::warn!("catalog cache invalidation failed: {e}");
        }
    }
}
