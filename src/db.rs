use actix_web::web;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use failsafe::backoff::EqualJittered;
use failsafe::failure_policy::{ConsecutiveFailures, OrElse, SuccessRateOverTimeWindow};
use failsafe::{CircuitBreaker, StateMachine};

use crate::config::Config;
use crate::error::AppError;
use crate::query::DbError;

embed_migrations!("migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

pub type CircuitBreakerType = StateMachine<
    OrElse<SuccessRateOverTimeWindow<EqualJittered>, ConsecutiveFailures<EqualJittered>>,
    (),
>;

const MEMORY_DATABASE: &str = ":memory:";

// sqlite leaves foreign keys off unless asked, per connection
#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(r2d2::Error::QueryError)
    }
}

/// Builds the pool and brings the schema up to date.
pub fn init_pool(config: &Config) -> Result<DbPool, DbError> {
    // every in-memory connection is its own database, so share exactly one
    let size = if config.database_url == MEMORY_DATABASE {
        1
    } else {
        config.database_pool_size
    };

    let manager = ConnectionManager::<SqliteConnection>::new(config.database_url.as_str());
    let pool = r2d2::Pool::builder()
        .max_size(size)
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)?;

    let conn = pool.get()?;
    embedded_migrations::run(&*conn)?;
    log::info!("database ready at {}", config.database_url);
    Ok(pool)
}

/// Runs `f` on a pooled connection off the async executor, behind the breaker.
pub async fn run<F, T>(pool: &DbPool, breaker: &CircuitBreakerType, f: F) -> Result<T, AppError>
where
    F: FnOnce(&SqliteConnection) -> Result<T, DbError> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    let breaker = breaker.clone();
    let result = web::block(move || {
        breaker.call(|| {
            let conn = pool.get()?;
            f(&conn)
        })
    })
    .await?;

    match result {
        Ok(value) => Ok(value),
        Err(failsafe::Error::Inner(e)) => Err(AppError::Database(e)),
        Err(failsafe::Error::Rejected) => Err(AppError::Unavailable),
    }
}

#[cfg(test)]
pub(crate) fn test_connection() -> SqliteConnection {
    let conn = SqliteConnection::establish(MEMORY_DATABASE).unwrap();
    conn.batch_execute("PRAGMA foreign_keys = ON;").unwrap();
    embedded_migrations::run(&conn).unwrap();
    conn
}
