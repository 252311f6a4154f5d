use std::path::Path;

use actix_web::{middleware, web, App, HttpServer};

use random_food::fixtures::Fixture;
use random_food::{auth, query, routes, AppState, Config};

fn invalid(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

fn load_fixture(state: &AppState, path: &str) -> std::io::Result<()> {
    let fixture = Fixture::from_path(Path::new(path)).map_err(invalid)?;
    let conn = state.pool.get().map_err(invalid)?;
    let report = fixture.load(&conn).map_err(invalid)?;
    if let Some(cache) = &state.cache {
        cache.invalidate();
    }
    log::info!(
        "loaded {} foods ({} categories, {} types) from {path}",
        report.foods,
        report.categories,
        report.types
    );
    Ok(())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(invalid)?;
    let state = AppState::new(config).map_err(invalid)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] => {}
        ["loaddata", path] => return load_fixture(&state, path),
        _ => {
            eprintln!("usage: random-food [loaddata <fixture.json>]");
            std::process::exit(2);
        }
    }

    {
        let conn = state.pool.get().map_err(invalid)?;
        let purged = query::purge_expired_sessions(auth::now(), &conn).map_err(invalid)?;
        if purged > 0 {
            log::info!("purged {purged} expired sessions");
        }
    }

    let bind = (state.config.bind_addr.clone(), state.config.port);
    let state = web::Data::new(state);

    log::info!("starting HTTP server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(routes::configure)
    })
    .bind(bind)?
    .run()
    .await
}
