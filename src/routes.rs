use actix_web::web;

use crate::error::AppError;
use crate::handlers::{accounts, favorites, foods};

/// Registers every endpoint; `AppState` must be added as app data by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(foods::random_food_page)
    .service(foods::api_random_food_batch)
    .service(favorites::api_add_favorite)
    .service(favorites::api_get_favorites)
    .service(favorites::remove_favorite)
    .service(accounts::register_page)
    .service(accounts::register)
    .service(accounts::login_page)
    .service(accounts::login)
    .service(accounts::logout)
    .service(accounts::profile)
    .service(accounts::edit_profile_page)
    .service(accounts::edit_profile);
}
