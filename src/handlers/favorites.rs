use actix_web::{get, post, route, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::query::{self, FavoriteUpdate};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddFavorite {
    pub food_id: i32,
}

#[post("/api/favorites/add/")]
pub async fn api_add_favorite(
    state: web::Data<AppState>,
    user: CurrentUser,
    body: web::Json<AddFavorite>,
) -> Result<HttpResponse, AppError> {
    let food_id = body.food_id;
    let profile_id = state.profile_id(user.id()).await?;

    let status = match state
        .db(move |conn| query::add_favorite(profile_id, food_id, conn))
        .await?
    {
        Some(FavoriteUpdate::Changed) => "added",
        Some(FavoriteUpdate::Unchanged) => "exists",
        None => return Err(AppError::NotFound("food")),
    };
    log::info!("user {} favorite {food_id}: {status}", user.0.username);
    Ok(HttpResponse::Ok().json(json!({ "status": status })))
}

#[get("/api/favorites/")]
pub async fn api_get_favorites(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let profile_id = state.profile_id(user.id()).await?;
    let favorites = state
        .db(move |conn| query::list_favorites(profile_id, conn))
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "favorites": favorites })))
}

#[route("/remove-favorite/{food_id}/", method = "GET", method = "POST")]
pub async fn remove_favorite(
    state: web::Data<AppState>,
    user: CurrentUser,
    food_id: web::Path<i32>,
) -> Result<HttpResponse, AppError> {
    let food_id = food_id.into_inner();
    let profile_id = state.profile_id(user.id()).await?;

    match state
        .db(move |conn| query::remove_favorite(profile_id, food_id, conn))
        .await?
    {
        Some(update) => {
            if update == FavoriteUpdate::Changed {
                log::info!("user {} removed favorite {food_id}", user.0.username);
            }
            Ok(HttpResponse::Ok().json(json!({ "ok": true })))
        }
        None => Err(AppError::NotFound("food")),
    }
}
