use std::str::FromStr;

use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use tera::Context;

use crate::auth::CurrentUser;
use crate::config::Config;
use crate::error::AppError;
use crate::handlers::render;
use crate::models::BatchFilter;
use crate::query;
use crate::state::AppState;

/// Raw query string of the batch endpoint. Blank values mean "not given".
#[derive(Debug, Default, Deserialize)]
pub struct BatchQuery {
    pub category: Option<String>,
    pub types: Option<String>,
    pub n: Option<String>,
    pub exclude: Option<String>,
}

impl BatchQuery {
    pub fn into_filter(self, config: &Config) -> Result<BatchFilter, AppError> {
        let size = match parse_one::<i64>("n", self.n.as_deref())? {
            Some(n) => n.clamp(1, config.max_batch_size as i64) as usize,
            None => config.default_batch_size,
        };

        Ok(BatchFilter {
            category: parse_one("category", self.category.as_deref())?,
            types: parse_list("types", self.types.as_deref())?,
            exclude: parse_list("exclude", self.exclude.as_deref())?,
            size,
        })
    }
}

fn parse_one<T: FromStr>(key: &str, raw: Option<&str>) -> Result<Option<T>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("{key} must be an integer, got {value:?}"))),
    }
}

// comma separated ids, empty items ignored
fn parse_list(key: &str, raw: Option<&str>) -> Result<Vec<i32>, AppError> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse()
                .map_err(|_| AppError::BadRequest(format!("{key} must list integers, got {item:?}")))
        })
        .collect()
}

#[get("/")]
pub async fn random_food_page(
    state: web::Data<AppState>,
    user: Option<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    let catalog = state.catalog().await?;

    let mut context = Context::new();
    context.insert("categories", &catalog.categories);
    context.insert("types", &catalog.types);
    context.insert("user", &user.map(|user| user.0));
    render(&state, "home.html", &context)
}

#[get("/api/foods/batch/")]
pub async fn api_random_food_batch(
    state: web::Data<AppState>,
    params: web::Query<BatchQuery>,
    user: Option<CurrentUser>,
) -> Result<HttpResponse, AppError> {
    let filter = params.into_inner().into_filter(&state.config)?;
    let profile_id = match user {
        Some(user) => Some(state.profile_id(user.id()).await?),
        None => None,
    };

    let batch = state
        .db(move |conn| query::random_batch(&filter, profile_id, conn))
        .await?;
    log::debug!("batch of {} foods, done={}", batch.cards.len(), batch.done);
    Ok(HttpResponse::Ok().json(batch))
}
