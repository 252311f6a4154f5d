use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::HttpResponse;
use tera::Context;

use crate::error::AppError;
use crate::state::AppState;

pub mod accounts;
pub mod favorites;
pub mod foods;

pub(crate) fn render(state: &AppState, template: &str, context: &Context) -> Result<HttpResponse, AppError> {
    let html = state.templates.render(template, context)?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}

pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub(crate) fn redirect_with_cookie(location: &str, cookie: Cookie<'static>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .cookie(cookie)
        .finish()
}
