use actix_web::{
    error::BlockingError,
    http::{header, StatusCode},
    HttpResponse, ResponseError,
};
use serde_json::json;
use thiserror::Error;

use crate::query::DbError;

pub const LOGIN_URL: &str = "/accounts/login/";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// answered with a redirect to the login page, never with a body
    #[error("login required")]
    LoginRequired { next: String },

    #[error("service temporarily unavailable")]
    Unavailable,

    #[error("database error: {0}")]
    Database(DbError),

    #[error("blocking task failed")]
    Blocking(#[from] BlockingError),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

impl AppError {
    pub fn login_redirect(next: &str) -> String {
        match serde_urlencoded::to_string(&[("next", next)]) {
            Ok(query) => format!("{LOGIN_URL}?{query}"),
            Err(_) => LOGIN_URL.to_string(),
        }
    }
}

impl From<DbError> for AppError {
    fn from(e: DbError) -> Self {
        AppError::Database(e)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::LoginRequired { .. } => StatusCode::FOUND,
            AppError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Blocking(_) | AppError::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self {
            AppError::LoginRequired { next } => HttpResponse::Found()
                .insert_header((header::LOCATION, AppError::login_redirect(next)))
                .finish(),
            _ if status == StatusCode::INTERNAL_SERVER_ERROR => {
                log::error!("{}", self);
                HttpResponse::build(status).json(json!({ "error": "internal error" }))
            }
            _ => HttpResponse::build(status).json(json!({ "error": self.to_string() })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_variants() {
        assert_eq!(AppError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("food").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unavailable.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            AppError::from(DbError::from("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn login_required_redirects_with_next() {
        let response = AppError::LoginRequired {
            next: "/api/favorites/".to_string(),
        }
        .error_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        let location = response.headers().get(header::LOCATION).unwrap();
        assert_eq!(location, "/accounts/login/?next=%2Fapi%2Ffavorites%2F");
    }

    #[actix_web::test]
    async fn unavailable_says_so_but_internal_errors_stay_generic() {
        let response = AppError::Unavailable.error_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&body).unwrap(),
            json!({ "error": "service temporarily unavailable" })
        );

        let response = AppError::from(DbError::from("secret table")).error_response();
        let body = actix_web::body::to_bytes(response.into_body()).await.unwrap();
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&body).unwrap(),
            json!({ "error": "internal error" })
        );
    }
}
