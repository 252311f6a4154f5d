use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{NaiveDateTime, Utc};
use futures_util::future::LocalBoxFuture;
use futures_util::FutureExt;
use rand::RngCore;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Session, User};
use crate::query::{self, DbError};
use crate::state::AppState;

pub fn hash_password(password: &str) -> Result<String, DbError> {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt).map_err(|e| e.to_string())?;

    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| e.to_string())?;
    Ok(hash.to_string())
}

/// A malformed stored hash never verifies.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::warn!("unreadable password hash: {e}");
            false
        }
    }
}

pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub fn new_session(user_id: i32, age_secs: i64) -> Session {
    Session {
        token: Uuid::new_v4().to_simple().to_string(),
        user_id,
        expire_at: now() + chrono::Duration::seconds(age_secs),
    }
}

pub fn session_cookie(name: &str, token: &str, age_secs: i64) -> Cookie<'static> {
    Cookie::build(name.to_owned(), token.to_owned())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(age_secs))
        .finish()
}

pub fn removal_cookie(name: &str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name.to_owned(), "").path("/").finish();
    cookie.make_removal();
    cookie
}

/// Only same-site absolute paths are followed after login.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => path,
        _ => "/",
    }
}

/// The user owning the request's session cookie.
///
/// Handlers taking `CurrentUser` answer anonymous requests with a redirect to
/// the login page; take `Option<CurrentUser>` to allow anonymous callers.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> i32 {
        self.0.id
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let next = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_owned())
            .unwrap_or_else(|| req.path().to_owned());
        let token = state.as_ref().and_then(|state| {
            req.cookie(&state.config.session_cookie_name)
                .map(|cookie| cookie.value().to_owned())
        });

        async move {
            let (state, token) = match (state, token) {
                (Some(state), Some(token)) => (state, token),
                _ => return Err(AppError::LoginRequired { next }),
            };
            let user = state
                .db(move |conn| query::find_session_user(&token, now(), conn))
                .await?;
            user.map(CurrentUser).ok_or(AppError::LoginRequired { next })
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passwords_verify_against_their_hash() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("battery staple", &hash));
        assert!(!verify_password("correct horse", "plain-text"));
    }

    #[test]
    fn same_password_hashes_differently() {
        assert_ne!(hash_password("pw123456").unwrap(), hash_password("pw123456").unwrap());
    }

    #[test]
    fn next_must_stay_on_site() {
        assert_eq!(safe_next(Some("/accounts/profile/")), "/accounts/profile/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }

    #[test]
    fn sessions_expire_after_their_age() {
        let session = new_session(3, 60);
        assert_eq!(session.user_id, 3);
        assert_eq!(session.token.len(), 32);
        assert!(session.expire_at > now());
        assert!(session.expire_at <= now() + chrono::Duration::seconds(60));
    }

    #[test]
    fn removal_cookie_is_expired() {
        let cookie = removal_cookie("sessionid");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
