use actix_web::cookie::Cookie;
use actix_web::{get, post, route, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use tera::Context;

use crate::auth::{self, CurrentUser};
use crate::error::AppError;
use crate::handlers::{redirect, redirect_with_cookie, render};
use crate::models::{NewUser, User};
use crate::query;
use crate::state::AppState;

const USERNAME_MAX_LEN: usize = 150;
const NAME_MAX_LEN: usize = 150;
const EMAIL_MAX_LEN: usize = 254;
const PASSWORD_MIN_LEN: usize = 8;

const USERNAME_TAKEN: &str = "A user with that username already exists.";

const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub password1: String,
    pub password2: String,
}

impl RegisterForm {
    /// Everything that can be checked without the database.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let username = self.username.trim();

        if username.is_empty() {
            errors.push("Username is required.".to_string());
        } else if username.chars().count() > USERNAME_MAX_LEN {
            errors.push(format!(
                "Ensure the username has at most {USERNAME_MAX_LEN} characters."
            ));
        } else if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@.+-_".contains(c))
        {
            errors.push(
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                    .to_string(),
            );
        }

        if self.password1 != self.password2 {
            errors.push("The two password fields didn't match.".to_string());
        } else {
            if self.password1.chars().count() < PASSWORD_MIN_LEN {
                errors.push(format!(
                    "This password is too short. It must contain at least {PASSWORD_MIN_LEN} characters."
                ));
            }
            if !self.password1.is_empty() && self.password1.chars().all(|c| c.is_ascii_digit()) {
                errors.push("This password is entirely numeric.".to_string());
            }
            if !username.is_empty() && self.password1.eq_ignore_ascii_case(username) {
                errors.push("The password is too similar to the username.".to_string());
            }
        }
        errors
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditProfileForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl EditProfileForm {
    fn from_user(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }

    fn trimmed(self) -> Self {
        Self {
            email: self.email.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !self.email.is_empty() && !looks_like_email(&self.email) {
            errors.push("Enter a valid email address.".to_string());
        }
        if self.email.chars().count() > EMAIL_MAX_LEN {
            errors.push(format!("Ensure the email has at most {EMAIL_MAX_LEN} characters."));
        }
        if self.first_name.chars().count() > NAME_MAX_LEN
            || self.last_name.chars().count() > NAME_MAX_LEN
        {
            errors.push(format!("Ensure names have at most {NAME_MAX_LEN} characters."));
        }
        errors
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

fn register_page_with(state: &AppState, username: &str, errors: &[String]) -> Result<HttpResponse, AppError> {
    let mut context = Context::new();
    context.insert("user", &Option::<User>::None);
    context.insert("username", username);
    context.insert("errors", errors);
    render(state, "accounts/register.html", &context)
}

fn login_page_with(
    state: &AppState,
    username: &str,
    next: Option<&str>,
    errors: &[String],
) -> Result<HttpResponse, AppError> {
    let mut context = Context::new();
    context.insert("user", &Option::<User>::None);
    context.insert("username", username);
    context.insert("next", next.unwrap_or_default());
    context.insert("errors", errors);
    render(state, "accounts/login.html", &context)
}

/// Persists a fresh session for `user_id` and returns its cookie.
async fn start_session(state: &AppState, user_id: i32) -> Result<Cookie<'static>, AppError> {
    let session = auth::new_session(user_id, state.config.session_age_secs);
    let cookie = auth::session_cookie(
        &state.config.session_cookie_name,
        &session.token,
        state.config.session_age_secs,
    );
    state
        .db(move |conn| {
            query::insert_session(&session, conn)?;
            query::touch_last_login(user_id, auth::now(), conn)
        })
        .await?;
    Ok(cookie)
}

#[get("/accounts/register/")]
pub async fn register_page(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    register_page_with(&state, "", &[])
}

#[post("/accounts/register/")]
pub async fn register(
    state: web::Data<AppState>,
    form: web::Form<RegisterForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let username = form.username.trim().to_string();

    let mut errors = form.validate();
    if errors.is_empty() {
        let lookup = username.clone();
        let taken = state
            .db(move |conn| query::find_user_by_username(&lookup, conn))
            .await?
            .is_some();
        if taken {
            errors.push(USERNAME_TAKEN.to_string());
        }
    }
    if !errors.is_empty() {
        return register_page_with(&state, &username, &errors);
    }

    let password = form.password1;
    let hash = web::block(move || auth::hash_password(&password)).await??;
    let new_username = username.clone();
    let created = state
        .db(move |conn| {
            query::create_user(
                &NewUser {
                    username: &new_username,
                    password: &hash,
                    email: "",
                    first_name: "",
                    last_name: "",
                    is_staff: false,
                    date_joined: auth::now(),
                },
                conn,
            )
        })
        .await;
    let user = match created {
        Ok(user) => user,
        // lost a race with a concurrent registration of the same name
        Err(AppError::Database(e)) if query::is_unique_violation(&e) => {
            return register_page_with(&state, &username, &[USERNAME_TAKEN.to_string()]);
        }
        Err(e) => return Err(e),
    };
    log::info!("registered user {} ({})", user.username, user.id);

    let cookie = start_session(&state, user.id).await?;
    Ok(redirect_with_cookie("/", cookie))
}

#[get("/accounts/login/")]
pub async fn login_page(
    state: web::Data<AppState>,
    params: web::Query<NextQuery>,
) -> Result<HttpResponse, AppError> {
    login_page_with(&state, "", params.next.as_deref(), &[])
}

#[post("/accounts/login/")]
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let username = form.username.trim().to_string();

    let lookup = username.clone();
    let found = state
        .db(move |conn| query::find_user_by_username(&lookup, conn))
        .await?;
    let user = match found {
        Some(user) => {
            let stored = user.password.clone();
            let password = form.password;
            let verified = web::block(move || auth::verify_password(&password, &stored)).await?;
            verified.then(|| user)
        }
        None => None,
    };

    let user = match user {
        Some(user) => user,
        None => {
            log::info!("failed login for {username:?}");
            return login_page_with(
                &state,
                &username,
                form.next.as_deref(),
                &[BAD_CREDENTIALS.to_string()],
            );
        }
    };

    let cookie = start_session(&state, user.id).await?;
    Ok(redirect_with_cookie(auth::safe_next(form.next.as_deref()), cookie))
}

#[route("/accounts/logout/", method = "GET", method = "POST")]
pub async fn logout(state: web::Data<AppState>, req: HttpRequest) -> Result<HttpResponse, AppError> {
    let cookie_name = state.config.session_cookie_name.clone();
    if let Some(cookie) = req.cookie(&cookie_name) {
        let token = cookie.value().to_owned();
        state
            .db(move |conn| query::delete_session(&token, conn))
            .await?;
    }

    Ok(redirect_with_cookie("/", auth::removal_cookie(&cookie_name)))
}

#[get("/accounts/profile/")]
pub async fn profile(state: web::Data<AppState>, user: CurrentUser) -> Result<HttpResponse, AppError> {
    let profile_id = state.profile_id(user.id()).await?;
    let favorites = state
        .db(move |conn| query::list_favorites(profile_id, conn))
        .await?;

    let mut context = Context::new();
    context.insert("user", &user.0);
    context.insert("favorites", &favorites);
    render(&state, "accounts/profile.html", &context)
}

fn edit_profile_page_with(
    state: &AppState,
    user: &User,
    form: &EditProfileForm,
    errors: &[String],
) -> Result<HttpResponse, AppError> {
    let mut context = Context::new();
    context.insert("user", user);
    context.insert("form", form);
    context.insert("errors", errors);
    render(state, "accounts/edit_profile.html", &context)
}

#[get("/accounts/profile/edit/")]
pub async fn edit_profile_page(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    edit_profile_page_with(&state, &user.0, &EditProfileForm::from_user(&user.0), &[])
}

#[post("/accounts/profile/edit/")]
pub async fn edit_profile(
    state: web::Data<AppState>,
    user: CurrentUser,
    form: web::Form<EditProfileForm>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner().trimmed();
    let errors = form.validate();
    if !errors.is_empty() {
        return edit_profile_page_with(&state, &user.0, &form, &errors);
    }

    let user_id = user.id();
    state
        .db(move |conn| {
            query::update_user_details(user_id, &form.email, &form.first_name, &form.last_name, conn)
        })
        .await?;
    Ok(redirect("/accounts/profile/"))
}
