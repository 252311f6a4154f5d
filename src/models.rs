use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::schema::{auth_user, food, food_food_types, session, user_profile, user_profile_favorites};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable)]
pub struct FoodCategory {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable)]
pub struct FoodType {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable)]
pub struct Food {
    pub id: i32,
    pub name: String,
    pub category_id: Option<i32>,
    pub favorite_count: i32,
}

#[derive(Debug, Insertable)]
#[table_name = "food"]
pub struct NewFood<'a> {
    pub name: &'a str,
    pub category_id: Option<i32>,
    pub favorite_count: i32,
}

// food <-> food_type join row
#[derive(Debug, Insertable)]
#[table_name = "food_food_types"]
pub(crate) struct FoodTypeLink {
    pub food_id: i32,
    pub food_type_id: i32,
}

#[derive(Debug, Clone, Serialize, Queryable)]
pub struct User {
    pub id: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub date_joined: NaiveDateTime,
    pub last_login: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable)]
#[table_name = "auth_user"]
pub struct NewUser<'a> {
    pub username: &'a str,
    /// argon2 PHC string, never the raw password
    pub password: &'a str,
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub is_staff: bool,
    pub date_joined: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable)]
pub struct UserProfile {
    pub id: i32,
    pub user_id: i32,
}

#[derive(Debug, Insertable)]
#[table_name = "user_profile"]
pub(crate) struct NewUserProfile {
    pub user_id: i32,
}

#[derive(Debug, Insertable)]
#[table_name = "user_profile_favorites"]
pub(crate) struct Favorite {
    pub profile_id: i32,
    pub food_id: i32,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[table_name = "session"]
pub struct Session {
    pub token: String,
    pub user_id: i32,
    pub expire_at: NaiveDateTime,
}

/// Everything the home page needs to build its filter widgets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub categories: Vec<FoodCategory>,
    pub types: Vec<FoodType>,
}

impl Catalog {
    pub(crate) fn from_u8(bytes: Vec<u8>) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Ok(bincode::deserialize(&bytes)?)
    }

    pub(crate) fn to_u8(&self) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(bincode::serialize(self)?)
    }
}

/// A food as the browser sees it, with its relations flattened to names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoodCard {
    pub id: i32,
    pub name: String,
    pub category_id: Option<i32>,
    pub category: Option<String>,
    pub types: Vec<String>,
    pub favorite_count: i32,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchFilter {
    pub category: Option<i32>,
    /// a food matches when it carries any of these
    pub types: Vec<i32>,
    pub exclude: Vec<i32>,
    pub size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoodBatch {
    pub cards: Vec<FoodCard>,
    /// no unseen food matches the filter any more
    pub done: bool,
}
