//! `loaddata`: seeds the catalog from a JSON document.
//!
//! ```json
//! {
//!   "categories": ["Dessert"],
//!   "types": ["Sweet", "Cold"],
//!   "foods": [
//!     {"name": "Ice Cream", "category": "Dessert", "types": ["Sweet", "Cold"]}
//!   ]
//! }
//! ```
//!
//! Categories and types are matched by name and created when missing, so a
//! food may name ones that are not listed at the top.

use std::collections::HashMap;
use std::path::Path;

use diesel::prelude::*;
use serde::Deserialize;

use crate::models::NewFood;
use crate::query::{self, DbError};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub categories: Vec<String>,
    pub types: Vec<String>,
    pub foods: Vec<FoodFixture>,
}

#[derive(Debug, Deserialize)]
pub struct FoodFixture {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub favorite_count: i32,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub categories: usize,
    pub types: usize,
    pub foods: usize,
}

impl Fixture {
    pub fn from_path(path: &Path) -> Result<Self, DbError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn validate(&self) -> Result<(), DbError> {
        for item in &self.foods {
            if item.name.trim().is_empty() {
                return Err("fixture food with an empty name".into());
            }
            if item.favorite_count < 0 {
                return Err(format!("{}: favorite_count must not be negative", item.name).into());
            }
        }
        Ok(())
    }

    /// Loads everything in one transaction; a bad entry leaves the database untouched.
    pub fn load(&self, conn: &SqliteConnection) -> Result<LoadReport, DbError> {
        self.validate()?;

        conn.transaction::<_, DbError, _>(|| {
            let mut categories: HashMap<&str, i32> = HashMap::new();
            let mut types: HashMap<&str, i32> = HashMap::new();

            let listed_categories = self
                .categories
                .iter()
                .map(String::as_str)
                .chain(self.foods.iter().filter_map(|item| item.category.as_deref()));
            for name in listed_categories {
                if !categories.contains_key(name) {
                    categories.insert(name, query::get_or_create_category(name, conn)?);
                }
            }

            let listed_types = self
                .types
                .iter()
                .chain(self.foods.iter().flat_map(|item| item.types.iter()))
                .map(String::as_str);
            for name in listed_types {
                if !types.contains_key(name) {
                    types.insert(name, query::get_or_create_type(name, conn)?);
                }
            }

            for item in &self.foods {
                let type_ids: Vec<i32> = item.types.iter().map(|name| types[name.as_str()]).collect();
                query::create_food(
                    &NewFood {
                        name: item.name.trim(),
                        category_id: item.category.as_deref().map(|name| categories[name]),
                        favorite_count: item.favorite_count,
                    },
                    &type_ids,
                    conn,
                )?;
            }

            Ok(LoadReport {
                categories: categories.len(),
                types: types.len(),
                foods: self.foods.len(),
            })
        })
    }
}
