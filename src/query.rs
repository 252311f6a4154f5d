use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use diesel::dsl::exists;
use diesel::prelude::*;
use rand::seq::SliceRandom;

use crate::models::{
    BatchFilter, Catalog, Favorite, Food, FoodBatch, FoodCard, FoodCategory, FoodType,
    FoodTypeLink, NewFood, NewUser, NewUserProfile, Session, User, UserProfile,
};
use crate::schema::{
    auth_user, food, food_category, food_food_types, food_type, session, user_profile,
    user_profile_favorites,
};

pub type DbError = Box<dyn std::error::Error + Send + Sync>;

no_arg_sql_function!(
    last_insert_rowid,
    diesel::sql_types::Integer,
    "rowid of the last INSERT on this connection"
);

/// True when `e` is the database rejecting a duplicate of a `UNIQUE` column.
pub fn is_unique_violation(e: &DbError) -> bool {
    matches!(
        e.downcast_ref::<diesel::result::Error>(),
        Some(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _
        ))
    )
}

/// Result of a favorites mutation on a food that exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteUpdate {
    Changed,
    Unchanged,
}

pub fn list_categories(conn: &SqliteConnection) -> Result<Vec<FoodCategory>, DbError> {
    Ok(food_category::table
        .order((food_category::name.asc(), food_category::id.asc()))
        .load(conn)?)
}

pub fn list_types(conn: &SqliteConnection) -> Result<Vec<FoodType>, DbError> {
    Ok(food_type::table
        .order((food_type::name.asc(), food_type::id.asc()))
        .load(conn)?)
}

pub fn load_catalog(conn: &SqliteConnection) -> Result<Catalog, DbError> {
    Ok(Catalog {
        categories: list_categories(conn)?,
        types: list_types(conn)?,
    })
}

pub fn find_food(food_id: i32, conn: &SqliteConnection) -> Result<Option<Food>, DbError> {
    Ok(food::table.find(food_id).first(conn).optional()?)
}

/// Ids of every food passing `filter`, ignoring its size.
pub fn matching_food_ids(filter: &BatchFilter, conn: &SqliteConnection) -> Result<Vec<i32>, DbError> {
    let mut query = food::table.select(food::id).into_boxed();

    if let Some(category) = filter.category {
        query = query.filter(food::category_id.eq(category));
    }
    if !filter.types.is_empty() {
        let typed: Vec<i32> = food_food_types::table
            .filter(food_food_types::food_type_id.eq_any(filter.types.clone()))
            .select(food_food_types::food_id)
            .distinct()
            .load(conn)?;
        query = query.filter(food::id.eq_any(typed));
    }
    if !filter.exclude.is_empty() {
        query = query.filter(food::id.ne_all(filter.exclude.clone()));
    }

    Ok(query.order(food::id.asc()).load(conn)?)
}

/// Samples up to `filter.size` matching foods uniformly at random.
pub fn random_batch(
    filter: &BatchFilter,
    profile_id: Option<i32>,
    conn: &SqliteConnection,
) -> Result<FoodBatch, DbError> {
    let candidates = matching_food_ids(filter, conn)?;

    let mut rng = rand::thread_rng();
    let mut picked: Vec<i32> = candidates
        .choose_multiple(&mut rng, filter.size)
        .copied()
        .collect();
    picked.shuffle(&mut rng);

    let done = picked.len() >= candidates.len();
    let cards = food_cards(&picked, profile_id, conn)?;
    Ok(FoodBatch { cards, done })
}

/// Builds cards for `ids`, keeping their order. Unknown ids are skipped.
pub fn food_cards(
    ids: &[i32],
    profile_id: Option<i32>,
    conn: &SqliteConnection,
) -> Result<Vec<FoodCard>, DbError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows: Vec<(Food, Option<FoodCategory>)> = food::table
        .left_join(food_category::table)
        .filter(food::id.eq_any(ids.to_vec()))
        .load(conn)?;
    let mut rows: HashMap<i32, (Food, Option<FoodCategory>)> =
        rows.into_iter().map(|row| (row.0.id, row)).collect();

    let links: Vec<(i32, FoodType)> = food_food_types::table
        .inner_join(food_type::table)
        .filter(food_food_types::food_id.eq_any(ids.to_vec()))
        .order((food_type::name.asc(), food_type::id.asc()))
        .select((food_food_types::food_id, food_type::all_columns))
        .load(conn)?;
    let mut types: HashMap<i32, Vec<String>> = HashMap::new();
    for (food_id, food_type) in links {
        types.entry(food_id).or_default().push(food_type.name);
    }

    let favorites: HashSet<i32> = match profile_id {
        Some(profile_id) => favorite_ids(profile_id, conn)?.into_iter().collect(),
        None => HashSet::new(),
    };

    Ok(ids
        .iter()
        .filter_map(|id| rows.remove(id))
        .map(|(item, category)| FoodCard {
            id: item.id,
            types: types.remove(&item.id).unwrap_or_default(),
            is_favorite: favorites.contains(&item.id),
            name: item.name,
            category_id: item.category_id,
            category: category.map(|c| c.name),
            favorite_count: item.favorite_count,
        })
        .collect())
}

pub fn favorite_ids(profile_id: i32, conn: &SqliteConnection) -> Result<Vec<i32>, DbError> {
    Ok(user_profile_favorites::table
        .filter(user_profile_favorites::profile_id.eq(profile_id))
        .select(user_profile_favorites::food_id)
        .load(conn)?)
}

/// Favorites of a profile as cards, ordered by food name.
pub fn list_favorites(profile_id: i32, conn: &SqliteConnection) -> Result<Vec<FoodCard>, DbError> {
    let ids: Vec<i32> = user_profile_favorites::table
        .inner_join(food::table)
        .filter(user_profile_favorites::profile_id.eq(profile_id))
        .order((food::name.asc(), food::id.asc()))
        .select(food::id)
        .load(conn)?;
    food_cards(&ids, Some(profile_id), conn)
}

pub fn is_favorite(profile_id: i32, food_id: i32, conn: &SqliteConnection) -> Result<bool, DbError> {
    Ok(diesel::select(exists(
        user_profile_favorites::table
            .filter(user_profile_favorites::profile_id.eq(profile_id))
            .filter(user_profile_favorites::food_id.eq(food_id)),
    ))
    .get_result(conn)?)
}

/// Adds `food_id` to the profile's favorites. `None` when the food does not exist.
pub fn add_favorite(
    profile_id: i32,
    food_id: i32,
    conn: &SqliteConnection,
) -> Result<Option<FavoriteUpdate>, DbError> {
    conn.transaction::<_, DbError, _>(|| {
        if find_food(food_id, conn)?.is_none() {
            return Ok(None);
        }
        if is_favorite(profile_id, food_id, conn)? {
            return Ok(Some(FavoriteUpdate::Unchanged));
        }

        diesel::insert_into(user_profile_favorites::table)
            .values(&Favorite { profile_id, food_id })
            .execute(conn)?;
        diesel::update(food::table.find(food_id))
            .set(food::favorite_count.eq(food::favorite_count + 1))
            .execute(conn)?;
        Ok(Some(FavoriteUpdate::Changed))
    })
}

/// Removes `food_id` from the profile's favorites. `None` when the food does not exist.
pub fn remove_favorite(
    profile_id: i32,
    food_id: i32,
    conn: &SqliteConnection,
) -> Result<Option<FavoriteUpdate>, DbError> {
    conn.transaction::<_, DbError, _>(|| {
        if find_food(food_id, conn)?.is_none() {
            return Ok(None);
        }

        let removed = diesel::delete(
            user_profile_favorites::table
                .filter(user_profile_favorites::profile_id.eq(profile_id))
                .filter(user_profile_favorites::food_id.eq(food_id)),
        )
        .execute(conn)?;
        if removed == 0 {
            return Ok(Some(FavoriteUpdate::Unchanged));
        }

        diesel::update(
            food::table
                .find(food_id)
                .filter(food::favorite_count.gt(0)),
        )
        .set(food::favorite_count.eq(food::favorite_count - 1))
        .execute(conn)?;
        Ok(Some(FavoriteUpdate::Changed))
    })
}

pub fn get_or_create_profile(user_id: i32, conn: &SqliteConnection) -> Result<UserProfile, DbError> {
    conn.transaction::<_, DbError, _>(|| {
        let existing = user_profile::table
            .filter(user_profile::user_id.eq(user_id))
            .first::<UserProfile>(conn)
            .optional()?;
        if let Some(profile) = existing {
            return Ok(profile);
        }

        diesel::insert_into(user_profile::table)
            .values(&NewUserProfile { user_id })
            .execute(conn)?;
        let id: i32 = diesel::select(last_insert_rowid).get_result(conn)?;
        Ok(UserProfile { id, user_id })
    })
}

/// Inserts a user together with its empty profile.
pub fn create_user(new_user: &NewUser, conn: &SqliteConnection) -> Result<User, DbError> {
    conn.transaction::<_, DbError, _>(|| {
        diesel::insert_into(auth_user::table)
            .values(new_user)
            .execute(conn)?;
        let id: i32 = diesel::select(last_insert_rowid).get_result(conn)?;
        diesel::insert_into(user_profile::table)
            .values(&NewUserProfile { user_id: id })
            .execute(conn)?;
        Ok(auth_user::table.find(id).first(conn)?)
    })
}

pub fn find_user(user_id: i32, conn: &SqliteConnection) -> Result<Option<User>, DbError> {
    Ok(auth_user::table.find(user_id).first(conn).optional()?)
}

pub fn find_user_by_username(username: &str, conn: &SqliteConnection) -> Result<Option<User>, DbError> {
    Ok(auth_user::table
        .filter(auth_user::username.eq(username))
        .first(conn)
        .optional()?)
}

pub fn update_user_details(
    user_id: i32,
    email: &str,
    first_name: &str,
    last_name: &str,
    conn: &SqliteConnection,
) -> Result<(), DbError> {
    diesel::update(auth_user::table.find(user_id))
        .set((
            auth_user::email.eq(email),
            auth_user::first_name.eq(first_name),
            auth_user::last_name.eq(last_name),
        ))
        .execute(conn)?;
    Ok(())
}

pub fn touch_last_login(user_id: i32, now: NaiveDateTime, conn: &SqliteConnection) -> Result<(), DbError> {
    diesel::update(auth_user::table.find(user_id))
        .set(auth_user::last_login.eq(Some(now)))
        .execute(conn)?;
    Ok(())
}

pub fn insert_session(new_session: &Session, conn: &SqliteConnection) -> Result<(), DbError> {
    diesel::insert_into(session::table)
        .values(new_session)
        .execute(conn)?;
    Ok(())
}

/// The owner of a live session. Expired sessions are deleted on the way.
pub fn find_session_user(
    token: &str,
    now: NaiveDateTime,
    conn: &SqliteConnection,
) -> Result<Option<User>, DbError> {
    let found = session::table
        .inner_join(auth_user::table)
        .filter(session::token.eq(token))
        .first::<(Session, User)>(conn)
        .optional()?;

    match found {
        Some((live, user)) if live.expire_at > now => Ok(Some(user)),
        Some(_) => {
            delete_session(token, conn)?;
            Ok(None)
        }
        None => Ok(None),
    }
}

pub fn delete_session(token: &str, conn: &SqliteConnection) -> Result<(), DbError> {
    diesel::delete(session::table.find(token)).execute(conn)?;
    Ok(())
}

pub fn purge_expired_sessions(now: NaiveDateTime, conn: &SqliteConnection) -> Result<usize, DbError> {
    Ok(diesel::delete(session::table.filter(session::expire_at.le(now))).execute(conn)?)
}

pub fn get_or_create_category(name: &str, conn: &SqliteConnection) -> Result<i32, DbError> {
    let existing = food_category::table
        .filter(food_category::name.eq(name))
        .select(food_category::id)
        .first::<i32>(conn)
        .optional()?;
    if let Some(existing) = existing {
        return Ok(existing);
    }
    diesel::insert_into(food_category::table)
        .values(food_category::name.eq(name))
        .execute(conn)?;
    Ok(diesel::select(last_insert_rowid).get_result(conn)?)
}

pub fn get_or_create_type(name: &str, conn: &SqliteConnection) -> Result<i32, DbError> {
    let existing = food_type::table
        .filter(food_type::name.eq(name))
        .select(food_type::id)
        .first::<i32>(conn)
        .optional()?;
    if let Some(existing) = existing {
        return Ok(existing);
    }
    diesel::insert_into(food_type::table)
        .values(food_type::name.eq(name))
        .execute(conn)?;
    Ok(diesel::select(last_insert_rowid).get_result(conn)?)
}

/// Inserts a food and its type links, returning the new id.
pub fn create_food(
    new_food: &NewFood,
    type_ids: &[i32],
    conn: &SqliteConnection,
) -> Result<i32, DbError> {
    conn.transaction::<_, DbError, _>(|| {
        diesel::insert_into(food::table)
            .values(new_food)
            .execute(conn)?;
        let food_id: i32 = diesel::select(last_insert_rowid).get_result(conn)?;

        let mut seen = HashSet::new();
        for &food_type_id in type_ids {
            if !seen.insert(food_type_id) {
                continue;
            }
            diesel::insert_into(food_food_types::table)
                .values(&FoodTypeLink {
                    food_id,
                    food_type_id,
                })
                .execute(conn)?;
        }
        Ok(food_id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_connection;

    struct Seed {
        dessert: i32,
        main: i32,
        sweet: i32,
        spicy: i32,
        ice_cream: i32,
        curry: i32,
        cake: i32,
    }

    fn seed(conn: &SqliteConnection) -> Seed {
        let dessert = get_or_create_category("Dessert", conn).unwrap();
        let main = get_or_create_category("Main", conn).unwrap();
        let sweet = get_or_create_type("Sweet", conn).unwrap();
        let spicy = get_or_create_type("Spicy", conn).unwrap();
        let cold = get_or_create_type("Cold", conn).unwrap();

        let food_with = |name: &str, category_id: Option<i32>, types: &[i32]| {
            create_food(
                &NewFood {
                    name,
                    category_id,
                    favorite_count: 0,
                },
                types,
                conn,
            )
            .unwrap()
        };
        let ice_cream = food_with("Ice Cream", Some(dessert), &[sweet, cold]);
        let curry = food_with("Curry", Some(main), &[spicy]);
        let cake = food_with("Cake", Some(dessert), &[sweet]);

        Seed {
            dessert,
            main,
            sweet,
            spicy,
            ice_cream,
            curry,
            cake,
        }
    }

    fn make_user(conn: &SqliteConnection, username: &str) -> User {
        create_user(
            &NewUser {
                username,
                password: "not-a-real-hash",
                email: "",
                first_name: "",
                last_name: "",
                is_staff: false,
                date_joined: chrono::Utc::now().naive_utc(),
            },
            conn,
        )
        .unwrap()
    }

    fn sorted(mut ids: Vec<i32>) -> Vec<i32> {
        ids.sort_unstable();
        ids
    }

    #[test]
    fn categories_and_types_are_reused_by_name() {
        let conn = test_connection();
        let first = get_or_create_category("Dessert", &conn).unwrap();
        let again = get_or_create_category("Dessert", &conn).unwrap();
        assert_eq!(first, again);

        let catalog = load_catalog(&conn).unwrap();
        assert_eq!(catalog.categories.len(), 1);
        assert!(catalog.types.is_empty());
    }

    #[test]
    fn filters_match_category_and_any_type() {
        let conn = test_connection();
        let s = seed(&conn);

        let all = matching_food_ids(&BatchFilter::default(), &conn).unwrap();
        assert_eq!(sorted(all), sorted(vec![s.ice_cream, s.curry, s.cake]));

        let desserts = BatchFilter {
            category: Some(s.dessert),
            ..BatchFilter::default()
        };
        assert_eq!(
            sorted(matching_food_ids(&desserts, &conn).unwrap()),
            sorted(vec![s.ice_cream, s.cake])
        );

        let sweet_or_spicy = BatchFilter {
            types: vec![s.sweet, s.spicy],
            ..BatchFilter::default()
        };
        assert_eq!(
            sorted(matching_food_ids(&sweet_or_spicy, &conn).unwrap()),
            sorted(vec![s.ice_cream, s.curry, s.cake])
        );

        let spicy_dessert = BatchFilter {
            category: Some(s.dessert),
            types: vec![s.spicy],
            ..BatchFilter::default()
        };
        assert!(matching_food_ids(&spicy_dessert, &conn).unwrap().is_empty());

        let main_spicy = BatchFilter {
            category: Some(s.main),
            types: vec![s.spicy],
            ..BatchFilter::default()
        };
        assert_eq!(matching_food_ids(&main_spicy, &conn).unwrap(), vec![s.curry]);
    }

    #[test]
    fn batch_respects_size_exclusions_and_done() {
        let conn = test_connection();
        let s = seed(&conn);

        let first = random_batch(
            &BatchFilter {
                size: 2,
                ..BatchFilter::default()
            },
            None,
            &conn,
        )
        .unwrap();
        assert_eq!(first.cards.len(), 2);
        assert!(!first.done);

        let seen: Vec<i32> = first.cards.iter().map(|card| card.id).collect();
        let rest = random_batch(
            &BatchFilter {
                size: 2,
                exclude: seen.clone(),
                ..BatchFilter::default()
            },
            None,
            &conn,
        )
        .unwrap();
        assert_eq!(rest.cards.len(), 1);
        assert!(rest.done);
        assert!(!seen.contains(&rest.cards[0].id));

        let mut everything = seen;
        everything.push(rest.cards[0].id);
        assert_eq!(sorted(everything), sorted(vec![s.ice_cream, s.curry, s.cake]));
    }

    #[test]
    fn cards_carry_names_of_relations() {
        let conn = test_connection();
        let s = seed(&conn);

        let cards = food_cards(&[s.ice_cream, 9999, s.curry], None, &conn).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].name, "Ice Cream");
        assert_eq!(cards[0].category.as_deref(), Some("Dessert"));
        assert_eq!(cards[0].types, vec!["Cold".to_string(), "Sweet".to_string()]);
        assert_eq!(cards[1].id, s.curry);
        assert!(!cards[1].is_favorite);
    }

    #[test]
    fn food_without_category_still_yields_a_card() {
        let conn = test_connection();
        let id = create_food(
            &NewFood {
                name: "Water",
                category_id: None,
                favorite_count: 0,
            },
            &[],
            &conn,
        )
        .unwrap();

        let cards = food_cards(&[id], None, &conn).unwrap();
        assert_eq!(cards[0].category, None);
        assert!(cards[0].types.is_empty());
    }

    #[test]
    fn favorites_are_idempotent_and_counted() {
        let conn = test_connection();
        let s = seed(&conn);
        let user = make_user(&conn, "alice");
        let profile = get_or_create_profile(user.id, &conn).unwrap();

        assert_eq!(
            add_favorite(profile.id, s.cake, &conn).unwrap(),
            Some(FavoriteUpdate::Changed)
        );
        assert_eq!(
            add_favorite(profile.id, s.cake, &conn).unwrap(),
            Some(FavoriteUpdate::Unchanged)
        );
        assert_eq!(find_food(s.cake, &conn).unwrap().unwrap().favorite_count, 1);
        assert!(is_favorite(profile.id, s.cake, &conn).unwrap());

        let favorites = list_favorites(profile.id, &conn).unwrap();
        assert_eq!(favorites.len(), 1);
        assert!(favorites[0].is_favorite);

        assert_eq!(
            remove_favorite(profile.id, s.cake, &conn).unwrap(),
            Some(FavoriteUpdate::Changed)
        );
        assert_eq!(
            remove_favorite(profile.id, s.cake, &conn).unwrap(),
            Some(FavoriteUpdate::Unchanged)
        );
        assert_eq!(find_food(s.cake, &conn).unwrap().unwrap().favorite_count, 0);
        assert!(list_favorites(profile.id, &conn).unwrap().is_empty());
    }

    #[test]
    fn favorites_of_missing_food_report_none() {
        let conn = test_connection();
        let user = make_user(&conn, "bob");
        let profile = get_or_create_profile(user.id, &conn).unwrap();

        assert_eq!(add_favorite(profile.id, 42, &conn).unwrap(), None);
        assert_eq!(remove_favorite(profile.id, 42, &conn).unwrap(), None);
    }

    #[test]
    fn favorites_list_is_ordered_by_name() {
        let conn = test_connection();
        let s = seed(&conn);
        let user = make_user(&conn, "carol");
        let profile = get_or_create_profile(user.id, &conn).unwrap();

        for food_id in [s.ice_cream, s.curry, s.cake] {
            add_favorite(profile.id, food_id, &conn).unwrap();
        }
        let names: Vec<String> = list_favorites(profile.id, &conn)
            .unwrap()
            .into_iter()
            .map(|card| card.name)
            .collect();
        assert_eq!(names, vec!["Cake", "Curry", "Ice Cream"]);
    }

    #[test]
    fn profile_is_created_once() {
        let conn = test_connection();
        let user = make_user(&conn, "dave");

        let first = get_or_create_profile(user.id, &conn).unwrap();
        let second = get_or_create_profile(user.id, &conn).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.user_id, user.id);
    }

    #[test]
    fn expired_sessions_are_dropped() {
        let conn = test_connection();
        let user = make_user(&conn, "erin");
        let now = chrono::Utc::now().naive_utc();

        insert_session(
            &Session {
                token: "live".to_string(),
                user_id: user.id,
                expire_at: now + chrono::Duration::hours(1),
            },
            &conn,
        )
        .unwrap();
        insert_session(
            &Session {
                token: "stale".to_string(),
                user_id: user.id,
                expire_at: now - chrono::Duration::hours(1),
            },
            &conn,
        )
        .unwrap();

        let owner = find_session_user("live", now, &conn).unwrap().unwrap();
        assert_eq!(owner.username, "erin");
        assert!(find_session_user("stale", now, &conn).unwrap().is_none());
        assert_eq!(purge_expired_sessions(now, &conn).unwrap(), 0);

        delete_session("live", &conn).unwrap();
        assert!(find_session_user("live", now, &conn).unwrap().is_none());
    }

    #[test]
    fn user_details_can_be_updated() {
        let conn = test_connection();
        let user = make_user(&conn, "frank");

        update_user_details(user.id, "frank@example.com", "Frank", "Ocean", &conn).unwrap();
        touch_last_login(user.id, chrono::Utc::now().naive_utc(), &conn).unwrap();

        let reloaded = find_user_by_username("frank", &conn).unwrap().unwrap();
        assert_eq!(reloaded.email, "frank@example.com");
        assert_eq!(reloaded.last_name, "Ocean");
        assert!(reloaded.last_login.is_some());
        assert!(find_user(reloaded.id + 100, &conn).unwrap().is_none());
    }

    #[test]
    fn duplicate_usernames_are_unique_violations() {
        let conn = test_connection();
        make_user(&conn, "grace");

        let duplicate = create_user(
            &NewUser {
                username: "grace",
                password: "not-a-real-hash",
                email: "",
                first_name: "",
                last_name: "",
                is_staff: false,
                date_joined: chrono::Utc::now().naive_utc(),
            },
            &conn,
        )
        .unwrap_err();
        assert!(is_unique_violation(&duplicate));
        assert!(!is_unique_violation(&DbError::from("boom")));
    }

    #[test]
    fn deletes_cascade_through_links_and_accounts() {
        let conn = test_connection();
        let s = seed(&conn);
        let user = make_user(&conn, "heidi");
        let profile = get_or_create_profile(user.id, &conn).unwrap();
        add_favorite(profile.id, s.ice_cream, &conn).unwrap();
        add_favorite(profile.id, s.cake, &conn).unwrap();
        insert_session(
            &Session {
                token: "heidi-session".to_string(),
                user_id: user.id,
                expire_at: chrono::Utc::now().naive_utc() + chrono::Duration::hours(1),
            },
            &conn,
        )
        .unwrap();

        diesel::delete(food::table.find(s.ice_cream)).execute(&conn).unwrap();
        let links: i64 = food_food_types::table
            .filter(food_food_types::food_id.eq(s.ice_cream))
            .count()
            .get_result(&conn)
            .unwrap();
        assert_eq!(links, 0);
        assert_eq!(favorite_ids(profile.id, &conn).unwrap(), vec![s.cake]);

        diesel::delete(food_type::table.find(s.sweet)).execute(&conn).unwrap();
        let cards = food_cards(&[s.cake], None, &conn).unwrap();
        assert!(cards[0].types.is_empty());

        diesel::delete(food_category::table.find(s.dessert)).execute(&conn).unwrap();
        let cake = find_food(s.cake, &conn).unwrap().unwrap();
        assert_eq!(cake.category_id, None);

        diesel::delete(auth_user::table.find(user.id)).execute(&conn).unwrap();
        let profiles: i64 = user_profile::table.count().get_result(&conn).unwrap();
        let favorites: i64 = user_profile_favorites::table.count().get_result(&conn).unwrap();
        let sessions: i64 = session::table.count().get_result(&conn).unwrap();
        assert_eq!((profiles, favorites, sessions), (0, 0, 0));
    }
}
