table! {
    food_category (id) {
        id -> Integer,
        name -> Text,
    }
}

table! {
    food_type (id) {
        id -> Integer,
        name -> Text,
    }
}

table! {
    food (id) {
        id -> Integer,
        name -> Text,
        category_id -> Nullable<Integer>,
        favorite_count -> Integer,
    }
}

table! {
    food_food_types (food_id, food_type_id) {
        food_id -> Integer,
        food_type_id -> Integer,
    }
}

table! {
    auth_user (id) {
        id -> Integer,
        username -> Text,
        password -> Text,
        email -> Text,
        first_name -> Text,
        last_name -> Text,
        is_staff -> Bool,
        date_joined -> Timestamp,
        last_login -> Nullable<Timestamp>,
    }
}

table! {
    user_profile (id) {
        id -> Integer,
        user_id -> Integer,
    }
}

table! {
    user_profile_favorites (profile_id, food_id) {
        profile_id -> Integer,
        food_id -> Integer,
    }
}

table! {
    session (token) {
        token -> Text,
        user_id -> Integer,
        expire_at -> Timestamp,
    }
}

joinable!(food -> food_category (category_id));
joinable!(food_food_types -> food (food_id));
joinable!(food_food_types -> food_type (food_type_id));
joinable!(user_profile -> auth_user (user_id));
joinable!(user_profile_favorites -> food (food_id));
joinable!(user_profile_favorites -> user_profile (profile_id));
joinable!(session -> auth_user (user_id));

allow_tables_to_appear_in_same_query!(
    auth_user,
    food,
    food_category,
    food_food_types,
    food_type,
    session,
    user_profile,
    user_profile_favorites,
);
