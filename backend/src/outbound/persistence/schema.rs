//! Diesel table definitions mirroring `backend/migrations`.
//!
//! Keep in sync with the migrations by hand or with `diesel print-schema`.

diesel::table! {
    /// Accounts that may sign in.
    users (id) {
        id -> Int8,
        /// Unique, case-sensitive login name.
        username -> Varchar,
        /// bcrypt hash; never selected into API responses.
        password -> Varchar,
        is_staff -> Bool,
        is_active -> Bool,
        date_joined -> Timestamptz,
    }
}

diesel::table! {
    /// One API token per user.
    auth_tokens (key) {
        key -> Varchar,
        user_id -> Int8,
        created -> Timestamptz,
    }
}

diesel::joinable!(auth_tokens -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(auth_tokens, users);
