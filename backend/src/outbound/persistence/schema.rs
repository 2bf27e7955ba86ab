//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered users. `email` carries a unique index.
    users (id) {
        /// Primary key assigned from a `BIGSERIAL` sequence.
        id -> Int8,
        name -> Varchar,
        email -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Posts, each owned by one user. Rows are removed with their owner.
    posts (id) {
        id -> Int8,
        title -> Varchar,
        content -> Text,
        /// Owning user; `REFERENCES users (id) ON DELETE CASCADE`.
        user_id -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(posts -> users (user_id));
diesel::allow_tables_to_appear_in_same_query!(posts, users);
