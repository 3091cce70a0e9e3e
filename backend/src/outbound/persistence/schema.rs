//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly. Money columns hold whole
//! cents.

diesel::table! {
    /// Registered users. `username` and `email` are unique.
    users (id) {
        id -> Int8,
        username -> Varchar,
        email -> Varchar,
        /// Argon2 PHC digest.
        password -> Text,
        about -> Varchar,
        avatar -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Wishes. `CHECK (raised_cents <= price_cents)` guards funding.
    wishes (id) {
        id -> Int8,
        name -> Varchar,
        link -> Text,
        image -> Text,
        description -> Varchar,
        price_cents -> Int8,
        raised_cents -> Int8,
        copied -> Int4,
        owner_id -> Int8,
        /// Source of a copy; unique per owner.
        original_wish_id -> Nullable<Int8>,
        /// Optimistic concurrency token.
        revision -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Immutable funding pledges.
    offers (id) {
        id -> Int8,
        user_id -> Int8,
        item_id -> Int8,
        amount_cents -> Int8,
        hidden -> Bool,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    wishlists (id) {
        id -> Int8,
        name -> Varchar,
        description -> Varchar,
        image -> Text,
        owner_id -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Many-to-many association between wishlists and wishes.
    wishlist_items (wishlist_id, wish_id) {
        wishlist_id -> Int8,
        wish_id -> Int8,
        /// Order within the wishlist.
        position -> Int4,
    }
}

diesel::joinable!(offers -> wishes (item_id));
diesel::joinable!(wishlist_items -> wishlists (wishlist_id));
diesel::joinable!(wishes -> users (owner_id));
diesel::joinable!(wishlists -> users (owner_id));

diesel::allow_tables_to_appear_in_same_query!(offers, users, wishes, wishlist_items, wishlists);
