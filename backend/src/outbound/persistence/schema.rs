//! Diesel table definitions. Must match `migrations/` exactly.

diesel::table! {
    /// Registered accounts. `pseudo`, `email` and `phone` are unique.
    accounts (id) {
        id -> Uuid,
        last_name -> Varchar,
        first_name -> Varchar,
        pseudo -> Varchar,
        email -> Varchar,
        /// Argon2id PHC string; never the plaintext.
        password_hash -> Text,
        phone -> Varchar,
        birthday -> Date,
        /// Storage key of the avatar, relative to the avatar root.
        avatar -> Nullable<Text>,
        created_at -> Timestamptz,
    }
}
