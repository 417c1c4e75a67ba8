//! HTTP inbound adapter exposing REST endpoints.

pub mod avatars;
pub mod error;
pub mod health;
pub mod registration_form;
pub mod state;
pub mod users;

pub use error::ApiResult;
