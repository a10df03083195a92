//! Business logic services layer

pub mod auth_service;
pub mod credential_store;
pub mod user_service;

pub use auth_service::AuthService;
pub use credential_store::{CredentialStore, ProfileChanges};
pub use user_service::UserService;
