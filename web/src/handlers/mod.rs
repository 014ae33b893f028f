//! Handlers shared by every deployment of the API.

pub mod health;

pub use health::{method_not_allowed, not_found, root};
