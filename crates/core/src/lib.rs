//! Mobank core types and utilities
//!
//! Everything the session layer needs that does not touch the network:
//! the data model, credential storage, JWT inspection, form validation,
//! user-facing messages and configuration.

pub mod config;
pub mod error;
pub mod jwt;
pub mod logging;
pub mod messages;
pub mod storage;
pub mod token_store;
pub mod types;
pub mod validation;

pub use config::SessionConfig;
pub use error::{CoreError, CoreResult, StorageError};
pub use jwt::Claims;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use token_store::{TokenKind, TokenStore};
pub use types::{LoginCredentials, Registration, StoredCredentials, UserProfile};
pub use validation::{FieldError, ValidationErrors};
