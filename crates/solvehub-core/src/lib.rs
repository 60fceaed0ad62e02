//! # solvehub-core
//!
//! Core types, traits, and abstractions for the SolveHub Q&A platform.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other SolveHub crates depend on.

pub mod auth;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod password;
pub mod slug;
pub mod traits;

// Re-export commonly used types at crate root
pub use auth::{AuthToken, TokenSigner};
pub use dispatch::{NewNotification, NotificationDispatcher};
pub use error::{Error, Result};
pub use events::{NotificationBus, NotificationEvent};
pub use models::*;
pub use password::{hash_password, verify_password};
pub use slug::slugify;
pub use traits::*;
