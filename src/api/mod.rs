//! Bring! REST API client.
//!
//! Covers the list/item surface the CLI needs plus the account lookup used
//! to validate freshly acquired credentials. All requests carry the
//! service's fixed header set; authentication is the bearer token produced
//! by the login pipeline.

mod client;
mod error;
mod types;

pub use client::{ApiConfig, BringClient, TokenAuth, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use error::{ApiError, Result};
pub use types::{
    BatchUpdateItem, ItemOperation, ListItem, ListItemsResponse, LoadListsResponse, LocaleValue,
    ShoppingList, UserAccount,
};
