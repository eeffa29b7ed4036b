//! Wire types for the Bring! REST API.

use serde::{Deserialize, Serialize};

/// A shopping list as returned by the lists endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ShoppingList {
    #[serde(rename = "listUuid")]
    pub list_uuid: String,
    pub name: String,
    #[serde(default)]
    pub theme: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoadListsResponse {
    #[serde(default)]
    pub lists: Vec<ShoppingList>,
}

/// An item on a list, with its optional specification ("500 g", "ripe").
#[derive(Debug, Clone, Deserialize)]
pub struct ListItem {
    pub name: String,
    #[serde(default)]
    pub specification: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListItemsResponse {
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub purchase: Vec<ListItem>,
    #[serde(default)]
    pub recently: Vec<ListItem>,
}

/// Account details for the authenticated user.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub public_user_uuid: String,
    #[serde(default)]
    pub user_uuid: String,
    #[serde(default)]
    pub user_locale: Option<LocaleValue>,
}

/// The API serves the locale either as a plain tag or as an object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LocaleValue {
    Tag(String),
    Parts {
        language: String,
        #[serde(default)]
        country: Option<String>,
    },
    Other(serde_json::Value),
}

impl std::fmt::Display for LocaleValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocaleValue::Tag(tag) => write!(f, "{tag}"),
            LocaleValue::Parts { language, country } => match country {
                Some(country) if !country.is_empty() => write!(f, "{language}-{country}"),
                _ => write!(f, "{language}"),
            },
            LocaleValue::Other(_) => Ok(()),
        }
    }
}

/// Error envelope the service may return, even with HTTP 200.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub error_description: String,
    #[serde(default)]
    pub errorcode: i64,
}

/// Batch operation applied to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemOperation {
    #[serde(rename = "TO_PURCHASE")]
    ToPurchase,
    #[serde(rename = "TO_RECENTLY")]
    ToRecently,
    #[serde(rename = "REMOVE")]
    Remove,
}

/// One item in a batch update request.
#[derive(Debug, Clone, Default)]
pub struct BatchUpdateItem {
    pub item_id: String,
    pub spec: Option<String>,
    pub uuid: Option<String>,
}
