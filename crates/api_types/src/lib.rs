//! Wire types of the journal persistence service.
//!
//! Every payload is JSON with camelCase field names. Requests always carry the
//! `userId` of the caller, either in the body or as a query parameter.
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error body returned by the service on any non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Query string used by list and delete endpoints (`?userId=<id>`).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: String,
}

pub mod entry {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum EntryKind {
        Income,
        Expense,
    }

    /// The two independent ledgers kept for every user.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum JournalType {
        Personal,
        Business,
    }

    /// A ledger entry as stored by the service.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EntryView {
        pub id: Uuid,
        /// RFC3339 timestamp of the financial event, including the user's offset.
        pub date: DateTime<FixedOffset>,
        #[serde(rename = "type")]
        pub kind: EntryKind,
        /// Always > 0. The kind defines the direction.
        pub amount_minor: i64,
        pub category_id: String,
        pub note: Option<String>,
        pub journal_type: JournalType,
        pub created_at: DateTime<Utc>,
        /// Write counter assigned by the service.
        #[serde(default)]
        pub revision: u64,
    }

    /// `POST /entries`
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EntryCreate {
        pub user_id: String,
        /// Client generated id, echoed back by the service.
        pub id: Uuid,
        pub date: DateTime<FixedOffset>,
        #[serde(rename = "type")]
        pub kind: EntryKind,
        pub amount_minor: i64,
        pub category_id: String,
        pub note: Option<String>,
        pub journal_type: JournalType,
        pub created_at: DateTime<Utc>,
    }

    /// `PUT /entries/{id}`
    ///
    /// Absent fields are left untouched. The service answers `409` when
    /// `base_revision` is not the stored revision.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct EntryUpdate {
        pub user_id: String,
        pub base_revision: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub date: Option<DateTime<FixedOffset>>,
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        pub kind: Option<EntryKind>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub amount_minor: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub category_id: Option<String>,
        /// An empty string clears the note.
        #[serde(skip_serializing_if = "Option::is_none")]
        pub note: Option<String>,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CategoryKind {
        Income,
        Expense,
        Both,
    }

    /// A custom category as stored by the service.
    ///
    /// Built-in categories are compiled into the client and never travel on
    /// the wire.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryView {
        pub id: String,
        pub name: String,
        pub icon: String,
        #[serde(rename = "type")]
        pub kind: CategoryKind,
        #[serde(default = "custom_default")]
        pub is_custom: bool,
    }

    fn custom_default() -> bool {
        true
    }

    /// `POST /categories`
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryCreate {
        pub user_id: String,
        pub id: String,
        pub name: String,
        pub icon: String,
        #[serde(rename = "type")]
        pub kind: CategoryKind,
    }

    /// `PUT /categories/{id}`
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryUpdate {
        pub user_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub icon: Option<String>,
        #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
        pub kind: Option<CategoryKind>,
    }
}
