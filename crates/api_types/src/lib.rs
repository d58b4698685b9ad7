use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use money::{Money, MoneyError};

mod money;

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod health {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Health {
        pub status: String,
        pub version: String,
    }
}

pub mod user {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Role {
        Admin,
        Staff,
    }

    impl Role {
        /// Returns the canonical role string stored in the database.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Admin => "admin",
                Self::Staff => "staff",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value {
                "admin" => Some(Self::Admin),
                "staff" => Some(Self::Staff),
                _ => None,
            }
        }
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterUser {
        pub username: String,
        pub password: String,
        pub role: Role,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginUser {
        pub username: String,
        pub password: String,
    }

    /// A user as exposed by the API. The password hash never leaves the server.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct User {
        pub id: i32,
        pub username: String,
        pub role: Role,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginResponse {
        pub token: String,
        pub user: User,
    }
}

pub mod supplier {
    use super::*;

    /// Request body for creating or replacing a supplier.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SupplierNew {
        pub name: String,
        pub email: String,
        pub address: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Supplier {
        pub id: i32,
        pub name: String,
        pub email: String,
        pub address: Option<String>,
    }
}

pub mod item {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ItemNew {
        pub name: String,
        #[serde(default)]
        pub stock: i64,
        pub price: Money,
        pub supplier_id: i32,
    }

    /// Request body for updating an item.
    ///
    /// Has no stock field: stock only changes through purchasing
    /// transactions.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ItemUpdate {
        pub name: String,
        pub price: Money,
        pub supplier_id: i32,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ItemQuery {
        pub supplier_id: Option<i32>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Item {
        pub id: i32,
        pub name: String,
        pub stock: i64,
        pub price: Money,
        pub supplier_id: i32,
    }
}

pub mod purchasing {
    use super::*;
    use crate::{item::Item, supplier::Supplier, user::User};

    /// Event name carried by the post-commit webhook.
    pub const PURCHASING_CREATED_EVENT: &str = "purchasing.created";

    /// One requested line. Prices are never accepted from the caller.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PurchasingLineNew {
        pub item_id: i32,
        pub qty: i64,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PurchasingNew {
        pub supplier_id: i32,
        pub details: Vec<PurchasingLineNew>,
    }

    /// Header with its supplier and acting user.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PurchasingView {
        pub id: i32,
        pub date: DateTime<Utc>,
        pub supplier_id: i32,
        pub user_id: i32,
        pub grand_total: Money,
        pub supplier: Supplier,
        pub user: User,
    }

    /// Committed line with the purchased item as it is after the commit.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PurchasingDetailView {
        pub id: i32,
        pub purchasing_id: i32,
        pub item_id: i32,
        pub qty: i64,
        pub sub_total: Money,
        pub item: Item,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchasingCreated {
        pub message: String,
        pub purchasing: PurchasingView,
        pub details: Vec<PurchasingDetailView>,
    }

    /// Header row in listings.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PurchasingSummary {
        pub id: i32,
        pub date: DateTime<Utc>,
        pub supplier_id: i32,
        pub user_id: i32,
        pub grand_total: Money,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchasingListResponse {
        pub purchasings: Vec<PurchasingSummary>,
    }

    /// Payload POSTed to the webhook endpoint after a purchasing commits.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct PurchasingEvent {
        pub event: String,
        /// RFC 3339 timestamp of when the event was built.
        pub timestamp: String,
        pub purchasing: PurchasingView,
        pub details: Vec<PurchasingDetailView>,
    }
}
