//! Command structs for engine write operations.
//!
//! These types group parameters for catalog and purchasing writes, keeping
//! call sites readable and avoiding long argument lists.

use api_types::Money;

/// One requested purchase line. Carries no price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PurchaseLine {
    pub item_id: i32,
    pub qty: i64,
}

impl PurchaseLine {
    #[must_use]
    pub fn new(item_id: i32, qty: i64) -> Self {
        Self { item_id, qty }
    }
}

/// Create a purchasing transaction.
#[derive(Clone, Debug)]
pub struct CreatePurchasingCmd {
    pub supplier_id: i32,
    /// Acting user, already authenticated by the caller.
    pub user_id: i32,
    pub lines: Vec<PurchaseLine>,
    /// Per-request webhook endpoint, wins over the notifier default.
    pub webhook_url: Option<String>,
}

impl CreatePurchasingCmd {
    #[must_use]
    pub fn new(supplier_id: i32, user_id: i32) -> Self {
        Self {
            supplier_id,
            user_id,
            lines: Vec::new(),
            webhook_url: None,
        }
    }

    #[must_use]
    pub fn line(mut self, item_id: i32, qty: i64) -> Self {
        self.lines.push(PurchaseLine::new(item_id, qty));
        self
    }

    #[must_use]
    pub fn lines(mut self, lines: impl IntoIterator<Item = PurchaseLine>) -> Self {
        self.lines.extend(lines);
        self
    }

    #[must_use]
    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }
}

/// Create or replace a supplier.
#[derive(Clone, Debug)]
pub struct SupplierCmd {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
}

impl SupplierCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            address: None,
        }
    }

    #[must_use]
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

/// Create an item with its opening stock.
#[derive(Clone, Debug)]
pub struct NewItemCmd {
    pub name: String,
    pub stock: i64,
    pub price: Money,
    pub supplier_id: i32,
}

impl NewItemCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, price: Money, supplier_id: i32) -> Self {
        Self {
            name: name.into(),
            stock: 0,
            price,
            supplier_id,
        }
    }

    #[must_use]
    pub fn stock(mut self, stock: i64) -> Self {
        self.stock = stock;
        self
    }
}

/// Update the descriptive fields of an item. Stock is not editable here.
#[derive(Clone, Debug)]
pub struct UpdateItemCmd {
    pub name: String,
    pub price: Money,
    pub supplier_id: i32,
}
