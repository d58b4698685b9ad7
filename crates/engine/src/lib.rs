pub use api_types::Money;
pub use commands::{CreatePurchasingCmd, NewItemCmd, PurchaseLine, SupplierCmd, UpdateItemCmd};
pub use error::{EngineError, ErrorKind};
pub use items::Item;
pub use notifier::{
    DispatchOutcome, Notifier, NotifierConfig, NotifierStatsSnapshot, resolve_endpoint,
};
pub use ops::{Engine, EngineBuilder};
pub use pricing::{CatalogSnapshot, PricedLine, PricedPurchase, price_purchase, validate_lines};
pub use purchasing_details::PurchasingDetail;
pub use purchasings::{DetailRecord, Purchasing, PurchasingRecord};
pub use suppliers::Supplier;
pub use users::User;

mod commands;
mod error;
mod items;
mod notifier;
mod ops;
mod pricing;
mod purchasing_details;
mod purchasings;
mod suppliers;
mod users;

pub type ResultEngine<T> = Result<T, EngineError>;
