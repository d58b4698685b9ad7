//! The module contains the errors the engine can throw.
//!
//! Every [`EngineError`] belongs to exactly one [`ErrorKind`]; transports map
//! the kind, never the variant, to their own status codes.
use sea_orm::DbErr;
use thiserror::Error;

/// Closed set of error categories exposed to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input shape: empty lines, non-positive quantity, blank names.
    Validation,
    /// Unknown supplier, item, user or purchasing, including an item that
    /// does not belong to the requested supplier.
    NotFound,
    Unauthorized,
    /// Duplicate keys and deletes blocked by references.
    Conflict,
    /// Store failures, including an aborted purchasing unit.
    Internal,
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("\"{0}\" not found!")]
    KeyNotFound(String),
    #[error("Item {item_id} does not belong to supplier {supplier_id}")]
    SupplierMismatch { item_id: i32, supplier_id: i32 },
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    /// The purchasing unit was aborted and rolled back.
    #[error("Purchasing transaction aborted: {0}")]
    Transaction(String),
    /// The purchasing unit is durable but reading it back failed. Callers
    /// must not retry the request.
    #[error("Purchasing {purchasing_id} was committed but could not be loaded: {reason}")]
    Unloaded { purchasing_id: i32, reason: String },
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::Validation,
            Self::KeyNotFound(_) | Self::SupplierMismatch { .. } => ErrorKind::NotFound,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::ExistingKey(_) | Self::Conflict(_) => ErrorKind::Conflict,
            Self::Transaction(_) | Self::Unloaded { .. } | Self::Database(_) => {
                ErrorKind::Internal
            }
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (
                Self::SupplierMismatch {
                    item_id: a,
                    supplier_id: sa,
                },
                Self::SupplierMismatch {
                    item_id: b,
                    supplier_id: sb,
                },
            ) => a == b && sa == sb,
            (Self::Unauthorized(a), Self::Unauthorized(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Transaction(a), Self::Transaction(b)) => a == b,
            (
                Self::Unloaded {
                    purchasing_id: a,
                    reason: ra,
                },
                Self::Unloaded {
                    purchasing_id: b,
                    reason: rb,
                },
            ) => a == b && ra == rb,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
