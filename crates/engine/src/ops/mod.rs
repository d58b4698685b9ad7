use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine, notifier::Notifier};

mod items;
mod purchasing;
mod suppliers;
mod users;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point of every catalog, user and purchasing operation.
///
/// The database handle and the optional notifier are handed in by whoever
/// owns the process; the engine never opens or looks them up on its own.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    notifier: Option<Notifier>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    notifier: Option<Notifier>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Notifier used after each committed purchasing. Without one, no
    /// webhook is ever sent.
    pub fn notifier(mut self, notifier: Notifier) -> EngineBuilder {
        self.notifier = Some(notifier);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            notifier: self.notifier,
        })
    }
}
