use sea_orm::{ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, ResultEngine, Supplier, SupplierCmd, items, purchasings, suppliers,
};

use super::{Engine, normalize_optional_text, normalize_required_name, with_tx};

fn normalize_email(value: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    match trimmed.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
            Ok(trimmed.to_string())
        }
        _ => Err(EngineError::InvalidInput(format!("invalid email: {trimmed}"))),
    }
}

impl Engine {
    pub(super) async fn require_supplier<C>(&self, db: &C, supplier_id: i32) -> ResultEngine<suppliers::Model>
    where
        C: sea_orm::ConnectionTrait,
    {
        suppliers::Entity::find_by_id(supplier_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("supplier {supplier_id}")))
    }

    /// Add a new supplier.
    pub async fn new_supplier(&self, cmd: SupplierCmd) -> ResultEngine<Supplier> {
        let name = normalize_required_name(&cmd.name, "supplier")?;
        let email = normalize_email(&cmd.email)?;
        let model = suppliers::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name),
            email: ActiveValue::Set(email),
            address: ActiveValue::Set(normalize_optional_text(cmd.address.as_deref())),
        }
        .insert(&self.database)
        .await?;
        tracing::info!(supplier_id = model.id, "supplier created");
        Ok(model.into())
    }

    /// All suppliers ordered by id.
    pub async fn suppliers(&self) -> ResultEngine<Vec<Supplier>> {
        let models = suppliers::Entity::find()
            .order_by_asc(suppliers::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Supplier::from).collect())
    }

    pub async fn supplier(&self, supplier_id: i32) -> ResultEngine<Supplier> {
        self.require_supplier(&self.database, supplier_id)
            .await
            .map(Supplier::from)
    }

    /// Replace name, email and address of an existing supplier.
    pub async fn update_supplier(&self, supplier_id: i32, cmd: SupplierCmd) -> ResultEngine<Supplier> {
        let name = normalize_required_name(&cmd.name, "supplier")?;
        let email = normalize_email(&cmd.email)?;
        with_tx!(self, |db_tx| {
            let existing = self.require_supplier(&db_tx, supplier_id).await?;
            let mut model: suppliers::ActiveModel = existing.into();
            model.name = ActiveValue::Set(name);
            model.email = ActiveValue::Set(email);
            model.address = ActiveValue::Set(normalize_optional_text(cmd.address.as_deref()));
            let updated = model.update(&db_tx).await?;
            Ok(Supplier::from(updated))
        })
    }

    /// Delete a supplier that no item and no purchasing refers to.
    pub async fn delete_supplier(&self, supplier_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_supplier(&db_tx, supplier_id).await?;

            let item_count = items::Entity::find()
                .filter(items::Column::SupplierId.eq(supplier_id))
                .count(&db_tx)
                .await?;
            if item_count > 0 {
                return Err(EngineError::Conflict(format!(
                    "supplier {supplier_id} still has {item_count} item(s)"
                )));
            }

            let purchasing_count = purchasings::Entity::find()
                .filter(purchasings::Column::SupplierId.eq(supplier_id))
                .count(&db_tx)
                .await?;
            if purchasing_count > 0 {
                return Err(EngineError::Conflict(format!(
                    "supplier {supplier_id} is referenced by purchasings"
                )));
            }

            suppliers::Entity::delete_by_id(supplier_id)
                .exec(&db_tx)
                .await?;
            tracing::info!(supplier_id, "supplier deleted");
            Ok(())
        })
    }
}
