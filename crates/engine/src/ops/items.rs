use sea_orm::{ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, Item, NewItemCmd, ResultEngine, UpdateItemCmd, items, purchasing_details,
};

use super::{Engine, normalize_required_name, with_tx};

fn check_price(price: crate::Money) -> ResultEngine<()> {
    if price.is_negative() {
        return Err(EngineError::InvalidInput(
            "price must not be negative".to_string(),
        ));
    }
    Ok(())
}

impl Engine {
    async fn require_item<C>(&self, db: &C, item_id: i32) -> ResultEngine<items::Model>
    where
        C: sea_orm::ConnectionTrait,
    {
        items::Entity::find_by_id(item_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("item {item_id}")))
    }

    /// Add an item to the catalog of an existing supplier.
    pub async fn new_item(&self, cmd: NewItemCmd) -> ResultEngine<Item> {
        let name = normalize_required_name(&cmd.name, "item")?;
        check_price(cmd.price)?;
        if cmd.stock < 0 {
            return Err(EngineError::InvalidInput(
                "stock must not be negative".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            self.require_supplier(&db_tx, cmd.supplier_id).await?;
            let model = items::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name),
                stock: ActiveValue::Set(cmd.stock),
                price_minor: ActiveValue::Set(cmd.price.cents()),
                supplier_id: ActiveValue::Set(cmd.supplier_id),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!(item_id = model.id, supplier_id = model.supplier_id, "item created");
            Ok(Item::from(model))
        })
    }

    /// Catalog items ordered by id, optionally restricted to one supplier.
    pub async fn items(&self, supplier_id: Option<i32>) -> ResultEngine<Vec<Item>> {
        let mut query = items::Entity::find().order_by_asc(items::Column::Id);
        if let Some(supplier_id) = supplier_id {
            self.require_supplier(&self.database, supplier_id).await?;
            query = query.filter(items::Column::SupplierId.eq(supplier_id));
        }
        let models = query.all(&self.database).await?;
        Ok(models.into_iter().map(Item::from).collect())
    }

    pub async fn item(&self, item_id: i32) -> ResultEngine<Item> {
        self.require_item(&self.database, item_id)
            .await
            .map(Item::from)
    }

    /// Update name, price and owning supplier. Stock is left untouched.
    pub async fn update_item(&self, item_id: i32, cmd: UpdateItemCmd) -> ResultEngine<Item> {
        let name = normalize_required_name(&cmd.name, "item")?;
        check_price(cmd.price)?;
        with_tx!(self, |db_tx| {
            let existing = self.require_item(&db_tx, item_id).await?;
            if existing.supplier_id != cmd.supplier_id {
                self.require_supplier(&db_tx, cmd.supplier_id).await?;
            }
            let mut model: items::ActiveModel = existing.into();
            model.name = ActiveValue::Set(name);
            model.price_minor = ActiveValue::Set(cmd.price.cents());
            model.supplier_id = ActiveValue::Set(cmd.supplier_id);
            let updated = model.update(&db_tx).await?;
            Ok(Item::from(updated))
        })
    }

    /// Delete an item that no purchasing detail refers to.
    pub async fn delete_item(&self, item_id: i32) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_item(&db_tx, item_id).await?;
            let referenced = purchasing_details::Entity::find()
                .filter(purchasing_details::Column::ItemId.eq(item_id))
                .count(&db_tx)
                .await?;
            if referenced > 0 {
                return Err(EngineError::Conflict(format!(
                    "item {item_id} is referenced by purchasings"
                )));
            }
            items::Entity::delete_by_id(item_id).exec(&db_tx).await?;
            tracing::info!(item_id, "item deleted");
            Ok(())
        })
    }
}
