use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    CatalogSnapshot, CreatePurchasingCmd, DetailRecord, EngineError, Item, PricedPurchase,
    Purchasing, PurchasingDetail, PurchasingRecord, ResultEngine, Supplier, User, items,
    pricing, purchasing_details, purchasings, suppliers, users,
};

use super::Engine;

impl Engine {
    /// Validate and price a request against the current catalog.
    ///
    /// Nothing is written. Shape errors are reported before the store is
    /// touched; an unknown acting user is rejected as unauthorized before the
    /// supplier or any item is looked up.
    pub async fn price_purchase(&self, cmd: &CreatePurchasingCmd) -> ResultEngine<PricedPurchase> {
        pricing::validate_lines(&cmd.lines)?;

        let user_known = users::Entity::find_by_id(cmd.user_id)
            .one(&self.database)
            .await?
            .is_some();
        if !user_known {
            return Err(EngineError::Unauthorized(format!(
                "user {} does not exist",
                cmd.user_id
            )));
        }
        self.require_supplier(&self.database, cmd.supplier_id)
            .await?;

        let item_ids: BTreeSet<i32> = cmd.lines.iter().map(|line| line.item_id).collect();
        let models = items::Entity::find()
            .filter(items::Column::Id.is_in(item_ids))
            .all(&self.database)
            .await?;
        let snapshot = CatalogSnapshot::new(models.into_iter().map(Item::from));

        pricing::price_purchase(cmd.supplier_id, &cmd.lines, &snapshot)
    }

    /// Persist a priced purchase as one unit: header, then for every line in
    /// order its detail and its stock increment.
    ///
    /// Any failure rolls the whole unit back and surfaces as
    /// [`EngineError::Transaction`]. Returns the new purchasing id.
    pub(crate) async fn commit_purchasing(
        &self,
        user_id: i32,
        priced: &PricedPurchase,
        date: DateTime<Utc>,
    ) -> ResultEngine<i32> {
        let db_tx = self.database.begin().await.map_err(|err| {
            tracing::error!("cannot open purchasing unit: {err}");
            EngineError::Transaction(err.to_string())
        })?;

        match write_purchasing(&db_tx, user_id, priced, date).await {
            Ok(purchasing_id) => {
                db_tx.commit().await.map_err(|err| {
                    tracing::error!(purchasing_id, "purchasing commit failed: {err}");
                    EngineError::Transaction(err.to_string())
                })?;
                Ok(purchasing_id)
            }
            Err(err) => {
                if let Err(rollback_err) = db_tx.rollback().await {
                    tracing::error!("purchasing rollback failed: {rollback_err}");
                }
                tracing::warn!(
                    supplier_id = priced.supplier_id,
                    user_id,
                    "purchasing unit rolled back: {err}"
                );
                Err(EngineError::Transaction(err.to_string()))
            }
        }
    }

    /// Create a purchasing transaction.
    ///
    /// Validation and pricing happen first and write nothing. The unit is
    /// then committed, reloaded with its relations and, when a notifier is
    /// configured, handed to it. Notification never affects the result. A
    /// failed reload after commit reports the committed id through
    /// [`EngineError::Unloaded`].
    #[tracing::instrument(
        name = "create_purchasing",
        skip(self, cmd),
        fields(
            supplier_id = cmd.supplier_id,
            user_id = cmd.user_id,
            lines = cmd.lines.len()
        )
    )]
    pub async fn create_purchasing(&self, cmd: CreatePurchasingCmd) -> ResultEngine<PurchasingRecord> {
        let priced = self.price_purchase(&cmd).await?;
        let purchasing_id = self
            .commit_purchasing(cmd.user_id, &priced, Utc::now())
            .await?;
        tracing::info!(
            purchasing_id,
            grand_total = %priced.grand_total,
            "purchasing committed"
        );

        let record = self
            .purchasing(purchasing_id)
            .await
            .map_err(|err| reload_failure(purchasing_id, err))?;

        if let Some(notifier) = &self.notifier {
            let outcome = notifier.dispatch(cmd.webhook_url.as_deref(), record.created_event(Utc::now()));
            tracing::debug!(purchasing_id, ?outcome, "purchasing notification handed off");
        }

        Ok(record)
    }

    /// One purchasing with supplier, user and details with their items.
    pub async fn purchasing(&self, purchasing_id: i32) -> ResultEngine<PurchasingRecord> {
        let (header, supplier) = purchasings::Entity::find_by_id(purchasing_id)
            .find_also_related(suppliers::Entity)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("purchasing {purchasing_id}")))?;
        let supplier = supplier.ok_or_else(|| {
            EngineError::Database(DbErr::RecordNotFound(format!(
                "supplier {} of purchasing {purchasing_id}",
                header.supplier_id
            )))
        })?;
        let user = users::Entity::find_by_id(header.user_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| {
                EngineError::Database(DbErr::RecordNotFound(format!(
                    "user {} of purchasing {purchasing_id}",
                    header.user_id
                )))
            })?;

        let details = purchasing_details::Entity::find()
            .filter(purchasing_details::Column::PurchasingId.eq(purchasing_id))
            .order_by_asc(purchasing_details::Column::Id)
            .find_also_related(items::Entity)
            .all(&self.database)
            .await?
            .into_iter()
            .map(|(detail, item)| {
                let item = item.ok_or_else(|| {
                    EngineError::Database(DbErr::RecordNotFound(format!(
                        "item {} of purchasing {purchasing_id}",
                        detail.item_id
                    )))
                })?;
                Ok(DetailRecord {
                    detail: PurchasingDetail::from(detail),
                    item: Item::from(item),
                })
            })
            .collect::<ResultEngine<Vec<_>>>()?;

        Ok(PurchasingRecord {
            purchasing: Purchasing::from(header),
            supplier: Supplier::from(supplier),
            user: User::try_from(user)?,
            details,
        })
    }

    /// Purchasing headers, newest first.
    pub async fn purchasings(&self) -> ResultEngine<Vec<Purchasing>> {
        let models = purchasings::Entity::find()
            .order_by_desc(purchasings::Column::Date)
            .order_by_desc(purchasings::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Purchasing::from).collect())
    }
}

async fn write_purchasing(
    db_tx: &DatabaseTransaction,
    user_id: i32,
    priced: &PricedPurchase,
    date: DateTime<Utc>,
) -> ResultEngine<i32> {
    let header = purchasings::ActiveModel {
        id: ActiveValue::NotSet,
        date: ActiveValue::Set(date),
        supplier_id: ActiveValue::Set(priced.supplier_id),
        user_id: ActiveValue::Set(user_id),
        grand_total_minor: ActiveValue::Set(priced.grand_total.cents()),
    }
    .insert(db_tx)
    .await?;

    for line in &priced.lines {
        purchasing_details::ActiveModel {
            id: ActiveValue::NotSet,
            purchasing_id: ActiveValue::Set(header.id),
            item_id: ActiveValue::Set(line.item_id),
            qty: ActiveValue::Set(line.qty),
            sub_total_minor: ActiveValue::Set(line.sub_total.cents()),
        }
        .insert(db_tx)
        .await?;

        let touched =
            items::increment_stock(db_tx, line.item_id, priced.supplier_id, line.qty).await?;
        if touched == 0 {
            return Err(EngineError::Conflict(format!(
                "item {} no longer belongs to supplier {}",
                line.item_id, priced.supplier_id
            )));
        }
    }

    Ok(header.id)
}

fn reload_failure(purchasing_id: i32, err: EngineError) -> EngineError {
    tracing::error!(purchasing_id, "committed purchasing could not be reloaded: {err}");
    EngineError::Unloaded {
        purchasing_id,
        reason: err.to_string(),
    }
}
