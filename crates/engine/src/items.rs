//! Catalog items.
//!
//! The price stored here is authoritative: purchasing requests never carry a
//! price. Stock only moves through [`increment_stock`], which the purchasing
//! unit calls inside its database transaction.

use api_types::Money;
use sea_orm::{ConnectionTrait, entity::prelude::*, sea_query::Expr};

/// An item of the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub id: i32,
    pub name: String,
    /// Units on hand, never negative.
    pub stock: i64,
    pub price: Money,
    pub supplier_id: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub stock: i64,
    pub price_minor: i64,
    pub supplier_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::suppliers::Entity",
        from = "Column::SupplierId",
        to = "super::suppliers::Column::Id"
    )]
    Supplier,
    #[sea_orm(has_many = "super::purchasing_details::Entity")]
    PurchasingDetails,
}

impl Related<super::suppliers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::purchasing_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchasingDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Item {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            stock: model.stock,
            price: Money::new(model.price_minor),
            supplier_id: model.supplier_id,
        }
    }
}

impl From<Item> for api_types::item::Item {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            stock: item.stock,
            price: item.price,
            supplier_id: item.supplier_id,
        }
    }
}

/// Add `qty` units to an item owned by `supplier_id`.
///
/// Runs as one `UPDATE ... SET stock = stock + ?` so concurrent purchases of
/// the same item serialize in the store instead of overwriting each other.
/// Returns the number of rows touched: `0` means the item is gone or no
/// longer belongs to the supplier.
pub(crate) async fn increment_stock<C>(
    db: &C,
    item_id: i32,
    supplier_id: i32,
    qty: i64,
) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let result = Entity::update_many()
        .col_expr(Column::Stock, Expr::col(Column::Stock).add(qty))
        .filter(Column::Id.eq(item_id))
        .filter(Column::SupplierId.eq(supplier_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
