//! Purchasing details (line items).

use api_types::Money;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurchasingDetail {
    pub id: i32,
    pub purchasing_id: i32,
    pub item_id: i32,
    pub qty: i64,
    /// Unit price at transaction time multiplied by `qty`.
    pub sub_total: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "purchasing_details")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub purchasing_id: i32,
    pub item_id: i32,
    pub qty: i64,
    pub sub_total_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchasings::Entity",
        from = "Column::PurchasingId",
        to = "super::purchasings::Column::Id"
    )]
    Purchasing,
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::Id"
    )]
    Item,
}

impl Related<super::purchasings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchasing.def()
    }
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for PurchasingDetail {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            purchasing_id: model.purchasing_id,
            item_id: model.item_id,
            qty: model.qty,
            sub_total: Money::new(model.sub_total_minor),
        }
    }
}
