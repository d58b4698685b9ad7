//! Purchasing headers.
//!
//! A header is written once, together with its details, by the purchasing
//! unit and never updated afterwards.

use api_types::{
    Money,
    purchasing::{
        PURCHASING_CREATED_EVENT, PurchasingDetailView, PurchasingEvent, PurchasingSummary,
        PurchasingView,
    },
};
use chrono::{DateTime, SecondsFormat, Utc};
use sea_orm::entity::prelude::*;

use crate::{Item, PurchasingDetail, Supplier, User};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Purchasing {
    pub id: i32,
    pub date: DateTime<Utc>,
    pub supplier_id: i32,
    pub user_id: i32,
    /// Sum of the detail subtotals at creation time.
    pub grand_total: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "purchasings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub date: DateTimeUtc,
    pub supplier_id: i32,
    pub user_id: i32,
    pub grand_total_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::suppliers::Entity",
        from = "Column::SupplierId",
        to = "super::suppliers::Column::Id"
    )]
    Supplier,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::purchasing_details::Entity")]
    PurchasingDetails,
}

impl Related<super::suppliers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::purchasing_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchasingDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Purchasing {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            date: model.date,
            supplier_id: model.supplier_id,
            user_id: model.user_id,
            grand_total: Money::new(model.grand_total_minor),
        }
    }
}

impl From<Purchasing> for PurchasingSummary {
    fn from(purchasing: Purchasing) -> Self {
        Self {
            id: purchasing.id,
            date: purchasing.date,
            supplier_id: purchasing.supplier_id,
            user_id: purchasing.user_id,
            grand_total: purchasing.grand_total,
        }
    }
}

/// A committed detail together with the item it refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DetailRecord {
    pub detail: PurchasingDetail,
    pub item: Item,
}

/// A committed purchasing reloaded with its relations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PurchasingRecord {
    pub purchasing: Purchasing,
    pub supplier: Supplier,
    pub user: User,
    /// Details in insertion order.
    pub details: Vec<DetailRecord>,
}

impl PurchasingRecord {
    /// Header view and detail views for API responses and webhook payloads.
    pub fn views(&self) -> (PurchasingView, Vec<PurchasingDetailView>) {
        let purchasing = PurchasingView {
            id: self.purchasing.id,
            date: self.purchasing.date,
            supplier_id: self.purchasing.supplier_id,
            user_id: self.purchasing.user_id,
            grand_total: self.purchasing.grand_total,
            supplier: self.supplier.clone().into(),
            user: self.user.clone().into(),
        };
        let details = self
            .details
            .iter()
            .map(|record| PurchasingDetailView {
                id: record.detail.id,
                purchasing_id: record.detail.purchasing_id,
                item_id: record.detail.item_id,
                qty: record.detail.qty,
                sub_total: record.detail.sub_total,
                item: record.item.clone().into(),
            })
            .collect();
        (purchasing, details)
    }

    /// Build the `purchasing.created` webhook payload.
    pub fn created_event(&self, timestamp: DateTime<Utc>) -> PurchasingEvent {
        let (purchasing, details) = self.views();
        PurchasingEvent {
            event: PURCHASING_CREATED_EVENT.to_string(),
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            purchasing,
            details,
        }
    }
}
