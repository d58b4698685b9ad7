//! Suppliers: vendors owning catalog items.

use sea_orm::entity::prelude::*;

/// A supplier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Supplier {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "suppliers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::items::Entity")]
    Items,
    #[sea_orm(has_many = "super::purchasings::Entity")]
    Purchasings,
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::purchasings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchasings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Supplier {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            address: model.address,
        }
    }
}

impl From<Supplier> for api_types::supplier::Supplier {
    fn from(supplier: Supplier) -> Self {
        Self {
            id: supplier.id,
            name: supplier.name,
            email: supplier.email,
            address: supplier.address,
        }
    }
}
