//! Users allowed to act on the API.
//!
//! Only the argon2 hash of the password is stored.

use api_types::user::Role;
use sea_orm::entity::prelude::*;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub role: Role,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub password_hash: String,
    pub role: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchasings::Entity")]
    Purchasings,
}

impl Related<super::purchasings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchasings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let role = parse_role(&model.role)?;
        Ok(Self {
            id: model.id,
            username: model.username,
            role,
        })
    }
}

impl From<User> for api_types::user::User {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

pub(crate) fn parse_role(value: &str) -> ResultEngine<Role> {
    Role::parse(value).ok_or_else(|| EngineError::InvalidInput(format!("invalid role: {value}")))
}
