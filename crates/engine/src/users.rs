//! Users.
//!
//! The group of users is small and fixed (a household); accounts are
//! provisioned out-of-band and only the phone number is mutable through the
//! API. The password column backs the HTTP Basic auth middleware and never
//! leaves the database layer.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A member of the expense-sharing group, as referenced by expenses and
/// shares.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i32,
    pub name: String,
    /// Needed to build Swish links; `None` until the user registers one.
    pub phone_number: Option<String>,
}

/// The authenticated user's own view, the only place email is exposed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expenses::Entity")]
    Expenses,
    #[sea_orm(has_many = "super::shares::Entity")]
    Shares,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::shares::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shares.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            phone_number: model.phone_number,
        }
    }
}

impl From<Model> for Profile {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone_number: model.phone_number,
        }
    }
}
