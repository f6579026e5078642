//! Expense shares.
//!
//! A [`Share`] is one participant's signed slice of an expense, in minor
//! units:
//! - positive values are owed **to** the user (they fronted more than their
//!   portion, or they receive a payment)
//! - negative values are owed **by** the user
//!
//! Shares are created atomically with their parent expense, replaced
//! wholesale on update and removed with the expense. Every balance in the
//! engine is a sum of shares.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::Money;

/// A stored share, tied to its expense.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub expense_id: i32,
    pub user_id: i32,
    pub share: Money,
}

/// A share of an expense that has not been persisted yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShare {
    pub user_id: i32,
    pub share: Money,
}

impl NewShare {
    pub(crate) fn into_active(self, expense_id: i32) -> ActiveModel {
        ActiveModel {
            expense_id: ActiveValue::Set(expense_id),
            user_id: ActiveValue::Set(self.user_id),
            share: ActiveValue::Set(self.share.minor()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "account_shares")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub expense_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    pub share: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expenses,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Share {
    fn from(model: Model) -> Self {
        Self {
            expense_id: model.expense_id,
            user_id: model.user_id,
            share: Money::new(model.share),
        }
    }
}
