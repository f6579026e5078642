//! Expense primitives.
//!
//! An `Expense` is either a cost split over the group (shares produced by
//! the [allocator](crate::split)) or a payment: a pure transfer between two
//! users recorded to settle a balance. Payments always have exactly two
//! shares, `+total` on the payer and `-total` on the receiver.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    Currency, EngineError, Money,
    categories::Category,
    shares::{NewShare, Share},
    users::User,
};

/// A stored expense with everything attached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i32,
    pub name: String,
    pub total: Money,
    pub currency: Currency,
    pub created_at: DateTime<Utc>,
    pub paid_by: User,
    pub category: Option<Category>,
    pub is_payment: bool,
    pub shares: Vec<Share>,
}

impl Expense {
    /// Assembles a domain expense from its stored parts.
    pub(crate) fn from_parts(
        model: Model,
        paid_by: User,
        category: Option<Category>,
        shares: Vec<Share>,
    ) -> Result<Self, EngineError> {
        Ok(Self {
            id: model.id,
            name: model.name,
            total: Money::new(model.total),
            currency: Currency::try_from(model.currency.as_str())?,
            created_at: model.created_at,
            paid_by,
            category,
            is_payment: model.is_payment,
            shares,
        })
    }
}

/// An expense that has not been persisted yet (create or full replace).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub name: String,
    /// Defaults to now when absent.
    pub created_at: Option<DateTime<Utc>>,
    pub paid_by: i32,
    pub total: Money,
    pub currency: Currency,
    pub category_id: Option<i32>,
    pub is_payment: bool,
    pub shares: Vec<NewShare>,
}

impl NewExpense {
    /// Validates the expense invariants before anything touches the
    /// database.
    ///
    /// Payments are validated strictly (two shares, `+total` on the payer,
    /// `-total` on the receiver). Split expenses must include the payer and
    /// may carry a rounding drift of at most one minor unit per share, the
    /// allocator's documented no-redistribution policy.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.name.trim().is_empty() {
            return Err(EngineError::InvalidAmount(
                "expense name must not be empty".to_string(),
            ));
        }
        if !self.total.is_positive() {
            return Err(EngineError::InvalidAmount(
                "total must be positive".to_string(),
            ));
        }
        if self.shares.is_empty() {
            return Err(EngineError::InvalidShares(
                "an expense needs at least one share".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for share in &self.shares {
            if !seen.insert(share.user_id) {
                return Err(EngineError::InvalidShares(format!(
                    "duplicate share for user {}",
                    share.user_id
                )));
            }
        }

        if self.is_payment {
            self.validate_payment()
        } else {
            self.validate_split()
        }
    }

    fn validate_payment(&self) -> Result<(), EngineError> {
        if self.shares.len() != 2 {
            return Err(EngineError::InvalidShares(
                "a payment has exactly two shares".to_string(),
            ));
        }
        let payer = self
            .shares
            .iter()
            .find(|share| share.user_id == self.paid_by)
            .ok_or_else(|| {
                EngineError::InvalidShares("payment is missing the payer share".to_string())
            })?;
        let receiver = self
            .shares
            .iter()
            .find(|share| share.user_id != self.paid_by)
            .ok_or_else(|| {
                EngineError::InvalidShares("payment is missing the receiver share".to_string())
            })?;

        // Sign convention: paying down a debt raises the payer's position.
        if payer.share != self.total || receiver.share != -self.total {
            return Err(EngineError::InvalidShares(
                "payment shares must be +total for the payer and -total for the receiver"
                    .to_string(),
            ));
        }
        Ok(())
    }

    fn validate_split(&self) -> Result<(), EngineError> {
        if !self.shares.iter().any(|share| share.user_id == self.paid_by) {
            return Err(EngineError::InvalidShares(
                "payer is missing from the shares".to_string(),
            ));
        }
        let sum: i64 = self.shares.iter().map(|share| share.share.minor()).sum();
        if sum.abs() > self.shares.len() as i64 {
            return Err(EngineError::InvalidShares(format!(
                "shares sum to {sum}, expected 0"
            )));
        }
        Ok(())
    }

    pub(crate) fn into_active(self, created_at: DateTime<Utc>) -> (ActiveModel, Vec<NewShare>) {
        let model = ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(self.name),
            total: ActiveValue::Set(self.total.minor()),
            currency: ActiveValue::Set(self.currency.code().to_string()),
            created_at: ActiveValue::Set(self.created_at.unwrap_or(created_at)),
            paid_by: ActiveValue::Set(self.paid_by),
            category_id: ActiveValue::Set(self.category_id),
            is_payment: ActiveValue::Set(self.is_payment),
        };
        (model, self.shares)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub total: i64,
    pub currency: String,
    pub created_at: DateTimeUtc,
    pub paid_by: i32,
    pub category_id: Option<i32>,
    pub is_payment: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::shares::Entity")]
    Shares,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::PaidBy",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Categories,
}

impl Related<super::shares::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shares.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(paid_by: i32, shares: Vec<NewShare>) -> NewExpense {
        NewExpense {
            name: "Anna payed 50.00 SEK to Björn".to_string(),
            created_at: None,
            paid_by,
            total: Money::new(5000),
            currency: Currency::Sek,
            category_id: None,
            is_payment: true,
            shares,
        }
    }

    #[test]
    fn payment_symmetry_is_enforced() {
        let ok = payment(
            1,
            vec![
                NewShare { user_id: 2, share: Money::new(-5000) },
                NewShare { user_id: 1, share: Money::new(5000) },
            ],
        );
        assert!(ok.validate().is_ok());

        // Receiver must carry the negative share.
        let swapped = payment(
            1,
            vec![
                NewShare { user_id: 2, share: Money::new(5000) },
                NewShare { user_id: 1, share: Money::new(-5000) },
            ],
        );
        assert!(swapped.validate().is_err());

        let uneven = payment(
            1,
            vec![
                NewShare { user_id: 2, share: Money::new(-4000) },
                NewShare { user_id: 1, share: Money::new(5000) },
            ],
        );
        assert!(uneven.validate().is_err());

        let three_way = payment(
            1,
            vec![
                NewShare { user_id: 2, share: Money::new(-5000) },
                NewShare { user_id: 3, share: Money::ZERO },
                NewShare { user_id: 1, share: Money::new(5000) },
            ],
        );
        assert!(three_way.validate().is_err());
    }

    #[test]
    fn split_accepts_bounded_rounding_drift() {
        let mut expense = NewExpense {
            name: "Willys".to_string(),
            created_at: None,
            paid_by: 1,
            total: Money::new(10000),
            currency: Currency::Sek,
            category_id: None,
            is_payment: false,
            shares: vec![
                NewShare { user_id: 1, share: Money::new(5001) },
                NewShare { user_id: 2, share: Money::new(-5000) },
            ],
        };
        // Off by one minor unit: accepted.
        assert!(expense.validate().is_ok());

        // Off by more than one unit per share: rejected.
        expense.shares[0].share = Money::new(5500);
        assert!(expense.validate().is_err());
    }

    #[test]
    fn split_requires_the_payer() {
        let expense = NewExpense {
            name: "Willys".to_string(),
            created_at: None,
            paid_by: 3,
            total: Money::new(10000),
            currency: Currency::Sek,
            category_id: None,
            is_payment: false,
            shares: vec![
                NewShare { user_id: 1, share: Money::new(5000) },
                NewShare { user_id: 2, share: Money::new(-5000) },
            ],
        };
        assert!(expense.validate().is_err());
    }

    #[test]
    fn duplicate_share_users_are_rejected() {
        let expense = NewExpense {
            name: "Willys".to_string(),
            created_at: None,
            paid_by: 1,
            total: Money::new(10000),
            currency: Currency::Sek,
            category_id: None,
            is_payment: false,
            shares: vec![
                NewShare { user_id: 1, share: Money::new(5000) },
                NewShare { user_id: 1, share: Money::new(-5000) },
            ],
        };
        assert!(expense.validate().is_err());
    }
}
