//! The expense snapshot.
//!
//! The store holds the only mutable client-side state: the last consistent
//! snapshot of the expense collection. Mutations merge the server-confirmed
//! record back in (replace-by-id for updates, prepend for creates, filter
//! for deletes) instead of re-deriving from a diff; a failed mutation leaves
//! the snapshot untouched. Balances are never cached: every read re-runs
//! the pure fold over the snapshot.

use api_types::expense::ExpenseDto;

use crate::client::{ApiClient, ClientError};
use engine::{Balances, Currency, EngineError, Expense, Money, Share, User, balance};

#[derive(Debug, Default)]
pub struct ExpenseStore {
    expenses: Vec<ExpenseDto>,
}

impl ExpenseStore {
    /// Replaces the snapshot with the server's current collection.
    pub async fn refresh(&mut self, client: &ApiClient) -> Result<(), ClientError> {
        self.expenses = client.expenses().await?;
        Ok(())
    }

    pub fn expenses(&self) -> &[ExpenseDto] {
        &self.expenses
    }

    /// Merges a server-confirmed create/update: replace-by-id when the
    /// expense is already known, otherwise prepend (newest first).
    pub fn apply_upsert(&mut self, confirmed: ExpenseDto) {
        match self.expenses.iter_mut().find(|e| e.id == confirmed.id) {
            Some(existing) => *existing = confirmed,
            None => self.expenses.insert(0, confirmed),
        }
    }

    /// Merges a confirmed delete.
    pub fn apply_delete(&mut self, id: i32) {
        self.expenses.retain(|e| e.id != id);
    }

    /// Folds the snapshot into per-currency balances.
    pub fn balances(&self) -> Result<Balances, EngineError> {
        let expenses = self
            .expenses
            .iter()
            .map(to_domain)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(balance::aggregate(&expenses))
    }
}

fn to_domain(dto: &ExpenseDto) -> Result<Expense, EngineError> {
    Ok(Expense {
        id: dto.id,
        name: dto.name.clone(),
        total: Money::new(dto.total),
        currency: Currency::try_from(dto.currency.as_str())?,
        created_at: dto.created_at,
        paid_by: to_user(&dto.paid_by),
        category: dto.category.as_ref().map(|category| engine::Category {
            id: category.id,
            name: category.name.clone(),
        }),
        is_payment: dto.is_payment,
        shares: dto
            .shares
            .iter()
            .map(|share| Share {
                expense_id: share.expense_id,
                user_id: share.user_id,
                share: Money::new(share.share),
            })
            .collect(),
    })
}

pub fn to_user(dto: &api_types::user::UserDto) -> User {
    User {
        id: dto.id,
        name: dto.name.clone(),
        phone_number: dto.phone_number.clone(),
    }
}

#[cfg(test)]
mod tests {
    use api_types::expense::ShareDto;
    use api_types::user::UserDto;
    use chrono::Utc;

    use super::*;

    fn dto(id: i32, shares: &[(i32, i64)]) -> ExpenseDto {
        ExpenseDto {
            id,
            name: format!("Expense {id}"),
            total: shares.iter().map(|(_, s)| s.abs()).sum::<i64>() / 2,
            currency: "SEK".to_string(),
            created_at: Utc::now(),
            paid_by: UserDto {
                id: 1,
                name: "Anna".to_string(),
                phone_number: None,
            },
            category: None,
            is_payment: false,
            shares: shares
                .iter()
                .map(|&(user_id, share)| ShareDto {
                    expense_id: id,
                    user_id,
                    share,
                })
                .collect(),
        }
    }

    #[test]
    fn upsert_prepends_unknown_and_replaces_known() {
        let mut store = ExpenseStore::default();
        store.apply_upsert(dto(1, &[(1, 5000), (2, -5000)]));
        store.apply_upsert(dto(2, &[(1, 100), (2, -100)]));
        // Newest first.
        assert_eq!(
            store.expenses().iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![2, 1]
        );

        let mut replacement = dto(1, &[(1, 4000), (2, -4000)]);
        replacement.name = "Rättad".to_string();
        store.apply_upsert(replacement);
        assert_eq!(store.expenses().len(), 2);
        assert_eq!(store.expenses()[1].name, "Rättad");
    }

    #[test]
    fn delete_filters_the_snapshot() {
        let mut store = ExpenseStore::default();
        store.apply_upsert(dto(1, &[(1, 5000), (2, -5000)]));
        store.apply_upsert(dto(2, &[(1, 100), (2, -100)]));

        store.apply_delete(1);
        assert_eq!(store.expenses().len(), 1);
        assert_eq!(store.expenses()[0].id, 2);

        // Deleting something already gone is a no-op at the store level.
        store.apply_delete(1);
        assert_eq!(store.expenses().len(), 1);
    }

    #[test]
    fn balances_recompute_from_the_snapshot() {
        let mut store = ExpenseStore::default();
        store.apply_upsert(dto(1, &[(1, 5000), (2, -5000)]));

        let balances = store.balances().unwrap();
        assert_eq!(balances.balance_of(Currency::Sek, 2), Money::new(-5000));

        store.apply_upsert(dto(2, &[(1, -5000), (2, 5000)]));
        let balances = store.balances().unwrap();
        assert_eq!(balances.balance_of(Currency::Sek, 1), Money::ZERO);
        assert_eq!(balances.balance_of(Currency::Sek, 2), Money::ZERO);
    }

    #[test]
    fn unknown_currency_in_the_snapshot_is_an_error() {
        let mut store = ExpenseStore::default();
        let mut expense = dto(1, &[(1, 100), (2, -100)]);
        expense.currency = "NOK".to_string();
        store.apply_upsert(expense);
        assert!(store.balances().is_err());
    }
}
