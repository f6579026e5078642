//! The balance aggregator.
//!
//! Balances are never stored: they are a commutative fold over the full
//! expense collection, recomputed on every read. For a household-sized
//! dataset the recompute costs nothing and removes an entire class of
//! staleness bugs; if it ever grows past that, an incremental variant can
//! hide behind the same pure contract.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{Currency, Money, expenses::Expense};

/// Per-currency, per-user net positions.
///
/// Positive = the user is owed money within that currency, negative = the
/// user owes. Entries keep first-appearance order so the settle-up view is
/// stable across renders; equality ignores order and zero entries.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Balances {
    entries: Vec<CurrencyBalances>,
}

/// All user positions within one currency, in first-appearance order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CurrencyBalances {
    pub currency: Currency,
    balances: Vec<(i32, Money)>,
}

/// One `(currency, user, balance)` row of the flattened settle-up view.
///
/// `balance` is the counterparty's own position: negative means they owe
/// the group, so the caller is owed `balance.abs()` and vice versa.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatBalance {
    pub currency: Currency,
    pub user_id: i32,
    pub balance: Money,
}

impl Balances {
    /// Adds `amount` to a user's position in `currency`, creating the entry
    /// at zero first when missing.
    pub fn add(&mut self, currency: Currency, user_id: i32, amount: Money) {
        let idx = match self.entries.iter().position(|e| e.currency == currency) {
            Some(idx) => idx,
            None => {
                self.entries.push(CurrencyBalances {
                    currency,
                    balances: Vec::new(),
                });
                self.entries.len() - 1
            }
        };
        let entry = &mut self.entries[idx];
        match entry.balances.iter_mut().find(|(id, _)| *id == user_id) {
            Some((_, balance)) => *balance += amount,
            None => entry.balances.push((user_id, amount)),
        }
    }

    /// The net position of one user in one currency (zero when absent).
    #[must_use]
    pub fn balance_of(&self, currency: Currency, user_id: i32) -> Money {
        self.entries
            .iter()
            .find(|e| e.currency == currency)
            .and_then(|e| e.balances.iter().find(|(id, _)| *id == user_id))
            .map(|(_, balance)| *balance)
            .unwrap_or(Money::ZERO)
    }

    /// The caller's own net position per currency, in first-appearance
    /// order. Currencies where the caller has no entry report zero.
    #[must_use]
    pub fn for_user(&self, user_id: i32) -> Vec<(Currency, Money)> {
        self.entries
            .iter()
            .map(|e| (e.currency, self.balance_of(e.currency, user_id)))
            .collect()
    }

    /// The actionable settle-up view: every non-zero position except the
    /// caller's own, ordered by currency first-appearance then user
    /// first-appearance.
    #[must_use]
    pub fn counterparties(&self, me: i32) -> Vec<FlatBalance> {
        self.entries
            .iter()
            .flat_map(|entry| {
                entry
                    .balances
                    .iter()
                    .filter(move |(user_id, balance)| *user_id != me && !balance.is_zero())
                    .map(|&(user_id, balance)| FlatBalance {
                        currency: entry.currency,
                        user_id,
                        balance,
                    })
            })
            .collect()
    }

    /// Every position, including settled and own ones. Used by the balance
    /// endpoint.
    #[must_use]
    pub fn all(&self) -> Vec<FlatBalance> {
        self.entries
            .iter()
            .flat_map(|entry| {
                entry.balances.iter().map(|&(user_id, balance)| FlatBalance {
                    currency: entry.currency,
                    user_id,
                    balance,
                })
            })
            .collect()
    }

    fn non_zero_set(&self) -> HashSet<(Currency, i32, i64)> {
        self.entries
            .iter()
            .flat_map(|entry| {
                entry
                    .balances
                    .iter()
                    .filter(|(_, balance)| !balance.is_zero())
                    .map(|&(user_id, balance)| (entry.currency, user_id, balance.minor()))
            })
            .collect()
    }
}

impl PartialEq for Balances {
    /// Balances are equal when their non-zero positions match; insertion
    /// order (an artifact of expense order) does not count.
    fn eq(&self, other: &Self) -> bool {
        self.non_zero_set() == other.non_zero_set()
    }
}

/// Folds the expense collection into per-currency, per-user balances.
///
/// Commutative and idempotent: shuffling or re-folding the same snapshot
/// yields the same balances. Since every stored expense is (close to)
/// zero-sum, every currency's positions sum to (close to) zero.
#[must_use]
pub fn aggregate(expenses: &[Expense]) -> Balances {
    let mut balances = Balances::default();
    for expense in expenses {
        for share in &expense.shares {
            balances.add(expense.currency, share.user_id, share.share);
        }
    }
    balances
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::{shares::Share, users::User};

    fn user(id: i32) -> User {
        User {
            id,
            name: format!("User {id}"),
            phone_number: None,
        }
    }

    fn expense(id: i32, currency: Currency, paid_by: i32, shares: &[(i32, i64)]) -> Expense {
        Expense {
            id,
            name: format!("Expense {id}"),
            total: Money::new(shares.iter().map(|(_, s)| s.abs()).sum::<i64>() / 2),
            currency,
            created_at: Utc::now(),
            paid_by: user(paid_by),
            category: None,
            is_payment: false,
            shares: shares
                .iter()
                .map(|&(user_id, share)| Share {
                    expense_id: id,
                    user_id,
                    share: Money::new(share),
                })
                .collect(),
        }
    }

    #[test]
    fn folds_shares_per_currency() {
        // 100.00 SEK paid by user 1, split evenly with user 2.
        let expenses = [expense(1, Currency::Sek, 1, &[(1, 5000), (2, -5000)])];
        let balances = aggregate(&expenses);
        assert_eq!(balances.balance_of(Currency::Sek, 1), Money::new(5000));
        assert_eq!(balances.balance_of(Currency::Sek, 2), Money::new(-5000));
    }

    #[test]
    fn payment_settles_the_pair() {
        // The scenario from the settle-up flow: an even split followed by
        // the receiver being paid back.
        let expenses = [
            expense(1, Currency::Sek, 1, &[(1, 5000), (2, -5000)]),
            expense(2, Currency::Sek, 2, &[(1, -5000), (2, 5000)]),
        ];
        let balances = aggregate(&expenses);
        assert_eq!(balances.balance_of(Currency::Sek, 1), Money::ZERO);
        assert_eq!(balances.balance_of(Currency::Sek, 2), Money::ZERO);
        assert!(balances.counterparties(1).is_empty());
    }

    #[test]
    fn currencies_never_mix() {
        let expenses = [
            expense(1, Currency::Sek, 1, &[(1, 5000), (2, -5000)]),
            expense(2, Currency::Eur, 2, &[(1, -300), (2, 300)]),
        ];
        let balances = aggregate(&expenses);
        assert_eq!(balances.balance_of(Currency::Sek, 1), Money::new(5000));
        assert_eq!(balances.balance_of(Currency::Eur, 1), Money::new(-300));
    }

    #[test]
    fn every_currency_sums_to_zero() {
        // Closed system: each expense is zero-sum, so any pile of them is.
        let expenses = [
            expense(1, Currency::Sek, 1, &[(1, 7000), (2, -3000), (3, -4000)]),
            expense(2, Currency::Sek, 2, &[(1, -100), (2, 150), (3, -50)]),
            expense(3, Currency::Eur, 3, &[(1, -42), (3, 42)]),
            expense(4, Currency::Sek, 3, &[(2, -900), (3, 900)]),
        ];
        let balances = aggregate(&expenses);
        for currency in [Currency::Sek, Currency::Eur] {
            let sum: i64 = [1, 2, 3]
                .iter()
                .map(|&id| balances.balance_of(currency, id).minor())
                .sum();
            assert_eq!(sum, 0, "{currency} does not close");
        }
    }

    #[test]
    fn aggregation_is_order_independent_and_idempotent() {
        let mut expenses = vec![
            expense(1, Currency::Sek, 1, &[(1, 7000), (2, -3000), (3, -4000)]),
            expense(2, Currency::Eur, 2, &[(1, -300), (2, 300)]),
            expense(3, Currency::Sek, 2, &[(1, -100), (2, 150), (3, -50)]),
        ];
        let forward = aggregate(&expenses);
        expenses.reverse();
        let backward = aggregate(&expenses);
        assert_eq!(forward, backward);
        // Re-running over the unchanged snapshot changes nothing.
        assert_eq!(aggregate(&expenses), backward);
    }

    #[test]
    fn counterparties_skip_me_and_settled_users() {
        let expenses = [
            expense(1, Currency::Sek, 1, &[(1, 5000), (2, -5000), (3, 0)]),
            expense(2, Currency::Eur, 1, &[(1, 300), (3, -300)]),
        ];
        let balances = aggregate(&expenses);
        let flat = balances.counterparties(1);
        assert_eq!(
            flat,
            vec![
                FlatBalance {
                    currency: Currency::Sek,
                    user_id: 2,
                    balance: Money::new(-5000),
                },
                FlatBalance {
                    currency: Currency::Eur,
                    user_id: 3,
                    balance: Money::new(-300),
                },
            ]
        );
    }

    #[test]
    fn for_user_reports_all_currencies() {
        let expenses = [
            expense(1, Currency::Sek, 1, &[(1, 5000), (2, -5000)]),
            expense(2, Currency::Eur, 2, &[(2, 300), (3, -300)]),
        ];
        let balances = aggregate(&expenses);
        assert_eq!(
            balances.for_user(1),
            vec![
                (Currency::Sek, Money::new(5000)),
                (Currency::Eur, Money::ZERO),
            ]
        );
    }
}
