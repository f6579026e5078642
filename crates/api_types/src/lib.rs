//! Wire types shared by the server and its clients.
//!
//! Monetary amounts are always integers in minor currency units (öre/cents)
//! on the wire; conversion to major units happens at the UI-input boundary
//! only. Timestamps are RFC3339 UTC.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod user {
    use super::*;

    /// A group member as listed by `GET /api/user`.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UserDto {
        pub id: i32,
        pub name: String,
        pub phone_number: Option<String>,
    }

    /// The authenticated user, `GET /api/me`.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MeDto {
        pub id: i32,
        pub name: String,
        pub email: String,
        pub phone_number: Option<String>,
    }

    /// Request body for `PATCH /api/me`.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct PatchMeDto {
        pub phone_number: Option<String>,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CategoryDto {
        pub id: i32,
        pub name: String,
    }
}

pub mod expense {
    use super::*;

    /// One participant's signed slice of an expense, minor units.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ShareDto {
        pub expense_id: i32,
        pub user_id: i32,
        pub share: i64,
    }

    /// A stored expense with payer, category and shares attached.
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExpenseDto {
        pub id: i32,
        pub name: String,
        /// Minor units.
        pub total: i64,
        /// Upper-case ISO-4217 code, e.g. `"SEK"`.
        pub currency: String,
        pub created_at: DateTime<Utc>,
        pub paid_by: super::user::UserDto,
        pub category: Option<super::category::CategoryDto>,
        pub is_payment: bool,
        pub shares: Vec<ShareDto>,
    }

    /// Request body for `POST /api/expense` (create, no `id`) and
    /// `PUT /api/expense` (upsert, optional `id`).
    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct UpsertExpenseDto {
        pub id: Option<i32>,
        pub name: String,
        /// Defaults to now when absent.
        pub created_at: Option<DateTime<Utc>>,
        pub paid_by: i32,
        /// Minor units.
        pub total: i64,
        pub currency: String,
        pub category_id: Option<i32>,
        pub shares: Vec<UpsertShareDto>,
        pub is_payment: bool,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UpsertShareDto {
        pub user_id: i32,
        pub share: i64,
    }
}

pub mod balance {
    use super::*;

    /// One `(currency, user, net position)` row of `GET /api/balance`.
    ///
    /// Positive = the user is owed money within that currency, negative =
    /// the user owes.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct BalanceDto {
        pub user_id: i32,
        /// Minor units.
        pub balance: i64,
        pub currency: String,
    }
}
