//! The Splitten engine: pure balance computation plus the persistence-backed
//! expense operations the server exposes.
//!
//! The computation core ([`split`], [`balance`], [`settlement`],
//! [`expression`]) is pure: explicit inputs, no shared state, no I/O. The
//! [`Engine`] wraps the database and feeds those functions consistent
//! snapshots.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

pub use balance::{Balances, CurrencyBalances, FlatBalance, aggregate};
pub use categories::Category;
pub use currency::Currency;
pub use error::EngineError;
pub use expenses::{Expense, NewExpense};
pub use money::Money;
pub use settlement::{SettleUp, swish_uri};
pub use shares::{NewShare, Share};
pub use users::{Profile, User};

pub mod balance;
mod categories;
mod currency;
mod error;
mod expenses;
pub mod expression;
mod money;
pub mod settlement;
mod shares;
pub mod split;
mod users;

type ResultEngine<T> = Result<T, EngineError>;

/// Database-backed expense operations.
#[derive(Clone, Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    /// Returns the full expense collection, newest first, with payer,
    /// category and shares attached.
    pub async fn list_expenses(&self) -> ResultEngine<Vec<Expense>> {
        let users = self.user_map().await?;
        let categories = self.category_map().await?;

        let rows = expenses::Entity::find()
            .order_by_desc(expenses::Column::CreatedAt)
            .find_with_related(shares::Entity)
            .all(&self.database)
            .await?;

        rows.into_iter()
            .map(|(model, share_models)| {
                Self::assemble(model, share_models, &users, &categories)
            })
            .collect()
    }

    /// Returns a single expense.
    pub async fn expense(&self, id: i32) -> ResultEngine<Expense> {
        let model = expenses::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("expense {id}")))?;
        let share_models = shares::Entity::find()
            .filter(shares::Column::ExpenseId.eq(id))
            .all(&self.database)
            .await?;

        let users = self.user_map().await?;
        let categories = self.category_map().await?;
        Self::assemble(model, share_models, &users, &categories)
    }

    /// Creates or replaces an expense depending on whether `id` is given.
    pub async fn upsert_expense(&self, id: Option<i32>, new: NewExpense) -> ResultEngine<Expense> {
        match id {
            Some(id) => self.update_expense(id, new).await,
            None => self.create_expense(new).await,
        }
    }

    /// Creates an expense and its shares in one database transaction.
    pub async fn create_expense(&self, new: NewExpense) -> ResultEngine<Expense> {
        self.validate_references(&new).await?;

        let (model, new_shares) = new.into_active(Utc::now());
        let db_tx = self.database.begin().await?;
        let inserted = model.insert(&db_tx).await?;
        for share in new_shares {
            share.into_active(inserted.id).insert(&db_tx).await?;
        }
        db_tx.commit().await?;

        self.expense(inserted.id).await
    }

    /// Replaces an existing expense and all its shares.
    ///
    /// The stored `created_at` is kept unless the caller provides one.
    pub async fn update_expense(&self, id: i32, new: NewExpense) -> ResultEngine<Expense> {
        self.validate_references(&new).await?;

        let existing = expenses::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("expense {id}")))?;

        let (mut model, new_shares) = new.into_active(existing.created_at);
        model.id = ActiveValue::Set(id);

        let db_tx = self.database.begin().await?;
        model.update(&db_tx).await?;
        shares::Entity::delete_many()
            .filter(shares::Column::ExpenseId.eq(id))
            .exec(&db_tx)
            .await?;
        for share in new_shares {
            share.into_active(id).insert(&db_tx).await?;
        }
        db_tx.commit().await?;

        self.expense(id).await
    }

    /// Deletes an expense and its shares. Deleting a missing id is a caller
    /// bug and fails with [`EngineError::KeyNotFound`].
    pub async fn delete_expense(&self, id: i32) -> ResultEngine<()> {
        let existing = expenses::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("expense {id}")))?;

        let db_tx = self.database.begin().await?;
        shares::Entity::delete_many()
            .filter(shares::Column::ExpenseId.eq(id))
            .exec(&db_tx)
            .await?;
        existing.delete(&db_tx).await?;
        db_tx.commit().await?;
        Ok(())
    }

    /// Folds the current expense snapshot into per-currency balances.
    ///
    /// Deliberately a full recompute on every call; see
    /// [`balance::aggregate`].
    pub async fn balances(&self) -> ResultEngine<Balances> {
        let expenses = self.list_expenses().await?;
        Ok(aggregate(&expenses))
    }

    /// Returns all users, stable id order.
    pub async fn users(&self) -> ResultEngine<Vec<User>> {
        let models = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(User::from).collect())
    }

    /// Returns one user.
    pub async fn user(&self, id: i32) -> ResultEngine<User> {
        users::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .map(User::from)
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {id}")))
    }

    /// Looks a profile up by the email the auth layer hands us.
    pub async fn user_by_email(&self, email: &str) -> ResultEngine<Profile> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.database)
            .await?
            .map(Profile::from)
            .ok_or_else(|| EngineError::KeyNotFound(email.to_string()))
    }

    /// Checks credentials against the users table.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<Profile> {
        users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .filter(users::Column::Password.eq(password))
            .one(&self.database)
            .await?
            .map(Profile::from)
            .ok_or_else(|| EngineError::KeyNotFound("user".to_string()))
    }

    /// Updates a user's phone number (the only mutable profile field).
    pub async fn update_phone_number(
        &self,
        id: i32,
        phone_number: Option<String>,
    ) -> ResultEngine<Profile> {
        let existing = users::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {id}")))?;

        let mut model: users::ActiveModel = existing.into();
        model.phone_number = ActiveValue::Set(phone_number);
        let updated = model.update(&self.database).await?;
        Ok(updated.into())
    }

    /// Returns all expense categories.
    pub async fn categories(&self) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .order_by_asc(categories::Column::Id)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Category::from).collect())
    }

    async fn user_map(&self) -> ResultEngine<HashMap<i32, User>> {
        let models = users::Entity::find().all(&self.database).await?;
        Ok(models
            .into_iter()
            .map(|model| (model.id, User::from(model)))
            .collect())
    }

    async fn category_map(&self) -> ResultEngine<HashMap<i32, Category>> {
        let models = categories::Entity::find().all(&self.database).await?;
        Ok(models
            .into_iter()
            .map(|model| (model.id, Category::from(model)))
            .collect())
    }

    fn assemble(
        model: expenses::Model,
        share_models: Vec<shares::Model>,
        users: &HashMap<i32, User>,
        categories: &HashMap<i32, Category>,
    ) -> ResultEngine<Expense> {
        let paid_by = users
            .get(&model.paid_by)
            .cloned()
            .ok_or_else(|| EngineError::KeyNotFound(format!("user {}", model.paid_by)))?;
        let category = model.category_id.and_then(|id| categories.get(&id).cloned());
        let shares = share_models.into_iter().map(Share::from).collect();
        Expense::from_parts(model, paid_by, category, shares)
    }

    /// Checks the expense invariants and that every referenced row exists,
    /// before any write happens.
    async fn validate_references(&self, new: &NewExpense) -> ResultEngine<()> {
        new.validate()?;

        let users = self.user_map().await?;
        if !users.contains_key(&new.paid_by) {
            return Err(EngineError::KeyNotFound(format!("user {}", new.paid_by)));
        }
        for share in &new.shares {
            if !users.contains_key(&share.user_id) {
                return Err(EngineError::KeyNotFound(format!("user {}", share.user_id)));
            }
        }
        if let Some(category_id) = new.category_id {
            let categories = self.category_map().await?;
            if !categories.contains_key(&category_id) {
                return Err(EngineError::KeyNotFound(format!("category {category_id}")));
            }
        }
        Ok(())
    }
}
