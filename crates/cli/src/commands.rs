//! Subcommand implementations.
//!
//! Each command fetches what it needs, runs the pure core on the snapshot
//! and prints the outcome. Mutations send the request first and only merge
//! the server-confirmed record into the local snapshot afterwards.

use api_types::expense::{ExpenseDto, UpsertExpenseDto, UpsertShareDto};
use api_types::user::PatchMeDto;

use crate::{
    client::ApiClient,
    error::{AppError, Result},
    store::{ExpenseStore, to_user},
};
use engine::{Currency, Money, NewExpense, SettleUp, expression, settlement, split};

pub async fn list(client: &ApiClient) -> Result<()> {
    let mut store = ExpenseStore::default();
    store.refresh(client).await?;

    for expense in store.expenses() {
        let currency = Currency::try_from(expense.currency.as_str())?;
        let marker = if expense.is_payment { " (payment)" } else { "" };
        println!(
            "#{} {} {} {} paid by {}{}",
            expense.id,
            expense.created_at.format("%Y-%m-%d"),
            expense.name,
            Money::new(expense.total).display(currency),
            expense.paid_by.name,
            marker,
        );
    }
    Ok(())
}

pub async fn show(client: &ApiClient, id: i32) -> Result<()> {
    let expense = client.expense(id).await?;
    let users = client.users().await?;
    let currency = Currency::try_from(expense.currency.as_str())?;

    println!("{}", expense.name);
    println!(
        "{} paid {}",
        expense.paid_by.name,
        Money::new(expense.total).display(currency)
    );
    for share in &expense.shares {
        let name = users
            .iter()
            .find(|user| user.id == share.user_id)
            .map(|user| user.name.as_str())
            .unwrap_or("Unknown");
        println!("  {name}: {}", Money::new(share.share).display(currency));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn add(
    client: &ApiClient,
    name: String,
    total: String,
    paid_by: i32,
    splits: Vec<(i32, f64)>,
    currency: String,
    category: Option<i32>,
) -> Result<()> {
    let currency = Currency::try_from(currency.as_str())?;
    let total = expression::evaluate_total(&total, currency)?;

    // No explicit split: everyone pays the same percentage.
    let portions = if splits.is_empty() {
        let users = client.users().await?;
        let percentage = 100.0 / users.len() as f64;
        users.iter().map(|user| (user.id, percentage)).collect()
    } else {
        splits
    };

    let shares = split::allocate(total, paid_by, &portions)?;
    let new = NewExpense {
        name,
        created_at: None,
        paid_by,
        total,
        currency,
        category_id: category,
        is_payment: false,
        shares,
    };

    let confirmed = client.create_expense(&to_upsert_dto(new, None)).await?;
    print_confirmed(&confirmed)?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn edit(
    client: &ApiClient,
    id: i32,
    name: String,
    total: String,
    paid_by: i32,
    splits: Vec<(i32, f64)>,
    currency: String,
    category: Option<i32>,
) -> Result<()> {
    let currency = Currency::try_from(currency.as_str())?;
    let total = expression::evaluate_total(&total, currency)?;

    let portions = if splits.is_empty() {
        let users = client.users().await?;
        let percentage = 100.0 / users.len() as f64;
        users.iter().map(|user| (user.id, percentage)).collect()
    } else {
        splits
    };

    let shares = split::allocate(total, paid_by, &portions)?;
    let new = NewExpense {
        name,
        created_at: None,
        paid_by,
        total,
        currency,
        category_id: category,
        is_payment: false,
        shares,
    };

    let confirmed = client.upsert_expense(&to_upsert_dto(new, Some(id))).await?;
    print_confirmed(&confirmed)?;
    Ok(())
}

pub async fn categories(client: &ApiClient) -> Result<()> {
    for category in client.categories().await? {
        println!("#{} {}", category.id, category.name);
    }
    Ok(())
}

pub async fn balance(client: &ApiClient) -> Result<()> {
    let mut store = ExpenseStore::default();
    store.refresh(client).await?;
    let balances = store.balances()?;
    let me = client.me().await?;
    let users = client.users().await?;

    for (currency, my_balance) in balances.for_user(me.id) {
        println!("{}: {}", currency, my_balance.display(currency));
    }
    for flat in balances.counterparties(me.id) {
        let name = users
            .iter()
            .find(|user| user.id == flat.user_id)
            .map(|user| user.name.as_str())
            .unwrap_or("Unknown");
        if flat.balance.is_negative() {
            println!(
                "{name} owes the group {}",
                flat.balance.abs().display(flat.currency)
            );
        } else {
            println!(
                "{name} is owed {}",
                flat.balance.display(flat.currency)
            );
        }
    }
    Ok(())
}

pub async fn settle(
    client: &ApiClient,
    user: i32,
    currency: String,
    amount: Option<String>,
) -> Result<()> {
    let currency = Currency::try_from(currency.as_str())?;
    let mut store = ExpenseStore::default();
    store.refresh(client).await?;
    let balances = store.balances()?;
    let me = client.me().await?;
    let users = client.users().await?;

    let flat = balances
        .counterparties(me.id)
        .into_iter()
        .find(|flat| flat.user_id == user && flat.currency == currency)
        .ok_or_else(|| {
            AppError::Usage(format!("no outstanding {} balance with user {user}", currency))
        })?;

    let mut settle = SettleUp::from_balance(&flat, me.id);
    if let Some(amount) = amount {
        // Partial settlement: pay less (or more) than the outstanding
        // balance.
        settle.total = amount.parse::<Money>()?;
    }

    let domain_users: Vec<_> = users.iter().map(to_user).collect();
    let payment = settle.into_expense(&domain_users)?;

    // The Swish link is a side channel: failing to build it never blocks
    // recording the payment.
    if settle.payer_id == me.id {
        let receiver = domain_users
            .iter()
            .find(|user| user.id == settle.receiver_id)
            .ok_or_else(|| AppError::Usage(format!("unknown user {}", settle.receiver_id)))?;
        match settlement::swish_uri(receiver, settle.total, settle.currency, &payment.name) {
            Ok(uri) => println!("Swish: {uri}"),
            Err(err) => println!("Swish link skipped: {err}"),
        }
    }

    let confirmed = client.create_expense(&to_upsert_dto(payment, None)).await?;
    print_confirmed(&confirmed)?;

    // Merge the confirmed payment into the snapshot and show what is left.
    store.apply_upsert(confirmed);
    let remaining = store.balances()?.balance_of(currency, user);
    println!("outstanding with user {user}: {}", remaining.display(currency));
    Ok(())
}

pub async fn me(client: &ApiClient) -> Result<()> {
    let me = client.me().await?;
    println!("{} <{}> (id {})", me.name, me.email, me.id);
    match me.phone_number {
        Some(phone) => println!("phone: {phone}"),
        None => println!("phone: not registered"),
    }
    Ok(())
}

pub async fn set_phone(client: &ApiClient, phone_number: Option<String>) -> Result<()> {
    let me = client.patch_me(&PatchMeDto { phone_number }).await?;
    match me.phone_number {
        Some(phone) => println!("phone registered: {phone}"),
        None => println!("phone cleared"),
    }
    Ok(())
}

pub async fn delete(client: &ApiClient, id: i32) -> Result<()> {
    let mut store = ExpenseStore::default();
    store.refresh(client).await?;

    client.delete_expense(id).await?;
    store.apply_delete(id);
    println!(
        "deleted expense {id} ({} expenses remain)",
        store.expenses().len()
    );
    Ok(())
}

fn to_upsert_dto(new: NewExpense, id: Option<i32>) -> UpsertExpenseDto {
    UpsertExpenseDto {
        id,
        name: new.name,
        created_at: new.created_at,
        paid_by: new.paid_by,
        total: new.total.minor(),
        currency: new.currency.code().to_string(),
        category_id: new.category_id,
        shares: new
            .shares
            .into_iter()
            .map(|share| UpsertShareDto {
                user_id: share.user_id,
                share: share.share.minor(),
            })
            .collect(),
        is_payment: new.is_payment,
    }
}

fn print_confirmed(expense: &ExpenseDto) -> Result<()> {
    let currency = Currency::try_from(expense.currency.as_str())?;
    println!(
        "recorded #{}: {} {}",
        expense.id,
        expense.name,
        Money::new(expense.total).display(currency)
    );
    Ok(())
}
