use engine::{Currency, Engine, EngineError, Money, NewExpense, NewShare, SettleUp, split};
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database, Statement};

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let backend = db.get_database_backend();
    for (name, email) in [
        ("Anna", "anna@example.com"),
        ("Björn", "bjorn@example.com"),
        ("Cecilia", "cecilia@example.com"),
    ] {
        db.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO users (name, email, password) VALUES (?, ?, ?)",
            vec![name.into(), email.into(), "password".into()],
        ))
        .await
        .unwrap();
    }
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO expense_categories (name) VALUES (?)",
        vec!["Mat".into()],
    ))
    .await
    .unwrap();
    Engine::new(db)
}

fn groceries(total: i64, paid_by: i32, shares: Vec<NewShare>) -> NewExpense {
    NewExpense {
        name: "Willys".to_string(),
        created_at: None,
        paid_by,
        total: Money::new(total),
        currency: Currency::Sek,
        category_id: Some(1),
        is_payment: false,
        shares,
    }
}

#[tokio::test]
async fn created_expense_round_trips() {
    let engine = engine_with_db().await;

    let shares = split::allocate(Money::new(10000), 1, &[(1, 50.0), (2, 50.0)]).unwrap();
    let created = engine
        .create_expense(groceries(10000, 1, shares))
        .await
        .unwrap();

    assert_eq!(created.name, "Willys");
    assert_eq!(created.total, Money::new(10000));
    assert_eq!(created.paid_by.name, "Anna");
    assert_eq!(created.category.as_ref().map(|c| c.name.as_str()), Some("Mat"));
    let minor: Vec<(i32, i64)> = created
        .shares
        .iter()
        .map(|s| (s.user_id, s.share.minor()))
        .collect();
    assert_eq!(minor, vec![(1, 5000), (2, -5000)]);

    let listed = engine.list_expenses().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0], created);

    let fetched = engine.expense(created.id).await.unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn settle_up_drives_the_balance_to_zero() {
    let engine = engine_with_db().await;

    let shares = split::allocate(Money::new(10000), 1, &[(1, 50.0), (2, 50.0)]).unwrap();
    engine
        .create_expense(groceries(10000, 1, shares))
        .await
        .unwrap();

    let balances = engine.balances().await.unwrap();
    assert_eq!(balances.balance_of(Currency::Sek, 1), Money::new(5000));
    assert_eq!(balances.balance_of(Currency::Sek, 2), Money::new(-5000));

    // Björn settles his debt: the suggestion flows straight from his entry.
    let flat = balances.counterparties(1);
    assert_eq!(flat.len(), 1);
    let settle = SettleUp::from_balance(&flat[0], 1);
    assert_eq!(settle.payer_id, 2);
    let users = engine.users().await.unwrap();
    let payment = settle.into_expense(&users).unwrap();
    assert_eq!(payment.name, "Björn payed 50.00 SEK to Anna");
    let recorded = engine.create_expense(payment).await.unwrap();
    assert!(recorded.is_payment);

    let balances = engine.balances().await.unwrap();
    assert_eq!(balances.balance_of(Currency::Sek, 1), Money::ZERO);
    assert_eq!(balances.balance_of(Currency::Sek, 2), Money::ZERO);
    assert!(balances.counterparties(1).is_empty());
}

#[tokio::test]
async fn update_replaces_the_shares_wholesale() {
    let engine = engine_with_db().await;

    let shares = split::allocate(Money::new(10000), 1, &[(1, 50.0), (2, 50.0)]).unwrap();
    let created = engine
        .create_expense(groceries(10000, 1, shares))
        .await
        .unwrap();

    // Correcting the split after the fact: three ways instead of two.
    let shares =
        split::allocate(Money::new(9000), 1, &[(1, 33.0), (2, 33.0), (3, 34.0)]).unwrap();
    let updated = engine
        .update_expense(created.id, groceries(9000, 1, shares))
        .await
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.shares.len(), 3);

    let listed = engine.list_expenses().await.unwrap();
    assert_eq!(listed.len(), 1);
    let sum: i64 = listed[0].shares.iter().map(|s| s.share.minor()).sum();
    assert_eq!(sum, 0);
}

#[tokio::test]
async fn upsert_dispatches_on_id() {
    let engine = engine_with_db().await;

    let shares = split::allocate(Money::new(4200), 2, &[(1, 50.0), (2, 50.0)]).unwrap();
    let created = engine
        .upsert_expense(None, groceries(4200, 2, shares.clone()))
        .await
        .unwrap();

    let updated = engine
        .upsert_expense(Some(created.id), groceries(4200, 2, shares))
        .await
        .unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(engine.list_expenses().await.unwrap().len(), 1);

    let missing = engine
        .upsert_expense(Some(999), groceries(4200, 2, vec![
            NewShare { user_id: 1, share: Money::new(2100) },
            NewShare { user_id: 2, share: Money::new(-2100) },
        ]))
        .await;
    assert_eq!(missing, Err(EngineError::KeyNotFound("expense 999".to_string())));
}

#[tokio::test]
async fn delete_removes_expense_and_shares() {
    let engine = engine_with_db().await;

    let shares = split::allocate(Money::new(10000), 1, &[(1, 50.0), (2, 50.0)]).unwrap();
    let created = engine
        .create_expense(groceries(10000, 1, shares))
        .await
        .unwrap();

    engine.delete_expense(created.id).await.unwrap();
    assert!(engine.list_expenses().await.unwrap().is_empty());
    assert_eq!(engine.balances().await.unwrap().all(), vec![]);

    assert_eq!(
        engine.delete_expense(created.id).await,
        Err(EngineError::KeyNotFound(format!("expense {}", created.id)))
    );
}

#[tokio::test]
async fn create_rejects_unknown_references() {
    let engine = engine_with_db().await;

    let unknown_payer = groceries(
        1000,
        99,
        vec![
            NewShare { user_id: 99, share: Money::new(500) },
            NewShare { user_id: 1, share: Money::new(-500) },
        ],
    );
    assert_eq!(
        engine.create_expense(unknown_payer).await,
        Err(EngineError::KeyNotFound("user 99".to_string()))
    );

    let unknown_share_user = groceries(
        1000,
        1,
        vec![
            NewShare { user_id: 1, share: Money::new(500) },
            NewShare { user_id: 42, share: Money::new(-500) },
        ],
    );
    assert_eq!(
        engine.create_expense(unknown_share_user).await,
        Err(EngineError::KeyNotFound("user 42".to_string()))
    );

    let mut unknown_category = groceries(
        1000,
        1,
        vec![
            NewShare { user_id: 1, share: Money::new(500) },
            NewShare { user_id: 2, share: Money::new(-500) },
        ],
    );
    unknown_category.category_id = Some(7);
    assert_eq!(
        engine.create_expense(unknown_category).await,
        Err(EngineError::KeyNotFound("category 7".to_string()))
    );
}

#[tokio::test]
async fn invalid_shares_never_reach_the_database() {
    let engine = engine_with_db().await;

    let lopsided = groceries(
        1000,
        1,
        vec![
            NewShare { user_id: 1, share: Money::new(900) },
            NewShare { user_id: 2, share: Money::new(-500) },
        ],
    );
    assert!(matches!(
        engine.create_expense(lopsided).await,
        Err(EngineError::InvalidShares(_))
    ));
    assert!(engine.list_expenses().await.unwrap().is_empty());
}

#[tokio::test]
async fn balances_keep_currencies_apart() {
    let engine = engine_with_db().await;

    let shares = split::allocate(Money::new(10000), 1, &[(1, 50.0), (2, 50.0)]).unwrap();
    engine
        .create_expense(groceries(10000, 1, shares))
        .await
        .unwrap();

    let mut trip = groceries(
        3000,
        2,
        vec![
            NewShare { user_id: 1, share: Money::new(-1500) },
            NewShare { user_id: 2, share: Money::new(1500) },
        ],
    );
    trip.currency = Currency::Eur;
    engine.create_expense(trip).await.unwrap();

    let balances = engine.balances().await.unwrap();
    assert_eq!(balances.balance_of(Currency::Sek, 1), Money::new(5000));
    assert_eq!(balances.balance_of(Currency::Eur, 1), Money::new(-1500));
    assert_eq!(balances.balance_of(Currency::Sek, 2), Money::new(-5000));
    assert_eq!(balances.balance_of(Currency::Eur, 2), Money::new(1500));
}

#[tokio::test]
async fn phone_number_updates_round_trip() {
    let engine = engine_with_db().await;

    let user = engine.user(1).await.unwrap();
    assert_eq!(user.phone_number, None);

    let updated = engine
        .update_phone_number(1, Some("0701234567".to_string()))
        .await
        .unwrap();
    assert_eq!(updated.phone_number.as_deref(), Some("0701234567"));

    let cleared = engine.update_phone_number(1, None).await.unwrap();
    assert_eq!(cleared.phone_number, None);

    assert!(matches!(
        engine.update_phone_number(99, None).await,
        Err(EngineError::KeyNotFound(_))
    ));
}
