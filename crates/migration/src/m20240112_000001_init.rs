//! Initial schema migration.
//!
//! Creates the complete schema:
//!
//! - `users`: the fixed household group + Basic-auth credentials
//! - `expense_categories`: expense labels
//! - `expenses`: one row per split cost or payment
//! - `account_shares`: the signed per-user slices of each expense

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Password,
}

#[derive(Iden)]
enum ExpenseCategories {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    Name,
    Total,
    Currency,
    CreatedAt,
    PaidBy,
    CategoryId,
    IsPayment,
}

#[derive(Iden)]
enum AccountShares {
    Table,
    ExpenseId,
    UserId,
    Share,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email-unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExpenseCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseCategories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseCategories::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::Name).string().not_null())
                    .col(ColumnDef::new(Expenses::Total).big_integer().not_null())
                    .col(
                        ColumnDef::new(Expenses::Currency)
                            .string()
                            .not_null()
                            .default("SEK"),
                    )
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Expenses::PaidBy).integer().not_null())
                    .col(ColumnDef::new(Expenses::CategoryId).integer())
                    .col(
                        ColumnDef::new(Expenses::IsPayment)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-paid_by")
                            .from(Expenses::Table, Expenses::PaidBy)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-category_id")
                            .from(Expenses::Table, Expenses::CategoryId)
                            .to(ExpenseCategories::Table, ExpenseCategories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-created_at")
                    .table(Expenses::Table)
                    .col(Expenses::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AccountShares::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountShares::ExpenseId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AccountShares::UserId).integer().not_null())
                    .col(ColumnDef::new(AccountShares::Share).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(AccountShares::ExpenseId)
                            .col(AccountShares::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-account_shares-expense_id")
                            .from(AccountShares::Table, AccountShares::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-account_shares-user_id")
                            .from(AccountShares::Table, AccountShares::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-account_shares-user_id")
                    .table(AccountShares::Table)
                    .col(AccountShares::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies).
        manager
            .drop_table(Table::drop().table(AccountShares::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
