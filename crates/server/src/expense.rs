//! Expense API endpoints.

use api_types::expense::{ExpenseDto, ShareDto, UpsertExpenseDto, UpsertShareDto};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{ServerError, server::ServerState};
use engine::{Currency, Money, NewExpense, NewShare};

fn to_dto(expense: engine::Expense) -> ExpenseDto {
    ExpenseDto {
        id: expense.id,
        name: expense.name,
        total: expense.total.minor(),
        currency: expense.currency.code().to_string(),
        created_at: expense.created_at,
        paid_by: crate::user::to_dto(expense.paid_by),
        category: expense.category.map(crate::category::to_dto),
        is_payment: expense.is_payment,
        shares: expense
            .shares
            .into_iter()
            .map(|share| ShareDto {
                expense_id: share.expense_id,
                user_id: share.user_id,
                share: share.share.minor(),
            })
            .collect(),
    }
}

fn to_new_expense(dto: UpsertExpenseDto) -> Result<NewExpense, ServerError> {
    let currency = Currency::try_from(dto.currency.as_str())?;
    Ok(NewExpense {
        name: dto.name,
        created_at: dto.created_at,
        paid_by: dto.paid_by,
        total: Money::new(dto.total),
        currency,
        category_id: dto.category_id,
        is_payment: dto.is_payment,
        shares: dto
            .shares
            .into_iter()
            .map(|UpsertShareDto { user_id, share }| NewShare {
                user_id,
                share: Money::new(share),
            })
            .collect(),
    })
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<ExpenseDto>>, ServerError> {
    let expenses = state.engine.list_expenses().await?;
    Ok(Json(expenses.into_iter().map(to_dto).collect()))
}

pub async fn get_one(
    Path(id): Path<i32>,
    State(state): State<ServerState>,
) -> Result<Json<ExpenseDto>, ServerError> {
    let expense = state.engine.expense(id).await?;
    Ok(Json(to_dto(expense)))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<UpsertExpenseDto>,
) -> Result<Json<ExpenseDto>, ServerError> {
    if payload.id.is_some() {
        return Err(ServerError::Generic(
            "id must not be set when creating an expense".to_string(),
        ));
    }
    let new = to_new_expense(payload)?;
    let expense = state.engine.create_expense(new).await?;
    Ok(Json(to_dto(expense)))
}

pub async fn upsert(
    State(state): State<ServerState>,
    Json(payload): Json<UpsertExpenseDto>,
) -> Result<Json<ExpenseDto>, ServerError> {
    let id = payload.id;
    let new = to_new_expense(payload)?;
    let expense = state.engine.upsert_expense(id, new).await?;
    Ok(Json(to_dto(expense)))
}

pub async fn delete(
    Path(id): Path<i32>,
    State(state): State<ServerState>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_expense(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
