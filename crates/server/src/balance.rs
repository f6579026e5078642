//! Balance endpoint.
//!
//! Runs the pure fold over the current expense snapshot on every request;
//! nothing balance-shaped is ever stored.

use api_types::balance::BalanceDto;
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<BalanceDto>>, ServerError> {
    let balances = state.engine.balances().await?;
    let dtos = balances
        .all()
        .into_iter()
        .map(|flat| BalanceDto {
            user_id: flat.user_id,
            balance: flat.balance.minor(),
            currency: flat.currency.code().to_string(),
        })
        .collect();
    Ok(Json(dtos))
}
