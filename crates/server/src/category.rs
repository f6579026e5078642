//! Expense category endpoint.

use api_types::category::CategoryDto;
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

pub(crate) fn to_dto(category: engine::Category) -> CategoryDto {
    CategoryDto {
        id: category.id,
        name: category.name,
    }
}

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<CategoryDto>>, ServerError> {
    let categories = state.engine.categories().await?;
    Ok(Json(categories.into_iter().map(to_dto).collect()))
}
