//! User listing endpoint.

use api_types::user::UserDto;
use axum::{Json, extract::State};

use crate::{ServerError, server::ServerState};

pub(crate) fn to_dto(user: engine::User) -> UserDto {
    UserDto {
        id: user.id,
        name: user.name,
        phone_number: user.phone_number,
    }
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<UserDto>>, ServerError> {
    let users = state.engine.users().await?;
    Ok(Json(users.into_iter().map(to_dto).collect()))
}
