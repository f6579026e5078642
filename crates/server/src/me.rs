//! The authenticated user's profile.

use api_types::user::{MeDto, PatchMeDto};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::ServerState};
use engine::Profile;

fn to_dto(user: Profile) -> MeDto {
    MeDto {
        id: user.id,
        name: user.name,
        email: user.email,
        phone_number: user.phone_number,
    }
}

pub async fn get_me(Extension(user): Extension<Profile>) -> Json<MeDto> {
    Json(to_dto(user))
}

pub async fn patch_me(
    Extension(user): Extension<Profile>,
    State(state): State<ServerState>,
    Json(payload): Json<PatchMeDto>,
) -> Result<Json<MeDto>, ServerError> {
    let updated = state
        .engine
        .update_phone_number(user.id, payload.phone_number)
        .await?;
    Ok(Json(to_dto(updated)))
}
