use axum::{extract::State, routing::post, Json, Router};
use tracing::{instrument, warn};

use crate::{
    error::AppError,
    extract::{ValidJson, ValidQuery},
    state::AppState,
    users::{
        dto::{
            DeleteUserResponse, ShowUser, UpdateUserRequest, UpdateUserResponse, UserCreate,
            UserIdQuery,
        },
        services,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/user/",
        post(create_user)
            .get(get_user_by_id)
            .delete(delete_user_by_id)
            .patch(update_user_by_id),
    )
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ValidJson(mut payload): ValidJson<UserCreate>,
) -> Result<Json<ShowUser>, AppError> {
    payload
        .validate()
        .inspect_err(|e| warn!(error = %e, "invalid create request"))?;
    let user = services::create_user(state.store.as_ref(), payload).await?;
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn get_user_by_id(
    State(state): State<AppState>,
    ValidQuery(q): ValidQuery<UserIdQuery>,
) -> Result<Json<ShowUser>, AppError> {
    let user = services::get_user(state.store.as_ref(), q.user_id).await?;
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn delete_user_by_id(
    State(state): State<AppState>,
    ValidQuery(q): ValidQuery<UserIdQuery>,
) -> Result<Json<DeleteUserResponse>, AppError> {
    let deleted_user_id = services::delete_user(state.store.as_ref(), q.user_id).await?;
    Ok(Json(DeleteUserResponse { deleted_user_id }))
}

#[instrument(skip(state, payload))]
pub async fn update_user_by_id(
    State(state): State<AppState>,
    ValidQuery(q): ValidQuery<UserIdQuery>,
    ValidJson(payload): ValidJson<UpdateUserRequest>,
) -> Result<Json<UpdateUserResponse>, AppError> {
    let update = payload
        .into_update()
        .inspect_err(|e| warn!(error = %e, "invalid update request"))?;
    let updated_user_id = services::update_user(state.store.as_ref(), q.user_id, update).await?;
    Ok(Json(UpdateUserResponse { updated_user_id }))
}
