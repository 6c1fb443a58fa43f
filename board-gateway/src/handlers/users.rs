use axum::{extract::State, http::StatusCode, Json};
use gateway_core::context::RequestContext;
use gateway_core::error::HandlerResult;

use crate::authz::resolver::exactly_one;
use crate::authz::{Action, ResourceType};
use crate::dtos::users::{users_request, UpdateUserDto, UserView};
use crate::dtos::UserPath;
use crate::startup::AppState;
use crate::utils::{ValidatedJson, ValidatedPath};

/// Profile of the caller.
pub async fn me(State(state): State<AppState>, ctx: RequestContext) -> HandlerResult<Json<UserView>> {
    tracing::debug!("user handler::me call gRPC /User/GetUsers");
    let response = state.users.get_users(&ctx, users_request(ctx.subject())).await?;
    let user = exactly_one(response.users, ResourceType::User)?;

    Ok(Json(UserView::from(user)))
}

pub async fn update(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedPath(path): ValidatedPath<UserPath>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> HandlerResult<StatusCode> {
    state
        .permissions
        .user
        .check_object(&ctx, Some(&path.user_id), None, Action::Update)
        .await?;

    tracing::debug!(user_id = %path.user_id, "user handler::update call gRPC /User/UpdateUser");
    state
        .users
        .update_user(&ctx, dto.into_request(path.user_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
