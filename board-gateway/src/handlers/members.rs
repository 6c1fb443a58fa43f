use axum::{extract::State, http::StatusCode};
use gateway_core::context::RequestContext;
use gateway_core::error::HandlerResult;

use crate::authz::Action;
use crate::dtos::members::{MemberChange, SaveMemberDto};
use crate::dtos::MemberPath;
use crate::startup::AppState;
use crate::utils::{ValidatedJson, ValidatedPath};

/// Grants the member its roles on the board, then records it on the board.
pub async fn save(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedPath(path): ValidatedPath<MemberPath>,
    ValidatedJson(dto): ValidatedJson<SaveMemberDto>,
) -> HandlerResult<StatusCode> {
    state
        .permissions
        .board
        .check(&ctx, &path.board_id, Action::SaveMember)
        .await?;

    let change = MemberChange::save(path.board_id, path.member_id, dto);

    tracing::debug!(
        board_id = %change.board_id,
        member_id = %change.member_id,
        "member handler::save call gRPC /Subject/SaveSub"
    );
    state.subjects.save_sub(&ctx, change.grant_request()).await?;

    tracing::debug!(board_id = %change.board_id, "member handler::save call gRPC /Board/UpdateBoard");
    state.boards.update_board(&ctx, change.board_request()).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Removes the member from the board, then revokes its grants on it.
pub async fn delete(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedPath(path): ValidatedPath<MemberPath>,
) -> HandlerResult<StatusCode> {
    state
        .permissions
        .board
        .check(&ctx, &path.board_id, Action::DeleteMember)
        .await?;

    let change = MemberChange::remove(path.board_id, path.member_id);

    tracing::debug!(
        board_id = %change.board_id,
        member_id = %change.member_id,
        "member handler::delete call gRPC /Board/UpdateBoard"
    );
    state.boards.update_board(&ctx, change.board_request()).await?;

    tracing::debug!(board_id = %change.board_id, "member handler::delete call gRPC /Subject/SaveSub");
    state.subjects.save_sub(&ctx, change.grant_request()).await?;

    Ok(StatusCode::NO_CONTENT)
}
