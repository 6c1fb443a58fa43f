use axum::{
    extract::{OriginalUri, State},
    http::StatusCode,
    response::Response,
    Json,
};
use gateway_core::context::RequestContext;
use gateway_core::error::HandlerResult;
use gateway_core::grpc::proto::DeleteRefRequest;
use uuid::Uuid;

use super::created;
use crate::authz::{Action, BoardEnvelope};
use crate::dtos::boards::{self, BoardView, CreateBoardDto, UpdateBoardDto};
use crate::dtos::{BoardPath, PageQuery, PageResponse};
use crate::startup::AppState;
use crate::utils::{ValidatedJson, ValidatedPath, ValidatedQuery};

/// Boards the caller owns or is a member of.
pub async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> HandlerResult<Json<PageResponse<BoardView>>> {
    tracing::debug!("board handler::list call gRPC /Board/GetBoards");
    let response = state
        .boards
        .get_boards(&ctx, boards::list_request(&query, ctx.subject()))
        .await?;

    Ok(Json(PageResponse::new(
        query.page_index,
        query.page_size,
        response.total,
        response.boards.into_iter().map(BoardView::from).collect(),
    )))
}

pub async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    OriginalUri(uri): OriginalUri,
    ValidatedJson(dto): ValidatedJson<CreateBoardDto>,
) -> HandlerResult<Response> {
    // A new board has neither owner nor ref yet.
    state
        .permissions
        .board
        .check_object(&ctx, None, None, Action::Create)
        .await?;

    let board_id = Uuid::new_v4().to_string();

    tracing::debug!(%board_id, "board handler::create call gRPC /Board/CreateBoard");
    state
        .boards
        .create_board(
            &ctx,
            dto.into_request(board_id.clone(), ctx.subject().to_string()),
        )
        .await?;

    Ok(created(&uri, &board_id))
}

pub async fn read(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedPath(path): ValidatedPath<BoardPath>,
) -> HandlerResult<Json<BoardView>> {
    let board = state.board_resolver.fetch(&ctx, &path.board_id).await?;
    state
        .permissions
        .board
        .check_envelope(&ctx, &BoardEnvelope::from(&board), Action::Read)
        .await?;

    Ok(Json(BoardView::from(board)))
}

pub async fn update(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedPath(path): ValidatedPath<BoardPath>,
    ValidatedJson(dto): ValidatedJson<UpdateBoardDto>,
) -> HandlerResult<StatusCode> {
    state
        .permissions
        .board
        .check(&ctx, &path.board_id, Action::Update)
        .await?;

    tracing::debug!(board_id = %path.board_id, "board handler::update call gRPC /Board/UpdateBoard");
    state
        .boards
        .update_board(&ctx, dto.into_request(path.board_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Deletes the board, then every grant referencing it.
pub async fn delete(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedPath(path): ValidatedPath<BoardPath>,
) -> HandlerResult<StatusCode> {
    state
        .permissions
        .board
        .check(&ctx, &path.board_id, Action::Delete)
        .await?;

    tracing::debug!(board_id = %path.board_id, "board handler::delete call gRPC /Board/DeleteBoard");
    state
        .boards
        .delete_board(&ctx, boards::delete_request(&path.board_id))
        .await?;

    tracing::debug!(board_id = %path.board_id, "board handler::delete call gRPC /Subject/DeleteRef");
    state
        .subjects
        .delete_ref(
            &ctx,
            DeleteRefRequest {
                ref_id: path.board_id,
            },
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
