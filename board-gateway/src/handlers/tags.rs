use axum::{
    extract::{OriginalUri, State},
    http::StatusCode,
    response::Response,
    Json,
};
use gateway_core::context::RequestContext;
use gateway_core::error::{ErrorRecords, HandlerResult};
use uuid::Uuid;
use validator::Validate;

use super::created;
use crate::authz::resolver::exactly_one;
use crate::authz::{Action, ResourceType};
use crate::dtos::tags::{self, CreateTagDto, TagView, UpdateTagDto};
use crate::dtos::{BoardPageQuery, PageResponse, TagPath};
use crate::startup::AppState;
use crate::utils::{JsonBody, ValidatedJson, ValidatedPath, ValidatedQuery};

pub async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedQuery(query): ValidatedQuery<BoardPageQuery>,
) -> HandlerResult<Json<PageResponse<TagView>>> {
    let mut records = ErrorRecords::new();
    if !state
        .permissions
        .tag
        .is_granted(&ctx, &query.board_id, Action::Read, &mut records)
        .await
    {
        return Err(records);
    }

    tracing::debug!(board_id = %query.board_id, "tag handler::list call gRPC /Tag/GetTags");
    let response = state.tags.get_tags(&ctx, tags::list_request(&query)).await?;

    Ok(Json(PageResponse::new(
        query.page_index,
        query.page_size,
        response.total,
        response.tags.into_iter().map(TagView::from).collect(),
    )))
}

pub async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    OriginalUri(uri): OriginalUri,
    ValidatedJson(dto): ValidatedJson<CreateTagDto>,
) -> HandlerResult<Response> {
    state
        .permissions
        .tag
        .check(&ctx, &dto.board_id, Action::Create)
        .await?;

    let tag_id = Uuid::new_v4().to_string();

    tracing::debug!(%tag_id, "tag handler::create call gRPC /Tag/CreateTag");
    state
        .tags
        .create_tag(&ctx, dto.into_request(tag_id.clone(), ctx.subject().to_string()))
        .await?;

    Ok(created(&uri, &tag_id))
}

pub async fn read(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedPath(path): ValidatedPath<TagPath>,
) -> HandlerResult<Json<TagView>> {
    tracing::debug!(tag_id = %path.tag_id, "tag handler::read call gRPC /Tag/GetTags");
    let response = state.tags.get_tags(&ctx, tags::tags_request(&path.tag_id)).await?;
    let tag = exactly_one(response.tags, ResourceType::Tag)?;

    state
        .permissions
        .tag
        .check(&ctx, &tag.board_id, Action::Read)
        .await?;

    Ok(Json(TagView::from(tag)))
}

pub async fn update(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedPath(path): ValidatedPath<TagPath>,
    JsonBody(mut dto): JsonBody<UpdateTagDto>,
) -> HandlerResult<StatusCode> {
    dto.tag_id = path.tag_id;
    dto.validate()?;

    state.cascades.tag.authorize(&ctx, &[dto.move_item()]).await?;

    tracing::debug!(tag_id = %dto.tag_id, "tag handler::update call gRPC /Tag/UpdateTag");
    state.tags.update_tag(&ctx, dto.into()).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedPath(path): ValidatedPath<TagPath>,
) -> HandlerResult<StatusCode> {
    tracing::debug!(tag_id = %path.tag_id, "tag handler::delete call gRPC /Tag/GetTags");
    let response = state.tags.get_tags(&ctx, tags::tags_request(&path.tag_id)).await?;
    let tag = exactly_one(response.tags, ResourceType::Tag)?;

    state
        .permissions
        .tag
        .check(&ctx, &tag.board_id, Action::Delete)
        .await?;

    tracing::debug!(tag_id = %path.tag_id, "tag handler::delete call gRPC /Tag/DeleteTag");
    state
        .tags
        .delete_tag(&ctx, tags::delete_request(&path.tag_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
