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
use crate::dtos::categories::{
    self, CategoryView, CreateCategoryDto, UpdateCategoryDto, UpdateManyCategoriesDto,
};
use crate::dtos::{BoardPageQuery, CategoryPath, PageResponse};
use crate::startup::AppState;
use crate::utils::{JsonBody, ValidatedJson, ValidatedPath, ValidatedQuery};

pub async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedQuery(query): ValidatedQuery<BoardPageQuery>,
) -> HandlerResult<Json<PageResponse<CategoryView>>> {
    let mut records = ErrorRecords::new();
    if !state
        .permissions
        .category
        .is_granted(&ctx, &query.board_id, Action::Read, &mut records)
        .await
    {
        return Err(records);
    }

    tracing::debug!(board_id = %query.board_id, "category handler::list call gRPC /Category/GetCategories");
    let response = state
        .categories
        .get_categories(&ctx, categories::list_request(&query))
        .await?;

    Ok(Json(PageResponse::new(
        query.page_index,
        query.page_size,
        response.total,
        response
            .categories
            .into_iter()
            .map(CategoryView::from)
            .collect(),
    )))
}

pub async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    OriginalUri(uri): OriginalUri,
    ValidatedJson(dto): ValidatedJson<CreateCategoryDto>,
) -> HandlerResult<Response> {
    state
        .permissions
        .category
        .check(&ctx, &dto.board_id, Action::Create)
        .await?;

    let category_id = Uuid::new_v4().to_string();

    tracing::debug!(%category_id, "category handler::create call gRPC /Category/CreateCategory");
    state
        .categories
        .create_category(
            &ctx,
            dto.into_request(category_id.clone(), ctx.subject().to_string()),
        )
        .await?;

    Ok(created(&uri, &category_id))
}

pub async fn update_many(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedJson(dto): ValidatedJson<UpdateManyCategoriesDto>,
) -> HandlerResult<StatusCode> {
    state
        .cascades
        .category
        .authorize(&ctx, &dto.move_items())
        .await?;

    tracing::debug!(
        categories = dto.data.len(),
        "category handler::update_many call gRPC /Category/UpdateManyCategories"
    );
    state.categories.update_many_categories(&ctx, dto.into()).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn read(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedPath(path): ValidatedPath<CategoryPath>,
) -> HandlerResult<Json<CategoryView>> {
    tracing::debug!(category_id = %path.category_id, "category handler::read call gRPC /Category/GetCategories");
    let response = state
        .categories
        .get_categories(&ctx, categories::categories_request(&path.category_id))
        .await?;
    let category = exactly_one(response.categories, ResourceType::Category)?;

    state
        .permissions
        .category
        .check(&ctx, &category.board_id, Action::Read)
        .await?;

    Ok(Json(CategoryView::from(category)))
}

pub async fn update(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedPath(path): ValidatedPath<CategoryPath>,
    JsonBody(mut dto): JsonBody<UpdateCategoryDto>,
) -> HandlerResult<StatusCode> {
    dto.category_id = path.category_id;
    dto.validate()?;

    state
        .cascades
        .category
        .authorize(&ctx, &[dto.move_item()])
        .await?;

    tracing::debug!(category_id = %dto.category_id, "category handler::update call gRPC /Category/UpdateCategory");
    state.categories.update_category(&ctx, dto.into()).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedPath(path): ValidatedPath<CategoryPath>,
) -> HandlerResult<StatusCode> {
    tracing::debug!(category_id = %path.category_id, "category handler::delete call gRPC /Category/GetCategories");
    let response = state
        .categories
        .get_categories(&ctx, categories::categories_request(&path.category_id))
        .await?;
    let category = exactly_one(response.categories, ResourceType::Category)?;

    state
        .permissions
        .category
        .check(&ctx, &category.board_id, Action::Delete)
        .await?;

    tracing::debug!(category_id = %path.category_id, "category handler::delete call gRPC /Category/DeleteCategory");
    state
        .categories
        .delete_category(&ctx, categories::delete_request(&path.category_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
