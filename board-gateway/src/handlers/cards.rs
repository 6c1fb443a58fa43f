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
use crate::dtos::cards::{
    self, CardView, CreateCardDto, UpdateCardDto, UpdateManyCardsDto,
};
use crate::dtos::{BoardPageQuery, CardPath, PageResponse};
use crate::startup::AppState;
use crate::utils::{JsonBody, ValidatedJson, ValidatedPath, ValidatedQuery};

pub async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedQuery(query): ValidatedQuery<BoardPageQuery>,
) -> HandlerResult<Json<PageResponse<CardView>>> {
    let mut records = ErrorRecords::new();
    if !state
        .permissions
        .card
        .is_granted(&ctx, &query.board_id, Action::Read, &mut records)
        .await
    {
        return Err(records);
    }

    tracing::debug!(board_id = %query.board_id, "card handler::list call gRPC /Card/GetCards");
    let response = state.cards.get_cards(&ctx, cards::list_request(&query)).await?;

    Ok(Json(PageResponse::new(
        query.page_index,
        query.page_size,
        response.total,
        response.cards.into_iter().map(CardView::from).collect(),
    )))
}

pub async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    OriginalUri(uri): OriginalUri,
    ValidatedJson(dto): ValidatedJson<CreateCardDto>,
) -> HandlerResult<Response> {
    state
        .permissions
        .card
        .check(&ctx, &dto.board_id, Action::Create)
        .await?;

    let card_id = Uuid::new_v4().to_string();

    tracing::debug!(%card_id, "card handler::create call gRPC /Card/CreateCard");
    state
        .cards
        .create_card(&ctx, dto.into_request(card_id.clone(), ctx.subject().to_string()))
        .await?;

    Ok(created(&uri, &card_id))
}

/// Batch update. Nothing is written unless every board involved allows it.
pub async fn update_many(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedJson(dto): ValidatedJson<UpdateManyCardsDto>,
) -> HandlerResult<StatusCode> {
    state.cascades.card.authorize(&ctx, &dto.move_items()).await?;

    tracing::debug!(cards = dto.data.len(), "card handler::update_many call gRPC /Card/UpdateManyCards");
    state.cards.update_many_cards(&ctx, dto.into()).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn read(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedPath(path): ValidatedPath<CardPath>,
) -> HandlerResult<Json<CardView>> {
    tracing::debug!(card_id = %path.card_id, "card handler::read call gRPC /Card/GetCards");
    let response = state.cards.get_cards(&ctx, cards::cards_request(&path.card_id)).await?;
    let card = exactly_one(response.cards, ResourceType::Card)?;

    state
        .permissions
        .card
        .check(&ctx, &card.board_id, Action::Read)
        .await?;

    Ok(Json(CardView::from(card)))
}

/// Single update, authorized like a batch of one: UPDATE on the current
/// board, CREATE on the target board when the card moves.
pub async fn update(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedPath(path): ValidatedPath<CardPath>,
    JsonBody(mut dto): JsonBody<UpdateCardDto>,
) -> HandlerResult<StatusCode> {
    dto.card_id = path.card_id;
    dto.validate()?;

    state.cascades.card.authorize(&ctx, &[dto.move_item()]).await?;

    tracing::debug!(card_id = %dto.card_id, "card handler::update call gRPC /Card/UpdateCard");
    state.cards.update_card(&ctx, dto.into()).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    ctx: RequestContext,
    ValidatedPath(path): ValidatedPath<CardPath>,
) -> HandlerResult<StatusCode> {
    tracing::debug!(card_id = %path.card_id, "card handler::delete call gRPC /Card/GetCards");
    let response = state.cards.get_cards(&ctx, cards::cards_request(&path.card_id)).await?;
    let card = exactly_one(response.cards, ResourceType::Card)?;

    state
        .permissions
        .card
        .check(&ctx, &card.board_id, Action::Delete)
        .await?;

    tracing::debug!(card_id = %path.card_id, "card handler::delete call gRPC /Card/DeleteCard");
    state
        .cards
        .delete_card(&ctx, cards::delete_request(&path.card_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
