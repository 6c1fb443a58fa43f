use chrono::{DateTime, Utc};
use gateway_core::grpc::proto::{
    cards_response, AttachmentType, CardType, CardsRequest, CreateCardRequest, DeleteCardRequest,
    UpdateCardRequest, UpdateManyCardsRequest,
};
use gateway_core::grpc::timestamp_to_datetime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::BoardPageQuery;
use crate::authz::MoveItem;
use crate::utils::validation::{
    validate_card_type, validate_uuid, validate_uuid_list, validate_uuid_or_empty,
};

#[derive(Debug, Clone, Serialize)]
pub struct AttachmentView {
    pub attachment_id: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    pub card_id: String,
    pub owner_id: String,
    pub board_id: String,
    pub category_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<String>,
    pub attachments: Vec<AttachmentView>,
}

impl From<cards_response::Card> for CardView {
    fn from(card: cards_response::Card) -> Self {
        Self {
            kind: CardType::try_from(card.r#type)
                .unwrap_or(CardType::UnkCard)
                .as_str_name()
                .to_string(),
            created_at: timestamp_to_datetime(card.created_at.as_ref()),
            attachments: card
                .attachments
                .into_iter()
                .map(|attachment| AttachmentView {
                    kind: AttachmentType::try_from(attachment.r#type)
                        .unwrap_or(AttachmentType::UnkAttachment)
                        .as_str_name()
                        .to_string(),
                    attachment_id: attachment.attachment_id,
                })
                .collect(),
            card_id: card.card_id,
            owner_id: card.owner_id,
            board_id: card.board_id,
            category_id: card.category_id,
            name: card.name,
            content: card.content,
            position: card.position,
            tags: card.tags,
        }
    }
}

pub fn list_request(query: &BoardPageQuery) -> CardsRequest {
    CardsRequest {
        page_index: query.page_index,
        page_size: query.page_size,
        board_ids: vec![query.board_id.clone()],
        ..Default::default()
    }
}

pub fn cards_request(card_id: &str) -> CardsRequest {
    CardsRequest {
        page_index: 0,
        page_size: 1,
        card_ids: vec![card_id.to_string()],
        ..Default::default()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCardDto {
    #[validate(custom(function = "validate_uuid"))]
    pub board_id: String,
    #[validate(custom(function = "validate_uuid"))]
    pub category_id: String,
    #[validate(length(min = 1, max = 1000))]
    pub name: String,
    #[serde(rename = "type")]
    #[validate(custom(function = "validate_card_type"))]
    pub kind: String,
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub content: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    #[validate(custom(function = "validate_uuid_list"))]
    pub tags: Vec<String>,
}

impl CreateCardDto {
    pub fn into_request(self, card_id: String, owner_id: String) -> CreateCardRequest {
        CreateCardRequest {
            card_id,
            owner_id,
            r#type: CardType::from_str_name(&self.kind).unwrap_or(CardType::UnkCard) as i32,
            board_id: self.board_id,
            category_id: self.category_id,
            name: self.name,
            content: self.content,
            position: self.position,
            tags: self.tags,
        }
    }
}

/// Partial card update. An empty `board_id` keeps the card on its board.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCardDto {
    #[serde(default)]
    #[validate(custom(function = "validate_uuid"))]
    pub card_id: String,
    #[serde(default)]
    #[validate(custom(function = "validate_uuid_or_empty"))]
    pub board_id: String,
    #[serde(default)]
    #[validate(custom(function = "validate_uuid_or_empty"))]
    pub category_id: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub content: String,
    #[serde(default)]
    pub position: i32,
    #[serde(default)]
    #[validate(custom(function = "validate_uuid_list"))]
    pub tags: Vec<String>,
}

impl UpdateCardDto {
    pub fn move_item(&self) -> MoveItem {
        MoveItem::new(&self.card_id, Some(&self.board_id))
    }
}

impl From<UpdateCardDto> for UpdateCardRequest {
    fn from(dto: UpdateCardDto) -> Self {
        Self {
            card_id: dto.card_id,
            board_id: dto.board_id,
            category_id: dto.category_id,
            name: dto.name,
            content: dto.content,
            position: dto.position,
            tags: dto.tags,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateManyCardsDto {
    #[validate(length(min = 1, max = 1000), nested)]
    pub data: Vec<UpdateCardDto>,
}

impl UpdateManyCardsDto {
    pub fn move_items(&self) -> Vec<MoveItem> {
        self.data.iter().map(UpdateCardDto::move_item).collect()
    }
}

impl From<UpdateManyCardsDto> for UpdateManyCardsRequest {
    fn from(dto: UpdateManyCardsDto) -> Self {
        Self {
            cards: dto.data.into_iter().map(UpdateCardRequest::from).collect(),
        }
    }
}

pub fn delete_request(card_id: &str) -> DeleteCardRequest {
    DeleteCardRequest {
        card_id: card_id.to_string(),
    }
}
