use chrono::{DateTime, Utc};
use gateway_core::grpc::proto::{
    tags_response, CreateTagRequest, DeleteTagRequest, TagsRequest, UpdateTagRequest,
};
use gateway_core::grpc::timestamp_to_datetime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::BoardPageQuery;
use crate::authz::MoveItem;
use crate::utils::validation::{validate_uuid, validate_uuid_or_empty};

#[derive(Debug, Clone, Serialize)]
pub struct TagView {
    pub tag_id: String,
    pub owner_id: String,
    pub board_id: String,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
}

impl From<tags_response::Tag> for TagView {
    fn from(tag: tags_response::Tag) -> Self {
        Self {
            created_at: timestamp_to_datetime(tag.created_at.as_ref()),
            tag_id: tag.tag_id,
            owner_id: tag.owner_id,
            board_id: tag.board_id,
            name: tag.name,
            color: tag.color,
        }
    }
}

pub fn list_request(query: &BoardPageQuery) -> TagsRequest {
    TagsRequest {
        page_index: query.page_index,
        page_size: query.page_size,
        board_ids: vec![query.board_id.clone()],
        ..Default::default()
    }
}

pub fn tags_request(tag_id: &str) -> TagsRequest {
    TagsRequest {
        page_index: 0,
        page_size: 1,
        tag_ids: vec![tag_id.to_string()],
        ..Default::default()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTagDto {
    #[validate(custom(function = "validate_uuid"))]
    pub board_id: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub color: String,
}

impl CreateTagDto {
    pub fn into_request(self, tag_id: String, owner_id: String) -> CreateTagRequest {
        CreateTagRequest {
            tag_id,
            owner_id,
            board_id: self.board_id,
            name: self.name,
            color: self.color,
        }
    }
}

/// The tag id always comes from the path.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTagDto {
    #[serde(skip)]
    #[validate(custom(function = "validate_uuid"))]
    pub tag_id: String,
    #[serde(default)]
    #[validate(custom(function = "validate_uuid_or_empty"))]
    pub board_id: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub color: String,
}

impl UpdateTagDto {
    pub fn move_item(&self) -> MoveItem {
        MoveItem::new(&self.tag_id, Some(&self.board_id))
    }
}

impl From<UpdateTagDto> for UpdateTagRequest {
    fn from(dto: UpdateTagDto) -> Self {
        Self {
            tag_id: dto.tag_id,
            board_id: dto.board_id,
            name: dto.name,
            color: dto.color,
        }
    }
}

pub fn delete_request(tag_id: &str) -> DeleteTagRequest {
    DeleteTagRequest {
        tag_id: tag_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_is_required_on_create() {
        let dto: CreateTagDto = serde_json::from_str(&format!(
            r#"{{"board_id":"{}","name":"urgent","color":""}}"#,
            uuid::Uuid::new_v4()
        ))
        .unwrap();
        assert!(dto.validate().unwrap_err().field_errors().contains_key("color"));
    }

    #[test]
    fn path_id_is_never_read_from_the_body() {
        let dto: UpdateTagDto = serde_json::from_str(r#"{"tag_id":"from-body","name":"x"}"#).unwrap();
        assert!(dto.tag_id.is_empty());
    }
}
