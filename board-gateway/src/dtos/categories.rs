use chrono::{DateTime, Utc};
use gateway_core::grpc::proto::{
    categories_response, CategoriesRequest, CreateCategoryRequest, DeleteCategoryRequest,
    UpdateCategoryRequest, UpdateManyCategoriesRequest,
};
use gateway_core::grpc::timestamp_to_datetime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::BoardPageQuery;
use crate::authz::MoveItem;
use crate::utils::validation::{validate_uuid, validate_uuid_or_empty};

#[derive(Debug, Clone, Serialize)]
pub struct CategoryView {
    pub category_id: String,
    pub owner_id: String,
    pub board_id: String,
    pub name: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

impl From<categories_response::Category> for CategoryView {
    fn from(category: categories_response::Category) -> Self {
        Self {
            created_at: timestamp_to_datetime(category.created_at.as_ref()),
            category_id: category.category_id,
            owner_id: category.owner_id,
            board_id: category.board_id,
            name: category.name,
            position: category.position,
        }
    }
}

pub fn list_request(query: &BoardPageQuery) -> CategoriesRequest {
    CategoriesRequest {
        page_index: query.page_index,
        page_size: query.page_size,
        board_ids: vec![query.board_id.clone()],
        ..Default::default()
    }
}

pub fn categories_request(category_id: &str) -> CategoriesRequest {
    CategoriesRequest {
        page_index: 0,
        page_size: 1,
        category_ids: vec![category_id.to_string()],
        ..Default::default()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategoryDto {
    #[validate(custom(function = "validate_uuid"))]
    pub board_id: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub name: String,
    #[serde(default)]
    pub position: i32,
}

impl CreateCategoryDto {
    pub fn into_request(self, category_id: String, owner_id: String) -> CreateCategoryRequest {
        CreateCategoryRequest {
            category_id,
            owner_id,
            board_id: self.board_id,
            name: self.name,
            position: self.position,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCategoryDto {
    #[serde(default)]
    #[validate(custom(function = "validate_uuid"))]
    pub category_id: String,
    #[serde(default)]
    #[validate(custom(function = "validate_uuid_or_empty"))]
    pub board_id: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub name: String,
    #[serde(default)]
    pub position: i32,
}

impl UpdateCategoryDto {
    pub fn move_item(&self) -> MoveItem {
        MoveItem::new(&self.category_id, Some(&self.board_id))
    }
}

impl From<UpdateCategoryDto> for UpdateCategoryRequest {
    fn from(dto: UpdateCategoryDto) -> Self {
        Self {
            category_id: dto.category_id,
            board_id: dto.board_id,
            name: dto.name,
            position: dto.position,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateManyCategoriesDto {
    #[validate(length(min = 1, max = 1000), nested)]
    pub data: Vec<UpdateCategoryDto>,
}

impl UpdateManyCategoriesDto {
    pub fn move_items(&self) -> Vec<MoveItem> {
        self.data.iter().map(UpdateCategoryDto::move_item).collect()
    }
}

impl From<UpdateManyCategoriesDto> for UpdateManyCategoriesRequest {
    fn from(dto: UpdateManyCategoriesDto) -> Self {
        Self {
            categories: dto.data.into_iter().map(UpdateCategoryRequest::from).collect(),
        }
    }
}

pub fn delete_request(category_id: &str) -> DeleteCategoryRequest {
    DeleteCategoryRequest {
        category_id: category_id.to_string(),
    }
}
