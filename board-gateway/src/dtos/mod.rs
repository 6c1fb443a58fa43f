//! Request and response bodies of the HTTP API, with their conversions to and
//! from the downstream wire types.

pub mod boards;
pub mod cards;
pub mod categories;
pub mod members;
pub mod tags;
pub mod users;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::validation::validate_uuid;

pub const DEFAULT_PAGE_SIZE: u32 = 50;

pub(crate) fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// `?page_index=&page_size=`
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PageQuery {
    #[serde(default)]
    pub page_index: u64,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 1000))]
    pub page_size: u32,
}

/// Listing of board-scoped resources, `?board_id=&page_index=&page_size=`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BoardPageQuery {
    #[validate(custom(function = "validate_uuid"))]
    pub board_id: String,
    #[serde(default)]
    pub page_index: u64,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 1000))]
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResponse<T> {
    pub page_index: u64,
    pub page_size: u32,
    pub total: u64,
    pub data: Vec<T>,
}

impl<T> PageResponse<T> {
    pub fn new(page_index: u64, page_size: u32, total: u64, data: Vec<T>) -> Self {
        Self {
            page_index,
            page_size,
            total,
            data,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserPath {
    #[validate(custom(function = "validate_uuid"))]
    pub user_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BoardPath {
    #[validate(custom(function = "validate_uuid"))]
    pub board_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MemberPath {
    #[validate(custom(function = "validate_uuid"))]
    pub board_id: String,
    #[validate(custom(function = "validate_uuid"))]
    pub member_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CardPath {
    #[validate(custom(function = "validate_uuid"))]
    pub card_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryPath {
    #[validate(custom(function = "validate_uuid"))]
    pub category_id: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TagPath {
    #[validate(custom(function = "validate_uuid"))]
    pub tag_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_apply() {
        let query: PageQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.page_index, 0);
        assert_eq!(query.page_size, DEFAULT_PAGE_SIZE);
        assert!(query.validate().is_ok());
    }

    #[test]
    fn page_size_is_bounded() {
        let query: PageQuery = serde_json::from_str(r#"{"page_size":1001}"#).unwrap();
        assert!(query.validate().unwrap_err().field_errors().contains_key("page_size"));
        let query: PageQuery = serde_json::from_str(r#"{"page_size":0}"#).unwrap();
        assert!(query.validate().is_err());
    }

    #[test]
    fn board_page_requires_a_uuid() {
        let query: BoardPageQuery = serde_json::from_str(r#"{"board_id":"nope"}"#).unwrap();
        assert!(query.validate().unwrap_err().field_errors().contains_key("board_id"));
    }
}
