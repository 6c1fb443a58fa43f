use chrono::{DateTime, Utc};
use gateway_core::grpc::proto::{
    boards_response, BoardType, BoardsRequest, CreateBoardRequest, DeleteBoardRequest,
    UpdateBoardRequest,
};
use gateway_core::grpc::timestamp_to_datetime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::PageQuery;
use crate::utils::validation::validate_board_type;

#[derive(Debug, Clone, Serialize)]
pub struct MemberView {
    pub member_id: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardView {
    pub board_id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub members: Vec<MemberView>,
}

impl From<boards_response::Board> for BoardView {
    fn from(board: boards_response::Board) -> Self {
        Self {
            kind: BoardType::try_from(board.r#type)
                .unwrap_or(BoardType::UnkBoard)
                .as_str_name()
                .to_string(),
            created_at: timestamp_to_datetime(board.created_at.as_ref()),
            members: board
                .members
                .into_iter()
                .map(|member| MemberView {
                    member_id: member.member_id,
                    roles: member.roles,
                })
                .collect(),
            board_id: board.board_id,
            owner_id: board.owner_id,
            name: board.name,
            data: board.data,
            description: board.description,
        }
    }
}

/// Boards the caller owns or is a member of.
pub fn list_request(query: &PageQuery, user_id: &str) -> BoardsRequest {
    BoardsRequest {
        page_index: query.page_index,
        page_size: query.page_size,
        owner_ids: vec![user_id.to_string()],
        member_ids: vec![user_id.to_string()],
        ..Default::default()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBoardDto {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[serde(rename = "type")]
    #[validate(custom(function = "validate_board_type"))]
    pub kind: String,
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub data: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,
}

impl CreateBoardDto {
    pub fn into_request(self, board_id: String, owner_id: String) -> CreateBoardRequest {
        CreateBoardRequest {
            board_id,
            owner_id,
            r#type: BoardType::from_str_name(&self.kind).unwrap_or(BoardType::UnkBoard) as i32,
            name: self.name,
            data: self.data,
            description: self.description,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateBoardDto {
    #[serde(default)]
    #[validate(length(max = 150))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub data: String,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,
}

impl UpdateBoardDto {
    pub fn into_request(self, board_id: String) -> UpdateBoardRequest {
        UpdateBoardRequest {
            board_id,
            name: self.name,
            data: self.data,
            description: self.description,
            members: Vec::new(),
        }
    }
}

pub fn delete_request(board_id: &str) -> DeleteBoardRequest {
    DeleteBoardRequest {
        board_id: board_id.to_string(),
    }
}
