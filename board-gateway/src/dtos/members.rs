use gateway_core::grpc::proto::{save_sub_request, SaveSubRequest};
use gateway_core::grpc::proto::{update_board_request, UpdateBoardRequest};
use serde::Deserialize;
use validator::Validate;

use crate::utils::validation::validate_roles;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveMemberDto {
    #[validate(custom(function = "validate_roles"))]
    pub roles: Vec<String>,
}

/// A membership change applied to both the board and the grants of the member.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberChange {
    pub board_id: String,
    pub member_id: String,
    pub roles: Vec<String>,
    pub delete: bool,
}

impl MemberChange {
    pub fn save(board_id: String, member_id: String, dto: SaveMemberDto) -> Self {
        Self {
            board_id,
            member_id,
            roles: dto.roles,
            delete: false,
        }
    }

    pub fn remove(board_id: String, member_id: String) -> Self {
        Self {
            board_id,
            member_id,
            roles: Vec::new(),
            delete: true,
        }
    }

    pub fn board_request(&self) -> UpdateBoardRequest {
        UpdateBoardRequest {
            board_id: self.board_id.clone(),
            members: vec![update_board_request::Member {
                member_id: self.member_id.clone(),
                roles: self.roles.clone(),
                delete: self.delete,
            }],
            ..Default::default()
        }
    }

    pub fn grant_request(&self) -> SaveSubRequest {
        SaveSubRequest {
            sub_id: self.member_id.clone(),
            refs: vec![save_sub_request::Ref {
                ref_id: self.board_id.clone(),
                roles: self.roles.clone(),
                delete: self.delete,
            }],
        }
    }
}
