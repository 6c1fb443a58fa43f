use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use gateway_core::context::RequestContext;
use gateway_core::error::AppError;

use super::permission::PermissionResolver;
use super::resolver::{BoardEnvelope, ResourceLocator};
use super::Action;

/// One entry of a batch update: the resource and, when it moves, the board it
/// moves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveItem {
    pub resource_id: String,
    pub target_board: Option<String>,
}

impl MoveItem {
    /// An empty target board means "stays where it is".
    pub fn new(resource_id: impl Into<String>, target_board: Option<&str>) -> Self {
        Self {
            resource_id: resource_id.into(),
            target_board: target_board
                .filter(|board| !board.is_empty())
                .map(str::to_string),
        }
    }
}

/// Boards that passed each stage of an authorized batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeSummary {
    pub updated_boards: Vec<String>,
    pub target_boards: Vec<String>,
}

impl CascadeSummary {
    /// Capability checks issued for the batch.
    pub fn checks(&self) -> usize {
        self.updated_boards.len() + self.target_boards.len()
    }
}

/// Authorizes a batch update with one check per distinct board.
///
/// `UPDATE` is checked once on every distinct board currently owning an item,
/// then `CREATE` once on every distinct board an item moves to. The first
/// denial aborts the batch; nothing after it is checked.
pub struct BulkPermissionCascade {
    locator: Arc<dyn ResourceLocator>,
    permissions: Arc<dyn PermissionResolver>,
}

impl BulkPermissionCascade {
    pub fn new(locator: Arc<dyn ResourceLocator>, permissions: Arc<dyn PermissionResolver>) -> Self {
        Self {
            locator,
            permissions,
        }
    }

    pub async fn authorize(
        &self,
        ctx: &RequestContext,
        items: &[MoveItem],
    ) -> Result<CascadeSummary, AppError> {
        let mut summary = CascadeSummary::default();
        if items.is_empty() {
            return Ok(summary);
        }

        let ids: Vec<String> = items.iter().map(|item| item.resource_id.clone()).collect();
        let locations = self.locator.locate(ctx, &ids).await?;
        let current: HashMap<&str, &str> = locations
            .iter()
            .map(|location| (location.resource_id.as_str(), location.board_id.as_str()))
            .collect();

        let mut confirmed_update: HashSet<&str> = HashSet::new();
        let current_boards: Vec<String> = locations
            .iter()
            .filter(|location| confirmed_update.insert(location.board_id.as_str()))
            .map(|location| location.board_id.clone())
            .collect();

        let envelopes = self.permissions.envelopes(ctx, &current_boards).await?;
        for board_id in &current_boards {
            let envelope = envelope_for(&envelopes, board_id)?;
            self.permissions
                .check_envelope(ctx, envelope, Action::Update)
                .await?;
            summary.updated_boards.push(board_id.clone());
        }

        let mut confirmed_create: HashSet<&str> = HashSet::new();
        let mut target_boards = Vec::new();
        for item in items {
            let Some(target) = item.target_board.as_deref() else {
                continue;
            };
            let from = current
                .get(item.resource_id.as_str())
                .copied()
                .ok_or_else(|| AppError::not_found(self.locator.resource().as_str()))?;
            if target != from && confirmed_create.insert(target) {
                target_boards.push(target.to_string());
            }
        }

        if !target_boards.is_empty() {
            let envelopes = self.permissions.envelopes(ctx, &target_boards).await?;
            for board_id in &target_boards {
                let envelope = envelope_for(&envelopes, board_id)?;
                self.permissions
                    .check_envelope(ctx, envelope, Action::Create)
                    .await?;
                summary.target_boards.push(board_id.clone());
            }
        }

        tracing::debug!(
            resource = %self.locator.resource(),
            items = items.len(),
            checks = summary.checks(),
            "batch authorized"
        );
        Ok(summary)
    }
}

fn envelope_for<'a>(
    envelopes: &'a HashMap<String, BoardEnvelope>,
    board_id: &str,
) -> Result<&'a BoardEnvelope, AppError> {
    envelopes
        .get(board_id)
        .ok_or_else(|| AppError::not_found(super::ResourceType::Board.as_str()))
}
