use std::collections::HashMap;

use async_trait::async_trait;
use gateway_core::context::RequestContext;
use gateway_core::error::{AppError, ErrorRecords};

use super::gate::AuthorizationGate;
use super::resolver::{BoardEnvelope, BoardResolver};
use super::{Action, CapabilityObject, ResourceType};

/// Board-scoped permission decisions for one resource type.
///
/// A denial is [`AppError::Forbidden`]. A board that cannot be resolved is
/// reported as whatever the lookup failed with, usually NotFound. Either way
/// the caller must not proceed.
#[async_trait]
pub trait PermissionResolver: Send + Sync {
    fn resource(&self) -> ResourceType;

    /// Current envelope of `board_id`.
    async fn envelope(&self, ctx: &RequestContext, board_id: &str) -> Result<BoardEnvelope, AppError>;

    /// Envelopes of every id in one lookup.
    async fn envelopes(
        &self,
        ctx: &RequestContext,
        board_ids: &[String],
    ) -> Result<HashMap<String, BoardEnvelope>, AppError>;

    /// Capability check on an arbitrary object of this resource type.
    async fn check_object(
        &self,
        ctx: &RequestContext,
        owner: Option<&str>,
        reference: Option<&str>,
        action: Action,
    ) -> Result<(), AppError>;

    /// Capability check on a board whose envelope is already known. Used for
    /// creation, where the target board is supplied instead of resolved.
    async fn check_envelope(
        &self,
        ctx: &RequestContext,
        envelope: &BoardEnvelope,
        action: Action,
    ) -> Result<(), AppError> {
        self.check_object(
            ctx,
            Some(&envelope.owner_id),
            Some(&envelope.board_id),
            action,
        )
        .await
    }

    /// Resolves `board_id` and checks `action` on it. Returns the envelope
    /// that was checked.
    async fn check(
        &self,
        ctx: &RequestContext,
        board_id: &str,
        action: Action,
    ) -> Result<BoardEnvelope, AppError> {
        let envelope = self.envelope(ctx, board_id).await?;
        self.check_envelope(ctx, &envelope, action).await?;
        Ok(envelope)
    }

    /// Boolean form of [`PermissionResolver::check`]: any failure is recorded
    /// and answers `false`.
    async fn is_granted(
        &self,
        ctx: &RequestContext,
        board_id: &str,
        action: Action,
        records: &mut ErrorRecords,
    ) -> bool {
        match self.check(ctx, board_id, action).await {
            Ok(_) => true,
            Err(err) => {
                records.record(err);
                false
            }
        }
    }
}

/// [`PermissionResolver`] backed by the board service and the authorization
/// service. One instance per resource type.
#[derive(Clone)]
pub struct BoardPermissions {
    resource: ResourceType,
    boards: BoardResolver,
    gate: AuthorizationGate,
}

impl BoardPermissions {
    pub fn new(resource: ResourceType, boards: BoardResolver, gate: AuthorizationGate) -> Self {
        Self {
            resource,
            boards,
            gate,
        }
    }
}

#[async_trait]
impl PermissionResolver for BoardPermissions {
    fn resource(&self) -> ResourceType {
        self.resource
    }

    async fn envelope(&self, ctx: &RequestContext, board_id: &str) -> Result<BoardEnvelope, AppError> {
        self.boards.resolve(ctx, board_id).await
    }

    async fn envelopes(
        &self,
        ctx: &RequestContext,
        board_ids: &[String],
    ) -> Result<HashMap<String, BoardEnvelope>, AppError> {
        self.boards.resolve_many(ctx, board_ids).await
    }

    async fn check_object(
        &self,
        ctx: &RequestContext,
        owner: Option<&str>,
        reference: Option<&str>,
        action: Action,
    ) -> Result<(), AppError> {
        let mut object = CapabilityObject::new(self.resource);
        if let Some(owner) = owner {
            object = object.owner(owner);
        }
        if let Some(reference) = reference {
            object = object.reference(reference);
        }

        if self.gate.check(ctx, &object, action).await {
            Ok(())
        } else {
            tracing::warn!(
                user_id = %ctx.subject(),
                resource = %self.resource,
                action = %action,
                board_id = reference.unwrap_or_default(),
                "permission denied"
            );
            Err(AppError::forbidden(format!("{} {}", action, self.resource)))
        }
    }
}
