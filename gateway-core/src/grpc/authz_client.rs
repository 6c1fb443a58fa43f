//! Authorization service gRPC client: capability checks and subject grants.

use async_trait::async_trait;
use tonic::transport::Channel;
use tonic::{Response, Status};

use super::channel::ClientConfig;
use super::interceptors::outgoing_request;
use super::proto::{
    authorization_checker_client::AuthorizationCheckerClient, subject_client::SubjectClient,
    DeleteRefRequest, Granted, IsGrantedRequest, SaveSubRequest,
};
use crate::context::RequestContext;
use crate::error::AppError;

/// `proto.v1.AuthorizationChecker`
#[async_trait]
pub trait CheckerApi: Send + Sync {
    async fn is_granted(
        &self,
        ctx: &RequestContext,
        request: IsGrantedRequest,
    ) -> Result<Granted, Status>;
}

/// `proto.v1.Subject`
#[async_trait]
pub trait SubjectApi: Send + Sync {
    async fn save_sub(&self, ctx: &RequestContext, request: SaveSubRequest) -> Result<(), Status>;

    /// Drops every grant that references the given object.
    async fn delete_ref(&self, ctx: &RequestContext, request: DeleteRefRequest)
        -> Result<(), Status>;
}

/// Both authorization services live behind one endpoint and share a channel.
#[derive(Clone, Debug)]
pub struct AuthzClient {
    checker: AuthorizationCheckerClient<Channel>,
    subject: SubjectClient<Channel>,
}

impl AuthzClient {
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        Ok(Self::from_channel(config.channel()?))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            checker: AuthorizationCheckerClient::new(channel.clone()),
            subject: SubjectClient::new(channel),
        }
    }
}

#[async_trait]
impl CheckerApi for AuthzClient {
    async fn is_granted(
        &self,
        ctx: &RequestContext,
        request: IsGrantedRequest,
    ) -> Result<Granted, Status> {
        self.checker
            .clone()
            .is_granted(outgoing_request(ctx, request))
            .await
            .map(Response::into_inner)
    }
}

#[async_trait]
impl SubjectApi for AuthzClient {
    async fn save_sub(&self, ctx: &RequestContext, request: SaveSubRequest) -> Result<(), Status> {
        self.subject
            .clone()
            .save_sub(outgoing_request(ctx, request))
            .await?;
        Ok(())
    }

    async fn delete_ref(
        &self,
        ctx: &RequestContext,
        request: DeleteRefRequest,
    ) -> Result<(), Status> {
        self.subject
            .clone()
            .delete_ref(outgoing_request(ctx, request))
            .await?;
        Ok(())
    }
}
