//! User service gRPC client.

use async_trait::async_trait;
use tonic::transport::Channel;
use tonic::{Response, Status};

use super::channel::ClientConfig;
use super::interceptors::outgoing_request;
use super::proto::{
    user_client::UserClient as UserServiceClient, UpdateUserRequest, UsersRequest, UsersResponse,
};
use crate::context::RequestContext;
use crate::error::AppError;

/// Calls exposed by `proto.v1.User`.
#[async_trait]
pub trait UserApi: Send + Sync {
    async fn update_user(&self, ctx: &RequestContext, request: UpdateUserRequest)
        -> Result<(), Status>;

    async fn get_users(
        &self,
        ctx: &RequestContext,
        request: UsersRequest,
    ) -> Result<UsersResponse, Status>;
}

#[derive(Clone, Debug)]
pub struct UserClient {
    client: UserServiceClient<Channel>,
}

impl UserClient {
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        Ok(Self::from_channel(config.channel()?))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            client: UserServiceClient::new(channel),
        }
    }
}

#[async_trait]
impl UserApi for UserClient {
    async fn update_user(
        &self,
        ctx: &RequestContext,
        request: UpdateUserRequest,
    ) -> Result<(), Status> {
        self.client
            .clone()
            .update_user(outgoing_request(ctx, request))
            .await?;
        Ok(())
    }

    async fn get_users(
        &self,
        ctx: &RequestContext,
        request: UsersRequest,
    ) -> Result<UsersResponse, Status> {
        self.client
            .clone()
            .get_users(outgoing_request(ctx, request))
            .await
            .map(Response::into_inner)
    }
}
