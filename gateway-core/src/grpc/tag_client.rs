//! Tag service gRPC client.

use async_trait::async_trait;
use tonic::transport::Channel;
use tonic::{Response, Status};

use super::channel::ClientConfig;
use super::interceptors::outgoing_request;
use super::proto::{
    tag_client::TagClient as TagServiceClient, CreateTagRequest, DeleteTagRequest, TagsRequest,
    TagsResponse, UpdateTagRequest,
};
use crate::context::RequestContext;
use crate::error::AppError;

/// Calls exposed by `proto.v1.Tag`.
#[async_trait]
pub trait TagApi: Send + Sync {
    async fn create_tag(&self, ctx: &RequestContext, request: CreateTagRequest)
        -> Result<(), Status>;

    async fn update_tag(&self, ctx: &RequestContext, request: UpdateTagRequest)
        -> Result<(), Status>;

    async fn delete_tag(&self, ctx: &RequestContext, request: DeleteTagRequest)
        -> Result<(), Status>;

    async fn get_tags(
        &self,
        ctx: &RequestContext,
        request: TagsRequest,
    ) -> Result<TagsResponse, Status>;
}

#[derive(Clone, Debug)]
pub struct TagClient {
    client: TagServiceClient<Channel>,
}

impl TagClient {
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        Ok(Self::from_channel(config.channel()?))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            client: TagServiceClient::new(channel),
        }
    }
}

#[async_trait]
impl TagApi for TagClient {
    async fn create_tag(
        &self,
        ctx: &RequestContext,
        request: CreateTagRequest,
    ) -> Result<(), Status> {
        self.client
            .clone()
            .create_tag(outgoing_request(ctx, request))
            .await?;
        Ok(())
    }

    async fn update_tag(
        &self,
        ctx: &RequestContext,
        request: UpdateTagRequest,
    ) -> Result<(), Status> {
        self.client
            .clone()
            .update_tag(outgoing_request(ctx, request))
            .await?;
        Ok(())
    }

    async fn delete_tag(
        &self,
        ctx: &RequestContext,
        request: DeleteTagRequest,
    ) -> Result<(), Status> {
        self.client
            .clone()
            .delete_tag(outgoing_request(ctx, request))
            .await?;
        Ok(())
    }

    async fn get_tags(
        &self,
        ctx: &RequestContext,
        request: TagsRequest,
    ) -> Result<TagsResponse, Status> {
        self.client
            .clone()
            .get_tags(outgoing_request(ctx, request))
            .await
            .map(Response::into_inner)
    }
}
