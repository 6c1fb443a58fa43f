//! Category service gRPC client.

use async_trait::async_trait;
use tonic::transport::Channel;
use tonic::{Response, Status};

use super::channel::ClientConfig;
use super::interceptors::outgoing_request;
use super::proto::{
    category_client::CategoryClient as CategoryServiceClient, CategoriesRequest, CategoriesResponse,
    CreateCategoryRequest, DeleteCategoryRequest, UpdateCategoryRequest,
    UpdateManyCategoriesRequest,
};
use crate::context::RequestContext;
use crate::error::AppError;

/// Calls exposed by `proto.v1.Category`.
#[async_trait]
pub trait CategoryApi: Send + Sync {
    async fn create_category(
        &self,
        ctx: &RequestContext,
        request: CreateCategoryRequest,
    ) -> Result<(), Status>;

    async fn update_category(
        &self,
        ctx: &RequestContext,
        request: UpdateCategoryRequest,
    ) -> Result<(), Status>;

    async fn update_many_categories(
        &self,
        ctx: &RequestContext,
        request: UpdateManyCategoriesRequest,
    ) -> Result<(), Status>;

    async fn delete_category(
        &self,
        ctx: &RequestContext,
        request: DeleteCategoryRequest,
    ) -> Result<(), Status>;

    async fn get_categories(
        &self,
        ctx: &RequestContext,
        request: CategoriesRequest,
    ) -> Result<CategoriesResponse, Status>;
}

#[derive(Clone, Debug)]
pub struct CategoryClient {
    client: CategoryServiceClient<Channel>,
}

impl CategoryClient {
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        Ok(Self::from_channel(config.channel()?))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            client: CategoryServiceClient::new(channel),
        }
    }
}

#[async_trait]
impl CategoryApi for CategoryClient {
    async fn create_category(
        &self,
        ctx: &RequestContext,
        request: CreateCategoryRequest,
    ) -> Result<(), Status> {
        self.client
            .clone()
            .create_category(outgoing_request(ctx, request))
            .await?;
        Ok(())
    }

    async fn update_category(
        &self,
        ctx: &RequestContext,
        request: UpdateCategoryRequest,
    ) -> Result<(), Status> {
        self.client
            .clone()
            .update_category(outgoing_request(ctx, request))
            .await?;
        Ok(())
    }

    async fn update_many_categories(
        &self,
        ctx: &RequestContext,
        request: UpdateManyCategoriesRequest,
    ) -> Result<(), Status> {
        self.client
            .clone()
            .update_many_categories(outgoing_request(ctx, request))
            .await?;
        Ok(())
    }

    async fn delete_category(
        &self,
        ctx: &RequestContext,
        request: DeleteCategoryRequest,
    ) -> Result<(), Status> {
        self.client
            .clone()
            .delete_category(outgoing_request(ctx, request))
            .await?;
        Ok(())
    }

    async fn get_categories(
        &self,
        ctx: &RequestContext,
        request: CategoriesRequest,
    ) -> Result<CategoriesResponse, Status> {
        self.client
            .clone()
            .get_categories(outgoing_request(ctx, request))
            .await
            .map(Response::into_inner)
    }
}
