//! Board service gRPC client.

use async_trait::async_trait;
use tonic::transport::Channel;
use tonic::{Response, Status};

use super::channel::ClientConfig;
use super::interceptors::outgoing_request;
use super::proto::{
    board_client::BoardClient as BoardServiceClient, BoardsRequest, BoardsResponse,
    CreateBoardRequest, DeleteBoardRequest, UpdateBoardRequest,
};
use crate::context::RequestContext;
use crate::error::AppError;

/// Calls exposed by `proto.v1.Board`.
#[async_trait]
pub trait BoardApi: Send + Sync {
    async fn create_board(
        &self,
        ctx: &RequestContext,
        request: CreateBoardRequest,
    ) -> Result<(), Status>;

    async fn update_board(
        &self,
        ctx: &RequestContext,
        request: UpdateBoardRequest,
    ) -> Result<(), Status>;

    async fn delete_board(
        &self,
        ctx: &RequestContext,
        request: DeleteBoardRequest,
    ) -> Result<(), Status>;

    async fn get_boards(
        &self,
        ctx: &RequestContext,
        request: BoardsRequest,
    ) -> Result<BoardsResponse, Status>;
}

#[derive(Clone, Debug)]
pub struct BoardClient {
    client: BoardServiceClient<Channel>,
}

impl BoardClient {
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        Ok(Self::from_channel(config.channel()?))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            client: BoardServiceClient::new(channel),
        }
    }
}

#[async_trait]
impl BoardApi for BoardClient {
    async fn create_board(
        &self,
        ctx: &RequestContext,
        request: CreateBoardRequest,
    ) -> Result<(), Status> {
        self.client
            .clone()
            .create_board(outgoing_request(ctx, request))
            .await?;
        Ok(())
    }

    async fn update_board(
        &self,
        ctx: &RequestContext,
        request: UpdateBoardRequest,
    ) -> Result<(), Status> {
        self.client
            .clone()
            .update_board(outgoing_request(ctx, request))
            .await?;
        Ok(())
    }

    async fn delete_board(
        &self,
        ctx: &RequestContext,
        request: DeleteBoardRequest,
    ) -> Result<(), Status> {
        self.client
            .clone()
            .delete_board(outgoing_request(ctx, request))
            .await?;
        Ok(())
    }

    async fn get_boards(
        &self,
        ctx: &RequestContext,
        request: BoardsRequest,
    ) -> Result<BoardsResponse, Status> {
        self.client
            .clone()
            .get_boards(outgoing_request(ctx, request))
            .await
            .map(Response::into_inner)
    }
}
