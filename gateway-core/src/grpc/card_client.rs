//! Card service gRPC client.

use async_trait::async_trait;
use tonic::transport::Channel;
use tonic::{Response, Status};

use super::channel::ClientConfig;
use super::interceptors::outgoing_request;
use super::proto::{
    card_client::CardClient as CardServiceClient, CardsRequest, CardsResponse, CreateCardRequest,
    DeleteCardRequest, UpdateCardRequest, UpdateManyCardsRequest,
};
use crate::context::RequestContext;
use crate::error::AppError;

/// Calls exposed by `proto.v1.Card`.
#[async_trait]
pub trait CardApi: Send + Sync {
    async fn create_card(&self, ctx: &RequestContext, request: CreateCardRequest)
        -> Result<(), Status>;

    async fn update_card(&self, ctx: &RequestContext, request: UpdateCardRequest)
        -> Result<(), Status>;

    async fn update_many_cards(
        &self,
        ctx: &RequestContext,
        request: UpdateManyCardsRequest,
    ) -> Result<(), Status>;

    async fn delete_card(&self, ctx: &RequestContext, request: DeleteCardRequest)
        -> Result<(), Status>;

    async fn get_cards(
        &self,
        ctx: &RequestContext,
        request: CardsRequest,
    ) -> Result<CardsResponse, Status>;
}

#[derive(Clone, Debug)]
pub struct CardClient {
    client: CardServiceClient<Channel>,
}

impl CardClient {
    pub fn new(config: &ClientConfig) -> Result<Self, AppError> {
        Ok(Self::from_channel(config.channel()?))
    }

    pub fn from_channel(channel: Channel) -> Self {
        Self {
            client: CardServiceClient::new(channel),
        }
    }
}

#[async_trait]
impl CardApi for CardClient {
    async fn create_card(
        &self,
        ctx: &RequestContext,
        request: CreateCardRequest,
    ) -> Result<(), Status> {
        self.client
            .clone()
            .create_card(outgoing_request(ctx, request))
            .await?;
        Ok(())
    }

    async fn update_card(
        &self,
        ctx: &RequestContext,
        request: UpdateCardRequest,
    ) -> Result<(), Status> {
        self.client
            .clone()
            .update_card(outgoing_request(ctx, request))
            .await?;
        Ok(())
    }

    async fn update_many_cards(
        &self,
        ctx: &RequestContext,
        request: UpdateManyCardsRequest,
    ) -> Result<(), Status> {
        self.client
            .clone()
            .update_many_cards(outgoing_request(ctx, request))
            .await?;
        Ok(())
    }

    async fn delete_card(
        &self,
        ctx: &RequestContext,
        request: DeleteCardRequest,
    ) -> Result<(), Status> {
        self.client
            .clone()
            .delete_card(outgoing_request(ctx, request))
            .await?;
        Ok(())
    }

    async fn get_cards(
        &self,
        ctx: &RequestContext,
        request: CardsRequest,
    ) -> Result<CardsResponse, Status> {
        self.client
            .clone()
            .get_cards(outgoing_request(ctx, request))
            .await
            .map(Response::into_inner)
    }
}
