use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use gateway_core::context::RequestContext;
use gateway_core::error::AppError;
use gateway_core::grpc::proto::{boards_response, BoardsRequest};
use gateway_core::grpc::proto::CardsRequest;
use gateway_core::grpc::proto::CategoriesRequest;
use gateway_core::grpc::proto::TagsRequest;
use gateway_core::grpc::{BoardApi, CardApi, CategoryApi, TagApi};

use super::ResourceType;

/// Owner and id of a board, all a capability check needs to know about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardEnvelope {
    pub board_id: String,
    pub owner_id: String,
}

impl From<&boards_response::Board> for BoardEnvelope {
    fn from(board: &boards_response::Board) -> Self {
        Self {
            board_id: board.board_id.clone(),
            owner_id: board.owner_id.clone(),
        }
    }
}

/// Takes the only item of a single-id lookup. Zero or several results both
/// mean the resource does not exist.
pub fn exactly_one<T>(mut items: Vec<T>, resource: ResourceType) -> Result<T, AppError> {
    match items.len() {
        1 => Ok(items.remove(0)),
        n => {
            tracing::debug!(resource = %resource, results = n, "expected exactly one result");
            Err(AppError::not_found(resource.as_str()))
        }
    }
}

/// Looks boards up through the board service. Nothing is cached: ownership
/// is re-read for every decision.
#[derive(Clone)]
pub struct BoardResolver {
    boards: Arc<dyn BoardApi>,
}

impl BoardResolver {
    pub fn new(boards: Arc<dyn BoardApi>) -> Self {
        Self { boards }
    }

    /// The full board record for `board_id`.
    pub async fn fetch(
        &self,
        ctx: &RequestContext,
        board_id: &str,
    ) -> Result<boards_response::Board, AppError> {
        tracing::debug!(board_id, "call gRPC /Board/GetBoards");
        let response = self
            .boards
            .get_boards(
                ctx,
                BoardsRequest {
                    page_index: 0,
                    page_size: 1,
                    board_ids: vec![board_id.to_string()],
                    ..Default::default()
                },
            )
            .await
            .map_err(|status| {
                AppError::from(status).context(format!("fetching board {}", board_id))
            })?;

        exactly_one(response.boards, ResourceType::Board)
    }

    pub async fn resolve(&self, ctx: &RequestContext, board_id: &str) -> Result<BoardEnvelope, AppError> {
        self.fetch(ctx, board_id).await.map(|board| BoardEnvelope::from(&board))
    }

    /// Envelopes for every distinct id in one lookup. Fails with NotFound if
    /// any id is missing or returned more than once.
    pub async fn resolve_many(
        &self,
        ctx: &RequestContext,
        board_ids: &[String],
    ) -> Result<HashMap<String, BoardEnvelope>, AppError> {
        let distinct = distinct(board_ids);
        if distinct.is_empty() {
            return Ok(HashMap::new());
        }

        tracing::debug!(boards = distinct.len(), "call gRPC /Board/GetBoards");
        let response = self
            .boards
            .get_boards(
                ctx,
                BoardsRequest {
                    page_index: 0,
                    page_size: page_size_for(distinct.len()),
                    board_ids: distinct.clone(),
                    ..Default::default()
                },
            )
            .await
            .map_err(|status| AppError::from(status).context("resolving boards"))?;

        let mut envelopes = HashMap::with_capacity(distinct.len());
        for board in &response.boards {
            if envelopes
                .insert(board.board_id.clone(), BoardEnvelope::from(board))
                .is_some()
            {
                return Err(AppError::not_found(ResourceType::Board.as_str()));
            }
        }

        if distinct.iter().any(|id| !envelopes.contains_key(id)) {
            return Err(AppError::not_found(ResourceType::Board.as_str()));
        }

        Ok(envelopes)
    }
}

/// A board-owned resource and the board that currently owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLocation {
    pub resource_id: String,
    pub board_id: String,
}

/// Finds the owning board of board-scoped resources in one lookup.
#[async_trait]
pub trait ResourceLocator: Send + Sync {
    fn resource(&self) -> ResourceType;

    /// One location per distinct requested id, in first-seen order. Ids that
    /// do not resolve to exactly one resource fail the whole lookup with
    /// NotFound.
    async fn locate(
        &self,
        ctx: &RequestContext,
        resource_ids: &[String],
    ) -> Result<Vec<ResourceLocation>, AppError>;
}

/// Checks a lookup result against the requested ids and orders it.
fn collect_locations(
    resource: ResourceType,
    requested: &[String],
    found: impl IntoIterator<Item = (String, String)>,
) -> Result<Vec<ResourceLocation>, AppError> {
    let mut by_id: HashMap<String, String> = HashMap::new();
    for (resource_id, board_id) in found {
        if by_id.insert(resource_id, board_id).is_some() {
            return Err(AppError::not_found(resource.as_str()));
        }
    }

    requested
        .iter()
        .map(|id| {
            by_id
                .get(id)
                .map(|board_id| ResourceLocation {
                    resource_id: id.clone(),
                    board_id: board_id.clone(),
                })
                .ok_or_else(|| AppError::not_found(resource.as_str()))
        })
        .collect()
}

fn distinct(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}

fn page_size_for(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

pub struct CardLocator {
    cards: Arc<dyn CardApi>,
}

impl CardLocator {
    pub fn new(cards: Arc<dyn CardApi>) -> Self {
        Self { cards }
    }
}

#[async_trait]
impl ResourceLocator for CardLocator {
    fn resource(&self) -> ResourceType {
        ResourceType::Card
    }

    async fn locate(
        &self,
        ctx: &RequestContext,
        resource_ids: &[String],
    ) -> Result<Vec<ResourceLocation>, AppError> {
        let ids = distinct(resource_ids);
        tracing::debug!(cards = ids.len(), "call gRPC /Card/GetCards");
        let response = self
            .cards
            .get_cards(
                ctx,
                CardsRequest {
                    page_index: 0,
                    page_size: page_size_for(ids.len()),
                    card_ids: ids.clone(),
                    ..Default::default()
                },
            )
            .await
            .map_err(|status| AppError::from(status).context("locating cards"))?;

        collect_locations(
            self.resource(),
            &ids,
            response.cards.into_iter().map(|card| (card.card_id, card.board_id)),
        )
    }
}

pub struct CategoryLocator {
    categories: Arc<dyn CategoryApi>,
}

impl CategoryLocator {
    pub fn new(categories: Arc<dyn CategoryApi>) -> Self {
        Self { categories }
    }
}

#[async_trait]
impl ResourceLocator for CategoryLocator {
    fn resource(&self) -> ResourceType {
        ResourceType::Category
    }

    async fn locate(
        &self,
        ctx: &RequestContext,
        resource_ids: &[String],
    ) -> Result<Vec<ResourceLocation>, AppError> {
        let ids = distinct(resource_ids);
        tracing::debug!(categories = ids.len(), "call gRPC /Category/GetCategories");
        let response = self
            .categories
            .get_categories(
                ctx,
                CategoriesRequest {
                    page_index: 0,
                    page_size: page_size_for(ids.len()),
                    category_ids: ids.clone(),
                    ..Default::default()
                },
            )
            .await
            .map_err(|status| AppError::from(status).context("locating categories"))?;

        collect_locations(
            self.resource(),
            &ids,
            response
                .categories
                .into_iter()
                .map(|category| (category.category_id, category.board_id)),
        )
    }
}

pub struct TagLocator {
    tags: Arc<dyn TagApi>,
}

impl TagLocator {
    pub fn new(tags: Arc<dyn TagApi>) -> Self {
        Self { tags }
    }
}

#[async_trait]
impl ResourceLocator for TagLocator {
    fn resource(&self) -> ResourceType {
        ResourceType::Tag
    }

    async fn locate(
        &self,
        ctx: &RequestContext,
        resource_ids: &[String],
    ) -> Result<Vec<ResourceLocation>, AppError> {
        let ids = distinct(resource_ids);
        tracing::debug!(tags = ids.len(), "call gRPC /Tag/GetTags");
        let response = self
            .tags
            .get_tags(
                ctx,
                TagsRequest {
                    page_index: 0,
                    page_size: page_size_for(ids.len()),
                    tag_ids: ids.clone(),
                    ..Default::default()
                },
            )
            .await
            .map_err(|status| AppError::from(status).context("locating tags"))?;

        collect_locations(
            self.resource(),
            &ids,
            response.tags.into_iter().map(|tag| (tag.tag_id, tag.board_id)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::context::Identity;
    use gateway_core::error::ErrorRecords;
    use gateway_core::grpc::proto::{
        BoardsResponse, CreateBoardRequest, DeleteBoardRequest, UpdateBoardRequest,
    };
    use gateway_core::grpc::Status;
    use gateway_core::middleware::error::classify;
    use std::time::Duration;

    /// Board service whose lookups always fail with the given status.
    struct FailingBoards(Status);

    #[async_trait]
    impl BoardApi for FailingBoards {
        async fn create_board(
            &self,
            _: &RequestContext,
            _: CreateBoardRequest,
        ) -> Result<(), Status> {
            Ok(())
        }

        async fn update_board(
            &self,
            _: &RequestContext,
            _: UpdateBoardRequest,
        ) -> Result<(), Status> {
            Ok(())
        }

        async fn delete_board(
            &self,
            _: &RequestContext,
            _: DeleteBoardRequest,
        ) -> Result<(), Status> {
            Ok(())
        }

        async fn get_boards(
            &self,
            _: &RequestContext,
            _: BoardsRequest,
        ) -> Result<BoardsResponse, Status> {
            Err(self.0.clone())
        }
    }

    fn ctx() -> RequestContext {
        let identity = Identity {
            user_id: "u-1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        };
        RequestContext::new(identity, "token", "req-1", Duration::from_secs(5))
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn exactly_one_rejects_empty_and_duplicate_results() {
        assert_eq!(exactly_one(vec![7], ResourceType::Card).unwrap(), 7);
        assert!(matches!(
            exactly_one(Vec::<u8>::new(), ResourceType::Card),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            exactly_one(vec![1, 2], ResourceType::Board),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn locations_follow_request_order() {
        let found = vec![
            ("c2".to_string(), "b2".to_string()),
            ("c1".to_string(), "b1".to_string()),
        ];
        let locations = collect_locations(ResourceType::Card, &ids(&["c1", "c2"]), found).unwrap();
        assert_eq!(locations[0].board_id, "b1");
        assert_eq!(locations[1].board_id, "b2");
    }

    #[test]
    fn missing_or_duplicated_ids_are_not_found() {
        let missing = collect_locations(
            ResourceType::Card,
            &ids(&["c1", "c2"]),
            vec![("c1".to_string(), "b1".to_string())],
        );
        assert!(matches!(missing, Err(AppError::NotFound(_))));

        let duplicated = collect_locations(
            ResourceType::Tag,
            &ids(&["t1"]),
            vec![
                ("t1".to_string(), "b1".to_string()),
                ("t1".to_string(), "b2".to_string()),
            ],
        );
        assert!(matches!(duplicated, Err(AppError::NotFound(_))));
    }

    #[test]
    fn distinct_keeps_first_occurrence() {
        assert_eq!(distinct(&ids(&["a", "b", "a", "c", "b"])), ids(&["a", "b", "c"]));
    }

    #[tokio::test]
    async fn downstream_failures_keep_their_status_behind_context() {
        let resolver = BoardResolver::new(Arc::new(FailingBoards(Status::not_found("gone"))));

        let err = resolver.fetch(&ctx(), "b1").await.unwrap_err();
        assert!(matches!(err, AppError::Context { .. }));
        assert_eq!(err.to_string(), "fetching board b1");
        assert_eq!(classify(&ErrorRecords::from(err)).status, 404);
    }

    #[tokio::test]
    async fn unavailable_board_service_is_a_server_error() {
        let resolver = BoardResolver::new(Arc::new(FailingBoards(Status::unavailable("down"))));

        let err = resolver
            .resolve_many(&ctx(), &ids(&["b1", "b2"]))
            .await
            .unwrap_err();
        let api = classify(&ErrorRecords::from(err));
        assert_eq!((api.status, api.code), (500, "server_error"));
    }
}
