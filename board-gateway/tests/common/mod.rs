#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use board_gateway::auth::{Claims, IdentityExtractor, JwtVerifier};
use board_gateway::config::{AuthSettings, TokenAlgorithm};
use board_gateway::startup::{build_router, AppState, Clients};
use gateway_core::context::RequestContext;
use gateway_core::grpc::proto::{DeleteRefRequest, Granted, IsGrantedRequest, SaveSubRequest};
use gateway_core::grpc::proto::{
    boards_response, BoardsRequest, BoardsResponse, CreateBoardRequest, DeleteBoardRequest,
    UpdateBoardRequest,
};
use gateway_core::grpc::proto::{
    cards_response, CardsRequest, CardsResponse, CreateCardRequest, DeleteCardRequest,
    UpdateCardRequest, UpdateManyCardsRequest,
};
use gateway_core::grpc::proto::{
    categories_response, CategoriesRequest, CategoriesResponse, CreateCategoryRequest,
    DeleteCategoryRequest, UpdateCategoryRequest, UpdateManyCategoriesRequest,
};
use gateway_core::grpc::proto::{
    tags_response, CreateTagRequest, DeleteTagRequest, TagsRequest, TagsResponse,
    UpdateTagRequest,
};
use gateway_core::grpc::proto::{UpdateUserRequest, UserResponse, UsersRequest, UsersResponse};
use gateway_core::grpc::{
    BoardApi, CardApi, CategoryApi, CheckerApi, Status, SubjectApi, TagApi, UserApi,
};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use secrecy::Secret;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// In-memory stand-in for every downstream service. Reads come from the
/// seeded tables, writes are recorded by method name in call order.
#[derive(Default)]
pub struct FakeServices {
    grant_all: AtomicBool,
    checker_unavailable: AtomicBool,
    grants: Mutex<HashSet<(String, String)>>,
    denials: Mutex<HashSet<(String, String)>>,
    checks: Mutex<Vec<Vec<String>>>,
    writes: Mutex<Vec<String>>,
    write_failure: Mutex<Option<Status>>,
    boards: Mutex<Vec<boards_response::Board>>,
    cards: Mutex<Vec<cards_response::Card>>,
    categories: Mutex<Vec<categories_response::Category>>,
    tags: Mutex<Vec<tags_response::Tag>>,
    users: Mutex<Vec<UserResponse>>,
    sub_requests: Mutex<Vec<SaveSubRequest>>,
    board_updates: Mutex<Vec<UpdateBoardRequest>>,
    card_batches: Mutex<Vec<UpdateManyCardsRequest>>,
}

impl FakeServices {
    pub fn grant_all(&self) {
        self.grant_all.store(true, Ordering::SeqCst);
    }

    /// Grants `action` on the board named by the capability object's `ref`.
    /// An empty board id matches objects without a `ref`.
    pub fn grant(&self, action: &str, board_id: &str) {
        self.grants
            .lock()
            .unwrap()
            .insert((action.to_string(), board_id.to_string()));
    }

    /// Denial that wins over `grant_all`.
    pub fn deny(&self, action: &str, board_id: &str) {
        self.denials
            .lock()
            .unwrap()
            .insert((action.to_string(), board_id.to_string()));
    }

    pub fn make_checker_unavailable(&self) {
        self.checker_unavailable.store(true, Ordering::SeqCst);
    }

    pub fn fail_writes_with(&self, status: Status) {
        *self.write_failure.lock().unwrap() = Some(status);
    }

    pub fn checks(&self) -> Vec<Vec<String>> {
        self.checks.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn sub_requests(&self) -> Vec<SaveSubRequest> {
        self.sub_requests.lock().unwrap().clone()
    }

    pub fn board_updates(&self) -> Vec<UpdateBoardRequest> {
        self.board_updates.lock().unwrap().clone()
    }

    pub fn card_batches(&self) -> Vec<UpdateManyCardsRequest> {
        self.card_batches.lock().unwrap().clone()
    }

    pub fn add_user(&self, user_id: &str, name: &str, email: &str) {
        self.users.lock().unwrap().push(UserResponse {
            user_id: user_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: None,
        });
    }

    /// Seeding the same id twice makes lookups of it ambiguous.
    pub fn add_board(&self, board_id: &str, owner_id: &str) {
        self.boards.lock().unwrap().push(boards_response::Board {
            board_id: board_id.to_string(),
            owner_id: owner_id.to_string(),
            name: format!("board {}", board_id),
            ..Default::default()
        });
    }

    pub fn add_card(&self, card_id: &str, board_id: &str) {
        self.cards.lock().unwrap().push(cards_response::Card {
            card_id: card_id.to_string(),
            board_id: board_id.to_string(),
            name: format!("card {}", card_id),
            ..Default::default()
        });
    }

    pub fn add_category(&self, category_id: &str, board_id: &str) {
        self.categories
            .lock()
            .unwrap()
            .push(categories_response::Category {
                category_id: category_id.to_string(),
                board_id: board_id.to_string(),
                name: format!("category {}", category_id),
                ..Default::default()
            });
    }

    pub fn add_tag(&self, tag_id: &str, board_id: &str) {
        self.tags.lock().unwrap().push(tags_response::Tag {
            tag_id: tag_id.to_string(),
            board_id: board_id.to_string(),
            name: format!("tag {}", tag_id),
            ..Default::default()
        });
    }

    fn write(&self, method: &str) -> Result<(), Status> {
        if let Some(status) = self.write_failure.lock().unwrap().clone() {
            return Err(status);
        }
        self.writes.lock().unwrap().push(method.to_string());
        Ok(())
    }

    fn is_allowed(&self, action: &str, board_id: &str) -> bool {
        let key = (action.to_string(), board_id.to_string());
        if self.denials.lock().unwrap().contains(&key) {
            return false;
        }
        self.grant_all.load(Ordering::SeqCst) || self.grants.lock().unwrap().contains(&key)
    }
}

fn select<T: Clone>(rows: &[T], ids: &[String], id_of: impl Fn(&T) -> &str) -> Vec<T> {
    if ids.is_empty() {
        return rows.to_vec();
    }
    rows.iter()
        .filter(|row| ids.iter().any(|id| id == id_of(row)))
        .cloned()
        .collect()
}

#[async_trait]
impl CheckerApi for FakeServices {
    async fn is_granted(
        &self,
        _ctx: &RequestContext,
        request: IsGrantedRequest,
    ) -> Result<Granted, Status> {
        self.checks.lock().unwrap().push(request.params.clone());
        if self.checker_unavailable.load(Ordering::SeqCst) {
            return Err(Status::unavailable("checker down"));
        }

        let object: Value = serde_json::from_str(&request.params[1])
            .map_err(|e| Status::invalid_argument(e.to_string()))?;
        let board_id = object["ref"].as_str().unwrap_or_default();
        Ok(Granted {
            yes: self.is_allowed(&request.params[2], board_id),
        })
    }
}

#[async_trait]
impl SubjectApi for FakeServices {
    async fn save_sub(&self, _ctx: &RequestContext, request: SaveSubRequest) -> Result<(), Status> {
        self.write("SaveSub")?;
        self.sub_requests.lock().unwrap().push(request);
        Ok(())
    }

    async fn delete_ref(
        &self,
        _ctx: &RequestContext,
        _request: DeleteRefRequest,
    ) -> Result<(), Status> {
        self.write("DeleteRef")
    }
}

#[async_trait]
impl UserApi for FakeServices {
    async fn update_user(
        &self,
        _ctx: &RequestContext,
        _request: UpdateUserRequest,
    ) -> Result<(), Status> {
        self.write("UpdateUser")
    }

    async fn get_users(
        &self,
        _ctx: &RequestContext,
        request: UsersRequest,
    ) -> Result<UsersResponse, Status> {
        let users = select(&self.users.lock().unwrap(), &request.user_ids, |u| u.user_id.as_str());
        Ok(UsersResponse {
            total: users.len() as u64,
            users,
        })
    }
}

#[async_trait]
impl BoardApi for FakeServices {
    async fn create_board(
        &self,
        _ctx: &RequestContext,
        _request: CreateBoardRequest,
    ) -> Result<(), Status> {
        self.write("CreateBoard")
    }

    async fn update_board(
        &self,
        _ctx: &RequestContext,
        request: UpdateBoardRequest,
    ) -> Result<(), Status> {
        self.write("UpdateBoard")?;
        self.board_updates.lock().unwrap().push(request);
        Ok(())
    }

    async fn delete_board(
        &self,
        _ctx: &RequestContext,
        _request: DeleteBoardRequest,
    ) -> Result<(), Status> {
        self.write("DeleteBoard")
    }

    async fn get_boards(
        &self,
        _ctx: &RequestContext,
        request: BoardsRequest,
    ) -> Result<BoardsResponse, Status> {
        let boards = select(&self.boards.lock().unwrap(), &request.board_ids, |b| {
            b.board_id.as_str()
        });
        Ok(BoardsResponse {
            total: boards.len() as u64,
            boards,
        })
    }
}

#[async_trait]
impl CardApi for FakeServices {
    async fn create_card(
        &self,
        _ctx: &RequestContext,
        _request: CreateCardRequest,
    ) -> Result<(), Status> {
        self.write("CreateCard")
    }

    async fn update_card(
        &self,
        _ctx: &RequestContext,
        _request: UpdateCardRequest,
    ) -> Result<(), Status> {
        self.write("UpdateCard")
    }

    async fn update_many_cards(
        &self,
        _ctx: &RequestContext,
        request: UpdateManyCardsRequest,
    ) -> Result<(), Status> {
        self.write("UpdateManyCards")?;
        self.card_batches.lock().unwrap().push(request);
        Ok(())
    }

    async fn delete_card(
        &self,
        _ctx: &RequestContext,
        _request: DeleteCardRequest,
    ) -> Result<(), Status> {
        self.write("DeleteCard")
    }

    async fn get_cards(
        &self,
        _ctx: &RequestContext,
        request: CardsRequest,
    ) -> Result<CardsResponse, Status> {
        let cards = select(&self.cards.lock().unwrap(), &request.card_ids, |c| c.card_id.as_str());
        Ok(CardsResponse {
            total: cards.len() as u64,
            cards,
        })
    }
}

#[async_trait]
impl CategoryApi for FakeServices {
    async fn create_category(
        &self,
        _ctx: &RequestContext,
        _request: CreateCategoryRequest,
    ) -> Result<(), Status> {
        self.write("CreateCategory")
    }

    async fn update_category(
        &self,
        _ctx: &RequestContext,
        _request: UpdateCategoryRequest,
    ) -> Result<(), Status> {
        self.write("UpdateCategory")
    }

    async fn update_many_categories(
        &self,
        _ctx: &RequestContext,
        _request: UpdateManyCategoriesRequest,
    ) -> Result<(), Status> {
        self.write("UpdateManyCategories")
    }

    async fn delete_category(
        &self,
        _ctx: &RequestContext,
        _request: DeleteCategoryRequest,
    ) -> Result<(), Status> {
        self.write("DeleteCategory")
    }

    async fn get_categories(
        &self,
        _ctx: &RequestContext,
        request: CategoriesRequest,
    ) -> Result<CategoriesResponse, Status> {
        let categories = select(
            &self.categories.lock().unwrap(),
            &request.category_ids,
            |c| c.category_id.as_str(),
        );
        Ok(CategoriesResponse {
            total: categories.len() as u64,
            categories,
        })
    }
}

#[async_trait]
impl TagApi for FakeServices {
    async fn create_tag(
        &self,
        _ctx: &RequestContext,
        _request: CreateTagRequest,
    ) -> Result<(), Status> {
        self.write("CreateTag")
    }

    async fn update_tag(
        &self,
        _ctx: &RequestContext,
        _request: UpdateTagRequest,
    ) -> Result<(), Status> {
        self.write("UpdateTag")
    }

    async fn delete_tag(
        &self,
        _ctx: &RequestContext,
        _request: DeleteTagRequest,
    ) -> Result<(), Status> {
        self.write("DeleteTag")
    }

    async fn get_tags(
        &self,
        _ctx: &RequestContext,
        request: TagsRequest,
    ) -> Result<TagsResponse, Status> {
        let tags = select(&self.tags.lock().unwrap(), &request.tag_ids, |t| t.tag_id.as_str());
        Ok(TagsResponse {
            total: tags.len() as u64,
            tags,
        })
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Value,
}

pub struct TestApp {
    pub router: Router,
    pub services: Arc<FakeServices>,
    pub user_id: String,
}

impl TestApp {
    pub fn spawn() -> Self {
        let services = Arc::new(FakeServices::default());
        let clients = Clients {
            checker: services.clone(),
            subjects: services.clone(),
            users: services.clone(),
            boards: services.clone(),
            cards: services.clone(),
            categories: services.clone(),
            tags: services.clone(),
        };

        let verifier = JwtVerifier::new(&auth_settings()).expect("Failed to build verifier");
        let identity = IdentityExtractor::new(Arc::new(verifier), "Bearer", Duration::from_secs(5));

        TestApp {
            router: build_router(AppState::new(clients, identity)),
            services,
            user_id: new_id(),
        }
    }

    pub fn token(&self) -> String {
        sign(&self.user_id, 600)
    }

    pub async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let authorization = format!("Bearer {}", self.token());
        self.call_with_authorization(method, uri, Some(&authorization), body)
            .await
    }

    pub async fn call_with_authorization(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(authorization) = authorization {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            location,
            body,
        }
    }
}

pub fn auth_settings() -> AuthSettings {
    AuthSettings {
        scheme: "Bearer".to_string(),
        algorithm: TokenAlgorithm::HS256,
        secret: Some(Secret::new(TEST_SECRET.to_string())),
        public_key_path: None,
        issuer: None,
        audience: None,
        leeway_secs: 0,
    }
}

/// HS256 token for `sub`, expiring `exp_offset` seconds from now.
pub fn sign(sub: &str, exp_offset: i64) -> String {
    let claims = Claims {
        sub: sub.to_string(),
        name: "Test User".to_string(),
        email: "test@example.com".to_string(),
        exp: chrono::Utc::now().timestamp() + exp_offset,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("Failed to sign token")
}
