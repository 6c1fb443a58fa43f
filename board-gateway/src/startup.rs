use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, put},
    Router,
};
use gateway_core::error::AppError;
use gateway_core::grpc::{
    AuthzClient, BoardApi, BoardClient, CardApi, CardClient, CategoryApi, CategoryClient,
    CheckerApi, SubjectApi, TagApi, TagClient, UserApi, UserClient,
};
use gateway_core::middleware::{error_normalizer, metrics_middleware, request_id_middleware};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

use crate::auth::{authenticate, IdentityExtractor, JwtVerifier};
use crate::authz::{
    AuthorizationGate, BoardPermissions, BoardResolver, BulkPermissionCascade, CardLocator,
    CategoryLocator, PermissionResolver, ResourceType, TagLocator,
};
use crate::config::{GatewaySettings, ServicesSettings};
use crate::handlers;

/// Downstream services the gateway talks to.
#[derive(Clone)]
pub struct Clients {
    pub checker: Arc<dyn CheckerApi>,
    pub subjects: Arc<dyn SubjectApi>,
    pub users: Arc<dyn UserApi>,
    pub boards: Arc<dyn BoardApi>,
    pub cards: Arc<dyn CardApi>,
    pub categories: Arc<dyn CategoryApi>,
    pub tags: Arc<dyn TagApi>,
}

impl Clients {
    /// gRPC clients over lazily connected channels.
    pub fn connect(services: &ServicesSettings) -> Result<Self, AppError> {
        let authz = Arc::new(AuthzClient::new(&services.authz)?);
        Ok(Self {
            checker: authz.clone(),
            subjects: authz,
            users: Arc::new(UserClient::new(&services.user)?),
            boards: Arc::new(BoardClient::new(&services.board)?),
            cards: Arc::new(CardClient::new(&services.card)?),
            categories: Arc::new(CategoryClient::new(&services.category)?),
            tags: Arc::new(TagClient::new(&services.tag)?),
        })
    }
}

/// One permission resolver per resource type, each naming its own objects.
#[derive(Clone)]
pub struct Permissions {
    pub user: Arc<dyn PermissionResolver>,
    pub board: Arc<dyn PermissionResolver>,
    pub tag: Arc<dyn PermissionResolver>,
    pub category: Arc<dyn PermissionResolver>,
    pub card: Arc<dyn PermissionResolver>,
}

#[derive(Clone)]
pub struct Cascades {
    pub card: Arc<BulkPermissionCascade>,
    pub category: Arc<BulkPermissionCascade>,
    pub tag: Arc<BulkPermissionCascade>,
}

#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<IdentityExtractor>,
    pub subjects: Arc<dyn SubjectApi>,
    pub users: Arc<dyn UserApi>,
    pub boards: Arc<dyn BoardApi>,
    pub cards: Arc<dyn CardApi>,
    pub categories: Arc<dyn CategoryApi>,
    pub tags: Arc<dyn TagApi>,
    pub board_resolver: BoardResolver,
    pub permissions: Permissions,
    pub cascades: Cascades,
}

impl AppState {
    pub fn new(clients: Clients, identity: IdentityExtractor) -> Self {
        let gate = AuthorizationGate::new(clients.checker.clone());
        let board_resolver = BoardResolver::new(clients.boards.clone());
        let permissions_for = |resource| -> Arc<BoardPermissions> {
            Arc::new(BoardPermissions::new(
                resource,
                board_resolver.clone(),
                gate.clone(),
            ))
        };

        let card_permissions = permissions_for(ResourceType::Card);
        let category_permissions = permissions_for(ResourceType::Category);
        let tag_permissions = permissions_for(ResourceType::Tag);

        let cascades = Cascades {
            card: Arc::new(BulkPermissionCascade::new(
                Arc::new(CardLocator::new(clients.cards.clone())),
                card_permissions.clone(),
            )),
            category: Arc::new(BulkPermissionCascade::new(
                Arc::new(CategoryLocator::new(clients.categories.clone())),
                category_permissions.clone(),
            )),
            tag: Arc::new(BulkPermissionCascade::new(
                Arc::new(TagLocator::new(clients.tags.clone())),
                tag_permissions.clone(),
            )),
        };

        let permissions = Permissions {
            user: permissions_for(ResourceType::User),
            board: permissions_for(ResourceType::Board),
            tag: tag_permissions,
            category: category_permissions,
            card: card_permissions,
        };

        Self {
            identity: Arc::new(identity),
            subjects: clients.subjects,
            users: clients.users,
            boards: clients.boards,
            cards: clients.cards,
            categories: clients.categories,
            tags: clients.tags,
            board_resolver,
            permissions,
            cascades,
        }
    }
}

/// The HTTP surface. Everything under `/api/v1` requires authentication;
/// every error response is rendered by the error normalizer.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/users/me", get(handlers::users::me))
        .route("/users/:user_id", axum::routing::patch(handlers::users::update))
        .route(
            "/boards",
            get(handlers::boards::list).post(handlers::boards::create),
        )
        .route(
            "/boards/:board_id",
            get(handlers::boards::read)
                .patch(handlers::boards::update)
                .delete(handlers::boards::delete),
        )
        .route(
            "/boards/:board_id/members/:member_id",
            put(handlers::members::save)
                .post(handlers::members::save)
                .delete(handlers::members::delete),
        )
        .route(
            "/cards",
            get(handlers::cards::list)
                .post(handlers::cards::create)
                .patch(handlers::cards::update_many),
        )
        .route(
            "/cards/:card_id",
            get(handlers::cards::read)
                .patch(handlers::cards::update)
                .delete(handlers::cards::delete),
        )
        .route(
            "/categories",
            get(handlers::categories::list)
                .post(handlers::categories::create)
                .patch(handlers::categories::update_many),
        )
        .route(
            "/categories/:category_id",
            get(handlers::categories::read)
                .patch(handlers::categories::update)
                .delete(handlers::categories::delete),
        )
        .route(
            "/tags",
            get(handlers::tags::list).post(handlers::tags::create),
        )
        .route(
            "/tags/:tag_id",
            get(handlers::tags::read)
                .patch(handlers::tags::update)
                .delete(handlers::tags::delete),
        )
        .route_layer(from_fn_with_state(state.identity.clone(), authenticate));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::health::metrics_endpoint))
        .nest("/api/v1", api)
        .with_state(state)
        .layer(from_fn(error_normalizer))
        .layer(from_fn(metrics_middleware))
        // Add tracing layer
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    pub async fn build(settings: GatewaySettings) -> Result<Self, AppError> {
        let verifier = JwtVerifier::new(&settings.auth).map_err(|e| {
            tracing::error!("Failed to initialize token verifier: {}", e);
            e
        })?;
        let identity = IdentityExtractor::new(
            Arc::new(verifier),
            settings.auth.scheme.clone(),
            settings.server.request_timeout(),
        );

        let clients = Clients::connect(&settings.services).map_err(|e| {
            tracing::error!("Failed to configure downstream clients: {}", e);
            e
        })?;

        let router = build_router(AppState::new(clients, identity));

        let addr = SocketAddr::from(([0, 0, 0, 0], settings.server.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serves until SIGINT or SIGTERM, then drains in-flight requests.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .into_future()
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
