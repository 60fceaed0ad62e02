//! solvehub-api - HTTP API server for SolveHub

mod config;
mod handlers;

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        FromRequestParts, State,
    },
    http::{header, request::Parts, HeaderValue, Method, StatusCode},
    response::{
        sse::{Event, KeepAlive},
        IntoResponse, Sse,
    },
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use governor::{Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::{Config, SwaggerUi};
use uuid::Uuid;

use solvehub_core::{NotificationBus, NotificationDispatcher, TokenSigner, User, UserRepository};
use solvehub_db::{Database, FilesystemBackend, HttpObjectStorage, StorageBackend};

use config::{AppConfig, MAX_UPLOAD_BYTES, MAX_UPLOAD_FILES};
use handlers::{
    answers::{create_answer, delete_answer, list_answers, vote_answer},
    attachments::{
        delete_attachment, download_attachment, upload_answer_attachments,
        upload_exercise_attachments,
    },
    auth::{login, me, register},
    exercises::{
        create_exercise, delete_exercise, get_exercise, list_exercises, set_completed, set_saved,
        vote_exercise,
    },
    notifications::{
        list_notifications, mark_all_read, set_notification_read, set_notification_unread,
        unread_count,
    },
    reports::{create_report, list_reports, resolve_report, set_user_active},
    subjects::{create_subject, get_subject, list_subjects, list_tags},
    users::{
        get_preferences, get_profile, list_completed, list_saved, public_profile, put_preferences,
        update_profile,
    },
};

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

/// Global rate limiter type (direct quota, no keyed bucketing).
type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers.
///
/// Everything here is passed explicitly; there is no process-wide mutable
/// state. In particular, the notification dispatcher carries its own
/// channel-publisher capability.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub signer: TokenSigner,
    pub config: Arc<AppConfig>,
    pub dispatcher: NotificationDispatcher,
    pub bus: NotificationBus,
    pub storage: Arc<dyn StorageBackend>,
    /// Global rate limiter (None if rate limiting is disabled).
    rate_limiter: Option<Arc<GlobalRateLimiter>>,
    /// Active WebSocket connection count.
    ws_connections: Arc<AtomicUsize>,
}

/// OpenAPI documentation (utoipa metadata, used for Swagger UI configuration).
///
/// The comprehensive OpenAPI spec is maintained in `openapi.yaml` and served
/// at `/openapi.yaml`. Swagger UI at `/docs` fetches from that endpoint.
#[allow(dead_code)]
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SolveHub API",
        version = "0.4.0",
        description = "Q&A platform for exercises: post, answer, vote, and get notified"
    ),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Exercises", description = "Exercise CRUD and votes"),
        (name = "Answers", description = "Answers, replies, and votes"),
        (name = "Subjects", description = "Canonical subjects and tags"),
        (name = "Notifications", description = "Notification feed and read state"),
        (name = "Reports", description = "Moderation reports"),
        (name = "System", description = "Health checks and realtime endpoints")
    )
)]
struct ApiDoc;

// =============================================================================
// STANDARD RESPONSE TYPES
// =============================================================================

/// Standardized pagination metadata for list responses.
#[derive(Serialize, Deserialize, Debug)]
pub struct PaginationMeta {
    /// Total number of items matching the query (across all pages)
    pub total: usize,
    /// Maximum number of items per page (request parameter)
    pub limit: usize,
    /// Number of items skipped (request parameter)
    pub offset: usize,
    /// True if more items are available after this page
    pub has_more: bool,
}

/// Standardized list response wrapper with pagination metadata.
#[derive(Serialize, Deserialize, Debug)]
pub struct ListResponse<T> {
    /// The list of items for the current page
    pub data: Vec<T>,
    /// Pagination metadata
    pub pagination: PaginationMeta,
}

impl<T: Serialize> ListResponse<T> {
    /// Create a new paginated list response.
    pub fn new(data: Vec<T>, total: usize, limit: usize, offset: usize) -> Self {
        let has_more = offset + data.len() < total;
        Self {
            data,
            pagination: PaginationMeta {
                total,
                limit,
                offset,
                has_more,
            },
        }
    }
}

/// Serve OpenAPI YAML spec
async fn openapi_yaml() -> impl IntoResponse {
    const SPEC: &str = include_str!("openapi.yaml");
    ([(header::CONTENT_TYPE, "application/yaml")], SPEC)
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

pub enum ApiError {
    Database(solvehub_core::Error),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
}

impl From<solvehub_core::Error> for ApiError {
    fn from(err: solvehub_core::Error) -> Self {
        use solvehub_core::Error;
        match &err {
            Error::NotFound(msg) => ApiError::NotFound(msg.clone()),
            Error::ExerciseNotFound(id) => {
                ApiError::NotFound(format!("Exercise {} not found", id))
            }
            Error::AnswerNotFound(id) => ApiError::NotFound(format!("Answer {} not found", id)),
            Error::UserNotFound(who) => ApiError::NotFound(format!("User {} not found", who)),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg.clone()),
            Error::Forbidden(msg) => ApiError::Forbidden(msg.clone()),
            Error::Database(sqlx_err) => {
                let msg = sqlx_err.to_string();
                if msg.contains("duplicate key") || msg.contains("unique constraint") {
                    // Friendly messages for known constraints.
                    let friendly_msg = if msg.contains("idx_unique_username") {
                        "A user with this username already exists".to_string()
                    } else if msg.contains("idx_unique_email") {
                        "A user with this email already exists".to_string()
                    } else if msg.contains("idx_unique_subject_name")
                        || msg.contains("idx_unique_subject_slug")
                    {
                        "A subject with this name already exists".to_string()
                    } else {
                        msg
                    };
                    return ApiError::Conflict(friendly_msg);
                }
                if msg.contains("foreign key") {
                    return ApiError::BadRequest(msg);
                }
                ApiError::Database(err)
            }
            _ => ApiError::Database(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Database(err) => {
                tracing::error!(subsystem = "api", error = %err, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

// =============================================================================
// AUTH EXTRACTORS
// =============================================================================

/// Extract the bearer token from the Authorization header, falling back to
/// the `token` query parameter (WebSocket and EventSource clients cannot set
/// headers).
fn bearer_token(parts: &Parts) -> Option<String> {
    if let Some(header) = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        if let Some(token) = header.strip_prefix("Bearer ") {
            return Some(token.trim().to_string());
        }
    }
    let query = parts.uri.query()?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == "token").then(|| value.to_string())
    })
}

/// Optional-auth extractor: attaches the user when a valid token is present,
/// but does not reject its absence.
pub struct Auth {
    pub user: Option<User>,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(Auth { user: None });
        };
        let Ok(claims) = state.signer.verify(&token) else {
            return Ok(Auth { user: None });
        };
        let user = state
            .db
            .users
            .fetch(claims.user_id)
            .await?
            .filter(|user| user.is_active);
        Ok(Auth { user })
    }
}

/// Extractor that requires a valid token for an active user.
pub struct RequireAuth {
    pub user: User,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;
        let claims = state.signer.verify(&token)?;
        let user = state
            .db
            .users
            .fetch(claims.user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| ApiError::Unauthorized("Account not found or inactive".to_string()))?;
        Ok(RequireAuth { user })
    }
}

/// Extractor that additionally requires the admin role.
pub struct RequireAdmin {
    pub user: User,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = RequireAuth::from_request_parts(parts, state).await?;
        if !auth.user.role.is_admin() {
            return Err(ApiError::Forbidden("Admin role required".to_string()));
        }
        Ok(RequireAdmin { user: auth.user })
    }
}

// =============================================================================
// MIDDLEWARE
// =============================================================================

async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!("Rate limit exceeded");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "error": "rate_limit_exceeded",
                    "error_description": "Too many requests. Please wait before retrying."
                })),
            ));
        }
    }
    Ok(next.run(request).await)
}

// =============================================================================
// HEALTH CHECK
// =============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// =============================================================================
// REALTIME: WEBSOCKET AND SSE
// =============================================================================

async fn ws_handler(
    ws: WebSocketUpgrade,
    auth: RequireAuth,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let user_id = auth.user.id;
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state, user_id))
}

/// Forward this user's notification events over one WebSocket connection.
///
/// The bus is a global broadcast; the per-user room is the filter below.
async fn handle_ws_connection(socket: WebSocket, state: AppState, user_id: Uuid) {
    use futures::{SinkExt, StreamExt};

    let count = state.ws_connections.fetch_add(1, Ordering::Relaxed) + 1;
    tracing::info!(active = count, user_id = %user_id, "WebSocket connection opened");

    let (mut sender, mut receiver) = socket.split();
    let mut event_rx = state.bus.subscribe();

    let send_task = tokio::spawn(async move {
        let mut ping_interval = tokio::time::interval(std::time::Duration::from_secs(30));
        loop {
            tokio::select! {
                event = event_rx.recv() => {
                    match event {
                        Ok(evt) if evt.recipient_id == user_id => {
                            if let Ok(json) = serde_json::to_string(&evt) {
                                if sender.send(Message::Text(json)).await.is_err() {
                                    break;
                                }
                            }
                        }
                        Ok(_) => {} // someone else's room
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                            tracing::debug!(missed = n, "WebSocket client lagged");
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = ping_interval.tick() => {
                    if sender.send(Message::Ping(vec![])).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    let recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = send_task => {}
        _ = recv_task => {}
    }
    let count = state.ws_connections.fetch_sub(1, Ordering::Relaxed) - 1;
    tracing::info!(active = count, user_id = %user_id, "WebSocket connection closed");
}

async fn sse_events(
    auth: RequireAuth,
    State(state): State<AppState>,
) -> Sse<impl futures::Stream<Item = Result<Event, std::convert::Infallible>>> {
    let user_id = auth.user.id;
    let rx = state.bus.subscribe();

    use tokio_stream::StreamExt as _;
    let stream = tokio_stream::wrappers::BroadcastStream::new(rx).filter_map(move |result| {
        match result {
            Ok(event) if event.recipient_id == user_id => {
                match serde_json::to_string(&event.payload) {
                    Ok(json) => Some(Ok(Event::default().event(event.event_type).data(json))),
                    Err(_) => None,
                }
            }
            _ => None, // other rooms, lagged, closed
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(std::time::Duration::from_secs(15))
            .text("keepalive"),
    )
}

// =============================================================================
// STARTUP
// =============================================================================

fn parse_allowed_origins(config: &AppConfig) -> Vec<HeaderValue> {
    config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect()
}

fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   RUST_LOG    - standard env filter
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "solvehub_api=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    let guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("solvehub-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false),
                )
                .init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            registry.with(tracing_subscriber::fmt::layer()).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );
    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = init_logging();

    let config = Arc::new(AppConfig::from_env()?);

    info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;
    info!("Database connected");

    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");

    // Attachment storage: HTTP object storage when an endpoint is
    // configured, local filesystem otherwise.
    let storage: Arc<dyn StorageBackend> = match &config.storage_endpoint {
        Some(endpoint) => {
            info!("Using HTTP object storage at {}", endpoint);
            Arc::new(HttpObjectStorage::new(endpoint.clone()))
        }
        None => {
            let backend =
                FilesystemBackend::new(&config.file_storage_path, &config.public_files_url);
            if let Err(e) = backend.validate().await {
                anyhow::bail!("File storage validation failed: {}", e);
            }
            info!("File storage initialized at {}", config.file_storage_path);
            Arc::new(backend)
        }
    };

    let signer = TokenSigner::new(config.token_secret.as_bytes().to_vec())?;

    // Realtime bus and the dispatcher that feeds it.
    let bus = NotificationBus::new(256);
    let dispatcher = NotificationDispatcher::new(
        Arc::new(db.users.clone()),
        Arc::new(db.preferences.clone()),
        Arc::new(db.notifications.clone()),
        bus.clone(),
    );

    let rate_limiter = if config.rate_limit_enabled {
        let quota =
            Quota::with_period(std::time::Duration::from_secs(config.rate_limit_period_secs))
                .expect("Rate limit period must be non-zero")
                .allow_burst(
                    NonZeroU32::new(config.rate_limit_requests).expect("Rate limit must be non-zero"),
                );
        Some(Arc::new(RateLimiter::direct(quota)))
    } else {
        None
    };
    info!(
        "Rate limiting: {} ({} requests per {} seconds)",
        if config.rate_limit_enabled { "enabled" } else { "disabled" },
        config.rate_limit_requests,
        config.rate_limit_period_secs
    );

    let state = AppState {
        db,
        signer,
        config: config.clone(),
        dispatcher,
        bus,
        storage,
        rate_limiter,
        ws_connections: Arc::new(AtomicUsize::new(0)),
    };

    // Uploads can carry up to MAX_UPLOAD_FILES files of MAX_UPLOAD_BYTES
    // each, plus multipart framing.
    let body_limit = MAX_UPLOAD_FILES * MAX_UPLOAD_BYTES + 1024 * 1024;

    let app = Router::new()
        // Health check
        .route("/health", get(health_check))
        // OpenAPI / Swagger UI
        .merge(
            SwaggerUi::new("/docs").config(
                Config::new(["/openapi.yaml"])
                    .try_it_out_enabled(true)
                    .filter(true),
            ),
        )
        .route("/openapi.yaml", get(openapi_yaml))
        // Auth
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/me", get(me))
        // Users and settings
        .route("/api/v1/users/me", get(get_profile).patch(update_profile))
        .route(
            "/api/v1/users/me/preferences",
            get(get_preferences).put(put_preferences),
        )
        .route("/api/v1/users/me/saved", get(list_saved))
        .route("/api/v1/users/me/completed", get(list_completed))
        .route("/api/v1/users/:username", get(public_profile))
        // Exercises
        .route("/api/v1/exercises", get(list_exercises).post(create_exercise))
        .route(
            "/api/v1/exercises/:id",
            get(get_exercise).delete(delete_exercise),
        )
        .route("/api/v1/exercises/:id/like", post(vote_exercise_like))
        .route("/api/v1/exercises/:id/dislike", post(vote_exercise_dislike))
        .route(
            "/api/v1/exercises/:id/save",
            put(set_saved_on).delete(set_saved_off),
        )
        .route(
            "/api/v1/exercises/:id/complete",
            put(set_completed_on).delete(set_completed_off),
        )
        // Answers
        .route(
            "/api/v1/exercises/:id/answers",
            get(list_answers).post(create_answer),
        )
        .route("/api/v1/answers/:id", delete(delete_answer))
        .route("/api/v1/answers/:id/like", post(vote_answer_like))
        .route("/api/v1/answers/:id/dislike", post(vote_answer_dislike))
        // Attachments
        .route(
            "/api/v1/exercises/:id/attachments",
            post(upload_exercise_attachments),
        )
        .route(
            "/api/v1/answers/:id/attachments",
            post(upload_answer_attachments),
        )
        .route(
            "/api/v1/attachments/:id",
            get(download_attachment).delete(delete_attachment),
        )
        // Subjects and tags
        .route("/api/v1/subjects", get(list_subjects).post(create_subject))
        .route("/api/v1/subjects/:slug", get(get_subject))
        .route("/api/v1/tags", get(list_tags))
        // Notifications
        .route("/api/v1/notifications", get(list_notifications))
        .route("/api/v1/notifications/unread-count", get(unread_count))
        .route("/api/v1/notifications/read-all", post(mark_all_read))
        .route("/api/v1/notifications/:id/read", post(set_notification_read))
        .route(
            "/api/v1/notifications/:id/unread",
            post(set_notification_unread),
        )
        // Reports and moderation
        .route("/api/v1/reports", get(list_reports).post(create_report))
        .route("/api/v1/reports/:id", patch(resolve_report))
        .route("/api/v1/admin/users/:id/active", patch(set_user_active))
        // Realtime
        .route("/api/v1/ws", get(ws_handler))
        .route("/api/v1/events", get(sse_events))
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        // Raise axum's built-in 2 MB cap to the upload budget; the
        // tower-http layer enforces the same bound at the transport level.
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer({
            let allowed_origins = parse_allowed_origins(&config);
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        })
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// Thin wrappers so like/dislike can be distinct routes over one handler.

async fn vote_exercise_like(
    state: State<AppState>,
    auth: RequireAuth,
    path: axum::extract::Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    vote_exercise(state, auth, path, solvehub_core::VoteKind::Like).await
}

async fn vote_exercise_dislike(
    state: State<AppState>,
    auth: RequireAuth,
    path: axum::extract::Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    vote_exercise(state, auth, path, solvehub_core::VoteKind::Dislike).await
}

async fn vote_answer_like(
    state: State<AppState>,
    auth: RequireAuth,
    path: axum::extract::Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    vote_answer(state, auth, path, solvehub_core::VoteKind::Like).await
}

async fn vote_answer_dislike(
    state: State<AppState>,
    auth: RequireAuth,
    path: axum::extract::Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    vote_answer(state, auth, path, solvehub_core::VoteKind::Dislike).await
}

async fn set_saved_on(
    state: State<AppState>,
    auth: RequireAuth,
    path: axum::extract::Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    set_saved(state, auth, path, true).await
}

async fn set_saved_off(
    state: State<AppState>,
    auth: RequireAuth,
    path: axum::extract::Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    set_saved(state, auth, path, false).await
}

async fn set_completed_on(
    state: State<AppState>,
    auth: RequireAuth,
    path: axum::extract::Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    set_completed(state, auth, path, true).await
}

async fn set_completed_off(
    state: State<AppState>,
    auth: RequireAuth,
    path: axum::extract::Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    set_completed(state, auth, path, false).await
}
