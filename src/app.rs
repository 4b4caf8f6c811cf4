use std::sync::Arc;
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, FromRef};
use axum::http::{header, HeaderValue, Method};
use axum::routing::{delete, get, post, put};
use axum::Router;
use serde::de::DeserializeOwned;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::clubs::filtered_clubs_handler;
use crate::api::crud::{add_handler, delete_handler, detail_handler, edit_handler, list_handler};
use crate::api::quotes::add_quote_handler;
use crate::api::upload::upload_asset_handler;
use crate::auth::handlers::{check_auth_handler, login_handler, logout_handler, register_handler};
use crate::auth::middleware::require_admin;
use crate::auth::token::TokenService;
use crate::config::AppConfig;
use crate::db::catalog::{Chef, ChefPatch, Club, ClubPatch, NewChef, NewClub, NewRecipe, Recipe, RecipePatch};
use crate::db::memory::InMemoryRepository;
use crate::db::models::{Draft, NewService, Patch, QuoteRequest, Service, ServicePatch, User};
use crate::db::repository::{MongoRepository, Repository, UserRepository};
use crate::error::AppError;
use crate::mail::mailer::{Notifier, SmtpMailer};
use crate::storage::asset_host::{AssetHost, HttpAssetHost};

/// Shared application state: collaborator handles injected at startup.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<dyn Repository<Service>>,
    pub quotes: Arc<dyn Repository<QuoteRequest>>,
    pub clubs: Arc<dyn Repository<Club>>,
    pub chefs: Arc<dyn Repository<Chef>>,
    pub recipes: Arc<dyn Repository<Recipe>>,
    pub users: Arc<dyn UserRepository>,
    /// `None` when no asset host is configured; uploads then fail with 500.
    pub asset_host: Option<Arc<dyn AssetHost>>,
    /// `None` when SMTP is not configured; quote notifications are skipped.
    pub notifier: Option<Notifier>,
    pub tokens: TokenService,
    pub config: Arc<AppConfig>,
}

macro_rules! repo_from_ref {
    ($entity:ty, $field:ident) => {
        impl FromRef<AppState> for Arc<dyn Repository<$entity>> {
            fn from_ref(state: &AppState) -> Self {
                state.$field.clone()
            }
        }
    };
}

repo_from_ref!(Service, services);
repo_from_ref!(QuoteRequest, quotes);
repo_from_ref!(Club, clubs);
repo_from_ref!(Chef, chefs);
repo_from_ref!(Recipe, recipes);

impl AppState {
    /// State backed by MongoDB.
    pub async fn connect(config: AppConfig) -> Result<Self, AppError> {
        let client = mongodb::Client::with_uri_str(&config.mongodb_uri).await?;
        let db = client.database(&config.mongodb_database);

        let users = MongoRepository::<User>::new(&db);
        users.ensure_indexes().await?;

        tracing::info!(database = %config.mongodb_database, "Connected to MongoDB");

        Ok(Self {
            services: Arc::new(MongoRepository::<Service>::new(&db)),
            quotes: Arc::new(MongoRepository::<QuoteRequest>::new(&db)),
            clubs: Arc::new(MongoRepository::<Club>::new(&db)),
            chefs: Arc::new(MongoRepository::<Chef>::new(&db)),
            recipes: Arc::new(MongoRepository::<Recipe>::new(&db)),
            users: Arc::new(users),
            asset_host: asset_host_from_config(&config)?,
            notifier: notifier_from_config(&config)?,
            tokens: TokenService::new(&config.jwt_secret, config.token_ttl_minutes),
            config: Arc::new(config),
        })
    }

    /// State backed by process memory. Nothing survives a restart.
    pub fn in_memory(config: AppConfig) -> Result<Self, AppError> {
        Ok(Self {
            services: Arc::new(InMemoryRepository::<Service>::new()),
            quotes: Arc::new(InMemoryRepository::<QuoteRequest>::new()),
            clubs: Arc::new(InMemoryRepository::<Club>::new()),
            chefs: Arc::new(InMemoryRepository::<Chef>::new()),
            recipes: Arc::new(InMemoryRepository::<Recipe>::new()),
            users: Arc::new(InMemoryRepository::<User>::new()),
            asset_host: asset_host_from_config(&config)?,
            notifier: notifier_from_config(&config)?,
            tokens: TokenService::new(&config.jwt_secret, config.token_ttl_minutes),
            config: Arc::new(config),
        })
    }
}

fn asset_host_from_config(config: &AppConfig) -> Result<Option<Arc<dyn AssetHost>>, AppError> {
    match (
        &config.asset_upload_url,
        &config.asset_api_key,
        &config.asset_api_secret,
    ) {
        (Some(url), Some(key), Some(secret)) => {
            let host = HttpAssetHost::new(
                url,
                key.clone(),
                secret.clone(),
                config.asset_folder.clone(),
                Duration::from_secs(config.asset_timeout_secs),
            )?;
            Ok(Some(Arc::new(host)))
        }
        _ => {
            tracing::warn!("Asset host not configured; uploads are disabled");
            Ok(None)
        }
    }
}

fn notifier_from_config(config: &AppConfig) -> Result<Option<Notifier>, AppError> {
    if !config.mail_enabled() {
        tracing::warn!("SMTP not configured; quote notifications are disabled");
        return Ok(None);
    }
    let (Some(host), Some(from), Some(admin)) =
        (&config.smtp_host, &config.from_email, &config.admin_email)
    else {
        return Ok(None);
    };

    let mailer = SmtpMailer::new(
        host,
        config.smtp_port,
        config.smtp_user.clone(),
        config.smtp_pass.clone(),
    )?;
    Ok(Some(Notifier {
        mailer: Arc::new(mailer),
        from: from.clone(),
        admin: admin.clone(),
    }))
}

/// Admin CRUD routes for one resource under `prefix` (e.g. `/services`).
fn crud_routes<D, P>(prefix: &str) -> Router<AppState>
where
    D: Draft + DeserializeOwned + 'static,
    P: Patch<Entity = D::Entity> + DeserializeOwned + 'static,
    Arc<dyn Repository<D::Entity>>: FromRef<AppState>,
{
    Router::new()
        .route(&format!("{prefix}/upload-image"), post(upload_asset_handler))
        .route(&format!("{prefix}/add"), post(add_handler::<D>))
        .route(&format!("{prefix}/get"), get(list_handler::<D::Entity>))
        .route(&format!("{prefix}/edit/{{id}}"), put(edit_handler::<P>))
        .route(
            &format!("{prefix}/delete/{{id}}"),
            delete(delete_handler::<D::Entity>),
        )
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let Some(origin) = &config.client_base_url else {
        return CorsLayer::new();
    };
    match origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                header::CACHE_CONTROL,
                header::EXPIRES,
                header::PRAGMA,
            ]),
        Err(e) => {
            tracing::warn!("Ignoring invalid CLIENT_BASE_URL '{}': {}", origin, e);
            CorsLayer::new()
        }
    }
}

/// Build the full API router.
pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .merge(crud_routes::<NewService, ServicePatch>("/services"))
        .merge(crud_routes::<NewClub, ClubPatch>("/clubs"))
        .merge(crud_routes::<NewChef, ChefPatch>("/chefs"))
        .merge(crud_routes::<NewRecipe, RecipePatch>("/recipes"))
        .route("/quotes/get", get(list_handler::<QuoteRequest>))
        .route("/quotes/get/{id}", get(detail_handler::<QuoteRequest>))
        .route("/quotes/delete/{id}", delete(delete_handler::<QuoteRequest>))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ));

    let shop = Router::new()
        .route("/services/get", get(list_handler::<Service>))
        .route("/services/get/{id}", get(detail_handler::<Service>))
        .route("/clubs/get", get(filtered_clubs_handler))
        .route("/clubs/get/{id}", get(detail_handler::<Club>))
        .route("/chefs/get", get(list_handler::<Chef>))
        .route("/chefs/get/{id}", get(detail_handler::<Chef>))
        .route("/recipes/get", get(list_handler::<Recipe>))
        .route("/recipes/get/{id}", get(detail_handler::<Recipe>))
        .route("/quotes/add", post(add_quote_handler));

    let auth = Router::new()
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/logout", post(logout_handler))
        .route("/check-auth", get(check_auth_handler));

    let cors = cors_layer(&state.config);
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .nest("/api/admin", admin)
        .nest("/api/shop", shop)
        .nest("/api/auth", auth)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
