use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::api::envelope::Envelope;
use crate::auth::handlers::{LoginRequest, RegisterRequest};
use crate::auth::models::AuthenticatedUser;
use crate::catalog::ClubQuery;
use crate::db::catalog::{Chef, ChefPatch, Club, ClubPatch, NewChef, NewClub, NewRecipe, Recipe, RecipePatch};
use crate::db::models::{NewQuoteRequest, NewService, Patch, QuoteRequest, Service, ServicePatch};
use crate::storage::asset_host::UploadedAsset;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Transport(String),

    /// The server answered with `success: false` or an error status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Form input that can't become a request.
    #[error("Invalid input: {0}")]
    Invalid(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Thin JSON client for the REST API. Keeps the session cookie between calls.
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
}

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

impl HttpClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<Envelope<T>, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        match serde_json::from_slice::<Envelope<T>>(&bytes) {
            Ok(envelope) if status.is_success() && envelope.success => Ok(envelope),
            Ok(envelope) => Err(ClientError::Rejected {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| reason(status).to_string()),
            }),
            Err(_) if !status.is_success() => Err(ClientError::Rejected {
                status: status.as_u16(),
                message: reason(status).to_string(),
            }),
            Err(e) => Err(ClientError::Decode(e.to_string())),
        }
    }

    async fn data<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        self.send::<T>(request)
            .await?
            .data
            .ok_or_else(|| ClientError::Decode("response carried no data".into()))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.data(self.http.get(self.url(path))).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.data(self.http.post(self.url(path)).json(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.data(self.http.put(self.url(path)).json(body)).await
    }

    /// Returns the server's confirmation message.
    pub async fn delete(&self, path: &str) -> Result<String, ClientError> {
        let envelope = self
            .send::<serde_json::Value>(self.http.delete(self.url(path)))
            .await?;
        Ok(envelope.message.unwrap_or_default())
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthenticatedUser, ClientError> {
        self.post("/api/auth/register", request).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthenticatedUser, ClientError> {
        let request = LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        };
        self.post("/api/auth/login", &request).await
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.send::<serde_json::Value>(self.http.post(self.url("/api/auth/logout")))
            .await
            .map(|_| ())
    }

    pub async fn check_auth(&self) -> Result<AuthenticatedUser, ClientError> {
        self.get("/api/auth/check-auth").await
    }

    pub async fn submit_quote(&self, quote: &NewQuoteRequest) -> Result<QuoteRequest, ClientError> {
        self.post("/api/shop/quotes/add", quote).await
    }

    /// Upload an image or PDF through `/api/admin/<resource>/upload-image`.
    pub async fn upload(
        &self,
        resource: &str,
        file_name: &str,
        mime: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedAsset, ClientError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|e| ClientError::Invalid(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);
        let path = format!("/api/admin/{resource}/upload-image");
        self.data(self.http.post(self.url(&path)).multipart(form)).await
    }
}

fn reason(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Request failed")
}

/// Read, create and delete actions for one resource, as seen by a store.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    type Item: Clone + Send + Sync + 'static;
    type Draft: Send + 'static;

    async fn fetch_all(&self) -> Result<Vec<Self::Item>, ClientError>;

    async fn fetch_one(&self, id: &str) -> Result<Self::Item, ClientError>;

    async fn create(&self, draft: Self::Draft) -> Result<Self::Item, ClientError>;

    async fn remove(&self, id: &str) -> Result<(), ClientError>;
}

/// Resources that also accept partial updates.
#[async_trait]
pub trait EditableApi: ResourceApi {
    type Patch: Send + 'static;

    async fn update(&self, id: &str, patch: Self::Patch) -> Result<Self::Item, ClientError>;
}

/// A [`ResourceApi`] over HTTP: writes and lists go to `/api/admin/<name>`,
/// details come from `/api/shop/<name>` unless overridden.
pub struct HttpResource<T, D, P = ()> {
    client: HttpClient,
    name: String,
    create_path: String,
    detail_path: String,
    _marker: PhantomData<fn() -> (T, D, P)>,
}

impl<T, D, P> HttpResource<T, D, P> {
    pub fn new(client: HttpClient, name: &str) -> Self {
        Self {
            client,
            name: name.to_string(),
            create_path: format!("/api/admin/{name}/add"),
            detail_path: format!("/api/shop/{name}/get"),
            _marker: PhantomData,
        }
    }

    /// Post new records somewhere other than the admin `add` route.
    pub fn with_create_path(mut self, path: &str) -> Self {
        self.create_path = path.to_string();
        self
    }

    /// Load details from `<path>/<id>` instead of the shop route.
    pub fn with_detail_path(mut self, path: &str) -> Self {
        self.detail_path = path.trim_end_matches('/').to_string();
        self
    }
}

pub type ServicesApi = HttpResource<Service, NewService, ServicePatch>;
pub type ClubsAdminApi = HttpResource<Club, NewClub, ClubPatch>;
pub type ChefsApi = HttpResource<Chef, NewChef, ChefPatch>;
pub type RecipesApi = HttpResource<Recipe, NewRecipe, RecipePatch>;
/// Quote requests have no patch type, so they never get [`EditableApi`].
pub type QuotesApi = HttpResource<QuoteRequest, NewQuoteRequest>;

impl QuotesApi {
    /// Quotes are submitted through the storefront; admins list, read and delete them.
    pub fn quotes(client: HttpClient) -> Self {
        Self::new(client, "quotes")
            .with_create_path("/api/shop/quotes/add")
            .with_detail_path("/api/admin/quotes/get")
    }
}

#[async_trait]
impl<T, D, P> ResourceApi for HttpResource<T, D, P>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
    D: Serialize + Send + Sync + 'static,
    P: 'static,
{
    type Item = T;
    type Draft = D;

    async fn fetch_all(&self) -> Result<Vec<T>, ClientError> {
        self.client
            .get(&format!("/api/admin/{}/get", self.name))
            .await
    }

    async fn fetch_one(&self, id: &str) -> Result<T, ClientError> {
        self.client
            .get(&format!("{}/{}", self.detail_path, id))
            .await
    }

    async fn create(&self, draft: D) -> Result<T, ClientError> {
        self.client.post(&self.create_path, &draft).await
    }

    async fn remove(&self, id: &str) -> Result<(), ClientError> {
        self.client
            .delete(&format!("/api/admin/{}/delete/{}", self.name, id))
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl<T, D, P> EditableApi for HttpResource<T, D, P>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
    D: Serialize + Send + Sync + 'static,
    P: Patch + Serialize + Send + Sync + 'static,
{
    type Patch = P;

    async fn update(&self, id: &str, patch: P) -> Result<T, ClientError> {
        self.client
            .put(&format!("/api/admin/{}/edit/{}", self.name, id), &patch)
            .await
    }
}

/// Storefront club listing with facet filters and sort.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClubsApi: Send + Sync {
    async fn list_clubs(&self, query: &ClubQuery) -> Result<Vec<Club>, ClientError>;
}

#[async_trait]
impl ClubsApi for HttpClient {
    async fn list_clubs(&self, query: &ClubQuery) -> Result<Vec<Club>, ClientError> {
        self.get(&format!("/api/shop/clubs/get?{}", query.to_query_string()))
            .await
    }
}
