use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::auth::models::Role;
use crate::error::AppError;

/// A document persisted in its own MongoDB collection, keyed by a string `_id`.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    /// MongoDB collection name.
    const COLLECTION: &'static str;
    /// Human-readable name used in response messages.
    const LABEL: &'static str;

    fn id(&self) -> &str;
}

/// Create payload for an entity: validates required fields and builds the record.
pub trait Draft: Send {
    type Entity: Entity;

    fn into_entity(self, now: DateTime<Utc>) -> Result<Self::Entity, AppError>;
}

/// Partial update payload: every omitted field keeps its stored value.
pub trait Patch: Send {
    type Entity: Entity;

    fn apply(self, target: &mut Self::Entity, now: DateTime<Utc>);
}

/// Generate a fresh identifier (ObjectId hex, 24 chars).
pub fn new_id() -> String {
    bson::oid::ObjectId::new().to_hex()
}

/// Require a non-blank text field.
pub fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::BadRequest(format!(
            "Missing required field: {field}"
        ))),
    }
}

/// Overwrite `target` unless the new value is absent or empty.
pub fn keep_or_replace(target: &mut String, value: Option<String>) {
    if let Some(v) = value {
        if !v.is_empty() {
            *target = v;
        }
    }
}

/// Overwrite `target` when a value was supplied.
pub fn replace_if_some<T>(target: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *target = v;
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// A catering service offered on the storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(rename = "_id")]
    pub id: String,
    /// Hosted image URL.
    #[serde(default)]
    pub image: String,
    pub title: String,
    pub description: String,
    /// Legacy rich-text body, superseded by `pdf_url`.
    #[serde(default)]
    pub content: String,
    /// Hosted PDF brochure URL.
    #[serde(default)]
    pub pdf_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Service {
    const COLLECTION: &'static str = "services";
    const LABEL: &'static str = "Service";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    pub image: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub pdf_url: Option<String>,
}

impl Draft for NewService {
    type Entity = Service;

    fn into_entity(self, now: DateTime<Utc>) -> Result<Service, AppError> {
        Ok(Service {
            id: new_id(),
            title: required(self.title, "title")?,
            description: required(self.description, "description")?,
            image: self.image.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
            pdf_url: self.pdf_url.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePatch {
    pub image: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub pdf_url: Option<String>,
}

impl Patch for ServicePatch {
    type Entity = Service;

    fn apply(self, target: &mut Service, now: DateTime<Utc>) {
        keep_or_replace(&mut target.image, self.image);
        keep_or_replace(&mut target.title, self.title);
        keep_or_replace(&mut target.description, self.description);
        keep_or_replace(&mut target.content, self.content);
        keep_or_replace(&mut target.pdf_url, self.pdf_url);
        target.updated_at = now;
    }
}

// ---------------------------------------------------------------------------
// QuoteRequest
// ---------------------------------------------------------------------------

/// A visitor's request for a catering quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub service_type: String,
    pub guests: u32,
    #[serde(default)]
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for QuoteRequest {
    const COLLECTION: &'static str = "quoterequests";
    const LABEL: &'static str = "Quote request";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuoteRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub service_type: Option<String>,
    pub guests: Option<u32>,
    pub message: Option<String>,
}

impl Draft for NewQuoteRequest {
    type Entity = QuoteRequest;

    fn into_entity(self, now: DateTime<Utc>) -> Result<QuoteRequest, AppError> {
        let name = required(self.name, "name")?;
        let email = required(self.email, "email")?;
        let service_type = required(self.service_type, "serviceType")?;
        let guests = match self.guests {
            Some(0) => {
                return Err(AppError::BadRequest(
                    "guests must be at least 1".into(),
                ))
            }
            Some(n) => n,
            None => {
                return Err(AppError::BadRequest(
                    "Missing required field: guests".into(),
                ))
            }
        };
        if !email.contains('@') {
            return Err(AppError::BadRequest(format!(
                "Invalid email address '{email}'"
            )));
        }

        Ok(QuoteRequest {
            id: new_id(),
            name,
            email,
            service_type,
            guests,
            message: self.message.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        })
    }
}

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A storefront or admin account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "User";

    fn id(&self) -> &str {
        &self.id
    }
}
