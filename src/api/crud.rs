//! Create/list/detail/edit/delete shared by every catalog resource.
//!
//! The `process_*` functions hold the logic and take the repository directly,
//! so they can be tested without HTTP. The `*_handler` functions are generic
//! axum handlers; each resource instantiates them in the router.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use serde::de::DeserializeOwned;

use crate::api::envelope::{json_body, ApiResult, CreatedResult, Envelope};
use crate::db::models::{Draft, Entity, Patch};
use crate::db::repository::Repository;
use crate::error::AppError;

fn not_found<T: Entity>() -> AppError {
    AppError::NotFound(format!("{} not found", T::LABEL))
}

pub async fn process_add<D: Draft>(
    repo: &dyn Repository<D::Entity>,
    draft: D,
) -> Result<D::Entity, AppError> {
    let entity = draft.into_entity(Utc::now())?;
    let stored = repo.insert(entity).await?;
    tracing::info!(collection = D::Entity::COLLECTION, id = %stored.id(), "created");
    Ok(stored)
}

pub async fn process_list<T: Entity>(repo: &dyn Repository<T>) -> Result<Vec<T>, AppError> {
    repo.find_all().await
}

pub async fn process_get<T: Entity>(repo: &dyn Repository<T>, id: &str) -> Result<T, AppError> {
    repo.find_by_id(id).await?.ok_or_else(not_found::<T>)
}

/// Apply a partial update. Omitted fields keep their stored values.
pub async fn process_edit<P: Patch>(
    repo: &dyn Repository<P::Entity>,
    id: &str,
    patch: P,
) -> Result<P::Entity, AppError> {
    let mut entity = repo
        .find_by_id(id)
        .await?
        .ok_or_else(not_found::<P::Entity>)?;

    patch.apply(&mut entity, Utc::now());

    // Deleted between read and write.
    if !repo.replace(&entity).await? {
        return Err(not_found::<P::Entity>());
    }
    tracing::info!(collection = P::Entity::COLLECTION, %id, "updated");
    Ok(entity)
}

pub async fn process_delete<T: Entity>(repo: &dyn Repository<T>, id: &str) -> Result<(), AppError> {
    if !repo.delete(id).await? {
        return Err(not_found::<T>());
    }
    tracing::info!(collection = T::COLLECTION, %id, "deleted");
    Ok(())
}

/// `POST .../add`
pub async fn add_handler<D>(
    State(repo): State<Arc<dyn Repository<D::Entity>>>,
    body: Result<axum::Json<D>, JsonRejection>,
) -> CreatedResult<D::Entity>
where
    D: Draft + DeserializeOwned,
{
    let created = process_add(repo.as_ref(), json_body(body)?).await?;
    Ok((StatusCode::CREATED, axum::Json(Envelope::data(created))))
}

/// `GET .../get`
pub async fn list_handler<T: Entity>(
    State(repo): State<Arc<dyn Repository<T>>>,
) -> ApiResult<Vec<T>> {
    Ok(axum::Json(Envelope::data(process_list(repo.as_ref()).await?)))
}

/// `GET .../get/{id}`
pub async fn detail_handler<T: Entity>(
    State(repo): State<Arc<dyn Repository<T>>>,
    Path(id): Path<String>,
) -> ApiResult<T> {
    Ok(axum::Json(Envelope::data(process_get(repo.as_ref(), &id).await?)))
}

/// `PUT .../edit/{id}`
pub async fn edit_handler<P>(
    State(repo): State<Arc<dyn Repository<P::Entity>>>,
    Path(id): Path<String>,
    body: Result<axum::Json<P>, JsonRejection>,
) -> ApiResult<P::Entity>
where
    P: Patch + DeserializeOwned,
{
    let updated = process_edit(repo.as_ref(), &id, json_body(body)?).await?;
    Ok(axum::Json(Envelope::data(updated)))
}

/// `DELETE .../delete/{id}`
pub async fn delete_handler<T: Entity>(
    State(repo): State<Arc<dyn Repository<T>>>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    process_delete(repo.as_ref(), &id).await?;
    Ok(axum::Json(Envelope::message(format!(
        "{} deleted successfully",
        T::LABEL
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryRepository;
    use crate::db::models::{NewService, Service, ServicePatch};

    fn draft() -> NewService {
        NewService {
            image: Some("https://cdn.example/a.png".into()),
            title: Some("Private dinner".into()),
            description: Some("Chef at home".into()),
            content: None,
            pdf_url: Some("https://cdn.example/menu.pdf".into()),
        }
    }

    #[tokio::test]
    async fn test_add_then_list() {
        let repo = InMemoryRepository::<Service>::new();
        let created = process_add(&repo, draft()).await.unwrap();

        let all = process_list(&repo).await.unwrap();
        assert_eq!(all, vec![created]);
    }

    #[tokio::test]
    async fn test_add_invalid_persists_nothing() {
        let repo = InMemoryRepository::<Service>::new();
        let mut bad = draft();
        bad.description = None;
        assert!(process_add(&repo, bad).await.is_err());
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn test_edit_partial() {
        let repo = InMemoryRepository::<Service>::new();
        let created = process_add(&repo, draft()).await.unwrap();

        let patch = ServicePatch {
            title: Some("Brunch".into()),
            ..Default::default()
        };
        let updated = process_edit(&repo, &created.id, patch).await.unwrap();

        assert_eq!(updated.title, "Brunch");
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.pdf_url, created.pdf_url);
        assert_eq!(updated.image, created.image);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let stored = process_get(&repo, &created.id).await.unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_edit_unknown_id() {
        let repo = InMemoryRepository::<Service>::new();
        let err = process_edit(&repo, "missing", ServicePatch::default())
            .await
            .unwrap_err();
        match err {
            AppError::NotFound(msg) => assert_eq!(msg, "Service not found"),
            other => panic!("Expected NotFound error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_delete_unknown_leaves_collection() {
        let repo = InMemoryRepository::<Service>::new();
        process_add(&repo, draft()).await.unwrap();

        let err = process_delete(&repo, "64b7f0c2a1b2c3d4e5f60718").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(repo.len(), 1);
    }
}
