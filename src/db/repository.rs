use async_trait::async_trait;

use crate::db::models::{Entity, User};
use crate::error::AppError;

/// Repository trait for one entity collection.
///
/// This trait allows mocking the database layer in tests.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Persist a new record and return it as stored.
    async fn insert(&self, entity: T) -> Result<T, AppError>;

    /// Load the whole collection, unfiltered and unpaginated.
    async fn find_all(&self) -> Result<Vec<T>, AppError>;

    /// Find a record by its identifier.
    async fn find_by_id(&self, id: &str) -> Result<Option<T>, AppError>;

    /// Replace a stored record (matched by id). Returns `false` if it no longer exists.
    async fn replace(&self, entity: &T) -> Result<bool, AppError>;

    /// Delete a record by id. Returns `false` if nothing was deleted.
    async fn delete(&self, id: &str) -> Result<bool, AppError>;
}

/// Lookups on the `users` collection beyond plain CRUD.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn insert_user(&self, user: User) -> Result<User, AppError>;
}

/// MongoDB implementation of the Repository.
pub struct MongoRepository<T: Entity> {
    collection: mongodb::Collection<T>,
}

impl<T: Entity> MongoRepository<T> {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection(T::COLLECTION),
        }
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for MongoRepository<T> {
    async fn insert(&self, entity: T) -> Result<T, AppError> {
        self.collection.insert_one(&entity).await?;
        Ok(entity)
    }

    async fn find_all(&self) -> Result<Vec<T>, AppError> {
        use futures::TryStreamExt;
        use mongodb::bson::doc;

        let cursor = self.collection.find(doc! {}).await?;
        let records: Vec<T> = cursor.try_collect().await?;
        Ok(records)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<T>, AppError> {
        use mongodb::bson::doc;

        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn replace(&self, entity: &T) -> Result<bool, AppError> {
        use mongodb::bson::doc;

        let result = self
            .collection
            .replace_one(doc! { "_id": entity.id() }, entity)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        use mongodb::bson::doc;

        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

impl MongoRepository<User> {
    /// Create the unique index on `email`. Idempotent.
    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoRepository<User> {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        use mongodb::bson::doc;

        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    async fn insert_user(&self, user: User) -> Result<User, AppError> {
        match self.collection.insert_one(&user).await {
            Ok(_) => Ok(user),
            Err(e) if is_duplicate_key(&e) => Err(AppError::Conflict(
                "User already exists with the same email".into(),
            )),
            Err(e) => Err(e.into()),
        }
    }
}

/// E11000: a unique index rejected the write.
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};

    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(w)) if w.code == 11000
    )
}
