use bson::{Document, doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::{Collection, Database, options::ReturnDocument};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DaoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("BSON serialization error: {0}")]
    BsonSer(#[from] bson::ser::Error),
    #[error("BSON deserialization error: {0}")]
    BsonDe(#[from] bson::de::Error),
    #[error("Entity not found")]
    NotFound,
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Validation: {0}")]
    Validation(String),
    #[error("Unexpected inserted id: {0}")]
    InvalidId(String),
}

pub type DaoResult<T> = Result<T, DaoError>;

impl From<validator::ValidationErrors> for DaoError {
    fn from(err: validator::ValidationErrors) -> Self {
        DaoError::Validation(err.to_string())
    }
}

/// Thin typed wrapper over one collection.
pub struct BaseDao<T: Send + Sync> {
    collection: Collection<T>,
}

impl<T> BaseDao<T>
where
    T: Serialize + for<'de> Deserialize<'de> + Unpin + Send + Sync,
{
    pub fn new(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<T>(collection_name),
        }
    }

    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    pub async fn find_by_id(&self, id: ObjectId) -> DaoResult<Option<T>> {
        self.find_one(doc! { "_id": id }).await
    }

    pub async fn find_one(&self, filter: Document) -> DaoResult<Option<T>> {
        Ok(self.collection.find_one(filter).await?)
    }

    pub async fn find_many(
        &self,
        filter: Document,
        sort: Option<Document>,
        limit: Option<i64>,
    ) -> DaoResult<Vec<T>> {
        let mut find = self.collection.find(filter);
        if let Some(sort) = sort {
            find = find.sort(sort);
        }
        if let Some(limit) = limit {
            find = find.limit(limit);
        }

        let cursor = find.await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn insert_one(&self, doc: &T) -> DaoResult<ObjectId> {
        let result = self.collection.insert_one(doc).await.map_err(|e| {
            if let mongodb::error::ErrorKind::Write(mongodb::error::WriteFailure::WriteError(
                ref write_error,
            )) = *e.kind
            {
                if write_error.code == 11000 {
                    return DaoError::DuplicateKey(write_error.message.clone());
                }
            }
            DaoError::Mongo(e)
        })?;

        let id = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| DaoError::InvalidId(result.inserted_id.to_string()))?;
        debug!(?id, "Inserted document");
        Ok(id)
    }

    /// Applies a `$set` and returns the document as it is after the update.
    pub async fn set_and_fetch(&self, filter: Document, set: Document) -> DaoResult<Option<T>> {
        Ok(self
            .collection
            .find_one_and_update(filter, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }

    pub async fn update_many(&self, filter: Document, set: Document) -> DaoResult<u64> {
        let result = self
            .collection
            .update_many(filter, doc! { "$set": set })
            .await?;
        Ok(result.modified_count)
    }

    /// Upserting `find_one_and_update`; `update` carries its own operators.
    pub async fn upsert_and_fetch(
        &self,
        filter: Document,
        update: Document,
    ) -> DaoResult<Option<T>> {
        Ok(self
            .collection
            .find_one_and_update(filter, update)
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?)
    }

    pub async fn hard_delete(&self, filter: Document) -> DaoResult<u64> {
        let result = self.collection.delete_many(filter).await?;
        Ok(result.deleted_count)
    }

    pub async fn count(&self, filter: Document) -> DaoResult<u64> {
        Ok(self.collection.count_documents(filter).await?)
    }
}
