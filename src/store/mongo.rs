use bson::{doc, Bson, Document};
use mongodb::error::ErrorKind;
use mongodb::options::ReplaceOptions;
use mongodb::{Collection, Database};
use rocket::futures::TryStreamExt;
use uuid::Uuid;

use super::{DocumentStore, StoreError};

/// MongoDB command error code for "Unauthorized".
const UNAUTHORIZED_CODE: i32 = 13;

#[derive(Debug, Clone)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> MongoStore {
        MongoStore { db }
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }
}

#[inline]
fn key_filter(key: &str) -> Document {
    doc! { "_id": key }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(e: mongodb::error::Error) -> Self {
        let reason = e.to_string();
        match e.kind.as_ref() {
            ErrorKind::Authentication { .. } => StoreError::PermissionDenied(reason),
            ErrorKind::Command(c) if c.code == UNAUTHORIZED_CODE => {
                StoreError::PermissionDenied(reason)
            }
            _ => StoreError::Unavailable(reason),
        }
    }
}

impl DocumentStore for MongoStore {
    async fn get_all(&self, collection: &str) -> Result<Vec<(String, Document)>, StoreError> {
        let mut cursor = self.collection(collection).find(None, None).await?;

        let mut documents = vec![];
        while let Some(document) = cursor.try_next().await? {
            match document.get_str("_id").map(str::to_string) {
                Ok(key) => documents.push((key, document)),
                Err(_) => {
                    tracing::warn!("Skipping '{}' document without a string key.", collection)
                }
            }
        }

        Ok(documents)
    }

    async fn get(&self, collection: &str, key: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .collection(collection)
            .find_one(key_filter(key), None)
            .await?)
    }

    async fn add(&self, collection: &str, mut document: Document) -> Result<String, StoreError> {
        let key = Uuid::new_v4().to_string();
        document.insert("_id", key.as_str());

        self.collection(collection)
            .insert_one(document, None)
            .await?;

        Ok(key)
    }

    async fn set(&self, collection: &str, key: &str, mut document: Document) -> Result<(), StoreError> {
        document.insert("_id", key);

        let options = ReplaceOptions::builder().upsert(true).build();
        self.collection(collection)
            .replace_one(key_filter(key), document, options)
            .await?;

        Ok(())
    }

    async fn update_field(
        &self,
        collection: &str,
        key: &str,
        field: &str,
        value: Bson,
    ) -> Result<(), StoreError> {
        let mut set = Document::new();
        set.insert(field, value);

        let result = self
            .collection(collection)
            .update_one(key_filter(key), doc! { "$set": set }, None)
            .await?;

        if result.matched_count == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                key: key.to_string(),
            });
        }

        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        self.collection(collection)
            .delete_one(key_filter(key), None)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::error::{CommandError, Error};

    fn command_error(code: i32, code_name: &str) -> Error {
        let command: CommandError = bson::from_document(doc! {
            "code": code,
            "codeName": code_name,
            "errmsg": "command failed on clipchart",
        })
        .unwrap();
        Error::from(ErrorKind::Command(command))
    }

    #[test]
    fn unauthorized_command_is_permission_denied() {
        match StoreError::from(command_error(UNAUTHORIZED_CODE, "Unauthorized")) {
            StoreError::PermissionDenied(reason) => assert!(reason.contains("clipchart")),
            other => panic!("expected permission denied, got {:?}", other),
        }
    }

    #[test]
    fn other_failures_are_unavailable() {
        assert!(matches!(
            StoreError::from(command_error(11600, "InterruptedAtShutdown")),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            StoreError::from(Error::from(std::io::ErrorKind::ConnectionRefused)),
            StoreError::Unavailable(_)
        ));
    }
}
