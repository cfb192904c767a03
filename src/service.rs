//! Business rules between the HTTP layer and the repositories.

use std::sync::Arc;
use tracing::{debug, info};

use crate::backend::database::RecordWriteProcessor;
use crate::backend::Repository;
use crate::error::{AppError, AppResult};
use crate::models::Entity;
use crate::schema::validate_person;

/// Record operations for one entity kind
pub struct RecordService<E: Entity> {
    repository: Arc<dyn Repository<E>>,
}

impl<E: Entity> Clone for RecordService<E> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
        }
    }
}

impl<E: Entity> RecordService<E> {
    pub fn new(repository: Arc<dyn Repository<E>>) -> Self {
        Self { repository }
    }

    /// Create a record, rejecting an email that is already registered.
    ///
    /// Any id on the input is discarded; the store assigns one.
    pub async fn create(&self, input: E) -> AppResult<E> {
        let record = input.without_id();
        validate_person(E::KIND, record.details())?;

        let email = record.details().email.trim();
        if self.repository.find_by_email(email).await?.is_some() {
            return Err(AppError::Conflict(
                RecordWriteProcessor::duplicate_email_message(E::KIND, email),
            ));
        }

        let created = self.repository.insert_unique(&record).await?;
        info!(kind = %E::KIND, id = ?created.id(), "record created");
        Ok(created)
    }

    pub async fn list(&self) -> AppResult<Vec<E>> {
        self.repository.find_all().await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<E>> {
        self.repository.find_by_id(id).await
    }

    pub async fn find_by_name(&self, first_name: &str, last_name: &str) -> AppResult<Option<E>> {
        self.repository.find_by_name(first_name, last_name).await
    }

    /// Persist an already merged record
    pub async fn update(&self, record: E) -> AppResult<E> {
        if record.id().is_none() {
            return Err(AppError::BadRequest(format!(
                "{} update requires an id",
                E::KIND
            )));
        }
        validate_person(E::KIND, record.details())?;

        let updated = self.repository.save(&record).await?;
        info!(kind = %E::KIND, id = ?updated.id(), "record updated");
        Ok(updated)
    }

    /// Load the record, copy every mutable field from `input` onto it and
    /// write it back. Returns `None` when no record has this id, including a
    /// record deleted between the read and the write.
    pub async fn update_by_id(&self, id: i64, input: E) -> AppResult<Option<E>> {
        let Some(mut saved) = self.repository.find_by_id(id).await? else {
            debug!(kind = %E::KIND, id, "update target not found");
            return Ok(None);
        };

        saved.merge_from(&input);
        validate_person(E::KIND, saved.details())?;

        // A row deleted since the read stays deleted
        match self.repository.update_existing(&saved).await? {
            Some(updated) => {
                info!(kind = %E::KIND, id, "record updated");
                Ok(Some(updated))
            }
            None => {
                debug!(kind = %E::KIND, id, "update target removed before write");
                Ok(None)
            }
        }
    }

    /// Delete by id; deleting a missing record is not an error
    pub async fn delete_by_id(&self, id: i64) -> AppResult<()> {
        let removed = self.repository.delete_by_id(id).await?;
        if removed {
            info!(kind = %E::KIND, id, "record deleted");
        } else {
            debug!(kind = %E::KIND, id, "delete of missing record ignored");
        }
        Ok(())
    }
}
