use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use domain::{DomainError, Record, RecordId};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

// --- Application Errors ---
#[derive(Error, Debug)]
pub enum ApplicationError {
    /// Carries the client-facing message, e.g. "Cliente não encontrado".
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    DomainError(#[from] DomainError), // Validation failures surface as-is
}

// --- Infrastructure Interfaces (Traits) ---

/// Storage for one record collection. Implementations own the id counter:
/// `insert` assigns the next id only when the draft validates.
#[async_trait]
pub trait RecordRepository<R: Record>: Send + Sync {
    /// All records in insertion order.
    async fn list(&self) -> Result<Vec<R>, ApplicationError>;
    async fn find(&self, id: RecordId) -> Result<Option<R>, ApplicationError>;
    /// Validates the draft, assigns the next id and appends the record.
    async fn insert(&self, draft: R::Draft) -> Result<R, ApplicationError>;
    /// Applies a patch in place. `Ok(None)` when no record has this id.
    async fn update(&self, id: RecordId, patch: R::Patch) -> Result<Option<R>, ApplicationError>;
    /// Returns true if a record was removed.
    async fn remove(&self, id: RecordId) -> Result<bool, ApplicationError>;
}

// --- Response Models (DTOs) ---

/// `{success, message?, data?, total?}` wrapper used by every JSON response.
#[derive(Serialize, Debug)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl<T: Serialize> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            total: None,
        }
    }

    pub fn data_with_message(message: String, data: T) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
            total: None,
        }
    }
}

impl<T: Serialize> Envelope<Vec<T>> {
    pub fn list(items: Vec<T>) -> Self {
        let total = items.len();
        Self {
            success: true,
            message: None,
            data: Some(items),
            total: Some(total),
        }
    }
}

/// Envelope that carries only a message.
pub type MessageEnvelope = Envelope<()>;

impl MessageEnvelope {
    pub fn message(message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: None,
            total: None,
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            success: false,
            message: Some(message),
            data: None,
            total: None,
        }
    }
}

/// Response for the /health endpoint.
#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: String,
}

// --- Application Services (Use Cases) ---

/// The five collection operations for one record type.
pub struct RecordService<R: Record> {
    repo: Arc<dyn RecordRepository<R>>,
}

impl<R: Record> RecordService<R> {
    pub fn new(repo: Arc<dyn RecordRepository<R>>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    pub async fn list(&self) -> Result<Vec<R>, ApplicationError> {
        let records = self.repo.list().await?;
        debug!(count = records.len(), "Listed records");
        Ok(records)
    }

    /// `raw_id` is the path segment as received; anything that cannot match an id is `NotFound`.
    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    pub async fn get(&self, raw_id: &str) -> Result<R, ApplicationError> {
        let id = Self::parse_id(raw_id)?;
        self.repo.find(id).await?.ok_or_else(|| {
            warn!(id = %id, "Record not found");
            ApplicationError::NotFound(R::not_found_message())
        })
    }

    #[instrument(skip(self, draft), fields(collection = R::COLLECTION))]
    pub async fn create(&self, draft: R::Draft) -> Result<R, ApplicationError> {
        debug!(?draft, "Attempting to create record");
        let record = self.repo.insert(draft).await.inspect_err(|e| {
            warn!("Create rejected: {}", e);
        })?;
        info!(id = %record.id(), "Record created");
        Ok(record)
    }

    #[instrument(skip(self, patch), fields(collection = R::COLLECTION))]
    pub async fn update(&self, raw_id: &str, patch: R::Patch) -> Result<R, ApplicationError> {
        let id = Self::parse_id(raw_id)?;
        debug!(?patch, "Attempting to update record");
        match self.repo.update(id, patch).await {
            Ok(Some(record)) => {
                info!(id = %id, "Record updated");
                Ok(record)
            }
            Ok(None) => {
                warn!(id = %id, "Update failed: record not found");
                Err(ApplicationError::NotFound(R::not_found_message()))
            }
            Err(e) => {
                warn!(id = %id, "Update rejected: {}", e);
                Err(e)
            }
        }
    }

    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    pub async fn delete(&self, raw_id: &str) -> Result<(), ApplicationError> {
        let id = Self::parse_id(raw_id)?;
        if self.repo.remove(id).await? {
            info!(id = %id, "Record deleted");
            Ok(())
        } else {
            warn!(id = %id, "Deletion failed: record not found");
            Err(ApplicationError::NotFound(R::not_found_message()))
        }
    }

    pub fn health(&self) -> HealthResponse {
        HealthResponse {
            status: "OK",
            service: R::SERVICE_NAME,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    fn parse_id(raw_id: &str) -> Result<RecordId, ApplicationError> {
        RecordId::parse_lenient(raw_id).ok_or_else(|| {
            warn!(raw_id = %raw_id, "Path id does not name any record");
            ApplicationError::NotFound(R::not_found_message())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Customer, CustomerDraft, CustomerPatch, Product, ProductDraft, PriceInput};
    use serde_json::json;
    use tokio::sync::Mutex;

    /// Minimal vector-backed repository so the service can be tested on its own.
    struct VecRepository<R> {
        state: Mutex<(Vec<R>, RecordId)>,
    }

    impl<R: Record> VecRepository<R> {
        fn seeded() -> Self {
            let records = R::seed_records();
            let next = records
                .iter()
                .map(Record::id)
                .max()
                .map_or(RecordId::new(1), |id| id.next());
            Self {
                state: Mutex::new((records, next)),
            }
        }
    }

    #[async_trait]
    impl<R: Record> RecordRepository<R> for VecRepository<R> {
        async fn list(&self) -> Result<Vec<R>, ApplicationError> {
            Ok(self.state.lock().await.0.clone())
        }

        async fn find(&self, id: RecordId) -> Result<Option<R>, ApplicationError> {
            Ok(self.state.lock().await.0.iter().find(|r| r.id() == id).cloned())
        }

        async fn insert(&self, draft: R::Draft) -> Result<R, ApplicationError> {
            let mut state = self.state.lock().await;
            let record = R::from_draft(state.1, draft)?;
            state.1 = state.1.next();
            state.0.push(record.clone());
            Ok(record)
        }

        async fn update(
            &self,
            id: RecordId,
            patch: R::Patch,
        ) -> Result<Option<R>, ApplicationError> {
            let mut state = self.state.lock().await;
            match state.0.iter_mut().find(|r| r.id() == id) {
                Some(record) => {
                    record.apply_patch(patch)?;
                    Ok(Some(record.clone()))
                }
                None => Ok(None),
            }
        }

        async fn remove(&self, id: RecordId) -> Result<bool, ApplicationError> {
            let mut state = self.state.lock().await;
            let before = state.0.len();
            state.0.retain(|r| r.id() != id);
            Ok(state.0.len() != before)
        }
    }

    fn customer_service() -> RecordService<Customer> {
        RecordService::new(Arc::new(VecRepository::<Customer>::seeded()))
    }

    fn product_service() -> RecordService<Product> {
        RecordService::new(Arc::new(VecRepository::<Product>::seeded()))
    }

    #[tokio::test]
    async fn get_unknown_customer_is_not_found() {
        let service = customer_service();
        let err = service.get("999").await.unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(msg) if msg == "Cliente não encontrado"));

        let err = service.get("abc").await.unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_assigns_next_id() {
        let service = product_service();
        let product = service
            .create(ProductDraft {
                name: Some("X".into()),
                description: Some("Y".into()),
                price: Some(PriceInput::Number(10.0)),
            })
            .await
            .unwrap();
        assert_eq!(product.id(), RecordId::new(6));
        assert_eq!(product.price(), 10.0);
    }

    #[tokio::test]
    async fn invalid_create_surfaces_domain_error() {
        let service = customer_service();
        let err = service
            .create(CustomerDraft {
                name: Some("Ana".into()),
                phone: Some("11 91234-5678".into()),
                email: Some("ana@example.com".into()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::DomainError(_)));
        assert_eq!(service.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_records() {
        let service = customer_service();
        let err = service
            .update("42", CustomerPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(_)));

        service.delete("1").await.unwrap();
        assert!(matches!(
            service.delete("1").await,
            Err(ApplicationError::NotFound(_))
        ));
        assert!(matches!(service.get("1").await, Err(ApplicationError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_applies_patch() {
        let service = customer_service();
        let updated = service
            .update(
                "2",
                CustomerPatch {
                    email: Some("maria@novo.com".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.email(), "maria@novo.com");
        assert_eq!(updated.name(), "Maria");
    }

    #[test]
    fn health_reports_service_name() {
        let health = customer_service().health();
        assert_eq!(health.status, "OK");
        assert_eq!(health.service, "Clientes");
        assert!(health.timestamp.ends_with('Z'));
    }

    #[test]
    fn envelope_serialization_omits_absent_parts() {
        let list = serde_json::to_value(Envelope::list(vec![1, 2, 3])).unwrap();
        assert_eq!(list, json!({ "success": true, "data": [1, 2, 3], "total": 3 }));

        let failure = serde_json::to_value(MessageEnvelope::failure("nope".into())).unwrap();
        assert_eq!(failure, json!({ "success": false, "message": "nope" }));

        let created =
            serde_json::to_value(Envelope::data_with_message("ok".into(), json!({ "id": 1 })))
                .unwrap();
        assert_eq!(
            created,
            json!({ "success": true, "message": "ok", "data": { "id": 1 } })
        );
    }
}
