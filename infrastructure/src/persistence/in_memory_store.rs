use application::{ApplicationError, RecordRepository};
use async_trait::async_trait;
use domain::{Record, RecordId};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

#[derive(Debug)]
struct CollectionState<R> {
    // Insertion order is the listing order
    records: Vec<R>,
    // Only ever incremented, so ids are never reused after a delete
    next_id: RecordId,
}

/// Volatile record collection for one service. The records and the id counter sit
/// behind a single lock; every mutation takes it exclusively.
#[derive(Debug)]
pub struct InMemoryRecordStore<R: Record> {
    state: RwLock<CollectionState<R>>,
}

impl<R: Record> InMemoryRecordStore<R> {
    /// Empty collection whose first id is 1.
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Collection preloaded with the record type's fixtures.
    pub fn seeded() -> Self {
        Self::with_records(R::seed_records())
    }

    /// The counter resumes after the highest id present.
    pub fn with_records(records: Vec<R>) -> Self {
        let next_id = records
            .iter()
            .map(Record::id)
            .max()
            .map_or(RecordId::new(1), |id| id.next());
        Self {
            state: RwLock::new(CollectionState { records, next_id }),
        }
    }
}

impl<R: Record> Default for InMemoryRecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> RecordRepository<R> for InMemoryRecordStore<R> {
    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    async fn list(&self) -> Result<Vec<R>, ApplicationError> {
        let state = self.state.read().await;
        debug!(count = state.records.len(), "Listing records from in-memory store");
        Ok(state.records.clone())
    }

    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    async fn find(&self, id: RecordId) -> Result<Option<R>, ApplicationError> {
        debug!(id = %id, "Looking up record in in-memory store");
        let state = self.state.read().await;
        Ok(state.records.iter().find(|r| r.id() == id).cloned())
    }

    #[instrument(skip(self, draft), fields(collection = R::COLLECTION))]
    async fn insert(&self, draft: R::Draft) -> Result<R, ApplicationError> {
        let mut state = self.state.write().await;
        let id = state.next_id;
        // Validation runs under the lock; the counter moves only if it passes
        let record = R::from_draft(id, draft)?;
        state.next_id = id.next();
        state.records.push(record.clone());
        debug!(id = %id, count = state.records.len(), "Appended record to in-memory store");
        Ok(record)
    }

    #[instrument(skip(self, patch), fields(collection = R::COLLECTION))]
    async fn update(&self, id: RecordId, patch: R::Patch) -> Result<Option<R>, ApplicationError> {
        let mut state = self.state.write().await;
        let Some(record) = state.records.iter_mut().find(|r| r.id() == id) else {
            return Ok(None);
        };
        record.apply_patch(patch)?;
        debug!(id = %id, "Patched record in in-memory store");
        Ok(Some(record.clone()))
    }

    #[instrument(skip(self), fields(collection = R::COLLECTION))]
    async fn remove(&self, id: RecordId) -> Result<bool, ApplicationError> {
        let mut state = self.state.write().await;
        match state.records.iter().position(|r| r.id() == id) {
            Some(index) => {
                // `remove` shifts the tail, keeping the remaining order
                state.records.remove(index);
                debug!(id = %id, count = state.records.len(), "Removed record from in-memory store");
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
