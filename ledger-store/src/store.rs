use uuid::Uuid;

use crate::{
    engine::Engine,
    error::Result,
    event::{AggregateType, Event, WriteEvent},
};

/// Facade over the append-only log engine. Cheap to clone, safe to share.
#[derive(Clone)]
pub struct Store {
    engine: Box<dyn Engine>,
}

impl Store {
    pub fn new<E: Engine + 'static>(engine: E) -> Self {
        Self {
            engine: Box::new(engine),
        }
    }

    pub async fn write(
        &self,
        aggregate_id: impl Into<String>,
        event: WriteEvent,
        original_version: u16,
    ) -> Result<Event> {
        let events = self
            .write_all(aggregate_id, vec![event], original_version)
            .await?;

        match events.first() {
            Some(event) => Ok(event.clone()),
            _ => Err(crate::StoreError::EmptyWriteEvent),
        }
    }

    pub async fn write_all(
        &self,
        aggregate_id: impl Into<String>,
        events: Vec<WriteEvent>,
        original_version: u16,
    ) -> Result<Vec<Event>> {
        self.engine
            .write(aggregate_id.into().as_str(), events, original_version)
            .await
    }

    pub async fn insert(&self, events: Vec<Event>) -> Result<()> {
        self.engine.insert(events).await
    }

    pub async fn read(&self, aggregate_id: impl Into<String>) -> Result<Vec<Event>> {
        self.engine.read(aggregate_id.into().as_str()).await
    }

    pub async fn read_all(
        &self,
        first: u16,
        after: Option<Uuid>,
        aggregate_types: Option<&'_ [AggregateType]>,
    ) -> Result<Vec<Event>> {
        self.engine.read_all(first, after, aggregate_types).await
    }

    /// Head version of one stream, 0 when the stream is empty.
    pub async fn version_of(&self, aggregate_id: impl Into<String>) -> Result<u16> {
        let events = self.read(aggregate_id).await?;
        let version = events.last().map(|e| e.version).unwrap_or(0);

        Ok(u16::try_from(version)?)
    }

    pub async fn last(&self) -> Result<Option<Event>> {
        self.engine.last().await
    }
}
