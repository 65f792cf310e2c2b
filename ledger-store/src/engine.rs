use async_trait::async_trait;
use dyn_clone::DynClone;
use uuid::Uuid;

use crate::{
    error::Result,
    event::{AggregateType, Event, WriteEvent},
};

mod memory;

pub use memory::*;

#[async_trait]
pub trait Engine: DynClone + Send + Sync {
    /// Appends `events` to the stream of `aggregate_id`, rejecting the write
    /// with [`StoreError::UnexpectedOriginalVersion`](crate::StoreError) when
    /// the stream head is no longer at `original_version`.
    async fn write(
        &self,
        aggregate_id: &'_ str,
        events: Vec<WriteEvent>,
        original_version: u16,
    ) -> Result<Vec<Event>>;

    async fn insert(&self, events: Vec<Event>) -> Result<()>;

    /// Ordered slice of every event of one aggregate.
    async fn read(&self, aggregate_id: &'_ str) -> Result<Vec<Event>>;

    /// Global feed used by subscriptions. Ordered within one aggregate id,
    /// paginated by the id of the last seen event.
    async fn read_all(
        &self,
        first: u16,
        after: Option<Uuid>,
        aggregate_types: Option<&'_ [AggregateType]>,
    ) -> Result<Vec<Event>>;

    async fn last(&self) -> Result<Option<Event>>;
}

dyn_clone::clone_trait_object!(Engine);
