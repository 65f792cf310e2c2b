use async_trait::async_trait;
use parking_lot::RwLock;
use std::{cmp::Ordering, collections::HashMap, sync::Arc};
use uuid::Uuid;

use crate::{
    engine::Engine,
    error::{Result, StoreError},
    event::{AggregateType, Event, WriteEvent},
    store::Store,
};

#[derive(Debug, Clone, Default)]
pub struct Memory(Arc<RwLock<HashMap<String, Vec<Event>>>>);

impl Memory {
    pub fn store() -> Store {
        Store::new(Self::default())
    }
}

fn feed_order(a: &Event, b: &Event) -> Ordering {
    let cmp = a.created_at.cmp(&b.created_at);

    match cmp {
        Ordering::Equal => {}
        _ => return cmp,
    };

    let cmp = a.version.cmp(&b.version);

    match cmp {
        Ordering::Equal => a.id.cmp(&b.id),
        _ => cmp,
    }
}

#[async_trait]
impl Engine for Memory {
    async fn write(
        &self,
        aggregate_id: &'_ str,
        write_events: Vec<WriteEvent>,
        original_version: u16,
    ) -> Result<Vec<Event>> {
        if write_events.is_empty() {
            return Ok(vec![]);
        }

        let mut data = self.0.write();
        let events = data.entry(aggregate_id.to_owned()).or_default();

        let mut version = events.last().map(|e| e.version).unwrap_or(0);

        if version != i32::from(original_version) {
            return Err(StoreError::UnexpectedOriginalVersion);
        }

        let start_at = events.len();

        for event in write_events {
            version += 1;

            events.push(event.to_event(aggregate_id, u16::try_from(version)?));
        }

        Ok(events[start_at..events.len()].to_vec())
    }

    async fn insert(&self, events: Vec<Event>) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        let mut data = self.0.write();

        for event in events {
            let events = data.entry(event.aggregate_id.to_owned()).or_default();
            events.push(event);
        }

        Ok(())
    }

    async fn read(&self, aggregate_id: &'_ str) -> Result<Vec<Event>> {
        Ok(self
            .0
            .read()
            .get(aggregate_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn read_all(
        &self,
        first: u16,
        after: Option<Uuid>,
        aggregate_types: Option<&'_ [AggregateType]>,
    ) -> Result<Vec<Event>> {
        let mut events = self
            .0
            .read()
            .values()
            .flatten()
            .filter(|event| {
                aggregate_types
                    .map(|types| types.contains(&event.aggregate_type))
                    .unwrap_or(true)
            })
            .cloned()
            .collect::<Vec<Event>>();

        events.sort_by(feed_order);

        let start = after
            .and_then(|id| events.iter().position(|event| event.id == id))
            .map(|pos| pos + 1)
            .unwrap_or(0);

        let end = std::cmp::min(events.len(), start + usize::from(first));

        Ok(events[start..end].to_vec())
    }

    async fn last(&self) -> Result<Option<Event>> {
        let mut events = self
            .0
            .read()
            .values()
            .flatten()
            .cloned()
            .collect::<Vec<Event>>();

        events.sort_by(feed_order);

        Ok(events.last().cloned())
    }
}
