use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dyn_clone::DynClone;
use futures_util::future::join_all;
use ledger_store::{AggregateType, Event, Store};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tokio::time::{interval_at, sleep, Duration, Instant};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::Result;

/// Delivery state of one subscription: the cursor points at the last event
/// of the global feed incorporated by the handler.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Subscription {
    pub id: Uuid,
    pub consumer_id: Uuid,
    pub key: String,
    pub enabled: bool,
    pub cursor: Option<Uuid>,
    pub updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait SubscriptionEngine: DynClone + Send + Sync {
    async fn upsert(&self, key: String, consumer_id: Uuid) -> Result<()>;

    async fn get(&self, key: String) -> Result<Subscription>;

    async fn set_cursor(&self, key: String, cursor: Uuid) -> Result<()>;
}

dyn_clone::clone_trait_object!(SubscriptionEngine);

#[derive(Clone, Default)]
pub struct MemorySubscription(Arc<RwLock<HashMap<String, Subscription>>>);

impl MemorySubscription {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionEngine for MemorySubscription {
    async fn upsert(&self, key: String, consumer_id: Uuid) -> Result<()> {
        let mut subscriptions = self.0.write();
        let subscription = subscriptions
            .entry(key.to_owned())
            .or_insert_with(|| Subscription {
                id: Uuid::new_v4(),
                consumer_id,
                key,
                enabled: true,
                cursor: None,
                updated_at: None,
                created_at: Utc::now(),
            });

        subscription.consumer_id = consumer_id;

        Ok(())
    }

    async fn get(&self, key: String) -> Result<Subscription> {
        match self.0.read().get(&key) {
            Some(subscription) => Ok(subscription.clone()),
            _ => Err(anyhow::anyhow!("subscription {key} not found").into()),
        }
    }

    async fn set_cursor(&self, key: String, cursor: Uuid) -> Result<()> {
        let mut subscriptions = self.0.write();

        let Some(subscription) = subscriptions.get_mut(&key) else {
            return Err(anyhow::anyhow!("subscription {key} not found").into());
        };

        subscription.cursor = Some(cursor);
        subscription.updated_at = Some(Utc::now());

        Ok(())
    }
}

/// An event handler driven by the consumer; delivery is at-least-once,
/// ordered within one aggregate id and unordered across ids, so handlers
/// must tolerate redelivery.
#[async_trait]
pub trait Handler: DynClone + Send + Sync {
    fn aggregate_types(&self) -> Vec<AggregateType>;

    async fn handle(&self, event: Event) -> Result<()>;
}

dyn_clone::clone_trait_object!(Handler);

/// Long-lived subscription consumer.
///
/// One tokio task per registered handler polls the event feed after the
/// subscription cursor, filtered by the handler's aggregate types. A
/// transient failure stops the batch before the cursor passes the event, so
/// the next tick redelivers it; a domain validation failure is copied to
/// the dead-letter store and the cursor moves on.
#[derive(Clone)]
pub struct Consumer {
    engine: Box<dyn SubscriptionEngine>,
    store: Store,
    deadletter: Store,
    handlers: HashMap<String, Box<dyn Handler>>,
    id: Uuid,
}

impl Consumer {
    pub fn new<E: SubscriptionEngine + 'static>(
        engine: E,
        store: Store,
        deadletter: Store,
    ) -> Self {
        Self {
            engine: Box::new(engine),
            store,
            deadletter,
            handlers: HashMap::new(),
            id: Uuid::new_v4(),
        }
    }

    pub fn handler<H: Handler + 'static>(mut self, key: impl Into<String>, handler: H) -> Self {
        self.handlers.insert(key.into(), Box::new(handler));

        self
    }

    pub async fn start(&self, delay: u64) -> Result<()> {
        let futures = self
            .handlers
            .keys()
            .map(|key| self.engine.upsert(key.to_owned(), self.id));

        let fut_err = join_all(futures)
            .await
            .into_iter()
            .find_map(|res| res.err());

        if let Some(err) = fut_err {
            return Err(err);
        }

        let futures = self
            .handlers
            .iter()
            .map(|(key, handler)| self.start_queue(key.to_owned(), handler.clone(), delay));

        join_all(futures).await;

        Ok(())
    }

    async fn start_queue(&self, key: String, handler: Box<dyn Handler>, delay: u64) {
        let engine = self.engine.clone();
        let store = self.store.clone();
        let deadletter = self.deadletter.clone();
        let consumer_id = self.id;

        tokio::spawn(async move {
            if delay > 0 {
                info!("wait {delay} seconds to start {key}");
                sleep(Duration::from_secs(delay)).await;
            }

            info!("{key} started.");

            let aggregate_types = handler.aggregate_types();
            let mut interval = interval_at(Instant::now(), Duration::from_millis(100));

            loop {
                interval.tick().await;

                let subscription = match engine.get(key.to_owned()).await {
                    Ok(s) => s,
                    Err(e) => {
                        error!("{e}");
                        continue;
                    }
                };

                if !subscription.enabled {
                    debug!("queue {key} is disabled, skip");
                    continue;
                }

                if subscription.consumer_id != consumer_id {
                    info!(
                        "consumer {consumer_id} lost ownership of {key} over consumer {}",
                        subscription.consumer_id
                    );
                    break;
                }

                let events = match store
                    .read_all(100, subscription.cursor, Some(&aggregate_types))
                    .await
                {
                    Ok(events) => events,
                    Err(e) => {
                        error!("{e}");
                        continue;
                    }
                };

                let mut cursor = subscription.cursor;

                for event in events {
                    match handler.handle(event.clone()).await {
                        Ok(()) => {
                            debug!(
                                "{key} succeeded to handle event id={}, name={}",
                                event.aggregate_id, event.name
                            );
                        }
                        Err(e) if e.is_transient() => {
                            // Leave the cursor before the event; the next
                            // tick redelivers it.
                            error!(
                                "{key} transient failure on event id={}, name={}, error={}",
                                event.aggregate_id, event.name, e
                            );
                            break;
                        }
                        Err(e) => {
                            error!(
                                "{key} failed to handle event id={}, name={}, error={}",
                                event.aggregate_id, event.name, e
                            );

                            if let Err(e) = deadletter.insert(vec![event.clone()]).await {
                                error!("{e}");
                            }
                        }
                    }

                    cursor = Some(event.id);
                }

                if cursor == subscription.cursor {
                    continue;
                }

                if let Some(cursor) = cursor {
                    if let Err(e) = engine.set_cursor(key.to_owned(), cursor).await {
                        error!("{e}");
                    }
                }
            }
        });
    }
}
