use async_trait::async_trait;
use dyn_clone::DynClone;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};

use crate::{
    account::Account,
    error::{Error, Result},
};

/// Denormalized, queryable view of one account, mutated only by the
/// projection processor.
///
/// `total_counter` is the signed net amount of the in-flight (unapproved)
/// deposit or withdrawal and `counter_id` the aggregate id of that action;
/// one slot per account, a newer action overwrites the correlation of an
/// older one. `applied` holds the highest incorporated event sequence per
/// source aggregate id so redelivered events are skipped instead of double
/// counted; it gains one entry per deposit or withdrawal and is never
/// pruned, since the feed carries no redelivery horizon to prune against.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountDocument {
    pub id: String,
    #[serde(flatten)]
    pub account: Account,
    pub total_approved_deposit_amount: i64,
    pub total_approved_withdrawal_amount: i64,
    pub total_counter: i64,
    pub counter_id: Option<String>,
    #[serde(default)]
    pub applied: HashMap<String, i32>,
}

impl AccountDocument {
    pub fn new(id: impl Into<String>, account: Account) -> Self {
        Self {
            id: id.into(),
            account,
            ..Self::default()
        }
    }

    /// True when `sequence` of `aggregate_id` was already incorporated.
    pub fn seen(&self, aggregate_id: &str, sequence: i32) -> bool {
        self.applied
            .get(aggregate_id)
            .map(|applied| sequence <= *applied)
            .unwrap_or(false)
    }

    pub fn mark(&mut self, aggregate_id: impl Into<String>, sequence: i32) {
        self.applied.insert(aggregate_id.into(), sequence);
    }
}

#[async_trait]
pub trait ReadModelStore: DynClone + Send + Sync {
    async fn get(&self, id: &'_ str) -> Result<Option<AccountDocument>>;

    /// Fails with [`Error::DocumentAlreadyExists`] when the id is taken.
    async fn create(&self, document: AccountDocument) -> Result<()>;

    /// Fails with [`Error::DocumentNotFound`] when the id is absent.
    async fn update(&self, document: AccountDocument) -> Result<()>;

    /// Document currently carrying `counter_id`, if any.
    async fn find_by_counter_id(&self, counter_id: &'_ str) -> Result<Option<AccountDocument>>;
}

dyn_clone::clone_trait_object!(ReadModelStore);

#[derive(Default)]
struct MemoryInner {
    documents: HashMap<String, AccountDocument>,
    // counter_id -> document id, kept in sync on every create/update so the
    // approval lookup never scans.
    counters: HashMap<String, String>,
}

#[derive(Clone, Default)]
pub struct MemoryReadModel(Arc<RwLock<MemoryInner>>);

impl MemoryReadModel {
    pub fn new() -> Self {
        Self::default()
    }
}

fn index_counter(inner: &mut MemoryInner, document: &AccountDocument) {
    inner
        .counters
        .retain(|_, account_id| account_id != &document.id);

    if let Some(counter_id) = &document.counter_id {
        inner
            .counters
            .insert(counter_id.to_owned(), document.id.to_owned());
    }
}

#[async_trait]
impl ReadModelStore for MemoryReadModel {
    async fn get(&self, id: &'_ str) -> Result<Option<AccountDocument>> {
        Ok(self.0.read().documents.get(id).cloned())
    }

    async fn create(&self, document: AccountDocument) -> Result<()> {
        let mut inner = self.0.write();

        if inner.documents.contains_key(&document.id) {
            return Err(Error::DocumentAlreadyExists(document.id));
        }

        index_counter(&mut inner, &document);
        inner.documents.insert(document.id.to_owned(), document);

        Ok(())
    }

    async fn update(&self, document: AccountDocument) -> Result<()> {
        let mut inner = self.0.write();

        if !inner.documents.contains_key(&document.id) {
            return Err(Error::DocumentNotFound(document.id));
        }

        index_counter(&mut inner, &document);
        inner.documents.insert(document.id.to_owned(), document);

        Ok(())
    }

    async fn find_by_counter_id(&self, counter_id: &'_ str) -> Result<Option<AccountDocument>> {
        let inner = self.0.read();

        Ok(inner
            .counters
            .get(counter_id)
            .and_then(|id| inner.documents.get(id))
            .cloned())
    }
}
