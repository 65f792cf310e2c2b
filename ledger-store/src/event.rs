use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Result, StoreError};

/// Wire-level aggregate type codes shared with the command side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum AggregateType {
    Account,
    Deposit,
    Withdrawal,
}

impl From<AggregateType> for i32 {
    fn from(value: AggregateType) -> Self {
        match value {
            AggregateType::Account => 100,
            AggregateType::Deposit => 101,
            AggregateType::Withdrawal => 102,
        }
    }
}

impl TryFrom<i32> for AggregateType {
    type Error = StoreError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            100 => Ok(Self::Account),
            101 => Ok(Self::Deposit),
            102 => Ok(Self::Withdrawal),
            code => Err(StoreError::UnknownAggregateType(code)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WriteEvent {
    pub name: String,
    pub aggregate_type: AggregateType,
    pub data: Value,
}

impl WriteEvent {
    pub fn new<N: Into<String>>(name: N, aggregate_type: AggregateType) -> Self {
        Self {
            name: name.into(),
            aggregate_type,
            data: Value::default(),
        }
    }

    pub fn to_event(&self, aggregate_id: impl Into<String>, version: u16) -> Event {
        Event {
            name: self.name.to_owned(),
            aggregate_id: aggregate_id.into(),
            aggregate_type: self.aggregate_type,
            version: i32::from(version),
            data: self.data.clone(),
            ..Default::default()
        }
    }

    pub fn data<D: Serialize>(mut self, value: D) -> Result<Self> {
        self.data = serde_json::to_value(&value)?;

        Ok(self)
    }
}

/// One appended, immutable event. `version` is the 1-based sequence within
/// a single `aggregate_id`; ordering across different ids is not defined.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub name: String,
    pub aggregate_id: String,
    pub aggregate_type: AggregateType,
    #[serde(rename = "sequence")]
    pub version: i32,
    #[serde(rename = "body")]
    pub data: Value,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn to_data<D: DeserializeOwned>(&self) -> Result<D> {
        Ok(serde_json::from_value(self.data.clone())?)
    }

    pub fn data<D: Serialize>(mut self, value: D) -> Result<Self> {
        self.data = serde_json::to_value(&value)?;

        Ok(self)
    }
}

impl Default for Event {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::default(),
            aggregate_id: String::default(),
            aggregate_type: AggregateType::Account,
            version: i32::default(),
            data: Value::default(),
            created_at: Utc::now(),
        }
    }
}
