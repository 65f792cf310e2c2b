use ledger_store::{AggregateType, Event, Store, StoreError, WriteEvent};
use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    aggregate::{fold, Aggregate},
    error::{Error, Result},
};

/// Retries of a command whose append lost the optimistic-concurrency race.
/// Every retry revalidates against freshly folded state.
const MAX_WRITE_RETRIES: usize = 4;

#[derive(Display, FromStr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountEvent {
    AccountCreated,
    AccountUpdated,
    BalanceCredited,
    BalanceDebited,
}

impl From<AccountEvent> for String {
    fn from(value: AccountEvent) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountCreated {
    pub username: String,
    pub full_name: String,
    pub password: String,
    pub email: String,
}

/// Partial profile update. A field only takes effect when present and
/// non-empty; empty-string updates are silently ignored, which is the
/// contract inherited from the original system.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountUpdated {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalanceCredited {
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BalanceDebited {
    pub amount: i64,
}

/// Validated account state reconstructed from the event stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub username: String,
    pub full_name: String,
    pub password: String,
    pub email: String,
    pub balance: i64,
}

impl Account {
    pub fn merge_update(&mut self, update: &AccountUpdated) {
        merge_field(&mut self.username, &update.username);
        merge_field(&mut self.full_name, &update.full_name);
        merge_field(&mut self.password, &update.password);
        merge_field(&mut self.email, &update.email);
    }
}

fn merge_field(target: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        if !value.is_empty() {
            *target = value.to_owned();
        }
    }
}

impl Aggregate for Account {
    fn aggregate_type() -> AggregateType {
        AggregateType::Account
    }

    fn apply(state: Option<Self>, event: &Event) -> Result<Option<Self>> {
        let Ok(name) = event.name.parse::<AccountEvent>() else {
            // Unknown event types replay as the identity.
            return Ok(state);
        };

        let Some(mut account) = state else {
            if name != AccountEvent::AccountCreated {
                return Err(Error::AccountNotFound(event.aggregate_id.to_owned()));
            }

            let data: AccountCreated = event.to_data()?;

            return Ok(Some(Account {
                username: data.username,
                full_name: data.full_name,
                password: data.password,
                email: data.email,
                balance: 0,
            }));
        };

        match name {
            AccountEvent::AccountCreated => {
                Err(Error::AccountAlreadyExists(event.aggregate_id.to_owned()))
            }
            AccountEvent::AccountUpdated => {
                let data: AccountUpdated = event.to_data()?;
                account.merge_update(&data);

                Ok(Some(account))
            }
            AccountEvent::BalanceCredited => {
                let data: BalanceCredited = event.to_data()?;
                account.balance += data.amount;

                Ok(Some(account))
            }
            AccountEvent::BalanceDebited => {
                let data: BalanceDebited = event.to_data()?;
                let balance = account.balance - data.amount;

                if balance < 0 {
                    return Err(Error::InsufficientFund(event.aggregate_id.to_owned()));
                }

                account.balance = balance;

                Ok(Some(account))
            }
        }
    }
}

/// Command side of one account: every operation reloads the latest folded
/// state, dry-runs the candidate event through [`Account::apply`] and only
/// appends when the trial application succeeds.
#[derive(Clone)]
pub struct AccountAggregate {
    id: String,
    store: Store,
}

impl AccountAggregate {
    pub fn new(store: Store, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            store,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn find_by_id(store: &Store, id: impl Into<String>) -> Result<Option<Account>> {
        let events = store.read(id).await?;

        fold(events.iter())
    }

    pub async fn load(&self) -> Result<Option<Account>> {
        Self::find_by_id(&self.store, &self.id).await
    }

    pub async fn create(&self, profile: AccountCreated) -> Result<Event> {
        self.execute(AccountEvent::AccountCreated, serde_json::to_value(&profile)?)
            .await
    }

    pub async fn update(&self, update: AccountUpdated) -> Result<Event> {
        self.execute(AccountEvent::AccountUpdated, serde_json::to_value(&update)?)
            .await
    }

    pub async fn credit(&self, amount: i64) -> Result<Event> {
        self.execute(
            AccountEvent::BalanceCredited,
            serde_json::to_value(BalanceCredited { amount })?,
        )
        .await
    }

    pub async fn debit(&self, amount: i64) -> Result<Event> {
        self.execute(
            AccountEvent::BalanceDebited,
            serde_json::to_value(BalanceDebited { amount })?,
        )
        .await
    }

    async fn execute(&self, name: AccountEvent, data: Value) -> Result<Event> {
        let mut attempts = 0;

        loop {
            let events = self.store.read(&self.id).await?;
            let state = fold::<Account, _>(events.iter())?;
            let version = events.last().map(|e| e.version).unwrap_or(0);
            let version = u16::try_from(version).map_err(StoreError::from)?;

            let write = WriteEvent::new(name, Account::aggregate_type()).data(&data)?;

            // Dry run against the freshly reloaded state; nothing is
            // appended when the trial application fails.
            Account::apply(state, &write.to_event(&self.id, version + 1))?;

            match self.store.write(&self.id, write, version).await {
                Ok(event) => return Ok(event),
                Err(StoreError::UnexpectedOriginalVersion) if attempts < MAX_WRITE_RETRIES => {
                    attempts += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
