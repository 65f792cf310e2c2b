use futures_util::future::join_all;
use ledger_store::{AggregateType, Event, Store, StoreError, WriteEvent};
use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

#[derive(Display, FromStr)]
pub enum AccountEvent {
    AccountCreated,
    BalanceCredited,
}

impl From<AccountEvent> for String {
    fn from(value: AccountEvent) -> Self {
        value.to_string()
    }
}

#[derive(Serialize, Deserialize)]
pub struct AccountCreated {
    pub username: String,
    pub email: String,
}

#[derive(Serialize, Deserialize)]
pub struct BalanceCredited {
    pub amount: i64,
}

pub fn created(username: &str) -> anyhow::Result<WriteEvent> {
    Ok(
        WriteEvent::new(AccountEvent::AccountCreated, AggregateType::Account).data(
            AccountCreated {
                username: username.to_owned(),
                email: format!("{username}@example.com"),
            },
        )?,
    )
}

pub fn credited(amount: i64) -> anyhow::Result<WriteEvent> {
    Ok(
        WriteEvent::new(AccountEvent::BalanceCredited, AggregateType::Account)
            .data(BalanceCredited { amount })?,
    )
}

pub fn deposit(account: &str, amount: i64) -> anyhow::Result<WriteEvent> {
    Ok(
        WriteEvent::new("DepositCreated", AggregateType::Deposit).data(serde_json::json!({
            "account": account,
            "amount": amount,
        }))?,
    )
}

pub async fn test_save(store: &Store) -> anyhow::Result<()> {
    let events = store
        .write_all("a1", vec![created("john.doe")?, credited(100)?], 0)
        .await?;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].version, 1);
    assert_eq!(events[1].version, 2);

    let events = store.read("a1").await?;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].name, "AccountCreated");
    assert_eq!(events[1].name, "BalanceCredited");
    assert_eq!(store.version_of("a1").await?, 2);

    let data: BalanceCredited = events[1].to_data()?;
    assert_eq!(data.amount, 100);

    Ok(())
}

pub async fn test_wrong_version(store: &Store) -> anyhow::Result<()> {
    store.write("a1", created("john.doe")?, 0).await?;

    let err = store
        .write("a1", credited(10)?, 5)
        .await
        .expect_err("write should fail on stale version");

    assert!(matches!(err, StoreError::UnexpectedOriginalVersion));

    let err = store
        .write("a1", credited(10)?, 0)
        .await
        .expect_err("write should fail after head advanced");

    assert!(matches!(err, StoreError::UnexpectedOriginalVersion));
    assert_eq!(store.read("a1").await?.len(), 1);

    Ok(())
}

pub async fn test_concurrency(store: &Store) -> anyhow::Result<()> {
    store.write("a1", created("john.doe")?, 0).await?;

    let writes = vec![
        store.write("a1", credited(10)?, 1),
        store.write("a1", credited(20)?, 1),
    ];

    let results = join_all(writes).await;
    let won = results.iter().filter(|res| res.is_ok()).count();

    assert_eq!(won, 1);
    assert!(results.iter().any(|res| matches!(
        res,
        Err(StoreError::UnexpectedOriginalVersion)
    )));
    assert_eq!(store.version_of("a1").await?, 2);

    Ok(())
}

pub async fn test_read_all(store: &Store) -> anyhow::Result<()> {
    store.write("a1", created("john.doe")?, 0).await?;
    store.write("a1", credited(100)?, 1).await?;
    store.write("dep1", deposit("a1", 50)?, 0).await?;

    let events = store.read_all(100, None, None).await?;
    assert_eq!(events.len(), 3);

    let deposits = store
        .read_all(100, None, Some(&[AggregateType::Deposit]))
        .await?;

    assert_eq!(deposits.len(), 1);
    assert_eq!(deposits[0].aggregate_id, "dep1");

    // Cursor pagination walks the feed without skipping or repeating.
    let page = store.read_all(2, None, None).await?;
    assert_eq!(page.len(), 2);

    let rest = store.read_all(2, Some(page[1].id), None).await?;
    assert_eq!(rest.len(), 1);
    assert!(!page.iter().any(|e| e.id == rest[0].id));

    Ok(())
}

pub async fn test_insert_and_last(store: &Store) -> anyhow::Result<()> {
    assert!(store.last().await?.is_none());

    let event = Event {
        name: "DepositCreated".to_owned(),
        aggregate_id: "dep9".to_owned(),
        aggregate_type: AggregateType::Deposit,
        version: 1,
        ..Event::default()
    };

    store.insert(vec![event.clone()]).await?;

    let last = store.last().await?.expect("inserted event should be last");
    assert_eq!(last.id, event.id);

    Ok(())
}
