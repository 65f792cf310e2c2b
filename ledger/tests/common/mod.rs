#![allow(dead_code)]

use ledger::{
    AccountCreated, AccountEvent, AccountUpdated, ActionCreated, DepositEvent, WithdrawalEvent,
};
use ledger_store::{AggregateType, Event};
use serde_json::Value;

pub fn profile(username: &str) -> AccountCreated {
    AccountCreated {
        username: username.to_owned(),
        full_name: format!("{username} doe"),
        password: "azerty".to_owned(),
        email: format!("{username}@example.com"),
    }
}

pub fn event(
    aggregate_id: &str,
    aggregate_type: AggregateType,
    name: impl Into<String>,
    version: i32,
    data: Value,
) -> Event {
    Event {
        name: name.into(),
        aggregate_id: aggregate_id.to_owned(),
        aggregate_type,
        version,
        data,
        ..Event::default()
    }
}

pub fn account_created(id: &str, username: &str, version: i32) -> Event {
    event(
        id,
        AggregateType::Account,
        AccountEvent::AccountCreated,
        version,
        serde_json::to_value(profile(username)).unwrap(),
    )
}

pub fn account_updated(id: &str, update: AccountUpdated, version: i32) -> Event {
    event(
        id,
        AggregateType::Account,
        AccountEvent::AccountUpdated,
        version,
        serde_json::to_value(update).unwrap(),
    )
}

pub fn balance_credited(id: &str, amount: i64, version: i32) -> Event {
    event(
        id,
        AggregateType::Account,
        AccountEvent::BalanceCredited,
        version,
        serde_json::json!({ "amount": amount }),
    )
}

pub fn balance_debited(id: &str, amount: i64, version: i32) -> Event {
    event(
        id,
        AggregateType::Account,
        AccountEvent::BalanceDebited,
        version,
        serde_json::json!({ "amount": amount }),
    )
}

pub fn deposit_created(id: &str, account: &str, amount: i64) -> Event {
    event(
        id,
        AggregateType::Deposit,
        DepositEvent::DepositCreated,
        1,
        serde_json::to_value(ActionCreated {
            account: account.to_owned(),
            amount,
        })
        .unwrap(),
    )
}

pub fn deposit_approved(id: &str) -> Event {
    event(
        id,
        AggregateType::Deposit,
        DepositEvent::DepositApproved,
        2,
        serde_json::json!({}),
    )
}

pub fn withdrawal_created(id: &str, account: &str, amount: i64) -> Event {
    event(
        id,
        AggregateType::Withdrawal,
        WithdrawalEvent::WithdrawalCreated,
        1,
        serde_json::to_value(ActionCreated {
            account: account.to_owned(),
            amount,
        })
        .unwrap(),
    )
}

pub fn withdrawal_approved(id: &str) -> Event {
    event(
        id,
        AggregateType::Withdrawal,
        WithdrawalEvent::WithdrawalApproved,
        2,
        serde_json::json!({}),
    )
}
