use ledger_store::{AggregateType, Event};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    account::{Account, AccountCreated, AccountEvent, AccountUpdated, BalanceCredited, BalanceDebited},
    action::{ActionCreated, DepositEvent, WithdrawalEvent},
    error::Result,
};

/// Profile plus approved totals recomputed straight from a raw event slice.
///
/// Intentionally redundant with the materialized read model: this is the
/// audit/backfill path that does not trust the projection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountInformation {
    pub username: String,
    pub full_name: String,
    pub password: String,
    pub email: String,
    pub total_approved_deposit_amount: i64,
    pub total_approved_withdrawal_amount: i64,
}

/// Signed sum of `BalanceCredited`/`BalanceDebited` amounts for one
/// account. No negative-balance enforcement: the events were already
/// validated at write time.
pub fn calculate_account_balance(events: &[Event], account_id: &str) -> Result<i64> {
    let mut balance = 0;

    for event in events.iter().filter(|e| e.aggregate_id == account_id) {
        match event.name.parse::<AccountEvent>() {
            Ok(AccountEvent::BalanceCredited) => {
                let data: BalanceCredited = event.to_data()?;
                balance += data.amount;
            }
            Ok(AccountEvent::BalanceDebited) => {
                let data: BalanceDebited = event.to_data()?;
                balance -= data.amount;
            }
            _ => {}
        }
    }

    Ok(balance)
}

/// Recomputes the profile with the same truthy-overwrite merge the
/// aggregate uses, then accumulates the amounts of deposit/withdrawal
/// actions addressed to this account that progressed past creation — an
/// action aggregate with more than one event in the slice has at least a
/// `Created` + `Approved` pair.
///
/// `None` when the slice holds no profile event for the id.
pub fn get_account_information(
    events: &[Event],
    account_id: &str,
) -> Result<Option<AccountInformation>> {
    let mut profile: Option<Account> = None;

    for event in events.iter().filter(|e| e.aggregate_id == account_id) {
        match (event.name.parse::<AccountEvent>(), &mut profile) {
            (Ok(AccountEvent::AccountCreated), None) => {
                let data: AccountCreated = event.to_data()?;

                profile = Some(Account {
                    username: data.username,
                    full_name: data.full_name,
                    password: data.password,
                    email: data.email,
                    balance: 0,
                });
            }
            (Ok(AccountEvent::AccountUpdated), Some(account)) => {
                let data: AccountUpdated = event.to_data()?;
                account.merge_update(&data);
            }
            _ => {}
        }
    }

    let Some(profile) = profile else {
        return Ok(None);
    };

    let mut occurrences: HashMap<&str, usize> = HashMap::new();

    for event in events {
        *occurrences.entry(event.aggregate_id.as_str()).or_default() += 1;
    }

    let mut total_approved_deposit_amount = 0;
    let mut total_approved_withdrawal_amount = 0;

    for event in events {
        let approved = occurrences
            .get(event.aggregate_id.as_str())
            .map(|count| *count > 1)
            .unwrap_or(false);

        if !approved {
            continue;
        }

        match event.aggregate_type {
            AggregateType::Deposit
                if matches!(event.name.parse(), Ok(DepositEvent::DepositCreated)) =>
            {
                let data: ActionCreated = event.to_data()?;

                if data.account == account_id {
                    total_approved_deposit_amount += data.amount;
                }
            }
            AggregateType::Withdrawal
                if matches!(event.name.parse(), Ok(WithdrawalEvent::WithdrawalCreated)) =>
            {
                let data: ActionCreated = event.to_data()?;

                if data.account == account_id {
                    total_approved_withdrawal_amount += data.amount;
                }
            }
            _ => {}
        }
    }

    Ok(Some(AccountInformation {
        username: profile.username,
        full_name: profile.full_name,
        password: profile.password,
        email: profile.email,
        total_approved_deposit_amount,
        total_approved_withdrawal_amount,
    }))
}
