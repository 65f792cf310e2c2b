use async_trait::async_trait;
use ledger_store::{AggregateType, Event};
use tracing::debug;

use crate::{
    account::{Account, AccountCreated, AccountEvent, AccountUpdated, BalanceCredited, BalanceDebited},
    action::{ActionCreated, DepositEvent, WithdrawalEvent},
    consumer::Handler,
    error::{Error, Result},
    read_model::{AccountDocument, ReadModelStore},
};

/// Projects account, deposit and withdrawal events into the read model and
/// reconciles the two-phase deposit/withdrawal lifecycle against it.
///
/// Account events mirror the aggregate fold; deposit/withdrawal `*Created`
/// events park their signed amount in the document's pending counter and
/// `*Approved` events move that counter into the matching approved running
/// total, correlated by `counter_id`.
#[derive(Clone)]
pub struct AccountProjection {
    store: Box<dyn ReadModelStore>,
}

impl AccountProjection {
    pub fn new<S: ReadModelStore + 'static>(store: S) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub async fn apply(&self, event: &Event) -> Result<()> {
        match event.aggregate_type {
            AggregateType::Account => self.apply_account(event).await,
            AggregateType::Deposit => self.apply_deposit(event).await,
            AggregateType::Withdrawal => self.apply_withdrawal(event).await,
        }
    }

    async fn apply_account(&self, event: &Event) -> Result<()> {
        let Ok(name) = event.name.parse::<AccountEvent>() else {
            return Ok(());
        };

        let Some(mut document) = self.store.get(&event.aggregate_id).await? else {
            if name != AccountEvent::AccountCreated {
                return Err(Error::AccountNotFound(event.aggregate_id.to_owned()));
            }

            let data: AccountCreated = event.to_data()?;

            let mut document = AccountDocument::new(
                &event.aggregate_id,
                Account {
                    username: data.username,
                    full_name: data.full_name,
                    password: data.password,
                    email: data.email,
                    balance: 0,
                },
            );
            document.mark(&event.aggregate_id, event.version);

            return self.store.create(document).await;
        };

        if document.seen(&event.aggregate_id, event.version) {
            debug!(
                "skip redelivered event id={}, name={}, sequence={}",
                event.aggregate_id, event.name, event.version
            );
            return Ok(());
        }

        match name {
            AccountEvent::AccountCreated => {
                return Err(Error::AccountAlreadyExists(event.aggregate_id.to_owned()));
            }
            AccountEvent::AccountUpdated => {
                let data: AccountUpdated = event.to_data()?;
                document.account.merge_update(&data);
            }
            AccountEvent::BalanceCredited => {
                let data: BalanceCredited = event.to_data()?;
                document.account.balance += data.amount;
            }
            AccountEvent::BalanceDebited => {
                let data: BalanceDebited = event.to_data()?;
                let balance = document.account.balance - data.amount;

                if balance < 0 {
                    return Err(Error::InsufficientFund(event.aggregate_id.to_owned()));
                }

                document.account.balance = balance;
            }
        }

        document.mark(&event.aggregate_id, event.version);

        self.store.update(document).await
    }

    async fn apply_deposit(&self, event: &Event) -> Result<()> {
        let Ok(name) = event.name.parse::<DepositEvent>() else {
            return Ok(());
        };

        match name {
            DepositEvent::DepositCreated => self.action_created(event, 1).await,
            DepositEvent::DepositApproved => self.action_approved(event, true).await,
        }
    }

    async fn apply_withdrawal(&self, event: &Event) -> Result<()> {
        let Ok(name) = event.name.parse::<WithdrawalEvent>() else {
            return Ok(());
        };

        match name {
            WithdrawalEvent::WithdrawalCreated => self.action_created(event, -1).await,
            WithdrawalEvent::WithdrawalApproved => self.action_approved(event, false).await,
        }
    }

    /// Signed delta of the created action lands on the pending counter and
    /// the correlation slot is overwritten: the last pending action wins
    /// when several are in flight, a documented limitation of the single
    /// counter slot.
    async fn action_created(&self, event: &Event, sign: i64) -> Result<()> {
        let data: ActionCreated = event.to_data()?;

        let Some(mut document) = self.store.get(&data.account).await? else {
            return Err(Error::AccountNotFound(data.account));
        };

        if document.seen(&event.aggregate_id, event.version) {
            debug!(
                "skip redelivered event id={}, name={}, sequence={}",
                event.aggregate_id, event.name, event.version
            );
            return Ok(());
        }

        document.total_counter += sign * data.amount;
        document.counter_id = Some(event.aggregate_id.to_owned());
        document.mark(&event.aggregate_id, event.version);

        self.store.update(document).await
    }

    /// Moves the pending counter into the approved running total of the
    /// document whose `counter_id` matches the approved aggregate id. When
    /// no document carries that correlation any more (already reconciled,
    /// or redelivered after the reset) the approval is a no-op.
    async fn action_approved(&self, event: &Event, deposit: bool) -> Result<()> {
        let Some(mut document) = self.store.find_by_counter_id(&event.aggregate_id).await? else {
            return Ok(());
        };

        if document.seen(&event.aggregate_id, event.version) {
            return Ok(());
        }

        if deposit {
            document.total_approved_deposit_amount += document.total_counter;
        } else {
            // The pending counter of a withdrawal is negative; subtracting
            // accumulates the positive magnitude. When an overlapping
            // action of the other kind shares the slot, the counter is a
            // mixed sum and the negation can push the total below zero.
            document.total_approved_withdrawal_amount -= document.total_counter;
        }

        document.total_counter = 0;
        document.counter_id = None;
        document.mark(&event.aggregate_id, event.version);

        self.store.update(document).await
    }
}

#[async_trait]
impl Handler for AccountProjection {
    fn aggregate_types(&self) -> Vec<AggregateType> {
        vec![
            AggregateType::Account,
            AggregateType::Deposit,
            AggregateType::Withdrawal,
        ]
    }

    async fn handle(&self, event: Event) -> Result<()> {
        self.apply(&event).await
    }
}
