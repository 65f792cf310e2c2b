use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};

/// Deposit lifecycle: `DepositCreated` then, once the back office signs it
/// off, `DepositApproved` on the same aggregate id.
#[derive(Display, FromStr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositEvent {
    DepositCreated,
    DepositApproved,
}

impl From<DepositEvent> for String {
    fn from(value: DepositEvent) -> Self {
        value.to_string()
    }
}

#[derive(Display, FromStr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalEvent {
    WithdrawalCreated,
    WithdrawalApproved,
}

impl From<WithdrawalEvent> for String {
    fn from(value: WithdrawalEvent) -> Self {
        value.to_string()
    }
}

/// Body shared by `DepositCreated` and `WithdrawalCreated`: the targeted
/// account and the requested amount. Approval events carry no body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionCreated {
    pub account: String,
    pub amount: i64,
}
