use ledger_store::{AggregateType, Event};

use crate::error::Result;

/// One step of the replay engine: a pure, total mapping from the previous
/// state and one event to the next state. `None` is the state before the
/// first event; invalid transitions surface as domain errors and must leave
/// no partial mutation behind.
pub trait Aggregate: Sized {
    fn aggregate_type() -> AggregateType;

    fn apply(state: Option<Self>, event: &Event) -> Result<Option<Self>>;
}

/// Left fold of an ordered event slice from the absent state.
///
/// Deterministic by construction: the same sequence always yields the same
/// final state, or the same error at the same position. Crash recovery and
/// the on-demand query path both rely on this agreeing with the command
/// side.
pub fn fold<'a, A, I>(events: I) -> Result<Option<A>>
where
    A: Aggregate,
    I: IntoIterator<Item = &'a Event>,
{
    events
        .into_iter()
        .try_fold(None, |state, event| A::apply(state, event))
}
