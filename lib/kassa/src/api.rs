use anyhow::Result;

// ========== Core map/reduce stage traits ==========

/// Map stage: transforms one input record into zero or one key/value
/// emission.
///
/// Returning `Ok(None)` filters the record out of the job. An `Err` marks
/// the record as faulty; the runtime logs it and moves on, so one poison
/// row cannot abort a batch job.
pub trait Mapper {
    type Input;
    type Key: Ord + Send;
    type Value: Send;

    fn map(&self, input: &Self::Input) -> Result<Option<(Self::Key, Self::Value)>>;
}

/// Reduce stage: receives every value emitted for `key` in a single call.
///
/// The runtime guarantees the grouping is exhaustive and exact: no
/// partial groups, no key split across calls. Values arrive in the fixed
/// order the shuffle assembled for this run; reducers that need a
/// particular order must sort.
pub trait Reducer {
    type Key: Ord + Send;
    type ValueIn: Send;
    type Out: Send;

    fn reduce(&self, key: &Self::Key, values: Vec<Self::ValueIn>) -> Option<Self::Out>;
}

/// Final single-group stage: consumes the complete, ordered output of the
/// previous reduce stage at once. Used for global aggregates that must
/// see every group's result simultaneously, such as top-k selection.
pub trait FinalReducer {
    type In;
    type Out;

    fn reduce(&self, inputs: Vec<Self::In>) -> Self::Out;
}
