use crate::api::{FinalReducer, Mapper, Reducer};
use crate::stats::{MapStats, PipelineStats, ReduceStats};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{info, warn};

/// Executes the stages of one aggregation job.
///
/// Stages run strictly in declared order with a full barrier between
/// them: the shuffle groups every map emission by key before any reducer
/// runs, and a final stage only ever sees the complete reduce output.
/// Map calls fan out per record and reduce calls fan out per key group;
/// results always come back in key order, so a run is deterministic for
/// a given input.
pub struct Pipeline {
    name: String,
    stats: PipelineStats,
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stats: PipelineStats::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Run one map stage and the reduce stage grouped on its keys.
    pub fn map_reduce<M, R>(&mut self, inputs: &[M::Input], mapper: &M, reducer: &R) -> Vec<R::Out>
    where
        M: Mapper + Sync,
        M::Input: Sync,
        R: Reducer<Key = M::Key, ValueIn = M::Value> + Sync,
    {
        let groups = self.run_map(inputs, mapper);
        self.run_reduce(groups, reducer)
    }

    /// Run the single-group final stage over the complete output of the
    /// previous stage.
    pub fn finalize<F>(&mut self, inputs: Vec<F::In>, reducer: &F) -> F::Out
    where
        F: FinalReducer,
    {
        let start = Instant::now();
        let records_in = inputs.len() as u64;
        let out = reducer.reduce(inputs);
        info!(
            pipeline = %self.name,
            phase = "finalize",
            records_in,
            wall_ms = start.elapsed().as_millis() as u64,
            "Final reduce complete"
        );
        out
    }

    fn run_map<M>(&mut self, inputs: &[M::Input], mapper: &M) -> BTreeMap<M::Key, Vec<M::Value>>
    where
        M: Mapper + Sync,
        M::Input: Sync,
    {
        let start = Instant::now();
        let mapped: Vec<_> = inputs.par_iter().map(|record| mapper.map(record)).collect();

        // Shuffle: group by key, in emission order within each key.
        let mut groups: BTreeMap<M::Key, Vec<M::Value>> = BTreeMap::new();
        let mut emits = 0u64;
        let mut filtered = 0u64;
        let mut faults = 0u64;
        for outcome in mapped {
            match outcome {
                Ok(Some((key, value))) => {
                    groups.entry(key).or_default().push(value);
                    emits += 1;
                }
                Ok(None) => filtered += 1,
                Err(e) => {
                    faults += 1;
                    warn!(pipeline = %self.name, error = %e, "skipping record that failed to map");
                }
            }
        }

        let stats = MapStats {
            records_in: inputs.len() as u64,
            emits,
            filtered,
            faults,
            wall_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            pipeline = %self.name,
            phase = "map",
            records_in = stats.records_in,
            emits,
            filtered,
            faults,
            wall_ms = stats.wall_ms,
            "Map phase complete"
        );
        self.stats.map.push(stats);
        groups
    }

    fn run_reduce<R>(&mut self, groups: BTreeMap<R::Key, Vec<R::ValueIn>>, reducer: &R) -> Vec<R::Out>
    where
        R: Reducer + Sync,
    {
        let start = Instant::now();
        let n_groups = groups.len() as u64;
        let grouped: Vec<(R::Key, Vec<R::ValueIn>)> = groups.into_iter().collect();
        let results: Vec<Option<R::Out>> = grouped
            .into_par_iter()
            .map(|(key, values)| reducer.reduce(&key, values))
            .collect();
        let out: Vec<R::Out> = results.into_iter().flatten().collect();

        let stats = ReduceStats {
            groups: n_groups,
            results: out.len() as u64,
            wall_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            pipeline = %self.name,
            phase = "reduce",
            groups = stats.groups,
            results = stats.results,
            wall_ms = stats.wall_ms,
            "Reduce phase complete"
        );
        self.stats.reduce.push(stats);
        out
    }
}
