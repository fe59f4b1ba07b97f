//! The batch solver array and the per-member solver interface.

use rayon::prelude::*;

use crate::config::BatchConfig;

/// One simulation-solver instance, as seen by the batch layer.
///
/// The integrator behind this trait is out of this crate's hands; the
/// batch layer only needs evaluation, one-time precomputation and
/// configuration writes, each reporting an `i32` status with zero as
/// success. Statuses are summed across members, so failure codes should
/// be non-negative.
pub trait SimSolver: Send {
    /// Per-member input (shared across threads during a batch call).
    type Input: Sync;
    /// Per-member output.
    type Output: Send;

    /// Run one solve step.
    fn solve(&mut self, input: &Self::Input, output: &mut Self::Output) -> i32;

    /// One-time precomputation before the first solve.
    fn precompute(&mut self, input: &Self::Input, output: &mut Self::Output) -> i32;

    /// Write one configuration value into the member's memory.
    fn set(&mut self, field: &str, value: &[f64]) -> i32;
}

/// N independent solver members with a shared configuration and an
/// N-length status array.
#[derive(Debug)]
pub struct BatchSimSolver<S: SimSolver> {
    members: Vec<S>,
    status: Vec<i32>,
    config: BatchConfig,
}

impl<S: SimSolver> BatchSimSolver<S> {
    /// Build a batch from identically configured members.
    pub fn new(members: Vec<S>) -> Self {
        Self::with_config(members, BatchConfig::default())
    }

    /// Build a batch with an explicit dispatch configuration.
    pub fn with_config(members: Vec<S>, config: BatchConfig) -> Self {
        let n = members.len();
        log::info!("batch solver: {} members", n);
        Self { members, status: vec![0; n], config }
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True for an empty batch.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Per-member statuses from the last batch call. Inspect this to
    /// find out which member a nonzero aggregate came from.
    pub fn status(&self) -> &[i32] {
        &self.status
    }

    /// Sum of all member statuses.
    pub fn sum_status(&self) -> i32 {
        self.status.iter().sum()
    }

    /// Clear every member's status to 0.
    pub fn reset_status(&mut self) {
        self.status.fill(0);
    }

    /// Solve every member and return the summed status.
    ///
    /// Members are fully independent, so the loop fans out over rayon
    /// when the batch is at or above the configured threshold. Each
    /// thread writes only its own member, status slot and output.
    pub fn solve(&mut self, inputs: &[S::Input], outputs: &mut [S::Output]) -> i32 {
        self.check_io(inputs.len(), outputs.len());
        self.reset_status();

        let parallel = self.members.len() >= self.config.min_members_for_parallel
            && rayon::current_num_threads() > 1;
        if parallel {
            self.members
                .par_iter_mut()
                .zip(self.status.par_iter_mut())
                .zip(inputs.par_iter().zip(outputs.par_iter_mut()))
                .for_each(|((member, status), (input, output))| {
                    *status = member.solve(input, output);
                });
        } else {
            for (i, member) in self.members.iter_mut().enumerate() {
                self.status[i] = member.solve(&inputs[i], &mut outputs[i]);
            }
        }
        self.sum_status()
    }

    /// Run every member's one-time precomputation and return the summed
    /// status.
    pub fn precompute(&mut self, inputs: &[S::Input], outputs: &mut [S::Output]) -> i32 {
        self.check_io(inputs.len(), outputs.len());
        for (i, member) in self.members.iter_mut().enumerate() {
            self.status[i] = member.precompute(&inputs[i], &mut outputs[i]);
        }
        self.sum_status()
    }

    /// Broadcast one configuration value to every member and return the
    /// summed status.
    pub fn set(&mut self, field: &str, value: &[f64]) -> i32 {
        for (i, member) in self.members.iter_mut().enumerate() {
            self.status[i] = member.set(field, value);
        }
        self.sum_status()
    }

    fn check_io(&self, inputs: usize, outputs: usize) {
        assert_eq!(inputs, self.members.len(), "one input per batch member");
        assert_eq!(outputs, self.members.len(), "one output per batch member");
    }
}
