//! Batch simulation-solver array.
//!
//! Replicates one solver configuration across N independent members and
//! dispatches evaluation over all of them in a single call. Members
//! share nothing but configuration: each has its own memory and its own
//! slot in the status array, so the evaluation loop is embarrassingly
//! parallel and runs on rayon's thread pool when the batch is large
//! enough to pay for it.
//!
//! A member's numeric failure is not fatal to its siblings: it lands in
//! that member's status slot and in the summed aggregate (zero means
//! every member succeeded).

pub mod config;
pub mod solver;

pub use config::BatchConfig;
pub use solver::{BatchSimSolver, SimSolver};
