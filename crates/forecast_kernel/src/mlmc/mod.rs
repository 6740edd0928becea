//! Multilevel Monte Carlo estimation.
//!
//! Combines simulations at `2^l` steps for `l = 0..=max_level` through the
//! telescoping sum `E[S_L] = E[S_0] + Σ E[S_l - S_{l-1}]`. The sample count of
//! every level is a fixed input ([`SampleAllocation`](crate::SampleAllocation)).
//!
//! Two pairings of the fine/coarse samples are offered through [`Coupling`]:
//! `Independent` (the default) draws both sets separately, `Coupled` derives
//! each coarse path from its fine partner's increments.

pub mod estimator;
pub mod report;

pub use estimator::{estimate, Coupling, MultilevelEstimator};
pub use report::{LevelDiagnostics, MultilevelReport};
