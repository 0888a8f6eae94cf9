//! Engine configuration.
//!
//! A single read-only value threaded through construction; components copy
//! the fields they need.

/// Tunables shared by cost functions, solvers and selectors.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Convergence bound for the penalization binary search, and the
    /// denominator guard of the exponential cost.
    pub epsilon: f64,
    /// Cost sentinel returned for empty ranges.
    pub infinity: f64,
    /// Hard ceiling on the number of changepoints a selector may consider.
    pub changepoints_bound: usize,
    /// Sample tolerance when matching predicted against known changepoints.
    pub window_threshold: usize,
    /// Tolerance factor of the elbow heuristic.
    pub elbow_tolerance: f64,
    /// Fallback penalization for synthetic cases.
    pub synthetic_penalization: f64,
    /// Fallback penalization for real-world cases.
    pub real_penalization: f64,
    /// Fallback cap on the number of changepoints.
    pub default_max_changepoints: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            infinity: 1e12,
            changepoints_bound: 250,
            window_threshold: 10,
            elbow_tolerance: 1.01,
            synthetic_penalization: 0.1,
            real_penalization: 7.5,
            default_max_changepoints: 50,
        }
    }
}
