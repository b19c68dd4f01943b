//! A single [`Configuration`] value-struct replacing the compile-time flag soup of the
//! source implementation (`SPEC_FULL.md` §6a.3 / §11): constructed once by whatever parses
//! the `-precision`/`-compute-error-bound`/... command-line surface named in `spec.md` §6,
//! then passed by reference into every other crate in this workspace. No process-wide
//! mutable state.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// DOMAIN
// ================================================================================================

/// The optimization domain selected by `-compute-error-bound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Domain {
    /// `-compute-error-bound=none`: the optimizer bridge (C6) is disabled entirely.
    #[default]
    None,
    /// `-compute-error-bound=real`.
    Real,
    /// `-compute-error-bound=integer`.
    Integer,
}

impl Domain {
    pub fn is_enabled(self) -> bool {
        !matches!(self, Domain::None)
    }
}

// CONFIGURATION
// ================================================================================================

/// A set of parameters specifying how this core analyzes and bounds numerical error.
///
/// Mirrors the reference workspace's `ExecutionOptions`/`ProvingOptions` with-method
/// builder idiom (see `air::options`): construct with [`Configuration::new`], adjust with
/// `with_*` methods, and read back with plain accessors.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Configuration {
    domain: Domain,
    compute_real_solution: bool,
    uniform_input_error: bool,
    scaling: bool,
    optimize_divides: bool,
    math_calls: bool,
    debug_precision: bool,
    no_branch_check: bool,
    loop_breaking: bool,
    default_trip_count: i32,
    approximate_pointers: bool,
    multi_ktest: u32,
    #[cfg_attr(feature = "serde", serde(with = "duration_as_secs_f64"))]
    timeout: Duration,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            domain: Domain::None,
            compute_real_solution: false,
            uniform_input_error: false,
            scaling: false,
            optimize_divides: false,
            math_calls: false,
            debug_precision: false,
            no_branch_check: false,
            loop_breaking: false,
            default_trip_count: -1,
            approximate_pointers: false,
            multi_ktest: 0,
            timeout: Duration::ZERO,
        }
    }
}

impl Configuration {
    // CONSTRUCTOR
    // --------------------------------------------------------------------------------------------

    /// Creates a new [`Configuration`] with the given optimization domain and every other
    /// flag at its documented default (`spec.md` §6).
    pub fn new(domain: Domain) -> Self {
        Configuration { domain, ..Configuration::default() }
    }

    // BUILDER METHODS
    // --------------------------------------------------------------------------------------------

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    /// Corresponds to `-compute-real-solution`.
    pub fn with_compute_real_solution(mut self, enabled: bool) -> Self {
        self.compute_real_solution = enabled;
        self
    }

    /// Corresponds to `-uniform-input-error`. When `true`, the optimizer bridge does not
    /// request Pareto-optimal multi-objective solving (§4.6).
    pub fn with_uniform_input_error(mut self, enabled: bool) -> Self {
        self.uniform_input_error = enabled;
        self
    }

    /// Corresponds to `-scaling`.
    pub fn with_scaling(mut self, enabled: bool) -> Self {
        self.scaling = enabled;
        self
    }

    /// Rewrites constant-divisor error terms to shift/multiply-by-reciprocal form (§4.3);
    /// has no CLI-surfaced flag of its own in `spec.md` §6, it is a compile-time option
    /// there, carried here as a runtime one since this core has no compile-time flags.
    pub fn with_optimize_divides(mut self, enabled: bool) -> Self {
        self.optimize_divides = enabled;
        self
    }

    /// Corresponds to `-math-calls`.
    pub fn with_math_calls(mut self, enabled: bool) -> Self {
        self.math_calls = enabled;
        self
    }

    /// Corresponds to `-debug-precision`.
    pub fn with_debug_precision(mut self, enabled: bool) -> Self {
        self.debug_precision = enabled;
        self
    }

    /// Corresponds to `-no-branch-check`.
    pub fn with_no_branch_check(mut self, enabled: bool) -> Self {
        self.no_branch_check = enabled;
        self
    }

    /// Corresponds to `-loop-breaking`. This core does not itself implement loop breaking
    /// (out of scope, `spec.md` §1); the flag is recorded so an embedding application can
    /// hand it to that collaborator.
    pub fn with_loop_breaking(mut self, enabled: bool) -> Self {
        self.loop_breaking = enabled;
        self
    }

    /// Corresponds to `-default-trip-count`. Only meaningful together with
    /// [`Configuration::with_loop_breaking`].
    pub fn with_default_trip_count(mut self, trip_count: i32) -> Self {
        self.default_trip_count = trip_count;
        self
    }

    /// Corresponds to `-approximate-pointers`. Recorded for interface completeness; this
    /// core does not act on it (pointer modeling is an interpreter concern).
    pub fn with_approximate_pointers(mut self, enabled: bool) -> Self {
        self.approximate_pointers = enabled;
        self
    }

    /// Corresponds to `-multi-ktest`. Recorded for interface completeness; ktest emission
    /// is out of scope (`spec.md` §1).
    pub fn with_multi_ktest(mut self, count: u32) -> Self {
        self.multi_ktest = count;
        self
    }

    /// Corresponds to the solver `timeout`. A zero duration means "no limit" (§4.6).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    // ACCESSORS
    // --------------------------------------------------------------------------------------------

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn compute_real_solution(&self) -> bool {
        self.compute_real_solution
    }

    pub fn uniform_input_error(&self) -> bool {
        self.uniform_input_error
    }

    pub fn scaling(&self) -> bool {
        self.scaling
    }

    pub fn optimize_divides(&self) -> bool {
        self.optimize_divides
    }

    pub fn math_calls(&self) -> bool {
        self.math_calls
    }

    pub fn debug_precision(&self) -> bool {
        self.debug_precision
    }

    pub fn no_branch_check(&self) -> bool {
        self.no_branch_check
    }

    pub fn loop_breaking(&self) -> bool {
        self.loop_breaking
    }

    pub fn default_trip_count(&self) -> i32 {
        self.default_trip_count
    }

    pub fn approximate_pointers(&self) -> bool {
        self.approximate_pointers
    }

    pub fn multi_ktest(&self) -> u32 {
        self.multi_ktest
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Converts [`Configuration::timeout`] to the millisecond solver parameter described in
    /// §4.6: round-half-up, with a zero duration encoded as "no limit" (`u32::MAX`).
    pub fn timeout_millis(&self) -> u32 {
        if self.timeout.is_zero() {
            return u32::MAX;
        }
        let millis_f = self.timeout.as_secs_f64() * 1000.0;
        (millis_f + 0.5).floor() as u32
    }
}

#[cfg(feature = "serde")]
mod duration_as_secs_f64 {
    use super::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_millis_rounds_half_up() {
        let cfg = Configuration::default().with_timeout(Duration::from_secs_f64(1.0005));
        assert_eq!(cfg.timeout_millis(), 1001);
    }

    #[test]
    fn zero_timeout_means_no_limit() {
        let cfg = Configuration::default().with_timeout(Duration::ZERO);
        assert_eq!(cfg.timeout_millis(), u32::MAX);
    }

    #[test]
    fn default_matches_documented_cli_defaults() {
        let cfg = Configuration::default();
        assert_eq!(cfg.domain(), Domain::None);
        assert!(!cfg.compute_real_solution());
        assert!(!cfg.uniform_input_error());
        assert!(!cfg.scaling());
        assert_eq!(cfg.default_trip_count(), -1);
        assert_eq!(cfg.multi_ktest(), 0);
    }
}
