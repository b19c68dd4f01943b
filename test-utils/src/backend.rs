use precision_optimizer::{RawCheckResult, RawObjectiveResult, RawOptimizeResult, SolverBackend};

/// A [`SolverBackend`] that returns pre-scripted responses in call order instead of
/// talking to an actual SMT process, so `precision-optimizer`/`precision-core` tests can
/// exercise the §4.6 response-handling table deterministically. Defaults to `Unsat`/empty
/// once its script runs dry, matching "the bound holds, nothing to maximize" rather than
/// panicking, since most tests only care about scripting the one call under test.
#[derive(Debug, Default)]
pub struct MockSolverBackend {
    timeout_millis: u32,
    check_script: Vec<RawCheckResult>,
    optimize_script: Vec<RawOptimizeResult>,
    check_calls: Vec<(Vec<String>, Vec<String>)>,
    optimize_calls: Vec<(Vec<String>, Vec<String>, Vec<String>, bool)>,
}

impl MockSolverBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one `check_sat` response, consumed in FIFO order.
    pub fn push_check_result(mut self, result: RawCheckResult) -> Self {
        self.check_script.push(result);
        self
    }

    /// Queues one `optimize` response, consumed in FIFO order.
    pub fn push_optimize_result(mut self, result: RawOptimizeResult) -> Self {
        self.optimize_script.push(result);
        self
    }

    pub fn timeout_millis(&self) -> u32 {
        self.timeout_millis
    }

    pub fn check_call_count(&self) -> usize {
        self.check_calls.len()
    }

    pub fn optimize_call_count(&self) -> usize {
        self.optimize_calls.len()
    }

    /// The `(declarations, assertions, objectives, pareto)` tuple passed to the most
    /// recent `optimize` call, for tests that assert on what the bridge rendered.
    pub fn last_optimize_call(&self) -> Option<&(Vec<String>, Vec<String>, Vec<String>, bool)> {
        self.optimize_calls.last()
    }
}

impl SolverBackend for MockSolverBackend {
    fn set_timeout_millis(&mut self, millis: u32) {
        self.timeout_millis = millis;
    }

    fn check_sat(&mut self, declarations: &[String], assertions: &[String]) -> RawCheckResult {
        self.check_calls.push((declarations.to_vec(), assertions.to_vec()));
        if self.check_script.is_empty() {
            return RawCheckResult::Unsat;
        }
        self.check_script.remove(0)
    }

    fn optimize(
        &mut self,
        declarations: &[String],
        assertions: &[String],
        objectives: &[String],
        pareto: bool,
    ) -> RawOptimizeResult {
        self.optimize_calls.push((declarations.to_vec(), assertions.to_vec(), objectives.to_vec(), pareto));
        if self.optimize_script.is_empty() {
            return RawOptimizeResult { status: RawCheckResult::Unsat, objectives: Vec::new() };
        }
        self.optimize_script.remove(0)
    }
}

/// Convenience constructor for a [`RawObjectiveResult`] carrying a plain integer numeral,
/// the common case in tests that don't care about the rational fallback (§10 point 5).
pub fn int_objective(value: i64) -> RawObjectiveResult {
    RawObjectiveResult { inf_coef: 0, value: precision_optimizer::Numeral::Int(value), eps_coef: 0 }
}

/// Convenience constructor for a [`RawObjectiveResult`] decoding to `kind=INFINITY`.
pub fn infinite_objective() -> RawObjectiveResult {
    RawObjectiveResult { inf_coef: 1, value: precision_optimizer::Numeral::Int(0), eps_coef: 0 }
}
