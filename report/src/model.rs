use precision_optimizer::BoundKind;

/// Whether a bound request's feasibility check held or was violated, or whether the
/// solver could not decide (`spec.md` §7: `SolverTimeout`/`SolverFailure` are reported as
/// `UNKNOWN`, execution continues).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundStatus {
    Holds,
    Violated,
    Unknown,
}

impl BoundStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BoundStatus::Holds => "HOLDS",
            BoundStatus::Violated => "VIOLATED",
            BoundStatus::Unknown => "UNKNOWN",
        }
    }
}

/// The function name and argument-expression text recovered from a
/// `precision_error_state::MathCallRecord`, reconstructed into a human-readable formula
/// (§4.7 "if the input traces back to a math-call record").
#[derive(Debug, Clone, PartialEq)]
pub struct MathCallFormula {
    pub function_name: String,
    pub arguments: Vec<String>,
}

/// One reported input's decoded bound, plus the optional raw rational numerator/
/// denominator pair emitted to the `.reals` sibling file when
/// `Configuration::compute_real_solution` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportedInput {
    pub name: String,
    pub kind: BoundKind,
    pub value: f64,
    pub rational: Option<(i64, i64)>,
    pub math_call: Option<MathCallFormula>,
}

impl ReportedInput {
    fn kind_str(&self) -> &'static str {
        match self.kind {
            BoundKind::Finite => "FINITE",
            BoundKind::Infinity => "INFINITY",
            BoundKind::Epsilon => "EPSILON",
        }
    }
}

/// Everything needed to render one completed bound request's `.errors` block (and, if
/// applicable, its `.reals` block): source location, bound name and literal, the decoded
/// holds/violated/unknown status, and one [`ReportedInput`] per input-error variable
/// (§4.7).
#[derive(Debug, Clone, PartialEq)]
pub struct ReportedBound {
    pub name: String,
    pub source_file: Option<String>,
    pub source_line: u32,
    pub bound_literal: f64,
    pub status: BoundStatus,
    pub inputs: Vec<ReportedInput>,
}

impl ReportedBound {
    /// The line-oriented `.errors` format (§6): one header line, one line per input
    /// (`<name> <kind> <value>`), with the caller responsible for the blank line
    /// separating successive bounds (see [`crate::Reporter::render_errors`]).
    pub(crate) fn render_errors_block(&self) -> String {
        let location = match &self.source_file {
            Some(file) => format!("{file}:{}", self.source_line),
            None => format!("<unknown>:{}", self.source_line),
        };
        let mut out = format!(
            "{name} at {location} bound={bound} status={status}\n",
            name = self.name,
            bound = self.bound_literal,
            status = self.status.as_str(),
        );
        for input in &self.inputs {
            out.push_str(&format!("{} {} {}\n", input.name, input.kind_str(), input.value));
            if let Some(math_call) = &input.math_call {
                out.push_str(&format!(
                    "  via {}({})\n",
                    math_call.function_name,
                    math_call.arguments.join(", ")
                ));
            }
        }
        out
    }

    /// The `.reals` sibling block: raw rational numerator/denominator pairs for every
    /// input that has one (§4.7 "if `computeRealSolution=true`").
    pub(crate) fn render_reals_block(&self) -> Option<String> {
        let mut out = String::new();
        let mut any = false;
        for input in &self.inputs {
            if let Some((numerator, denominator)) = input.rational {
                any = true;
                out.push_str(&format!("{} {}/{}\n", input.name, numerator, denominator));
            }
        }
        any.then_some(out)
    }
}
