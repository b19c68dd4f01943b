//! The Reporter (C7): renders completed bound requests into the `.errors` (always) and
//! `.reals` (when `-compute-real-solution` is set) textual artifacts of `spec.md` §4.7/§6.

mod errors;
mod model;

use std::fs;
use std::path::Path;

pub use errors::ReportError;
pub use model::{BoundStatus, MathCallFormula, ReportedBound, ReportedInput};

/// Stateless renderer/writer for [`ReportedBound`]s. `compute_real_solution` mirrors
/// `-compute-real-solution`: when unset, [`Reporter::write_reals`] is a no-op that never
/// touches the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    compute_real_solution: bool,
}

impl Reporter {
    pub fn new(compute_real_solution: bool) -> Self {
        Self { compute_real_solution }
    }

    /// Concatenates every bound's `.errors` block, blank-line separated (§6 "blank line
    /// separating bounds").
    pub fn render_errors(&self, bounds: &[ReportedBound]) -> String {
        bounds.iter().map(ReportedBound::render_errors_block).collect::<Vec<_>>().join("\n")
    }

    /// Concatenates every bound's `.reals` block. Returns `None` when
    /// `compute_real_solution` is unset, or when no bound has a finite rational value to
    /// report.
    pub fn render_reals(&self, bounds: &[ReportedBound]) -> Option<String> {
        if !self.compute_real_solution {
            return None;
        }
        let blocks: Vec<String> = bounds.iter().filter_map(ReportedBound::render_reals_block).collect();
        (!blocks.is_empty()).then(|| blocks.join("\n"))
    }

    /// Writes `<testcase>.errors`, always performed when at least one bound was reported.
    pub fn write_errors(&self, path: &Path, bounds: &[ReportedBound]) -> Result<(), ReportError> {
        let text = self.render_errors(bounds);
        fs::write(path, text).map_err(|source| ReportError::Io { path: path.to_owned(), source })?;
        tracing::debug!(path = %path.display(), bounds = bounds.len(), "wrote .errors artifact");
        Ok(())
    }

    /// Writes `<testcase>.reals` iff `compute_real_solution` is set and there is content
    /// to write.
    pub fn write_reals(&self, path: &Path, bounds: &[ReportedBound]) -> Result<(), ReportError> {
        let Some(text) = self.render_reals(bounds) else {
            return Ok(());
        };
        fs::write(path, text).map_err(|source| ReportError::Io { path: path.to_owned(), source })?;
        tracing::debug!(path = %path.display(), "wrote .reals artifact");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use precision_optimizer::BoundKind;

    fn sample(status: BoundStatus) -> ReportedBound {
        ReportedBound {
            name: "c".into(),
            source_file: Some("prog.c".into()),
            source_line: 12,
            bound_literal: 1e-6,
            status,
            inputs: vec![ReportedInput {
                name: "_fractional_error_a".into(),
                kind: BoundKind::Finite,
                value: 2e-8,
                rational: Some((1, 50_000_000)),
                math_call: None,
            }],
        }
    }

    #[test]
    fn errors_block_has_a_header_and_one_line_per_input() {
        let reporter = Reporter::new(false);
        let rendered = reporter.render_errors(&[sample(BoundStatus::Holds)]);
        insta::assert_snapshot!(rendered, @r"
        c at prog.c:12 bound=0.000001 status=HOLDS
        _fractional_error_a FINITE 0.00000002
        ");
    }

    #[test]
    fn reals_block_is_absent_unless_compute_real_solution_is_set() {
        let bounds = [sample(BoundStatus::Holds)];
        assert_eq!(Reporter::new(false).render_reals(&bounds), None);
        let rendered = Reporter::new(true).render_reals(&bounds).unwrap();
        insta::assert_snapshot!(rendered, @r"
        _fractional_error_a 1/50000000
        ");
    }

    #[test]
    fn multiple_bounds_are_separated_by_a_blank_line() {
        let reporter = Reporter::new(false);
        let rendered = reporter.render_errors(&[sample(BoundStatus::Holds), sample(BoundStatus::Violated)]);
        insta::assert_snapshot!(rendered, @r"
        c at prog.c:12 bound=0.000001 status=HOLDS
        _fractional_error_a FINITE 0.00000002

        c at prog.c:12 bound=0.000001 status=VIOLATED
        _fractional_error_a FINITE 0.00000002
        ");
    }

    #[test]
    fn math_call_formula_is_rendered_beneath_its_input() {
        let mut bound = sample(BoundStatus::Holds);
        bound.inputs[0].math_call =
            Some(MathCallFormula { function_name: "sin".into(), arguments: vec!["x".into()] });
        let rendered = Reporter::new(false).render_errors(&[bound]);
        insta::assert_snapshot!(rendered, @r"
        c at prog.c:12 bound=0.000001 status=HOLDS
        _fractional_error_a FINITE 0.00000002
          via sin(x)
        ");
    }
}
