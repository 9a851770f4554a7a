//! Result reporting
//!
//! The text formats are a stable contract: answer-finder output follows the
//! solver competition style (`s SATISFIABLE` plus `a <name>\t<value>` lines
//! and a terminating `a`), deduction output is `unsat`, or `sat` followed by
//! one `<name> <value>` line per forced answer key.

use crate::config::OutputFormat;
use crate::runner::{AnswerReport, DeductionReport, RunReport};
use anyhow::Result;
use std::io::Write;

/// Renders a run report into the configured output format
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn write<W: Write>(report: &RunReport, format: OutputFormat, writer: &mut W) -> Result<()> {
        match format {
            OutputFormat::Text => Self::write_text(report, writer),
            OutputFormat::Json => Self::write_json(report, writer),
        }
    }

    /// Render to a string; the text form is exactly what `write` emits
    pub fn render(report: &RunReport, format: OutputFormat) -> Result<String> {
        let mut buffer = Vec::new();
        Self::write(report, format, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    fn write_text<W: Write>(report: &RunReport, writer: &mut W) -> Result<()> {
        match report {
            RunReport::Answer(answer) => Self::write_answer_text(answer, writer),
            RunReport::Deduction(deduction) => Self::write_deduction_text(deduction, writer),
        }
    }

    fn write_answer_text<W: Write>(answer: &AnswerReport, writer: &mut W) -> Result<()> {
        if !answer.satisfiable {
            writeln!(writer, "s UNSATISFIABLE")?;
            return Ok(());
        }
        writeln!(writer, "s SATISFIABLE")?;
        for binding in &answer.values {
            writeln!(writer, "a {}\t{}", binding.name, binding.value)?;
        }
        writeln!(writer, "a")?;
        Ok(())
    }

    fn write_deduction_text<W: Write>(deduction: &DeductionReport, writer: &mut W) -> Result<()> {
        if !deduction.satisfiable {
            writeln!(writer, "unsat")?;
            return Ok(());
        }
        writeln!(writer, "sat")?;
        for binding in &deduction.forced {
            writeln!(writer, "{} {}", binding.name, binding.value)?;
        }
        Ok(())
    }

    fn write_json<W: Write>(report: &RunReport, writer: &mut W) -> Result<()> {
        match report {
            RunReport::Answer(answer) => serde_json::to_writer_pretty(&mut *writer, answer)?,
            RunReport::Deduction(deduction) => {
                serde_json::to_writer_pretty(&mut *writer, deduction)?
            }
        }
        writeln!(writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deduce::Binding;
    use crate::model::Value;

    #[test]
    fn test_answer_satisfiable_text() {
        let report = RunReport::Answer(AnswerReport {
            satisfiable: true,
            values: vec![
                Binding::new("x", Value::Int(3)),
                Binding::new("b", Value::Bool(false)),
            ],
        });

        let text = ReportFormatter::render(&report, OutputFormat::Text).unwrap();
        assert_eq!(text, "s SATISFIABLE\na x\t3\na b\tfalse\na\n");
    }

    #[test]
    fn test_answer_unsatisfiable_text() {
        let report = RunReport::Answer(AnswerReport {
            satisfiable: false,
            values: Vec::new(),
        });

        let text = ReportFormatter::render(&report, OutputFormat::Text).unwrap();
        assert_eq!(text, "s UNSATISFIABLE\n");
    }

    #[test]
    fn test_deduction_forced_text() {
        let report = RunReport::Deduction(DeductionReport {
            satisfiable: true,
            forced: vec![Binding::new("x", Value::Bool(true))],
            iterations: 1,
        });

        let text = ReportFormatter::render(&report, OutputFormat::Text).unwrap();
        assert_eq!(text, "sat\nx true\n");
    }

    #[test]
    fn test_deduction_nothing_forced_text() {
        let report = RunReport::Deduction(DeductionReport {
            satisfiable: true,
            forced: Vec::new(),
            iterations: 1,
        });

        let text = ReportFormatter::render(&report, OutputFormat::Text).unwrap();
        assert_eq!(text, "sat\n");
    }

    #[test]
    fn test_deduction_unsat_text() {
        let report = RunReport::Deduction(DeductionReport {
            satisfiable: false,
            forced: Vec::new(),
            iterations: 0,
        });

        let text = ReportFormatter::render(&report, OutputFormat::Text).unwrap();
        assert_eq!(text, "unsat\n");
    }

    #[test]
    fn test_json_output_shape() {
        let report = RunReport::Deduction(DeductionReport {
            satisfiable: true,
            forced: vec![Binding::new("x", Value::Int(2))],
            iterations: 3,
        });

        let text = ReportFormatter::render(&report, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["satisfiable"], true);
        assert_eq!(parsed["forced"][0]["name"], "x");
        assert_eq!(parsed["forced"][0]["value"], 2);
        assert_eq!(parsed["iterations"], 3);
    }
}
