//! Packing whole input files, one package per line.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::app::context::PackContext;
use crate::app::format::render;
use crate::domain::errors::PackageError;
use crate::domain::model::Selection;
use crate::infra::config::Config;

/// What to do with a line that fails to parse or validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop at the first bad line.
    #[default]
    Abort,
    /// Log the bad line and leave it out of the output.
    Skip,
}

impl ErrorPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorPolicy::Abort => "abort",
            ErrorPolicy::Skip => "skip",
        }
    }
}

impl fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an [`ErrorPolicy`] fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ErrorPolicyParseError {
    #[error("unknown error policy '{0}' (expected abort or skip)")]
    UnknownPolicy(String),
}

impl FromStr for ErrorPolicy {
    type Err = ErrorPolicyParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "abort" | "fail" => Ok(ErrorPolicy::Abort),
            "skip" => Ok(ErrorPolicy::Skip),
            other => Err(ErrorPolicyParseError::UnknownPolicy(other.to_string())),
        }
    }
}

/// Knobs for a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    pub on_error: ErrorPolicy,
    /// Solve lines on the rayon thread pool. Output order is unaffected.
    pub parallel: bool,
}

impl BatchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            on_error: config.batch.on_error(),
            parallel: config.batch.parallel(),
        }
    }
}

/// A package line that could not be packed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("line {line}: {source}")]
pub struct LineError {
    /// 1-based line number in the input.
    pub line: usize,
    #[source]
    pub source: PackageError,
}

/// Result for one packed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineReport {
    pub line: usize,
    pub output: String,
    #[serde(flatten)]
    pub selection: Selection,
}

/// Results of a batch run, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub strategy: String,
    pub packages: Vec<LineReport>,
    /// Line numbers left out under [`ErrorPolicy::Skip`].
    pub skipped: Vec<usize>,
}

impl BatchReport {
    /// One rendered selection per line, joined with newlines.
    pub fn render_plain(&self) -> String {
        self.packages
            .iter()
            .map(|report| report.output.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize pack report")
    }
}

/// Drives a [`PackContext`] over multi-line input.
#[derive(Debug, Default)]
pub struct Packer {
    context: PackContext,
    options: BatchOptions,
}

impl Packer {
    pub fn new(context: PackContext, options: BatchOptions) -> Self {
        Self { context, options }
    }

    pub fn context(&self) -> &PackContext {
        &self.context
    }

    pub fn options(&self) -> BatchOptions {
        self.options
    }

    /// Read a UTF-8 file and pack every non-blank line.
    pub fn pack_file(&self, path: &Path) -> Result<BatchReport> {
        let input = fs::read_to_string(path)
            .with_context(|| format!("failed to read input file: {}", path.display()))?;
        let report = self
            .pack_str(&input)
            .with_context(|| format!("failed to pack {}", path.display()))?;
        Ok(report)
    }

    /// Pack every non-blank line of `input`. Blank lines produce no output.
    pub fn pack_str(&self, input: &str) -> Result<BatchReport, LineError> {
        let lines: Vec<(usize, &str)> = input
            .lines()
            .enumerate()
            .map(|(offset, line)| (offset + 1, line))
            .filter(|(_, line)| !line.trim().is_empty())
            .collect();

        let solve = |&(number, line): &(usize, &str)| (number, self.context.pack_line(line));
        let outcomes: Vec<(usize, Result<Selection, PackageError>)> = if self.options.parallel {
            lines.par_iter().map(solve).collect()
        } else {
            lines.iter().map(solve).collect()
        };

        let mut report = BatchReport {
            strategy: self.context.strategy_name().to_owned(),
            ..BatchReport::default()
        };
        for (line, outcome) in outcomes {
            match outcome {
                Ok(selection) => report.packages.push(LineReport {
                    line,
                    output: render(&selection),
                    selection,
                }),
                Err(source) => match self.options.on_error {
                    ErrorPolicy::Abort => return Err(LineError { line, source }),
                    ErrorPolicy::Skip => {
                        warn!(line, error = %source, "skipping package line");
                        report.skipped.push(line);
                    }
                },
            }
        }

        info!(
            strategy = %report.strategy,
            packages = report.packages.len(),
            skipped = report.skipped.len(),
            "batch packed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use tempfile::NamedTempFile;

    use crate::app::context::StrategyKind;

    const SAMPLE: &str = "\
81 : (1,53.38,€45) (2,88.62,€98) (3,78.48,€3) (4,72.30,€76) (5,30.18,€9) (6,46.34,€48)
8 : (1,15.3,€34)
75 : (1,85.31,€29) (2,14.55,€74) (3,3.98,€16) (4,26.24,€55) (5,63.69,€52) (6,76.25,€75) (7,60.02,€74) (8,93.18,€35) (9,89.95,€78)
56 : (1,90.72,€13) (2,33.80,€40) (3,43.15,€10) (4,37.97,€16) (5,46.81,€36) (6,48.77,€79) (7,81.80,€45) (8,19.36,€79) (9,6.76,€64)
";

    fn packer(on_error: ErrorPolicy, parallel: bool) -> Packer {
        Packer::new(
            PackContext::with_kind(StrategyKind::Dynamic),
            BatchOptions { on_error, parallel },
        )
    }

    #[test]
    fn packs_every_line_in_order() {
        let report = packer(ErrorPolicy::Abort, false).pack_str(SAMPLE).unwrap();
        assert_eq!(report.render_plain(), "4\n-\n2,7\n8,9");
        assert_eq!(report.strategy, "dynamic");
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn parallel_run_matches_sequential() {
        let sequential = packer(ErrorPolicy::Abort, false).pack_str(SAMPLE).unwrap();
        let parallel = packer(ErrorPolicy::Abort, true).pack_str(SAMPLE).unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn blank_lines_are_ignored_but_numbering_is_kept() {
        let report = packer(ErrorPolicy::Abort, false)
            .pack_str("\n10 : (1,5,€5)\n   \n20 : (1,25,€5)\n")
            .unwrap();
        let lines: Vec<usize> = report.packages.iter().map(|p| p.line).collect();
        assert_eq!(lines, vec![2, 4]);
        assert_eq!(report.render_plain(), "1\n-");
    }

    #[test]
    fn abort_reports_first_bad_line() {
        let input = "10 : (1,5,€5)\n101 : (1,5,€5)\n10 : (1,x,€5)\n";
        let err = packer(ErrorPolicy::Abort, true).pack_str(input).unwrap_err();
        assert_eq!(err.line, 2);
        assert!(matches!(err.source, PackageError::InvalidCapacity(_)));
        assert!(err.to_string().starts_with("line 2: invalid capacity"));
    }

    #[test]
    fn skip_leaves_bad_lines_out() {
        let input = "10 : (1,5,€5)\n101 : (1,5,€5)\n10 : (1,x,€5)\n5 : (1,1,€1) (2,1,€2)\n";
        let report = packer(ErrorPolicy::Skip, false).pack_str(input).unwrap();
        assert_eq!(report.render_plain(), "1\n1,2");
        assert_eq!(report.skipped, vec![2, 3]);
    }

    #[test]
    fn packs_files_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{SAMPLE}").unwrap();

        let report = Packer::default().pack_file(file.path()).unwrap();
        assert_eq!(report.packages.len(), 4);
        assert_eq!(report.packages[2].output, "2,7");
        assert_eq!(report.packages[2].selection.total_value().to_string(), "148.00");
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let err = Packer::default()
            .pack_file(&temp.path().join("absent.txt"))
            .unwrap_err();
        assert!(err.to_string().contains("failed to read input file"));
    }

    #[test]
    fn json_report_includes_totals() {
        let report = packer(ErrorPolicy::Abort, false)
            .pack_str("56 : (8,19.36,€79) (9,6.76,€64)")
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        let first = &json["packages"][0];
        assert_eq!(first["output"], "8,9");
        assert_eq!(first["indices"], serde_json::json!([8, 9]));
        assert_eq!(first["total_weight"], "26.12");
        assert_eq!(first["total_value"], "143.00");
    }

    #[test]
    fn parses_policies() {
        assert_eq!("SKIP".parse::<ErrorPolicy>(), Ok(ErrorPolicy::Skip));
        assert!("ignore".parse::<ErrorPolicy>().is_err());
    }
}
