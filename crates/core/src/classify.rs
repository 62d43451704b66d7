//! Header row classification.
//!
//! Two independent predicates decide whether a row holds column names:
//!
//! - [`HeaderVocabulary`] is the generic heuristic: enough non-empty cells,
//!   enough of them drawn from a closed vocabulary of known header tokens.
//! - [`ReportHeaderMatcher`] is the strict match for one recurring report
//!   layout: required tokens plus at least one secondary token.
//!
//! A [`Classifier`] ranks strategies; the first one that flags any row of a
//! sheet decides how that sheet is partitioned.

use crate::error::{InspectError, InspectResult};
use crate::row::{normalize_row, trim_trailing_empty};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

/// Header tokens of the inventory report workbooks.
pub const DEFAULT_HEADER_TOKENS: &[&str] = &[
    "MERK",
    "TYPE",
    "TRANSMITION",
    "TRANSMISSION",
    "YEAR",
    "COLOR",
    "ODOMETER",
    "STNK",
    "PURCHASE DATE",
    "AGING",
    "CREDIT PRICE",
    "CASH PRICE",
    "SELLING PRICE",
    "MARKET PRICE",
    "TOTAL NILAI STOCK (EST.)",
    "TOTAL NILAI STOCK (ACT.)",
    "NOTES DOCUMENT",
    "MR2",
    "NO",
    "STATUS",
    "PLATE NO",
    "UNIT CATEGORY",
];

/// Tokens that must all appear in a strict report header.
pub const DEFAULT_REQUIRED_TOKENS: &[&str] = &["MERK", "TYPE"];

/// At least one of these must appear in a strict report header.
pub const DEFAULT_SECONDARY_TOKENS: &[&str] = &[
    "TRANSMITION",
    "TRANSMISSION",
    "YEAR",
    "ODOMETER",
    "STNK",
    "PURCHASE DATE",
];

fn normalize_tokens<I, S>(tokens: I) -> IndexSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|t| t.as_ref().trim().to_uppercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// A way of recognising header rows.
pub trait HeaderStrategy: fmt::Debug + Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Whether `row` holds column names
    fn is_header(&self, row: &[String]) -> bool;

    /// 0-based indexes of every header row in `rows`
    fn header_rows(&self, rows: &[Vec<String>]) -> Vec<usize> {
        rows.iter()
            .enumerate()
            .filter(|(_, row)| self.is_header(row))
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Closed vocabulary of known header tokens (generic heuristic).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderVocabulary {
    tokens: IndexSet<String>,
    min_non_empty: usize,
    min_known: usize,
}

impl Default for HeaderVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER_TOKENS.iter().copied())
    }
}

impl HeaderVocabulary {
    /// Create a vocabulary requiring 3 non-empty cells and 2 known tokens.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tokens: normalize_tokens(tokens),
            min_non_empty: 3,
            min_known: 2,
        }
    }

    /// Override the thresholds
    #[must_use]
    pub fn with_thresholds(mut self, min_non_empty: usize, min_known: usize) -> Self {
        self.min_non_empty = min_non_empty;
        self.min_known = min_known;
        self
    }

    /// Check a single cell against the vocabulary (case-insensitive).
    pub fn is_known_token(&self, cell: &str) -> bool {
        self.tokens.contains(&cell.trim().to_uppercase())
    }

    /// Generic header heuristic over a row.
    pub fn is_likely_header_row<S: AsRef<str>>(&self, row: &[S]) -> bool {
        let row = trim_trailing_empty(row);
        if row.len() < self.min_non_empty {
            return false;
        }
        let mut non_empty = 0;
        let mut known = 0;
        for cell in row {
            let cell = cell.as_ref().trim();
            if cell.is_empty() {
                continue;
            }
            non_empty += 1;
            if self.is_known_token(cell) {
                known += 1;
            }
        }
        non_empty >= self.min_non_empty && known >= self.min_known
    }
}

impl HeaderStrategy for HeaderVocabulary {
    fn name(&self) -> &str {
        "generic"
    }

    fn is_header(&self, row: &[String]) -> bool {
        self.is_likely_header_row(row)
    }
}

/// Strict matcher for one recurring report header layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHeaderMatcher {
    required: IndexSet<String>,
    secondary: IndexSet<String>,
    min_tokens: usize,
}

impl Default for ReportHeaderMatcher {
    fn default() -> Self {
        Self::new(
            DEFAULT_REQUIRED_TOKENS.iter().copied(),
            DEFAULT_SECONDARY_TOKENS.iter().copied(),
        )
    }
}

impl ReportHeaderMatcher {
    /// Create a matcher from required and secondary token sets.
    pub fn new<I, J, S, T>(required: I, secondary: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            required: normalize_tokens(required),
            secondary: normalize_tokens(secondary),
            min_tokens: 3,
        }
    }

    /// Whether `row` is a report header row.
    pub fn matches<S: AsRef<str>>(&self, row: &[S]) -> bool {
        let tokens: IndexSet<String> = normalize_row(row).into_iter().collect();
        if tokens.len() < self.min_tokens {
            return false;
        }
        self.required.iter().all(|t| tokens.contains(t))
            && self.secondary.iter().any(|t| tokens.contains(t))
    }

    /// 0-based indexes of all report header rows.
    pub fn find_report_header_rows(&self, rows: &[Vec<String>]) -> Vec<usize> {
        self.header_rows(rows)
    }
}

impl HeaderStrategy for ReportHeaderMatcher {
    fn name(&self) -> &str {
        "report"
    }

    fn is_header(&self, row: &[String]) -> bool {
        self.matches(row)
    }
}

fn default_vocabulary() -> &'static HeaderVocabulary {
    static VOCABULARY: OnceLock<HeaderVocabulary> = OnceLock::new();
    VOCABULARY.get_or_init(HeaderVocabulary::default)
}

fn default_report_matcher() -> &'static ReportHeaderMatcher {
    static MATCHER: OnceLock<ReportHeaderMatcher> = OnceLock::new();
    MATCHER.get_or_init(ReportHeaderMatcher::default)
}

/// Generic header heuristic with the default vocabulary.
pub fn is_likely_header_row<S: AsRef<str>>(row: &[S]) -> bool {
    default_vocabulary().is_likely_header_row(row)
}

/// Strict report header detection with the default token sets.
pub fn find_report_header_rows(rows: &[Vec<String>]) -> Vec<usize> {
    default_report_matcher().find_report_header_rows(rows)
}

/// How a section opened by a strategy is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "rows")]
pub enum Boundary {
    /// Close at the next header row or end of input, then drop trailing
    /// blank rows.
    TrimTrailingBlanks,
    /// Close at the next header row, before the first run of this many
    /// consecutive blank rows, or at end of input.
    BlankRun(usize),
}

/// A strategy together with its boundary rule and merge policy.
#[derive(Debug)]
pub struct RankedStrategy {
    pub strategy: Box<dyn HeaderStrategy>,
    pub boundary: Boundary,
    /// Fold repeated report blocks after extraction
    pub merge: bool,
}

impl RankedStrategy {
    /// Wrap `strategy` with the boundary rule its sections use.
    pub fn new(strategy: impl HeaderStrategy + 'static, boundary: Boundary, merge: bool) -> Self {
        Self {
            strategy: Box::new(strategy),
            boundary,
            merge,
        }
    }
}

/// Ranked list of header strategies tried in priority order.
#[derive(Debug)]
pub struct Classifier {
    strategies: Vec<RankedStrategy>,
}

impl Default for Classifier {
    /// Strict report match, then the generic heuristic.
    fn default() -> Self {
        Self::new(vec![
            RankedStrategy::new(
                ReportHeaderMatcher::default(),
                Boundary::TrimTrailingBlanks,
                true,
            ),
            RankedStrategy::new(HeaderVocabulary::default(), Boundary::BlankRun(2), false),
        ])
    }
}

impl Classifier {
    /// Classifier trying `strategies` in the given order.
    #[must_use]
    pub fn new(strategies: Vec<RankedStrategy>) -> Self {
        Self { strategies }
    }

    /// Build a classifier from configuration.
    pub fn from_config(config: &ClassifierConfig) -> InspectResult<Self> {
        if config.blank_run == 0 {
            return Err(InspectError::Config(
                "blank_run must be at least 1".to_string(),
            ));
        }
        let mut strategies = Vec::new();
        if let Some(report) = &config.report {
            if report.required.is_empty() {
                return Err(InspectError::Config(
                    "report matcher needs at least one required token".to_string(),
                ));
            }
            strategies.push(RankedStrategy::new(
                ReportHeaderMatcher::new(&report.required, &report.secondary),
                Boundary::TrimTrailingBlanks,
                config.merge_report_sections,
            ));
        }
        if !config.header_tokens.is_empty() {
            strategies.push(RankedStrategy::new(
                HeaderVocabulary::new(&config.header_tokens)
                    .with_thresholds(config.min_non_empty, config.min_known),
                Boundary::BlankRun(config.blank_run),
                false,
            ));
        }
        Ok(Self::new(strategies))
    }

    /// Strategies in priority order
    pub fn strategies(&self) -> &[RankedStrategy] {
        &self.strategies
    }

    /// First strategy that flags at least one row, with its header indexes.
    pub fn select(&self, rows: &[Vec<String>]) -> Option<(&RankedStrategy, Vec<usize>)> {
        self.strategies.iter().find_map(|ranked| {
            let headers = ranked.strategy.header_rows(rows);
            if headers.is_empty() {
                None
            } else {
                Some((ranked, headers))
            }
        })
    }
}

/// Strict matcher settings in [`ClassifierConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMatcherConfig {
    pub required: Vec<String>,
    pub secondary: Vec<String>,
}

/// Serializable classifier settings.
///
/// ```
/// use sheetsense_core::{Classifier, ClassifierConfig};
///
/// let config: ClassifierConfig = serde_json::from_str(
///     r#"{ "header_tokens": ["SKU", "QTY", "PRICE"], "report": null }"#,
/// ).unwrap();
/// let classifier = Classifier::from_config(&config).unwrap();
/// assert_eq!(classifier.strategies().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub header_tokens: Vec<String>,
    pub min_non_empty: usize,
    pub min_known: usize,
    pub blank_run: usize,
    pub report: Option<ReportMatcherConfig>,
    pub merge_report_sections: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            header_tokens: to_strings(DEFAULT_HEADER_TOKENS),
            min_non_empty: 3,
            min_known: 2,
            blank_run: 2,
            report: Some(ReportMatcherConfig {
                required: to_strings(DEFAULT_REQUIRED_TOKENS),
                secondary: to_strings(DEFAULT_SECONDARY_TOKENS),
            }),
            merge_report_sections: true,
        }
    }
}

impl ClassifierConfig {
    /// Load settings from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> InspectResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&content)?)
    }
}

fn to_strings(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|t| (*t).to_string()).collect()
}
