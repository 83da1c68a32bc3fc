//! Term-boundary data: the provider contract and an in-memory table.
//!
//! The conversion engine depends on exactly one external collaborator — a
//! table of term start/end dates keyed by academic year, normally sourced
//! from a slow-changing institutional document and cached locally. This
//! module defines that contract ([`TermTable`]) and ships a small in-memory
//! implementation ([`StaticTermTable`]) used as the reference provider and
//! test double. Caching strategy, staleness policy, and single-flight
//! refresh discipline all belong behind the trait, not in the engine.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::{CalendarError, Result};

// ── TermDates ───────────────────────────────────────────────────────────────

/// Start and end of a single term, day granularity.
///
/// Neither date needs to be a Monday; the engine floors both to week
/// boundaries itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermDates {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TermDates {
    /// Construct a term span.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidTermData`] if `end` precedes `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(CalendarError::InvalidTermData(format!(
                "term ends ({end}) before it starts ({start})"
            )));
        }
        Ok(TermDates { start, end })
    }

    /// Parse a term span from `YYYY-MM-DD` date strings, the granularity the
    /// institutional source publishes.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidTermData`] if either string is not a
    /// calendar date, or if `end` precedes `start`.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let parse = |s: &str| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| CalendarError::InvalidTermData(format!("'{s}': {e}")))
        };
        Self::new(parse(start)?, parse(end)?)
    }
}

/// One academic year's three terms, in Autumn/Spring/Summer order.
pub type YearTerms = [TermDates; 3];

// ── TermTable ───────────────────────────────────────────────────────────────

/// The term-boundary data contract the engine converts against.
///
/// Implementations are read-mostly; the only mutation is [`refresh`], which
/// may change what a repeated lookup returns. The engine never assumes the
/// content is immutable between two calls.
///
/// [`refresh`]: TermTable::refresh
pub trait TermTable {
    /// Whether boundary data for `year` is currently loaded.
    fn has_year(&self, year: i32) -> bool;

    /// Pull fresh data from the backing source. Idempotent, possibly slow.
    ///
    /// # Errors
    ///
    /// On failure the previously loaded data must stay intact.
    fn refresh(&mut self) -> Result<()>;

    /// The year's terms in Autumn/Spring/Summer order, if loaded.
    fn terms_for_year(&self, year: i32) -> Option<YearTerms>;
}

// ── StaticTermTable ─────────────────────────────────────────────────────────

/// In-memory term table.
///
/// `staged` entries model the slow external document: they become visible
/// only once [`refresh`](TermTable::refresh) runs, which is how the engine's
/// unknown-year → refresh → retry path gets exercised without any I/O.
#[derive(Debug, Clone, Default)]
pub struct StaticTermTable {
    loaded: BTreeMap<i32, YearTerms>,
    staged: BTreeMap<i32, YearTerms>,
}

impl StaticTermTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table with the given years immediately visible.
    pub fn with_years(entries: impl IntoIterator<Item = (i32, YearTerms)>) -> Self {
        StaticTermTable {
            loaded: entries.into_iter().collect(),
            staged: BTreeMap::new(),
        }
    }

    /// Add a year's terms, immediately visible.
    pub fn insert(&mut self, year: i32, terms: YearTerms) {
        self.loaded.insert(year, terms);
    }

    /// Add a year's terms that only become visible after a refresh.
    pub fn stage(&mut self, year: i32, terms: YearTerms) {
        self.staged.insert(year, terms);
    }
}

impl TermTable for StaticTermTable {
    fn has_year(&self, year: i32) -> bool {
        self.loaded.contains_key(&year)
    }

    fn refresh(&mut self) -> Result<()> {
        let staged = std::mem::take(&mut self.staged);
        self.loaded.extend(staged);
        Ok(())
    }

    fn terms_for_year(&self, year: i32) -> Option<YearTerms> {
        self.loaded.get(&year).copied()
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
