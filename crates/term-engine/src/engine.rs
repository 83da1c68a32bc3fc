//! Bidirectional conversion between instants and university dates.
//!
//! An academic year is partitioned into seven chronological segments —
//! summer break, Autumn Term, winter break, Spring Term, spring break,
//! Summer Term, and the next summer break — by eight boundaries: 1 September
//! on either side, plus each term's starting Monday (inclusive) and the
//! Monday after its last week (exclusive). Classification finds the unique
//! half-open interval containing a day; reconstruction walks forward from a
//! segment's starting Monday by whole weeks and days.
//!
//! All arithmetic happens on local calendar dates in an explicitly supplied
//! timezone — there is no process-global timezone and no system clock
//! access, so results are reproducible across differently-configured
//! callers.
//!
//! # Functions
//!
//! - [`TermCalendar::university_date`] — instant → [`UniversityDate`]
//! - [`TermCalendar::timestamp_of`] — [`UniversityDate`] → local midnight
//! - [`TermCalendar::add_days`] / [`TermCalendar::add_weeks`] — term-aware
//!   date arithmetic, always timestamp-mediated
//! - [`floor_monday`], [`weeks_in_year`], [`week_difference`] — calendar
//!   helpers the partition and week numbering are built from

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::date::{Break, DaySource, Segment, Term, UniversityDate};
use crate::error::{CalendarError, Result};
use crate::provider::{TermTable, YearTerms};

// ── TermCalendar ────────────────────────────────────────────────────────────

/// Unit for [`TermCalendar::add_offset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetUnit {
    Days,
    Weeks,
}

/// The conversion engine: a term table plus the timezone its dates are
/// announced in.
///
/// Holds no state beyond its provider; every classification rebuilds the
/// year's partition from whatever the provider currently returns, so a
/// refresh between two calls is allowed to change results.
pub struct TermCalendar<P> {
    provider: P,
    tz: Tz,
}

impl<P: TermTable> TermCalendar<P> {
    pub fn new(provider: P, tz: Tz) -> Self {
        TermCalendar { provider, tz }
    }

    /// The timezone dates are interpreted in.
    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Classify an instant into Year/Term-or-Break/Week/Day form.
    ///
    /// The instant is first projected onto a calendar day in the engine's
    /// timezone; an instant late on a UTC Sunday can therefore already be
    /// Monday of Week 1 locally.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::UnknownYear`] if the provider has no data for
    /// the instant's academic year even after one refresh attempt, or
    /// [`CalendarError::InvalidTermData`] if the year's boundary data does
    /// not form a strictly increasing partition.
    pub fn university_date(&mut self, instant: DateTime<Utc>) -> Result<UniversityDate> {
        self.classify(instant.with_timezone(&self.tz).date_naive(), 0)
    }

    /// Classify a local calendar day directly.
    ///
    /// # Errors
    ///
    /// As [`TermCalendar::university_date`].
    pub fn university_date_of(&mut self, date: NaiveDate) -> Result<UniversityDate> {
        self.classify(date, 0)
    }

    /// Reconstruct the timestamp of a university date: midnight, local time,
    /// on the day it names.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::UnknownYear`] if the provider has no data for
    /// the date's year, or [`CalendarError::InvalidLocalTime`] if midnight
    /// does not exist uniquely in the engine's timezone on that day.
    pub fn timestamp_of(&mut self, date: &UniversityDate) -> Result<DateTime<Tz>> {
        let terms = self.year_terms(date.year())?;
        let monday = match date.segment() {
            Segment::Term(term) => floor_monday(terms[term.table_index()].start),
            // A break starts the Monday after its preceding term's last week.
            Segment::Break(br) => floor_monday(terms[br.table_index()].end) + Duration::weeks(1),
        };
        let target = monday
            + Duration::weeks(i64::from(date.week()) - 1)
            + Duration::days(i64::from(date.day().number()) - 1);
        self.local_midnight(target)
    }

    /// Move a university date by `offset` days or weeks.
    ///
    /// Offsetting is always timestamp-mediated — the date is reconstructed,
    /// shifted on the local calendar, and re-classified — so every term and
    /// break boundary crossing is re-derived rather than patched onto the
    /// week/day fields. Negative offsets move backward.
    ///
    /// # Errors
    ///
    /// As [`TermCalendar::university_date`] and
    /// [`TermCalendar::timestamp_of`].
    pub fn add_offset(
        &mut self,
        date: &UniversityDate,
        offset: i64,
        unit: OffsetUnit,
    ) -> Result<UniversityDate> {
        let start = self.timestamp_of(date)?;
        let days = match unit {
            OffsetUnit::Days => offset,
            OffsetUnit::Weeks => offset * 7,
        };
        // Shift the local calendar day, not the instant; a DST transition
        // inside the span must not move the result onto a neighbouring day.
        self.classify(start.date_naive() + Duration::days(days), 0)
    }

    /// Move a university date by `offset` days.
    pub fn add_days(&mut self, date: &UniversityDate, offset: i64) -> Result<UniversityDate> {
        self.add_offset(date, offset, OffsetUnit::Days)
    }

    /// Move a university date by `offset` weeks.
    pub fn add_weeks(&mut self, date: &UniversityDate, offset: i64) -> Result<UniversityDate> {
        self.add_offset(date, offset, OffsetUnit::Weeks)
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// Forward classification. `depth` bounds the summer-break recursion to
    /// a single level.
    fn classify(&mut self, date: NaiveDate, depth: u8) -> Result<UniversityDate> {
        let year = academic_year(date);
        let terms = self.year_terms(year)?;
        let bounds = build_partition(year, &terms)?;

        let index = bounds
            .windows(2)
            .position(|pair| pair[0] <= date && date < pair[1])
            .ok_or_else(|| {
                CalendarError::InvalidTermData(format!(
                    "{date} falls outside the {year} academic year partition"
                ))
            })?;

        let week = if index == 0 {
            // The segment before Autumn Term is the tail of the *previous*
            // year's summer break, whose numbering this year's own term data
            // cannot supply. Re-classify the Monday before 31 August to
            // borrow its week as the baseline.
            if depth > 0 {
                return Err(CalendarError::InvalidTermData(format!(
                    "summer-break reference for {year} resolved to another pre-term segment"
                )));
            }
            let anchor = floor_monday(ymd(year, 8, 30)?);
            let reference = self.classify(anchor, depth + 1)?;
            let elapsed_weeks = (date - anchor).num_days() / 7;
            elapsed_weeks as u32 + reference.week()
        } else {
            week_difference(date, bounds[index]) + 1
        };

        let segment = segment_for_index(index);
        let year_of_date = if index == 0 { year - 1 } else { year };
        UniversityDate::new(year_of_date, segment, week, DaySource::Anchor(date))
    }

    /// Look up a year's terms, asking the provider to refresh once if the
    /// year is not yet loaded.
    fn year_terms(&mut self, year: i32) -> Result<YearTerms> {
        if !self.provider.has_year(year) {
            self.provider.refresh()?;
        }
        self.provider
            .terms_for_year(year)
            .ok_or(CalendarError::UnknownYear(year))
    }

    fn local_midnight(&self, date: NaiveDate) -> Result<DateTime<Tz>> {
        let naive = date.and_hms_opt(0, 0, 0).ok_or_else(|| {
            CalendarError::InvalidLocalTime(format!("no midnight on {date}"))
        })?;
        self.tz.from_local_datetime(&naive).single().ok_or_else(|| {
            CalendarError::InvalidLocalTime(format!(
                "midnight on {date} is ambiguous or nonexistent in {}",
                self.tz
            ))
        })
    }
}

// ── Partition construction ──────────────────────────────────────────────────

/// The academic year containing `date`: years roll over on 1 September, so
/// 1 September belongs to the year that starts then and 31 August to the one
/// just ending.
fn academic_year(date: NaiveDate) -> i32 {
    if date.month() >= 9 {
        date.year()
    } else {
        date.year() - 1
    }
}

/// Build the eight boundaries partitioning academic year `year` into its
/// seven segments: `[1 Sept, t1 start, t1 end+1w, t2 start, t2 end+1w,
/// t3 start, t3 end+1w, 1 Sept next]`, each term date floored to its Monday.
fn build_partition(year: i32, terms: &YearTerms) -> Result<[NaiveDate; 8]> {
    let mut bounds = [NaiveDate::MIN; 8];
    bounds[0] = ymd(year, 9, 1)?;
    bounds[7] = ymd(year + 1, 9, 1)?;
    for (i, term) in terms.iter().enumerate() {
        bounds[1 + 2 * i] = floor_monday(term.start); // inclusive
        bounds[2 + 2 * i] = floor_monday(term.end) + Duration::weeks(1); // exclusive
    }
    bounds.sort_unstable();

    // Half-open classification is undefined unless the boundaries strictly
    // increase.
    if bounds.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(CalendarError::InvalidTermData(format!(
            "term boundaries for {year} are not strictly increasing"
        )));
    }
    Ok(bounds)
}

/// Map a partition interval index to its segment. Odd indices are terms in
/// year order; even indices are the breaks between them, with index 0 being
/// the tail of the previous year's summer break.
fn segment_for_index(index: usize) -> Segment {
    match index {
        0 | 6 => Segment::Break(Break::Summer),
        1 => Segment::Term(Term::Autumn),
        2 => Segment::Break(Break::Winter),
        3 => Segment::Term(Term::Spring),
        4 => Segment::Break(Break::Spring),
        5 => Segment::Term(Term::Summer),
        _ => unreachable!("a year partition has exactly seven segments"),
    }
}

fn ymd(year: i32, month: u32, day: u32) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        CalendarError::InvalidInput(format!(
            "academic year {year} is outside the supported calendar range"
        ))
    })
}

// ── Calendar helpers ────────────────────────────────────────────────────────

/// The Monday at or before `date`.
///
/// Idempotent at week boundaries: a Monday floors to itself. Relative-phrase
/// date parsing ("last Monday") skips a whole week when applied to a date
/// that is already a Monday, so the weekday offset is computed directly.
pub fn floor_monday(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// The number of ISO weeks in calendar year `year` — 52 or 53.
pub fn weeks_in_year(year: i32) -> u32 {
    // 28 December always falls in the last ISO week of its year.
    let dec28 = NaiveDate::from_ymd_opt(year, 12, 28)
        .expect("28 December exists in every representable year");
    let weeks = dec28.iso_week().week();
    debug_assert!(weeks == 52 || weeks == 53);
    weeks
}

/// ISO-week difference `a - b`, for `b <= a` with at most one calendar year
/// between them. Wraps across the ISO year boundary by adding the week count
/// of `b`'s calendar year when the raw difference goes negative.
///
/// Used to number a day's week relative to its segment's starting Monday.
/// Violating the preconditions is a programming error, not a runtime
/// condition.
pub fn week_difference(a: NaiveDate, b: NaiveDate) -> u32 {
    debug_assert!(b <= a, "week_difference arguments out of order");
    debug_assert!(
        a.year() - b.year() <= 1,
        "week_difference span exceeds one year"
    );

    let mut difference =
        i64::from(a.iso_week().week()) - i64::from(b.iso_week().week());
    if difference < 0 {
        // `a` has wrapped into the next ISO year.
        difference += i64::from(weeks_in_year(b.year()));
    }
    debug_assert!(difference >= 0);
    difference as u32
}

// ── Tests ───────────────────────────────────────────────────────────────────
