//! The immutable university date value: Year/Term-or-Break/Week/Day.
//!
//! A [`UniversityDate`] names a day the way the institution announces it
//! ("Monday Week 1, Autumn Term 2010/11") rather than by calendar date.
//! Values are produced by the conversion engine or built by hand from the
//! numeric codes used in query strings and stored rows; either way the
//! constructor validates every component, so no partially-valid value is
//! observable.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

use crate::error::{CalendarError, Result};

// ── Terms and breaks ────────────────────────────────────────────────────────

/// One of the three teaching terms of an academic year.
///
/// Numbered 1–3 in Autumn/Spring/Summer order for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Term {
    Autumn,
    Spring,
    Summer,
}

impl Term {
    /// Construct from the numeric term code (1 = Autumn, 2 = Spring, 3 = Summer).
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidInput`] if the code is out of range.
    pub fn from_number(n: u8) -> Result<Self> {
        match n {
            1 => Ok(Term::Autumn),
            2 => Ok(Term::Spring),
            3 => Ok(Term::Summer),
            _ => Err(CalendarError::InvalidInput(format!(
                "term code {n} is out of range (1..=3)"
            ))),
        }
    }

    /// The numeric term code (1 = Autumn, 2 = Spring, 3 = Summer).
    pub fn number(self) -> u8 {
        match self {
            Term::Autumn => 1,
            Term::Spring => 2,
            Term::Summer => 3,
        }
    }

    /// The display name, e.g. `"Autumn Term"`.
    pub fn name(self) -> &'static str {
        match self {
            Term::Autumn => "Autumn Term",
            Term::Spring => "Spring Term",
            Term::Summer => "Summer Term",
        }
    }

    /// Position of this term in a year's term table.
    pub(crate) fn table_index(self) -> usize {
        (self.number() - 1) as usize
    }
}

/// One of the three vacations between terms.
///
/// Numbered 1–3 in Winter/Spring/Summer order. Break *k* follows term *k*:
/// the winter break follows Autumn Term, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Break {
    Winter,
    Spring,
    Summer,
}

impl Break {
    /// Construct from the numeric break code (1 = Winter, 2 = Spring, 3 = Summer).
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidInput`] if the code is out of range.
    pub fn from_number(n: u8) -> Result<Self> {
        match n {
            1 => Ok(Break::Winter),
            2 => Ok(Break::Spring),
            3 => Ok(Break::Summer),
            _ => Err(CalendarError::InvalidInput(format!(
                "break code {n} is out of range (1..=3)"
            ))),
        }
    }

    /// The numeric break code (1 = Winter, 2 = Spring, 3 = Summer).
    pub fn number(self) -> u8 {
        match self {
            Break::Winter => 1,
            Break::Spring => 2,
            Break::Summer => 3,
        }
    }

    /// The display name, e.g. `"Winter Break"`.
    pub fn name(self) -> &'static str {
        match self {
            Break::Winter => "Winter Break",
            Break::Spring => "Spring Break",
            Break::Summer => "Summer Break",
        }
    }

    /// Position of the *preceding* term in a year's term table; a break
    /// starts the week after that term's last week.
    pub(crate) fn table_index(self) -> usize {
        (self.number() - 1) as usize
    }
}

/// Term-or-break discriminator.
///
/// A term code and a break code share the same 1–3 numbering, so the pairing
/// of "which number" with "term or break" lives in one sum type; an
/// inconsistent combination cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Segment {
    Term(Term),
    Break(Break),
}

impl Segment {
    /// Construct from the numeric code plus the break discriminator, as
    /// carried in query strings (`term=…&inbreak=…`).
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidInput`] if the code is out of range.
    pub fn from_number(n: u8, in_break: bool) -> Result<Self> {
        if in_break {
            Break::from_number(n).map(Segment::Break)
        } else {
            Term::from_number(n).map(Segment::Term)
        }
    }

    /// The numeric term or break code (1–3).
    pub fn number(self) -> u8 {
        match self {
            Segment::Term(t) => t.number(),
            Segment::Break(b) => b.number(),
        }
    }

    /// Whether this is a vacation rather than a teaching term.
    pub fn is_break(self) -> bool {
        matches!(self, Segment::Break(_))
    }

    /// The display name, e.g. `"Autumn Term"` or `"Winter Break"`.
    pub fn name(self) -> &'static str {
        match self {
            Segment::Term(t) => t.name(),
            Segment::Break(b) => b.name(),
        }
    }
}

// ── Day source ──────────────────────────────────────────────────────────────

/// Where a date's day-of-week comes from.
///
/// The anchor form records the concrete calendar day the value was classified
/// from and strictly subsumes the weekday form: it yields the weekday *and*
/// can reconstruct an absolute date without a term-table lookup. The engine
/// always produces anchors; the bare weekday form exists for values built
/// from codes alone (a query string has no calendar day to anchor to).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DaySource {
    /// An explicit day of the week.
    Weekday(Weekday),
    /// The calendar day this value was derived from.
    Anchor(NaiveDate),
}

impl DaySource {
    /// Construct from the numeric day code (Monday = 1 … Sunday = 7).
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidInput`] if the code is out of range.
    pub fn from_number(n: u8) -> Result<Self> {
        match n {
            1 => Ok(DaySource::Weekday(Weekday::Mon)),
            2 => Ok(DaySource::Weekday(Weekday::Tue)),
            3 => Ok(DaySource::Weekday(Weekday::Wed)),
            4 => Ok(DaySource::Weekday(Weekday::Thu)),
            5 => Ok(DaySource::Weekday(Weekday::Fri)),
            6 => Ok(DaySource::Weekday(Weekday::Sat)),
            7 => Ok(DaySource::Weekday(Weekday::Sun)),
            _ => Err(CalendarError::InvalidInput(format!(
                "day code {n} is out of range (1..=7)"
            ))),
        }
    }

    /// The day of the week.
    pub fn weekday(self) -> Weekday {
        match self {
            DaySource::Weekday(w) => w,
            DaySource::Anchor(d) => d.weekday(),
        }
    }

    /// The numeric day code (Monday = 1 … Sunday = 7).
    pub fn number(self) -> u8 {
        self.weekday().number_from_monday() as u8
    }

    /// The calendar day, if this value carries one.
    pub fn anchor(self) -> Option<NaiveDate> {
        match self {
            DaySource::Weekday(_) => None,
            DaySource::Anchor(d) => Some(d),
        }
    }

    /// The full day name, e.g. `"Monday"`.
    pub fn name(self) -> &'static str {
        match self.weekday() {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        }
    }
}

// ── UniversityDate ──────────────────────────────────────────────────────────

/// A day expressed in the institution's Year/Term/Week/Day form.
///
/// `year` is the calendar year on which Monday, Week 1 of Autumn Term falls —
/// the first of the two years in "2010/11". Break values carry the year of
/// the *preceding* autumn, so the summer break that runs into September still
/// belongs to the academic year just ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UniversityDate {
    year: i32,
    segment: Segment,
    week: u32,
    day: DaySource,
}

impl UniversityDate {
    /// Construct a validated date.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidInput`] if `week` is zero. Term/break
    /// and day ranges are enforced by their types.
    pub fn new(year: i32, segment: Segment, week: u32, day: DaySource) -> Result<Self> {
        if week == 0 {
            return Err(CalendarError::InvalidInput(
                "week must be positive".to_string(),
            ));
        }
        Ok(UniversityDate {
            year,
            segment,
            week,
            day,
        })
    }

    /// Construct from the raw numeric codes used by query strings and stored
    /// rows: term/break code 1–3, `in_break` discriminator, week ≥ 1, day
    /// code 1–7.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidInput`] if any code is out of range.
    pub fn from_codes(year: i32, code: u8, in_break: bool, week: u32, day: u8) -> Result<Self> {
        Self::new(
            year,
            Segment::from_number(code, in_break)?,
            week,
            DaySource::from_number(day)?,
        )
    }

    /// The academic year (first of the two years in "2010/11").
    pub fn year(self) -> i32 {
        self.year
    }

    /// The term or break.
    pub fn segment(self) -> Segment {
        self.segment
    }

    /// The numeric term or break code (1–3).
    pub fn term_number(self) -> u8 {
        self.segment.number()
    }

    /// The term or break name, e.g. `"Autumn Term"`.
    pub fn term_name(self) -> &'static str {
        self.segment.name()
    }

    /// Whether the date falls in a break; if so, the week counts from the
    /// Monday after the preceding term's last week.
    pub fn is_in_break(self) -> bool {
        self.segment.is_break()
    }

    /// The week within the term or break, counted from 1.
    pub fn week(self) -> u32 {
        self.week
    }

    /// The day component.
    pub fn day(self) -> DaySource {
        self.day
    }

    /// The day of the week.
    pub fn weekday(self) -> Weekday {
        self.day.weekday()
    }

    /// The full day name, e.g. `"Monday"`.
    pub fn day_name(self) -> &'static str {
        self.day.name()
    }

    /// Format without the day name: `"Week 1, Autumn Term 2010/11"`.
    pub fn to_string_without_day(self) -> String {
        format!(
            "Week {}, {} {}/{:02}",
            self.week,
            self.segment.name(),
            self.year,
            (self.year + 1).rem_euclid(100)
        )
    }

    /// Query-string projection:
    /// `year=2010&term=1&inbreak=false&week=1&day=1`.
    ///
    /// Field names and order are a compatibility surface; the leading `?` is
    /// omitted so the output can be appended to an existing query string.
    pub fn to_query_string(self) -> String {
        format!(
            "{}&day={}",
            self.to_query_string_without_day(),
            self.day.number()
        )
    }

    /// Query-string projection without the `day` field.
    pub fn to_query_string_without_day(self) -> String {
        format!(
            "year={}&term={}&inbreak={}&week={}",
            self.year,
            self.segment.number(),
            self.segment.is_break(),
            self.week
        )
    }
}

/// `"{Day} Week {week}, {Term name} {year}/{yy}"`.
impl fmt::Display for UniversityDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day.name(), self.to_string_without_day())
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
