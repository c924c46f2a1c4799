use jiff::{Zoned, civil::Weekday};

use crate::{
    error::Error,
    frequency::Frequency,
    iter::RRuleIter,
    parse::format_time,
    weekday::{ByWeekday, weekday_code},
};

/// What to do when a pattern generates a date that doesn't exist in the
/// civil calendar, like February 31st.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum InvalidBehavior {
    /// Skip invalid dates. This is the only conformant choice for RFC
    /// 5545 and RFC 2445, and the default.
    #[default]
    Omit,
    /// Choose the next valid date. If February 31st were generated,
    /// March 3rd (the normalized overflow) would be used.
    Next,
    /// Choose the previous valid date. If February 31st were generated,
    /// the result would be February 28th (or 29th in a leap year).
    Prev,
}

/// A single recurrence pattern.
///
/// This is a plain value: build one with [`RRule::new`] plus struct
/// update syntax, or parse one from its RFC 5545 text form. Expansion
/// happens through [`RRule::iterator`], which hands back a lazy,
/// chronologically ordered iterator of [`Zoned`] instants.
///
/// ```
/// use recurring::{Frequency, RRule};
///
/// let rule = RRule {
///     count: Some(3),
///     dtstart: Some("2018-08-25T09:08:07[UTC]".parse().unwrap()),
///     ..RRule::new(Frequency::Daily)
/// };
/// let instants: Vec<jiff::Zoned> =
///     rule.iterator().unwrap().collect();
/// assert_eq!(instants.len(), 3);
/// ```
///
/// The BY sets are ordered sequences; an empty set means the dimension
/// is not specified. Values outside a dimension's meaningful range are
/// not rejected, they just never match anything.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RRule {
    pub frequency: Frequency,

    /// The inclusive upper bound on emitted instants. At most one of
    /// `until` and `count` may be set.
    pub until: Option<Zoned>,
    /// Whether `until` re-encodes as a local time with no zone suffix.
    pub until_floating: bool,

    /// The maximum number of instants to emit.
    pub count: Option<u64>,

    /// The pattern's anchor. Not part of the encoded rrule body proper,
    /// but required for expansion; its zone governs how the expansion
    /// behaves across DST transitions. A [`crate::Recurrence`]
    /// propagates its own dtstart to all of its rules.
    pub dtstart: Option<Zoned>,

    /// 0 means unset, which is treated as 1.
    pub interval: u32,

    pub by_seconds: Vec<i8>,
    pub by_minutes: Vec<i8>,
    pub by_hours: Vec<i8>,
    pub by_weekdays: Vec<ByWeekday>,
    pub by_month_days: Vec<i8>,
    pub by_year_days: Vec<i16>,
    pub by_week_numbers: Vec<i8>,
    pub by_months: Vec<i8>,
    pub by_set_positions: Vec<i32>,

    pub invalid: InvalidBehavior,

    /// The weekday on which weeks begin, for the week-anchored parts of
    /// expansion. `None` means Monday.
    pub week_start: Option<Weekday>,
}

impl RRule {
    /// Returns a rule with the given frequency and everything else
    /// unset.
    pub fn new(frequency: Frequency) -> RRule {
        RRule {
            frequency,
            until: None,
            until_floating: false,
            count: None,
            dtstart: None,
            interval: 0,
            by_seconds: vec![],
            by_minutes: vec![],
            by_hours: vec![],
            by_weekdays: vec![],
            by_month_days: vec![],
            by_year_days: vec![],
            by_week_numbers: vec![],
            by_months: vec![],
            by_set_positions: vec![],
            invalid: InvalidBehavior::Omit,
            week_start: None,
        }
    }

    /// Checks the rule against the RFC 5545 invariants that make a
    /// pattern expandable at all.
    pub fn validate(&self) -> Result<(), Error> {
        if !matches!(self.frequency, Frequency::Yearly | Frequency::Monthly)
        {
            for wd in &self.by_weekdays {
                if wd.nth() != 0 {
                    return Err(Error::InvalidRule(
                        "BYDAY entries may only specify a numeric \
                         component when the frequency is YEARLY or \
                         MONTHLY",
                    ));
                }
            }
        }
        if self.frequency == Frequency::Yearly
            && !self.by_week_numbers.is_empty()
        {
            for wd in &self.by_weekdays {
                if wd.nth() != 0 {
                    return Err(Error::InvalidRule(
                        "BYDAY entries must not specify a numeric \
                         component when the frequency is YEARLY and a \
                         BYWEEKNO rule is present",
                    ));
                }
            }
        }

        if self.frequency == Frequency::Weekly
            && !self.by_month_days.is_empty()
        {
            return Err(Error::InvalidRule(
                "WEEKLY recurrences must not include BYMONTHDAY",
            ));
        }

        if !self.by_set_positions.is_empty() {
            let any_other = !self.by_seconds.is_empty()
                || !self.by_minutes.is_empty()
                || !self.by_hours.is_empty()
                || !self.by_weekdays.is_empty()
                || !self.by_month_days.is_empty()
                || !self.by_week_numbers.is_empty()
                || !self.by_months.is_empty()
                || !self.by_year_days.is_empty();
            if !any_other {
                return Err(Error::InvalidRule(
                    "BYSETPOS rules must be used in conjunction with at \
                     least one other BYXXX rule part",
                ));
            }
        }

        if self.count.is_some() && self.until.is_some() {
            return Err(Error::InvalidRule(
                "COUNT and UNTIL must not appear in the same RRULE",
            ));
        }

        for &sp in &self.by_set_positions {
            if sp == 0 || !(-366..=366).contains(&sp) {
                return Err(Error::InvalidRule(
                    "BYSETPOS values must be between [-366,-1] or [1,366]",
                ));
            }
        }

        Ok(())
    }

    /// Returns a lazy iterator over this rule's instants.
    ///
    /// The rule is validated eagerly, and its `dtstart` must be set;
    /// the iterator itself can no longer fail.
    pub fn iterator(&self) -> Result<RRuleIter, Error> {
        RRuleIter::new(self)
    }

    /// Collects every instant of the rule, up to `limit` of them
    /// (0 means no limit).
    ///
    /// Careful: a rule with neither `count` nor `until` is practically
    /// infinite, so pass a nonzero `limit` for those.
    pub fn all(&self, limit: usize) -> Result<Vec<Zoned>, Error> {
        let iter = self.iterator()?;
        Ok(if limit == 0 {
            iter.collect()
        } else {
            iter.take(limit).collect()
        })
    }
}

impl std::fmt::Display for RRule {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "FREQ={}", self.frequency)?;
        if let Some(ref until) = self.until {
            write!(
                f,
                ";UNTIL={}",
                format_time(until, self.until_floating),
            )?;
        }
        if let Some(ref dtstart) = self.dtstart {
            write!(f, ";DTSTART={}", format_time(dtstart, false))?;
        }
        if let Some(count) = self.count {
            write!(f, ";COUNT={count}")?;
        }
        if self.interval > 1 {
            write!(f, ";INTERVAL={}", self.interval)?;
        }
        if !self.by_seconds.is_empty() {
            write!(f, ";BYSECOND={}", list(&self.by_seconds))?;
        }
        if !self.by_minutes.is_empty() {
            write!(f, ";BYMINUTE={}", list(&self.by_minutes))?;
        }
        if !self.by_hours.is_empty() {
            write!(f, ";BYHOUR={}", list(&self.by_hours))?;
        }
        if !self.by_weekdays.is_empty() {
            write!(f, ";BYDAY={}", list(&self.by_weekdays))?;
        }
        if !self.by_month_days.is_empty() {
            write!(f, ";BYMONTHDAY={}", list(&self.by_month_days))?;
        }
        if !self.by_year_days.is_empty() {
            write!(f, ";BYYEARDAY={}", list(&self.by_year_days))?;
        }
        if !self.by_week_numbers.is_empty() {
            write!(f, ";BYWEEKNO={}", list(&self.by_week_numbers))?;
        }
        if !self.by_months.is_empty() {
            write!(f, ";BYMONTH={}", list(&self.by_months))?;
        }
        if !self.by_set_positions.is_empty() {
            write!(f, ";BYSETPOS={}", list(&self.by_set_positions))?;
        }
        if let Some(week_start) = self.week_start {
            write!(f, ";WKST={}", weekday_code(week_start))?;
        }
        Ok(())
    }
}

fn list<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<String>>()
        .join(",")
}
