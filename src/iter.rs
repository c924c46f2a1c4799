use std::collections::VecDeque;

use jiff::{
    Span, ToSpan, Zoned,
    civil::{Date, Weekday},
};

use crate::{
    calendar,
    error::Error,
    expand,
    filter::Filters,
    frequency::Frequency,
    rule::{InvalidBehavior, RRule},
};

/// A lazy, single-pass iterator over the instants described by one
/// `RRule`.
///
/// The iterator owns a snapshot of the rule, so the rule itself can be
/// dropped or modified freely after construction. Instants come out in
/// chronological order, never before the rule's `dtstart`, never after
/// its `until`, and never more of them than its `count`.
///
/// Construction happens through [`RRule::iterator`], which validates
/// the rule first.
#[derive(Clone, Debug)]
pub struct RRuleIter {
    rule: RRule,
    filters: Filters,
    cursor: Cursor,
    /// Buffered variations of the most recent key time, drained before
    /// the cursor advances again.
    queue: VecDeque<Zoned>,
    total_queued: u64,
    /// The rule's count, or 0 for unbounded.
    queue_cap: u64,
    /// Inclusive floor; variations before this are dropped. `None` only
    /// for the plain date-queue form used by recurrence sets.
    min_time: Option<Zoned>,
    /// Inclusive ceiling; `None` means unbounded.
    max_time: Option<Zoned>,
    past_max_time: bool,
}

/// The frequency-specific cursor producing key times.
#[derive(Clone, Debug)]
enum Cursor {
    /// Key times are `start + attempt * step`. Multiplying from the
    /// start (instead of repeatedly adding to the previous key) keeps a
    /// clamped result from infecting every later key time.
    Step { start: Zoned, step: Span, attempt: i64 },
    /// Monthly and yearly stepping recomputes the target civil month so
    /// that a day number the target month doesn't have goes through the
    /// rule's invalid-date policy instead of silently clamping.
    Calendar {
        start: Zoned,
        months: i64,
        /// The day-of-month for key times. Anchored to 1 when a BY rule
        /// will choose the day anyway, so no month is ever skipped on
        /// account of a day it doesn't have.
        day: i8,
        ib: InvalidBehavior,
        attempt: i64,
    },
    /// The secondly fast path for `interval=1` with BYSECOND: instead
    /// of ticking every second and filtering, jump directly from one
    /// BYSECOND value to the next via a precomputed delta cycle.
    SecondCycle {
        current: Option<Zoned>,
        /// Seconds to add on the very first jump, bridging from the
        /// start's second to the nearest following BYSECOND value.
        first: Option<i64>,
        deltas: Vec<i64>,
        idx: usize,
    },
    /// Never produces a key time. Used by the pre-filled date queues.
    Exhausted,
}

impl Cursor {
    fn advance(&mut self) -> Option<Zoned> {
        match self {
            Cursor::Step { start, step, attempt } => {
                let span = step.checked_mul(*attempt).ok()?;
                *attempt = attempt.checked_add(1)?;
                start.checked_add(span).ok()
            }
            Cursor::Calendar { start, months, day, ib, attempt } => loop {
                let total = months.checked_mul(*attempt)?;
                *attempt = attempt.checked_add(1)?;
                let m0 = i64::from(start.year()) * 12
                    + i64::from(start.month())
                    - 1;
                let m1 = m0 + total;
                let year = i16::try_from(m1.div_euclid(12)).ok()?;
                let month = (m1.rem_euclid(12) + 1) as i8;
                let first = Date::new(year, month, 1).ok()?;
                let days_in_month = first.days_in_month();
                let date = if *day <= days_in_month {
                    first.checked_add((i32::from(*day) - 1).days()).ok()?
                } else {
                    match ib {
                        // The month has no such day; try the next key.
                        InvalidBehavior::Omit => continue,
                        InvalidBehavior::Prev => first
                            .checked_add(
                                (i32::from(days_in_month) - 1).days(),
                            )
                            .ok()?,
                        // Normalize the overflow into the next month.
                        InvalidBehavior::Next => first
                            .checked_add((i32::from(*day) - 1).days())
                            .ok()?,
                    }
                };
                return calendar::with_date(start, date);
            },
            Cursor::SecondCycle { current, first, deltas, idx } => {
                let ret = current.clone()?;
                let delta = match first.take() {
                    Some(first) => first,
                    None => {
                        let delta = deltas[*idx];
                        *idx = (*idx + 1) % deltas.len();
                        delta
                    }
                };
                *current = ret.checked_add(delta.seconds()).ok();
                Some(ret)
            }
            Cursor::Exhausted => None,
        }
    }
}

impl RRuleIter {
    /// Builds the engine for a validated rule. `dtstart` must be set.
    pub(crate) fn new(rule: &RRule) -> Result<RRuleIter, Error> {
        rule.validate()?;
        let Some(ref start) = rule.dtstart else {
            return Err(Error::InvalidRule(
                "an rrule must have a dtstart to be expanded",
            ));
        };
        let rule = rule.clone();
        let filters = engine_filters(&rule);
        let cursor = engine_cursor(&rule, start);
        Ok(RRuleIter {
            min_time: Some(start.clone()),
            max_time: rule.until.clone(),
            queue_cap: rule.count.unwrap_or(0),
            queue: VecDeque::new(),
            total_queued: 0,
            past_max_time: false,
            rule,
            filters,
            cursor,
        })
    }

    /// An iterator that replays an explicit list of instants. This is
    /// how RDATE and EXDATE lists participate in group merges; the
    /// dates are sorted so the merge's monotonicity precondition holds.
    pub(crate) fn from_dates(mut dates: Vec<Zoned>) -> RRuleIter {
        dates.sort();
        RRuleIter {
            rule: RRule::new(Frequency::Secondly),
            filters: Filters::default(),
            cursor: Cursor::Exhausted,
            queue: dates.into(),
            total_queued: 0,
            queue_cap: 0,
            min_time: None,
            max_time: None,
            past_max_time: false,
        }
    }

    /// Returns the next instant without consuming it.
    ///
    /// Peeking then advancing returns the same instant, and two
    /// consecutive peeks return the same instant.
    pub fn peek(&mut self) -> Option<&Zoned> {
        self.fill_queue();
        self.queue.front()
    }

    /// Runs the cursor until the queue holds at least one emittable
    /// instant, or the rule is exhausted.
    fn fill_queue(&mut self) {
        if !self.queue.is_empty() {
            return;
        }
        if self.queue_cap > 0 && self.total_queued >= self.queue_cap {
            return;
        }
        loop {
            if self.past_max_time {
                return;
            }
            let Some(key) = self.cursor.advance() else { return };

            // Expansions stay within the key time's enclosing year
            // (give or take a week of anchoring), so a key time well
            // past the ceiling can never contribute. Without this, a
            // rule whose expansions are always empty would walk the
            // cursor to the end of representable time looking for one.
            if let Some(ref max) = self.max_time {
                if key.year() > max.year().saturating_add(1) {
                    log::trace!(
                        "key time {key} is past the until bound {max}; \
                         ending iteration",
                    );
                    self.past_max_time = true;
                    return;
                }
            }

            if !self.filters.is_valid(&key) {
                continue;
            }

            let mut variations = self.expand(&key);
            variations.sort();

            if let Some(ref min) = self.min_time {
                let before = variations.partition_point(|v| v < min);
                variations.drain(..before);
            }
            if let Some(ref max) = self.max_time {
                if let Some(pos) =
                    variations.iter().position(|v| v > max)
                {
                    variations.truncate(pos);
                    self.past_max_time = true;
                }
            }
            if variations.is_empty() {
                continue;
            }
            if self.queue_cap > 0 {
                let room = (self.queue_cap - self.total_queued) as usize;
                variations.truncate(room);
            }
            self.total_queued += variations.len() as u64;
            self.queue.extend(variations);
            return;
        }
    }

    /// Produces the key time's variation set, per the rule's frequency.
    fn expand(&self, key: &Zoned) -> Vec<Zoned> {
        let r = &self.rule;
        let week_start = r.week_start.unwrap_or(Weekday::Monday);
        let tt = vec![key.clone()];
        match r.frequency {
            Frequency::Secondly => tt,
            Frequency::Minutely => {
                let tt = expand::expand_by_seconds(tt, &r.by_seconds);
                expand::limit_by_set_positions(tt, &r.by_set_positions)
            }
            Frequency::Hourly => {
                let tt = expand::expand_by_minutes(tt, &r.by_minutes);
                let tt = expand::expand_by_seconds(tt, &r.by_seconds);
                expand::limit_by_set_positions(tt, &r.by_set_positions)
            }
            Frequency::Daily => {
                let tt = expand::expand_by_hours(tt, &r.by_hours);
                let tt = expand::expand_by_minutes(tt, &r.by_minutes);
                let tt = expand::expand_by_seconds(tt, &r.by_seconds);
                expand::limit_by_set_positions(tt, &r.by_set_positions)
            }
            Frequency::Weekly => {
                let tt = expand::expand_by_seconds(tt, &r.by_seconds);
                let tt = expand::expand_by_minutes(tt, &r.by_minutes);
                let tt = expand::expand_by_hours(tt, &r.by_hours);
                let tt = expand::limit_by_set_positions(
                    tt,
                    &r.by_set_positions,
                );
                expand::expand_by_weekdays(tt, week_start, &r.by_weekdays)
            }
            Frequency::Monthly => {
                let tt = expand::expand_by_seconds(tt, &r.by_seconds);
                let tt = expand::expand_by_minutes(tt, &r.by_minutes);
                let tt = expand::expand_by_hours(tt, &r.by_hours);
                if !r.by_month_days.is_empty() {
                    expand::expand_by_month_days(
                        tt,
                        r.invalid,
                        &r.by_month_days,
                    )
                } else if !r.by_weekdays.is_empty() {
                    expand::expand_month_by_weekdays(
                        tt,
                        r.invalid,
                        &r.by_set_positions,
                        &r.by_weekdays,
                    )
                } else {
                    tt
                }
            }
            Frequency::Yearly => {
                let tt = expand::expand_by_seconds(tt, &r.by_seconds);
                let tt = expand::expand_by_minutes(tt, &r.by_minutes);
                let tt = expand::expand_by_hours(tt, &r.by_hours);
                let tt = expand::expand_by_month_days(
                    tt,
                    r.invalid,
                    &r.by_month_days,
                );
                let tt = expand::expand_by_year_days(
                    tt,
                    r.invalid,
                    &r.by_year_days,
                );
                let stripped: Vec<Weekday> =
                    r.by_weekdays.iter().map(|wd| wd.weekday()).collect();
                let tt = expand::expand_by_week_numbers(
                    tt,
                    r.invalid,
                    week_start,
                    &stripped,
                    &r.by_week_numbers,
                );
                let tt =
                    expand::expand_by_months(tt, r.invalid, &r.by_months);
                // See note 2 on page 44 of RFC 5545, with erratum 3779:
                // BYDAY expands only when neither BYYEARDAY nor
                // BYMONTHDAY is present.
                let tt = if r.by_year_days.is_empty()
                    && r.by_month_days.is_empty()
                {
                    if !r.by_months.is_empty() {
                        expand::expand_month_by_weekdays(
                            tt,
                            r.invalid,
                            &[],
                            &r.by_weekdays,
                        )
                    } else {
                        expand::expand_year_by_weekdays(
                            tt,
                            r.invalid,
                            &r.by_weekdays,
                        )
                    }
                } else {
                    tt
                };
                expand::limit_by_set_positions(tt, &r.by_set_positions)
            }
        }
    }
}

impl Iterator for RRuleIter {
    type Item = Zoned;

    fn next(&mut self) -> Option<Zoned> {
        self.fill_queue();
        self.queue.pop_front()
    }
}

impl std::iter::FusedIterator for RRuleIter {}

/// Compiles the BY sets the given rule's frequency treats as filters.
///
/// The split between filtering and expanding follows the table in RFC
/// 5545 §3.3.10 (note 2, with errata 3747): everything at or above the
/// frequency's unit filters, everything below expands, and BYDAY at
/// monthly/yearly frequency flips to a filter when an explicit day rule
/// is present.
fn engine_filters(rule: &RRule) -> Filters {
    let weekdays: Vec<Weekday> =
        rule.by_weekdays.iter().map(|wd| wd.weekday()).collect();
    match rule.frequency {
        Frequency::Secondly => Filters {
            seconds: rule.by_seconds.clone(),
            minutes: rule.by_minutes.clone(),
            hours: rule.by_hours.clone(),
            weekdays,
            month_days: rule.by_month_days.clone(),
            months: rule.by_months.clone(),
            week_numbers: rule.by_week_numbers.clone(),
            year_days: rule.by_year_days.clone(),
        },
        Frequency::Minutely => Filters {
            minutes: rule.by_minutes.clone(),
            hours: rule.by_hours.clone(),
            weekdays,
            month_days: rule.by_month_days.clone(),
            months: rule.by_months.clone(),
            week_numbers: rule.by_week_numbers.clone(),
            year_days: rule.by_year_days.clone(),
            ..Filters::default()
        },
        Frequency::Hourly => Filters {
            hours: rule.by_hours.clone(),
            weekdays,
            month_days: rule.by_month_days.clone(),
            months: rule.by_months.clone(),
            week_numbers: rule.by_week_numbers.clone(),
            year_days: rule.by_year_days.clone(),
            ..Filters::default()
        },
        Frequency::Daily => Filters {
            months: rule.by_months.clone(),
            month_days: rule.by_month_days.clone(),
            weekdays,
            ..Filters::default()
        },
        Frequency::Weekly => Filters {
            months: rule.by_months.clone(),
            ..Filters::default()
        },
        Frequency::Monthly => Filters {
            months: rule.by_months.clone(),
            weekdays: if rule.by_month_days.is_empty() {
                vec![]
            } else {
                weekdays
            },
            ..Filters::default()
        },
        Frequency::Yearly => Filters {
            months: rule.by_months.clone(),
            weekdays: if rule.by_year_days.is_empty()
                && rule.by_month_days.is_empty()
            {
                vec![]
            } else {
                weekdays
            },
            ..Filters::default()
        },
    }
}

/// Builds the cursor for the rule's frequency.
fn engine_cursor(rule: &RRule, start: &Zoned) -> Cursor {
    let interval = rule.interval.max(1);

    if rule.frequency == Frequency::Secondly
        && interval == 1
        && !rule.by_seconds.is_empty()
    {
        return second_cycle_cursor(rule, start);
    }

    match rule.frequency {
        Frequency::Monthly | Frequency::Yearly => {
            let months = match rule.frequency {
                Frequency::Monthly => i64::from(interval),
                _ => 12 * i64::from(interval),
            };
            // When a BY rule picks the day (or the whole date), key
            // times only carry the month; anchor them to the 1st so
            // short months aren't skipped over.
            let day_is_replaced = match rule.frequency {
                Frequency::Monthly => {
                    !rule.by_month_days.is_empty()
                        || !rule.by_weekdays.is_empty()
                }
                // BYWEEKNO is deliberately absent here: its expansion
                // with an empty BYDAY falls back to the key time's own
                // weekday, which must stay the start's weekday.
                _ => {
                    !rule.by_month_days.is_empty()
                        || !rule.by_year_days.is_empty()
                        || !rule.by_weekdays.is_empty()
                }
            };
            Cursor::Calendar {
                start: start.clone(),
                months,
                day: if day_is_replaced { 1 } else { start.day() },
                ib: rule.invalid,
                attempt: 0,
            }
        }
        freq => match freq.to_span(interval) {
            Some(step) => {
                Cursor::Step { start: start.clone(), step, attempt: 0 }
            }
            None => Cursor::Exhausted,
        },
    }
}

/// Precomputes the delta cycle for the secondly fast path.
///
/// An interval-1 secondly rule with BYSECOND would tick through (and
/// immediately filter out) the vast majority of seconds. Jumping from
/// one BYSECOND value to the next instead makes the cursor visit only
/// key times that can survive the second filter.
fn second_cycle_cursor(rule: &RRule, start: &Zoned) -> Cursor {
    let mut seconds: Vec<i64> = rule
        .by_seconds
        .iter()
        .map(|&s| {
            if s < 0 { i64::from(s) + 60 } else { i64::from(s) }
        })
        .collect();
    seconds.sort_unstable();
    seconds.dedup();

    let initial = i64::from(start.second());
    let mut deltas = Vec::with_capacity(seconds.len());
    let mut first = None;
    let mut idx = 0;
    for (i, &s) in seconds.iter().enumerate() {
        if first.is_none() && s > initial {
            first = Some(s - initial);
            idx = i;
        }
        let next = seconds[(i + 1) % seconds.len()];
        let delta = if i + 1 == seconds.len() {
            60 + next - s
        } else {
            next - s
        };
        deltas.push(delta);
    }
    // Every BYSECOND value sits at or before the start's second, so the
    // first jump wraps around the minute.
    let first = first.unwrap_or(seconds[0] + 60 - initial);

    Cursor::SecondCycle {
        current: Some(start.clone()),
        first: Some(first),
        deltas,
        idx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weekday::ByWeekday;

    fn zoned(s: &str) -> Zoned {
        s.parse().unwrap()
    }

    // The starting point used by most of these: a Saturday.
    fn start() -> Zoned {
        zoned("20180825T090807[UTC]")
    }

    fn snapshot<T>(it: impl IntoIterator<Item = T>) -> String
    where
        T: ToString,
    {
        it.into_iter()
            .map(|item| item.to_string())
            .collect::<Vec<String>>()
            .join("\n")
    }

    #[test]
    fn simple_secondly() {
        let rule = RRule {
            count: Some(3),
            dtstart: Some(start()),
            ..RRule::new(Frequency::Secondly)
        };
        insta::assert_snapshot!(
            snapshot(rule.iterator().unwrap()),
            @r"
        2018-08-25T09:08:07+00:00[UTC]
        2018-08-25T09:08:08+00:00[UTC]
        2018-08-25T09:08:09+00:00[UTC]
        ",
        );
    }

    #[test]
    fn simple_minutely() {
        let rule = RRule {
            count: Some(3),
            dtstart: Some(start()),
            ..RRule::new(Frequency::Minutely)
        };
        insta::assert_snapshot!(
            snapshot(rule.iterator().unwrap()),
            @r"
        2018-08-25T09:08:07+00:00[UTC]
        2018-08-25T09:09:07+00:00[UTC]
        2018-08-25T09:10:07+00:00[UTC]
        ",
        );
    }

    #[test]
    fn simple_hourly() {
        let rule = RRule {
            count: Some(3),
            dtstart: Some(start()),
            ..RRule::new(Frequency::Hourly)
        };
        insta::assert_snapshot!(
            snapshot(rule.iterator().unwrap()),
            @r"
        2018-08-25T09:08:07+00:00[UTC]
        2018-08-25T10:08:07+00:00[UTC]
        2018-08-25T11:08:07+00:00[UTC]
        ",
        );
    }

    #[test]
    fn simple_daily() {
        let rule = RRule {
            count: Some(3),
            dtstart: Some(start()),
            ..RRule::new(Frequency::Daily)
        };
        insta::assert_snapshot!(
            snapshot(rule.iterator().unwrap()),
            @r"
        2018-08-25T09:08:07+00:00[UTC]
        2018-08-26T09:08:07+00:00[UTC]
        2018-08-27T09:08:07+00:00[UTC]
        ",
        );
    }

    #[test]
    fn daily_across_a_fall_back_transition() {
        // New York leaves daylight time on 2018-11-04 at 02:00, so the
        // third instant picks up the standard-time offset while keeping
        // its one o'clock wall time.
        let rule = RRule {
            count: Some(3),
            dtstart: Some(zoned("20181103T010000[America/New_York]")),
            ..RRule::new(Frequency::Daily)
        };
        insta::assert_snapshot!(
            snapshot(rule.iterator().unwrap()),
            @r"
        2018-11-03T01:00:00-04:00[America/New_York]
        2018-11-04T01:00:00-04:00[America/New_York]
        2018-11-05T01:00:00-05:00[America/New_York]
        ",
        );
    }

    #[test]
    fn weekly_on_tuesday() {
        let rule = RRule {
            count: Some(3),
            dtstart: Some(start()),
            by_weekdays: vec![ByWeekday::Any(Weekday::Tuesday)],
            ..RRule::new(Frequency::Weekly)
        };
        insta::assert_snapshot!(
            snapshot(rule.iterator().unwrap()),
            @r"
        2018-08-28T09:08:07+00:00[UTC]
        2018-09-04T09:08:07+00:00[UTC]
        2018-09-11T09:08:07+00:00[UTC]
        ",
        );
    }

    #[test]
    fn monthly_first_tuesday() {
        let rule = RRule {
            count: Some(3),
            dtstart: Some(start()),
            by_weekdays: vec![ByWeekday::Nth {
                nth: 1,
                weekday: Weekday::Tuesday,
            }],
            ..RRule::new(Frequency::Monthly)
        };
        insta::assert_snapshot!(
            snapshot(rule.iterator().unwrap()),
            @r"
        2018-09-04T09:08:07+00:00[UTC]
        2018-10-02T09:08:07+00:00[UTC]
        2018-11-06T09:08:07+00:00[UTC]
        ",
        );
    }

    #[test]
    fn monthly_set_positions_over_every_weekday() {
        let rule = RRule {
            count: Some(4),
            dtstart: Some(start()),
            by_weekdays: [
                Weekday::Monday,
                Weekday::Tuesday,
                Weekday::Wednesday,
                Weekday::Thursday,
                Weekday::Friday,
                Weekday::Saturday,
                Weekday::Sunday,
            ]
            .into_iter()
            .map(ByWeekday::Any)
            .collect(),
            by_months: vec![8, 9],
            by_set_positions: vec![1, 3, -1],
            ..RRule::new(Frequency::Monthly)
        };
        insta::assert_snapshot!(
            snapshot(rule.iterator().unwrap()),
            @r"
        2018-08-31T09:08:07+00:00[UTC]
        2018-09-01T09:08:07+00:00[UTC]
        2018-09-03T09:08:07+00:00[UTC]
        2018-09-30T09:08:07+00:00[UTC]
        ",
        );
    }

    #[test]
    fn monthly_negative_month_day() {
        // The third-to-last day of each month.
        let rule = RRule {
            count: Some(4),
            dtstart: Some(start()),
            by_month_days: vec![-3],
            ..RRule::new(Frequency::Monthly)
        };
        insta::assert_snapshot!(
            snapshot(rule.iterator().unwrap()),
            @r"
        2018-08-29T09:08:07+00:00[UTC]
        2018-09-28T09:08:07+00:00[UTC]
        2018-10-29T09:08:07+00:00[UTC]
        2018-11-28T09:08:07+00:00[UTC]
        ",
        );
    }

    #[test]
    fn monthly_on_the_thirty_first_skips_short_months() {
        let rule = RRule {
            count: Some(4),
            dtstart: Some(zoned("20180131T090000[UTC]")),
            ..RRule::new(Frequency::Monthly)
        };
        insta::assert_snapshot!(
            snapshot(rule.iterator().unwrap()),
            @r"
        2018-01-31T09:00:00+00:00[UTC]
        2018-03-31T09:00:00+00:00[UTC]
        2018-05-31T09:00:00+00:00[UTC]
        2018-07-31T09:00:00+00:00[UTC]
        ",
        );
    }

    #[test]
    fn monthly_on_the_thirty_first_clamps_under_prev() {
        let rule = RRule {
            count: Some(4),
            dtstart: Some(zoned("20180131T090000[UTC]")),
            invalid: InvalidBehavior::Prev,
            ..RRule::new(Frequency::Monthly)
        };
        insta::assert_snapshot!(
            snapshot(rule.iterator().unwrap()),
            @r"
        2018-01-31T09:00:00+00:00[UTC]
        2018-02-28T09:00:00+00:00[UTC]
        2018-03-31T09:00:00+00:00[UTC]
        2018-04-30T09:00:00+00:00[UTC]
        ",
        );
    }

    #[test]
    fn monthly_on_the_thirty_first_rolls_over_under_next() {
        let rule = RRule {
            count: Some(3),
            dtstart: Some(zoned("20180131T090000[UTC]")),
            invalid: InvalidBehavior::Next,
            ..RRule::new(Frequency::Monthly)
        };
        insta::assert_snapshot!(
            snapshot(rule.iterator().unwrap()),
            @r"
        2018-01-31T09:00:00+00:00[UTC]
        2018-03-03T09:00:00+00:00[UTC]
        2018-03-31T09:00:00+00:00[UTC]
        ",
        );
    }

    #[test]
    fn yearly_with_week_numbers() {
        let rule = RRule {
            count: Some(3),
            dtstart: Some(start()),
            by_week_numbers: vec![1, 20],
            ..RRule::new(Frequency::Yearly)
        };
        // The start is a Saturday, so with no BYDAY each selected week
        // contributes its Saturday.
        insta::assert_snapshot!(
            snapshot(rule.iterator().unwrap()),
            @r"
        2019-01-05T09:08:07+00:00[UTC]
        2019-05-18T09:08:07+00:00[UTC]
        2020-01-04T09:08:07+00:00[UTC]
        ",
        );
    }

    #[test]
    fn yearly_by_month_keeps_the_start_day() {
        let rule = RRule {
            count: Some(4),
            dtstart: Some(start()),
            by_months: vec![2, 8],
            ..RRule::new(Frequency::Yearly)
        };
        insta::assert_snapshot!(
            snapshot(rule.iterator().unwrap()),
            @r"
        2018-08-25T09:08:07+00:00[UTC]
        2019-02-25T09:08:07+00:00[UTC]
        2019-08-25T09:08:07+00:00[UTC]
        2020-02-25T09:08:07+00:00[UTC]
        ",
        );
    }

    #[test]
    fn secondly_fast_path_jumps_between_seconds() {
        let rule = RRule {
            count: Some(4),
            dtstart: Some(start()),
            by_seconds: vec![1, 2, 3],
            by_months: vec![8, 9],
            ..RRule::new(Frequency::Secondly)
        };
        insta::assert_snapshot!(
            snapshot(rule.iterator().unwrap()),
            @r"
        2018-08-25T09:09:01+00:00[UTC]
        2018-08-25T09:09:02+00:00[UTC]
        2018-08-25T09:09:03+00:00[UTC]
        2018-08-25T09:10:01+00:00[UTC]
        ",
        );
    }

    #[test]
    fn secondly_fast_path_with_wrap_around_start() {
        // All BYSECOND values are below the start's second, so the
        // first jump wraps into the next minute.
        let rule = RRule {
            count: Some(3),
            dtstart: Some(start()),
            by_seconds: vec![-55, 6],
            ..RRule::new(Frequency::Secondly)
        };
        insta::assert_snapshot!(
            snapshot(rule.iterator().unwrap()),
            @r"
        2018-08-25T09:09:05+00:00[UTC]
        2018-08-25T09:09:06+00:00[UTC]
        2018-08-25T09:10:05+00:00[UTC]
        ",
        );
    }

    #[test]
    fn until_is_inclusive() {
        let rule = RRule {
            dtstart: Some(start()),
            until: Some(zoned("20180827T090807[UTC]")),
            ..RRule::new(Frequency::Daily)
        };
        insta::assert_snapshot!(
            snapshot(rule.iterator().unwrap()),
            @r"
        2018-08-25T09:08:07+00:00[UTC]
        2018-08-26T09:08:07+00:00[UTC]
        2018-08-27T09:08:07+00:00[UTC]
        ",
        );
    }

    #[test]
    fn until_bounds_a_rule_that_generates_nothing() {
        // February 31st never exists; the engine must still notice the
        // until bound rather than search forever.
        let rule = RRule {
            dtstart: Some(start()),
            until: Some(zoned("20200101T000000[UTC]")),
            by_months: vec![2],
            by_month_days: vec![31],
            ..RRule::new(Frequency::Yearly)
        };
        assert_eq!(rule.iterator().unwrap().count(), 0);
    }

    #[test]
    fn peek_and_next_agree() {
        let rule = RRule {
            count: Some(5),
            dtstart: Some(start()),
            ..RRule::new(Frequency::Daily)
        };
        let mut iter = rule.iterator().unwrap();
        loop {
            let once = iter.peek().cloned();
            let again = iter.peek().cloned();
            assert_eq!(once, again);
            let next = iter.next();
            assert_eq!(once, next);
            if next.is_none() {
                break;
            }
        }
    }

    #[test]
    fn emissions_are_sorted_even_for_unsorted_by_lists() {
        let rule = RRule {
            count: Some(6),
            dtstart: Some(start()),
            by_hours: vec![17, 3],
            by_minutes: vec![30, 0],
            ..RRule::new(Frequency::Daily)
        };
        let got: Vec<Zoned> = rule.iterator().unwrap().collect();
        let mut sorted = got.clone();
        sorted.sort();
        assert_eq!(got, sorted);
    }

    #[test]
    fn interval_zero_is_treated_as_one() {
        let rule = RRule {
            count: Some(2),
            interval: 0,
            dtstart: Some(start()),
            ..RRule::new(Frequency::Daily)
        };
        insta::assert_snapshot!(
            snapshot(rule.iterator().unwrap()),
            @r"
        2018-08-25T09:08:07+00:00[UTC]
        2018-08-26T09:08:07+00:00[UTC]
        ",
        );
    }

    #[test]
    fn dates_queue_replays_sorted() {
        let dates = vec![
            zoned("20180827T000000[UTC]"),
            zoned("20180825T000000[UTC]"),
            zoned("20180826T000000[UTC]"),
        ];
        let iter = RRuleIter::from_dates(dates);
        insta::assert_snapshot!(
            snapshot(iter),
            @r"
        2018-08-25T00:00:00+00:00[UTC]
        2018-08-26T00:00:00+00:00[UTC]
        2018-08-27T00:00:00+00:00[UTC]
        ",
        );
    }
}
