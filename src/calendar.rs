use jiff::{
    ToSpan, Zoned,
    civil::{Date, DateTime, Weekday},
    tz::TimeZone,
};

use crate::{
    expand::limit_by_set_positions,
    rule::InvalidBehavior,
    weekday::ByWeekday,
};

/// Materializes a civil datetime in the given zone.
///
/// Ambiguity is resolved the way RFC 5545 wants for generated datetimes:
/// a repeated local time resolves to its first (earlier) occurrence, and
/// a local time swallowed by a spring-forward gap is pushed past the gap.
/// Returns `None` if the datetime is unrepresentable in the zone.
pub(crate) fn to_zoned(tz: &TimeZone, dt: DateTime) -> Option<Zoned> {
    tz.to_ambiguous_zoned(dt).compatible().ok()
}

/// Returns `t` with its date swapped out, keeping time-of-day and zone.
pub(crate) fn with_date(t: &Zoned, date: Date) -> Option<Zoned> {
    to_zoned(t.time_zone(), DateTime::from_parts(date, t.time()))
}

/// The instant with the same time-of-day and zone as `t`, on the first
/// day of its civil month.
pub(crate) fn first_of_month(t: &Zoned) -> Option<Zoned> {
    with_date(t, t.date().first_of_month())
}

/// The instant with the same time-of-day and zone as `t`, on the last
/// day of its civil month.
pub(crate) fn last_of_month(t: &Zoned) -> Option<Zoned> {
    with_date(t, t.date().last_of_month())
}

/// The number of days to go forward from weekday `from` to reach `to`.
/// Zero when they are equal.
pub(crate) fn days_to(from: Weekday, to: Weekday) -> i32 {
    let diff = i32::from(to.to_monday_zero_offset())
        - i32::from(from.to_monday_zero_offset());
    if diff < 0 { diff + 7 } else { diff }
}

/// The number of days to go backward from weekday `from` to reach `to`.
/// Zero when they are equal.
pub(crate) fn days_from(from: Weekday, to: Weekday) -> i32 {
    days_to(to, from)
}

/// Walks `t` forward day by day until it lands on `weekday`.
pub(crate) fn forward_to_weekday(t: &Zoned, weekday: Weekday) -> Option<Zoned> {
    let mut t = t.clone();
    while t.weekday() != weekday {
        t = t.checked_add(1.day()).ok()?;
    }
    Some(t)
}

/// Walks `t` backward day by day until it lands on `weekday`.
pub(crate) fn back_to_weekday(t: &Zoned, weekday: Weekday) -> Option<Zoned> {
    let mut t = t.clone();
    while t.weekday() != weekday {
        t = t.checked_sub(1.day()).ok()?;
    }
    Some(t)
}

/// How many times `weekday` occurs in the month ending on
/// `last_of_month`. Always 4 or 5.
pub(crate) fn count_weekdays_in_month(
    weekday: Weekday,
    last_of_month: &Zoned,
) -> i32 {
    let last_date = i32::from(last_of_month.day());
    let days_back = days_from(last_of_month.weekday(), weekday);
    if days_back < last_date - 28 { 5 } else { 4 }
}

/// The first instant of week 1 of `t`'s year, for weeks anchored on
/// `week_start`.
///
/// This is RFC 5545's "week 1 contains January 4th" rule: take January
/// 1st (with `t`'s time-of-day and zone) and move forward to
/// `week_start`; if that lands on or before the 4th, week 1 starts
/// there, otherwise it started on the `week_start` before January 1st.
pub(crate) fn year_start(t: &Zoned, week_start: Weekday) -> Option<Zoned> {
    let jan1 = with_date(t, Date::new(t.year(), 1, 1).ok()?)?;
    let fw = forward_to_weekday(&jan1, week_start)?;
    if fw.day() <= 4 { Some(fw) } else { back_to_weekday(&jan1, week_start) }
}

/// Finds all the applicable weekdays in the month of `t`.
///
/// Each entry selects either every occurrence of its weekday in the
/// month, or a single occurrence counted from the start (positive) or
/// the end (negative). An occurrence that falls outside the month is
/// subject to `ib`: omitted, clamped into this month, or pushed into
/// the adjacent one. `by_set_positions` is applied to the sorted day
/// numbers before materializing, which keeps the monthly engine from
/// building instants it will immediately throw away.
pub(crate) fn weekdays_in_month(
    t: &Zoned,
    weekdays: &[ByWeekday],
    by_set_positions: &[i32],
    ib: InvalidBehavior,
) -> Vec<Zoned> {
    let Some(first_day) = first_of_month(t) else { return vec![] };
    let Some(last_day) = last_of_month(t) else { return vec![] };
    let first_weekday = first_day.weekday();
    let last_weekday = last_day.weekday();
    let last_date = i32::from(last_day.day());

    let mut dates: Vec<i32> = Vec::with_capacity(weekdays.len());
    // Set when an out-of-month occurrence must be anchored to the first
    // day of the next month (or the last day of the previous one).
    let mut flag_next_month = false;
    let mut flag_prev_month = false;

    for weekday in weekdays {
        let wd = weekday.weekday();
        let nth = i32::from(weekday.nth());

        if nth == 0 {
            let count = count_weekdays_in_month(wd, &last_day);
            let days_til = days_to(first_weekday, wd);
            for i in 0..count {
                let date = i * 7 + days_til + 1;
                if date <= last_date {
                    dates.push(date);
                }
            }
        } else if nth > 0 {
            let date = (nth - 1) * 7 + days_to(first_weekday, wd) + 1;
            if date > last_date {
                match ib {
                    InvalidBehavior::Omit => {}
                    InvalidBehavior::Next => flag_next_month = true,
                    InvalidBehavior::Prev => dates.push(last_date),
                }
            } else {
                dates.push(date);
            }
        } else {
            let date = last_date + 7 * (nth + 1) - days_from(last_weekday, wd);
            if date <= 0 {
                match ib {
                    InvalidBehavior::Omit => {}
                    InvalidBehavior::Next => dates.push(date),
                    InvalidBehavior::Prev => flag_prev_month = true,
                }
            } else {
                dates.push(date);
            }
        }
    }

    dates.sort_unstable();
    let dates = limit_by_set_positions(dates, by_set_positions);

    let mut out: Vec<Zoned> = dates
        .into_iter()
        .filter_map(|date| {
            first_day.checked_add((date - 1).days()).ok()
        })
        .collect();
    if flag_next_month {
        if let Ok(anchor) = last_day.checked_add(1.day()) {
            out.push(anchor);
        }
    }
    if flag_prev_month {
        if let Ok(anchor) = first_day.checked_sub(1.day()) {
            out.push(anchor);
        }
    }

    if !matches!(ib, InvalidBehavior::Omit) {
        out.sort();
        out.dedup();
    }
    out
}

/// Finds the applicable weekdays in the civil year of `t` for a single
/// entry: every occurrence, or the Nth from the start or end of the
/// year. An ordinal pointing outside the year is subject to `ib`.
pub(crate) fn weekdays_in_year(
    t: &Zoned,
    weekday: ByWeekday,
    ib: InvalidBehavior,
) -> Vec<Zoned> {
    let year = t.year();
    let Ok(date) = Date::new(year, 1, 1) else { return vec![] };
    let Some(jan1) = with_date(t, date) else { return vec![] };
    let Some(mut day) = forward_to_weekday(&jan1, weekday.weekday()) else {
        return vec![];
    };

    let mut all: Vec<Zoned> = Vec::with_capacity(53);
    loop {
        all.push(day.clone());
        day = match day.checked_add(7.days()) {
            Ok(next) => next,
            Err(_) => break,
        };
        if day.year() != year {
            break;
        }
    }

    let nth = i32::from(weekday.nth());
    if nth == 0 {
        return all;
    }

    let len = all.len() as i32;
    let idx = if nth > 0 { nth - 1 } else { len + nth };
    if (0..len).contains(&idx) {
        return vec![all[idx as usize].clone()];
    }

    // The ordinal points past an end of the year.
    match (ib, nth > 0) {
        (InvalidBehavior::Omit, _) => vec![],
        (InvalidBehavior::Next, true) => all
            .last()
            .and_then(|last| last.checked_add(7.days()).ok())
            .into_iter()
            .collect(),
        (InvalidBehavior::Prev, true) => {
            all.last().cloned().into_iter().collect()
        }
        (InvalidBehavior::Next, false) => {
            all.first().cloned().into_iter().collect()
        }
        (InvalidBehavior::Prev, false) => all
            .first()
            .and_then(|first| first.checked_sub(7.days()).ok())
            .into_iter()
            .collect(),
    }
}
