use jiff::{
    ToSpan, Zoned,
    civil::{Date, Weekday},
};

use crate::{calendar, rule::InvalidBehavior, weekday::ByWeekday};

// Each expander here takes the variation list built so far and replaces
// it with its cross product against one BY dimension. An empty BY set
// means "not specified", and the list passes through untouched.
//
// The time-of-day expanders work by duration arithmetic (subtract the
// current field, add the target) rather than by rebuilding a civil
// datetime, so a variation that sits next to a DST transition keeps its
// zone offset intact. The date expanders construct from a first-of-
// period anchor plus a day span, which lets the civil calendar
// normalize out-of-range day numbers into the adjacent period; whether
// a normalized date survives is up to the rule's `InvalidBehavior`.

pub(crate) fn expand_by_seconds(
    tt: Vec<Zoned>,
    seconds: &[i8],
) -> Vec<Zoned> {
    if seconds.is_empty() {
        return tt;
    }
    let mut out = Vec::with_capacity(tt.len() * seconds.len());
    for t in tt {
        let Ok(tmpl) = t.checked_sub(i64::from(t.second()).seconds()) else {
            continue;
        };
        for &s in seconds {
            let s = if s < 0 { i64::from(s) + 60 } else { i64::from(s) };
            if let Ok(v) = tmpl.checked_add(s.seconds()) {
                out.push(v);
            }
        }
    }
    out
}

pub(crate) fn expand_by_minutes(
    tt: Vec<Zoned>,
    minutes: &[i8],
) -> Vec<Zoned> {
    if minutes.is_empty() {
        return tt;
    }
    let mut out = Vec::with_capacity(tt.len() * minutes.len());
    for t in tt {
        let Ok(tmpl) = t.checked_sub(i64::from(t.minute()).minutes()) else {
            continue;
        };
        for &m in minutes {
            let m = if m < 0 { i64::from(m) + 60 } else { i64::from(m) };
            if let Ok(v) = tmpl.checked_add(m.minutes()) {
                out.push(v);
            }
        }
    }
    out
}

pub(crate) fn expand_by_hours(tt: Vec<Zoned>, hours: &[i8]) -> Vec<Zoned> {
    if hours.is_empty() {
        return tt;
    }
    let mut out = Vec::with_capacity(tt.len() * hours.len());
    for t in tt {
        let Ok(tmpl) = t.checked_sub(i64::from(t.hour()).hours()) else {
            continue;
        };
        for &h in hours {
            let h = if h < 0 { i64::from(h) + 24 } else { i64::from(h) };
            if let Ok(v) = tmpl.checked_add(h.hours()) {
                out.push(v);
            }
        }
    }
    out
}

/// Expands each variation across the given weekdays within its week,
/// where weeks begin on `week_start`. Ordinal qualifications are
/// meaningless at weekly frequency and are ignored.
pub(crate) fn expand_by_weekdays(
    tt: Vec<Zoned>,
    week_start: Weekday,
    weekdays: &[ByWeekday],
) -> Vec<Zoned> {
    if weekdays.is_empty() {
        return tt;
    }
    let mut out = Vec::with_capacity(tt.len() * weekdays.len());
    for t in tt {
        let Some(start) = calendar::back_to_weekday(&t, week_start) else {
            continue;
        };
        for wd in weekdays {
            if let Some(v) =
                calendar::forward_to_weekday(&start, wd.weekday())
            {
                out.push(v);
            }
        }
    }
    out
}

pub(crate) fn expand_by_month_days(
    tt: Vec<Zoned>,
    ib: InvalidBehavior,
    month_days: &[i8],
) -> Vec<Zoned> {
    if month_days.is_empty() {
        return tt;
    }
    let mut out = Vec::with_capacity(tt.len() * month_days.len());
    for t in tt {
        let Some(first) = calendar::first_of_month(&t) else { continue };
        let days_in_month = i32::from(t.days_in_month());
        for &md in month_days {
            // -1 is the last day of the month; the days of the month
            // are 1-indexed.
            let day = if md < 0 {
                days_in_month + i32::from(md) + 1
            } else {
                i32::from(md)
            };
            let Ok(candidate) = first.checked_add((day - 1).days()) else {
                continue;
            };
            if candidate.month() == t.month() {
                out.push(candidate);
                continue;
            }
            match ib {
                InvalidBehavior::Omit => {}
                InvalidBehavior::Next => {
                    if day > days_in_month {
                        // Already normalized forward into next month.
                        out.push(candidate);
                    } else {
                        out.push(first.clone());
                    }
                }
                InvalidBehavior::Prev => {
                    if day < 1 {
                        // Already normalized backward.
                        out.push(candidate);
                    } else if let Ok(last) =
                        first.checked_add((days_in_month - 1).days())
                    {
                        out.push(last);
                    }
                }
            }
        }
    }
    out
}

pub(crate) fn expand_by_year_days(
    tt: Vec<Zoned>,
    ib: InvalidBehavior,
    year_days: &[i16],
) -> Vec<Zoned> {
    if year_days.is_empty() {
        return tt;
    }
    let mut out = Vec::with_capacity(tt.len() * year_days.len());
    for t in tt {
        let Ok(date) = Date::new(t.year(), 1, 1) else { continue };
        let Some(jan1) = calendar::with_date(&t, date) else { continue };
        let days_in_year = i32::from(t.days_in_year());
        for &yd in year_days {
            let day = if yd < 0 {
                days_in_year + i32::from(yd) + 1
            } else {
                i32::from(yd)
            };
            let Ok(candidate) = jan1.checked_add((day - 1).days()) else {
                continue;
            };
            if candidate.year() == t.year() {
                out.push(candidate);
                continue;
            }
            match ib {
                InvalidBehavior::Omit => {}
                InvalidBehavior::Next => {
                    if day >= 1 {
                        out.push(candidate);
                    } else {
                        out.push(jan1.clone());
                    }
                }
                InvalidBehavior::Prev => {
                    if day >= 1 {
                        if let Ok(v) = candidate.checked_sub(1.day()) {
                            out.push(v);
                        }
                    } else {
                        out.push(candidate);
                    }
                }
            }
        }
    }
    out
}

/// Expands each variation across ISO weeks of its year, anchored to
/// `week_start`. When `by_weekdays` is empty the variation's own
/// weekday is used, so a bare `BYWEEKNO` picks one instant per week.
pub(crate) fn expand_by_week_numbers(
    tt: Vec<Zoned>,
    ib: InvalidBehavior,
    week_start: Weekday,
    by_weekdays: &[Weekday],
    week_numbers: &[i8],
) -> Vec<Zoned> {
    if week_numbers.is_empty() {
        return tt;
    }
    let mut out = Vec::with_capacity(tt.len() * week_numbers.len());
    for t in tt {
        let Some(ys) = calendar::year_start(&t, week_start) else {
            continue;
        };
        let own = [t.weekday()];
        let weekdays: &[Weekday] =
            if by_weekdays.is_empty() { &own } else { by_weekdays };

        for &w in week_numbers {
            let days = 7 * (i32::from(w) - 1);
            let Ok(ws) = ys.checked_add(days.days()) else { continue };

            // A short year: the requested week ran past the year's last
            // week and actually anchors to the next year.
            let ran_over = calendar::year_start(&ws, week_start)
                .is_none_or(|wys| wys.year() != ys.year());
            if ran_over {
                if matches!(ib, InvalidBehavior::Omit) {
                    continue;
                }
                let next_ys = ys
                    .checked_add(1.year())
                    .ok()
                    .and_then(|t1| calendar::year_start(&t1, week_start));
                let Some(next_ys) = next_ys else { continue };
                for &wd in weekdays {
                    let v = match ib {
                        InvalidBehavior::Next => {
                            calendar::forward_to_weekday(&next_ys, wd)
                        }
                        InvalidBehavior::Prev => {
                            calendar::back_to_weekday(&next_ys, wd)
                        }
                        InvalidBehavior::Omit => unreachable!(),
                    };
                    if let Some(v) = v {
                        out.push(v);
                    }
                }
                continue;
            }

            for &wd in weekdays {
                if let Some(v) = calendar::forward_to_weekday(&ws, wd) {
                    out.push(v);
                }
            }
        }
    }
    out
}

pub(crate) fn expand_by_months(
    tt: Vec<Zoned>,
    ib: InvalidBehavior,
    months: &[i8],
) -> Vec<Zoned> {
    if months.is_empty() {
        return tt;
    }
    let mut out = Vec::with_capacity(tt.len() * months.len());
    for t in tt {
        for &m in months {
            match Date::new(t.year(), m, t.day()) {
                Ok(date) => {
                    if let Some(v) = calendar::with_date(&t, date) {
                        out.push(v);
                    }
                }
                // The day doesn't exist in the target month (or the
                // month itself is out of range, which only Omit can
                // sensibly handle).
                Err(_) => match ib {
                    InvalidBehavior::Omit => {}
                    InvalidBehavior::Prev => {
                        let Ok(first) = Date::new(t.year(), m, 1) else {
                            continue;
                        };
                        let date = first.last_of_month();
                        if let Some(v) = calendar::with_date(&t, date) {
                            out.push(v);
                        }
                    }
                    InvalidBehavior::Next => {
                        let (year, month) = if m == 12 {
                            (t.year() + 1, 1)
                        } else {
                            (t.year(), m + 1)
                        };
                        let Ok(date) = Date::new(year, month, 1) else {
                            continue;
                        };
                        if let Some(v) = calendar::with_date(&t, date) {
                            out.push(v);
                        }
                    }
                },
            }
        }
    }
    out
}

/// The monthly BYDAY expansion. `by_set_positions` is applied to each
/// month's day numbers inside the helper, before any instants are
/// materialized.
pub(crate) fn expand_month_by_weekdays(
    tt: Vec<Zoned>,
    ib: InvalidBehavior,
    by_set_positions: &[i32],
    weekdays: &[ByWeekday],
) -> Vec<Zoned> {
    if weekdays.is_empty() {
        return tt;
    }
    tt.iter()
        .flat_map(|t| {
            calendar::weekdays_in_month(t, weekdays, by_set_positions, ib)
        })
        .collect()
}

/// The yearly BYDAY expansion: every entry's occurrences across the
/// whole year, merged chronologically.
pub(crate) fn expand_year_by_weekdays(
    tt: Vec<Zoned>,
    ib: InvalidBehavior,
    weekdays: &[ByWeekday],
) -> Vec<Zoned> {
    if weekdays.is_empty() {
        return tt;
    }
    let mut out = Vec::new();
    for t in &tt {
        for &wd in weekdays {
            out.extend(calendar::weekdays_in_year(t, wd, ib));
        }
    }
    out.sort();
    out
}

/// The BYSETPOS selector: positions are 1-indexed, negative counts from
/// the end. Duplicate positions collapse and out-of-range positions are
/// dropped silently. The survivors come back sorted ascending.
pub(crate) fn limit_by_set_positions<T: Clone + Ord>(
    list: Vec<T>,
    positions: &[i32],
) -> Vec<T> {
    if positions.is_empty() {
        return list;
    }
    let len = list.len() as i64;
    let mut indices: Vec<i64> = positions
        .iter()
        .map(|&p| {
            if p < 0 { len + i64::from(p) } else { i64::from(p) - 1 }
        })
        .filter(|&i| (0..len).contains(&i))
        .collect();
    indices.sort_unstable();
    indices.dedup();
    let mut out: Vec<T> =
        indices.into_iter().map(|i| list[i as usize].clone()).collect();
    out.sort();
    out
}
