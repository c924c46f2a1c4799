use jiff::{
    Zoned,
    civil::{Date, DateTime, Time},
    tz::{AmbiguousOffset, Offset, TimeZone},
};

use crate::{
    error::Error,
    frequency::Frequency,
    recurrence::Recurrence,
    rule::RRule,
    weekday::{ByWeekday, parse_weekday},
};

/// Looks a zone up by its IANA name in the time zone database.
pub fn load_location(name: &str) -> Result<TimeZone, Error> {
    TimeZone::get(name)
        .map_err(|_| Error::UnknownTimeZone(name.to_string()))
}

/// Parses an RFC 5545 datetime property value.
///
/// The value may carry a leading property name (`DTSTART;TZID=...:` or
/// `UNTIL=`), which is skipped. The datetime itself is one of, first
/// match wins:
///
/// * `YYYYMMDDTHHMMSSZ` — UTC
/// * `YYYYMMDDTHHMMSS±HHMM` — fixed offset
/// * `YYYYMMDDTHHMMSS` — local to the TZID zone, or the default zone;
///   with neither, a *floating* local time interpreted in UTC
///
/// The returned flag is true for the floating case.
///
/// A local time that falls in a DST transition resolves the way RFC
/// 5545 §3.3.5 spells out rather than whatever the platform feels
/// like: a repeated time means its first occurrence, and a time inside
/// a spring-forward gap is read with the offset in effect before the
/// gap (advancing it past the gap on the wall clock).
pub(crate) fn parse_time(
    s: &str,
    default: Option<&TimeZone>,
) -> Result<(Zoned, bool), Error> {
    let mut tz = default.cloned().unwrap_or(TimeZone::UTC);
    let mut has_zone = false;
    let mut rest = s;

    if let Some(id_beg) = rest.find(";TZID=") {
        let loc_beg = id_beg + 6;
        let Some(loc_len) = rest[loc_beg..].find(':') else {
            return Err(Error::UnterminatedTzid);
        };
        tz = load_location(&rest[loc_beg..loc_beg + loc_len])?;
        has_zone = true;
        rest = &rest[loc_beg + loc_len + 1..];
    } else if let Some(idx) = rest.find([':', '=']) {
        rest = &rest[idx + 1..];
    }

    let invalid = || Error::InvalidTime(s.to_string());

    if let Some(naked) = rest.strip_suffix(['Z', 'z']) {
        let dt = parse_civil(naked).ok_or_else(invalid)?;
        let ts = Offset::UTC.to_timestamp(dt).map_err(|_| invalid())?;
        return Ok((ts.to_zoned(TimeZone::UTC), false));
    }

    if rest.len() == 20 && matches!(rest.as_bytes()[15], b'+' | b'-') {
        let dt = parse_civil(&rest[..15]).ok_or_else(invalid)?;
        let hours: i32 = rest[16..18].parse().map_err(|_| invalid())?;
        let minutes: i32 =
            rest[18..20].parse().map_err(|_| invalid())?;
        let mut seconds = hours * 3600 + minutes * 60;
        if rest.as_bytes()[15] == b'-' {
            seconds = -seconds;
        }
        let offset =
            Offset::from_seconds(seconds).map_err(|_| invalid())?;
        let ts = offset.to_timestamp(dt).map_err(|_| invalid())?;
        return Ok((ts.to_zoned(TimeZone::fixed(offset)), false));
    }

    let dt = parse_civil(rest).ok_or_else(invalid)?;
    let offset = match tz.to_ambiguous_zoned(dt).offset() {
        AmbiguousOffset::Unambiguous { offset } => offset,
        // The first of the two occurrences of a repeated local time.
        AmbiguousOffset::Fold { before, .. } => before,
        // The offset in effect before a spring-forward gap.
        AmbiguousOffset::Gap { before, .. } => before,
    };
    let ts = offset.to_timestamp(dt).map_err(|_| invalid())?;
    Ok((ts.to_zoned(tz), !has_zone))
}

/// Parses the compact `YYYYMMDDTHHMMSS` civil form.
fn parse_civil(s: &str) -> Option<DateTime> {
    let b = s.as_bytes();
    if b.len() != 15 || b[8] != b'T' {
        return None;
    }
    let num = |range: std::ops::Range<usize>| -> Option<i16> {
        let part = &s[range];
        if !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        part.parse().ok()
    };
    let date =
        Date::new(num(0..4)?, num(4..6)? as i8, num(6..8)? as i8).ok()?;
    let time = Time::new(
        num(9..11)? as i8,
        num(11..13)? as i8,
        num(13..15)? as i8,
        0,
    )
    .ok()?;
    Some(DateTime::from_parts(date, time))
}

/// Formats a datetime the way it appears inside an rrule body: naked
/// local time when floating, `Z`-suffixed for UTC, `±HHMM` otherwise.
pub(crate) fn format_time(t: &Zoned, floating: bool) -> String {
    let naked = format!(
        "{:04}{:02}{:02}T{:02}{:02}{:02}",
        t.year(),
        t.month(),
        t.day(),
        t.hour(),
        t.minute(),
        t.second(),
    );
    if floating {
        return naked;
    }
    let offset = t.offset();
    if offset == Offset::UTC {
        return format!("{naked}Z");
    }
    let seconds = offset.seconds();
    let sign = if seconds < 0 { '-' } else { '+' };
    let abs = seconds.abs();
    format!("{naked}{sign}{:02}{:02}", abs / 3600, (abs % 3600) / 60)
}

/// Formats the tail of a recurrence content line: `;TZID=<zone>:<local>`
/// for a named zone, or `:<datetime>` with the usual suffix rules.
pub(crate) fn format_line_time(t: &Zoned, floating: bool) -> String {
    if floating {
        return format!(":{}", format_time(t, true));
    }
    match t.time_zone().iana_name() {
        Some("UTC") | None => format!(":{}", format_time(t, false)),
        Some(name) => format!(";TZID={name}:{}", format_time(t, true)),
    }
}

/// Parses a `;`-separated rrule body such as
/// `FREQ=WEEKLY;COUNT=10;BYDAY=TU,TH`. Keys are case insensitive.
/// Naked datetimes in `UNTIL`/`DTSTART` resolve against `default`.
pub(crate) fn parse_rrule_in(
    s: &str,
    default: &TimeZone,
) -> Result<RRule, Error> {
    let mut rrule = RRule::new(Frequency::Secondly);

    for segment in s.split(';') {
        let Some((key, value)) = segment.split_once('=') else {
            return Err(Error::MalformedSegment(segment.to_string()));
        };
        match &*key.to_ascii_uppercase() {
            "FREQ" => rrule.frequency = value.parse()?,
            "UNTIL" => {
                let (t, floating) = parse_time(value, Some(default))?;
                rrule.until = Some(t);
                rrule.until_floating = floating;
            }
            "DTSTART" => {
                let (t, _) = parse_time(value, Some(default))?;
                rrule.dtstart = Some(t);
            }
            "COUNT" => {
                rrule.count = Some(value.parse().map_err(|_| {
                    Error::InvalidInteger(value.to_string())
                })?);
            }
            "INTERVAL" => {
                rrule.interval = value.parse().map_err(|_| {
                    Error::InvalidInteger(value.to_string())
                })?;
            }
            "BYSECOND" => rrule.by_seconds = parse_i8_list(value)?,
            "BYMINUTE" => rrule.by_minutes = parse_i8_list(value)?,
            "BYHOUR" => rrule.by_hours = parse_i8_list(value)?,
            "BYDAY" => rrule.by_weekdays = parse_weekday_list(value)?,
            "BYMONTHDAY" => {
                rrule.by_month_days = parse_i8_list(value)?;
            }
            "BYYEARDAY" => rrule.by_year_days = parse_i16_list(value)?,
            "BYWEEKNO" => {
                rrule.by_week_numbers = parse_i8_list(value)?;
            }
            "BYMONTH" => rrule.by_months = parse_i8_list(value)?,
            "BYSETPOS" => {
                rrule.by_set_positions = parse_i32_list(value)?;
            }
            "WKST" => rrule.week_start = Some(parse_weekday(value)?),
            _ => return Err(Error::UnknownKey(key.to_string())),
        }
    }

    Ok(rrule)
}

impl std::str::FromStr for RRule {
    type Err = Error;

    /// Parses an rrule body. Naked datetimes resolve to UTC; to anchor
    /// them elsewhere, parse through [`Recurrence::parse`] with a
    /// DTSTART line instead.
    fn from_str(s: &str) -> Result<RRule, Error> {
        parse_rrule_in(s, &TimeZone::UTC)
    }
}

impl Recurrence {
    /// Parses a newline-separated block of recurrence content lines:
    ///
    /// ```text
    /// DTSTART;TZID=America/New_York:19970902T090000
    /// RRULE:FREQ=WEEKLY;BYDAY=TU,TH
    /// EXDATE;TZID=America/New_York:19970909T090000
    /// ```
    ///
    /// `default` is the zone naked datetimes resolve against until a
    /// DTSTART line establishes one; with `None`, UTC. The parsed
    /// dtstart is propagated to every rule.
    pub fn parse(
        s: &str,
        default: Option<TimeZone>,
    ) -> Result<Recurrence, Error> {
        let mut recurrence = Recurrence::default();
        let mut tz = default.unwrap_or(TimeZone::UTC);

        for line in s.lines() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let name_len =
                line.find([';', ':', '=']).unwrap_or(line.len());
            match &*line[..name_len].to_ascii_uppercase() {
                "DTSTART" => {
                    let (t, floating) = parse_time(line, Some(&tz))?;
                    if !floating {
                        tz = t.time_zone().clone();
                    }
                    recurrence.dtstart = Some(t);
                    recurrence.floating_location = floating;
                }
                "RRULE" => {
                    let Some(body) = line.get(name_len + 1..) else {
                        return Err(Error::MalformedSegment(
                            line.to_string(),
                        ));
                    };
                    recurrence.rrules.push(parse_rrule_in(body, &tz)?);
                }
                "EXRULE" => {
                    let Some(body) = line.get(name_len + 1..) else {
                        return Err(Error::MalformedSegment(
                            line.to_string(),
                        ));
                    };
                    recurrence.exrules.push(parse_rrule_in(body, &tz)?);
                }
                "RDATE" => {
                    let (t, _) = parse_time(line, Some(&tz))?;
                    recurrence.rdates.push(t);
                }
                "EXDATE" => {
                    let (t, _) = parse_time(line, Some(&tz))?;
                    recurrence.exdates.push(t);
                }
                name => {
                    return Err(Error::UnknownKey(name.to_string()));
                }
            }
        }

        if recurrence.dtstart.is_some() {
            recurrence.set_dtstart();
        }
        log::trace!(
            "parsed recurrence with {} rrules, {} exrules, {} rdates, \
             {} exdates",
            recurrence.rrules.len(),
            recurrence.exrules.len(),
            recurrence.rdates.len(),
            recurrence.exdates.len(),
        );
        Ok(recurrence)
    }
}

// The list parsers read each element as an i64 first and clamp into the
// field's storage type. Values a BY field can't possibly match are not
// grammar errors; they just never match, and clamping preserves that.

fn parse_i64(s: &str) -> Result<i64, Error> {
    s.parse().map_err(|_| Error::InvalidInteger(s.to_string()))
}

fn parse_i8_list(s: &str) -> Result<Vec<i8>, Error> {
    if s.is_empty() {
        return Ok(vec![]);
    }
    s.split(',')
        .map(|p| {
            parse_i64(p).map(|v| {
                v.clamp(i64::from(i8::MIN), i64::from(i8::MAX)) as i8
            })
        })
        .collect()
}

fn parse_i16_list(s: &str) -> Result<Vec<i16>, Error> {
    if s.is_empty() {
        return Ok(vec![]);
    }
    s.split(',')
        .map(|p| {
            parse_i64(p).map(|v| {
                v.clamp(i64::from(i16::MIN), i64::from(i16::MAX)) as i16
            })
        })
        .collect()
}

fn parse_i32_list(s: &str) -> Result<Vec<i32>, Error> {
    if s.is_empty() {
        return Ok(vec![]);
    }
    s.split(',')
        .map(|p| {
            parse_i64(p).map(|v| {
                v.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
            })
        })
        .collect()
}

fn parse_weekday_list(s: &str) -> Result<Vec<ByWeekday>, Error> {
    s.split(',').map(|p| p.parse()).collect()
}
