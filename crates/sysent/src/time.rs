//! `sys_time` grammar.
//!
//! Works on the whitespace tokens of normalized text. Recognized shapes:
//!
//! ```text
//! day                  today | tomorrow | yesterday | monday .. sunday
//! clock                noon | midnight | 5pm | 5:30 | 17:00 | 5 pm | 5:30 am
//! at-clock             at <clock> | at 5
//! day [at-clock]       "today at noon", "tomorrow 5pm"
//! at-clock [day]       "noon tomorrow", "at 5 friday"
//! ```
//!
//! A day and a clock next to each other become one candidate.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Offset, TimeZone, Weekday};
use chrono_tz::Tz;
use normalize::Token;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

static HOUR_MERIDIEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})(am|pm)$").expect("valid regex"));
static CLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2}):(\d{2})(am|pm)?$").expect("valid regex"));
static BARE_HOUR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{1,2}$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Grain {
    Day,
    Hour,
    Minute,
}

impl Grain {
    fn as_str(self) -> &'static str {
        match self {
            Grain::Day => "day",
            Grain::Hour => "hour",
            Grain::Minute => "minute",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Day {
    Offset(i64),
    Next(Weekday),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Clock {
    hour: u32,
    minute: u32,
    grain: Grain,
}

/// A recognized expression covering `tokens[first..end]`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TimeMatch {
    pub(crate) first: usize,
    pub(crate) end: usize,
    pub(crate) value: Value,
}

fn parse_day(token: &str) -> Option<Day> {
    let day = match token {
        "today" => Day::Offset(0),
        "tomorrow" => Day::Offset(1),
        "yesterday" => Day::Offset(-1),
        "monday" => Day::Next(Weekday::Mon),
        "tuesday" => Day::Next(Weekday::Tue),
        "wednesday" => Day::Next(Weekday::Wed),
        "thursday" => Day::Next(Weekday::Thu),
        "friday" => Day::Next(Weekday::Fri),
        "saturday" => Day::Next(Weekday::Sat),
        "sunday" => Day::Next(Weekday::Sun),
        _ => return None,
    };
    Some(day)
}

fn with_meridiem(hour: u32, meridiem: &str) -> Option<u32> {
    if !(1..=12).contains(&hour) {
        return None;
    }
    match meridiem {
        "am" => Some(hour % 12),
        "pm" => Some(hour % 12 + 12),
        _ => None,
    }
}

fn meridiem_at(tokens: &[Token], idx: usize) -> Option<&str> {
    tokens
        .get(idx)
        .map(|t| t.text.as_str())
        .filter(|text| matches!(*text, "am" | "pm"))
}

/// Parses a clock starting at `tokens[idx]`; returns it with the tokens used.
fn parse_clock(tokens: &[Token], idx: usize) -> Option<(Clock, usize)> {
    let text = tokens.get(idx)?.text.as_str();
    match text {
        "noon" => {
            return Some((
                Clock {
                    hour: 12,
                    minute: 0,
                    grain: Grain::Hour,
                },
                1,
            ))
        }
        "midnight" => {
            return Some((
                Clock {
                    hour: 0,
                    minute: 0,
                    grain: Grain::Hour,
                },
                1,
            ))
        }
        _ => {}
    }

    if let Some(caps) = HOUR_MERIDIEM.captures(text) {
        let hour = with_meridiem(caps[1].parse().ok()?, &caps[2])?;
        return Some((
            Clock {
                hour,
                minute: 0,
                grain: Grain::Hour,
            },
            1,
        ));
    }

    if let Some(caps) = CLOCK.captures(text) {
        let mut hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        let mut used = 1;
        let meridiem = caps.get(3).map(|m| m.as_str()).or_else(|| {
            let next = meridiem_at(tokens, idx + 1);
            if next.is_some() {
                used = 2;
            }
            next
        });
        if let Some(meridiem) = meridiem {
            hour = with_meridiem(hour, meridiem)?;
        }
        if hour > 23 || minute > 59 {
            return None;
        }
        return Some((
            Clock {
                hour,
                minute,
                grain: Grain::Minute,
            },
            used,
        ));
    }

    if BARE_HOUR.is_match(text) {
        let meridiem = meridiem_at(tokens, idx + 1)?;
        let hour = with_meridiem(text.parse().ok()?, meridiem)?;
        return Some((
            Clock {
                hour,
                minute: 0,
                grain: Grain::Hour,
            },
            2,
        ));
    }

    None
}

/// A clock, optionally introduced by "at". "at 5" reads the bare number as an hour.
fn parse_at_clock(tokens: &[Token], idx: usize) -> Option<(Clock, usize)> {
    if tokens.get(idx).map(|t| t.text.as_str()) != Some("at") {
        return parse_clock(tokens, idx);
    }
    if let Some((clock, used)) = parse_clock(tokens, idx + 1) {
        return Some((clock, used + 1));
    }
    let next = tokens.get(idx + 1)?.text.as_str();
    if !BARE_HOUR.is_match(next) {
        return None;
    }
    let hour: u32 = next.parse().ok()?;
    (hour < 24).then_some((
        Clock {
            hour,
            minute: 0,
            grain: Grain::Hour,
        },
        2,
    ))
}

fn resolve_date(day: Option<Day>, today: NaiveDate) -> Option<NaiveDate> {
    match day {
        None => Some(today),
        Some(Day::Offset(days)) => today.checked_add_signed(Duration::days(days)),
        Some(Day::Next(weekday)) => {
            let current = today.weekday().num_days_from_monday() as i64;
            let target = weekday.num_days_from_monday() as i64;
            let ahead = match (target - current).rem_euclid(7) {
                0 => 7,
                n => n,
            };
            today.checked_add_signed(Duration::days(ahead))
        }
    }
}

/// Renders a local instant as `YYYY-MM-DDTHH:MM:SS.mmm` plus `Z` or `±HH:MM`.
pub(crate) fn format_instant(instant: &DateTime<Tz>) -> String {
    let offset_secs = instant.offset().fix().local_minus_utc();
    let local = instant.naive_local().format("%Y-%m-%dT%H:%M:%S%.3f");
    if offset_secs == 0 {
        return format!("{local}Z");
    }
    let sign = if offset_secs < 0 { '-' } else { '+' };
    let minutes = offset_secs.abs() / 60;
    format!("{local}{sign}{:02}:{:02}", minutes / 60, minutes % 60)
}

fn to_value(day: Option<Day>, clock: Option<Clock>, anchor: &DateTime<Tz>) -> Option<Value> {
    let date = resolve_date(day, anchor.date_naive())?;
    let (time, grain) = match clock {
        Some(clock) => (
            NaiveTime::from_hms_opt(clock.hour, clock.minute, 0)?,
            clock.grain,
        ),
        None => (NaiveTime::MIN, Grain::Day),
    };
    let naive = date.and_time(time);
    let zone = anchor.timezone();
    // A wall time skipped by a DST jump resolves to the first valid instant after it.
    let instant = zone
        .from_local_datetime(&naive)
        .earliest()
        .or_else(|| zone.from_local_datetime(&(naive + Duration::hours(1))).earliest())?;
    Some(json!({
        "value": format_instant(&instant),
        "grain": grain.as_str(),
    }))
}

/// Finds every time expression in `tokens`, left to right, without overlap.
pub(crate) fn find_times(tokens: &[Token], anchor: &DateTime<Tz>) -> Vec<TimeMatch> {
    let mut found = Vec::new();
    let mut idx = 0;

    while idx < tokens.len() {
        let (day, clock, end) = if let Some(day) = parse_day(&tokens[idx].text) {
            match parse_at_clock(tokens, idx + 1) {
                Some((clock, used)) => (Some(day), Some(clock), idx + 1 + used),
                None => (Some(day), None, idx + 1),
            }
        } else if let Some((clock, used)) = parse_at_clock(tokens, idx) {
            let after = idx + used;
            match tokens.get(after).and_then(|t| parse_day(&t.text)) {
                Some(day) => (Some(day), Some(clock), after + 1),
                None => (None, Some(clock), after),
            }
        } else {
            idx += 1;
            continue;
        };

        if let Some(value) = to_value(day, clock, anchor) {
            found.push(TimeMatch {
                first: idx,
                end,
                value,
            });
        }
        idx = end;
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use normalize::tokenize;

    fn anchor(zone: Tz) -> DateTime<Tz> {
        // 2018-01-23T23:08:26Z, a Tuesday
        DateTime::from_timestamp(1_516_748_906, 0)
            .expect("valid timestamp")
            .with_timezone(&zone)
    }

    fn values(text: &str, zone: Tz) -> Vec<(usize, usize, String, String)> {
        let tokens = tokenize(text);
        find_times(&tokens, &anchor(zone))
            .into_iter()
            .map(|m| {
                (
                    m.first,
                    m.end,
                    m.value["value"].as_str().unwrap_or_default().to_string(),
                    m.value["grain"].as_str().unwrap_or_default().to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn day_and_clock_merge() {
        let found = values("today at noon", chrono_tz::America::Bahia);
        assert_eq!(
            found,
            vec![(0, 3, "2018-01-23T12:00:00.000-03:00".into(), "hour".into())]
        );
    }

    #[test]
    fn utc_renders_zulu() {
        let found = values("today at noon", chrono_tz::UTC);
        assert_eq!(found[0].2, "2018-01-23T12:00:00.000Z");
    }

    #[test]
    fn anchor_date_follows_zone() {
        // 23:08 UTC is already the next day in Tokyo
        let found = values("today", chrono_tz::Asia::Tokyo);
        assert_eq!(found[0].2, "2018-01-24T00:00:00.000+09:00");
        assert_eq!(found[0].3, "day");
    }

    #[test]
    fn clock_then_day() {
        let found = values("noon tomorrow", chrono_tz::UTC);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].2, "2018-01-24T12:00:00.000Z");
    }

    #[test]
    fn clock_shapes() {
        let utc = chrono_tz::UTC;
        assert_eq!(values("5pm", utc)[0].2, "2018-01-23T17:00:00.000Z");
        assert_eq!(values("5 pm", utc)[0].1, 2);
        assert_eq!(values("5:30", utc)[0].2, "2018-01-23T05:30:00.000Z");
        assert_eq!(values("5:30 pm", utc)[0].2, "2018-01-23T17:30:00.000Z");
        assert_eq!(values("17:00", utc)[0].3, "minute");
        assert_eq!(values("midnight", utc)[0].2, "2018-01-23T00:00:00.000Z");
        assert_eq!(values("meet at 5", utc)[0].2, "2018-01-23T05:00:00.000Z");
    }

    #[test]
    fn weekday_is_strictly_future() {
        // anchor is a Tuesday
        assert_eq!(values("tuesday", chrono_tz::UTC)[0].2, "2018-01-30T00:00:00.000Z");
        assert_eq!(values("friday", chrono_tz::UTC)[0].2, "2018-01-26T00:00:00.000Z");
    }

    #[test]
    fn invalid_clocks_are_ignored() {
        assert!(values("25:00", chrono_tz::UTC).is_empty());
        assert!(values("13pm", chrono_tz::UTC).is_empty());
        assert!(values("at the office", chrono_tz::UTC).is_empty());
    }

    fn value_at(text: &str, zone: Tz, timestamp: i64) -> String {
        let anchor = DateTime::from_timestamp(timestamp, 0)
            .expect("valid timestamp")
            .with_timezone(&zone);
        let found = find_times(&tokenize(text), &anchor);
        assert_eq!(found.len(), 1, "{text:?}");
        found[0].value["value"].as_str().unwrap_or_default().to_string()
    }

    #[test]
    fn skipped_wall_time_moves_forward_an_hour() {
        // 2018-03-10T12:00 EST; clocks jump from 02:00 to 03:00 the next night
        let found = value_at("tomorrow at 2:30 am", chrono_tz::America::New_York, 1_520_701_200);
        assert_eq!(found, "2018-03-11T03:30:00.000-04:00");
    }

    #[test]
    fn repeated_wall_time_takes_earlier_instant() {
        // 2018-11-03T12:00 EDT; 01:00 to 02:00 happens twice the next night
        let found = value_at("tomorrow at 1:30 am", chrono_tz::America::New_York, 1_541_260_800);
        assert_eq!(found, "2018-11-04T01:30:00.000-04:00");
    }

    #[test]
    fn non_zero_offsets_pad() {
        let instant = chrono_tz::Asia::Kolkata
            .with_ymd_and_hms(2020, 5, 1, 9, 15, 0)
            .single()
            .expect("valid instant");
        assert_eq!(format_instant(&instant), "2020-05-01T09:15:00.000+05:30");
    }
}
