//! The issuance time and validity window at the top of a bulletin.
//!
//! ```text
//! 0759 AM CDT SAT APR 16 2016
//!
//! VALID 161300Z - 171200Z
//! ```

use std::{ops::Range, sync::LazyLock};

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

use crate::error::Error;

/// When a bulletin was issued, and when it's valid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    /// When the bulletin was issued.
    pub issued: DateTime<Utc>,
    /// The period the bulletin covers.
    pub valid: Range<DateTime<Utc>>,
}

// unwrap: these are fixed patterns, and they compile.
static ISSUED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*(\d{3,4}) (AM|PM) ([A-Z]{3}) ([A-Z]{3} [A-Z]{3} \d{1,2} \d{4})\s*$")
        .unwrap()
});
static VALID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2})(\d{2})(\d{2})Z - (\d{2})(\d{2})(\d{2})Z").unwrap());

fn malformed(msg: impl Into<String>) -> Error {
    Error::MalformedBulletin(msg.into())
}

/// Hours east of UTC for the zones that bulletins are issued in.
fn zone_offset(abbreviation: &str) -> Option<i32> {
    Some(match abbreviation {
        "UTC" | "GMT" => 0,
        "EST" => -5,
        "EDT" => -4,
        "CST" => -6,
        "CDT" => -5,
        "MST" => -7,
        "MDT" => -6,
        "PST" => -8,
        "PDT" => -7,
        _ => return None,
    })
}

/// The first day of the month `delta` months after the month of `date`.
fn shift_month(date: NaiveDate, delta: i32) -> Option<NaiveDate> {
    let months = date.year() * 12 + date.month0() as i32 + delta;
    NaiveDate::from_ymd_opt(months.div_euclid(12), months.rem_euclid(12) as u32 + 1, 1)
}

/// The time on day `day` at `hour:minute` UTC in the month `delta` months after `base`'s, if that month has such a day.
fn in_month(base: NaiveDate, delta: i32, (day, hour, minute): (u32, u32, u32)) -> Option<DateTime<Utc>> {
    let first = shift_month(base, delta)?;
    let date = NaiveDate::from_ymd_opt(first.year(), first.month(), day)?;
    Some(date.and_hms_opt(hour, minute, 0)?.and_utc())
}

fn parse_issued(text: &str) -> Result<DateTime<Utc>, Error> {
    let caps = ISSUED
        .captures(text)
        .ok_or_else(|| malformed("no issuance line"))?;

    let zone = &caps[3];
    let offset = zone_offset(zone)
        .and_then(|h| FixedOffset::east_opt(h * 3600))
        .ok_or_else(|| malformed(format!("unknown time zone {zone}")))?;

    let local = format!("{:0>4} {} {}", &caps[1], &caps[2], &caps[4]);
    let naive = NaiveDateTime::parse_from_str(&local, "%I%M %p %a %b %d %Y")
        .map_err(|e| malformed(format!("bad issuance time {local:?}: {e}")))?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|t| t.with_timezone(&Utc))
        .ok_or_else(|| malformed(format!("bad issuance time {local:?}")))
}

fn parse_valid(text: &str, issued: DateTime<Utc>) -> Result<Range<DateTime<Utc>>, Error> {
    let caps = VALID
        .captures(text)
        .ok_or_else(|| malformed("no validity window"))?;
    // unwrap: the groups are all two digits.
    let num = |i: usize| caps[i].parse::<u32>().unwrap();
    let start_dhm = (num(1), num(2), num(3));
    let end_dhm = (num(4), num(5), num(6));

    // The window only gives days of the month, so take the month that puts the
    // start closest to the issuance time.
    let base = issued.date_naive();
    let start = (-1..=1)
        .filter_map(|delta| in_month(base, delta, start_dhm))
        .min_by_key(|t| (*t - issued).num_seconds().abs())
        .ok_or_else(|| malformed(format!("bad validity start {}", &caps[0])))?;
    let end = (0..=2)
        .filter_map(|delta| in_month(start.date_naive(), delta, end_dhm))
        .find(|t| *t > start)
        .ok_or_else(|| malformed(format!("bad validity end {}", &caps[0])))?;

    Ok(start..end)
}

/// Reads the issuance time and validity window from a bulletin.
pub fn parse_header(text: &str) -> Result<Header, Error> {
    let issued = parse_issued(text)?;
    let valid = parse_valid(text, issued)?;
    Ok(Header { issued, valid })
}
