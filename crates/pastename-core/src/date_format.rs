//! Moment-style date formatting for `{{DATE:FORMAT}}` tokens.
//!
//! Templates written for the editor use the Moment.js token vocabulary
//! (`YYYY-MM-DD`, `HHmmss`, `Do MMM`, ...). This module formats a
//! [`DateTime`] with that vocabulary. Unknown characters are copied through
//! and `[...]` escapes a literal run, so a malformed format degrades to
//! literal text instead of failing.

use chrono::{DateTime, Datelike, FixedOffset, Timelike};

/// Format used when a date token carries an empty format string.
pub const DEFAULT_FORMAT: &str = "YYYY-MM-DDTHH:mm:ssZ";

/// Recognized tokens, longest first so that `YYYY` wins over `YY`.
const TOKENS: &[&str] = &[
    "YYYY", "GGGG", "MMMM", "DDDD", "dddd", "MMM", "DDD", "ddd", "SSS", "YY", "MM", "Do", "DD",
    "dd", "WW", "HH", "hh", "kk", "mm", "ss", "SS", "ZZ", "Y", "Q", "M", "D", "d", "E", "e", "W",
    "H", "h", "k", "m", "s", "S", "A", "a", "X", "x", "Z",
];

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Format `dt` using a Moment-style format string.
#[must_use]
pub fn format_moment(dt: &DateTime<FixedOffset>, format: &str) -> String {
    let format = if format.is_empty() {
        DEFAULT_FORMAT
    } else {
        format
    };

    let mut out = String::with_capacity(format.len() + 8);
    let mut rest = format;

    while let Some(c) = rest.chars().next() {
        if c == '[' {
            if let Some(end) = rest.find(']') {
                out.push_str(&rest[1..end]);
                rest = &rest[end + 1..];
                continue;
            }
        }

        if let Some(token) = TOKENS.iter().find(|t| rest.starts_with(**t)) {
            push_token(&mut out, dt, token);
            rest = &rest[token.len()..];
        } else {
            out.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }

    out
}

fn push_token(out: &mut String, dt: &DateTime<FixedOffset>, token: &str) {
    let weekday = dt.weekday().num_days_from_sunday() as usize;
    let month0 = dt.month0() as usize;

    let rendered = match token {
        "YYYY" => format!("{:04}", dt.year()),
        "YY" => format!("{:02}", dt.year().rem_euclid(100)),
        "Y" => dt.year().to_string(),
        "GGGG" => format!("{:04}", dt.iso_week().year()),
        "Q" => (month0 / 3 + 1).to_string(),
        "MMMM" => MONTHS[month0].to_string(),
        "MMM" => MONTHS[month0][..3].to_string(),
        "MM" => format!("{:02}", dt.month()),
        "M" => dt.month().to_string(),
        "Do" => ordinal(dt.day()),
        "DDDD" => format!("{:03}", dt.ordinal()),
        "DDD" => dt.ordinal().to_string(),
        "DD" => format!("{:02}", dt.day()),
        "D" => dt.day().to_string(),
        "dddd" => WEEKDAYS[weekday].to_string(),
        "ddd" => WEEKDAYS[weekday][..3].to_string(),
        "dd" => WEEKDAYS[weekday][..2].to_string(),
        "d" | "e" => weekday.to_string(),
        "E" => dt.weekday().number_from_monday().to_string(),
        "WW" => format!("{:02}", dt.iso_week().week()),
        "W" => dt.iso_week().week().to_string(),
        "HH" => format!("{:02}", dt.hour()),
        "H" => dt.hour().to_string(),
        "hh" => format!("{:02}", dt.hour12().1),
        "h" => dt.hour12().1.to_string(),
        "kk" => format!("{:02}", hour_1_24(dt)),
        "k" => hour_1_24(dt).to_string(),
        "mm" => format!("{:02}", dt.minute()),
        "m" => dt.minute().to_string(),
        "ss" => format!("{:02}", dt.second()),
        "s" => dt.second().to_string(),
        "SSS" => format!("{:03}", millis(dt)),
        "SS" => format!("{:02}", millis(dt) / 10),
        "S" => (millis(dt) / 100).to_string(),
        "A" => if dt.hour12().0 { "PM" } else { "AM" }.to_string(),
        "a" => if dt.hour12().0 { "pm" } else { "am" }.to_string(),
        "X" => dt.timestamp().to_string(),
        "x" => dt.timestamp_millis().to_string(),
        "ZZ" => offset(dt, ""),
        "Z" => offset(dt, ":"),
        other => other.to_string(),
    };

    out.push_str(&rendered);
}

fn hour_1_24(dt: &DateTime<FixedOffset>) -> u32 {
    match dt.hour() {
        0 => 24,
        h => h,
    }
}

fn millis(dt: &DateTime<FixedOffset>) -> u32 {
    (dt.nanosecond() % 1_000_000_000) / 1_000_000
}

fn ordinal(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{day}{suffix}")
}

fn offset(dt: &DateTime<FixedOffset>, separator: &str) -> String {
    let seconds = dt.offset().local_minus_utc();
    let sign = if seconds < 0 { '-' } else { '+' };
    let minutes = seconds.unsigned_abs() / 60;
    format!("{sign}{:02}{separator}{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(8 * 3600)
            .unwrap()
            .with_ymd_and_hms(y, mo, d, h, mi, s)
            .unwrap()
    }

    #[test]
    fn formats_common_numeric_tokens() {
        let dt = at(2022, 4, 8, 9, 5, 7);
        assert_eq!(format_moment(&dt, "YYYYMMDD"), "20220408");
        assert_eq!(format_moment(&dt, "YYYY-MM-DD HH:mm:ss"), "2022-04-08 09:05:07");
        assert_eq!(format_moment(&dt, "YY/M/D H:m:s"), "22/4/8 9:5:7");
    }

    #[test]
    fn formats_names_and_ordinals() {
        let dt = at(2022, 4, 8, 15, 0, 0);
        assert_eq!(format_moment(&dt, "dddd, MMMM Do"), "Friday, April 8th");
        assert_eq!(format_moment(&dt, "ddd MMM dd"), "Fri Apr Fr");
        assert_eq!(format_moment(&dt, "hh A"), "03 PM");
        assert_eq!(format_moment(&dt, "h a"), "3 pm");
    }

    #[test]
    fn ordinal_suffixes() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(22), "22nd");
    }

    #[test]
    fn brackets_escape_literals() {
        let dt = at(2022, 4, 8, 0, 0, 0);
        assert_eq!(format_moment(&dt, "[Day] D [of] MMMM"), "Day 8 of April");
        assert_eq!(format_moment(&dt, "[YYYY"), "[2022");
    }

    #[test]
    fn unknown_characters_pass_through() {
        let dt = at(2022, 4, 8, 0, 0, 0);
        assert_eq!(format_moment(&dt, "YYYY_!_MM"), "2022_!_04");
        assert_eq!(format_moment(&dt, "中文YYYY"), "中文2022");
    }

    #[test]
    fn empty_format_uses_iso_default() {
        let dt = at(2022, 4, 8, 10, 20, 30);
        assert_eq!(format_moment(&dt, ""), "2022-04-08T10:20:30+08:00");
    }

    #[test]
    fn offsets_and_timestamps() {
        let dt = at(1970, 1, 1, 8, 0, 1);
        assert_eq!(format_moment(&dt, "ZZ"), "+0800");
        assert_eq!(format_moment(&dt, "X"), "1");
        assert_eq!(format_moment(&dt, "x"), "1000");
    }

    #[test]
    fn iso_week_and_quarter() {
        let dt = at(2021, 1, 3, 0, 0, 0);
        assert_eq!(format_moment(&dt, "GGGG-[W]WW"), "2020-W53");
        assert_eq!(format_moment(&dt, "Q"), "1");
        assert_eq!(format_moment(&dt, "DDDD"), "003");
        assert_eq!(format_moment(&dt, "k E"), "24 7");
    }
}
