// SPDX-License-Identifier: Apache-2.0

use core::fmt;
use core::str::FromStr;

use chrono::{DateTime, FixedOffset, SecondsFormat, TimeDelta, Utc};

use super::{decode_text, encode_text, ParseCatalogError};
use crate::buffer::{BufferReader, BufferWriter};
use crate::dto::{Decode, Encode};
use crate::error::CodecError;
use crate::tape::TapeCursor;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Implements `Decode`/`Encode` through the type's canonical string form.
macro_rules! string_codec {
    ($($t:ty)*) => {$(
        impl Decode for $t {
            fn decode<R: BufferReader + ?Sized>(
                cursor: &mut TapeCursor<'_, R>,
            ) -> Result<Self, CodecError> {
                decode_text(cursor)
            }
        }

        impl Encode for $t {
            fn encode<W: BufferWriter + ?Sized>(&self, writer: &mut W) -> Result<(), CodecError> {
                encode_text(self, writer)
            }
        }
    )*};
}

string_codec!(Duration Instant OffsetDateTime Period YearMonth ZoneId ZonedDateTime);

/// Splits a leading `[+-]?[0-9]+` off `text`.
fn signed_digits(text: &str) -> Option<(&str, &str)> {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let digits = unsigned.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let len = text.len() - unsigned.len() + digits;
    Some(text.split_at(len))
}

/// Consumes `<number><unit>` from the front of `text`, if present.
fn component<'a>(text: &mut &'a str, unit: char) -> Result<Option<i64>, ()> {
    let current: &'a str = *text;
    let Some((digits, rest)) = signed_digits(current) else {
        return Ok(None);
    };
    let Some(rest) = rest.strip_prefix(unit) else {
        return Ok(None);
    };
    let value = digits.parse().map_err(drop)?;
    *text = rest;
    Ok(Some(value))
}

/// A time-based amount, e.g. `PT8H6M12.345S`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration(pub TimeDelta);

impl Duration {
    /// Whole seconds rounded towards negative infinity and the
    /// non-negative nanosecond remainder.
    fn floor_parts(&self) -> (i64, i64) {
        let seconds = self.0.num_seconds();
        let nanos = i64::from(self.0.subsec_nanos());
        if nanos < 0 {
            (seconds - 1, nanos + NANOS_PER_SECOND)
        } else {
            (seconds, nanos)
        }
    }

    fn parse_parts(text: &str) -> Result<TimeDelta, ()> {
        let (negated, text) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let mut rest = text.strip_prefix(['P', 'p']).ok_or(())?;
        let days = component(&mut rest, 'D')?;
        let mut hours = None;
        let mut minutes = None;
        let mut seconds = None;
        let mut nanos = 0i64;
        if let Some(time) = rest.strip_prefix(['T', 't']) {
            rest = time;
            hours = component(&mut rest, 'H')?;
            minutes = component(&mut rest, 'M')?;
            if let Some((whole, after)) = signed_digits(rest) {
                let (fraction, after) = match after.strip_prefix(['.', ',']) {
                    Some(after) => {
                        let len = after.bytes().take_while(u8::is_ascii_digit).count();
                        after.split_at(len)
                    }
                    None => ("", after),
                };
                rest = after.strip_prefix('S').ok_or(())?;
                if fraction.len() > 9 {
                    return Err(());
                }
                let scaled = format!("{fraction:0<9}");
                nanos = scaled.parse::<i64>().map_err(drop)?;
                if whole.starts_with('-') {
                    nanos = -nanos;
                }
                seconds = Some(whole.parse::<i64>().map_err(drop)?);
            }
            if hours.is_none() && minutes.is_none() && seconds.is_none() {
                return Err(());
            }
        } else if days.is_none() {
            return Err(());
        }
        if !rest.is_empty() {
            return Err(());
        }

        let total = [
            (days, 86_400),
            (hours, 3_600),
            (minutes, 60),
            (seconds, 1),
        ]
        .into_iter()
        .try_fold(0i64, |acc, (amount, scale)| {
            amount.unwrap_or(0).checked_mul(scale)?.checked_add(acc)
        })
        .ok_or(())?;
        let (mut secs, mut nanos) = (total, nanos);
        if nanos < 0 {
            secs = secs.checked_sub(1).ok_or(())?;
            nanos += NANOS_PER_SECOND;
        }
        let delta = TimeDelta::new(secs, nanos as u32).ok_or(())?;
        Ok(if negated { -delta } else { delta })
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (seconds, nanos) = self.floor_parts();
        if seconds == 0 && nanos == 0 {
            return f.write_str("PT0S");
        }
        // A negative fraction is shown against the next whole second up.
        let effective = if seconds < 0 && nanos > 0 {
            seconds + 1
        } else {
            seconds
        };
        let hours = effective / 3_600;
        let minutes = (effective % 3_600) / 60;
        let secs = effective % 60;

        f.write_str("PT")?;
        if hours != 0 {
            write!(f, "{hours}H")?;
        }
        if minutes != 0 {
            write!(f, "{minutes}M")?;
        }
        if secs == 0 && nanos == 0 {
            return Ok(());
        }
        if seconds < 0 && nanos > 0 && secs == 0 {
            f.write_str("-0")?;
        } else {
            write!(f, "{secs}")?;
        }
        if nanos > 0 {
            let fraction = if seconds < 0 {
                NANOS_PER_SECOND - nanos
            } else {
                nanos
            };
            let digits = format!("{fraction:09}");
            write!(f, ".{}", digits.trim_end_matches('0'))?;
        }
        f.write_str("S")
    }
}

impl FromStr for Duration {
    type Err = ParseCatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_parts(s)
            .map(Duration)
            .map_err(|()| ParseCatalogError::new("duration"))
    }
}

/// A point on the UTC time-line, e.g. `2011-12-03T10:15:30Z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(pub DateTime<Utc>);

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl FromStr for Instant {
    type Err = ParseCatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateTime::parse_from_rfc3339(s)
            .map(|t| Instant(t.with_timezone(&Utc)))
            .map_err(|_| ParseCatalogError::new("instant"))
    }
}

/// A date-time with a fixed UTC offset, e.g. `2011-12-03T10:15:30+01:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OffsetDateTime(pub DateTime<FixedOffset>);

impl fmt::Display for OffsetDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

impl FromStr for OffsetDateTime {
    type Err = ParseCatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DateTime::parse_from_rfc3339(s)
            .map(OffsetDateTime)
            .map_err(|_| ParseCatalogError::new("offset date-time"))
    }
}

/// A date-based amount, e.g. `P1Y2M3D`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Period {
    pub years: i32,
    pub months: i32,
    pub days: i32,
}

impl Period {
    pub const fn new(years: i32, months: i32, days: i32) -> Self {
        Self {
            years,
            months,
            days,
        }
    }

    fn parse_parts(text: &str) -> Result<Self, ()> {
        let (negated, text) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let mut rest = text.strip_prefix(['P', 'p']).ok_or(())?;
        let years = component(&mut rest, 'Y')?;
        let months = component(&mut rest, 'M')?;
        let weeks = component(&mut rest, 'W')?;
        let days = component(&mut rest, 'D')?;
        if !rest.is_empty() || (years, months, weeks, days) == (None, None, None, None) {
            return Err(());
        }

        let sign: i64 = if negated { -1 } else { 1 };
        let field = |value: Option<i64>| -> Result<i32, ()> {
            let signed = value.unwrap_or(0).checked_mul(sign).ok_or(())?;
            i32::try_from(signed).map_err(drop)
        };
        let week_days = weeks.unwrap_or(0).checked_mul(7).ok_or(())?;
        let all_days = days.unwrap_or(0).checked_add(week_days).ok_or(())?;
        Ok(Self::new(field(years)?, field(months)?, field(Some(all_days))?))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::default() {
            return f.write_str("P0D");
        }
        f.write_str("P")?;
        if self.years != 0 {
            write!(f, "{}Y", self.years)?;
        }
        if self.months != 0 {
            write!(f, "{}M", self.months)?;
        }
        if self.days != 0 {
            write!(f, "{}D", self.days)?;
        }
        Ok(())
    }
}

impl FromStr for Period {
    type Err = ParseCatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_parts(s).map_err(|()| ParseCatalogError::new("period"))
    }
}

/// A month of a year, e.g. `2011-12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// `None` unless `month` is in `1..=12`.
    pub const fn new(year: i32, month: u32) -> Option<Self> {
        if month >= 1 && month <= 12 {
            Some(Self { year, month })
        } else {
            None
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.year.unsigned_abs() < 1000 {
            let sign = if self.year < 0 { "-" } else { "" };
            write!(f, "{sign}{:04}-{:02}", self.year.unsigned_abs(), self.month)
        } else {
            write!(f, "{}-{:02}", self.year, self.month)
        }
    }
}

impl FromStr for YearMonth {
    type Err = ParseCatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseCatalogError::new("year-month");
        let (year, month) = s.rsplit_once('-').ok_or_else(invalid)?;
        let digits = year.trim_start_matches(['+', '-']);
        if digits.len() < 4 || month.len() != 2 || !month.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let (_, tail) = signed_digits(year).ok_or_else(invalid)?;
        if !tail.is_empty() {
            return Err(invalid());
        }
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

/// A time-zone identifier, e.g. `Europe/Paris`, `Z` or `+01:00`.
///
/// Only the shape of the identifier is checked; it is not looked up in a
/// zone database.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ZoneId(String);

impl ZoneId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ZoneId {
    type Err = ParseCatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = !s.is_empty()
            && s
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b"~/._+-:".contains(&b));
        if valid {
            Ok(ZoneId(s.to_owned()))
        } else {
            Err(ParseCatalogError::new("zone id"))
        }
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A date-time with an offset and, optionally, the region it was resolved
/// in, e.g. `2011-12-03T10:15:30+01:00[Europe/Paris]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZonedDateTime {
    pub date_time: DateTime<FixedOffset>,
    pub zone: Option<ZoneId>,
}

impl fmt::Display for ZonedDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&OffsetDateTime(self.date_time), f)?;
        match &self.zone {
            Some(zone) => write!(f, "[{zone}]"),
            None => Ok(()),
        }
    }
}

impl FromStr for ZonedDateTime {
    type Err = ParseCatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |_: ParseCatalogError| ParseCatalogError::new("zoned date-time");
        let (date_time, zone) = match s.strip_suffix(']').and_then(|t| t.split_once('[')) {
            Some((date_time, zone)) => (date_time, Some(zone.parse::<ZoneId>().map_err(invalid)?)),
            None => (s, None),
        };
        let OffsetDateTime(date_time) = date_time.parse::<OffsetDateTime>().map_err(invalid)?;
        Ok(Self { date_time, zone })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{from_str, to_string};
    use chrono::TimeZone;
    use rstest::rstest;

    fn millis(ms: i64) -> Duration {
        Duration(TimeDelta::milliseconds(ms))
    }

    #[rstest]
    #[test_log::test]
    #[case(millis(0), "PT0S")]
    #[case(millis(((8 * 60 + 6) * 60 + 12) * 1000 + 345), "PT8H6M12.345S")]
    #[case(millis(60_000), "PT1M")]
    #[case(millis(-500), "PT-0.5S")]
    #[case(millis(-1_500), "PT-1.5S")]
    #[case(millis(-(3_600_000 + 1)), "PT-1H-0.001S")]
    #[case(millis(25 * 3_600_000), "PT25H")]
    fn test_duration_text(#[case] duration: Duration, #[case] text: &str) {
        assert_eq!(duration.to_string(), text);
        assert_eq!(text.parse::<Duration>(), Ok(duration));
    }

    #[test_log::test]
    fn test_duration_parse_forms() {
        assert_eq!("P2D".parse::<Duration>(), Ok(millis(2 * 86_400_000)));
        assert_eq!("-PT6H3M".parse::<Duration>(), Ok(millis(-(6 * 3_600_000 + 3 * 60_000))));
        assert_eq!("PT0,5S".parse::<Duration>(), Ok(millis(500)));
        for bad in ["", "P", "PT", "PT1", "8H", "PT1.S1", "PT1.0000000001S", "PT1H2"] {
            assert!(bad.parse::<Duration>().is_err(), "{bad:?}");
        }
    }

    #[test_log::test]
    fn test_instant() {
        let at = Instant(Utc.with_ymd_and_hms(2011, 12, 3, 10, 15, 30).unwrap());
        assert_eq!(to_string(&at).unwrap(), r#""2011-12-03T10:15:30Z""#);
        assert_eq!(from_str::<Instant>(r#""2011-12-03T10:15:30Z""#).unwrap(), at);
        assert_eq!("2011-12-03T11:15:30+01:00".parse::<Instant>(), Ok(at));
    }

    #[test_log::test]
    fn test_offset_date_time() {
        let paris = FixedOffset::east_opt(3600).unwrap();
        let at = OffsetDateTime(paris.with_ymd_and_hms(2011, 12, 3, 10, 15, 30).unwrap());
        let json = to_string(&at).unwrap();
        assert_eq!(json, r#""2011-12-03T10:15:30+01:00""#);
        assert_eq!(from_str::<OffsetDateTime>(&json).unwrap(), at);
    }

    #[rstest]
    #[test_log::test]
    #[case(Period::new(1, 2, 3), "P1Y2M3D")]
    #[case(Period::default(), "P0D")]
    #[case(Period::new(0, -4, 0), "P-4M")]
    #[case(Period::new(5, 0, 10), "P5Y10D")]
    fn test_period_text(#[case] period: Period, #[case] text: &str) {
        assert_eq!(period.to_string(), text);
        assert_eq!(text.parse::<Period>(), Ok(period));
    }

    #[test_log::test]
    fn test_period_parse_forms() {
        assert_eq!("P2W".parse::<Period>(), Ok(Period::new(0, 0, 14)));
        assert_eq!("-P1Y-2D".parse::<Period>(), Ok(Period::new(-1, 0, 2)));
        assert!("P".parse::<Period>().is_err());
        assert!("P1D2Y".parse::<Period>().is_err());
        assert!("P9999999999Y".parse::<Period>().is_err());
    }

    #[test_log::test]
    fn test_year_month() {
        let ym = YearMonth::new(2011, 12).unwrap();
        assert_eq!(to_string(&ym).unwrap(), r#""2011-12""#);
        assert_eq!(from_str::<YearMonth>(r#""2011-12""#).unwrap(), ym);
        assert_eq!(YearMonth::new(-1, 1).unwrap().to_string(), "-0001-01");
        assert_eq!("-0001-01".parse::<YearMonth>().ok(), YearMonth::new(-1, 1));
        assert!(YearMonth::new(2011, 13).is_none());
        for bad in ["2011-13", "11-12", "2011-1", "2011/12", "20x1-12"] {
            assert!(bad.parse::<YearMonth>().is_err(), "{bad:?}");
        }
    }

    #[test_log::test]
    fn test_zone_id() {
        let zone: ZoneId = from_str(r#""Europe/Paris""#).unwrap();
        assert_eq!(zone.as_str(), "Europe/Paris");
        assert_eq!(to_string(&zone).unwrap(), r#""Europe/Paris""#);
        assert!("UTC+01:00".parse::<ZoneId>().is_ok());

        let err = from_str::<ZoneId>(r#"["Europe/Paris"]"#).unwrap_err();
        assert_eq!(
            err.as_syntax().map(|f| f.message()),
            Some("Expected string, found array")
        );

        let err = from_str::<ZoneId>(r#""Europe Paris""#).unwrap_err();
        let fault = err.as_syntax().unwrap();
        assert_eq!(fault.message(), "Invalid zone id");
        assert_eq!(fault.value(), "Europe Paris");
        assert_eq!(fault.offset(), 1);
    }

    #[test_log::test]
    fn test_zoned_date_time() {
        let text = "2011-12-03T10:15:30+01:00[Europe/Paris]";
        let zoned: ZonedDateTime = text.parse().unwrap();
        assert_eq!(zoned.zone.as_ref().map(ZoneId::as_str), Some("Europe/Paris"));
        assert_eq!(zoned.date_time.offset().local_minus_utc(), 3600);
        assert_eq!(to_string(&zoned).unwrap(), format!("\"{text}\""));

        let bare: ZonedDateTime = "2011-12-03T09:15:30Z".parse().unwrap();
        assert!(bare.zone.is_none());
        assert_eq!(bare.to_string(), "2011-12-03T09:15:30Z");

        assert!("2011-12-03T10:15:30+01:00[Europe Paris]".parse::<ZonedDateTime>().is_err());
        assert!("2011-12-03[Europe/Paris]".parse::<ZonedDateTime>().is_err());
    }
}
