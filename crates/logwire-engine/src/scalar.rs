//! Scalar text conversions.
//!
//! Conversions that need nothing but the text and the format provider live
//! here; conversions that consult the catalog or the switch registry live
//! in [`crate::coercion`].

use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use logwire_core::{EnumValue, FormatProvider, LogLevel, TypeRef, Uri, Value};

const SECONDS_PER_DAY: u64 = 86_400;

/// Maximum digits of a fractional-seconds component (100 ns ticks).
const MAX_FRACTION_DIGITS: usize = 7;

/// Parses `[d.]hh:mm[:ss[.fffffff]]` or a whole number of days.
///
/// Hours must be below 24 and minutes and seconds below 60 when a day
/// component or seconds are present, mirroring the usual time-span grammar.
pub fn parse_duration(text: &str) -> Option<Duration> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if !text.contains(':') {
        let days: u64 = parse_digits(text)?;
        return Some(Duration::from_secs(days.checked_mul(SECONDS_PER_DAY)?));
    }

    let mut parts = text.split(':');
    let head = parts.next()?;
    let minutes_text = parts.next()?;
    let seconds_text = parts.next();
    if parts.next().is_some() {
        return None;
    }

    let (days, hours): (u64, u64) = match head.split_once('.') {
        Some((days, hours)) => (parse_digits(days)?, parse_digits(hours)?),
        None => (0, parse_digits(head)?),
    };
    let minutes: u64 = parse_digits(minutes_text)?;
    let (seconds, nanos) = match seconds_text {
        Some(seconds) => parse_seconds(seconds)?,
        None => (0, 0),
    };

    if hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }

    let total = days
        .checked_mul(SECONDS_PER_DAY)?
        .checked_add(hours * 3_600 + minutes * 60 + seconds)?;
    Some(Duration::new(total, nanos))
}

fn parse_seconds(text: &str) -> Option<(u64, u32)> {
    match text.split_once('.') {
        None => Some((parse_digits(text)?, 0)),
        Some((whole, fraction)) => {
            if fraction.is_empty() || fraction.len() > MAX_FRACTION_DIGITS {
                return None;
            }
            let digits: u32 = parse_digits(fraction)?;
            let scale = 10u32.pow(9 - fraction.len() as u32);
            Some((parse_digits(whole)?, digits * scale))
        }
    }
}

fn parse_digits<T: FromStr>(text: &str) -> Option<T> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Parses RFC 3339 (normalized to UTC), `YYYY-MM-DD[( |T)hh:mm:ss[.f]]`.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(text) {
        return Some(with_offset.naive_utc());
    }
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Converts `text` to a primitive target type.
///
/// Returns `None` when `target` is not a primitive handled here, and
/// `Some(Err(reason))` when it is but the text does not parse.
pub fn convert_primitive(
    text: &str,
    target: &TypeRef,
    provider: &FormatProvider,
) -> Option<Result<Value, String>> {
    let result = match target {
        TypeRef::String => Ok(Value::String(text.to_string())),
        TypeRef::Bool => match text.trim() {
            t if t.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            t if t.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            _ => Err("expected 'true' or 'false'".to_string()),
        },
        TypeRef::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err("expected exactly one character".to_string()),
            }
        }
        TypeRef::Int => provider
            .normalize_number(text)
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| e.to_string()),
        TypeRef::UInt => provider
            .normalize_number(text)
            .parse::<u64>()
            .map(Value::UInt)
            .map_err(|e| e.to_string()),
        TypeRef::Float => provider
            .normalize_number(text)
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| e.to_string()),
        TypeRef::Decimal => Decimal::from_str(&provider.normalize_number(text))
            .map(Value::Decimal)
            .map_err(|e| e.to_string()),
        TypeRef::DateTime => parse_datetime(text)
            .map(Value::DateTime)
            .ok_or_else(|| "expected RFC 3339 or YYYY-MM-DD[ hh:mm:ss]".to_string()),
        TypeRef::Duration => parse_duration(text)
            .map(Value::Duration)
            .ok_or_else(|| "expected [d.]hh:mm[:ss[.fffffff]] or whole days".to_string()),
        TypeRef::Uri => Uri::parse(text).map(Value::Uri).map_err(|e| e.to_string()),
        _ => return None,
    };
    Some(result)
}

/// Parses a level argument: exact member name or ordinal.
pub fn parse_level_member(text: &str) -> Option<Value> {
    LogLevel::parse_member(text).map(Value::Level)
}

/// Parses a plugin enumeration member: exact member name or ordinal.
pub fn parse_enum_member(text: &str, target: &TypeRef) -> Option<Value> {
    match target {
        TypeRef::Enum(spec) => spec.parse(text).map(|(ordinal, member)| {
            Value::Enum(EnumValue {
                type_name: spec.name.clone(),
                member: member.to_string(),
                ordinal,
            })
        }),
        _ => None,
    }
}
