//! Lenient field deserializers for collaborator payloads
//!
//! CRM exports disagree on whether numbers arrive as JSON numbers or as
//! strings, and hand-edited ticket sheets contain blanks and typos. These
//! deserializers accept either form and map anything unparsable to `None`
//! so the normalizers can skip the record instead of failing the whole load.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::Deserializer;
use std::fmt;
use std::str::FromStr;

/// Deserialize an optional decimal from a number, a numeric string, or null
pub fn deserialize_lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    struct DecimalOrStringVisitor;

    impl<'de> Visitor<'de> for DecimalOrStringVisitor {
        type Value = Option<Decimal>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a number, a string containing a number, or null")
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Some(Decimal::from(value)))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(Some(Decimal::from(value)))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            Ok(Decimal::from_f64(value).map(|d| d.normalize()))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            let trimmed = value.trim().trim_start_matches('$').replace(',', "");
            Ok(Decimal::from_str(&trimmed).ok())
        }

        fn visit_bool<E: de::Error>(self, _value: bool) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
            d.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(DecimalOrStringVisitor)
}

/// Deserialize an optional integer from a number, a string, or null
pub fn deserialize_lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct I64OrStringVisitor;

    impl<'de> Visitor<'de> for I64OrStringVisitor {
        type Value = Option<i64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer, a string containing an integer, or null")
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Some(value))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(i64::try_from(value).ok())
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
                Ok(Some(value as i64))
            } else {
                Ok(None)
            }
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(value.trim().parse::<i64>().ok())
        }

        fn visit_bool<E: de::Error>(self, _value: bool) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
            d.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(I64OrStringVisitor)
}

/// Deserialize an optional string, treating blank strings as absent
pub fn deserialize_non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = serde::Deserialize::deserialize(deserializer)?;
    Ok(value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

/// Deserialize an optional record id from a string or an integer
///
/// Numeric ids are rendered in decimal; blank strings count as absent.
pub fn deserialize_lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer id, or null")
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
                Ok(Some((value as i64).to_string()))
            } else {
                Err(E::invalid_value(de::Unexpected::Float(value), &self))
            }
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
            d.deserialize_any(self)
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

/// Required-id form of [`deserialize_lenient_id`]; absent ids become empty
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(deserialize_lenient_id(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Fields {
        #[serde(default, deserialize_with = "deserialize_lenient_decimal")]
        hours: Option<Decimal>,
        #[serde(default, deserialize_with = "deserialize_lenient_i64")]
        micros: Option<i64>,
        #[serde(default, deserialize_with = "deserialize_non_blank")]
        label: Option<String>,
        #[serde(default, deserialize_with = "deserialize_lenient_id")]
        id: Option<String>,
    }

    fn fields(json: &str) -> Fields {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_decimal_accepts_numbers_and_strings() {
        assert_eq!(fields(r#"{"hours": 2}"#).hours, Some(dec!(2)));
        assert_eq!(fields(r#"{"hours": 1.5}"#).hours, Some(dec!(1.5)));
        assert_eq!(fields(r#"{"hours": " 0.25 "}"#).hours, Some(dec!(0.25)));
        assert_eq!(fields(r#"{"hours": "$1,250.50"}"#).hours, Some(dec!(1250.50)));
    }

    #[test]
    fn test_decimal_malformed_is_none() {
        assert_eq!(fields(r#"{"hours": "two"}"#).hours, None);
        assert_eq!(fields(r#"{"hours": null}"#).hours, None);
        assert_eq!(fields(r#"{"hours": true}"#).hours, None);
        assert_eq!(fields(r#"{}"#).hours, None);
    }

    #[test]
    fn test_i64_accepts_numbers_and_strings() {
        assert_eq!(fields(r#"{"micros": 1500000000}"#).micros, Some(1_500_000_000));
        assert_eq!(fields(r#"{"micros": "2500000000"}"#).micros, Some(2_500_000_000));
        assert_eq!(fields(r#"{"micros": "abc"}"#).micros, None);
    }

    #[test]
    fn test_blank_strings_are_absent() {
        assert_eq!(fields(r#"{"label": "  "}"#).label, None);
        assert_eq!(fields(r#"{"label": " x "}"#).label, Some("x".to_string()));
    }

    #[test]
    fn test_id_accepts_strings_and_integers() {
        assert_eq!(fields(r#"{"id": 42}"#).id, Some("42".to_string()));
        assert_eq!(fields(r#"{"id": 7.0}"#).id, Some("7".to_string()));
        assert_eq!(fields(r#"{"id": " rec-9 "}"#).id, Some("rec-9".to_string()));
        assert_eq!(fields(r#"{"id": ""}"#).id, None);
        assert_eq!(fields(r#"{"id": null}"#).id, None);
    }

    #[test]
    fn test_id_rejects_other_shapes() {
        assert!(serde_json::from_str::<Fields>(r#"{"id": ["x"]}"#).is_err());
        assert!(serde_json::from_str::<Fields>(r#"{"id": 1.5}"#).is_err());
    }
}
