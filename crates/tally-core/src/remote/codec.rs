//! Serde codec for 64-bit wire integers.

/// Encodes `i64` as a decimal JSON string and decodes from a string or a
/// JSON number.
///
/// Money (minor units) and logical update times cross the wire as 64-bit
/// integers. Peers whose JSON numbers are doubles cannot hold every `i64`
/// exactly, so values are written as strings; integral numbers are still
/// accepted on the way in.
///
/// ```
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Price {
///     #[serde(with = "tally_core::remote::wide_int")]
///     value: i64,
/// }
///
/// let json = serde_json::to_string(&Price { value: 1999 }).unwrap();
/// assert_eq!(json, r#"{"value":"1999"}"#);
/// ```
pub mod wide_int {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)] // signature required by `serde(with)`
    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        deserializer.deserialize_any(WideIntVisitor)
    }

    struct WideIntVisitor;

    impl Visitor<'_> for WideIntVisitor {
        type Value = i64;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a 64-bit integer as a number or decimal string")
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<i64, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<i64, E> {
            i64::try_from(value).map_err(|_| E::custom(format!("integer {value} exceeds i64")))
        }

        #[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
        fn visit_f64<E: de::Error>(self, value: f64) -> Result<i64, E> {
            // 2^63 as f64; anything at or above it does not fit.
            const LIMIT: f64 = 9_223_372_036_854_775_808.0;
            if value.fract() != 0.0 || !(-LIMIT..LIMIT).contains(&value) {
                return Err(E::custom(format!("{value} is not a 64-bit integer")));
            }
            Ok(value as i64)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<i64, E> {
            value
                .trim()
                .parse::<i64>()
                .map_err(|error| E::custom(format!("invalid integer string {value:?}: {error}")))
        }
    }
}
