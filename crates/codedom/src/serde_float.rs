use serde::de::{Error as DeError, Visitor};
use serde::{Deserializer, Serializer};

const NAN: &str = "NaN";
const INFINITY: &str = "inf";
const NEG_INFINITY: &str = "-inf";

/// Writes finite floats as numbers and the non-finite ones as the strings
/// `"NaN"`, `"inf"` and `"-inf"`, which JSON cannot express as numbers.  
/// 有限浮點數以數字輸出；非有限值改以字串表示，以便 JSON 往返。
pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else if value.is_nan() {
        serializer.serialize_str(NAN)
    } else if value.is_sign_positive() {
        serializer.serialize_str(INFINITY)
    } else {
        serializer.serialize_str(NEG_INFINITY)
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    struct FloatVisitor;

    impl<'de> Visitor<'de> for FloatVisitor {
        type Value = f64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a number or one of \"NaN\", \"inf\", \"-inf\"")
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: DeError,
        {
            Ok(v)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: DeError,
        {
            Ok(v as f64)
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: DeError,
        {
            Ok(v as f64)
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: DeError,
        {
            match v {
                NAN => Ok(f64::NAN),
                INFINITY => Ok(f64::INFINITY),
                NEG_INFINITY => Ok(f64::NEG_INFINITY),
                other => Err(E::custom(format!("invalid float payload: {other:?}"))),
            }
        }
    }

    deserializer.deserialize_any(FloatVisitor)
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Wrapper(#[serde(with = "super")] f64);

    #[test]
    fn finite_values_stay_numbers() {
        let json = serde_json::to_string(&Wrapper(1.5)).unwrap();
        assert_eq!(json, "1.5");
        let back: Wrapper = serde_json::from_str("3").unwrap();
        assert_eq!(back.0, 3.0);
    }

    #[test]
    fn non_finite_values_use_string_markers() {
        assert_eq!(serde_json::to_string(&Wrapper(f64::NAN)).unwrap(), "\"NaN\"");
        assert_eq!(serde_json::to_string(&Wrapper(f64::INFINITY)).unwrap(), "\"inf\"");
        assert_eq!(
            serde_json::to_string(&Wrapper(f64::NEG_INFINITY)).unwrap(),
            "\"-inf\""
        );

        let back: Wrapper = serde_json::from_str("\"-inf\"").unwrap();
        assert_eq!(back.0, f64::NEG_INFINITY);
        let back: Wrapper = serde_json::from_str("\"NaN\"").unwrap();
        assert!(back.0.is_nan());
    }

    #[test]
    fn unknown_marker_is_rejected() {
        let err = serde_json::from_str::<Wrapper>("\"nope\"").unwrap_err();
        assert!(err.to_string().contains("invalid float payload"));
    }
}
