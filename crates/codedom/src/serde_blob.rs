use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::de::{Error as DeError, Visitor};
use serde::{Deserializer, Serializer};

/// Serialises opaque bytes as a base64 string.  
/// 以 base64 字串輸出不透明的位元組資料。
pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&BASE64.encode(bytes))
}

/// Deserialises bytes from a string produced by [`serialize`].  
/// 從上述序列化結果還原位元組資料。
pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    struct BlobVisitor;

    impl<'de> Visitor<'de> for BlobVisitor {
        type Value = Vec<u8>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a base64 encoded blob")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: DeError,
        {
            decode(v).map_err(E::custom)
        }

        fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
        where
            E: DeError,
        {
            Ok(v.to_vec())
        }
    }

    deserializer.deserialize_any(BlobVisitor)
}

fn decode(text: &str) -> Result<Vec<u8>, String> {
    BASE64
        .decode(text.as_bytes())
        .map_err(|err| format!("invalid base64 blob payload: {err}"))
}
