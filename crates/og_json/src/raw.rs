use og_reflect::derive::Reflect;

/// Pre-serialized JSON, written verbatim and captured verbatim.
///
/// ```
/// use og_json::{JsonDeserializer, JsonSerializer, RawJson};
///
/// let json = JsonSerializer::default()
///     .serialize(&vec![RawJson::new(r#"{"a": [1]}"#)])
///     .unwrap();
/// assert_eq!(json, r#"[{"a": [1]}]"#);
///
/// let back: Vec<RawJson> = JsonDeserializer::default().from_str(&json).unwrap();
/// assert_eq!(back[0].as_str(), r#"{"a": [1]}"#);
/// ```
#[derive(Reflect, Debug, Clone, PartialEq, Eq, Default)]
#[reflect(opaque, clone, type_path = "og_json::RawJson")]
pub struct RawJson(String);

impl RawJson {
    #[inline]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}
