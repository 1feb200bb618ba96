use serde::{Deserialize, Deserializer};

/// Distinguishes an absent PATCH field from an explicit `null`.
///
/// With `#[serde(default, deserialize_with = "double_option")]` an absent
/// field stays `None`, `null` becomes `Some(None)` (clear the column), and
/// a value becomes `Some(Some(value))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "super::double_option")]
        note: Option<Option<String>>,
    }

    #[test]
    fn absent_field_is_outer_none() {
        let patch: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(patch.note, None);
    }

    #[test]
    fn explicit_null_clears() {
        let patch: Patch = serde_json::from_str(r#"{"note": null}"#).unwrap();
        assert_eq!(patch.note, Some(None));
    }

    #[test]
    fn value_is_doubly_wrapped() {
        let patch: Patch = serde_json::from_str(r#"{"note": "x"}"#).unwrap();
        assert_eq!(patch.note, Some(Some("x".to_string())));
    }
}
