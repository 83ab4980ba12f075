use serde::Deserialize;
use serde_json::Value;
use serde_path_to_error::Segment;

use crate::error::{child_path, SchemaError};

/// Deserialize a JSON value, reporting failures as a malformed keyword at
/// the exact nested pointer below `base`.
pub fn from_value_with_path<'de, T: Deserialize<'de>>(
    value: &'de Value,
    base: &str,
) -> Result<T, SchemaError> {
    match serde_path_to_error::deserialize::<_, T>(value) {
        Ok(v) => Ok(v),
        Err(err) => {
            let mut path = base.to_string();
            for segment in err.path().iter() {
                match segment {
                    Segment::Seq { index } => path = child_path(&path, &index.to_string()),
                    Segment::Map { key } => path = child_path(&path, key),
                    Segment::Enum { variant } => path = child_path(&path, variant),
                    Segment::Unknown => {}
                }
            }
            Err(SchemaError::malformed(path, err.into_inner().to_string()))
        }
    }
}

/// Field adapter: a present key always decodes to `Some`, so an explicit
/// `null` is handed to `T` instead of collapsing into "absent".
pub fn present<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize, Debug)]
    struct Probe {
        #[serde(default, deserialize_with = "present")]
        flag: Option<bool>,
        #[serde(default, deserialize_with = "present")]
        names: Option<Vec<String>>,
        #[serde(default, deserialize_with = "present")]
        anything: Option<Value>,
    }

    #[test]
    fn reports_nested_pointer() {
        let doc = json!({ "names": ["a", 7] });
        let err = from_value_with_path::<Probe>(&doc, "#").unwrap_err();
        assert!(matches!(err, SchemaError::MalformedKeyword { ref path, .. } if path == "#/names/1"));
    }

    #[test]
    fn explicit_null_is_not_absent() {
        let doc = json!({ "anything": null });
        let probe: Probe = from_value_with_path(&doc, "#").unwrap();
        assert_eq!(probe.anything, Some(Value::Null));
        assert_eq!(probe.flag, None);

        let doc = json!({ "flag": null });
        assert!(from_value_with_path::<Probe>(&doc, "#").is_err());
    }
}
