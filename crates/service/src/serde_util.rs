use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accept `"4442"` or `4442` and carry it as a string; other JSON types read as absent.
pub fn string_or_number<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(d)?;
    Ok(match v {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
