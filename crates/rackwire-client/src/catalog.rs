//! Engine catalog queries.
//!
//! Convenience wrappers over reply-required calls: the visible-unit
//! aggregation (with the configured ignore list applied) and the preset
//! bank list. Decoding is lenient — the transport is content-agnostic, so
//! unexpected shapes collapse to empty collections instead of errors.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::client::{Client, ClientError};

/// One processing unit visible in the engine's rack.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnitInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub box_visible: bool,
    #[serde(default)]
    pub stereo: bool,
}

/// A preset bank.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Bank {
    pub name: String,
    #[serde(default)]
    pub presets: Vec<String>,
}

const MONO_UNITS_KEY: &str = "sys.visible_mono_plugins";
const STEREO_UNITS_KEY: &str = "sys.visible_stereo_plugins";

/// Fetch the engine's visible units, mono before stereo, with units on
/// the ignore list filtered out.
pub async fn visible_units(client: &Client, ignore: &[String]) -> Result<Vec<UnitInfo>, ClientError> {
    let result = client
        .send("get", vec![json!(MONO_UNITS_KEY), json!(STEREO_UNITS_KEY)])
        .await?
        .unwrap_or(Value::Null);
    Ok(merge_units(&result, ignore))
}

/// Fetch the preset bank list.
pub async fn banks(client: &Client) -> Result<Vec<Bank>, ClientError> {
    let result = client.send("banks", Vec::new()).await?.unwrap_or(Value::Null);
    Ok(decode_entries(&result))
}

fn merge_units(result: &Value, ignore: &[String]) -> Vec<UnitInfo> {
    let mut units: Vec<UnitInfo> = Vec::new();
    for key in [MONO_UNITS_KEY, STEREO_UNITS_KEY] {
        if let Some(list) = result.get(key) {
            units.extend(decode_entries::<UnitInfo>(list));
        }
    }
    units.retain(|unit| {
        let ignored = ignore.iter().any(|id| id == &unit.id);
        if ignored {
            tracing::debug!(unit = %unit.id, "ignoring unit");
        }
        !ignored
    });
    units
}

/// Decode each array entry independently so one malformed entry does not
/// discard its siblings.
fn decode_entries<T: for<'de> Deserialize<'de>>(list: &Value) -> Vec<T> {
    list.as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_merge_mono_before_stereo() {
        let result = json!({
            "sys.visible_mono_plugins": [
                {"id": "ampstack", "name": "Amp Stack", "box_visible": true}
            ],
            "sys.visible_stereo_plugins": [
                {"id": "chorus", "name": "Chorus", "stereo": true}
            ]
        });
        let units = merge_units(&result, &[]);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].id, "ampstack");
        assert!(units[0].box_visible);
        assert!(!units[0].stereo);
        assert_eq!(units[1].id, "chorus");
        assert!(units[1].stereo);
    }

    #[test]
    fn ignored_units_are_filtered_out() {
        let result = json!({
            "sys.visible_mono_plugins": [
                {"id": "tuner"},
                {"id": "ampstack"}
            ]
        });
        let units = merge_units(&result, &["tuner".to_string()]);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].id, "ampstack");
    }

    #[test]
    fn malformed_unit_entries_are_skipped() {
        let result = json!({
            "sys.visible_mono_plugins": [
                {"name": "no id"},
                42,
                {"id": "ampstack"}
            ]
        });
        let units = merge_units(&result, &[]);
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].id, "ampstack");
    }

    #[test]
    fn unexpected_shapes_decode_to_nothing() {
        assert!(merge_units(&Value::Null, &[]).is_empty());
        assert!(merge_units(&json!({"other": []}), &[]).is_empty());
        assert!(decode_entries::<Bank>(&json!("not a list")).is_empty());
    }

    #[test]
    fn banks_decode_with_default_preset_list() {
        let banks: Vec<Bank> = decode_entries(&json!([
            {"name": "Factory", "presets": ["Clean", "Crunch"]},
            {"name": "User"}
        ]));
        assert_eq!(banks.len(), 2);
        assert_eq!(banks[0].presets, vec!["Clean", "Crunch"]);
        assert!(banks[1].presets.is_empty());
    }
}
