//! Host backed by a JSON form document.
//!
//! The inspection form keeps the sketch under its `lps` section next to the
//! measurement tables. Persisting merges the three sketch keys into that
//! section and leaves every other field untouched.

use super::{HostDocument, PersistedSketch, StorageError, StorageResult};
use crate::canvas::fallback_earth_label;
use crate::shapes::{Icon, SketchModel, Stroke};
use serde_json::{Map, Value};

/// Form section holding the sketch and the measurement tables.
pub const LPS_KEY: &str = "lps";

/// Measurement tables that define the earth electrodes, in priority order.
const MEASUREMENT_TABLES: [&str; 3] = ["earthResistance", "downConductorsMeasurements", "continuity"];

/// Row fields that may carry an electrode name, in priority order.
const LABEL_FIELDS: [&str; 7] = ["label", "conductor", "path", "name", "title", "location", "text"];

/// A JSON form document acting as the host.
#[derive(Debug, Clone, Default)]
pub struct FormHost {
    form: Value,
}

impl FormHost {
    pub fn new(form: Value) -> Self {
        Self { form }
    }

    /// Parse a form from JSON text.
    pub fn from_json(json: &str) -> StorageResult<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// The whole form, including persisted sketch fields.
    pub fn form(&self) -> &Value {
        &self.form
    }

    pub fn into_form(self) -> Value {
        self.form
    }

    /// Replace the form, e.g. after the host edited the measurement tables.
    pub fn set_form(&mut self, form: Value) {
        self.form = form;
    }

    fn section(&self) -> Option<&Map<String, Value>> {
        self.form.get(LPS_KEY)?.as_object()
    }

    fn section_mut(&mut self) -> StorageResult<&mut Map<String, Value>> {
        if self.form.is_null() {
            self.form = Value::Object(Map::new());
        }
        let root = self
            .form
            .as_object_mut()
            .ok_or_else(|| StorageError::Host("form root is not an object".into()))?;
        let section = root
            .entry(LPS_KEY)
            .or_insert_with(|| Value::Object(Map::new()));
        if section.is_null() {
            *section = Value::Object(Map::new());
        }
        section
            .as_object_mut()
            .ok_or_else(|| StorageError::Host(format!("`{LPS_KEY}` is not an object")))
    }
}

impl HostDocument for FormHost {
    fn initial_model(&self) -> StorageResult<Option<SketchModel>> {
        let Some(section) = self.section() else {
            return Ok(None);
        };
        let strokes = section.get("sketchJson").filter(|v| v.is_array());
        let icons = section.get("sketchIcons").filter(|v| v.is_array());
        if strokes.is_none() && icons.is_none() {
            return Ok(None);
        }
        let strokes: Vec<Stroke> = match strokes {
            Some(v) => serde_json::from_value(v.clone())?,
            None => Vec::new(),
        };
        let icons: Vec<Icon> = match icons {
            Some(v) => serde_json::from_value(v.clone())?,
            None => Vec::new(),
        };
        Ok(Some(SketchModel { strokes, icons }))
    }

    fn persist(&mut self, snapshot: &PersistedSketch) -> StorageResult<()> {
        let Value::Object(fields) = serde_json::to_value(snapshot)? else {
            return Err(StorageError::Other("snapshot did not serialize to an object".into()));
        };
        let section = self.section_mut()?;
        for (key, value) in fields {
            section.insert(key, value);
        }
        Ok(())
    }

    fn earth_labels(&self) -> StorageResult<Vec<String>> {
        let rows = self.section().and_then(|section| {
            MEASUREMENT_TABLES
                .iter()
                .find_map(|table| section.get(*table).and_then(Value::as_array))
        });
        Ok(rows.map(|rows| earth_labels_from_rows(rows)).unwrap_or_default())
    }
}

/// One label per measurement row; rows without a usable name get a numbered fallback.
pub fn earth_labels_from_rows(rows: &[Value]) -> Vec<String> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| row_label(row).unwrap_or_else(|| fallback_earth_label(index)))
        .collect()
}

fn row_label(row: &Value) -> Option<String> {
    let raw = match row {
        Value::String(s) => Some(s.as_str()),
        Value::Object(fields) => LABEL_FIELDS
            .iter()
            .find_map(|key| fields.get(*key).filter(|v| !v.is_null()))
            .and_then(Value::as_str),
        _ => None,
    }?;
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use serde_json::json;

    #[test]
    fn test_initial_model_absent() {
        let host = FormHost::new(json!({ "lps": { "other": 1 } }));
        assert!(host.initial_model().unwrap().is_none());
        assert!(FormHost::default().initial_model().unwrap().is_none());
    }

    #[test]
    fn test_initial_model_from_host_keys() {
        let host = FormHost::new(json!({
            "lps": {
                "sketchJson": [
                    { "color": "#0f172a", "width": 2, "style": "solid",
                      "points": [{ "x": 0.1, "y": 0.1 }, { "x": 0.4, "y": 0.1 }] }
                ],
                "sketchIcons": [{ "type": "antenna", "x": 0.5, "y": 0.5 }]
            }
        }));
        let model = host.initial_model().unwrap().unwrap();
        assert_eq!(model.strokes.len(), 1);
        assert_eq!(model.icons, vec![Icon::antenna(Point::new(0.5, 0.5))]);
    }

    #[test]
    fn test_persist_merges_into_section() {
        let mut host = FormHost::new(json!({ "title": "Report", "lps": { "earthResistance": [] } }));
        let model = SketchModel {
            strokes: vec![],
            icons: vec![Icon::air(Point::new(0.25, 0.75))],
        };
        host.persist(&PersistedSketch::new(model.clone(), "data:image/png;base64,".into()))
            .unwrap();
        let form = host.form();
        assert_eq!(form["title"], "Report");
        assert!(form["lps"]["earthResistance"].is_array());
        assert_eq!(form["lps"]["sketchPng"], "data:image/png;base64,");
        assert_eq!(host.initial_model().unwrap(), Some(model));
    }

    #[test]
    fn test_persist_into_empty_form() {
        let mut host = FormHost::default();
        host.persist(&PersistedSketch::default()).unwrap();
        assert!(host.form()["lps"]["sketchJson"].is_array());
    }

    #[test]
    fn test_persist_rejects_non_object_root() {
        let mut host = FormHost::new(json!([1, 2, 3]));
        assert!(matches!(
            host.persist(&PersistedSketch::default()),
            Err(StorageError::Host(_))
        ));
    }

    #[test]
    fn test_earth_labels_table_priority() {
        let host = FormHost::new(json!({
            "lps": {
                "downConductorsMeasurements": [{ "name": "ignored" }],
                "earthResistance": [
                    { "label": "  Z-north " },
                    { "conductor": "", "path": "south" },
                    { "value": 12.5 },
                    "west"
                ]
            }
        }));
        assert_eq!(
            host.earth_labels().unwrap(),
            vec!["Z-north", "Zemnič 2", "Zemnič 3", "west"]
        );
    }

    #[test]
    fn test_earth_labels_fallback_tables() {
        let host = FormHost::new(json!({ "lps": { "continuity": [{ "location": "roof" }] } }));
        assert_eq!(host.earth_labels().unwrap(), vec!["roof"]);
        assert!(FormHost::default().earth_labels().unwrap().is_empty());
    }
}
