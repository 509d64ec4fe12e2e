//! Data-driven level description: layer lists, session flags and entity placements.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A loosely typed entity attribute, as authored in level data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

/// One placed entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityData {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Secondary positions, in level coordinates
    pub nodes: Vec<[f32; 2]>,
    /// Room the entity was placed in
    pub room: Option<String>,
    pub attrs: BTreeMap<String, AttrValue>,
}

impl EntityData {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Default::default()
        }
    }

    /// Builder-style attribute insert, handy for tests and code-built levels.
    pub fn with_attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name.to_string(), value.into());
        self
    }

    pub fn with_node(mut self, node: [f32; 2]) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn with_room(mut self, room: &str) -> Self {
        self.room = Some(room.to_string());
        self
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.get(name)
    }

    pub fn attr_str(&self, name: &str, default: &str) -> String {
        match self.attrs.get(name) {
            Some(AttrValue::Str(s)) => s.clone(),
            Some(AttrValue::Int(i)) => i.to_string(),
            Some(AttrValue::Float(f)) => f.to_string(),
            Some(AttrValue::Bool(b)) => b.to_string(),
            None => default.to_string(),
        }
    }

    pub fn attr_bool(&self, name: &str, default: bool) -> bool {
        match self.attrs.get(name) {
            Some(AttrValue::Bool(b)) => *b,
            Some(AttrValue::Str(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    pub fn attr_int(&self, name: &str, default: i64) -> i64 {
        match self.attrs.get(name) {
            Some(AttrValue::Int(i)) => *i,
            Some(AttrValue::Float(f)) => *f as i64,
            Some(AttrValue::Str(s)) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// A solid-color background or foreground layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerData {
    pub name: String,
    /// Comma-separated tag list
    pub tags: String,
    pub visible: bool,
    /// Hex color, 6 or 8 digits
    pub color: String,
    /// x, y, width, height in screen space
    pub rect: [f32; 4],
    /// Blend mode name; unset means "whatever batch is open"
    pub blend: Option<String>,
    /// Draw through the shared sprite batch (true) or immediately (false)
    pub shared_batch: bool,
}

impl Default for LayerData {
    fn default() -> Self {
        Self {
            name: String::new(),
            tags: String::new(),
            visible: true,
            color: "ffffff".to_string(),
            rect: [0.0, 0.0, 320.0, 180.0],
            blend: None,
            shared_batch: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelData {
    pub room: Option<String>,
    pub camera: [f32; 2],
    pub flags: BTreeMap<String, bool>,
    pub background: Vec<LayerData>,
    pub foreground: Vec<LayerData>,
    pub entities: Vec<EntityData>,
}

impl LevelData {
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse level: {}", e))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read level file: {}", e))?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: &str = r#"
        room = "a-01"
        camera = [8.0, 0.0]

        [flags]
        lights_on = true

        [[background]]
        name = "sky"
        tags = "pane,stars"
        color = "102040"

        [[entities]]
        x = 16.0
        y = 24.0
        width = 32.0
        height = 40.0
        nodes = [[100.0, 20.0]]

        [entities.attrs]
        stylegroundTag = "pane"
        punchThrough = true
        depth = -50
        visibilityFlags = "lights_on,!door_open"
    "#;

    #[test]
    fn parses_level_toml() {
        let level = LevelData::from_toml_str(LEVEL).unwrap();
        assert_eq!(level.room.as_deref(), Some("a-01"));
        assert_eq!(level.flags.get("lights_on"), Some(&true));
        assert_eq!(level.background.len(), 1);
        assert!(level.background[0].visible);
        assert!(level.background[0].shared_batch);
        assert!(level.foreground.is_empty());

        let e = &level.entities[0];
        assert_eq!(e.nodes, vec![[100.0, 20.0]]);
        assert_eq!(e.attr_str("stylegroundTag", ""), "pane");
        assert!(e.attr_bool("punchThrough", false));
        assert_eq!(e.attr_int("depth", 11000), -50);
        assert_eq!(e.attr_str("visibilityFlags", ""), "lights_on,!door_open");
    }

    #[test]
    fn attribute_accessors_coerce_and_default() {
        let e = EntityData::new(0.0, 0.0, 8.0, 8.0)
            .with_attr("punchThrough", "true")
            .with_attr("depth", "12")
            .with_attr("broken", "nope");
        assert!(e.attr_bool("punchThrough", false));
        assert_eq!(e.attr_int("depth", 0), 12);
        assert_eq!(e.attr_int("broken", 7), 7);
        assert!(!e.attr_bool("broken", false));
        assert_eq!(e.attr_str("missing", "fallback"), "fallback");
    }

    #[test]
    fn malformed_level_reports_error() {
        let err = LevelData::from_toml_str("entities = 3").unwrap_err();
        assert!(err.starts_with("Failed to parse level"));
    }
}
