use std::path::Path;

use anyhow::Context;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::editor::tool::Tool;

/// How "place on floor" decides the new height of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FloorSnap {
    /// Move the object's origin to y = 0.
    #[default]
    Origin,
    /// Rest the lowest point of the object's world bounds on y = 0.
    BoundingBox,
}

/// Editor settings. Every field has a default, so partial TOML files are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Lower limit applied by scale nudges.
    pub scale_floor: f32,
    pub floor_snap: FloorSnap,
    /// Where imported models are placed.
    pub import_position: Vec3,
    pub default_tool: Tool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            scale_floor: 0.1,
            floor_snap: FloorSnap::Origin,
            import_position: Vec3::new(0.0, 0.5, 0.0),
            default_tool: Tool::Translate,
        }
    }
}

impl EditorConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("Failed to load {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("Failed to parse editor config")
    }
}
