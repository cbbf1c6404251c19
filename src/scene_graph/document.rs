//! JSON scene description used for exporting and re-opening parts of a scene.

use anyhow::Context;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::math::bounds::AABB;
use crate::scene_graph::object3d::NodeKind;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneDocument {
    pub nodes: Vec<SceneNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    #[serde(default)]
    pub kind: NodeKind,
    pub translation: Vec3,
    /// Euler angles in radians, XYZ order.
    pub rotation: Vec3,
    pub scale: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[Vec3; 2]>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn local_bounds(&self) -> Option<AABB> {
        self.bounds.map(|[min, max]| AABB::new(min, max))
    }
}

impl SceneDocument {
    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize scene document")
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Failed to parse scene document")
    }
}
