use glam::Vec3;
use id_arena::Id;
use serde::{Deserialize, Serialize};

use crate::math::bounds::AABB;
use crate::scene_graph::scene::Scene;
use crate::scene_graph::transform::Transform;

pub type ObjectId = Id<Object3D>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    #[default]
    Empty,
    Mesh,
    /// Container whose only purpose is to hold children.
    Group,
}

pub struct Object3D {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    /// Geometry bounds in the object's own space, if it carries geometry.
    pub local_bounds: Option<AABB>,
    pub parent_id: Option<ObjectId>,
    pub child_ids: Vec<ObjectId>,
}

impl Object3D {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn group(name: impl Into<String>, translation: Vec3) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Group,
            transform: Transform::from_translation(translation),
            ..Default::default()
        }
    }

    pub fn children<'a, 'b>(&'a self, scene: &'b Scene) -> impl Iterator<Item = &'b Object3D> + 'b
    where
        'a: 'b,
    {
        self.child_ids
            .iter()
            .filter_map(move |id| scene.get_object(*id))
    }
}

impl Default for Object3D {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: NodeKind::Empty,
            transform: Transform::from_translation(Vec3::ZERO),
            local_bounds: None,
            parent_id: None,
            child_ids: Vec::new(),
        }
    }
}
