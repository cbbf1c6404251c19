use serde::{Deserialize, Serialize};

use crate::scene_graph::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Marquee selection. No transform handle is shown.
    Select,
    #[default]
    Translate,
    Rotate,
    Scale,
}

impl Tool {
    pub fn gizmo_mode(self) -> Option<GizmoMode> {
        match self {
            Tool::Select => None,
            Tool::Translate => Some(GizmoMode::Translate),
            Tool::Rotate => Some(GizmoMode::Rotate),
            Tool::Scale => Some(GizmoMode::Scale),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoMode {
    Translate,
    Rotate,
    Scale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GizmoSpace {
    #[default]
    World,
    Local,
}

/// What the transform handle widget should be showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GizmoTarget {
    pub node: ObjectId,
    pub mode: GizmoMode,
    pub space: GizmoSpace,
}

/// Momentary gizmo space: local while a rotate/scale drag is held, world otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct GizmoState {
    space: GizmoSpace,
    dragging: bool,
}

impl GizmoState {
    pub fn space(&self) -> GizmoSpace {
        self.space
    }

    pub fn set_space(&mut self, space: GizmoSpace) {
        self.space = space;
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn pointer_down(&mut self, tool: Tool) {
        self.space = match tool {
            Tool::Rotate | Tool::Scale => GizmoSpace::Local,
            Tool::Translate | Tool::Select => GizmoSpace::World,
        };
        self.dragging = true;
    }

    pub fn pointer_up(&mut self) {
        self.space = GizmoSpace::World;
        self.dragging = false;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
