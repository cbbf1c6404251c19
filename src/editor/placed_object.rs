use glam::{Mat4, Vec3};

use crate::scene_graph::{ObjectId, Transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformField {
    Position,
    /// Euler radians.
    Rotation,
    Scale,
}

impl TransformField {
    pub fn read(self, transform: &Transform) -> Vec3 {
        match self {
            TransformField::Position => transform.translation(),
            TransformField::Rotation => transform.rotation(),
            TransformField::Scale => transform.scale(),
        }
    }
}

/// One numeric input of the property panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldEdit {
    pub field: TransformField,
    pub axis: Axis,
}

impl FieldEdit {
    pub fn new(field: TransformField, axis: Axis) -> Self {
        Self { field, axis }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeKind {
    Move,
    Rotate,
    Scale,
}

impl NudgeKind {
    pub fn field(self) -> TransformField {
        match self {
            NudgeKind::Move => TransformField::Position,
            NudgeKind::Rotate => TransformField::Rotation,
            NudgeKind::Scale => TransformField::Scale,
        }
    }
}

/// World-space transform as shown in the property panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformSnapshot {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for TransformSnapshot {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl TransformSnapshot {
    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            position: transform.translation(),
            rotation: transform.rotation(),
            scale: transform.scale(),
        }
    }

    pub fn from_world_matrix(matrix: Mat4) -> Self {
        Self::from_transform(&Transform::from_matrix(matrix))
    }

    pub fn set_axis(&mut self, edit: FieldEdit, value: f32) {
        let vector = match edit.field {
            TransformField::Position => &mut self.position,
            TransformField::Rotation => &mut self.rotation,
            TransformField::Scale => &mut self.scale,
        };
        vector[edit.axis.index()] = value;
    }

    pub fn abs_diff_eq(&self, other: &TransformSnapshot, max_abs_diff: f32) -> bool {
        self.position.abs_diff_eq(other.position, max_abs_diff)
            && self.rotation.abs_diff_eq(other.rotation, max_abs_diff)
            && self.scale.abs_diff_eq(other.scale, max_abs_diff)
    }
}

/// An entry of the editor's top-level object list.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedObject {
    pub name: String,
    pub node: ObjectId,
    pub snapshot: TransformSnapshot,
}

impl PlacedObject {
    pub fn new(name: impl Into<String>, node: ObjectId) -> Self {
        Self {
            name: name.into(),
            node,
            snapshot: TransformSnapshot::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_axis_touches_one_component() {
        let mut snapshot = TransformSnapshot::default();
        snapshot.set_axis(FieldEdit::new(TransformField::Scale, Axis::Y), 2.5);
        snapshot.set_axis(FieldEdit::new(TransformField::Rotation, Axis::Z), -0.25);

        assert_eq!(snapshot.scale, Vec3::new(1.0, 2.5, 1.0));
        assert_eq!(snapshot.rotation, Vec3::new(0.0, 0.0, -0.25));
        assert_eq!(snapshot.position, Vec3::ZERO);
    }

    #[test]
    fn snapshot_from_world_matrix() {
        let matrix =
            Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)) * Mat4::from_scale(Vec3::splat(0.5));
        let snapshot = TransformSnapshot::from_world_matrix(matrix);
        let expected = TransformSnapshot {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Vec3::ZERO,
            scale: Vec3::splat(0.5),
        };
        assert!(snapshot.abs_diff_eq(&expected, 1e-6));
    }

    #[test]
    fn nudge_kinds_map_to_fields() {
        assert_eq!(NudgeKind::Move.field(), TransformField::Position);
        assert_eq!(NudgeKind::Rotate.field(), TransformField::Rotation);
        assert_eq!(NudgeKind::Scale.field(), TransformField::Scale);
    }
}
