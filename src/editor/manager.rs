use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context;
use glam::{Vec2, Vec3};
use itertools::{Either, Itertools};

use crate::camera::{Camera, Viewport};
use crate::config::{EditorConfig, FloorSnap};
use crate::editor::marquee::{Marquee, ScreenRect};
use crate::editor::placed_object::{
    Axis, FieldEdit, NudgeKind, PlacedObject, TransformField, TransformSnapshot,
};
use crate::editor::selection::Selection;
use crate::editor::tool::{GizmoSpace, GizmoState, GizmoTarget, Tool};
use crate::scene_graph::{NodeKind, Object3D, ObjectId, Scene, SceneDocument};

/// Camera and viewport size, available once the view has been created.
#[derive(Debug, Clone)]
pub struct ViewContext {
    pub camera: Camera,
    pub viewport: Viewport,
}

/// Transient container holding a multi-selection under one transform handle.
#[derive(Debug, Clone)]
struct EphemeralGroup {
    node: ObjectId,
    members: Vec<usize>,
}

/// Owns the placed objects, the selection, the active tool and the grouping state of the
/// editor.
///
/// Every operation finishes all of its re-parenting before it returns, so the scene read by
/// the render loop never contains a half-built or half-dissolved group. Operations whose
/// preconditions do not hold leave the state untouched.
pub struct SelectionTransformManager {
    scene: Scene,
    objects: Vec<PlacedObject>,
    selection: Selection,
    tool: Tool,
    gizmo: GizmoState,
    ephemeral: Option<EphemeralGroup>,
    marquee: Option<Marquee>,
    view: Option<ViewContext>,
    config: EditorConfig,
    /// Detached identity node that selected objects are hung under while exporting.
    export_root: ObjectId,
}

impl SelectionTransformManager {
    pub fn new(mut scene: Scene, config: EditorConfig) -> Self {
        let export_root = scene.add_object(Object3D::named("Export"));

        Self {
            scene,
            objects: Vec::new(),
            selection: Selection::None,
            tool: config.default_tool,
            gizmo: GizmoState::default(),
            ephemeral: None,
            marquee: None,
            view: None,
            config,
            export_root,
        }
    }

    /// Called once the camera and viewport exist, and again whenever either changes.
    pub fn set_view(&mut self, camera: Camera, viewport: Viewport) {
        self.view = Some(ViewContext { camera, viewport });
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable scene access for the transform handle widget. Call
    /// [`Self::on_transform_change`] after writing transforms through it.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn objects(&self) -> &[PlacedObject] {
        &self.objects
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn gizmo_space(&self) -> GizmoSpace {
        self.gizmo.space()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn marquee_rect(&self) -> Option<ScreenRect> {
        self.marquee.map(|marquee| marquee.rect())
    }

    /// Members of the live ephemeral group, if any.
    pub fn ephemeral_members(&self) -> Option<&[usize]> {
        self.ephemeral.as_ref().map(|group| group.members.as_slice())
    }

    pub fn ephemeral_node(&self) -> Option<ObjectId> {
        self.ephemeral.as_ref().map(|group| group.node)
    }

    /// The one object targeted by field edits, nudges, floor placement and degrouping.
    ///
    /// Only a single selection has a target. A multi-selection is deliberately treated as
    /// having none, so those operations do nothing instead of editing one arbitrary member.
    pub fn resolve_target(&self) -> Option<usize> {
        self.selection
            .single()
            .filter(|&index| index < self.objects.len())
    }

    /// The property panel entry; hidden while a multi-selection is grouped.
    pub fn inspected(&self) -> Option<&PlacedObject> {
        if self.ephemeral.is_some() {
            return None;
        }
        self.resolve_target().map(|index| &self.objects[index])
    }

    pub fn gizmo_target(&self) -> Option<GizmoTarget> {
        let mode = self.tool.gizmo_mode()?;
        let node = match &self.ephemeral {
            Some(group) => group.node,
            None => self.objects[self.resolve_target()?].node,
        };

        Some(GizmoTarget {
            node,
            mode,
            space: self.gizmo.space(),
        })
    }

    pub fn spawn_object(&mut self, object: Object3D) -> usize {
        self.teardown_ephemeral_group();

        let name = object.name.clone();
        let node = self.scene.spawn(object, self.scene.root());
        let index = self.push_object(PlacedObject::new(name, node));

        self.selection = Selection::Single(index);
        self.gizmo.reset();
        self.check_invariants();
        index
    }

    pub fn pick_one(&mut self, index: usize) {
        if index >= self.objects.len() {
            return;
        }

        self.teardown_ephemeral_group();
        self.selection = Selection::Single(index);
        self.gizmo.reset();
        self.check_invariants();
    }

    /// Click on empty space. Ignored by the select tool, which owns empty-space drags.
    pub fn clear_selection(&mut self) {
        if self.tool == Tool::Select {
            return;
        }

        self.teardown_ephemeral_group();
        self.selection = Selection::None;
        self.gizmo.reset();
        self.check_invariants();
    }

    pub fn begin_marquee(&mut self, origin: Vec2) {
        if self.tool != Tool::Select || self.gizmo.is_dragging() {
            return;
        }
        self.marquee = Some(Marquee::new(origin));
    }

    pub fn update_marquee(&mut self, point: Vec2) {
        if let Some(marquee) = &mut self.marquee {
            marquee.update(point);
        }
    }

    /// Abandons a drag without touching the selection.
    pub fn cancel_marquee(&mut self) {
        self.marquee = None;
    }

    pub fn end_marquee(&mut self) {
        let Some(marquee) = self.marquee.take() else {
            return;
        };
        if self.tool != Tool::Select {
            return;
        }

        let hits = self.objects_in_rect(marquee.rect());
        self.selection = Selection::from_indices(hits);
        self.gizmo.reset();

        let members = self.selection.indices();
        if members.len() > 1 {
            self.create_ephemeral_group(members);
        } else {
            self.teardown_ephemeral_group();
        }

        log::debug!("Marquee selected {} object(s)", self.selection.len());
        self.check_invariants();
    }

    fn objects_in_rect(&self, rect: ScreenRect) -> Vec<usize> {
        let Some(view) = &self.view else {
            log::warn!("Marquee finished before the view was ready");
            return Vec::new();
        };

        self.objects
            .iter()
            .enumerate()
            .filter_map(|(index, object)| {
                let position = self.scene.world_position(object.node);
                view.camera
                    .world_to_viewport(position, &view.viewport)
                    .filter(|pixel| rect.contains(*pixel))
                    .map(|_| index)
            })
            .collect()
    }

    /// Turns the multi-selection into a persistent group object placed at the members'
    /// centroid.
    pub fn group(&mut self) {
        let Selection::Multi(indices) = &self.selection else {
            return;
        };
        let indices: BTreeSet<usize> = indices
            .iter()
            .copied()
            .filter(|&index| index < self.objects.len())
            .collect();
        if indices.len() < 2 {
            return;
        }

        self.teardown_ephemeral_group();

        let nodes = indices.iter().map(|&index| self.objects[index].node).collect_vec();
        let group = self.spawn_group_node("Group", &nodes);
        self.remove_indices(&indices);
        let index = self.push_object(PlacedObject::new("Group", group));

        log::debug!("Grouped {} objects into entry {}", nodes.len(), index);

        self.selection = Selection::Single(index);
        self.tool = Tool::Translate;
        self.gizmo.reset();
        self.check_invariants();
    }

    /// Dissolves the targeted persistent group back into independent objects.
    pub fn degroup(&mut self) {
        let Some(index) = self.resolve_target() else {
            return;
        };
        let node = self.objects[index].node;
        let children = match self.scene.get_object(node) {
            Some(object) if object.kind == NodeKind::Group && !object.child_ids.is_empty() => {
                object.child_ids.clone()
            }
            _ => return,
        };

        self.teardown_ephemeral_group();

        let root = self.scene.root();
        for &child in &children {
            self.scene.attach(child, root);
        }
        self.scene.remove_object(node);
        self.objects.remove(index);

        let first = self.objects.len();
        for child in children {
            let name = self
                .scene
                .get_object(child)
                .map(|object| object.name.clone())
                .unwrap_or_default();
            self.push_object(PlacedObject::new(name, child));
        }

        log::debug!("Degrouped entry {} into {} objects", index, self.objects.len() - first);

        self.selection = Selection::Single(first);
        self.gizmo.reset();
        self.check_invariants();
    }

    pub fn apply_field_edit(&mut self, edit: FieldEdit, value: f32) {
        if !value.is_finite() {
            log::warn!("Ignoring non-finite value for {:?}", edit);
            return;
        }
        let Some(index) = self.resolve_target() else {
            return;
        };

        let node = self.objects[index].node;
        let Some(mut vector) = self.read_field(node, edit.field) else {
            return;
        };
        vector[edit.axis.index()] = value;
        self.write_field(node, edit.field, vector);
        self.objects[index].snapshot.set_axis(edit, value);
    }

    pub fn place_on_floor(&mut self) {
        let Some(index) = self.resolve_target() else {
            return;
        };

        let node = self.objects[index].node;
        let Some(mut position) = self.read_field(node, TransformField::Position) else {
            return;
        };

        position.y = match self.config.floor_snap {
            FloorSnap::Origin => 0.0,
            FloorSnap::BoundingBox => match self.scene.world_bounds(node) {
                Some(bounds) => position.y - bounds.min.y,
                None => 0.0,
            },
        };

        self.scene.set_object_translation(node, position);
        self.sync_snapshot(index);
    }

    pub fn nudge_axis(&mut self, kind: NudgeKind, axis: Axis, delta: f32) {
        if !delta.is_finite() {
            log::warn!("Ignoring non-finite {:?} nudge", kind);
            return;
        }
        let Some(index) = self.resolve_target() else {
            return;
        };

        let node = self.objects[index].node;
        let field = kind.field();
        let Some(mut vector) = self.read_field(node, field) else {
            return;
        };

        let value = vector[axis.index()] + delta;
        vector[axis.index()] = match kind {
            NudgeKind::Scale => value.max(self.config.scale_floor),
            NudgeKind::Move | NudgeKind::Rotate => value,
        };

        self.write_field(node, field, vector);
        self.sync_snapshot(index);
    }

    pub fn delete_selection(&mut self) {
        self.teardown_ephemeral_group();

        let indices: BTreeSet<usize> = self.selection.indices().into_iter().collect();
        if indices.is_empty() {
            return;
        }

        for object in self.remove_indices(&indices) {
            self.scene.remove_object(object.node);
        }

        log::debug!("Deleted {} object(s)", indices.len());

        self.selection = Selection::None;
        self.check_invariants();
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.marquee = None;
        if tool == Tool::Select && self.tool != Tool::Select {
            self.teardown_ephemeral_group();
        }

        self.tool = tool;
        self.gizmo.reset();
        self.check_invariants();
    }

    pub fn set_gizmo_space(&mut self, space: GizmoSpace) {
        self.gizmo.set_space(space);
    }

    pub fn gizmo_pointer_down(&mut self) {
        if self.gizmo_target().is_none() {
            return;
        }
        self.gizmo.pointer_down(self.tool);
    }

    pub fn gizmo_pointer_up(&mut self) {
        self.gizmo.pointer_up();
    }

    /// Re-reads snapshots after the transform handle moved the target.
    pub fn on_transform_change(&mut self) {
        let indices = match &self.ephemeral {
            Some(group) => group.members.clone(),
            None => self.resolve_target().into_iter().collect(),
        };

        for index in indices {
            self.sync_snapshot(index);
        }
    }

    pub fn import_gltf(&mut self, path: &Path) -> anyhow::Result<usize> {
        let gltf = gltf::Gltf::open(path)
            .with_context(|| format!("Failed to open glTF file {}", path.display()))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Model".to_string());

        self.import_gltf_document(&gltf.document, &name)
    }

    pub fn import_gltf_slice(&mut self, bytes: &[u8], name: &str) -> anyhow::Result<usize> {
        let gltf = gltf::Gltf::from_slice(bytes).context("Failed to parse glTF data")?;
        self.import_gltf_document(&gltf.document, name)
    }

    fn import_gltf_document(
        &mut self,
        document: &gltf::Document,
        name: &str,
    ) -> anyhow::Result<usize> {
        let gltf_scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .context("No scenes in glTF")?;

        self.teardown_ephemeral_group();

        let container = self.scene.spawn(
            Object3D::group(name, self.config.import_position),
            self.scene.root(),
        );
        let spawned = self.scene.spawn_gltf_scene(&gltf_scene, container);
        let index = self.push_object(PlacedObject::new(name, container));

        log::info!("Imported {} ({} root nodes) as entry {}", name, spawned.len(), index);

        self.selection = Selection::Single(index);
        self.gizmo.reset();
        self.check_invariants();
        Ok(index)
    }

    /// Spawns every root node of `document` as a new object and selects the first one.
    pub fn open_document(&mut self, document: &SceneDocument) -> usize {
        if document.nodes.is_empty() {
            return 0;
        }

        self.teardown_ephemeral_group();

        let root = self.scene.root();
        let first = self.objects.len();
        for node in &document.nodes {
            let object_id = self.scene.spawn_document_node(node, root);
            self.push_object(PlacedObject::new(node.name.clone(), object_id));
        }

        self.selection = Selection::Single(first);
        self.gizmo.reset();
        self.check_invariants();
        document.nodes.len()
    }

    /// Describes every selected object in world space, grouped or not.
    ///
    /// The objects are attached to a detached identity root for the duration of the export
    /// and then returned to their previous parents.
    pub fn export_selection(&mut self) -> Option<SceneDocument> {
        let members = match &self.ephemeral {
            Some(group) => group.members.clone(),
            None => self
                .selection
                .indices()
                .into_iter()
                .filter(|&index| index < self.objects.len())
                .collect(),
        };
        if members.is_empty() {
            return None;
        }

        let export_root = self.export_root;
        let restore = members
            .iter()
            .map(|&index| {
                let node = self.objects[index].node;
                (node, self.scene.parent_of(node))
            })
            .collect_vec();

        for &(node, _) in &restore {
            self.scene.attach(node, export_root);
        }

        let nodes = restore
            .iter()
            .filter_map(|&(node, _)| self.scene.export_subtree(node))
            .collect();

        for &(node, parent) in &restore {
            match parent {
                Some(parent) => self.scene.attach(node, parent),
                None => self.scene.remove_object(node),
            }
        }

        for index in members {
            self.sync_snapshot(index);
        }

        log::info!("Exported {} object(s)", restore.len());
        self.check_invariants();
        Some(SceneDocument { nodes })
    }

    fn push_object(&mut self, object: PlacedObject) -> usize {
        self.objects.push(object);
        let index = self.objects.len() - 1;
        self.sync_snapshot(index);
        index
    }

    /// Removes the entries at `indices`, keeping the relative order of the others.
    fn remove_indices(&mut self, indices: &BTreeSet<usize>) -> Vec<PlacedObject> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.objects)
            .into_iter()
            .enumerate()
            .partition_map(|(index, object)| {
                if indices.contains(&index) {
                    Either::Left(object)
                } else {
                    Either::Right(object)
                }
            });

        self.objects = kept;
        removed
    }

    fn centroid(&self, nodes: &[ObjectId]) -> Vec3 {
        if nodes.is_empty() {
            return Vec3::ZERO;
        }

        let sum: Vec3 = nodes
            .iter()
            .map(|&node| self.scene.world_position(node))
            .sum();
        sum / nodes.len() as f32
    }

    fn spawn_group_node(&mut self, name: &str, members: &[ObjectId]) -> ObjectId {
        let centroid = self.centroid(members);
        let group = self
            .scene
            .spawn(Object3D::group(name, centroid), self.scene.root());

        for &member in members {
            self.scene.attach(member, group);
        }

        group
    }

    fn create_ephemeral_group(&mut self, members: Vec<usize>) {
        self.teardown_ephemeral_group();
        if members.len() < 2 {
            return;
        }

        let nodes = members.iter().map(|&index| self.objects[index].node).collect_vec();
        let node = self.spawn_group_node("Selection", &nodes);

        log::debug!("Created selection group over {} objects", members.len());
        self.ephemeral = Some(EphemeralGroup { node, members });
    }

    fn teardown_ephemeral_group(&mut self) {
        let Some(group) = self.ephemeral.take() else {
            return;
        };

        let root = self.scene.root();
        for child in self.scene.children_of(group.node) {
            self.scene.attach(child, root);
        }
        self.scene.remove_object(group.node);

        for &index in &group.members {
            if index < self.objects.len() {
                self.sync_snapshot(index);
            }
        }

        log::debug!("Dissolved selection group over {} objects", group.members.len());
    }

    fn read_field(&self, node: ObjectId, field: TransformField) -> Option<Vec3> {
        self.scene
            .get_object_transform(node)
            .map(|transform| field.read(transform))
    }

    fn write_field(&mut self, node: ObjectId, field: TransformField, value: Vec3) {
        match field {
            TransformField::Position => self.scene.set_object_translation(node, value),
            TransformField::Rotation => self.scene.set_object_rotation(node, value),
            TransformField::Scale => self.scene.set_object_scale(node, value),
        }
    }

    /// Refreshes the cached world transform of one entry from its scene node.
    fn sync_snapshot(&mut self, index: usize) {
        let node = self.objects[index].node;
        let snapshot = if self.scene.parent_of(node) == Some(self.scene.root()) {
            // Directly under the identity root the local transform is the world transform.
            self.scene
                .get_object_transform(node)
                .map(TransformSnapshot::from_transform)
                .unwrap_or_default()
        } else {
            TransformSnapshot::from_world_matrix(self.scene.world_matrix(node))
        };

        self.objects[index].snapshot = snapshot;
    }

    fn check_invariants(&self) {
        if !cfg!(debug_assertions) {
            return;
        }

        if let Selection::Multi(indices) = &self.selection {
            debug_assert!(indices.len() >= 2, "multi-selection with fewer than two members");
        }
        debug_assert!(
            self.selection
                .indices()
                .iter()
                .all(|&index| index < self.objects.len()),
            "selection refers to a missing object"
        );

        let root = self.scene.root();
        match &self.ephemeral {
            Some(group) => {
                debug_assert_eq!(
                    self.selection.indices(),
                    group.members,
                    "selection group is stale"
                );
                debug_assert_eq!(self.scene.parent_of(group.node), Some(root));
                for &index in &group.members {
                    let node = self.objects[index].node;
                    debug_assert_eq!(self.scene.parent_of(node), Some(group.node));
                }
            }
            None => {
                for object in &self.objects {
                    debug_assert_eq!(
                        self.scene.parent_of(object.node),
                        Some(root),
                        "placed object {} is not at the top level",
                        object.name
                    );
                }
            }
        }
    }
}
