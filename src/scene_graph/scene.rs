use glam::{Mat4, Quat, Vec3};
use id_arena::Arena;

use crate::math::bounds::AABB;
use crate::scene_graph::document::SceneNode;
use crate::scene_graph::object3d::{NodeKind, Object3D, ObjectId};
use crate::scene_graph::transform::{quat_to_euler, Transform};

pub struct Scene {
    pub objects: Arena<Object3D>,
    root: ObjectId,
}

impl Scene {
    pub fn new() -> Self {
        let mut objects = Arena::new();
        let root = objects.alloc(Object3D::named("Scene"));

        Self { objects, root }
    }

    /// The identity node every visible object hangs under.
    pub fn root(&self) -> ObjectId {
        self.root
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.alloc(object)
    }

    /// Allocates `object` and parents it under `parent` without touching its local transform.
    pub fn spawn(&mut self, object: Object3D, parent: ObjectId) -> ObjectId {
        let object_id = self.add_object(object);
        self.set_object_parent(object_id, Some(parent));
        object_id
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    pub fn parent_of(&self, id: ObjectId) -> Option<ObjectId> {
        self.objects.get(id).and_then(|object| object.parent_id)
    }

    pub fn children_of(&self, id: ObjectId) -> Vec<ObjectId> {
        self.objects
            .get(id)
            .map(|object| object.child_ids.clone())
            .unwrap_or_default()
    }

    /// Whether `ancestor` appears on the parent chain of `id` (or is `id` itself).
    pub fn is_ancestor(&self, ancestor: ObjectId, id: ObjectId) -> bool {
        let mut current = Some(id);
        while let Some(current_id) = current {
            if current_id == ancestor {
                return true;
            }
            current = self.parent_of(current_id);
        }
        false
    }

    /// Whether the object is reachable from the scene root.
    pub fn is_in_scene(&self, id: ObjectId) -> bool {
        self.is_ancestor(self.root, id)
    }

    pub fn spawn_gltf_scene(&mut self, scene: &gltf::Scene, parent: ObjectId) -> Vec<ObjectId> {
        scene
            .nodes()
            .map(|node| self.spawn_gltf_node(&node, parent))
            .collect()
    }

    fn spawn_gltf_node(&mut self, node: &gltf::Node, parent: ObjectId) -> ObjectId {
        let mut object = Object3D::named(node.name().unwrap_or("Unnamed"));
        let (translation, rotation, scale) = node.transform().decomposed();

        object.transform.set_transform(
            translation.into(),
            quat_to_euler(Quat::from_array(rotation)),
            scale.into(),
        );

        if let Some(mesh) = node.mesh() {
            object.kind = NodeKind::Mesh;
            object.local_bounds = mesh
                .primitives()
                .map(|primitive| {
                    let bounds = primitive.bounding_box();
                    AABB::new(bounds.min.into(), bounds.max.into())
                })
                .reduce(|a, b| a.union(&b));
        } else if node.children().next().is_some() {
            object.kind = NodeKind::Group;
        }

        let object_id = self.spawn(object, parent);

        for child in node.children() {
            self.spawn_gltf_node(&child, object_id);
        }

        object_id
    }

    pub fn spawn_document_node(&mut self, node: &SceneNode, parent: ObjectId) -> ObjectId {
        let object = Object3D {
            name: node.name.clone(),
            kind: node.kind,
            transform: Transform::new(node.translation, node.rotation, node.scale),
            local_bounds: node.local_bounds(),
            ..Default::default()
        };

        let object_id = self.spawn(object, parent);

        for child in &node.children {
            self.spawn_document_node(child, object_id);
        }

        object_id
    }

    /// Describes the subtree rooted at `id` using local transforms.
    pub fn export_subtree(&self, id: ObjectId) -> Option<SceneNode> {
        self.objects.get(id).map(|object| self.export_object(object))
    }

    fn export_object(&self, object: &Object3D) -> SceneNode {
        SceneNode {
            name: object.name.clone(),
            kind: object.kind,
            translation: object.transform.translation(),
            rotation: object.transform.rotation(),
            scale: object.transform.scale(),
            bounds: object.local_bounds.map(|bounds| [bounds.min, bounds.max]),
            children: object
                .children(self)
                .map(|child| self.export_object(child))
                .collect(),
        }
    }

    /// Updates world transforms of everything reachable from the root. Detached subtrees
    /// keep whatever they last cached.
    fn update_transforms(&self) {
        self.update_object_transform_recursive(self.root, Mat4::IDENTITY);
    }

    fn update_object_transform_recursive(&self, object_id: ObjectId, parent_world_matrix: Mat4) {
        if let Some(object) = self.objects.get(object_id) {
            if object.transform.is_world_dirty() {
                let local_matrix = *object.transform.get_local_matrix();
                let world_matrix = parent_world_matrix * local_matrix;
                object.transform.set_world_matrix(world_matrix);
            }

            let world_matrix = *object.transform.get_world_matrix();
            for &child_id in &object.child_ids {
                self.update_object_transform_recursive(child_id, world_matrix);
            }
        }
    }

    /// Invalidates world transforms for an object and all its descendants
    pub fn invalidate_object_hierarchy(&self, object_id: ObjectId) {
        if let Some(object) = self.objects.get(object_id) {
            object.transform.invalidate_world();

            for &child_id in &object.child_ids {
                self.invalidate_object_hierarchy(child_id);
            }
        }
    }

    /// World matrix computed from the current local transforms, independent of the frame cache.
    pub fn world_matrix(&self, object_id: ObjectId) -> Mat4 {
        let Some(object) = self.objects.get(object_id) else {
            return Mat4::IDENTITY;
        };

        let local_matrix = *object.transform.get_local_matrix();
        match object.parent_id {
            Some(parent_id) => self.world_matrix(parent_id) * local_matrix,
            None => local_matrix,
        }
    }

    pub fn world_position(&self, object_id: ObjectId) -> Vec3 {
        self.world_matrix(object_id).transform_point3(Vec3::ZERO)
    }

    /// World-space box around the geometry of the object and all of its descendants.
    pub fn world_bounds(&self, object_id: ObjectId) -> Option<AABB> {
        let object = self.objects.get(object_id)?;
        let own = object
            .local_bounds
            .map(|bounds| bounds.transformed(&self.world_matrix(object_id)));

        object
            .child_ids
            .iter()
            .filter_map(|&child_id| self.world_bounds(child_id))
            .fold(own, |acc, bounds| match acc {
                Some(acc) => Some(acc.union(&bounds)),
                None => Some(bounds),
            })
    }

    /// Sets the parent of an object and updates child relationships
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        if let Some(child) = self.objects.get(child_id) {
            if let Some(old_parent_id) = child.parent_id {
                if let Some(old_parent) = self.objects.get_mut(old_parent_id) {
                    old_parent.child_ids.retain(|&id| id != child_id);
                }
            }
        }

        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = new_parent_id;

            if let Some(new_parent_id) = new_parent_id {
                if let Some(new_parent) = self.objects.get_mut(new_parent_id) {
                    new_parent.child_ids.push(child_id);
                }
            }
        }

        self.invalidate_object_hierarchy(child_id);
    }

    /// Moves `child_id` under `parent_id`, rewriting its local transform so that its world
    /// transform stays where it was.
    pub fn attach(&mut self, child_id: ObjectId, parent_id: ObjectId) {
        if self.is_ancestor(child_id, parent_id) {
            log::warn!("Refusing to attach an object under its own subtree");
            return;
        }

        let child_world = self.world_matrix(child_id);
        let parent_world = self.world_matrix(parent_id);

        if let Some(child) = self.objects.get_mut(child_id) {
            child
                .transform
                .set_from_matrix(parent_world.inverse() * child_world);
        }

        self.set_object_parent(child_id, Some(parent_id));
    }

    /// Detaches the object from its parent. The arena slot stays allocated but nothing
    /// in the scene refers to it any more.
    pub fn remove_object(&mut self, object_id: ObjectId) {
        self.set_object_parent(object_id, None);
    }

    pub fn set_object_translation(&mut self, object_id: ObjectId, translation: Vec3) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_translation(translation);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn set_object_rotation(&mut self, object_id: ObjectId, rotation: Vec3) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_rotation(rotation);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn set_object_scale(&mut self, object_id: ObjectId, scale: Vec3) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_scale(scale);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    pub fn get_object_transform(&self, object_id: ObjectId) -> Option<&Transform> {
        self.objects.get(object_id).map(|object| &object.transform)
    }

    pub fn late_update(&mut self) {
        self.update_transforms();
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_at(scene: &mut Scene, name: &str, translation: Vec3, parent: ObjectId) -> ObjectId {
        let mut object = Object3D::named(name);
        object.transform.set_translation(translation);
        scene.spawn(object, parent)
    }

    #[test]
    fn world_matrix_composes_parent_chain() {
        let mut scene = Scene::new();
        let root = scene.root();
        let parent = spawn_at(&mut scene, "parent", Vec3::new(1.0, 0.0, 0.0), root);
        scene.set_object_scale(parent, Vec3::splat(2.0));
        let child = spawn_at(&mut scene, "child", Vec3::new(0.0, 1.0, 0.0), parent);

        assert!(scene
            .world_position(child)
            .abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-6));
        assert!(scene.is_in_scene(child));
        assert!(scene.is_ancestor(parent, child));
        assert!(!scene.is_ancestor(child, parent));
    }

    #[test]
    fn attach_preserves_world_transform() {
        let mut scene = Scene::new();
        let root = scene.root();
        let group = spawn_at(&mut scene, "group", Vec3::new(3.0, 0.0, -1.0), root);
        scene.set_object_rotation(group, Vec3::new(0.0, 0.7, 0.0));
        let object = spawn_at(&mut scene, "object", Vec3::new(-2.0, 1.0, 4.0), root);
        scene.set_object_rotation(object, Vec3::new(0.1, 0.2, 0.3));

        let before = scene.world_matrix(object);
        scene.attach(object, group);

        assert_eq!(scene.parent_of(object), Some(group));
        assert!(scene.world_matrix(object).abs_diff_eq(before, 1e-5));

        scene.attach(object, root);
        let transform = scene.get_object_transform(object).unwrap();
        assert!(transform
            .translation()
            .abs_diff_eq(Vec3::new(-2.0, 1.0, 4.0), 1e-5));
        assert!(transform.rotation().abs_diff_eq(Vec3::new(0.1, 0.2, 0.3), 1e-4));
        assert!(scene.children_of(group).is_empty());
    }

    #[test]
    fn attach_rejects_cycles() {
        let mut scene = Scene::new();
        let root = scene.root();
        let parent = spawn_at(&mut scene, "parent", Vec3::ZERO, root);
        let child = spawn_at(&mut scene, "child", Vec3::X, parent);

        scene.attach(parent, child);
        assert_eq!(scene.parent_of(parent), Some(root));
        assert_eq!(scene.parent_of(child), Some(parent));
    }

    #[test]
    fn removed_objects_leave_the_scene() {
        let mut scene = Scene::new();
        let root = scene.root();
        let object = spawn_at(&mut scene, "object", Vec3::ZERO, root);
        scene.remove_object(object);

        assert!(!scene.is_in_scene(object));
        assert!(scene.children_of(root).is_empty());
        assert!(scene.get_object(object).is_some());
    }

    #[test]
    fn world_bounds_cover_descendants() {
        let mut scene = Scene::new();
        let root = scene.root();
        let group = scene.spawn(Object3D::group("group", Vec3::new(0.0, 2.0, 0.0)), root);
        let mut a = Object3D::named("a");
        a.local_bounds = Some(AABB::new(Vec3::splat(-0.5), Vec3::splat(0.5)));
        a.transform.set_translation(Vec3::new(-1.0, 0.0, 0.0));
        scene.spawn(a, group);
        let mut b = Object3D::named("b");
        b.local_bounds = Some(AABB::new(Vec3::ZERO, Vec3::ONE));
        b.transform.set_translation(Vec3::new(1.0, -1.0, 0.0));
        scene.spawn(b, group);

        let bounds = scene.world_bounds(group).unwrap();
        assert!(bounds.min.abs_diff_eq(Vec3::new(-1.5, 1.0, -0.5), 1e-6));
        assert!(bounds.max.abs_diff_eq(Vec3::new(2.0, 2.5, 1.0), 1e-6));
        assert!(scene.world_bounds(root).is_some());
    }

    #[test]
    fn late_update_caches_world_matrices() {
        let mut scene = Scene::new();
        let root = scene.root();
        let parent = spawn_at(&mut scene, "parent", Vec3::new(0.0, 0.0, 5.0), root);
        let child = spawn_at(&mut scene, "child", Vec3::new(1.0, 0.0, 0.0), parent);

        scene.late_update();
        let cached = *scene.get_object_transform(child).unwrap().get_world_matrix();
        assert!(cached.abs_diff_eq(scene.world_matrix(child), 1e-6));

        scene.set_object_translation(parent, Vec3::ZERO);
        assert!(scene.get_object_transform(child).unwrap().is_world_dirty());
        scene.late_update();
        let cached = *scene.get_object_transform(child).unwrap().get_world_matrix();
        assert!(cached.abs_diff_eq(Mat4::from_translation(Vec3::X), 1e-6));
    }

    #[test]
    fn late_update_skips_detached_subtrees() {
        let mut scene = Scene::new();
        let root = scene.root();
        let kept = spawn_at(&mut scene, "kept", Vec3::X, root);
        let detached = spawn_at(&mut scene, "detached", Vec3::Y, root);
        scene.remove_object(detached);
        let orphan = scene.add_object(Object3D::named("orphan"));

        scene.late_update();

        assert!(!scene.get_object_transform(kept).unwrap().is_world_dirty());
        assert!(scene.get_object_transform(detached).unwrap().is_world_dirty());
        assert!(scene.get_object_transform(orphan).unwrap().is_world_dirty());
    }

    #[test]
    fn export_subtree_uses_local_transforms() {
        let mut scene = Scene::new();
        let root = scene.root();
        let group = scene.spawn(Object3D::group("group", Vec3::new(0.0, 2.0, 0.0)), root);
        spawn_at(&mut scene, "leaf", Vec3::new(1.0, 0.0, 0.0), group);

        let node = scene.export_subtree(group).unwrap();
        assert_eq!(node.kind, NodeKind::Group);
        assert_eq!(node.translation, Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(node.children.len(), 1);
        assert_eq!(node.children[0].translation, Vec3::X);

        let copy = scene.spawn_document_node(&node, root);
        assert!(scene
            .world_position(scene.children_of(copy)[0])
            .abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-6));
    }
}
