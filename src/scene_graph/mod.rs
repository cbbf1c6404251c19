pub mod document;
pub mod object3d;
pub mod scene;
pub mod transform;

pub use document::{SceneDocument, SceneNode};
pub use object3d::{NodeKind, Object3D, ObjectId};
pub use scene::Scene;
pub use transform::Transform;
