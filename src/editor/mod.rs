pub mod manager;
pub mod marquee;
pub mod placed_object;
pub mod selection;
pub mod tool;

pub use manager::SelectionTransformManager;
pub use placed_object::{Axis, FieldEdit, NudgeKind, PlacedObject, TransformField};
pub use selection::Selection;
pub use tool::Tool;
