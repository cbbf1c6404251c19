pub mod camera;
pub mod config;
pub mod editor;
pub mod math;
pub mod scene_graph;
