use std::f32::consts::FRAC_PI_4;
use std::path::Path;

use anyhow::Context;
use glam::{Vec2, Vec3};

use scene_editor::camera::{Camera, Viewport};
use scene_editor::config::EditorConfig;
use scene_editor::editor::{Axis, NudgeKind, SelectionTransformManager, Tool};
use scene_editor::scene_graph::{Scene, SceneDocument};

const COPIES: usize = 3;

/// Drives the editor through a scripted session, one step per frame.
pub struct DemoState {
    pub editor: SelectionTransformManager,
    viewport: Viewport,
    frame: usize,
    exported: Option<SceneDocument>,
}

impl DemoState {
    pub fn new(config: EditorConfig, model_path: &Path) -> anyhow::Result<Self> {
        let camera = Camera {
            eye: Vec3::new(0.0, 4.0, -8.0),
            target: Vec3::ZERO,
            ..Default::default()
        };
        let viewport = Viewport::new(1280.0, 720.0);

        let mut editor = SelectionTransformManager::new(Scene::new(), config);
        editor.set_view(camera, viewport);
        editor.import_gltf(model_path)?;

        let template = editor
            .export_selection()
            .context("Imported model is not selected")?;
        for copy in 1..COPIES {
            editor.open_document(&template);
            editor.nudge_axis(NudgeKind::Move, Axis::X, 1.5 * copy as f32);
        }

        Ok(Self {
            editor,
            viewport,
            frame: 0,
            exported: None,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.exported.is_some()
    }

    pub fn exported(&self) -> Option<&SceneDocument> {
        self.exported.as_ref()
    }

    pub fn update(&mut self) {
        let editor = &mut self.editor;

        match self.frame {
            0 => {
                editor.set_tool(Tool::Select);
                editor.begin_marquee(Vec2::ZERO);
            }
            1 => editor.update_marquee(self.viewport.resolution()),
            2 => editor.end_marquee(),
            3 => editor.group(),
            4 => {
                editor.set_tool(Tool::Rotate);
                editor.gizmo_pointer_down();
                editor.nudge_axis(NudgeKind::Rotate, Axis::Y, FRAC_PI_4);
                editor.gizmo_pointer_up();
                editor.place_on_floor();
            }
            5 => editor.degroup(),
            _ => {
                editor.set_tool(Tool::Select);
                editor.begin_marquee(Vec2::ZERO);
                editor.update_marquee(self.viewport.resolution());
                editor.end_marquee();
                self.exported = Some(editor.export_selection().unwrap_or_default());
            }
        }

        log::info!(
            "Frame {}: {} objects, {} selected, tool {:?}",
            self.frame,
            editor.objects().len(),
            editor.selection().len(),
            editor.tool()
        );
        self.frame += 1;
    }
}
