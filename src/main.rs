use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use scene_editor::config::EditorConfig;

use crate::demo::DemoState;

mod demo;
mod engine;

fn main() -> Result<()> {
    pretty_env_logger::init();

    let mut args = std::env::args().skip(1);
    let model_path = args
        .next()
        .map(PathBuf::from)
        .context("Usage: scene-editor <model.gltf> [config.toml]")?;
    let config = match args.next() {
        Some(path) => EditorConfig::load(Path::new(&path))?,
        None => EditorConfig::default(),
    };

    let mut state = DemoState::new(config, &model_path).context("Failed to create editor state")?;
    while !state.is_finished() {
        engine::update(&mut state)?;
    }

    if let Some(document) = state.exported() {
        println!("{}", document.to_json()?);
    }

    Ok(())
}
