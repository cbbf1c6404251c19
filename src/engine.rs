use crate::demo::DemoState;

pub fn update(state: &mut DemoState) -> anyhow::Result<()> {
    state.update();
    state.editor.scene_mut().late_update();

    Ok(())
}
