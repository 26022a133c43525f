//! Windowless mode: drives the effect against the in-memory backend for a
//! fixed number of frames and reports what was rendered and released.

use std::time::Duration;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use wavefx::backend::HeadlessBackend;
use wavefx::errors::ConfigurationError;
use wavefx::host::{EffectHost, HostState};
use wavefx::registry::EffectRegistry;

use crate::config::ViewerConfig;

pub const HEADLESS_WIDTH: f32 = 1280.0;
pub const HEADLESS_HEIGHT: f32 = 720.0;

/// One frame at the 60 Hz reference rate
pub const FRAME_TIME: Duration = Duration::from_nanos(16_666_667);

#[derive(Resource)]
pub struct HeadlessRun {
    pub host: EffectHost,
    pub backend: HeadlessBackend,
    pub frames_left: u64,
    finished: bool,
}

impl HeadlessRun {
    pub fn new(
        config: &ViewerConfig,
        registry: &EffectRegistry,
        frames: u64,
    ) -> Result<Self, ConfigurationError> {
        let mut backend =
            HeadlessBackend::new().with_container(config.container(), HEADLESS_WIDTH, HEADLESS_HEIGHT);
        let effect = registry.create(&config.effect)?;
        let overrides = config.options.clone().with_el(config.container());
        let host = EffectHost::construct(&mut backend, effect, overrides)?;
        Ok(Self {
            host,
            backend,
            frames_left: frames,
            finished: false,
        })
    }
}

pub fn run(config: &ViewerConfig, registry: &EffectRegistry, frames: u64) -> AppExit {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, LogPlugin::default()));

    let run = match HeadlessRun::new(config, registry, frames) {
        Ok(run) => run,
        Err(e) => {
            error!("Cannot start `{}`: {}", config.effect, e);
            return AppExit::error();
        }
    };
    info!("Running `{}` headless for {} frames", config.effect, frames);

    app.insert_resource(run)
        .add_systems(Update, step_headless)
        .run()
}

pub fn step_headless(run: Option<ResMut<HeadlessRun>>, mut exit: EventWriter<AppExit>) {
    let Some(mut run) = run else {
        return;
    };
    let run = &mut *run;
    if run.finished {
        return;
    }

    if run.frames_left > 0 && run.host.tick(&mut run.backend, FRAME_TIME) {
        run.frames_left -= 1;
        return;
    }

    let failed = run.host.state() == HostState::Failed || run.frames_left > 0;
    run.host.destroy(&mut run.backend);
    run.finished = true;
    info!(
        "Rendered {} frames ({} geometry uploads), released {} resources",
        run.backend.render_count(),
        run.backend.upload_count(),
        run.backend.released().len()
    );
    exit.write(if failed {
        AppExit::error()
    } else {
        AppExit::Success
    });
}
