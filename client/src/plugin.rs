//! Runs one [`EffectHost`] inside a windowed Bevy app.

use bevy::input::touch::TouchInput;
use bevy::prelude::*;
use bevy::window::{CursorMoved, WindowCloseRequested, WindowResized};
use wavefx::host::{EffectHost, InputEvent};
use wavefx::registry::EffectRegistry;

use crate::config::ViewerConfig;
use crate::input::{cursor_event, resize_event, touch_event};
use crate::rendering::{BevyBackend, SceneSync};

/// The mounted effect and the window it draws into.
#[derive(Resource)]
pub struct ActiveEffect {
    pub host: EffectHost,
    pub window: Entity,
}

pub struct EffectPlugin;

impl Plugin for EffectPlugin {
    fn build(&self, app: &mut App) {
        if !app.world().contains_resource::<EffectRegistry>() {
            app.insert_resource(EffectRegistry::with_builtin());
        }
        app.init_resource::<SceneSync>()
            .add_systems(Startup, mount_effect)
            .add_systems(Update, (forward_input, drive_effect).chain())
            .add_systems(Last, teardown_effect);
    }
}

pub fn mount_effect(
    config: Res<ViewerConfig>,
    registry: Res<EffectRegistry>,
    mut backend: BevyBackend,
    mut exit: EventWriter<AppExit>,
) {
    let effect = match registry.create(&config.effect) {
        Ok(effect) => effect,
        Err(e) => {
            error!("{} (available: {:?})", e, registry.names().collect::<Vec<_>>());
            exit.write(AppExit::error());
            return;
        }
    };

    let overrides = config.options.clone().with_el(config.container());
    let host = match EffectHost::construct(&mut backend, effect, overrides) {
        Ok(host) => host,
        Err(e) => {
            error!("Cannot start `{}`: {}", config.effect, e);
            exit.write(AppExit::error());
            return;
        }
    };

    let Some(window) = backend.window(host.container()) else {
        error!("Window for `{}` disappeared during startup", config.container());
        exit.write(AppExit::error());
        return;
    };
    backend.commands().insert_resource(ActiveEffect { host, window });
}

pub fn forward_input(
    active: Option<ResMut<ActiveEffect>>,
    mut backend: BevyBackend,
    mut cursor: EventReader<CursorMoved>,
    mut touches: EventReader<TouchInput>,
    mut resized: EventReader<WindowResized>,
) {
    let Some(mut active) = active else {
        return;
    };
    let window = active.window;

    let touch_input: Vec<&TouchInput> = touches.read().filter(|e| e.window == window).collect();
    let mut events: Vec<InputEvent> = Vec::new();
    // A touch screen only shows itself through its first touch
    if !touch_input.is_empty() && backend.mark_touch_device() {
        info!("Touch input detected, switching to the mobile scale");
        events.push(InputEvent::Resize);
    }
    events.extend(resized.read().filter_map(|e| resize_event(e, window)));
    events.extend(cursor.read().filter_map(|e| cursor_event(e, window)));
    events.extend(touch_input.into_iter().filter_map(|e| touch_event(e, window)));

    for event in events {
        active.host.handle_input(&mut backend, event);
    }
}

pub fn drive_effect(active: Option<ResMut<ActiveEffect>>, mut backend: BevyBackend, time: Res<Time>) {
    if let Some(mut active) = active {
        active.host.tick(&mut backend, time.delta());
    }
}

pub fn teardown_effect(
    active: Option<ResMut<ActiveEffect>>,
    mut backend: BevyBackend,
    mut close_requests: EventReader<WindowCloseRequested>,
    mut exits: EventReader<AppExit>,
) {
    let Some(mut active) = active else {
        return;
    };
    let window = active.window;

    let closing = close_requests.read().filter(|e| e.window == window).count() > 0;
    let exiting = exits.read().count() > 0;
    if closing || exiting {
        active.host.destroy(&mut backend);
    }
}
