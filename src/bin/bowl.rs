//! Rainmaker - bowl scenario
//!
//! Water drops into a catch vessel. Hold the left mouse button to drag the
//! bar and spill it.

use bevy::prelude::*;
use rainmaker::prelude::*;

fn main() {
    let config = SandboxConfig::bowl();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Rainmaker - Bowl".to_string(),
                resolution: bevy::window::WindowResolution::new(
                    config.window_size.x as u32,
                    config.window_size.y as u32,
                ),
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.08, 0.08, 0.1)))
        .add_plugins(SandboxPlugin::new(config))
        .run();
}
