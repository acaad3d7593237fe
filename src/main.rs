//! Rainmaker - rain scenario
//!
//! A block of water falls into the window onto a leaning bar. Hold the left
//! mouse button to drag the bar.

use bevy::prelude::*;
use rainmaker::prelude::*;

fn main() {
    let config = SandboxConfig::rain();

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Rainmaker".to_string(),
                resolution: bevy::window::WindowResolution::new(
                    config.window_size.x as u32,
                    config.window_size.y as u32,
                ),
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(SandboxPlugin::new(config))
        .run();
}
