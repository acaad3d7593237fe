//! Bevy plugin for the sandbox.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use super::clock::Session;
use super::config::SandboxConfig;
use super::render::{spawn_camera, spawn_visuals, sync_bar_visual, sync_particle_visuals};
use crate::physics::plugin::PhysicsPlugin;
use crate::physics::world::PhysicsWorld;

/// Plugin that builds a sandbox scene and ticks it once per frame.
///
/// The scene is built at `Startup`. Every `Update` advances the session by
/// the config's timestep, however long the frame took, and then moves the
/// entities to their proxies.
///
/// # Example
///
/// ```rust,ignore
/// use bevy::prelude::*;
/// use rainmaker::prelude::*;
///
/// fn main() {
///     App::new()
///         .add_plugins(DefaultPlugins)
///         .add_plugins(SandboxPlugin::new(SandboxConfig::bowl()))
///         .run();
/// }
/// ```
#[derive(Default)]
pub struct SandboxPlugin {
    pub config: SandboxConfig,
}

impl SandboxPlugin {
    pub fn new(config: SandboxConfig) -> Self {
        Self { config }
    }
}

impl Plugin for SandboxPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<SandboxConfig>();

        if !app.is_plugin_added::<PhysicsPlugin>() {
            app.add_plugins(PhysicsPlugin::with_gravity(self.config.gravity));
        }

        app.insert_resource(self.config.clone())
            .insert_resource(Session::new(self.config.clone()));

        app.add_systems(
            Startup,
            (initialize_sandbox, spawn_camera, spawn_visuals, spawn_score_text).chain(),
        );
        add_frame_systems(app);
    }
}

/// One tick, then the mirroring, every frame while the session runs.
fn add_frame_systems(app: &mut App) {
    app.add_systems(
        Update,
        (
            run_tick,
            (sync_particle_visuals, sync_bar_visual, update_score_text),
        )
            .chain()
            .run_if(sandbox_running),
    );
}

/// Run condition: the session has been built.
pub fn sandbox_running(session: Res<Session>) -> bool {
    session.is_running()
}

/// Build the scene. Logs and leaves the session uninitialized when the
/// physics world is missing.
pub fn initialize_sandbox(physics: Option<ResMut<PhysicsWorld>>, mut session: ResMut<Session>) {
    let result = match physics {
        Some(mut physics) => session.initialize(Some(&mut *physics)),
        None => session.initialize(None),
    };

    match result {
        Ok(()) => info!("Sandbox running"),
        Err(err) => error!("Failed to build sandbox: {err}"),
    }
}

/// The pointer position in pixels while the left button is held.
fn held_pointer(buttons: &ButtonInput<MouseButton>, window: Option<&Window>) -> Option<Vec2> {
    if !buttons.pressed(MouseButton::Left) {
        return None;
    }
    window.and_then(Window::cursor_position)
}

fn run_tick(
    mut session: ResMut<Session>,
    physics: Option<ResMut<PhysicsWorld>>,
    buttons: Option<Res<ButtonInput<MouseButton>>>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let Some(mut physics) = physics else {
        return;
    };
    let pointer = buttons.and_then(|buttons| held_pointer(&buttons, windows.single().ok()));

    if let Err(err) = session.tick(&mut physics, pointer) {
        error!("Sandbox tick failed: {err}");
    }
}

/// Marker for the score text.
#[derive(Component)]
struct ScoreText;

fn spawn_score_text(mut commands: Commands) {
    commands.spawn((
        Text::new("Score: 0"),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
        ScoreText,
    ));
}

fn update_score_text(session: Res<Session>, mut text_query: Query<&mut Text, With<ScoreText>>) {
    for mut text in text_query.iter_mut() {
        text.0 = format!(
            "Score: {}\n\
             Particles: {}\n\
             Frame: {}",
            session.score(),
            session.proxies().active_count(),
            session.frame()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::clock::ClockState;

    #[test]
    fn test_setup_without_physics_world() {
        let mut app = App::new();
        app.insert_resource(Session::default())
            .add_systems(Startup, initialize_sandbox);

        app.update();

        let session = app.world().resource::<Session>();
        assert_eq!(session.state(), ClockState::Uninitialized);
        assert!(session.proxies().is_empty());
    }

    #[test]
    fn test_setup_with_physics_world() {
        let mut app = App::new();
        app.add_plugins(PhysicsPlugin::default())
            .insert_resource(Session::default())
            .add_systems(Startup, initialize_sandbox);

        app.update();

        let session = app.world().resource::<Session>();
        assert!(session.is_running());
        assert_eq!(
            session.proxies().len(),
            app.world().resource::<PhysicsWorld>().particle_systems()[0].particle_count()
        );
    }

    #[test]
    fn test_one_tick_per_frame() {
        let mut app = App::new();
        app.add_plugins(PhysicsPlugin::default())
            .insert_resource(Session::default())
            .add_systems(Startup, initialize_sandbox);
        add_frame_systems(&mut app);

        for _ in 0..3 {
            app.update();
        }

        let session = app.world().resource::<Session>();
        assert_eq!(session.frame(), 3);
        // Three steps of 1/30 s from rest under 5 m/s²: the bar fell.
        assert!(session.bar().position.y > 200.0);
    }

    #[test]
    fn test_ticks_wait_for_initialization() {
        let mut app = App::new();
        app.insert_resource(Session::default())
            .add_systems(Startup, initialize_sandbox);
        add_frame_systems(&mut app);

        app.update();
        app.update();

        assert_eq!(app.world().resource::<Session>().frame(), 0);
    }

    #[test]
    fn test_pointer_requires_button() {
        let mut buttons = ButtonInput::<MouseButton>::default();
        assert_eq!(held_pointer(&buttons, None), None);

        buttons.press(MouseButton::Left);
        assert_eq!(held_pointer(&buttons, None), None);
    }
}
