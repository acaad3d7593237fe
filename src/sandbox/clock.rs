//! The session state machine and the per-tick synchronization.
//!
//! A [`Session`] goes from `Uninitialized` to `Running` once, when the scene
//! is built, and stays there. Every tick steps the world by a fixed amount,
//! copies particle positions into the proxy arena (retiring and scoring the
//! ones that escaped sideways), and mirrors the bar.

use bevy::prelude::*;

use super::binder::ProxyArena;
use super::config::SandboxConfig;
use super::error::SceneError;
use super::geometry::{build_enclosure, build_interactive_bar, build_vessel};
use super::interaction::update_bar_velocity;
use super::source::spawn_fluid_block;
use crate::fluid::particle::ParticleGroup;
use crate::fluid::simulation::ParticleSystemHandle;
use crate::physics::body::BodyHandle;
use crate::physics::world::PhysicsWorld;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum ClockState {
    #[default]
    Uninitialized,
    Running,
}

/// Presentation pose of the bar: pixels and radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Reflect)]
pub struct BarProxy {
    pub position: Vec2,
    pub angle: f32,
}

/// Handles of everything the session built.
#[derive(Clone, Debug)]
pub struct SceneHandles {
    pub enclosure: BodyHandle,
    pub bar: BodyHandle,
    pub vessel: Option<BodyHandle>,
    pub particles: ParticleSystemHandle,
    pub group: ParticleGroup,
}

/// Outcome of one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReport {
    /// Proxies retired by this tick.
    pub newly_retired: usize,
    /// Score after this tick.
    pub score: usize,
    /// Ticks completed so far, this one included.
    pub frame: u64,
}

/// One running sandbox: the scene handles, the proxy arena, and the score.
#[derive(Resource)]
pub struct Session {
    config: SandboxConfig,
    state: ClockState,
    handles: Option<SceneHandles>,
    proxies: ProxyArena,
    bar: BarProxy,
    score: usize,
    frame: u64,
}

impl Session {
    pub fn new(config: SandboxConfig) -> Self {
        Self {
            config,
            state: ClockState::Uninitialized,
            handles: None,
            proxies: ProxyArena::default(),
            bar: BarProxy::default(),
            score: 0,
            frame: 0,
        }
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn handles(&self) -> Option<&SceneHandles> {
        self.handles.as_ref()
    }

    pub fn proxies(&self) -> &ProxyArena {
        &self.proxies
    }

    pub fn bar(&self) -> BarProxy {
        self.bar
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Build the scene and bind its visuals.
    ///
    /// Fails without touching anything when the session already runs or
    /// the physics world is missing. Nothing after the first body can fail,
    /// so a failed call never leaves geometry behind.
    pub fn initialize(&mut self, world: Option<&mut PhysicsWorld>) -> Result<(), SceneError> {
        if self.is_running() {
            return Err(SceneError::AlreadyRunning);
        }
        let world = world.ok_or(SceneError::MissingDependency {
            primitive: "PhysicsWorld",
        })?;

        let config = &self.config;
        let scale = config.scale;

        let enclosure = build_enclosure(world, config.window_size, scale);
        let (particles, group) =
            spawn_fluid_block(world, &config.spawn_region(), &config.particle_system_def(), scale);
        let bar = build_interactive_bar(world, config.bar);
        let vessel = config
            .vessel
            .as_ref()
            .map(|vessel| build_vessel(world, vessel, scale));

        let proxies = ProxyArena::from_positions(world.particle_system(particles).positions(), scale);
        info!("Bound {} particle proxies", proxies.len());

        self.proxies = proxies;
        self.handles = Some(SceneHandles {
            enclosure,
            bar,
            vessel,
            particles,
            group,
        });
        self.sync_bar(world, bar);
        self.state = ClockState::Running;
        Ok(())
    }

    /// Advance one frame.
    ///
    /// `pointer` is the pointer position in pixels while it is held down.
    pub fn tick(&mut self, world: &mut PhysicsWorld, pointer: Option<Vec2>) -> Result<TickReport, SceneError> {
        let Some(handles) = self.handles.as_ref().filter(|_| self.is_running()) else {
            return Err(SceneError::NotRunning);
        };
        let (particles, bar) = (handles.particles, handles.bar);
        let config = &self.config;

        world.step(
            config.timestep,
            config.velocity_iterations,
            config.position_iterations,
        );

        let newly_retired = self.proxies.sync(
            world.particle_system(particles).position_buffer(),
            config.scale,
            config.window_size.x,
        )?;
        if newly_retired > 0 {
            debug!("Retired {} particles", newly_retired);
        }
        self.score += newly_retired;

        self.sync_bar(world, bar);

        if let Some(pointer) = pointer {
            update_bar_velocity(world, bar, pointer, self.config.scale);
        }

        self.frame += 1;
        Ok(TickReport {
            newly_retired,
            score: self.score,
            frame: self.frame,
        })
    }

    fn sync_bar(&mut self, world: &PhysicsWorld, bar: BodyHandle) {
        let body = world.body(bar);
        self.bar = BarProxy {
            position: self.config.scale.vec_to_presentation(body.position()),
            angle: body.angle(),
        };
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SandboxConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::binder::bind_visuals;
    use crate::sandbox::source::SpawnRegion;

    fn small_config() -> SandboxConfig {
        // A 0.2 x 0.2 m block resting in the middle of the window.
        SandboxConfig::rain()
            .with_fluid_region(SpawnRegion::new(Vec2::new(400.0, 300.0), Vec2::splat(10.0)))
    }

    #[test]
    fn test_tick_before_initialize_fails() {
        let mut world = PhysicsWorld::default();
        let mut session = Session::new(small_config());

        assert_eq!(session.tick(&mut world, None), Err(SceneError::NotRunning));
        assert_eq!(session.state(), ClockState::Uninitialized);
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_initialize_without_world() {
        let mut session = Session::new(small_config());

        assert_eq!(
            session.initialize(None),
            Err(SceneError::MissingDependency {
                primitive: "PhysicsWorld"
            })
        );
        assert!(!session.is_running());
        assert!(session.proxies().is_empty());
    }

    #[test]
    fn test_initialize_builds_scene() {
        let mut world = PhysicsWorld::default();
        let mut session = Session::new(small_config());

        session.initialize(Some(&mut world)).unwrap();

        let handles = session.handles().unwrap();
        assert!(session.is_running());
        assert_eq!(world.body(handles.enclosure).fixtures().count(), 3);
        assert!(world.body(handles.bar).is_dynamic());
        assert!(handles.vessel.is_none());
        assert_eq!(session.proxies().len(), handles.group.count);
        assert_eq!(session.bar().position, Vec2::new(250.0, 200.0));
        assert!((session.bar().angle - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_initialize_binds_every_particle() {
        let mut world = PhysicsWorld::default();
        let mut session = Session::new(small_config());
        session.initialize(Some(&mut world)).unwrap();

        let handles = session.handles().unwrap();
        let buffer = world.particle_system(handles.particles).position_buffer();
        let expected = bind_visuals(buffer, session.config().scale).unwrap();

        assert_eq!(
            session.proxies().iter().collect::<Vec<_>>(),
            expected.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_second_initialize_fails() {
        let mut world = PhysicsWorld::default();
        let mut session = Session::new(small_config());
        session.initialize(Some(&mut world)).unwrap();
        let bodies = world.body_count();

        assert_eq!(
            session.initialize(Some(&mut world)),
            Err(SceneError::AlreadyRunning)
        );
        assert_eq!(world.body_count(), bodies);
    }

    #[test]
    fn test_bowl_builds_vessel() {
        let mut world = PhysicsWorld::default();
        let mut session = Session::new(SandboxConfig::bowl());

        session.initialize(Some(&mut world)).unwrap();

        let vessel = session.handles().unwrap().vessel.unwrap();
        assert_eq!(world.body(vessel).fixtures().count(), 3);
    }

    #[test]
    fn test_tick_advances_frame_and_bar() {
        let mut world = PhysicsWorld::default();
        let mut session = Session::new(small_config());
        session.initialize(Some(&mut world)).unwrap();

        let report = session.tick(&mut world, None).unwrap();

        assert_eq!(report.frame, 1);
        assert_eq!(report.newly_retired, 0);
        assert_eq!(report.score, 0);
        // The bar is falling.
        assert!(session.bar().position.y > 200.0);
    }

    #[test]
    fn test_pointer_drives_bar() {
        let mut world = PhysicsWorld::default();
        let mut session = Session::new(small_config());
        session.initialize(Some(&mut world)).unwrap();
        let bar = session.handles().unwrap().bar;

        session.tick(&mut world, Some(Vec2::new(600.0, 100.0))).unwrap();

        let velocity = world.body(bar).linear_velocity();
        assert!(velocity.x > 0.0);
        assert!(velocity.y < 0.0);
    }
}
