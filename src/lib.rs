//! Rainmaker - an interactive 2D fluid sandbox for Bevy
//!
//! Water pours into a window-sized enclosure, a leaning bar tips over into
//! it, and the player drags the bar to push the water around. Particles that
//! slosh out over the side walls are retired and scored.
//!
//! # Features
//!
//! - **PBF Liquid**: Position Based Fluids particles with pair damping and viscosity
//! - **Rigid Bodies**: Static and dynamic box bodies stepped by rapier
//! - **Two-Way Coupling**: Liquid pushes the bar, the bar pushes the liquid
//! - **Scenarios**: Rain (open enclosure) and bowl (with a catch vessel)
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bevy::prelude::*;
//! use rainmaker::prelude::*;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(SandboxPlugin::new(SandboxConfig::rain()))
//!         .run();
//! }
//! ```
//!
//! # Architecture
//!
//! - [`sandbox`]: Scene construction, proxy synchronization, scoring, Bevy plugin
//! - [`physics`]: Rigid bodies and the [`PhysicsWorld`](physics::PhysicsWorld) resource
//! - [`fluid`]: The particle fluid stepped by the world

pub mod fluid;
pub mod physics;
pub mod sandbox;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::fluid::prelude::*;
    pub use crate::physics::prelude::*;
    pub use crate::sandbox::prelude::*;
}
