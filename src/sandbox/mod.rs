//! The interactive sandbox: scene construction and the sync loop.
//!
//! Everything here works in presentation space (pixels) at its edges and
//! hands the physics world meters, through [`units`].
//!
//! - [`units`]: pixel/meter conversion
//! - [`geometry`]: enclosure, bar, and vessel bodies
//! - [`source`]: the one-shot liquid block
//! - [`binder`]: the proxy arena mirroring the particle buffer
//! - [`interaction`]: pointer drag to bar velocity
//! - [`clock`]: the session and its per-tick operation
//! - [`config`]: scenario presets
//! - [`render`], [`plugin`]: Bevy integration

pub mod binder;
pub mod clock;
pub mod config;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod plugin;
pub mod render;
pub mod source;
pub mod units;

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::binder::{ProxyArena, VisualProxy};
    pub use super::clock::{ClockState, Session, TickReport};
    pub use super::config::SandboxConfig;
    pub use super::error::SceneError;
    pub use super::geometry::{BarPose, VesselConfig};
    pub use super::plugin::SandboxPlugin;
    pub use super::source::SpawnRegion;
    pub use super::units::{METER, UnitScale};
}
