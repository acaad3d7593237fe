//! Index-aligned visual proxies for the particle buffer.
//!
//! The proxy arena mirrors the engine's position buffer one-to-one. Proxies
//! are never removed or reordered: a particle that leaves the window is
//! retired in place, parked at an off-screen sentinel, and skipped from then
//! on.

use bevy::prelude::*;

use super::error::SceneError;
use super::units::UnitScale;

/// Sentinel y coordinate of a retired proxy, in pixels.
pub const RETIRED_Y: f32 = 2000.0;

/// Proxies with y below this are active.
pub const ACTIVE_LIMIT_Y: f32 = 1000.0;

/// How far past a side edge a particle may go before it counts as escaped,
/// in pixels.
pub const ESCAPE_MARGIN: f32 = 1.0;

/// Whether a particle at presentation x has left a window `window_width`
/// pixels wide. The edges themselves are still inside.
#[inline]
pub fn escaped(x: f32, window_width: f32) -> bool {
    x < -ESCAPE_MARGIN || x > window_width + ESCAPE_MARGIN
}

/// Presentation-side stand-in of one particle.
#[derive(Clone, Copy, Debug, PartialEq, Reflect)]
pub struct VisualProxy {
    /// Position in pixels.
    pub position: Vec2,
    pub retired: bool,
}

impl VisualProxy {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            retired: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.retired
    }
}

/// Fixed-length arena of proxies addressed by particle index.
#[derive(Clone, Debug, Default)]
pub struct ProxyArena {
    proxies: Vec<VisualProxy>,
}

impl ProxyArena {
    /// One proxy per particle position, in order.
    pub fn from_positions(positions: &[[f32; 2]], scale: UnitScale) -> Self {
        let proxies = positions
            .iter()
            .map(|&xy| VisualProxy::new(scale.vec_to_presentation(Vec2::from(xy))))
            .collect();
        Self { proxies }
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&VisualProxy> {
        self.proxies.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VisualProxy> {
        self.proxies.iter()
    }

    pub fn active_count(&self) -> usize {
        self.proxies.iter().filter(|p| p.is_active()).count()
    }

    /// Park a proxy at the sentinel. Returns whether it was active before.
    pub fn retire(&mut self, index: usize) -> bool {
        let proxy = &mut self.proxies[index];
        if proxy.retired {
            return false;
        }
        proxy.retired = true;
        proxy.position.y = RETIRED_Y;
        true
    }

    /// Copy the buffer into every active proxy, retiring the ones that
    /// escaped sideways. Returns how many were retired by this call.
    pub fn sync(&mut self, buffer: &[f32], scale: UnitScale, window_width: f32) -> Result<usize, SceneError> {
        let positions = as_pairs(buffer)?;
        if positions.len() != self.proxies.len() {
            return Err(SceneError::IndexMismatch {
                buffer: positions.len(),
                proxies: self.proxies.len(),
            });
        }

        let mut retired = 0;
        for (index, &xy) in positions.iter().enumerate() {
            if self.proxies[index].retired {
                continue;
            }

            let position = scale.vec_to_presentation(Vec2::from(xy));
            if escaped(position.x, window_width) {
                self.retire(index);
                retired += 1;
            } else {
                self.proxies[index].position = position;
            }
        }

        Ok(retired)
    }
}

/// View an interleaved `x, y, ...` buffer as pairs.
fn as_pairs(buffer: &[f32]) -> Result<&[[f32; 2]], SceneError> {
    bytemuck::try_cast_slice(buffer).map_err(|_| SceneError::MalformedBuffer { len: buffer.len() })
}

/// Create one proxy per `(x, y)` pair of the position buffer, in order.
pub fn bind_visuals(buffer: &[f32], scale: UnitScale) -> Result<ProxyArena, SceneError> {
    Ok(ProxyArena::from_positions(as_pairs(buffer)?, scale))
}
