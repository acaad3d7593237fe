//! Drawing the sandbox.
//!
//! Every particle proxy is mirrored by one flat-colored circle entity, the
//! bar by a rectangle, and the static bodies by one rectangle per fixture.
//! Entities are placed in Bevy's y-up, window-centered world from the y-down
//! presentation space.

use bevy::prelude::*;

use super::clock::Session;
use crate::physics::body::BodyHandle;
use crate::physics::world::PhysicsWorld;

const STATIC_Z: f32 = 0.0;
const PARTICLE_Z: f32 = 1.0;
const BAR_Z: f32 = 2.0;

/// Visual treatments, resolved to materials once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Reflect)]
pub enum VisualEffect {
    Water,
    Bar,
    Vessel,
    Wall,
}

impl VisualEffect {
    pub const ALL: [Self; 4] = [Self::Water, Self::Bar, Self::Vessel, Self::Wall];

    pub fn color(self) -> Color {
        match self {
            Self::Water => Color::srgb(0.12, 0.60, 1.0),
            Self::Bar => Color::srgb(0.85, 0.55, 0.25),
            Self::Vessel => Color::srgb(0.75, 0.75, 0.8),
            Self::Wall => Color::srgb(0.3, 0.3, 0.35),
        }
    }
}

/// Material of every [`VisualEffect`].
#[derive(Resource, Clone, Debug)]
pub struct EffectRegistry {
    materials: [Handle<ColorMaterial>; 4],
}

impl EffectRegistry {
    pub fn new(materials: &mut Assets<ColorMaterial>) -> Self {
        Self {
            materials: VisualEffect::ALL.map(|effect| materials.add(ColorMaterial::from_color(effect.color()))),
        }
    }

    pub fn material(&self, effect: VisualEffect) -> Handle<ColorMaterial> {
        self.materials[effect as usize].clone()
    }
}

/// Marker for a particle entity, with the proxy index it mirrors.
#[derive(Component, Clone, Copy, Debug, Reflect)]
#[reflect(Component)]
pub struct ParticleVisual {
    pub index: usize,
}

/// Marker for the bar entity.
#[derive(Component, Clone, Copy, Debug, Default, Reflect)]
#[reflect(Component)]
pub struct BarVisual;

/// Map a presentation-space point (pixels, y down, origin top-left) to the
/// 2D camera's world space (y up, origin at the window center).
pub fn to_screen(position: Vec2, window_size: Vec2) -> Vec2 {
    Vec2::new(position.x - 0.5 * window_size.x, 0.5 * window_size.y - position.y)
}

/// Rotation of a y-down angle in the y-up world.
pub fn to_screen_rotation(angle: f32) -> Quat {
    Quat::from_rotation_z(-angle)
}

pub(crate) fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Spawn the entities for a running session.
pub(crate) fn spawn_visuals(
    mut commands: Commands,
    session: Res<Session>,
    physics: Option<Res<PhysicsWorld>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let (Some(handles), Some(physics)) = (session.handles(), physics) else {
        warn!("Sandbox not initialized; nothing to draw");
        return;
    };

    let registry = EffectRegistry::new(&mut materials);
    let config = session.config();
    let scale = config.scale;
    let window = config.window_size;

    let radius = scale.to_presentation(config.particle_radius);
    let dot = meshes.add(Circle::new(radius));
    let water = registry.material(VisualEffect::Water);
    for (index, proxy) in session.proxies().iter().enumerate() {
        commands.spawn((
            Mesh2d(dot.clone()),
            MeshMaterial2d(water.clone()),
            Transform::from_translation(to_screen(proxy.position, window).extend(PARTICLE_Z)),
            ParticleVisual { index },
        ));
    }

    let bar = physics.body(handles.bar);
    let bar_size = bar
        .fixtures()
        .next()
        .map_or(Vec2::ZERO, |fixture| 2.0 * fixture.shape.half_extents);
    let bar_proxy = session.bar();
    commands.spawn((
        Mesh2d(meshes.add(Rectangle::from_size(scale.vec_to_presentation(bar_size)))),
        MeshMaterial2d(registry.material(VisualEffect::Bar)),
        Transform::from_translation(to_screen(bar_proxy.position, window).extend(BAR_Z))
            .with_rotation(to_screen_rotation(bar_proxy.angle)),
        BarVisual,
    ));

    let statics = std::iter::once((handles.enclosure, VisualEffect::Wall))
        .chain(handles.vessel.map(|vessel| (vessel, VisualEffect::Vessel)));
    for (body, effect) in statics {
        spawn_fixtures(&mut commands, &mut meshes, &physics, body, registry.material(effect), &session);
    }

    info!("Spawned {} particle visuals", session.proxies().len());
    commands.insert_resource(registry);
}

/// One rectangle per fixture of a static body.
fn spawn_fixtures(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    physics: &PhysicsWorld,
    handle: BodyHandle,
    material: Handle<ColorMaterial>,
    session: &Session,
) {
    let config = session.config();
    let body = physics.body(handle);

    for fixture in body.fixtures() {
        let shape = &fixture.shape;
        let center = config.scale.vec_to_presentation(body.world_point(shape.center));
        let size = config.scale.vec_to_presentation(2.0 * shape.half_extents);

        commands.spawn((
            Mesh2d(meshes.add(Rectangle::from_size(size))),
            MeshMaterial2d(material.clone()),
            Transform::from_translation(to_screen(center, config.window_size).extend(STATIC_Z))
                .with_rotation(to_screen_rotation(body.angle() + shape.angle)),
        ));
    }
}

/// Move particle entities to their proxies and hide retired ones.
pub(crate) fn sync_particle_visuals(
    session: Res<Session>,
    mut particles: Query<(&ParticleVisual, &mut Transform, &mut Visibility)>,
) {
    let window = session.config().window_size;
    let proxies = session.proxies();

    for (visual, mut transform, mut visibility) in &mut particles {
        let Some(proxy) = proxies.get(visual.index) else {
            continue;
        };

        let screen = to_screen(proxy.position, window);
        transform.translation.x = screen.x;
        transform.translation.y = screen.y;
        if proxy.retired {
            *visibility = Visibility::Hidden;
        }
    }
}

pub(crate) fn sync_bar_visual(session: Res<Session>, mut bars: Query<&mut Transform, With<BarVisual>>) {
    let bar = session.bar();
    let screen = to_screen(bar.position, session.config().window_size);

    for mut transform in &mut bars {
        transform.translation.x = screen.x;
        transform.translation.y = screen.y;
        transform.rotation = to_screen_rotation(bar.angle);
    }
}
