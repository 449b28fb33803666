//! Core rendering engine.
//!
//! The [`Engine`] owns everything a running demonstration needs: the
//! configurator, the asset loader, the scene's renderables, the camera and
//! the renderer. A host calls [`Engine::tick`] and [`Engine::render_frame`]
//! once per display refresh and presents [`Engine::frame_buffer`].

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::assets::{Asset, AssetLibrary, AssetLoader, AssetSource, Completed};
use crate::camera::Camera;
use crate::colors::{self, Color};
use crate::config::AppConfig;
use crate::configurator::{
    AssetTarget, ConfigEvent, Configurator, DemoMode, Dirty, ObjectKind, SceneControls, Ticket,
};
use crate::illumination::{IlluminationParams, Term};
use crate::material::{MapKind, MaterialConfig};
use crate::math::{Mat4, Vec3};
use crate::mesh::{primitives, Mesh};
use crate::render::{DepthMode, DrawOptions, DrawTransforms, Renderer, ShadowMap};
use crate::shading::{MapBindings, ShadingContext, ShadingStrategy};
use crate::supersample::{jitter_matrix, Compositor};
use crate::texture::MipChain;
use crate::transform::Transform;

/// Pivot rotation per tick about X and Y while auto-rotate is on.
pub const AUTO_ROTATE_STEP: f32 = 0.005;

const OBJECT_RADIUS: f32 = 10.0;
const CUBE_SIZE: f32 = 15.0;
const KNOT_RADIUS: f32 = 6.0;
const KNOT_TUBE: f32 = 2.0;
const COMPARISON_RADIUS: f32 = 6.0;
const COMPARISON_SPACING: f32 = 16.0;
const GROUND_SIZE: f32 = 1000.0;
const DEPTH_PLANE_SIZE: f32 = 30.0;
const IMPORTED_SCALE: f32 = 120.0;
const IMPORTED_POSITION: Vec3 = Vec3::new(3.0, -11.5, 1.0);
const LIGHT_MARKER_RADIUS: f32 = 3.0;
const FLOOR_COLOR: u32 = 0x9F9F9F;
const FLOOR_HEIGHT: f32 = -15.0;
/// The light's 0x88 gray over the floor's own 0x9F.
const FLOOR_DIFFUSE: f32 = 136.0 / 159.0;

/// Which material a renderable is shaded with.
#[derive(Debug, Clone)]
enum MaterialRef {
    /// The configurator's material.
    Primary,
    /// The configurator's material under another strategy.
    Variant(ShadingStrategy),
    /// A material the user cannot edit.
    Fixed(MaterialConfig),
}

#[derive(Debug, Clone)]
struct Renderable {
    mesh: Arc<Mesh>,
    transform: Transform,
    material: MaterialRef,
    double_sided: bool,
    /// Follows the pivot's rotation.
    on_pivot: bool,
    casts_shadow: bool,
    receives_shadow: bool,
}

impl Renderable {
    fn new(mesh: Mesh, material: MaterialRef) -> Self {
        Self {
            mesh: Arc::new(mesh),
            transform: Transform::new(),
            material,
            double_sided: false,
            on_pivot: false,
            casts_shadow: false,
            receives_shadow: false,
        }
    }

    fn at(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }

    fn on_pivot(mut self) -> Self {
        self.on_pivot = true;
        self
    }

    fn casts_shadow(mut self) -> Self {
        self.casts_shadow = true;
        self
    }

    fn receives_shadow(mut self) -> Self {
        self.receives_shadow = true;
        self
    }
}

/// Model and normal matrices of `transform`, under the pivot when attached.
fn placement(transform: &Transform, on_pivot: bool, pivot: &Transform) -> (Mat4, Mat4) {
    if on_pivot {
        (
            pivot.to_matrix() * transform.to_matrix(),
            pivot.normal_matrix() * transform.normal_matrix(),
        )
    } else {
        (transform.to_matrix(), transform.normal_matrix())
    }
}

fn emissive(hex: u32) -> MaterialRef {
    MaterialRef::Fixed(MaterialConfig::emissive(IlluminationParams::emissive(
        Color::from_hex(hex),
    )))
}

/// Glows its own gray and brightens where the light reaches it.
fn floor_material() -> MaterialRef {
    let mut material = MaterialConfig::default();
    material.illumination = IlluminationParams::emissive(Color::from_hex(FLOOR_COLOR));
    material.illumination.set_fraction(Term::Diffuse, FLOOR_DIFFUSE);
    MaterialRef::Fixed(material)
}

pub struct Engine {
    configurator: Configurator,
    library: AssetLibrary,
    loader: AssetLoader,
    renderer: Renderer,
    compositor: Compositor,
    camera: Camera,
    pivot: Transform,
    renderables: Vec<Renderable>,
    light_marker: Renderable,
    shadow_map: ShadowMap,
    bindings: MapBindings,
    visible_mips: MipChain,
    imported: Option<Arc<Mesh>>,
    depth_far: f32,
    generation: u64,
}

impl Engine {
    pub fn new(width: u32, height: u32, config: &AppConfig, mode: DemoMode) -> Self {
        let configurator = Configurator::new(mode);
        let camera = Camera::new(
            configurator.scene().camera_position,
            width as f32 / height.max(1) as f32,
        );
        let light_marker = Renderable::new(
            primitives::sphere(LIGHT_MARKER_RADIUS, 32, 16),
            emissive(0xFFF000),
        );

        let mut engine = Self {
            configurator,
            library: AssetLibrary::from_config(config),
            loader: AssetLoader::new(),
            renderer: Renderer::new(width, height),
            compositor: Compositor::new(),
            camera,
            pivot: Transform::new(),
            renderables: Vec::new(),
            light_marker,
            shadow_map: ShadowMap::new(config.shadow_map_size),
            bindings: MapBindings::default(),
            visible_mips: MipChain::visible(),
            imported: None,
            depth_far: config.depth_far,
            generation: 0,
        };

        if let Some(path) = &config.obj_path {
            engine.request_global(AssetTarget::ImportedMesh, AssetSource::Obj(path.clone()));
        }
        if let Some(paths) = &config.visible_mips {
            engine.request_global(AssetTarget::VisibleMips, AssetSource::MipLevels(paths.clone()));
        }
        engine
    }

    pub fn configurator(&self) -> &Configurator {
        &self.configurator
    }

    pub fn mode(&self) -> DemoMode {
        self.configurator.mode()
    }

    /// Queue a configuration change; it takes effect on the next tick.
    pub fn apply(&mut self, event: ConfigEvent) {
        self.configurator.apply(event);
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn pivot(&self) -> &Transform {
        &self.pivot
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Library names selectable for a map slot.
    pub fn map_names(&self, kind: MapKind) -> Vec<String> {
        self.library.names(kind)
    }

    /// The light's view of the shadow casters, as of the last frame.
    pub fn shadow_map(&self) -> &ShadowMap {
        &self.shadow_map
    }

    pub fn width(&self) -> u32 {
        self.renderer.width()
    }

    pub fn height(&self) -> u32 {
        self.renderer.height()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
        self.camera.set_aspect(width as f32 / height.max(1) as f32);
    }

    /// Returns the rendered frame as bytes (ARGB8888 format)
    pub fn frame_buffer(&self) -> &[u8] {
        self.renderer.as_bytes()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        self.renderer.pixel(x, y)
    }

    /// Assets requested but not yet installed.
    pub fn loads_in_flight(&self) -> usize {
        self.loader.in_flight()
    }

    /// Advance one frame: install finished loads, send new requests, react
    /// to configuration changes and animate the pivot.
    pub fn tick(&mut self) {
        let mut rebuild = false;
        let mut rebind = false;
        for done in self.loader.poll() {
            let (scene, maps) = self.complete(done);
            rebuild |= scene;
            rebind |= maps;
        }
        self.dispatch_requests();

        let dirty = self.configurator.take_dirty();
        if self.configurator.generation() != self.generation {
            self.generation = self.configurator.generation();
            self.pivot = Transform::new();
        }
        if dirty.contains(Dirty::CAMERA) {
            self.camera.set_position(self.configurator.scene().camera_position);
        }
        if rebuild || dirty.contains(Dirty::SCENE) {
            self.rebuild_scene();
        }
        if rebind || dirty.intersects(Dirty::MATERIAL | Dirty::SAMPLING) {
            self.bindings = MapBindings::bind(
                self.configurator.material(),
                self.configurator.sampling(),
                &self.visible_mips,
            );
            debug!("re-bound maps with {:?}", self.configurator.sampling());
        }

        let scene = self.configurator.scene();
        if scene.auto_rotate {
            self.pivot.rotate_x(AUTO_ROTATE_STEP).rotate_y(AUTO_ROTATE_STEP);
        }
        if self.configurator.mode() == DemoMode::DepthConflict {
            self.pivot.set_rotation_x(scene.depth_rotation());
        }
        self.renderer.set_depth_mode(if scene.log_depth {
            DepthMode::Logarithmic {
                far: self.depth_far,
            }
        } else {
            DepthMode::Standard
        });
    }

    /// Block until every requested asset has arrived, or until no load
    /// finishes within `timeout`. Used by offscreen rendering.
    pub fn finish_loading(&mut self, timeout: Duration) {
        loop {
            self.dispatch_requests();
            if self.loader.in_flight() == 0 {
                break;
            }
            let Some(done) = self.loader.wait(timeout) else {
                warn!("gave up waiting for {} asset loads", self.loader.in_flight());
                break;
            };
            let (scene, maps) = self.complete(done);
            if scene {
                self.rebuild_scene();
            }
            if maps {
                self.bindings = MapBindings::bind(
                    self.configurator.material(),
                    self.configurator.sampling(),
                    &self.visible_mips,
                );
            }
        }
    }

    /// Render the current state into the color buffer, supersampled when the
    /// sample level is above 0.
    pub fn render_frame(&mut self) {
        if self.renderables.iter().any(|r| r.receives_shadow) {
            let pivot = self.pivot;
            let casters = self
                .renderables
                .iter()
                .filter(|r| r.casts_shadow)
                .map(|r| (r.mesh.as_ref(), placement(&r.transform, r.on_pivot, &pivot).0));
            self.shadow_map
                .render(self.configurator.scene().light_position, casters);
        }

        let level = self.configurator.sampling().supersampling;
        let view_projection = self.camera.view_projection();
        let frame = Frame {
            configurator: &self.configurator,
            bindings: &self.bindings,
            renderables: &self.renderables,
            light_marker: &self.light_marker,
            shadow_map: &self.shadow_map,
            pivot: &self.pivot,
            camera_position: self.camera.position(),
        };
        self.compositor.render(&mut self.renderer, level, |renderer, offset| {
            let jitter = jitter_matrix(offset, renderer.width(), renderer.height());
            frame.draw(renderer, jitter * view_projection);
        });
    }

    fn request_global(&mut self, target: AssetTarget, source: AssetSource) {
        let ticket = Ticket {
            generation: 0,
            request: 0,
            target,
        };
        if let Err(e) = self.loader.request(ticket, source) {
            warn!("could not request {:?}: {}", target, e);
        }
    }

    fn dispatch_requests(&mut self) {
        for request in self.configurator.take_requests() {
            let AssetTarget::Map(kind) = request.ticket.target else {
                continue;
            };
            let Some(source) = self.library.resolve(kind, &request.name) else {
                warn!("no {:?} map named '{}'", kind, request.name);
                self.configurator.fail(request.ticket);
                continue;
            };
            if let Err(e) = self.loader.request(request.ticket, source) {
                warn!("could not request '{}': {}", request.name, e);
                self.configurator.fail(request.ticket);
            }
        }
    }

    /// Handle one finished load. Returns whether the scene has to be rebuilt
    /// and whether the maps have to be re-bound.
    fn complete(&mut self, done: Completed) -> (bool, bool) {
        let Completed { ticket, result } = done;
        let asset = match result {
            Ok(asset) => asset,
            Err(e) => {
                warn!("failed to load {:?}: {}", ticket.target, e);
                self.configurator.fail(ticket);
                return (false, false);
            }
        };

        match (ticket.target, asset) {
            (AssetTarget::Map(kind), Asset::Image(image)) => {
                if self.configurator.install_image(ticket, Arc::new(image)) {
                    info!("installed {:?} map", kind);
                } else {
                    warn!("discarding stale {:?} map", kind);
                }
                (false, false)
            }
            (AssetTarget::Map(_), Asset::Environment(env)) => {
                if self.configurator.install_environment(ticket, Arc::new(env)) {
                    info!("installed environment map");
                } else {
                    warn!("discarding stale environment map");
                }
                (false, false)
            }
            (AssetTarget::ImportedMesh, Asset::Mesh(mesh)) => {
                info!(
                    "imported mesh '{}' with {} triangles",
                    mesh.name(),
                    mesh.triangle_count()
                );
                self.imported = Some(Arc::new(mesh));
                (self.configurator.scene().object == ObjectKind::Imported, false)
            }
            (AssetTarget::VisibleMips, Asset::Mips(chain)) => {
                info!("loaded visible mip chain with {} levels", chain.len());
                self.visible_mips = chain;
                (false, true)
            }
            (target, _) => {
                warn!("asset does not fit {:?}", target);
                self.configurator.fail(ticket);
                (false, false)
            }
        }
    }

    fn rebuild_scene(&mut self) {
        let mode = self.configurator.mode();
        let scene = *self.configurator.scene();
        let res = scene.resolution();
        self.renderables.clear();

        match mode {
            DemoMode::Illumination | DemoMode::Mapping => {
                let object = self.object(&scene);
                self.renderables.push(object);
            }
            DemoMode::ShadingComparison => {
                let sphere = Arc::new(primitives::sphere(COMPARISON_RADIUS, res, res / 2));
                for (x, strategy) in [
                    (-COMPARISON_SPACING, ShadingStrategy::Flat),
                    (0.0, ShadingStrategy::Gouraud),
                    (COMPARISON_SPACING, ShadingStrategy::Phong),
                ] {
                    self.renderables.push(Renderable {
                        mesh: Arc::clone(&sphere),
                        transform: Transform::new().with_position(Vec3::new(x, 0.0, 0.0)),
                        material: MaterialRef::Variant(strategy),
                        double_sided: false,
                        on_pivot: false,
                        casts_shadow: false,
                        receives_shadow: false,
                    });
                }
            }
            DemoMode::Aliasing => {
                let mut ground = primitives::plane(GROUND_SIZE, GROUND_SIZE, 1, 1);
                ground.compute_tangents();
                self.renderables.push(
                    Renderable::new(ground, MaterialRef::Primary)
                        .at(Transform::new()
                            .with_position(Vec3::new(0.0, -0.5, 0.0))
                            .with_rotation(Vec3::new(-FRAC_PI_2, 0.0, 0.0)))
                        .double_sided()
                        .on_pivot(),
                );
            }
            DemoMode::DepthConflict => {
                let plane = || primitives::plane(DEPTH_PLANE_SIZE, DEPTH_PLANE_SIZE, res, res);
                self.renderables.push(
                    Renderable::new(plane(), emissive(0xFF0000))
                        .at(Transform::new().with_rotation(Vec3::new(0.0, 0.0, FRAC_PI_4)))
                        .double_sided(),
                );
                self.renderables.push(
                    Renderable::new(plane(), emissive(0x0000FF))
                        .double_sided()
                        .on_pivot(),
                );
            }
            DemoMode::Combined => {
                let object = self.object(&scene).casts_shadow();
                self.renderables.push(object);
                // Faces up, toward the light
                self.renderables.push(
                    Renderable::new(primitives::plane(GROUND_SIZE, GROUND_SIZE, 1, 1), floor_material())
                        .at(Transform::new()
                            .with_position(Vec3::new(0.0, FLOOR_HEIGHT, 0.0))
                            .with_rotation(Vec3::new(-FRAC_PI_2, 0.0, 0.0)))
                        .double_sided()
                        .receives_shadow(),
                );
            }
        }
        debug!(
            "rebuilt {} scene: {} renderables at resolution {}",
            mode,
            self.renderables.len(),
            res
        );
    }

    /// The user-selectable object of the single-object modes.
    fn object(&self, scene: &SceneControls) -> Renderable {
        let res = scene.resolution();
        match (scene.object, &self.imported) {
            (ObjectKind::Imported, Some(mesh)) => Renderable {
                mesh: Arc::clone(mesh),
                transform: Transform::new()
                    .with_position(IMPORTED_POSITION)
                    .with_uniform_scale(IMPORTED_SCALE),
                material: MaterialRef::Primary,
                double_sided: false,
                on_pivot: true,
                casts_shadow: false,
                receives_shadow: false,
            },
            (ObjectKind::Cube, _) => {
                let segments = (res / 6).max(1);
                let mut cube = primitives::cuboid(CUBE_SIZE, CUBE_SIZE, CUBE_SIZE, [segments; 3]);
                cube.compute_tangents();
                Renderable::new(cube, MaterialRef::Primary).on_pivot()
            }
            (ObjectKind::TorusKnot, _) => {
                let mut knot = primitives::torus_knot(
                    KNOT_RADIUS,
                    KNOT_TUBE,
                    res.max(3),
                    (res / 4).max(2),
                    2,
                    3,
                );
                knot.compute_tangents();
                Renderable::new(knot, MaterialRef::Primary).on_pivot()
            }
            (ObjectKind::Imported, None) | (ObjectKind::Sphere, _) => {
                if scene.object == ObjectKind::Imported {
                    warn!("no imported mesh loaded, showing the sphere");
                }
                let mut sphere = primitives::sphere(OBJECT_RADIUS, res, res / 2);
                sphere.compute_tangents();
                Renderable::new(sphere, MaterialRef::Primary).on_pivot()
            }
        }
    }
}

/// Everything one pass reads, borrowed from the engine.
struct Frame<'a> {
    configurator: &'a Configurator,
    bindings: &'a MapBindings,
    renderables: &'a [Renderable],
    light_marker: &'a Renderable,
    shadow_map: &'a ShadowMap,
    pivot: &'a Transform,
    camera_position: Vec3,
}

impl Frame<'_> {
    fn draw(&self, renderer: &mut Renderer, view_projection: Mat4) {
        let primary = self.configurator.material();
        let background = if self.configurator.mode() == DemoMode::Aliasing {
            colors::ALIASING_BACKGROUND
        } else {
            colors::BACKGROUND
        };
        renderer.clear(background);
        renderer.clear_depth();
        if let Some(env) = primary.environment_map.ready() {
            renderer.draw_skybox(env, &view_projection);
        }

        for renderable in self.renderables.iter().chain(Some(self.light_marker)) {
            self.draw_renderable(renderer, renderable, view_projection);
        }
    }

    fn draw_renderable(&self, renderer: &mut Renderer, renderable: &Renderable, view_projection: Mat4) {
        let primary = self.configurator.material();
        let scene = self.configurator.scene();

        let (mut material, editable) = match &renderable.material {
            MaterialRef::Primary => (primary.clone(), true),
            MaterialRef::Variant(strategy) => (primary.variant(*strategy), true),
            MaterialRef::Fixed(material) => {
                let mut material = material.clone();
                material.illumination.light_position = scene.light_position;
                (material, false)
            }
        };
        material.set_object_scale(renderable.transform.scale().x);

        let mut transform = renderable.transform;
        if std::ptr::eq(renderable, self.light_marker) {
            transform = transform.with_position(scene.light_position);
        }
        let (model, normal_matrix) = placement(&transform, renderable.on_pivot, self.pivot);

        let mut maps = if editable {
            self.bindings.resolve(&material)
        } else {
            Default::default()
        };
        if renderable.receives_shadow {
            maps.shadow = Some(self.shadow_map);
        }
        let ctx = ShadingContext {
            material: &material,
            maps,
            camera_position: self.camera_position,
            uv_source: renderable.mesh.uv_source(),
            has_tangents: renderable.mesh.has_tangents(),
        };
        let transforms = DrawTransforms {
            model,
            normal_matrix,
            view_projection,
        };
        let options = DrawOptions {
            double_sided: renderable.double_sided,
            wireframe: editable && scene.wireframe,
        };
        renderer.draw_mesh(&renderable.mesh, ctx, &transforms, options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::illumination::{default_base_color, evaluate, DEFAULT_LIGHT_POSITION};
    use crate::material::Flag;
    use crate::supersample::SampleLevel;

    const WAIT: Duration = Duration::from_secs(30);

    fn engine(mode: DemoMode) -> Engine {
        let mut engine = Engine::new(64, 64, &AppConfig::default(), mode);
        engine.tick();
        engine
    }

    fn channels(argb: u32) -> [i32; 3] {
        [
            ((argb >> 16) & 0xFF) as i32,
            ((argb >> 8) & 0xFF) as i32,
            (argb & 0xFF) as i32,
        ]
    }

    #[test]
    fn sphere_center_matches_the_evaluator() {
        let mut engine = engine(DemoMode::Illumination);
        engine.render_frame();

        // The sphere front faces the camera at (0, 0, 10)
        let camera = Vec3::new(0.0, 0.0, 25.0);
        let p = Vec3::new(0.0, 0.0, 10.0);
        let i = evaluate(p, Vec3::Z, camera, DEFAULT_LIGHT_POSITION, 50.0);
        let expected = IlluminationParams::default()
            .compose(default_base_color(), i)
            .to_argb();

        let got = channels(engine.pixel(32, 32).unwrap());
        for (g, e) in got.iter().zip(channels(expected)) {
            assert!((g - e).abs() <= 4, "got {:?}, expected {:?}", got, channels(expected));
        }
        assert_eq!(engine.pixel(0, 0), Some(colors::BACKGROUND));
    }

    #[test]
    fn combined_floor_receives_the_object_shadow() {
        let mut engine = engine(DemoMode::Combined);
        engine.render_frame();

        // The cube's shadow from the light at (80, 40, 50) centers here
        let map = engine.shadow_map();
        assert_eq!(map.light(), DEFAULT_LIGHT_POSITION);
        assert_eq!(map.visibility(Vec3::new(-30.0, FLOOR_HEIGHT, -18.75)), 0.0);
        assert_eq!(map.visibility(Vec3::new(60.0, FLOOR_HEIGHT, 40.0)), 1.0);

        // On screen: the shadowed floor keeps only its own gray, the lit
        // side is brighter
        let shadowed = channels(engine.pixel(3, 46).unwrap());
        for c in shadowed {
            assert!((c - 0x9F).abs() <= 1, "shadowed floor {:?}", shadowed);
        }
        let lit = channels(engine.pixel(60, 46).unwrap());
        for c in lit {
            assert!(c > 0x9F + 20, "lit floor {:?}", lit);
        }
    }

    #[test]
    fn modes_without_receivers_skip_the_shadow_pass() {
        let mut engine = engine(DemoMode::Illumination);
        engine.render_frame();
        assert_eq!(engine.shadow_map().visibility(Vec3::new(0.0, -15.0, 0.0)), 1.0);
        assert_eq!(engine.shadow_map().light(), Vec3::ZERO);
    }

    #[test]
    fn torus_knot_leaves_its_hole_open() {
        let mut engine = engine(DemoMode::Illumination);
        engine.apply(ConfigEvent::SetObject(ObjectKind::TorusKnot));
        engine.tick();
        engine.render_frame();
        assert_eq!(engine.pixel(32, 32), Some(colors::BACKGROUND));
        // Inner and outer loops of the knot along +X
        assert_ne!(engine.pixel(37, 32), Some(colors::BACKGROUND));
        assert_ne!(engine.pixel(47, 32), Some(colors::BACKGROUND));
    }

    #[test]
    fn comparison_draws_three_spheres() {
        let mut engine = engine(DemoMode::ShadingComparison);
        engine.render_frame();
        // Flat, Gouraud and Phong left to right across the middle row
        for x in [10, 32, 53] {
            assert_ne!(engine.pixel(x, 32), Some(colors::BACKGROUND), "x = {}", x);
        }
    }

    #[test]
    fn auto_rotate_turns_the_pivot_each_tick() {
        let mut engine = engine(DemoMode::Illumination);
        engine.apply(ConfigEvent::SetAutoRotate(true));
        engine.tick();
        engine.tick();
        assert_eq!(engine.pivot().rotation().x, 2.0 * AUTO_ROTATE_STEP);
        assert_eq!(engine.pivot().rotation().y, 2.0 * AUTO_ROTATE_STEP);

        engine.apply(ConfigEvent::Reset);
        engine.tick();
        assert_eq!(engine.pivot().rotation(), Vec3::ZERO);
    }

    #[test]
    fn depth_conflict_follows_its_controls() {
        let mut engine = engine(DemoMode::DepthConflict);
        engine.apply(ConfigEvent::SetDepthRotation(0.0005));
        engine.apply(ConfigEvent::SetLogDepth(true));
        engine.tick();
        assert_eq!(engine.pivot().rotation().x, 0.0005);
        assert_eq!(
            engine.renderer().depth_mode(),
            DepthMode::Logarithmic { far: 1000.0 }
        );
        engine.render_frame();
        assert_ne!(engine.pixel(32, 32), Some(colors::BACKGROUND));
    }

    #[test]
    fn aliasing_texture_arrives_asynchronously() {
        let mut engine = engine(DemoMode::Aliasing);
        assert!(engine.configurator().material().texture_map.is_pending());
        engine.finish_loading(WAIT);
        assert!(engine.configurator().material().texture_map.ready().is_some());

        engine.tick();
        engine.render_frame();
        // Sky above the horizon stays the aliasing blue
        assert_eq!(engine.pixel(32, 2), Some(colors::ALIASING_BACKGROUND));
    }

    #[test]
    fn mirror_with_environment_shows_the_environment() {
        let mut engine = engine(DemoMode::Mapping);
        engine.apply(ConfigEvent::AssignMap(MapKind::Environment, Some("sky".into())));
        engine.apply(ConfigEvent::SetFlag(Flag::Mirror, true));
        engine.tick();
        engine.finish_loading(WAIT);
        engine.tick();
        engine.render_frame();
        // Skybox behind, mirror in front: neither is the flat background
        assert_ne!(engine.pixel(0, 0), Some(colors::BACKGROUND));
        assert_ne!(engine.pixel(32, 32), Some(colors::BACKGROUND));
    }

    #[test]
    fn supersampling_keeps_flat_regions_exact() {
        let mut engine = engine(DemoMode::Illumination);
        engine.apply(ConfigEvent::SetSupersampling(SampleLevel::new(2)));
        engine.tick();
        engine.render_frame();
        assert_eq!(engine.pixel(0, 0), Some(colors::BACKGROUND));
        assert_ne!(engine.pixel(32, 32), Some(colors::BACKGROUND));
    }

    #[test]
    fn unknown_map_names_fall_back_to_empty() {
        let mut engine = engine(DemoMode::Mapping);
        engine.apply(ConfigEvent::SelectMap(MapKind::Texture, Some("earth".into())));
        engine.tick();
        assert!(engine.configurator().material().texture_map.is_empty());
        assert_eq!(engine.loads_in_flight(), 0);
    }
}
