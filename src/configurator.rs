//! Demonstration modes and the live configuration they start from.
//!
//! The [`Configurator`] owns the material, the sampling state and the scene
//! controls. Every UI-originated change arrives as one [`ConfigEvent`] and
//! is applied between frames; the renderer reads the dirty flags to learn
//! what has to be re-bound or rebuilt before the next frame.

use std::collections::HashMap;
use std::sync::Arc;

use bitflags::bitflags;
use log::{debug, info};

use crate::colors::Color;
use crate::illumination::{Term, DEFAULT_LIGHT_POSITION};
use crate::material::{Flag, MapKind, MaterialConfig};
use crate::math::Vec3;
use crate::shading::ShadingStrategy;
use crate::supersample::SampleLevel;
use crate::texture::{EnvironmentMap, FilterMode, MipMode, SamplingState, Texture};

pub const DEFAULT_CAMERA_POSITION: Vec3 = Vec3::new(0.0, 0.0, 25.0);
pub const DEFAULT_RESOLUTION: u32 = 96;
pub const MAX_RESOLUTION: u32 = 400;
/// Upper bound of the depth-conflict tilt, in radians.
pub const MAX_DEPTH_ROTATION: f32 = 0.001;

/// Built-in image used by the aliasing mode: level 0 of the visible chain.
pub const ALIASING_TEXTURE: &str = "checker";
const ALIASING_TILING: f32 = 800.0;

/// The six demonstrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DemoMode {
    #[default]
    Illumination,
    ShadingComparison,
    Mapping,
    Aliasing,
    DepthConflict,
    Combined,
}

impl DemoMode {
    pub const ALL: [DemoMode; 6] = [
        DemoMode::Illumination,
        DemoMode::ShadingComparison,
        DemoMode::Mapping,
        DemoMode::Aliasing,
        DemoMode::DepthConflict,
        DemoMode::Combined,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            DemoMode::Illumination => "illumination",
            DemoMode::ShadingComparison => "shading",
            DemoMode::Mapping => "mapping",
            DemoMode::Aliasing => "aliasing",
            DemoMode::DepthConflict => "depth-conflict",
            DemoMode::Combined => "combined",
        }
    }

    /// Look a mode up by name or by index.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Ok(index) = input.parse::<usize>() {
            return Self::from_index(index);
        }
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(input))
    }

    /// Control groups this mode exposes.
    pub fn controls(self) -> ControlGroups {
        match self {
            DemoMode::Illumination => ControlGroups::PHONG | ControlGroups::GENERAL,
            DemoMode::ShadingComparison => ControlGroups::GENERAL,
            DemoMode::Mapping => ControlGroups::MAPPING | ControlGroups::GENERAL,
            DemoMode::Aliasing => ControlGroups::ALIASING,
            DemoMode::DepthConflict => ControlGroups::DEPTH_CONFLICT,
            DemoMode::Combined => {
                ControlGroups::PHONG
                    | ControlGroups::SHADING
                    | ControlGroups::MAPPING
                    | ControlGroups::GENERAL
            }
        }
    }
}

impl std::fmt::Display for DemoMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Groups of user controls shown for a mode.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ControlGroups: u8 {
        const PHONG = 1 << 0;
        const SHADING = 1 << 1;
        const MAPPING = 1 << 2;
        const ALIASING = 1 << 3;
        const DEPTH_CONFLICT = 1 << 4;
        const GENERAL = 1 << 5;
    }
}

bitflags! {
    /// What changed since the renderer last looked.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Dirty: u8 {
        /// Material fields or map slots.
        const MATERIAL = 1 << 0;
        /// Filter or mip selection.
        const SAMPLING = 1 << 1;
        /// Object kind, resolution or mode layout.
        const SCENE = 1 << 2;
        /// Camera placement.
        const CAMERA = 1 << 3;
    }
}

/// Which mesh the single-object modes show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectKind {
    #[default]
    Sphere,
    Cube,
    /// A (2, 3) torus knot.
    TorusKnot,
    /// Mesh imported from an OBJ file; falls back to the sphere until loaded.
    Imported,
}

impl ObjectKind {
    pub const COUNT: i64 = 4;

    /// 0 = sphere, 1 = cube, 2 = torus knot, 3 or more = imported.
    pub fn from_selector(selector: i64) -> Self {
        match selector {
            i64::MIN..=0 => ObjectKind::Sphere,
            1 => ObjectKind::Cube,
            2 => ObjectKind::TorusKnot,
            _ => ObjectKind::Imported,
        }
    }

    pub fn selector(self) -> i64 {
        match self {
            ObjectKind::Sphere => 0,
            ObjectKind::Cube => 1,
            ObjectKind::TorusKnot => 2,
            ObjectKind::Imported => 3,
        }
    }
}

/// Scene-level controls that are not part of the material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneControls {
    pub light_position: Vec3,
    pub camera_position: Vec3,
    pub object: ObjectKind,
    resolution: u32,
    pub auto_rotate: bool,
    pub wireframe: bool,
    depth_rotation: f32,
    pub log_depth: bool,
}

impl Default for SceneControls {
    fn default() -> Self {
        Self {
            light_position: DEFAULT_LIGHT_POSITION,
            camera_position: DEFAULT_CAMERA_POSITION,
            object: ObjectKind::Sphere,
            resolution: DEFAULT_RESOLUTION,
            auto_rotate: false,
            wireframe: false,
            depth_rotation: 0.0,
            log_depth: false,
        }
    }
}

impl SceneControls {
    /// Geometric resolution, 1 to 400.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn set_resolution(&mut self, resolution: i64) {
        self.resolution = resolution.clamp(1, MAX_RESOLUTION as i64) as u32;
    }

    /// Tilt of the depth-conflict plane about X, 0 to 0.001 rad.
    pub fn depth_rotation(&self) -> f32 {
        self.depth_rotation
    }

    pub fn set_depth_rotation(&mut self, angle: f32) {
        self.depth_rotation = if angle.is_nan() {
            0.0
        } else {
            angle.clamp(0.0, MAX_DEPTH_ROTATION)
        };
    }
}

/// What a finished load is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetTarget {
    Map(MapKind),
    ImportedMesh,
    VisibleMips,
}

/// Identifies one load request so late results can be matched or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub generation: u64,
    pub request: u64,
    pub target: AssetTarget,
}

/// A map the configurator wants loaded, by library name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapRequest {
    pub ticket: Ticket,
    pub name: String,
}

/// Every mutation the UI can make.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigEvent {
    SwitchMode(DemoMode),
    Reset,
    SetColor(Color),
    SetFraction(Term, f32),
    SetTermEnabled(Term, bool),
    SetExponent(f32),
    SetStrategy(i64),
    SetFlag(Flag, bool),
    /// Put a library asset into a slot without touching its enable flag.
    /// `None` empties the slot.
    AssignMap(MapKind, Option<String>),
    /// Assign a map and switch its effect on when one was chosen, off when
    /// the slot was cleared.
    SelectMap(MapKind, Option<String>),
    CopyMap { from: MapKind, to: MapKind },
    SetTiling(f32),
    SetMagnification(FilterMode),
    SetMinification(FilterMode),
    SetMipMode(MipMode),
    SetSupersampling(SampleLevel),
    SetLightPosition(Vec3),
    SetCameraPosition(Vec3),
    SetObject(ObjectKind),
    SetResolution(i64),
    SetAutoRotate(bool),
    SetWireframe(bool),
    SetDepthRotation(f32),
    SetLogDepth(bool),
}

/// Owns the live configuration of the running demonstration.
#[derive(Debug)]
pub struct Configurator {
    mode: DemoMode,
    material: MaterialConfig,
    sampling: SamplingState,
    scene: SceneControls,
    dirty: Dirty,
    generation: u64,
    next_request: u64,
    awaiting: HashMap<MapKind, u64>,
    requests: Vec<MapRequest>,
}

impl Configurator {
    pub fn new(mode: DemoMode) -> Self {
        let mut configurator = Self {
            mode,
            material: MaterialConfig::default(),
            sampling: SamplingState::default(),
            scene: SceneControls::default(),
            dirty: Dirty::all(),
            generation: 0,
            next_request: 0,
            awaiting: HashMap::new(),
            requests: Vec::new(),
        };
        configurator.configure_for_mode(mode);
        configurator
    }

    pub fn mode(&self) -> DemoMode {
        self.mode
    }

    pub fn material(&self) -> &MaterialConfig {
        &self.material
    }

    pub fn sampling(&self) -> &SamplingState {
        &self.sampling
    }

    pub fn scene(&self) -> &SceneControls {
        &self.scene
    }

    pub fn controls(&self) -> ControlGroups {
        self.mode.controls()
    }

    /// Bumped by every mode switch and reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn dirty(&self) -> Dirty {
        self.dirty
    }

    /// Return and clear the dirty flags.
    pub fn take_dirty(&mut self) -> Dirty {
        std::mem::take(&mut self.dirty)
    }

    /// Loads requested since the last call.
    pub fn take_requests(&mut self) -> Vec<MapRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Restore every default, then apply the current mode's setup.
    pub fn reset(&mut self) {
        info!("resetting {} scene", self.mode);
        self.configure_for_mode(self.mode);
    }

    /// Discard the current configuration and build the defaults of `mode`.
    pub fn configure_for_mode(&mut self, mode: DemoMode) {
        self.mode = mode;
        self.generation += 1;
        self.awaiting.clear();
        self.requests.clear();

        self.material = MaterialConfig::default();
        self.sampling = SamplingState::default();
        self.scene = SceneControls::default();

        match mode {
            DemoMode::Illumination | DemoMode::Mapping => {}
            DemoMode::ShadingComparison => {
                self.scene.set_resolution(20);
                self.scene.light_position = Vec3::new(30.0, 20.0, 30.0);
                self.scene.camera_position = Vec3::new(0.0, 0.0, 31.0);
            }
            DemoMode::Aliasing => {
                self.scene.light_position = Vec3::new(0.0, 0.0, 10_000.0);
                self.scene.camera_position = Vec3::new(0.0, 0.0, 0.1);
                let ill = &mut self.material.illumination;
                ill.set_fraction(Term::Ambient, 1.0);
                ill.set_fraction(Term::Diffuse, 0.0);
                ill.set_fraction(Term::Specular, 0.0);
                self.material.use_texture = true;
                self.material.set_tiling(ALIASING_TILING);
                self.request_map(MapKind::Texture, ALIASING_TEXTURE.to_string());
            }
            DemoMode::DepthConflict => {
                self.scene.set_resolution(1);
                self.scene.light_position = Vec3::new(0.0, 0.0, 100_000.0);
                self.scene.camera_position = Vec3::new(0.0, 0.0, 30.0);
            }
            DemoMode::Combined => {
                self.scene.object = ObjectKind::Cube;
            }
        }
        self.material.illumination.light_position = self.scene.light_position;
        self.dirty = Dirty::all();
        info!("configured {} scene (generation {})", mode, self.generation);
    }

    /// Apply one event. Takes effect before the next frame is rendered.
    pub fn apply(&mut self, event: ConfigEvent) {
        match event {
            ConfigEvent::SwitchMode(mode) => self.configure_for_mode(mode),
            ConfigEvent::Reset => self.reset(),
            ConfigEvent::SetColor(color) => {
                self.material.illumination.base_color = color;
                self.dirty |= Dirty::MATERIAL;
            }
            ConfigEvent::SetFraction(term, value) => {
                self.material.illumination.set_fraction(term, value);
                self.dirty |= Dirty::MATERIAL;
            }
            ConfigEvent::SetTermEnabled(term, on) => {
                self.material.illumination.set_enabled(term, on);
                self.dirty |= Dirty::MATERIAL;
            }
            ConfigEvent::SetExponent(exponent) => {
                self.material.illumination.set_exponent(exponent);
                self.dirty |= Dirty::MATERIAL;
            }
            ConfigEvent::SetStrategy(selector) => {
                self.material.strategy = ShadingStrategy::from_selector(selector);
                self.dirty |= Dirty::MATERIAL;
            }
            ConfigEvent::SetFlag(flag, on) => {
                self.material.set_flag(flag, on);
                self.dirty |= Dirty::MATERIAL;
            }
            ConfigEvent::AssignMap(kind, name) => self.assign_map(kind, name),
            ConfigEvent::SelectMap(kind, name) => {
                let on = name.is_some();
                self.assign_map(kind, name);
                if let Some(flag) = enable_flag(kind) {
                    self.material.set_flag(flag, on);
                }
            }
            ConfigEvent::CopyMap { from, to } => {
                self.awaiting.remove(&to);
                self.material.copy_map(from, to);
                self.dirty |= Dirty::MATERIAL;
            }
            ConfigEvent::SetTiling(tiling) => {
                self.material.set_tiling(tiling);
                self.dirty |= Dirty::MATERIAL;
            }
            ConfigEvent::SetMagnification(filter) => {
                self.sampling.magnification = filter;
                self.dirty |= Dirty::SAMPLING;
            }
            ConfigEvent::SetMinification(filter) => {
                self.sampling.minification = filter;
                self.dirty |= Dirty::SAMPLING;
            }
            ConfigEvent::SetMipMode(mode) => {
                self.sampling.mip_mode = mode;
                self.dirty |= Dirty::SAMPLING;
            }
            ConfigEvent::SetSupersampling(level) => {
                self.sampling.supersampling = level;
            }
            ConfigEvent::SetLightPosition(position) => {
                self.scene.light_position = position;
                self.material.illumination.light_position = position;
                self.dirty |= Dirty::MATERIAL;
            }
            ConfigEvent::SetCameraPosition(position) => {
                self.scene.camera_position = position;
                self.dirty |= Dirty::CAMERA;
            }
            ConfigEvent::SetObject(kind) => {
                self.scene.object = kind;
                self.dirty |= Dirty::SCENE;
            }
            ConfigEvent::SetResolution(resolution) => {
                self.scene.set_resolution(resolution);
                self.dirty |= Dirty::SCENE;
            }
            ConfigEvent::SetAutoRotate(on) => self.scene.auto_rotate = on,
            ConfigEvent::SetWireframe(on) => self.scene.wireframe = on,
            ConfigEvent::SetDepthRotation(angle) => self.scene.set_depth_rotation(angle),
            ConfigEvent::SetLogDepth(on) => self.scene.log_depth = on,
        }
    }

    /// Install a finished image. Returns false when the ticket is stale: an
    /// older generation, or a slot that has since been re-assigned.
    pub fn install_image(&mut self, ticket: Ticket, image: Arc<Texture>) -> bool {
        let AssetTarget::Map(kind) = ticket.target else {
            return false;
        };
        if !self.accepts(ticket, kind) {
            return false;
        }
        let installed = self.material.set_image(kind, image);
        self.dirty |= Dirty::MATERIAL;
        installed
    }

    /// Install a finished environment map. Same staleness rules as images.
    pub fn install_environment(&mut self, ticket: Ticket, env: Arc<EnvironmentMap>) -> bool {
        if ticket.target != AssetTarget::Map(MapKind::Environment)
            || !self.accepts(ticket, MapKind::Environment)
        {
            return false;
        }
        self.material.set_environment(env);
        self.dirty |= Dirty::MATERIAL;
        true
    }

    /// A load failed: leave the slot empty so the fallback renders.
    pub fn fail(&mut self, ticket: Ticket) {
        if let AssetTarget::Map(kind) = ticket.target {
            if self.accepts(ticket, kind) {
                self.material.clear_map(kind);
                self.dirty |= Dirty::MATERIAL;
            }
        }
    }

    fn accepts(&mut self, ticket: Ticket, kind: MapKind) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        if self.awaiting.get(&kind) != Some(&ticket.request) {
            return false;
        }
        self.awaiting.remove(&kind);
        true
    }

    fn assign_map(&mut self, kind: MapKind, name: Option<String>) {
        match name {
            Some(name) => self.request_map(kind, name),
            None => {
                self.awaiting.remove(&kind);
                self.material.clear_map(kind);
            }
        }
        self.dirty |= Dirty::MATERIAL;
    }

    fn request_map(&mut self, kind: MapKind, name: String) {
        self.next_request += 1;
        let ticket = Ticket {
            generation: self.generation,
            request: self.next_request,
            target: AssetTarget::Map(kind),
        };
        debug!("requesting {:?} map '{}'", kind, name);
        self.awaiting.insert(kind, ticket.request);
        self.material.set_pending(kind);
        self.requests.push(MapRequest { ticket, name });
    }
}

impl Default for Configurator {
    fn default() -> Self {
        Self::new(DemoMode::default())
    }
}

fn enable_flag(kind: MapKind) -> Option<Flag> {
    match kind {
        MapKind::Texture => Some(Flag::UseTexture),
        MapKind::Normal => Some(Flag::UseNormalMap),
        MapKind::Displacement => Some(Flag::UseDisplacement),
        MapKind::Environment => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::illumination::default_base_color;
    use crate::material::MapSlot;
    use crate::texture::procedural;
    use approx::assert_relative_eq;

    fn assert_reset_defaults(c: &Configurator) {
        let ill = &c.material().illumination;
        assert_relative_eq!(ill.coefficient(Term::Ambient), 0.3);
        assert_relative_eq!(ill.coefficient(Term::Diffuse), 0.9);
        assert_relative_eq!(ill.coefficient(Term::Specular), 1.0);
        assert_relative_eq!(ill.exponent(), 50.0);
        assert_eq!(ill.base_color, default_base_color());
        assert_eq!(c.sampling(), &SamplingState::default());
        assert_eq!(c.sampling().supersampling.get(), 0);
        for kind in MapKind::ALL {
            match kind {
                MapKind::Environment => assert!(c.material().environment_map.is_empty()),
                _ => assert!(c.material().image_slot(kind).is_some_and(MapSlot::is_empty)),
            }
        }
        for flag in [
            Flag::UseTexture,
            Flag::UseNormalMap,
            Flag::UseDisplacement,
            Flag::Reflection,
            Flag::Refraction,
            Flag::Mirror,
        ] {
            assert!(!c.material().flag(flag));
        }
        assert!(!c.scene().auto_rotate);
        assert!(!c.scene().wireframe);
        assert!(!c.scene().log_depth);
    }

    #[test]
    fn reset_restores_every_default() {
        let mut c = Configurator::new(DemoMode::Combined);
        c.apply(ConfigEvent::SetFraction(Term::Ambient, 0.7));
        c.apply(ConfigEvent::SetTermEnabled(Term::Specular, false));
        c.apply(ConfigEvent::SetExponent(3.0));
        c.apply(ConfigEvent::SetSupersampling(SampleLevel::new(4)));
        c.apply(ConfigEvent::SetFlag(Flag::Mirror, true));
        c.apply(ConfigEvent::SelectMap(MapKind::Normal, Some("egg-normal".into())));
        c.apply(ConfigEvent::SetMipMode(MipMode::Visible));
        c.apply(ConfigEvent::SetWireframe(true));

        c.apply(ConfigEvent::Reset);
        assert_reset_defaults(&c);
        assert_eq!(c.mode(), DemoMode::Combined);
        assert!(c.take_requests().is_empty());
    }

    #[test]
    fn illumination_and_mapping_use_plain_defaults() {
        for mode in [DemoMode::Illumination, DemoMode::Mapping] {
            let c = Configurator::new(mode);
            assert_reset_defaults(&c);
            assert_eq!(c.scene().light_position, Vec3::new(80.0, 40.0, 50.0));
            assert_eq!(c.scene().camera_position, Vec3::new(0.0, 0.0, 25.0));
            assert_eq!(c.scene().object, ObjectKind::Sphere);
            assert_eq!(c.scene().resolution(), 96);
            assert_eq!(c.material().strategy, ShadingStrategy::Phong);
        }
    }

    #[test]
    fn aliasing_mode_setup() {
        let mut c = Configurator::new(DemoMode::Aliasing);
        let ill = &c.material().illumination;
        assert_relative_eq!(ill.coefficient(Term::Ambient), 1.0);
        assert_relative_eq!(ill.coefficient(Term::Diffuse), 0.0);
        assert_relative_eq!(ill.coefficient(Term::Specular), 0.0);
        assert!(c.material().use_texture);
        assert!(c.material().texture_map.is_pending());
        assert_relative_eq!(c.material().tiling(), 800.0);
        assert_eq!(c.scene().camera_position, Vec3::new(0.0, 0.0, 0.1));
        assert_eq!(c.scene().light_position, Vec3::new(0.0, 0.0, 10_000.0));

        let requests = c.take_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].name, ALIASING_TEXTURE);
        assert_eq!(requests[0].ticket.target, AssetTarget::Map(MapKind::Texture));
    }

    #[test]
    fn other_mode_setups() {
        let c = Configurator::new(DemoMode::ShadingComparison);
        assert_eq!(c.scene().resolution(), 20);
        assert_eq!(c.scene().camera_position, Vec3::new(0.0, 0.0, 31.0));
        assert_eq!(c.material().illumination.light_position, Vec3::new(30.0, 20.0, 30.0));

        let c = Configurator::new(DemoMode::DepthConflict);
        assert_eq!(c.scene().resolution(), 1);
        assert_eq!(c.scene().camera_position, Vec3::new(0.0, 0.0, 30.0));
        assert_eq!(c.controls(), ControlGroups::DEPTH_CONFLICT);

        let c = Configurator::new(DemoMode::Combined);
        assert_eq!(c.scene().object, ObjectKind::Cube);
        assert!(c.controls().contains(ControlGroups::SHADING | ControlGroups::MAPPING));
        assert!(!c.controls().contains(ControlGroups::ALIASING));
    }

    #[test]
    fn object_selectors() {
        assert_eq!(ObjectKind::from_selector(-2), ObjectKind::Sphere);
        assert_eq!(ObjectKind::from_selector(1), ObjectKind::Cube);
        assert_eq!(ObjectKind::from_selector(2), ObjectKind::TorusKnot);
        assert_eq!(ObjectKind::from_selector(3), ObjectKind::Imported);
        assert_eq!(ObjectKind::from_selector(12), ObjectKind::Imported);
        for selector in 0..ObjectKind::COUNT {
            assert_eq!(ObjectKind::from_selector(selector).selector(), selector);
        }
    }

    #[test]
    fn mode_lookup() {
        assert_eq!(DemoMode::from_index(3), Some(DemoMode::Aliasing));
        assert_eq!(DemoMode::from_index(6), None);
        assert_eq!(DemoMode::parse("Depth-Conflict"), Some(DemoMode::DepthConflict));
        assert_eq!(DemoMode::parse("5"), Some(DemoMode::Combined));
        assert_eq!(DemoMode::parse("torus"), None);
        for mode in DemoMode::ALL {
            assert_eq!(DemoMode::parse(mode.name()), Some(mode));
        }
    }

    #[test]
    fn assigning_a_map_leaves_its_flag_alone() {
        let mut c = Configurator::new(DemoMode::Mapping);
        c.take_dirty();
        c.apply(ConfigEvent::AssignMap(MapKind::Displacement, Some("egg-height".into())));
        assert!(c.material().displacement_map.is_pending());
        assert!(!c.material().use_displacement);
        assert!(c.take_dirty().contains(Dirty::MATERIAL));

        c.apply(ConfigEvent::SelectMap(MapKind::Texture, Some("checker".into())));
        assert!(c.material().use_texture);
        c.apply(ConfigEvent::SelectMap(MapKind::Texture, None));
        assert!(!c.material().use_texture);
        assert!(c.material().texture_map.is_empty());
    }

    #[test]
    fn completions_install_only_for_the_live_request() {
        let mut c = Configurator::new(DemoMode::Mapping);
        c.apply(ConfigEvent::SelectMap(MapKind::Texture, Some("checker".into())));
        let first = c.take_requests().remove(0).ticket;
        c.apply(ConfigEvent::SelectMap(MapKind::Texture, Some("noise".into())));
        let second = c.take_requests().remove(0).ticket;

        let image = Arc::new(procedural::checkerboard(8, 2));
        assert!(!c.install_image(first, Arc::clone(&image)));
        assert!(c.material().texture_map.is_pending());
        assert!(c.install_image(second, Arc::clone(&image)));
        assert!(c.material().texture_map.ready().is_some());
        // Already consumed
        assert!(!c.install_image(second, image));
    }

    #[test]
    fn mode_switch_discards_in_flight_loads() {
        let mut c = Configurator::new(DemoMode::Mapping);
        c.apply(ConfigEvent::SelectMap(MapKind::Environment, Some("sky".into())));
        let ticket = c.take_requests().remove(0).ticket;
        let generation = c.generation();

        c.apply(ConfigEvent::SwitchMode(DemoMode::Mapping));
        assert!(c.generation() > generation);
        assert!(!c.install_environment(ticket, Arc::new(procedural::sky_environment(4))));
        assert!(c.material().environment_map.is_empty());
    }

    #[test]
    fn failed_load_falls_back_to_empty() {
        let mut c = Configurator::new(DemoMode::Mapping);
        c.apply(ConfigEvent::SelectMap(MapKind::Normal, Some("missing".into())));
        let ticket = c.take_requests().remove(0).ticket;
        c.fail(ticket);
        assert!(c.material().normal_map.is_empty());
        assert!(c.material().use_normal_map);
    }

    #[test]
    fn scene_controls_clamp() {
        let mut c = Configurator::default();
        c.apply(ConfigEvent::SetResolution(0));
        assert_eq!(c.scene().resolution(), 1);
        c.apply(ConfigEvent::SetResolution(1000));
        assert_eq!(c.scene().resolution(), 400);
        c.apply(ConfigEvent::SetDepthRotation(0.5));
        assert_relative_eq!(c.scene().depth_rotation(), 0.001);
        c.apply(ConfigEvent::SetDepthRotation(f32::NAN));
        assert_eq!(c.scene().depth_rotation(), 0.0);
        c.apply(ConfigEvent::SetStrategy(9));
        assert_eq!(c.material().strategy, ShadingStrategy::Gouraud);
    }

    #[test]
    fn sampling_changes_mark_sampling_dirty() {
        let mut c = Configurator::default();
        c.take_dirty();
        c.apply(ConfigEvent::SetMinification(FilterMode::Bilinear));
        assert_eq!(c.take_dirty(), Dirty::SAMPLING);
        c.apply(ConfigEvent::SetLightPosition(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(c.take_dirty(), Dirty::MATERIAL);
        assert_eq!(c.material().illumination.light_position, Vec3::new(1.0, 2.0, 3.0));
    }
}
