//! Material configuration: which maps are bound, which effects are on, and
//! the illumination parameters a shading strategy runs with.

use std::fmt;
use std::sync::Arc;

use crate::illumination::IlluminationParams;
use crate::shading::ShadingStrategy;
use crate::texture::{EnvironmentMap, Texture};

/// A map handle as seen by the renderer.
///
/// `Pending` marks a requested asset that has not arrived yet; it renders
/// exactly like `Empty`.
pub enum MapSlot<T> {
    Empty,
    Pending,
    Ready(Arc<T>),
}

impl<T> MapSlot<T> {
    /// The asset, if loaded.
    pub fn ready(&self) -> Option<&T> {
        match self {
            MapSlot::Ready(asset) => Some(asset),
            _ => None,
        }
    }

    /// Shared handle to the asset, if loaded.
    pub fn handle(&self) -> Option<Arc<T>> {
        match self {
            MapSlot::Ready(asset) => Some(Arc::clone(asset)),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, MapSlot::Empty)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, MapSlot::Pending)
    }
}

impl<T> Default for MapSlot<T> {
    fn default() -> Self {
        MapSlot::Empty
    }
}

impl<T> Clone for MapSlot<T> {
    fn clone(&self) -> Self {
        match self {
            MapSlot::Empty => MapSlot::Empty,
            MapSlot::Pending => MapSlot::Pending,
            MapSlot::Ready(asset) => MapSlot::Ready(Arc::clone(asset)),
        }
    }
}

impl<T> fmt::Debug for MapSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapSlot::Empty => write!(f, "Empty"),
            MapSlot::Pending => write!(f, "Pending"),
            MapSlot::Ready(_) => write!(f, "Ready"),
        }
    }
}

/// The four map slots of a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapKind {
    Texture,
    Normal,
    Displacement,
    Environment,
}

impl MapKind {
    pub const ALL: [MapKind; 4] = [
        MapKind::Texture,
        MapKind::Normal,
        MapKind::Displacement,
        MapKind::Environment,
    ];
}

/// Effect toggles. Independent of whether the matching map is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    UseTexture,
    UseNormalMap,
    UseDisplacement,
    Reflection,
    Refraction,
    Mirror,
}

/// Everything one renderable needs to be shaded.
///
/// Map slots and their enable flags are separate state: a map can be bound
/// while its flag is off, and a flag can be on while its slot is empty or
/// still loading. Only the combination "flag on and slot ready" has an
/// effect.
#[derive(Debug, Clone)]
pub struct MaterialConfig {
    pub strategy: ShadingStrategy,
    pub texture_map: MapSlot<Texture>,
    pub normal_map: MapSlot<Texture>,
    pub displacement_map: MapSlot<Texture>,
    pub environment_map: MapSlot<EnvironmentMap>,
    pub use_texture: bool,
    pub use_normal_map: bool,
    pub use_displacement: bool,
    pub reflection: bool,
    pub refraction: bool,
    pub mirror: bool,
    pub illumination: IlluminationParams,
    tiling: f32,
    object_scale: f32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            strategy: ShadingStrategy::default(),
            texture_map: MapSlot::Empty,
            normal_map: MapSlot::Empty,
            displacement_map: MapSlot::Empty,
            environment_map: MapSlot::Empty,
            use_texture: false,
            use_normal_map: false,
            use_displacement: false,
            reflection: false,
            refraction: false,
            mirror: false,
            illumination: IlluminationParams::default(),
            tiling: 1.0,
            object_scale: 1.0,
        }
    }
}

impl MaterialConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unlit material that shows `illumination.base_color` as-is.
    pub fn emissive(illumination: IlluminationParams) -> Self {
        Self {
            illumination: IlluminationParams::emissive(illumination.base_color),
            ..Self::default()
        }
    }

    /// Same material under another strategy.
    pub fn variant(&self, strategy: ShadingStrategy) -> Self {
        Self {
            strategy,
            ..self.clone()
        }
    }

    pub fn tiling(&self) -> f32 {
        self.tiling
    }

    /// Texture repeat factor. Non-positive or non-finite input resets to 1.
    pub fn set_tiling(&mut self, tiling: f32) {
        self.tiling = if tiling.is_finite() && tiling > 0.0 {
            tiling
        } else {
            1.0
        };
    }

    pub fn object_scale(&self) -> f32 {
        self.object_scale
    }

    /// Uniform scale of the mesh; displacement heights are divided by it.
    pub fn set_object_scale(&mut self, scale: f32) {
        self.object_scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
    }

    pub fn flag(&self, flag: Flag) -> bool {
        match flag {
            Flag::UseTexture => self.use_texture,
            Flag::UseNormalMap => self.use_normal_map,
            Flag::UseDisplacement => self.use_displacement,
            Flag::Reflection => self.reflection,
            Flag::Refraction => self.refraction,
            Flag::Mirror => self.mirror,
        }
    }

    pub fn set_flag(&mut self, flag: Flag, on: bool) {
        match flag {
            Flag::UseTexture => self.use_texture = on,
            Flag::UseNormalMap => self.use_normal_map = on,
            Flag::UseDisplacement => self.use_displacement = on,
            Flag::Reflection => self.reflection = on,
            Flag::Refraction => self.refraction = on,
            Flag::Mirror => self.mirror = on,
        }
    }

    /// Mark a 2-D map slot as waiting for an asset.
    pub fn set_pending(&mut self, kind: MapKind) {
        match kind {
            MapKind::Texture => self.texture_map = MapSlot::Pending,
            MapKind::Normal => self.normal_map = MapSlot::Pending,
            MapKind::Displacement => self.displacement_map = MapSlot::Pending,
            MapKind::Environment => self.environment_map = MapSlot::Pending,
        }
    }

    pub fn clear_map(&mut self, kind: MapKind) {
        match kind {
            MapKind::Texture => self.texture_map = MapSlot::Empty,
            MapKind::Normal => self.normal_map = MapSlot::Empty,
            MapKind::Displacement => self.displacement_map = MapSlot::Empty,
            MapKind::Environment => self.environment_map = MapSlot::Empty,
        }
    }

    /// Bind a loaded image to one of the 2-D slots. Returns false for the
    /// environment slot, which takes cube maps only.
    pub fn set_image(&mut self, kind: MapKind, image: Arc<Texture>) -> bool {
        match self.image_slot_mut(kind) {
            Some(slot) => {
                *slot = MapSlot::Ready(image);
                true
            }
            None => false,
        }
    }

    pub fn set_environment(&mut self, env: Arc<EnvironmentMap>) {
        self.environment_map = MapSlot::Ready(env);
    }

    /// Point one 2-D slot at the asset held by another. Copying from or to
    /// the environment slot is a no-op.
    pub fn copy_map(&mut self, from: MapKind, to: MapKind) {
        let source = match self.image_slot(from) {
            Some(slot) => slot.clone(),
            None => return,
        };
        if let Some(target) = self.image_slot_mut(to) {
            *target = source;
        }
    }

    pub fn image_slot(&self, kind: MapKind) -> Option<&MapSlot<Texture>> {
        match kind {
            MapKind::Texture => Some(&self.texture_map),
            MapKind::Normal => Some(&self.normal_map),
            MapKind::Displacement => Some(&self.displacement_map),
            MapKind::Environment => None,
        }
    }

    fn image_slot_mut(&mut self, kind: MapKind) -> Option<&mut MapSlot<Texture>> {
        match kind {
            MapKind::Texture => Some(&mut self.texture_map),
            MapKind::Normal => Some(&mut self.normal_map),
            MapKind::Displacement => Some(&mut self.displacement_map),
            MapKind::Environment => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colors::Color;

    fn image() -> Arc<Texture> {
        Arc::new(Texture::solid(Color::WHITE))
    }

    #[test]
    fn defaults_have_no_maps_and_no_effects() {
        let m = MaterialConfig::default();
        assert!(m.texture_map.is_empty());
        assert!(m.normal_map.is_empty());
        assert!(m.displacement_map.is_empty());
        assert!(m.environment_map.is_empty());
        assert!(!m.use_texture && !m.use_normal_map && !m.use_displacement);
        assert!(!m.reflection && !m.refraction && !m.mirror);
        assert_eq!(m.tiling(), 1.0);
        assert_eq!(m.strategy, ShadingStrategy::Phong);
    }

    #[test]
    fn slot_and_flag_are_independent() {
        let mut m = MaterialConfig::default();
        m.set_flag(Flag::UseDisplacement, true);
        assert!(m.displacement_map.ready().is_none());

        m.set_flag(Flag::UseDisplacement, false);
        assert!(m.set_image(MapKind::Displacement, image()));
        assert!(m.displacement_map.ready().is_some());
        assert!(!m.flag(Flag::UseDisplacement));
    }

    #[test]
    fn pending_is_not_ready() {
        let mut m = MaterialConfig::default();
        m.set_pending(MapKind::Texture);
        assert!(m.texture_map.is_pending());
        assert!(m.texture_map.ready().is_none());
    }

    #[test]
    fn copy_map_shares_the_asset() {
        let mut m = MaterialConfig::default();
        let disp = image();
        m.set_image(MapKind::Displacement, Arc::clone(&disp));
        m.copy_map(MapKind::Displacement, MapKind::Texture);
        let copied = m.texture_map.handle().map(|h| Arc::ptr_eq(&h, &disp));
        assert_eq!(copied, Some(true));

        m.copy_map(MapKind::Environment, MapKind::Texture);
        assert!(m.texture_map.ready().is_some());
        assert!(!m.set_image(MapKind::Environment, image()));
    }

    #[test]
    fn variant_keeps_everything_but_the_strategy() {
        let mut m = MaterialConfig::default();
        m.set_image(MapKind::Texture, image());
        m.use_texture = true;
        m.set_tiling(4.0);
        let flat = m.variant(ShadingStrategy::Flat);
        assert_eq!(flat.strategy, ShadingStrategy::Flat);
        assert!(flat.use_texture);
        assert!(flat.texture_map.ready().is_some());
        assert_eq!(flat.tiling(), 4.0);
    }

    #[test]
    fn tiling_and_scale_reject_nonsense() {
        let mut m = MaterialConfig::default();
        m.set_tiling(f32::NAN);
        m.set_object_scale(-2.0);
        assert_eq!(m.tiling(), 1.0);
        assert_eq!(m.object_scale(), 1.0);
        m.set_object_scale(120.0);
        assert_eq!(m.object_scale(), 120.0);
    }
}
