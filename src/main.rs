use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{info, warn};

use shadelab::colors::Color;
use shadelab::prelude::*;

const ORBIT_SPEED: f32 = 0.005;
const DOLLY_STEP: f32 = 0.9;
const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

const FRACTION_STEP: f32 = 0.05;
const EXPONENT_STEP: f32 = 5.0;
const LIGHT_STEP: f32 = 10.0;
const RESOLUTION_STEP: i64 = 8;
const DEPTH_ROTATION_STEP: f32 = 0.0001;
/// Material colors the color key cycles through, starting at the default.
const PALETTE: [u32; 5] = [0x2194CE, 0xCC3333, 0x33AA55, 0xEEEEEE, 0xE0A030];

#[derive(Parser, Debug)]
#[command(name = "shadelab", about = "CPU-rendered shading demonstrations")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start mode, by name or index (0-5)
    #[arg(short, long)]
    mode: Option<String>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Render without a window and save the last frame
    #[arg(long)]
    headless: bool,

    /// Frames to simulate in headless mode
    #[arg(long, default_value_t = 1)]
    frames: u32,

    /// Output image for headless mode
    #[arg(short, long, default_value = "shadelab.png")]
    output: PathBuf,

    /// Supersampling level, 0 to 5. Fractions truncate, anything that is
    /// not a number means 0.
    #[arg(long, value_parser = parse_level)]
    supersampling: Option<SampleLevel>,
}

fn parse_level(input: &str) -> Result<SampleLevel, String> {
    Ok(SampleLevel::parse(input))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("reading configuration {}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(mode) = &args.mode {
        config.start_mode = mode.clone();
    }
    if let Some(width) = args.width {
        config.window.width = width.max(1);
    }
    if let Some(height) = args.height {
        config.window.height = height.max(1);
    }
    let mode = config.start_mode()?;

    let mut engine = Engine::new(config.window.width, config.window.height, &config, mode);
    if let Some(level) = args.supersampling.or_else(|| config.supersampling()) {
        engine.apply(ConfigEvent::SetSupersampling(level));
    }

    if args.headless {
        run_headless(&mut engine, args.frames, &args.output)
    } else {
        run_windowed(&mut engine, &config)
    }
}

fn run_headless(engine: &mut Engine, frames: u32, output: &Path) -> Result<()> {
    engine.tick();
    engine.finish_loading(LOAD_TIMEOUT);
    for _ in 0..frames.max(1) {
        engine.tick();
    }
    engine.render_frame();
    save_png(engine, output)?;
    info!("wrote {}", output.display());
    Ok(())
}

fn run_windowed(engine: &mut Engine, config: &AppConfig) -> Result<()> {
    let mut window = Window::new(&config.window.title, engine.width(), engine.height())
        .map_err(|e| anyhow!(e))?;
    let mut limiter = FrameLimiter::new(&window);
    let mut title_mode = None;
    let mut screenshots = 0u32;
    let mut controls = Controls::default();

    'running: loop {
        for event in window.poll_events() {
            match event {
                WindowEvent::Quit => break 'running,
                WindowEvent::Resize(w, h) => {
                    window.resize(w, h).map_err(|e| anyhow!(e))?;
                    engine.resize(w, h);
                }
                WindowEvent::Drag(dx, dy) => engine
                    .camera_mut()
                    .orbit(-dx as f32 * ORBIT_SPEED, dy as f32 * ORBIT_SPEED),
                WindowEvent::Scroll(notches) => {
                    engine.camera_mut().dolly(DOLLY_STEP.powi(notches))
                }
                WindowEvent::Key(Key::Screenshot) => {
                    let path = PathBuf::from(format!("shadelab-{screenshots:03}.png"));
                    screenshots += 1;
                    match save_png(engine, &path) {
                        Ok(()) => info!("saved {}", path.display()),
                        Err(e) => warn!("screenshot failed: {e:#}"),
                    }
                }
                WindowEvent::Key(key) => {
                    if let Some(event) = controls.key_event(key, engine) {
                        engine.apply(event);
                    }
                }
            }
        }

        engine.tick();
        engine.render_frame();
        window.present(engine.frame_buffer()).map_err(|e| anyhow!(e))?;

        let mode = engine.mode();
        if title_mode != Some(mode) {
            let title = format!("{} - {}", config.window.title, mode);
            window.set_title(&title).map_err(|e| anyhow!(e))?;
            title_mode = Some(mode);
        }
        limiter.wait_and_get_delta(&window);
    }
    Ok(())
}

/// Keyboard state the configurator does not keep: the library entry each
/// map key last picked and the current palette color.
#[derive(Debug, Default)]
struct Controls {
    generation: u64,
    maps: HashMap<MapKind, usize>,
    color: usize,
}

impl Controls {
    /// Translate a key press into a configuration change.
    fn key_event(&mut self, key: Key, engine: &Engine) -> Option<ConfigEvent> {
        let configurator = engine.configurator();
        if configurator.generation() != self.generation {
            // Mode switches and resets empty every slot
            *self = Self {
                generation: configurator.generation(),
                ..Self::default()
            };
        }
        let material = configurator.material();
        let illumination = &material.illumination;
        let sampling = configurator.sampling();
        let scene = configurator.scene();

        let event = match key {
            Key::Digit(n) => ConfigEvent::SwitchMode(DemoMode::from_index(usize::from(n).checked_sub(1)?)?),
            Key::Reset => ConfigEvent::Reset,
            Key::Strategy => ConfigEvent::SetStrategy((material.strategy.selector() + 1) % 3),
            Key::Wireframe => ConfigEvent::SetWireframe(!scene.wireframe),
            Key::AutoRotate => ConfigEvent::SetAutoRotate(!scene.auto_rotate),
            Key::LogDepth => ConfigEvent::SetLogDepth(!scene.log_depth),
            Key::Object => ConfigEvent::SetObject(ObjectKind::from_selector(
                (scene.object.selector() + 1) % ObjectKind::COUNT,
            )),
            Key::MoreSamples => {
                ConfigEvent::SetSupersampling(SampleLevel::new(i64::from(sampling.supersampling.get()) + 1))
            }
            Key::FewerSamples => {
                ConfigEvent::SetSupersampling(SampleLevel::new(i64::from(sampling.supersampling.get()) - 1))
            }
            Key::Map(kind) => {
                // Position 0 is "none", then each library entry in order
                let names = engine.map_names(kind);
                let position = self.maps.get(&kind).copied().unwrap_or(0);
                let next = (position + 1) % (names.len() + 1);
                self.maps.insert(kind, next);
                let name = next.checked_sub(1).and_then(|i| names.get(i)).cloned();
                ConfigEvent::SelectMap(kind, name)
            }
            Key::Magnification => ConfigEvent::SetMagnification(FilterMode::from_selector(
                1 - sampling.magnification.selector(),
            )),
            Key::Minification => ConfigEvent::SetMinification(FilterMode::from_selector(
                1 - sampling.minification.selector(),
            )),
            Key::MipMode => {
                ConfigEvent::SetMipMode(MipMode::from_selector((sampling.mip_mode.selector() + 1) % 3))
            }
            Key::Toggle(flag) => ConfigEvent::SetFlag(flag, !material.flag(flag)),
            Key::Term(term) => ConfigEvent::SetTermEnabled(term, !illumination.is_enabled(term)),
            Key::Fraction(term, step) => ConfigEvent::SetFraction(
                term,
                illumination.fraction(term) + step.sign() * FRACTION_STEP,
            ),
            Key::Exponent(step) => {
                ConfigEvent::SetExponent(illumination.exponent() + step.sign() * EXPONENT_STEP)
            }
            Key::Tiling(step) => ConfigEvent::SetTiling(material.tiling() * 2f32.powf(step.sign())),
            Key::Resolution(step) => ConfigEvent::SetResolution(
                i64::from(scene.resolution()) + step.sign() as i64 * RESOLUTION_STEP,
            ),
            Key::DepthRotation(step) => ConfigEvent::SetDepthRotation(
                scene.depth_rotation() + step.sign() * DEPTH_ROTATION_STEP,
            ),
            Key::Color => {
                self.color = (self.color + 1) % PALETTE.len();
                ConfigEvent::SetColor(Color::from_hex(PALETTE[self.color]))
            }
            Key::Light { x, y } => ConfigEvent::SetLightPosition(
                scene.light_position + Vec3::new(f32::from(x), f32::from(y), 0.0) * LIGHT_STEP,
            ),
            Key::Screenshot => return None,
        };
        Some(event)
    }
}

fn save_png(engine: &Engine, path: &Path) -> Result<()> {
    let (width, height) = (engine.width(), engine.height());
    let pixels = engine.renderer().color_buffer();
    let image = image::RgbImage::from_fn(width, height, |x, y| {
        let argb = pixels[(y * width + x) as usize];
        image::Rgb([(argb >> 16) as u8, (argb >> 8) as u8, argb as u8])
    });
    image
        .save(path)
        .with_context(|| format!("saving {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(mode: DemoMode) -> Engine {
        Engine::new(16, 16, &AppConfig::default(), mode)
    }

    fn press(controls: &mut Controls, engine: &mut Engine, key: Key) -> ConfigEvent {
        let event = controls.key_event(key, engine).expect("key maps to an event");
        engine.apply(event.clone());
        event
    }

    #[test]
    fn supersampling_argument_accepts_any_text() {
        let level = |arg: &str| {
            Args::try_parse_from(["shadelab", "--supersampling", arg])
                .expect("argument parses")
                .supersampling
        };
        assert_eq!(level("2"), Some(SampleLevel::new(2)));
        assert_eq!(level("2.5"), Some(SampleLevel::new(2)));
        assert_eq!(level("abc"), Some(SampleLevel::new(0)));
        assert_eq!(level("NaN"), Some(SampleLevel::new(0)));
        assert_eq!(level("-3"), Some(SampleLevel::new(0)));
        assert_eq!(level("9"), Some(SampleLevel::new(5)));
        assert_eq!(Args::try_parse_from(["shadelab"]).unwrap().supersampling, None);
    }

    #[test]
    fn map_keys_cycle_through_the_library_and_back_to_none() {
        let mut engine = engine(DemoMode::Mapping);
        let mut controls = Controls::default();
        let names = engine.map_names(MapKind::Texture);
        assert!(!names.is_empty());

        for name in &names {
            assert_eq!(
                press(&mut controls, &mut engine, Key::Map(MapKind::Texture)),
                ConfigEvent::SelectMap(MapKind::Texture, Some(name.clone()))
            );
            assert!(engine.configurator().material().use_texture);
        }
        assert_eq!(
            press(&mut controls, &mut engine, Key::Map(MapKind::Texture)),
            ConfigEvent::SelectMap(MapKind::Texture, None)
        );
        assert!(!engine.configurator().material().use_texture);

        // Slots are tracked separately
        let env = engine.map_names(MapKind::Environment);
        assert_eq!(
            press(&mut controls, &mut engine, Key::Map(MapKind::Environment)),
            ConfigEvent::SelectMap(MapKind::Environment, env.first().cloned())
        );
    }

    #[test]
    fn mode_switch_restarts_map_cycling() {
        let mut engine = engine(DemoMode::Mapping);
        let mut controls = Controls::default();
        let first = engine.map_names(MapKind::Normal).first().cloned();
        press(&mut controls, &mut engine, Key::Map(MapKind::Normal));
        press(&mut controls, &mut engine, Key::Reset);
        assert_eq!(
            press(&mut controls, &mut engine, Key::Map(MapKind::Normal)),
            ConfigEvent::SelectMap(MapKind::Normal, first)
        );
    }

    #[test]
    fn sampling_keys_walk_every_choice() {
        let mut engine = engine(DemoMode::Aliasing);
        let mut controls = Controls::default();
        press(&mut controls, &mut engine, Key::Magnification);
        press(&mut controls, &mut engine, Key::Minification);
        let sampling = *engine.configurator().sampling();
        assert_eq!(sampling.magnification, FilterMode::Bilinear);
        assert_eq!(sampling.minification, FilterMode::Bilinear);
        press(&mut controls, &mut engine, Key::Magnification);
        assert_eq!(engine.configurator().sampling().magnification, FilterMode::Nearest);

        let mut seen = Vec::new();
        for _ in 0..3 {
            press(&mut controls, &mut engine, Key::MipMode);
            seen.push(engine.configurator().sampling().mip_mode);
        }
        assert_eq!(seen, vec![MipMode::Auto, MipMode::Visible, MipMode::Off]);

        press(&mut controls, &mut engine, Key::MoreSamples);
        press(&mut controls, &mut engine, Key::MoreSamples);
        assert_eq!(engine.configurator().sampling().supersampling, SampleLevel::new(2));
    }

    #[test]
    fn object_key_visits_every_object() {
        let mut engine = engine(DemoMode::Illumination);
        let mut controls = Controls::default();
        let mut seen = Vec::new();
        for _ in 0..ObjectKind::COUNT {
            press(&mut controls, &mut engine, Key::Object);
            seen.push(engine.configurator().scene().object);
        }
        assert_eq!(
            seen,
            vec![
                ObjectKind::Cube,
                ObjectKind::TorusKnot,
                ObjectKind::Imported,
                ObjectKind::Sphere
            ]
        );
    }

    #[test]
    fn material_keys_edit_the_material() {
        let mut engine = engine(DemoMode::Illumination);
        let mut controls = Controls::default();
        for flag in [Flag::Reflection, Flag::Refraction, Flag::Mirror] {
            press(&mut controls, &mut engine, Key::Toggle(flag));
            assert!(engine.configurator().material().flag(flag));
        }

        press(&mut controls, &mut engine, Key::Term(Term::Specular));
        let ill = engine.configurator().material().illumination;
        assert!(!ill.is_enabled(Term::Specular));

        let before = ill.fraction(Term::Diffuse);
        press(&mut controls, &mut engine, Key::Fraction(Term::Diffuse, Step::More));
        let after = engine.configurator().material().illumination.fraction(Term::Diffuse);
        assert!((after - before - FRACTION_STEP).abs() < 1e-6);

        let exponent = ill.exponent();
        press(&mut controls, &mut engine, Key::Exponent(Step::Less));
        assert_eq!(
            engine.configurator().material().illumination.exponent(),
            exponent - EXPONENT_STEP
        );

        press(&mut controls, &mut engine, Key::Tiling(Step::More));
        assert_eq!(engine.configurator().material().tiling(), 2.0);

        press(&mut controls, &mut engine, Key::Color);
        assert_eq!(
            engine.configurator().material().illumination.base_color,
            Color::from_hex(PALETTE[1])
        );
    }

    #[test]
    fn scene_keys_move_the_light_and_resolution() {
        let mut engine = engine(DemoMode::Illumination);
        let mut controls = Controls::default();
        let light = engine.configurator().scene().light_position;
        press(&mut controls, &mut engine, Key::Light { x: -1, y: 0 });
        assert_eq!(
            engine.configurator().scene().light_position,
            light + Vec3::new(-LIGHT_STEP, 0.0, 0.0)
        );

        let res = engine.configurator().scene().resolution();
        press(&mut controls, &mut engine, Key::Resolution(Step::Less));
        assert_eq!(
            i64::from(engine.configurator().scene().resolution()),
            i64::from(res) - RESOLUTION_STEP
        );

        press(&mut controls, &mut engine, Key::Digit(5));
        press(&mut controls, &mut engine, Key::DepthRotation(Step::More));
        assert_eq!(engine.configurator().scene().depth_rotation(), DEPTH_ROTATION_STEP);
        assert!(controls.key_event(Key::Digit(0), &engine).is_none());
        assert!(controls.key_event(Key::Screenshot, &engine).is_none());
    }
}
