use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::mouse::MouseButton;
use sdl2::pixels::PixelFormatEnum;
use sdl2::rect::Rect;

use crate::illumination::Term;
use crate::material::{Flag, MapKind};

pub const FPS: u64 = 60;
pub const FRAME_TARGET_TIME: f64 = 1000.0 / FPS as f64;

/// Direction of an adjustment key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Less,
    More,
}

impl Step {
    pub fn sign(self) -> f32 {
        match self {
            Step::Less => -1.0,
            Step::More => 1.0,
        }
    }
}

/// Keys the demo reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Number row, `1` through `9`.
    Digit(u8),
    Reset,
    Strategy,
    Wireframe,
    AutoRotate,
    LogDepth,
    Object,
    MoreSamples,
    FewerSamples,
    Screenshot,
    /// Next library map for a slot, wrapping through "none".
    Map(MapKind),
    Magnification,
    Minification,
    MipMode,
    Toggle(Flag),
    /// Switch an illumination term on or off.
    Term(Term),
    Fraction(Term, Step),
    Exponent(Step),
    Tiling(Step),
    Resolution(Step),
    DepthRotation(Step),
    Color,
    /// Move the light within the XY plane.
    Light { x: i8, y: i8 },
}

impl Key {
    fn from_keycode(keycode: Keycode) -> Option<Self> {
        let key = match keycode {
            Keycode::Num1 => Key::Digit(1),
            Keycode::Num2 => Key::Digit(2),
            Keycode::Num3 => Key::Digit(3),
            Keycode::Num4 => Key::Digit(4),
            Keycode::Num5 => Key::Digit(5),
            Keycode::Num6 => Key::Digit(6),
            Keycode::R => Key::Reset,
            Keycode::S => Key::Strategy,
            Keycode::W => Key::Wireframe,
            Keycode::Space => Key::AutoRotate,
            Keycode::L => Key::LogDepth,
            Keycode::O => Key::Object,
            Keycode::Equals | Keycode::KpPlus => Key::MoreSamples,
            Keycode::Minus | Keycode::KpMinus => Key::FewerSamples,
            Keycode::P => Key::Screenshot,
            Keycode::T => Key::Map(MapKind::Texture),
            Keycode::N => Key::Map(MapKind::Normal),
            Keycode::B => Key::Map(MapKind::Displacement),
            Keycode::E => Key::Map(MapKind::Environment),
            Keycode::F => Key::Magnification,
            Keycode::I => Key::Minification,
            Keycode::M => Key::MipMode,
            Keycode::X => Key::Toggle(Flag::Reflection),
            Keycode::Z => Key::Toggle(Flag::Refraction),
            Keycode::V => Key::Toggle(Flag::Mirror),
            Keycode::F1 => Key::Term(Term::Ambient),
            Keycode::F2 => Key::Term(Term::Diffuse),
            Keycode::F3 => Key::Term(Term::Specular),
            Keycode::F5 => Key::Fraction(Term::Ambient, Step::Less),
            Keycode::F6 => Key::Fraction(Term::Ambient, Step::More),
            Keycode::F7 => Key::Fraction(Term::Diffuse, Step::Less),
            Keycode::F8 => Key::Fraction(Term::Diffuse, Step::More),
            Keycode::F9 => Key::Fraction(Term::Specular, Step::Less),
            Keycode::F10 => Key::Fraction(Term::Specular, Step::More),
            Keycode::J => Key::Exponent(Step::Less),
            Keycode::K => Key::Exponent(Step::More),
            Keycode::LeftBracket => Key::Tiling(Step::Less),
            Keycode::RightBracket => Key::Tiling(Step::More),
            Keycode::Comma => Key::Resolution(Step::Less),
            Keycode::Period => Key::Resolution(Step::More),
            Keycode::PageDown => Key::DepthRotation(Step::Less),
            Keycode::PageUp => Key::DepthRotation(Step::More),
            Keycode::C => Key::Color,
            Keycode::Left => Key::Light { x: -1, y: 0 },
            Keycode::Right => Key::Light { x: 1, y: 0 },
            Keycode::Up => Key::Light { x: 0, y: 1 },
            Keycode::Down => Key::Light { x: 0, y: -1 },
            _ => return None,
        };
        Some(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowEvent {
    Quit,
    Resize(u32, u32),
    Key(Key),
    /// Mouse moved with the left button held, in pixels.
    Drag(i32, i32),
    /// Wheel notches, positive away from the user.
    Scroll(i32),
}

pub struct FrameLimiter {
    previous_frame_time: u64,
}

impl FrameLimiter {
    pub fn new(window: &Window) -> Self {
        Self {
            previous_frame_time: window.timer().ticks64(),
        }
    }

    /// Waits if necessary to maintain frame rate and returns the delta time in milliseconds.
    pub fn wait_and_get_delta(&mut self, window: &Window) -> u64 {
        let mut current_time = window.timer().ticks64();
        let mut delta_time = current_time - self.previous_frame_time;

        if delta_time < FRAME_TARGET_TIME as u64 {
            let time_to_wait = (FRAME_TARGET_TIME as u64) - delta_time;
            std::thread::sleep(std::time::Duration::from_millis(time_to_wait));
            current_time = window.timer().ticks64();
            delta_time = current_time - self.previous_frame_time;
        }

        self.previous_frame_time = current_time;
        delta_time
    }
}

pub struct Window {
    canvas: sdl2::render::Canvas<sdl2::video::Window>,
    texture: sdl2::render::Texture<'static>,
    texture_creator: Box<sdl2::render::TextureCreator<sdl2::video::WindowContext>>,
    event_pump: sdl2::EventPump,
    timer_subsystem: sdl2::TimerSubsystem,
    width: u32,
    height: u32,
}

impl Window {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;
        let timer_subsystem = sdl_context.timer()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .resizable()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let texture_creator = Box::new(canvas.texture_creator());
        let event_pump = sdl_context.event_pump()?;

        // SAFETY: texture_creator is heap-allocated and lives as long as Window.
        // Fields drop in declaration order, so texture goes before texture_creator.
        let texture_creator_ref: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(texture_creator.as_ref() as *const _) };
        let texture = texture_creator_ref
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(|e| e.to_string())?;

        Ok(Self {
            canvas,
            texture,
            texture_creator,
            event_pump,
            timer_subsystem,
            width,
            height,
        })
    }

    /// Every event since the last call that the demo cares about.
    pub fn poll_events(&mut self) -> Vec<WindowEvent> {
        let mut events = Vec::new();
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => events.push(WindowEvent::Quit),
                Event::KeyDown {
                    keycode: Some(keycode),
                    repeat: false,
                    ..
                } => {
                    if let Some(key) = Key::from_keycode(keycode) {
                        events.push(WindowEvent::Key(key));
                    }
                }
                Event::Window {
                    win_event: sdl2::event::WindowEvent::Resized(w, h),
                    ..
                } => events.push(WindowEvent::Resize(w.max(1) as u32, h.max(1) as u32)),
                Event::MouseMotion {
                    mousestate,
                    xrel,
                    yrel,
                    ..
                } if mousestate.is_mouse_button_pressed(MouseButton::Left) => {
                    events.push(WindowEvent::Drag(xrel, yrel))
                }
                Event::MouseWheel { y, .. } if y != 0 => events.push(WindowEvent::Scroll(y)),
                _ => {}
            }
        }
        events
    }

    /// Copy an ARGB8888 frame to the screen.
    pub fn present(&mut self, buffer: &[u8]) -> Result<(), String> {
        self.texture
            .update(None, buffer, (self.width * 4) as usize)
            .map_err(|e| e.to_string())?;

        self.canvas.clear();
        self.canvas
            .copy(&self.texture, None, Some(Rect::new(0, 0, self.width, self.height)))?;
        self.canvas.present();
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), String> {
        self.width = width;
        self.height = height;
        // SAFETY: Same as in new() - texture_creator outlives texture
        let texture_creator_ref: &'static sdl2::render::TextureCreator<sdl2::video::WindowContext> =
            unsafe { &*(self.texture_creator.as_ref() as *const _) };
        self.texture = texture_creator_ref
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn set_title(&mut self, title: &str) -> Result<(), String> {
        self.canvas
            .window_mut()
            .set_title(title)
            .map_err(|e| e.to_string())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn timer(&self) -> &sdl2::TimerSubsystem {
        &self.timer_subsystem
    }
}
