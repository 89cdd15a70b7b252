//! Window host: one scheduler tick per frame, keyboard controls, status overlay.

use log::{info, warn};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use rand::Rng;

use crate::canvas::PixelSurface;
use crate::config::ViewerConfig;
use crate::error::{FractalError, Result};
use crate::export;
use crate::overlay;
use crate::raster::Color;
use crate::render::{RenderRequest, RenderSummary, Renderer};
use crate::scheduler::{MAX_SPEED, TickStatus};
use crate::session::Session;
use crate::surface::Surface;

const TARGET_FPS: usize = 60;
const OVERLAY_SCALE: u32 = 2;

/// What a key press asks the viewer to do next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    None,
    Rerender,
    Export,
    Quit,
}

pub struct Viewer {
    pub config: ViewerConfig,
    pub session: Session,
    renderer: Renderer,
    surface: PixelSurface,
    last: Option<RenderSummary>,
    status: String,
    show_overlay: bool,
}

impl Viewer {
    pub fn new(config: ViewerConfig, session: Session) -> Result<Self> {
        config.validate()?;
        let surface = PixelSurface::new(config.canvas_width, config.canvas_height, config.style.background_color)?;
        let renderer = Renderer::new(config.render_options());
        Ok(Viewer {
            config,
            session,
            renderer,
            surface,
            last: None,
            status: String::new(),
            show_overlay: true,
        })
    }

    pub fn surface(&self) -> &PixelSurface {
        &self.surface
    }

    pub fn request(&self) -> RenderRequest {
        let kind = self.session.kind;
        RenderRequest {
            kind,
            level: self.session.current_level(),
            area: self.config.draw_area(kind),
            style: self.config.style,
            animation: self.session.animation,
        }
    }

    /// Starts a render of the current settings. A rejected request only updates the
    /// status line.
    pub fn rerender(&mut self) {
        self.renderer.options.seed = self.session.seed;
        let request = self.request();
        // the padding margin belongs to the background too
        self.surface.clear(self.config.canvas(), self.config.style.background_color);
        match self.renderer.render(&request, &mut self.surface) {
            Ok(summary) => {
                self.status = format!("{} elements", summary.elements);
                self.last = Some(summary);
            }
            Err(e) => {
                warn!("render rejected: {e}");
                self.status = e.to_string();
                self.last = None;
            }
        }
    }

    /// Advances the current render by one frame's chunk.
    pub fn tick(&mut self) -> TickStatus {
        let report = self.renderer.tick(&mut self.surface);
        if report.base_reached {
            self.status = format!("base case reached at {}/{}", report.cursor, report.total);
        }
        if report.status == TickStatus::Done {
            if let Some(last) = &self.last {
                self.status = format!("{} elements", last.elements);
            }
        }
        report.status
    }

    pub fn handle_key(&mut self, key: Key) -> Action {
        let kind = self.session.kind;
        match key {
            Key::Escape | Key::Q => Action::Quit,
            Key::Tab | Key::Space => {
                self.session.kind = kind.next();
                Action::Rerender
            }
            Key::Up | Key::Right => self.shift_level(true),
            Key::Down | Key::Left => self.shift_level(false),
            Key::A => {
                self.session.animation.enabled = !self.session.animation.enabled;
                Action::Rerender
            }
            Key::Equal | Key::NumPadPlus => {
                self.session.animation.speed = (self.session.animation.speed + 1).min(MAX_SPEED);
                Action::Rerender
            }
            Key::Minus | Key::NumPadMinus => {
                self.session.animation.speed = self.session.animation.speed.saturating_sub(1);
                Action::Rerender
            }
            Key::S => {
                self.session.seed = rand::thread_rng().gen_range(1..u32::MAX);
                Action::Rerender
            }
            Key::R => Action::Rerender,
            Key::E => Action::Export,
            Key::H => {
                self.show_overlay = !self.show_overlay;
                Action::None
            }
            _ => Action::None,
        }
    }

    fn shift_level(&mut self, up: bool) -> Action {
        let kind = self.session.kind;
        let current = self.session.current_level();
        let step = kind.level_step();
        let wanted = if up { current.saturating_add(step) } else { current.saturating_sub(step) };
        let next = kind.clamp_level(wanted);
        if next == current {
            return Action::None;
        }
        match self.session.set_level(kind, next) {
            Ok(()) => Action::Rerender,
            Err(e) => {
                self.status = e.to_string();
                Action::None
            }
        }
    }

    pub fn export(&mut self) -> Result<()> {
        export::save_png(self.surface.buffer(), &self.config.export_path)?;
        self.status = format!("saved {}", self.config.export_path);
        Ok(())
    }

    fn status_lines(&self) -> Vec<String> {
        let anim = &self.session.animation;
        vec![
            format!(
                "{} {} {}",
                self.session.kind,
                self.session.kind.level_name(),
                self.session.current_level()
            ),
            format!(
                "animate {} speed {} seed {}",
                if anim.enabled { "on" } else { "off" },
                anim.speed,
                self.session.seed
            ),
            self.status.clone(),
        ]
    }

    /// Finished surface plus the overlay, ready for the window.
    fn frame(&self) -> Vec<u32> {
        let mut frame = self.surface.buffer().clone();
        if self.show_overlay {
            overlay::draw_status(&mut frame, &self.status_lines(), Color::WHITE, OVERLAY_SCALE);
        }
        frame.pixels().to_vec()
    }
}

/// Opens the window and runs until it is closed. Returns the final session so the
/// caller can persist it.
pub fn run(config: ViewerConfig, session: Session) -> Result<Session> {
    let width = config.canvas_width as usize;
    let height = config.canvas_height as usize;
    let mut window = Window::new("fractal canvas", width, height, WindowOptions::default())
        .map_err(|e| FractalError::ResourceUnavailable(format!("cannot open window: {e}")))?;
    window.set_target_fps(TARGET_FPS);

    let mut viewer = Viewer::new(config, session)?;
    viewer.rerender();
    info!("viewer open, {}x{}", width, height);

    while window.is_open() {
        let mut action = Action::None;
        for key in window.get_keys_pressed(KeyRepeat::No) {
            match viewer.handle_key(key) {
                Action::None => {}
                other => action = other,
            }
            if action == Action::Quit {
                break;
            }
        }
        match action {
            Action::Quit => break,
            Action::Rerender => viewer.rerender(),
            Action::Export => {
                if let Err(e) = viewer.export() {
                    warn!("export failed: {e}");
                    viewer.status = e.to_string();
                }
            }
            Action::None => {}
        }

        viewer.tick();
        window
            .update_with_buffer(&viewer.frame(), width, height)
            .map_err(|e| FractalError::ResourceUnavailable(format!("window update failed: {e}")))?;
    }
    Ok(viewer.session)
}
