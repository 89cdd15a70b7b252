use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{FractalError, Result};
use crate::geometry::Rect;
use crate::mandelbrot::{ComplexWindow, Palette};
use crate::render::{FractalKind, RenderOptions, Style};
use crate::scheduler::Animation;
use crate::tree::TreeParams;

pub const CONFIG_FILE: &str = "fractals.json";

/// Viewer settings read from `fractals.json`. Missing keys take their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Margin kept around line and polygon fractals.
    pub padding: f64,
    pub kind: FractalKind,
    pub style: Style,
    pub animation: Animation,
    pub seed: u32,
    pub window: ComplexWindow,
    pub palette: Palette,
    pub tree: TreeParams,
    pub export_path: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            canvas_width: 720,
            canvas_height: 720,
            padding: 48.0,
            kind: FractalKind::KochSnowflake,
            style: Style::default(),
            animation: Animation::default(),
            seed: 42,
            window: ComplexWindow::default(),
            palette: Palette::default(),
            tree: TreeParams::default(),
            export_path: "fractal.png".to_string(),
        }
    }
}

impl ViewerConfig {
    /// Reads `path`, or returns the defaults when it does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("no {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        let config: ViewerConfig = serde_json::from_str(&text)?;
        config.validate()?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(FractalError::invalid(format!(
                "canvas {}x{} has no pixels",
                self.canvas_width, self.canvas_height
            )));
        }
        if !(self.padding.is_finite() && self.padding >= 0.0) {
            return Err(FractalError::invalid(format!("padding must be non-negative, got {}", self.padding)));
        }
        self.animation.validate()?;
        self.style.validate()?;
        self.tree.validate()
    }

    pub fn canvas(&self) -> Rect {
        Rect::new(0.0, 0.0, self.canvas_width as f64, self.canvas_height as f64)
    }

    /// Rasters fill the canvas; geometry keeps the padding margin.
    pub fn draw_area(&self, kind: FractalKind) -> Rect {
        if kind.is_raster() { self.canvas() } else { self.canvas().inset(self.padding) }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions { seed: self.seed, window: self.window, palette: self.palette, tree: self.tree }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Color;

    #[test]
    fn oversized_line_width_in_file_is_rejected() {
        let cfg: ViewerConfig = serde_json::from_str(r#"{ "style": { "line_width": 1e10 } }"#).unwrap();
        assert!(matches!(cfg.validate(), Err(FractalError::InvalidParameter(_))));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r##"{ "canvas_width": 400, "kind": "mandelbrot", "style": { "stroke_color": "#ff0000" } }"##;
        let cfg: ViewerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.canvas_width, 400);
        assert_eq!(cfg.canvas_height, 720);
        assert_eq!(cfg.kind, FractalKind::Mandelbrot);
        assert_eq!(cfg.style.stroke_color, Color::rgb(255, 0, 0));
        assert_eq!(cfg.style.background_color, Color::rgb(0x0b, 0x0b, 0x10));
        assert_eq!(cfg.style.line_width, 2.0);
    }

    #[test]
    fn draw_area_depends_on_kind() {
        let cfg = ViewerConfig::default();
        assert_eq!(cfg.draw_area(FractalKind::Mandelbrot), Rect::new(0.0, 0.0, 720.0, 720.0));
        assert_eq!(cfg.draw_area(FractalKind::KochCurve), Rect::new(48.0, 48.0, 624.0, 624.0));
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!("fractal_canvas_cfg_{}.json", std::process::id()));
        let cfg = ViewerConfig { seed: 7, padding: 10.0, ..Default::default() };
        cfg.save(&path).unwrap();
        let back = ViewerConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let cfg = ViewerConfig::load("/nonexistent/fractals.json").unwrap();
        assert_eq!(cfg, ViewerConfig::default());
    }

    #[test]
    fn invalid_speed_is_rejected() {
        let cfg = ViewerConfig { animation: Animation { enabled: true, speed: 20 }, ..Default::default() };
        assert!(cfg.validate().is_err());
    }
}
