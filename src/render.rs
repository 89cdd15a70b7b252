//! Render invocation: parameter checks at the boundary, generation, fitting, and
//! hand-off to the scheduler.

use std::fmt;
use std::str::FromStr;

use bincode::{Decode, Encode};
use log::info;
use serde::{Deserialize, Serialize};

use crate::biome::{BiomeMap, BiomeSeeds};
use crate::error::{FractalError, Result, ensure_range};
use crate::fbm::{FbmParams, NoiseField, shade_terrain};
use crate::geometry::{BoundingBox, GenerationStats, Primitive, Rect};
use crate::koch::{self, KochShape};
use crate::mandelbrot::{ComplexWindow, MandelbrotField, Palette};
use crate::raster::{Color, RasterBuffer, pixel_count};
use crate::scheduler::{Animation, DrawItem, RenderToken, Scheduler, TickReport, TickStatus};
use crate::sierpinski;
use crate::surface::{DrawCommand, Surface};
use crate::tree::{self, RootEdge, TreeParams};
use crate::viewport::{FitTransform, fit};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "snake_case")]
pub enum FractalKind {
    KochSnowflake,
    KochCurve,
    Sierpinski,
    FractalTree,
    PythagorasTree,
    Mandelbrot,
    NoiseTerrain,
    BiomeMap,
}

impl FractalKind {
    pub const ALL: [FractalKind; 8] = [
        FractalKind::KochSnowflake,
        FractalKind::KochCurve,
        FractalKind::Sierpinski,
        FractalKind::FractalTree,
        FractalKind::PythagorasTree,
        FractalKind::Mandelbrot,
        FractalKind::NoiseTerrain,
        FractalKind::BiomeMap,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FractalKind::KochSnowflake => "koch snowflake",
            FractalKind::KochCurve => "koch curve",
            FractalKind::Sierpinski => "sierpinski",
            FractalKind::FractalTree => "fractal tree",
            FractalKind::PythagorasTree => "pythagoras tree",
            FractalKind::Mandelbrot => "mandelbrot",
            FractalKind::NoiseTerrain => "noise terrain",
            FractalKind::BiomeMap => "biome map",
        }
    }

    /// What the level parameter means for this kind.
    pub fn level_name(self) -> &'static str {
        match self {
            FractalKind::Mandelbrot => "max iterations",
            FractalKind::NoiseTerrain | FractalKind::BiomeMap => "octaves",
            _ => "depth",
        }
    }

    /// Inclusive range accepted at the render boundary.
    pub fn level_range(self) -> (u32, u32) {
        match self {
            FractalKind::PythagorasTree => (0, 9),
            FractalKind::Mandelbrot => (50, 800),
            FractalKind::NoiseTerrain | FractalKind::BiomeMap => (1, 8),
            _ => (0, 7),
        }
    }

    pub fn default_level(self) -> u32 {
        match self {
            FractalKind::KochSnowflake | FractalKind::KochCurve => 4,
            FractalKind::Sierpinski => 5,
            FractalKind::FractalTree => 7,
            FractalKind::PythagorasTree => 8,
            FractalKind::Mandelbrot => 200,
            FractalKind::NoiseTerrain | FractalKind::BiomeMap => 5,
        }
    }

    /// Step used by the interactive controls.
    pub fn level_step(self) -> u32 {
        if self == FractalKind::Mandelbrot { 50 } else { 1 }
    }

    pub fn is_raster(self) -> bool {
        matches!(self, FractalKind::Mandelbrot | FractalKind::NoiseTerrain | FractalKind::BiomeMap)
    }

    pub fn next(self) -> FractalKind {
        let i = FractalKind::ALL.iter().position(|k| *k == self).unwrap_or(0);
        FractalKind::ALL[(i + 1) % FractalKind::ALL.len()]
    }

    pub fn clamp_level(self, level: u32) -> u32 {
        let (lo, hi) = self.level_range();
        level.clamp(lo, hi)
    }
}

impl fmt::Display for FractalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FractalKind {
    type Err = FractalError;

    fn from_str(s: &str) -> Result<Self> {
        let kind = match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "koch" | "snowflake" | "koch_snowflake" => FractalKind::KochSnowflake,
            "curve" | "koch_curve" => FractalKind::KochCurve,
            "sierpinski" | "triangle" => FractalKind::Sierpinski,
            "tree" | "fractal_tree" => FractalKind::FractalTree,
            "pythagoras" | "pythagoras_tree" => FractalKind::PythagorasTree,
            "mandelbrot" => FractalKind::Mandelbrot,
            "noise" | "terrain" | "noise_terrain" => FractalKind::NoiseTerrain,
            "biome" | "map" | "biome_map" => FractalKind::BiomeMap,
            other => return Err(FractalError::invalid(format!("unknown fractal kind {other:?}"))),
        };
        Ok(kind)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub stroke_color: Color,
    pub background_color: Color,
    pub line_width: f64,
}

/// Widest stroke a surface is asked to draw, in pixels.
pub const MAX_LINE_WIDTH: f64 = 64.0;

impl Style {
    pub fn validate(&self) -> Result<()> {
        let w = self.line_width;
        if !(w.is_finite() && w > 0.0 && w <= MAX_LINE_WIDTH) {
            return Err(FractalError::invalid(format!(
                "line width must be in (0, {MAX_LINE_WIDTH}], got {w}"
            )));
        }
        Ok(())
    }
}

impl Default for Style {
    fn default() -> Self {
        Style {
            stroke_color: Color::rgb(0x60, 0xa5, 0xfa),
            background_color: Color::rgb(0x0b, 0x0b, 0x10),
            line_width: 2.0,
        }
    }
}

/// Generator settings that are not part of a single request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderOptions {
    pub seed: u32,
    pub window: ComplexWindow,
    pub palette: Palette,
    pub tree: TreeParams,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            seed: 42,
            window: ComplexWindow::default(),
            palette: Palette::default(),
            tree: TreeParams::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderRequest {
    pub kind: FractalKind,
    /// Depth, iteration budget or octave count, see [`FractalKind::level_name`].
    pub level: u32,
    pub area: Rect,
    pub style: Style,
    pub animation: Animation,
}

impl RenderRequest {
    pub fn validate(&self) -> Result<()> {
        let (lo, hi) = self.kind.level_range();
        ensure_range(self.kind.level_name(), self.level, lo, hi)?;
        self.animation.validate()?;
        if !self.area.has_area() {
            return Err(FractalError::invalid(format!("draw area {:?} has no area", self.area)));
        }
        if self.kind.is_raster() {
            raster_size(&self.area)?;
        }
        self.style.validate()
    }
}

/// What a started render produced.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSummary {
    pub token: RenderToken,
    pub kind: FractalKind,
    pub elements: usize,
    /// Per-level element counts; rasters count rows, all at level 0 and none base.
    pub stats: GenerationStats,
    pub fit: Option<FitTransform>,
    /// Set when the render was drawn in one synchronous pass.
    pub first_tick: Option<TickReport>,
}

/// Generated sequence for one request, before it is handed to the scheduler.
struct Plan {
    items: Vec<DrawItem>,
    stats: GenerationStats,
    fit: Option<FitTransform>,
}

pub struct Renderer {
    scheduler: Scheduler,
    pub options: RenderOptions,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Renderer { scheduler: Scheduler::new(), options }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Starts a render on `surface`, superseding any render still in flight.
    ///
    /// The draw area is cleared to the background immediately. Without animation the
    /// whole sequence is drawn before returning; otherwise call [`tick`](Self::tick)
    /// once per frame until it reports `Done`.
    pub fn render(&mut self, request: &RenderRequest, surface: &mut dyn Surface) -> Result<RenderSummary> {
        request.validate()?;
        // a rejected request must not cancel the render already in flight
        let plan = self.plan(request)?;
        let token = self.scheduler.begin();
        info!(
            "render {:?}: {} {} {} animate={} speed={}",
            token,
            request.kind,
            request.kind.level_name(),
            request.level,
            request.animation.enabled,
            request.animation.speed
        );

        surface.clear(request.area, request.style.background_color);
        let elements = plan.items.len();
        self.scheduler.submit(token, plan.items, request.animation);
        let first_tick = if request.animation.enabled {
            None
        } else {
            Some(self.scheduler.tick_token(token, surface))
        };

        Ok(RenderSummary {
            token,
            kind: request.kind,
            elements,
            stats: plan.stats,
            fit: plan.fit,
            first_tick,
        })
    }

    pub fn tick(&mut self, surface: &mut dyn Surface) -> TickReport {
        self.scheduler.tick(surface)
    }

    pub fn tick_token(&mut self, token: RenderToken, surface: &mut dyn Surface) -> TickReport {
        self.scheduler.tick_token(token, surface)
    }

    /// Draws whatever is left of the current render.
    pub fn finish(&mut self, surface: &mut dyn Surface) -> TickReport {
        let report = self.scheduler.run_to_completion(surface);
        debug_assert_ne!(report.status, TickStatus::Pending);
        report
    }

    fn plan(&self, request: &RenderRequest) -> Result<Plan> {
        let style = &request.style;
        let area = &request.area;
        let level = request.level;
        match request.kind {
            FractalKind::KochSnowflake | FractalKind::KochCurve => {
                let shape = if request.kind == FractalKind::KochCurve {
                    KochShape::Curve
                } else {
                    KochShape::Snowflake
                };
                let segments = koch::generate(shape, level)?;
                geometry_plan(&segments, area, |s, t| DrawCommand::Line {
                    a: t.apply(s.a),
                    b: t.apply(s.b),
                    color: style.stroke_color,
                    width: style.line_width,
                })
            }
            FractalKind::Sierpinski => {
                let triangles = sierpinski::generate(sierpinski::base_triangle(), level)?;
                geometry_plan(&triangles, area, |tri, t| DrawCommand::FillPolygon {
                    points: vec![t.apply(tri.a), t.apply(tri.b), t.apply(tri.c)],
                    color: style.stroke_color,
                })
            }
            FractalKind::FractalTree => {
                let segments = tree::generate_tree(RootEdge::default(), level, self.options.tree)?;
                geometry_plan(&segments, area, |s, t| DrawCommand::Line {
                    a: t.apply(s.a),
                    b: t.apply(s.b),
                    color: style.stroke_color,
                    width: style.line_width,
                })
            }
            FractalKind::PythagorasTree => {
                let polygons = tree::generate_pythagoras(tree::pythagoras_base(), level)?;
                geometry_plan(&polygons, area, |poly, t| DrawCommand::StrokePolygon {
                    points: poly.points.iter().map(|p| t.apply(*p)).collect(),
                    color: style.stroke_color,
                    width: style.line_width,
                })
            }
            FractalKind::Mandelbrot => {
                let (w, h) = raster_size(area)?;
                let field = MandelbrotField::generate(w, h, self.options.window, level)?;
                Ok(raster_plan(field.to_raster(self.options.palette), area))
            }
            FractalKind::NoiseTerrain => {
                let (w, h) = raster_size(area)?;
                let params = FbmParams { octaves: level, seed: self.options.seed, ..Default::default() };
                let field = NoiseField::generate(w, h, params)?;
                Ok(raster_plan(shade_terrain(&field), area))
            }
            FractalKind::BiomeMap => {
                let (w, h) = raster_size(area)?;
                let map = BiomeMap::generate(w, h, level, BiomeSeeds::from_seed(self.options.seed))?;
                Ok(raster_plan(map.upscaled(w, h)?, area))
            }
        }
    }
}

/// Fits `items` into `area` and maps each one to a draw command. An empty sequence
/// yields an empty plan; nothing is fitted.
fn geometry_plan<P: Primitive>(
    items: &[P],
    area: &Rect,
    to_command: impl Fn(&P, &FitTransform) -> DrawCommand,
) -> Result<Plan> {
    let stats = GenerationStats::of(items);
    let Some(bbox) = BoundingBox::of(items) else {
        return Ok(Plan { items: Vec::new(), stats, fit: None });
    };
    let transform = fit(&bbox, area)?;
    let items = items
        .iter()
        .map(|item| DrawItem { command: to_command(item, &transform), base: item.is_base() })
        .collect();
    Ok(Plan { items, stats, fit: Some(transform) })
}

fn raster_size(area: &Rect) -> Result<(u32, u32)> {
    let (w, h) = (area.w.round().max(1.0) as u32, area.h.round().max(1.0) as u32);
    pixel_count(w, h)?;
    Ok((w, h))
}

/// One `PutPixels` per raster row, top to bottom.
fn raster_plan(raster: RasterBuffer, area: &Rect) -> Plan {
    let x = area.x.round() as i64;
    let y = area.y.round() as i64;
    let rows = raster.rows();
    let mut stats = GenerationStats { total: rows.len(), ..Default::default() };
    stats.per_level.insert(0, rows.len());
    let items = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| DrawItem {
            command: DrawCommand::PutPixels { raster: row, x, y: y + i as i64 },
            base: false,
        })
        .collect();
    Plan { items, stats, fit: None }
}
