pub mod error;
pub mod math;
pub mod geometry;
pub mod koch;
pub mod sierpinski;
pub mod tree;
pub mod mandelbrot;
pub mod noise;
pub mod fbm;
pub mod biome;
pub mod raster;
pub mod viewport;
pub mod surface;
pub mod canvas;
pub mod scheduler;
pub mod render;
pub mod config;
pub mod session;
pub mod export;
pub mod overlay;
pub mod visualizer;

pub use error::{FractalError, Result, ensure_range};
pub use math::C;
pub use geometry::{
    BoundingBox, GenerationStats, Point, Polygon, Primitive, Rect, Segment, Triangle,
};
pub use koch::KochShape;
pub use tree::{RootEdge, TreeParams};
pub use mandelbrot::{ComplexWindow, MandelbrotField, Palette, escape_iterations};
pub use noise::Noise2D;
pub use fbm::{FbmParams, NoiseField};
pub use biome::{Biome, BiomeMap, BiomeSeeds};
pub use raster::{Color, MAX_PIXELS, RasterBuffer, pixel_count};
pub use viewport::{FitTransform, fit};
pub use surface::{CommandLog, DrawCommand, Surface};
pub use canvas::PixelSurface;
pub use scheduler::{
    Animation, DrawItem, MAX_SPEED, RenderState, RenderToken, Scheduler, TickReport, TickStatus,
    chunk_size,
};
pub use render::{
    FractalKind, MAX_LINE_WIDTH, RenderOptions, RenderRequest, RenderSummary, Renderer, Style,
};
pub use config::{CONFIG_FILE, ViewerConfig};
pub use session::{SESSION_FILE, Session};
