//! Drawing-surface abstraction and the command stream the renderer produces.

use crate::geometry::{Point, Rect};
use crate::raster::{Color, RasterBuffer};

/// A caller-owned 2D target. Paths follow the usual move/line/stroke protocol.
pub trait Surface {
    fn clear(&mut self, rect: Rect, color: Color);
    fn move_to(&mut self, p: Point);
    fn line_to(&mut self, p: Point);
    /// Strokes and discards the current path.
    fn stroke(&mut self, color: Color, width: f64);
    fn fill_polygon(&mut self, points: &[Point], color: Color);
    fn put_pixels(&mut self, raster: &RasterBuffer, x: i64, y: i64);
}

/// One element of a render, already in surface coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear { rect: Rect, color: Color },
    Line { a: Point, b: Point, color: Color, width: f64 },
    StrokePolygon { points: Vec<Point>, color: Color, width: f64 },
    FillPolygon { points: Vec<Point>, color: Color },
    PutPixels { raster: RasterBuffer, x: i64, y: i64 },
}

impl DrawCommand {
    pub fn apply(&self, surface: &mut dyn Surface) {
        match self {
            DrawCommand::Clear { rect, color } => surface.clear(*rect, *color),
            DrawCommand::Line { a, b, color, width } => {
                surface.move_to(*a);
                surface.line_to(*b);
                surface.stroke(*color, *width);
            }
            DrawCommand::StrokePolygon { points, color, width } => {
                let Some((first, rest)) = points.split_first() else { return };
                surface.move_to(*first);
                for p in rest {
                    surface.line_to(*p);
                }
                surface.line_to(*first);
                surface.stroke(*color, *width);
            }
            DrawCommand::FillPolygon { points, color } => surface.fill_polygon(points, *color),
            DrawCommand::PutPixels { raster, x, y } => surface.put_pixels(raster, *x, *y),
        }
    }
}

/// Surface that only remembers what was asked of it, in order.
#[derive(Debug, Default)]
pub struct CommandLog {
    pub commands: Vec<DrawCommand>,
    path: Vec<Point>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Recorded commands other than background clears.
    pub fn drawn(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(|c| !matches!(c, DrawCommand::Clear { .. }))
    }
}

impl Surface for CommandLog {
    fn clear(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Clear { rect, color });
    }

    fn move_to(&mut self, p: Point) {
        self.path.clear();
        self.path.push(p);
    }

    fn line_to(&mut self, p: Point) {
        self.path.push(p);
    }

    fn stroke(&mut self, color: Color, width: f64) {
        let mut points = std::mem::take(&mut self.path);
        match points.len() {
            0 | 1 => {}
            2 => self.commands.push(DrawCommand::Line { a: points[0], b: points[1], color, width }),
            _ => {
                // closed outlines repeat the first vertex
                if points.first() == points.last() {
                    points.pop();
                }
                self.commands.push(DrawCommand::StrokePolygon { points, color, width });
            }
        }
    }

    fn fill_polygon(&mut self, points: &[Point], color: Color) {
        self.commands.push(DrawCommand::FillPolygon { points: points.to_vec(), color });
    }

    fn put_pixels(&mut self, raster: &RasterBuffer, x: i64, y: i64) {
        self.commands.push(DrawCommand::PutPixels { raster: raster.clone(), x, y });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaying_commands_records_them_unchanged() {
        let square = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let cmds = vec![
            DrawCommand::Clear { rect: Rect::new(0.0, 0.0, 4.0, 4.0), color: Color::BLACK },
            DrawCommand::Line { a: Point::new(0.0, 0.0), b: Point::new(2.0, 2.0), color: Color::WHITE, width: 2.0 },
            DrawCommand::StrokePolygon { points: square.clone(), color: Color::WHITE, width: 1.0 },
            DrawCommand::FillPolygon { points: square, color: Color::WHITE },
        ];
        let mut log = CommandLog::new();
        for c in &cmds {
            c.apply(&mut log);
        }
        assert_eq!(log.commands, cmds);
        assert_eq!(log.drawn().count(), 3);
    }

    #[test]
    fn stroke_without_path_records_nothing() {
        let mut log = CommandLog::new();
        log.stroke(Color::WHITE, 1.0);
        assert!(log.is_empty());
    }
}
