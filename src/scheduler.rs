//! Cooperative, resumable drawing of a fully generated command sequence.
//!
//! The host calls [`Scheduler::tick`] once per frame. Each tick draws the next chunk
//! in generation order. Starting a new render bumps a version counter, so ticks that
//! still hold the previous [`RenderToken`] draw nothing.

use bincode::{Decode, Encode};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ensure_range};
use crate::surface::{DrawCommand, Surface};

pub const MAX_SPEED: u32 = 10;
const FRAMES_PER_SPEED_STEP: usize = 15;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[serde(default)]
pub struct Animation {
    pub enabled: bool,
    /// 0 (slowest) to 10 (fastest).
    pub speed: u32,
}

impl Default for Animation {
    fn default() -> Self {
        Animation { enabled: false, speed: 5 }
    }
}

impl Animation {
    pub fn validate(&self) -> Result<()> {
        ensure_range("speed", self.speed, 0, MAX_SPEED)
    }
}

/// Elements drawn per tick: the sequence is spread over `15·(11 − speed)` frames,
/// never less than one element per tick.
pub fn chunk_size(total: usize, speed: u32) -> usize {
    let frames = FRAMES_PER_SPEED_STEP * (MAX_SPEED + 1 - speed.min(MAX_SPEED)) as usize;
    total.div_ceil(frames).max(1)
}

/// One scheduled element. `base` marks recursion base cases.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawItem {
    pub command: DrawCommand,
    pub base: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderToken(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderState {
    Idle,
    Generating,
    Drawing { cursor: usize, total: usize },
    Done,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickStatus {
    /// More ticks are needed.
    Pending,
    Done,
    /// The token was superseded by a newer render; nothing was drawn.
    Cancelled,
    /// Nothing scheduled.
    Idle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickReport {
    pub status: TickStatus,
    pub drawn: usize,
    pub cursor: usize,
    pub total: usize,
    /// The first base-case element of the sequence was drawn on this tick.
    pub base_reached: bool,
}

impl TickReport {
    fn empty(status: TickStatus) -> Self {
        TickReport { status, drawn: 0, cursor: 0, total: 0, base_reached: false }
    }
}

struct Job {
    token: RenderToken,
    items: Vec<DrawItem>,
    cursor: usize,
    chunk: usize,
    base_seen: bool,
}

pub struct Scheduler {
    latest: u64,
    state: RenderState,
    job: Option<Job>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler { latest: 0, state: RenderState::Idle, job: None }
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, RenderState::Generating | RenderState::Drawing { .. })
    }

    /// Supersedes whatever is in flight and returns the token of the new render.
    pub fn begin(&mut self) -> RenderToken {
        if let Some(job) = self.job.take() {
            if job.cursor < job.items.len() {
                warn!(
                    "render {} cancelled at {}/{}",
                    job.token.0,
                    job.cursor,
                    job.items.len()
                );
            }
        }
        self.latest += 1;
        self.state = RenderState::Generating;
        RenderToken(self.latest)
    }

    /// Hands the generated sequence to the scheduler. Without animation the whole
    /// sequence is one chunk. A stale token is ignored.
    pub fn submit(&mut self, token: RenderToken, items: Vec<DrawItem>, animation: Animation) -> bool {
        if token.0 != self.latest {
            return false;
        }
        let total = items.len();
        let chunk = if animation.enabled { chunk_size(total, animation.speed) } else { total.max(1) };
        self.state = RenderState::Drawing { cursor: 0, total };
        self.job = Some(Job { token, items, cursor: 0, chunk, base_seen: false });
        true
    }

    /// Draws the next chunk of the current render.
    pub fn tick(&mut self, surface: &mut dyn Surface) -> TickReport {
        let token = RenderToken(self.latest);
        self.tick_token(token, surface)
    }

    /// Like [`tick`](Self::tick) but only for `token`; a superseded token reports
    /// `Cancelled` and leaves the surface untouched.
    pub fn tick_token(&mut self, token: RenderToken, surface: &mut dyn Surface) -> TickReport {
        if token.0 != self.latest {
            return TickReport::empty(TickStatus::Cancelled);
        }
        let Some(job) = self.job.as_mut() else {
            return TickReport::empty(TickStatus::Idle);
        };
        if job.token != token {
            return TickReport::empty(TickStatus::Cancelled);
        }

        let total = job.items.len();
        let end = (job.cursor + job.chunk).min(total);
        let mut base_reached = false;
        for item in &job.items[job.cursor..end] {
            item.command.apply(surface);
            if item.base && !job.base_seen {
                job.base_seen = true;
                base_reached = true;
                info!("render {}: first base case drawn", token.0);
            }
        }
        let drawn = end - job.cursor;
        job.cursor = end;

        let status = if end >= total {
            info!("render {} done, {} elements", token.0, total);
            self.state = RenderState::Done;
            self.job = None;
            TickStatus::Done
        } else {
            self.state = RenderState::Drawing { cursor: end, total };
            TickStatus::Pending
        };
        TickReport { status, drawn, cursor: end, total, base_reached }
    }

    /// Ticks until the current render is finished.
    pub fn run_to_completion(&mut self, surface: &mut dyn Surface) -> TickReport {
        let mut report = self.tick(surface);
        while report.status == TickStatus::Pending {
            report = self.tick(surface);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::raster::Color;
    use crate::surface::CommandLog;

    fn items(n: usize) -> Vec<DrawItem> {
        (0..n)
            .map(|i| DrawItem {
                command: DrawCommand::Line {
                    a: Point::new(i as f64, 0.0),
                    b: Point::new(i as f64, 1.0),
                    color: Color::WHITE,
                    width: 1.0,
                },
                base: i >= n / 2,
            })
            .collect()
    }

    #[test]
    fn chunk_grows_with_speed() {
        assert_eq!(chunk_size(768, 0), 5);
        assert_eq!(chunk_size(768, 10), 52);
        assert_eq!(chunk_size(3, 5), 1);
        assert_eq!(chunk_size(0, 5), 1);
        assert!(chunk_size(10_000, 7) > chunk_size(10_000, 3));
    }

    #[test]
    fn unanimated_draws_everything_in_one_pass() {
        let seq = items(192);
        let mut s = Scheduler::new();
        let token = s.begin();
        assert_eq!(s.state(), RenderState::Generating);
        s.submit(token, seq.clone(), Animation { enabled: false, speed: 0 });
        let mut log = CommandLog::new();
        let report = s.tick(&mut log);
        assert_eq!(report.status, TickStatus::Done);
        assert_eq!(report.drawn, 192);
        let expected: Vec<_> = seq.into_iter().map(|i| i.command).collect();
        assert_eq!(log.commands, expected);
        assert_eq!(s.state(), RenderState::Done);
    }

    #[test]
    fn animated_ticks_cover_sequence_once_in_order() {
        for speed in 1..=MAX_SPEED {
            let seq = items(500);
            let mut s = Scheduler::new();
            let token = s.begin();
            s.submit(token, seq.clone(), Animation { enabled: true, speed });
            let mut log = CommandLog::new();
            let mut ticks = 0;
            let mut base_ticks = 0;
            loop {
                let r = s.tick(&mut log);
                ticks += 1;
                if r.base_reached {
                    base_ticks += 1;
                }
                if r.status == TickStatus::Done {
                    break;
                }
                assert_eq!(r.status, TickStatus::Pending);
            }
            assert!(ticks > 1);
            assert_eq!(base_ticks, 1);
            let expected: Vec<_> = seq.into_iter().map(|i| i.command).collect();
            assert_eq!(log.commands, expected);
        }
    }

    #[test]
    fn new_render_cancels_stale_ticks() {
        let mut s = Scheduler::new();
        let old = s.begin();
        s.submit(old, items(300), Animation { enabled: true, speed: 1 });
        let mut log = CommandLog::new();
        assert_eq!(s.tick_token(old, &mut log).status, TickStatus::Pending);
        let drawn_before = log.len();

        let new = s.begin();
        assert_eq!(s.tick_token(old, &mut log).status, TickStatus::Cancelled);
        assert_eq!(log.len(), drawn_before);
        assert!(!s.submit(old, items(3), Animation::default()));

        s.submit(new, items(4), Animation::default());
        assert_eq!(s.tick_token(old, &mut log).status, TickStatus::Cancelled);
        assert_eq!(s.tick_token(new, &mut log).status, TickStatus::Done);
        assert_eq!(log.len(), drawn_before + 4);
    }

    #[test]
    fn empty_sequence_finishes_immediately() {
        let mut s = Scheduler::new();
        assert_eq!(s.tick(&mut CommandLog::new()).status, TickStatus::Idle);
        let token = s.begin();
        s.submit(token, Vec::new(), Animation { enabled: true, speed: 5 });
        let report = s.tick(&mut CommandLog::new());
        assert_eq!(report.status, TickStatus::Done);
        assert_eq!(report.drawn, 0);
    }

    #[test]
    fn speed_out_of_range_is_rejected() {
        assert!(Animation { enabled: true, speed: 11 }.validate().is_err());
        assert!(Animation { enabled: true, speed: 10 }.validate().is_ok());
    }
}
