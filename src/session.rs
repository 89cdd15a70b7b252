use std::fs;
use std::path::Path;

use bincode::{Decode, Encode};
use log::{debug, info};

use crate::error::{Result, ensure_range};
use crate::render::FractalKind;
use crate::scheduler::Animation;

pub const SESSION_FILE: &str = "fractal_session.bin";

/// Last-used shell settings, restored on the next start.
#[derive(Clone, Debug, PartialEq, Encode, Decode)]
pub struct Session {
    pub kind: FractalKind,
    /// Level per kind, in `FractalKind::ALL` order.
    pub levels: Vec<u32>,
    pub animation: Animation,
    pub seed: u32,
}

impl Session {
    pub fn new(kind: FractalKind, animation: Animation, seed: u32) -> Self {
        Session {
            kind,
            levels: FractalKind::ALL.iter().map(|k| k.default_level()).collect(),
            animation,
            seed,
        }
    }

    pub fn level(&self, kind: FractalKind) -> u32 {
        FractalKind::ALL
            .iter()
            .position(|k| *k == kind)
            .and_then(|i| self.levels.get(i).copied())
            .map(|l| kind.clamp_level(l))
            .unwrap_or_else(|| kind.default_level())
    }

    /// Stores `level` for `kind`; out-of-range levels are rejected.
    pub fn set_level(&mut self, kind: FractalKind, level: u32) -> Result<()> {
        let (lo, hi) = kind.level_range();
        ensure_range(kind.level_name(), level, lo, hi)?;
        while self.levels.len() < FractalKind::ALL.len() {
            self.levels.push(FractalKind::ALL[self.levels.len()].default_level());
        }
        if let Some(i) = FractalKind::ALL.iter().position(|k| *k == kind) {
            self.levels[i] = level;
        }
        Ok(())
    }

    pub fn current_level(&self) -> u32 {
        self.level(self.kind)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let cfg = bincode::config::standard();
        let encoded = bincode::encode_to_vec(self, cfg)?;
        fs::write(path.as_ref(), &encoded)?;
        debug!("session saved, {} bytes", encoded.len());
        Ok(())
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path.as_ref())?;
        let cfg = bincode::config::standard();
        let (session, _len): (Session, usize) = bincode::decode_from_slice(&data, cfg)?;
        info!("restored session: {} level {}", session.kind, session.current_level());
        Ok(session)
    }
}
