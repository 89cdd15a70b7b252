//! Blocky world map: domain-warped height, temperature and moisture fields classified
//! into biomes, with river corridors and slope shading.

use log::debug;

use crate::error::{FractalError, Result};
use crate::fbm::{LIGHT_DIR, MAX_OCTAVES, NoiseField, dot, fbm_sum, normalize};
use crate::math::clamp01;
use crate::noise::Noise2D;
use crate::raster::{Color, RasterBuffer, pixel_count};

/// One map block covers this many surface pixels per side.
pub const BLOCK_SIZE: u32 = 4;
const MIN_BLOCKS: u32 = 32;

const HEIGHT_SCALE: f64 = 0.007;
const CLIMATE_SCALE: f64 = 0.004;
const WARP_SCALE: f64 = 0.003;
const WARP_AMPLITUDE: f64 = 18.0;
const RIVER_SCALE: f64 = 0.01;
const RIVER_OCTAVES: u32 = 3;
const RIVER_HALF_WIDTH: f64 = 0.02;
const NORMAL_GAIN: f64 = 10.0;
const AMBIENT: f64 = 0.35;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BiomeSeeds {
    pub height: u32,
    pub temperature: u32,
    pub moisture: u32,
    pub warp_x: u32,
    pub warp_y: u32,
    pub river: u32,
}

impl Default for BiomeSeeds {
    fn default() -> Self {
        BiomeSeeds { height: 4242, temperature: 2024, moisture: 9091, warp_x: 777, warp_y: 31337, river: 666 }
    }
}

impl BiomeSeeds {
    /// Six distinct seeds derived from one.
    pub fn from_seed(seed: u32) -> Self {
        let d = BiomeSeeds::default();
        BiomeSeeds {
            height: d.height ^ seed,
            temperature: d.temperature ^ seed.rotate_left(5),
            moisture: d.moisture ^ seed.rotate_left(11),
            warp_x: d.warp_x ^ seed.rotate_left(17),
            warp_y: d.warp_y ^ seed.rotate_left(23),
            river: d.river ^ seed.rotate_left(29),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Biome {
    DeepOcean,
    Ocean,
    Beach,
    Snow,
    Stone,
    Mountain,
    Taiga,
    SnowyTaiga,
    Forest,
    Plains,
    Desert,
    Jungle,
}

mod palette {
    use crate::raster::Color;

    pub const DEEP_OCEAN: Color = Color::rgb(12, 38, 112);
    pub const OCEAN: Color = Color::rgb(24, 78, 171);
    pub const BEACH: Color = Color::rgb(238, 214, 175);
    pub const RIVER: Color = Color::rgb(30, 110, 200);
    pub const PLAINS: Color = Color::rgb(141, 179, 96);
    pub const FOREST: Color = Color::rgb(79, 120, 66);
    pub const TAIGA: Color = Color::rgb(97, 142, 97);
    pub const JUNGLE: Color = Color::rgb(98, 151, 64);
    pub const DESERT: Color = Color::rgb(210, 202, 140);
    pub const MOUNTAIN: Color = Color::rgb(150, 150, 150);
    pub const STONE: Color = Color::rgb(110, 110, 110);
    pub const SNOW: Color = Color::rgb(240, 240, 245);
}

impl Biome {
    /// Fixed-threshold classification on normalised height, temperature, moisture.
    pub fn classify(height: f64, temp: f64, moist: f64) -> Biome {
        if height < 0.28 { return Biome::DeepOcean; }
        if height < 0.35 { return Biome::Ocean; }
        if height < 0.38 { return Biome::Beach; }
        if height > 0.80 {
            return if temp < 0.35 { Biome::Snow } else { Biome::Stone };
        }
        if height > 0.65 { return Biome::Mountain; }
        if temp < 0.25 {
            return if moist > 0.55 { Biome::Taiga } else { Biome::SnowyTaiga };
        }
        if temp < 0.55 {
            return if moist > 0.6 { Biome::Forest } else { Biome::Plains };
        }
        if moist < 0.35 { Biome::Desert } else { Biome::Jungle }
    }

    pub fn color(self, height: f64) -> Color {
        use palette::*;
        match self {
            Biome::DeepOcean => DEEP_OCEAN,
            Biome::Ocean => OCEAN,
            Biome::Beach => BEACH,
            Biome::Snow => SNOW,
            Biome::Stone => STONE,
            Biome::Mountain => MOUNTAIN.mix(STONE, clamp01((height - 0.65) / 0.2)),
            Biome::Taiga => TAIGA,
            Biome::SnowyTaiga => TAIGA.mix(SNOW, 0.25),
            Biome::Forest => FOREST,
            Biome::Plains => PLAINS,
            Biome::Desert => DESERT,
            Biome::Jungle => JUNGLE,
        }
    }

    pub fn is_water(self) -> bool {
        matches!(self, Biome::DeepOcean | Biome::Ocean)
    }
}

/// Thin corridor around the river noise midline, on land below the mountains.
pub fn is_river(river_noise: f64, height: f64) -> bool {
    (river_noise - 0.5).abs() < RIVER_HALF_WIDTH && height > 0.35 && height < 0.75
}

/// Block-resolution map.
#[derive(Clone, Debug)]
pub struct BiomeMap {
    pub biomes: Vec<Biome>,
    pub rivers: Vec<bool>,
    pub height: NoiseField,
    pub raster: RasterBuffer,
}

impl BiomeMap {
    /// Map for a `width × height` pixel area, one block per `BLOCK_SIZE` pixels
    /// (never fewer than 32 blocks per side).
    pub fn generate(width: u32, height: u32, octaves: u32, seeds: BiomeSeeds) -> Result<Self> {
        if octaves == 0 || octaves > MAX_OCTAVES {
            return Err(FractalError::invalid(format!(
                "octaves must be in [1, {MAX_OCTAVES}], got {octaves}"
            )));
        }
        // the map is upscaled to the full area, so the area itself must fit
        pixel_count(width, height)?;
        let bw = (width / BLOCK_SIZE).max(MIN_BLOCKS);
        let bh = (height / BLOCK_SIZE).max(MIN_BLOCKS);

        let n_height = Noise2D::new(seeds.height);
        let n_temp = Noise2D::new(seeds.temperature);
        let n_moist = Noise2D::new(seeds.moisture);
        let n_warp_x = Noise2D::new(seeds.warp_x);
        let n_warp_y = Noise2D::new(seeds.warp_y);
        let n_river = Noise2D::new(seeds.river);

        let warped: Vec<(f64, f64)> = (0..bh)
            .flat_map(|y| (0..bw).map(move |x| (x as f64, y as f64)))
            .map(|(x, y)| {
                let sx = x * WARP_SCALE;
                let sy = y * WARP_SCALE;
                (
                    x + (n_warp_x.sample(sx, sy) - 0.5) * 2.0 * WARP_AMPLITUDE,
                    y + (n_warp_y.sample(sx, sy) - 0.5) * 2.0 * WARP_AMPLITUDE,
                )
            })
            .collect();
        let at = |x: u32, y: u32| warped[(y * bw + x) as usize];

        let climate_octaves = 3 + octaves / 2;
        let height_field = NoiseField::from_fn(bw, bh, |x, y| {
            let (wx, wy) = at(x, y);
            fbm_sum(&n_height, wx, wy, octaves, HEIGHT_SCALE, 0.5, 2.0)
        })?;
        let temp = NoiseField::from_fn(bw, bh, |x, y| {
            let (wx, wy) = at(x, y);
            fbm_sum(&n_temp, wx + 1000.0, wy - 500.0, climate_octaves, CLIMATE_SCALE, 0.55, 2.2)
        })?;
        let moist = NoiseField::from_fn(bw, bh, |x, y| {
            let (wx, wy) = at(x, y);
            fbm_sum(&n_moist, wx - 700.0, wy + 1300.0, climate_octaves, CLIMATE_SCALE, 0.6, 2.0)
        })?;
        let river = NoiseField::from_fn(bw, bh, |x, y| {
            let (wx, wy) = at(x, y);
            fbm_sum(&n_river, wx * 0.7, wy * 0.7, RIVER_OCTAVES, RIVER_SCALE, 0.5, 2.0)
        })?;

        let light = normalize(LIGHT_DIR);
        let count = bw as usize * bh as usize;
        let mut biomes = Vec::with_capacity(count);
        let mut rivers = Vec::with_capacity(count);
        let mut pixels = Vec::with_capacity(count);

        for y in 0..bh {
            for x in 0..bw {
                let h = height_field.get(x, y);
                let biome = Biome::classify(h, temp.get(x, y), moist.get(x, y));
                let wet = is_river(river.get(x, y), h);
                let mut color = biome.color(h);
                if wet {
                    color = palette::RIVER.mix(color, 0.35);
                }
                let n = height_field.normal_at(x, y, NORMAL_GAIN);
                let lit = clamp01(dot(n, light) * 0.9 + 0.1).max(AMBIENT);
                biomes.push(biome);
                rivers.push(wet);
                pixels.push(color.scale(lit).to_u32());
            }
        }

        debug!(
            "biome map {}x{} blocks, {} river blocks",
            bw,
            bh,
            rivers.iter().filter(|r| **r).count()
        );
        Ok(BiomeMap {
            biomes,
            rivers,
            height: height_field,
            raster: RasterBuffer::from_pixels(bw, bh, pixels),
        })
    }

    /// Blocky full-resolution view.
    pub fn upscaled(&self, width: u32, height: u32) -> Result<RasterBuffer> {
        self.raster.upscale_nearest(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_thresholds() {
        assert_eq!(Biome::classify(0.1, 0.5, 0.5), Biome::DeepOcean);
        assert_eq!(Biome::classify(0.3, 0.5, 0.5), Biome::Ocean);
        assert_eq!(Biome::classify(0.36, 0.5, 0.5), Biome::Beach);
        assert_eq!(Biome::classify(0.9, 0.1, 0.5), Biome::Snow);
        assert_eq!(Biome::classify(0.9, 0.9, 0.5), Biome::Stone);
        assert_eq!(Biome::classify(0.7, 0.5, 0.5), Biome::Mountain);
        assert_eq!(Biome::classify(0.5, 0.1, 0.8), Biome::Taiga);
        assert_eq!(Biome::classify(0.5, 0.1, 0.2), Biome::SnowyTaiga);
        assert_eq!(Biome::classify(0.5, 0.4, 0.7), Biome::Forest);
        assert_eq!(Biome::classify(0.5, 0.4, 0.3), Biome::Plains);
        assert_eq!(Biome::classify(0.5, 0.8, 0.2), Biome::Desert);
        assert_eq!(Biome::classify(0.5, 0.8, 0.5), Biome::Jungle);
    }

    #[test]
    fn rivers_only_on_mid_land() {
        assert!(is_river(0.51, 0.5));
        assert!(!is_river(0.51, 0.3));
        assert!(!is_river(0.51, 0.8));
        assert!(!is_river(0.6, 0.5));
    }

    #[test]
    fn map_uses_minimum_block_grid() {
        let map = BiomeMap::generate(64, 64, 4, BiomeSeeds::default()).unwrap();
        assert_eq!(map.raster.width(), 32);
        assert_eq!(map.raster.height(), 32);
        assert_eq!(map.biomes.len(), 32 * 32);
        let big = map.upscaled(64, 64).unwrap();
        assert_eq!(big.pixel(0, 0), map.raster.pixel(0, 0));
        assert_eq!(big.pixel(63, 63), map.raster.pixel(31, 31));
    }

    #[test]
    fn map_is_deterministic_and_never_black() {
        let a = BiomeMap::generate(160, 120, 5, BiomeSeeds::from_seed(9)).unwrap();
        let b = BiomeMap::generate(160, 120, 5, BiomeSeeds::from_seed(9)).unwrap();
        assert_eq!(a.raster, b.raster);
        assert_eq!(a.biomes, b.biomes);
        assert!(a.raster.pixels().iter().all(|&p| p != 0));
    }

    #[test]
    fn normalised_height_spans_water_and_land() {
        let map = BiomeMap::generate(256, 256, 6, BiomeSeeds::default()).unwrap();
        assert!(map.biomes.iter().any(|b| b.is_water()));
        assert!(map.biomes.iter().any(|b| !b.is_water()));
    }

    #[test]
    fn rejects_zero_octaves() {
        assert!(BiomeMap::generate(64, 64, 0, BiomeSeeds::default()).is_err());
    }
}
