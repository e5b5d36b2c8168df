//! Patchwork biome layout
//!
//! Biome weights follow from the humidity and temperature fields instead
//! of planned centre columns: cold and wet gives snow, hot and dry desert,
//! hot and wet jungle, and the deepest rows run hot enough for the
//! underworld. Once the terrain is down the surface is scanned for the
//! columns where desert, jungle and snow dominate, so passes that work
//! from a centre column still have one.

use log::{debug, info};

use crate::random::{hash_point, ClimateField, NoiseField, Random};
use crate::world::{Biome, BiomeData, World};

/// Weight a biome needs to be considered for the active one.
const MIN_CANDIDATE: f64 = 0.02;
/// When exactly two biomes pass this weight they are the only candidates.
const STRONG_CANDIDATE: f64 = 0.1;
/// Resolution of the weighted draw of the active biome.
const QUANT: u32 = 1400;
/// Rows below the surface sampled per column when locating centres.
const SURFACE_DEPTH: i32 = 30;

/// Biome weights and active biome at one tile.
pub fn compute_biome_data(x: i32, y: i32, climate: &ClimateField, noise: &NoiseField) -> BiomeData {
    let hum = climate.humidity(x, y);
    let temp = climate.temperature(x, y);
    let mut snow = (-10.31 * temp - 4.712).min(6.67 * hum + 4.67).clamp(0.0, 1.0);
    let mut desert = (-10.31 * hum - 4.712).min(6.67 * temp + 4.67).clamp(0.0, 1.0);
    let mut jungle = (14.706 * temp.min(hum) - 0.206).clamp(0.0, 1.0);
    let mut underworld = (14.286 * temp - 14.5).clamp(0.0, 1.0);
    if underworld > 0.5 {
        let mult = 2.0 - 2.0 * underworld;
        snow *= mult;
        desert *= mult;
        jungle *= mult;
    }
    let partial = snow + desert + jungle + underworld;
    let mut forest = (1.0 - partial).clamp(0.0, 1.0);
    let norm = 1.0 / (partial + forest);
    for weight in [&mut snow, &mut desert, &mut jungle, &mut forest, &mut underworld] {
        *weight *= norm;
    }

    let weights = [
        (forest, Biome::Forest),
        (desert, Biome::Desert),
        (jungle, Biome::Jungle),
        (snow, Biome::Snow),
        (underworld, Biome::Underworld),
    ];
    let hash = hash_point(x, y);
    let mut candidates: Vec<(f64, Biome)> = Vec::new();
    if hash % 37 > 4 {
        candidates = weights.iter().copied().filter(|(w, _)| *w > MIN_CANDIDATE).collect();
        let strong: Vec<(f64, Biome)> = weights.iter().copied().filter(|(w, _)| *w > STRONG_CANDIDATE).collect();
        if strong.len() == 2 {
            candidates = strong;
        }
    }
    let active = match candidates.as_slice() {
        [(first, a), (_, b)] => {
            let shift = (99999.0 * (1.0 + noise.fine(0, 0))) as i32 % 997;
            if first + 0.6 * noise.fine(x + shift, y + shift) > 0.5 {
                *a
            } else {
                *b
            }
        }
        _ => {
            let target = hash % (QUANT - 1);
            let mut accu = 0u32;
            weights
                .iter()
                .find(|entry| {
                    accu = (f64::from(accu) + entry.0 * f64::from(QUANT)) as u32;
                    accu > target
                })
                .map_or(Biome::Forest, |entry| entry.1)
        }
    };
    BiomeData {
        active,
        forest: forest as f32,
        snow: snow as f32,
        desert: desert as f32,
        jungle: jungle as f32,
        underworld: underworld as f32,
    }
}

/// Fill the biome map from the climate fields.
pub fn register_patches(rnd: &Random, world: &mut World) {
    info!("Spreading biome patches");
    let (climate, noise) = (&rnd.climate, &rnd.noise);
    world.par_columns_mut(|_, col| {
        let x = col.x;
        for y in 0..col.height() {
            *col.biome_mut(y) = compute_biome_data(x, y, climate, noise);
        }
    });
}

/// Running surface weight of desert, jungle and snow, in that order.
#[derive(Default)]
struct SurfaceScan {
    current: [f64; 3],
    best: [f64; 3],
    center: [i32; 3],
}

impl SurfaceScan {
    fn column(&mut self, x: i32, record: bool, world: &World) {
        for value in &mut self.current {
            *value *= 0.99;
        }
        let surface = world.surface(x);
        for y in surface..surface + SURFACE_DEPTH {
            let data = world.biome(x, y);
            for (value, weight) in self.current.iter_mut().zip([data.desert, data.jungle, data.snow]) {
                *value += 0.01 * f64::from(weight);
            }
        }
        if !record {
            return;
        }
        for i in 0..3 {
            if self.current[i] > self.best[i] {
                self.best[i] = self.current[i];
                self.center[i] = x;
            }
        }
    }
}

/// Locate the desert, jungle and snow centre columns from the surface.
///
/// The surface is scanned once in each direction with a decaying sum; the
/// two peaks are averaged when they agree and the forward one wins
/// (shifted back a little) when they do not.
pub fn identify_surface_biomes(world: &mut World) {
    let width = world.width();
    let mut forward = SurfaceScan::default();
    for x in 50..width - 200 {
        forward.column(x, x > 350, world);
    }
    let mut backward = SurfaceScan::default();
    for x in (201..=width - 50).rev() {
        backward.column(x, x < width - 350, world);
    }
    let threshold = f64::from((0.22 * f64::from(width)).min(1200.0) as i32);
    let merge = |i: usize| {
        let (a, b) = (f64::from(forward.center[i]), f64::from(backward.center[i]));
        if (a - b).abs() < threshold {
            (a + b) / 2.0
        } else {
            (a - 150.0).max(0.0)
        }
    };
    world.ctx.desert_center = merge(0);
    world.ctx.jungle_center = merge(1);
    world.ctx.snow_center = merge(2);
    debug!(
        "Surface biome centres: desert {:.0}, jungle {:.0}, snow {:.0}",
        world.ctx.desert_center, world.ctx.jungle_center, world.ctx.snow_center
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::test_world;

    fn data_at(hum: f64, temp: f64) -> BiomeData {
        let climate = ClimateField::from_fn(10, 10, |_, _| (hum, temp));
        compute_biome_data(4, 4, &climate, &NoiseField::default())
    }

    #[test]
    fn test_climate_picks_biome() {
        assert_eq!(data_at(-1.0, 0.0).active, Biome::Desert);
        assert_eq!(data_at(0.0, -1.0).active, Biome::Snow);
        assert_eq!(data_at(0.5, 0.5).active, Biome::Jungle);
        assert_eq!(data_at(0.0, 1.2).active, Biome::Underworld);
        let mild = data_at(0.0, 0.0);
        assert_eq!(mild.active, Biome::Forest);
        assert_eq!(mild.forest, 1.0);
    }

    #[test]
    fn test_weights_are_normalised() {
        for (hum, temp) in [(-0.46, 0.1), (0.03, 0.02), (0.2, -0.5), (0.1, 1.05)] {
            let data = data_at(hum, temp);
            let total = data.forest + data.snow + data.desert + data.jungle + data.underworld;
            assert!((total - 1.0).abs() < 1e-5, "weights at ({}, {}) sum to {}", hum, temp, total);
        }
    }

    #[test]
    fn test_register_patches_fills_map() {
        let mut world = test_world(40, 30);
        world.init_biome_data();
        let mut rnd = Random::new(2);
        rnd.climate = ClimateField::from_fn(40, 30, |x, _| if x < 20 { (-1.0, 0.0) } else { (0.0, -1.0) });
        register_patches(&rnd, &mut world);
        assert_eq!(world.biome(5, 10).active, Biome::Desert);
        assert_eq!(world.biome(30, 10).active, Biome::Snow);
    }

    #[test]
    fn test_surface_centres_from_scan() {
        let mut world = test_world(2000, 600);
        world.init_biome_data();
        for x in 0..2000 {
            world.set_surface(x, 100);
        }
        for x in 1400..1500 {
            for y in 100..130 {
                world.biome_mut(x, y).desert = 1.0;
            }
        }
        identify_surface_biomes(&mut world);
        assert_eq!(world.ctx.desert_center, 1449.5);
        assert_eq!(world.ctx.jungle_center, 0.0);
    }
}
