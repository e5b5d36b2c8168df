//! Asteroid belt hanging in the sky near one world edge.

use log::info;

use crate::ids::{BlockId, PaintId};
use crate::point::{Point, Rect};
use crate::random::{hash_point, Random};
use crate::tile::TileFlags;
use crate::world::World;
use crate::zone::{hex_centroid, iterate_zone, Grain};

/// Top row of the field.
const FIELD_TOP: i32 = 40;
/// Field area per asteroid.
const AREA_PER_ASTEROID: i32 = 220;

fn is_air_region(x: i32, y: i32, width: i32, height: i32, world: &World) -> bool {
    world.region_passes(x, y, width, height, |tile| tile.is_empty())
}

/// Find open sky for the field, narrowing the requested width after every
/// miss. Returns the top-left corner; `width` is updated to the midpoint of
/// the requested and accepted widths.
fn select_field_location(width: &mut i32, height: i32, rnd: &mut Random, world: &World) -> Point {
    let mut width_f = f64::from(*width);
    let delta = width_f / 2500.0;
    loop {
        let max_x = ((0.3 * f64::from(world.width()) - width_f) as i32).max(45);
        let mut x = rnd.get_int(40, max_x);
        if rnd.get_bool() {
            x = world.width() - x - width_f as i32;
        }
        let open = is_air_region(
            x + (0.1 * width_f) as i32,
            FIELD_TOP,
            (0.8 * width_f) as i32,
            height,
            world,
        );
        // A non-positive width always passes, so the loop is finite.
        if open || width_f <= 0.0 {
            *width = (*width + width_f as i32) / 2;
            return Point::new(x, FIELD_TOP);
        }
        width_f -= delta;
    }
}

/// Offsets of one asteroid's footprint relative to `(x, y)`.
fn footprint(x: i32, y: i32, radius: f64, grain: Grain, world: &World) -> Vec<(i32, i32)> {
    if grain.is_hex() {
        let scale = (1.2 * radius) as i32;
        let centroid = hex_centroid(x, y, scale);
        let bounds = Rect::new(0, 0, world.width(), world.height());
        return iterate_zone(Point::new(x, y), bounds, |pt| hex_centroid(pt.x, pt.y, scale) == centroid)
            .cells
            .into_iter()
            .map(|pt| (pt.x - centroid.x, pt.y - centroid.y))
            .collect();
    }
    let r = radius as i32;
    (-r..r).flat_map(|i| (-r..r).map(move |j| (i, j))).collect()
}

pub fn gen_asteroid_field(rnd: &mut Random, world: &mut World, grain: Grain) {
    info!("Suspending asteroids");
    let mut width = (world.conf.variation.asteroids * rnd.get_double(0.06, 0.07) * f64::from(world.width())) as i32;
    let height = (rnd.get_double(0.18, 0.21) * f64::from(world.underground_level())) as i32;
    let field = select_field_location(&mut width, height, rnd, world);
    let mut remaining = width * height / AREA_PER_ASTEROID;
    let mut tries = 10 * remaining;
    while remaining > 0 && tries > 0 {
        tries -= 1;
        let radius = rnd.get_double(2.0, 9.0);
        let x = rnd.get_int(field.x + radius as i32, field.x + width - radius as i32);
        let y = rnd.get_int(field.y + radius as i32, field.y + height - radius as i32);
        let center_dist = ((f64::from(field.x) + 0.5 * f64::from(width) - f64::from(x)) / f64::from(width))
            .hypot((f64::from(field.y) + 0.5 * f64::from(height) - f64::from(y)) / f64::from(height));
        let span = (2.0 * radius + 0.5) as i32;
        if (center_dist > 0.48 && hash_point(x, y) % 11 != 0)
            || !is_air_region(x - radius as i32, y - radius as i32, span, span, world)
        {
            continue;
        }
        let paint = rnd.select(&[PaintId::BROWN, PaintId::BLACK]);
        let r = radius as i32;
        for (i, j) in footprint(x, y, radius, grain, world) {
            if f64::from(i).hypot(f64::from(j)) / radius >= 0.6 + 0.6 * rnd.fine(x + i, y + j) {
                continue;
            }
            let vein = rnd.fine(x + i, j + r).abs().min(rnd.fine(i + r, y + j).abs()) < 0.03;
            let tile = world.tile_mut(x + i, y + j);
            tile.block = if vein { BlockId::METEORITE } else { BlockId::STONE };
            tile.block_paint = paint;
        }
        remaining -= 1;
    }
    for i in 0..width {
        for j in 0..height {
            let (x, y) = (field.x + i, field.y + j);
            let block = world.tile(x, y).block;
            if (block == BlockId::STONE || block == BlockId::METEORITE) && world.is_exposed(x, y) {
                world.tile_mut(x, y).flags.set(TileFlags::ACTUATED, true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::test_world;

    fn sky_world() -> World {
        let mut world = test_world(2000, 600);
        for x in 0..2000 {
            for y in 200..600 {
                world.tile_mut(x, y).block = BlockId::DIRT;
            }
        }
        world
    }

    #[test]
    fn test_field_location_in_open_sky() {
        let world = sky_world();
        let mut rnd = Random::new(3);
        let mut width = 130;
        let corner = select_field_location(&mut width, 30, &mut rnd, &world);
        assert_eq!(corner.y, FIELD_TOP);
        assert_eq!(width, 130);
        assert!(corner.x < 600 || corner.x > 1400 - 130);
    }

    #[test]
    fn test_hex_footprint_is_one_cell() {
        let world = sky_world();
        let cells = footprint(100, 100, 5.0, Grain::Hex(12), &world);
        assert!(!cells.is_empty());
        assert!(cells.iter().all(|&(i, j)| i.abs() <= 8 && j.abs() <= 8));
        assert_eq!(footprint(100, 100, 5.0, Grain::Pixel, &world).len(), 100);
    }

    #[test]
    fn test_gen_asteroid_field_places_actuated_rock() {
        let mut world = sky_world();
        let mut rnd = Random::new(17);
        rnd.init_noise(2000, 600, 0.07);
        gen_asteroid_field(&mut rnd, &mut world, Grain::Pixel);
        let rocks: Vec<_> = Rect::new(0, 0, 2000, 200)
            .points()
            .filter(|&pt| world.tile_at(pt).block == BlockId::STONE || world.tile_at(pt).block == BlockId::METEORITE)
            .collect();
        assert!(!rocks.is_empty());
        assert!(rocks.iter().any(|&pt| world.tile_at(pt).flags.contains(TileFlags::ACTUATED)));
    }
}
