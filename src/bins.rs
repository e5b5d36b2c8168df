//! Spatially bucketed candidate locations
//!
//! The treasure pass scans the world once for flat floor spots and files
//! them into 128x128 buckets. Later passes draw a random bucket and then a
//! random point inside it, which spreads placements evenly over the map
//! without rescanning.

use std::collections::BTreeMap;

use crate::point::Point;
use crate::random::Random;

const BIN_SIZE: i32 = 128;

/// Bucket id of a coordinate in a world `max_y` tiles tall.
pub fn bin_location(x: i32, y: i32, max_y: i32) -> i32 {
    (x / BIN_SIZE) * (max_y / BIN_SIZE) + y / BIN_SIZE
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocationBins {
    bins: BTreeMap<i32, Vec<Point>>,
}

impl LocationBins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pt: Point, max_y: i32) {
        self.bins
            .entry(bin_location(pt.x, pt.y, max_y))
            .or_default()
            .push(pt);
    }

    pub fn bin(&self, id: i32) -> &[Point] {
        self.bins.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.bins.values().all(Vec::is_empty)
    }

    pub fn len(&self) -> usize {
        self.bins.values().map(Vec::len).sum()
    }

    /// Draw a bucket uniformly from `0..=max_bin`, then a point inside it.
    /// `None` when the drawn bucket is empty.
    pub fn sample(&self, max_bin: i32, rnd: &mut Random) -> Option<Point> {
        let bin = self.bin(rnd.get_int(0, max_bin));
        if bin.is_empty() {
            return None;
        }
        Some(rnd.select(bin))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.bins.values().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_location_buckets() {
        assert_eq!(bin_location(0, 0, 1200), 0);
        assert_eq!(bin_location(127, 127, 1200), 0);
        assert_eq!(bin_location(0, 128, 1200), 1);
        assert_eq!(bin_location(128, 0, 1200), 9);
    }

    #[test]
    fn test_sample_only_returns_stored_points() {
        let mut bins = LocationBins::new();
        bins.insert(Point::new(10, 10), 1200);
        bins.insert(Point::new(300, 500), 1200);
        assert_eq!(bins.len(), 2);
        let mut rnd = Random::new(5);
        let mut hits = 0;
        for _ in 0..200 {
            if let Some(pt) = bins.sample(bin_location(300, 500, 1200), &mut rnd) {
                assert!(pt == Point::new(10, 10) || pt == Point::new(300, 500));
                hits += 1;
            }
        }
        assert!(hits > 0);
    }
}
