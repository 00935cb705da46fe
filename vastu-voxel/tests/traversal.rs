//! Randomized property checks for grid ray traversal.

use approx::assert_relative_eq;
use rand::prelude::*;
use vastu_voxel::{GridRay, Index3D, Point3D};

const NUM_SEGMENTS: usize = 500;

fn random_point(rng: &mut StdRng, extent: f32) -> Point3D {
    Point3D::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
    )
}

fn random_segment(rng: &mut StdRng) -> (Point3D, Point3D, f32) {
    let start = random_point(rng, 20.0);
    let end = start + random_point(rng, 8.0).coords;
    let cell_width = rng.gen_range(0.05..2.0);
    (start, end, cell_width)
}

#[test]
fn test_endpoints_and_adjacency() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..NUM_SEGMENTS {
        let (start, end, cell_width) = random_segment(&mut rng);
        let cells: Vec<Index3D> = GridRay::new(&start, &end, cell_width).indices().collect();

        let inv = 1.0 / cell_width;
        assert_eq!(cells[0], Index3D::from_point(&start, inv));
        assert_eq!(*cells.last().unwrap(), Index3D::from_point(&end, inv));

        for pair in cells.windows(2) {
            assert_eq!(
                pair[0].chebyshev_distance(&pair[1]),
                1,
                "gap or repeat between {} and {}",
                pair[0],
                pair[1]
            );
        }
    }
}

#[test]
fn test_cell_count_is_bounded() {
    let mut rng = StdRng::seed_from_u64(12);
    for _ in 0..NUM_SEGMENTS {
        let (start, end, cell_width) = random_segment(&mut rng);
        let ray = GridRay::new(&start, &end, cell_width);
        let (_, upper) = ray.size_hint();
        let bound = ray.end_index().manhattan_distance(&Index3D::from_point(&start, 1.0 / cell_width));
        let count = ray.count();
        assert!(count >= 1);
        assert!(count <= bound as usize + 1);
        assert!(count <= upper.unwrap());
    }
}

#[test]
fn test_distances_are_monotonic_and_end_at_length() {
    let mut rng = StdRng::seed_from_u64(13);
    for _ in 0..NUM_SEGMENTS {
        let (start, end, cell_width) = random_segment(&mut rng);
        let ray = GridRay::new(&start, &end, cell_width);
        let length = ray.length();
        let steps: Vec<_> = ray.collect();

        assert_eq!(steps[0].distance, if steps.len() == 1 { length } else { 0.0 });
        for pair in steps.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
        assert_relative_eq!(steps.last().unwrap().distance, (end - start).norm());
    }
}

#[test]
fn test_restartable() {
    let mut rng = StdRng::seed_from_u64(14);
    for _ in 0..50 {
        let (start, end, cell_width) = random_segment(&mut rng);
        let first: Vec<_> = GridRay::new(&start, &end, cell_width).collect();
        let second: Vec<_> = GridRay::new(&start, &end, cell_width).collect();
        assert_eq!(first, second);
    }
}

#[test]
fn test_reverse_direction_visits_same_cells() {
    let mut rng = StdRng::seed_from_u64(15);
    for _ in 0..NUM_SEGMENTS {
        let (start, end, cell_width) = random_segment(&mut rng);
        let forward: Vec<_> = GridRay::new(&start, &end, cell_width).indices().collect();
        let mut backward: Vec<_> = GridRay::new(&end, &start, cell_width).indices().collect();
        backward.reverse();
        assert_eq!(forward, backward);
    }
}

#[test]
fn test_degenerate_segments_yield_one_cell() {
    let mut rng = StdRng::seed_from_u64(16);
    for _ in 0..100 {
        let point = random_point(&mut rng, 50.0);
        let cell_width = rng.gen_range(0.05..2.0);
        let steps: Vec<_> = GridRay::new(&point, &point, cell_width).collect();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].distance, 0.0);
        assert_eq!(steps[0].index, Index3D::from_point(&point, 1.0 / cell_width));
    }
}
