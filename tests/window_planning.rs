//! Integration tests for correlation window planning and coordinate-frame
//! translation, including randomized property checks.

use disprefine::{
    disparity_range, globalize, localize, plan_windows, Disparity, Region, Tile, Vec2i,
};
use rand::Rng;

fn random_disparity_tile(rng: &mut impl Rng, region: Region) -> Tile<Disparity> {
    let mut data = Vec::with_capacity(region.area());
    for _ in 0..region.area() {
        if rng.random_bool(0.3) {
            data.push(Disparity::missing());
        } else {
            data.push(Disparity::new(
                rng.random_range(-12..=12) as f32,
                rng.random_range(-4..=4) as f32,
            ));
        }
    }
    Tile::from_vec(region, data).unwrap()
}

#[test]
fn crop_sizes_always_agree() {
    let mut rng = rand::rng();
    for _ in 0..200 {
        let origin = Vec2i::new(rng.random_range(-50..50), rng.random_range(-50..50));
        let size = Vec2i::new(rng.random_range(1..40), rng.random_range(1..40));
        let tile = random_disparity_tile(&mut rng, Region::from_size(origin, size));
        let half = Vec2i::new(rng.random_range(1..8), rng.random_range(1..8));

        let plan = plan_windows(&tile, half);
        assert_eq!(plan.left_crop.size(), plan.right_crop.size());
        assert_eq!(plan.left_crop.min(), origin - half);
    }
}

#[test]
fn right_crop_reaches_every_seeded_offset() {
    let mut rng = rand::rng();
    for _ in 0..100 {
        let region = Region::from_size(Vec2i::new(7, 3), Vec2i::new(12, 9));
        let tile = random_disparity_tile(&mut rng, region);
        let plan = plan_windows(&tile, Vec2i::new(2, 2));

        for y in region.min().y..region.max().y {
            for x in region.min().x..region.max().x {
                let d = tile.at(x, y);
                if d.is_missing() {
                    continue;
                }
                let target = Vec2i::new(x + d.h() as i32, y + d.v() as i32);
                assert!(
                    plan.right_crop.contains(target),
                    "{target:?} outside {:?}",
                    plan.right_crop
                );
            }
        }
    }
}

#[test]
fn search_range_of_all_missing_is_the_origin_cell() {
    let tile = Tile::filled(
        Region::from_size(Vec2i::ZERO, Vec2i::new(6, 6)),
        Disparity::missing(),
    )
    .unwrap();
    let (range, valid) = disparity_range(&tile);
    assert_eq!(valid, 0);
    assert_eq!(range, Region::from_size(Vec2i::ZERO, Vec2i::new(1, 1)));
}

#[test]
fn translation_round_trips_bit_exactly() {
    let mut rng = rand::rng();
    for _ in 0..100 {
        let region = Region::from_size(Vec2i::new(-3, 5), Vec2i::new(9, 7));
        let tile = random_disparity_tile(&mut rng, region);
        let origin = Vec2i::new(rng.random_range(-20..20), rng.random_range(-20..20));

        let mut translated = tile.clone();
        localize(&mut translated, origin);
        globalize(&mut translated, origin);

        for (got, want) in translated.data().iter().zip(tile.data().iter()) {
            assert_eq!(got.is_missing(), want.is_missing());
            if !want.is_missing() {
                // Integer-valued offsets shifted by integers restore exactly.
                assert_eq!(got.h().to_bits(), want.h().to_bits());
                assert_eq!(got.v().to_bits(), want.v().to_bits());
            }
        }
    }
}

#[test]
fn localize_skips_missing_entries() {
    let region = Region::from_size(Vec2i::ZERO, Vec2i::new(2, 1));
    let mut tile = Tile::from_vec(
        region,
        vec![Disparity::new(6.0, -1.0), Disparity::missing()],
    )
    .unwrap();

    localize(&mut tile, Vec2i::new(4, -2));
    assert_eq!(tile.rel(0, 0), Disparity::new(2.0, 1.0));
    assert!(tile.rel(1, 0).is_missing());
}
