//! # Determinism Integration Test
//!
//! Same seed, same world: height, ground cells and tree placement never
//! depend on when or how often a range is generated.

use std::collections::BTreeMap;

use verdant_core::Scene;
use verdant_procedural::{
    Behaviour, ColumnSpan, FoliageConfig, HeightField, HeightNoise, LayerConfig, LeafConfig, TerrainConfig,
    TerrainGenerator, TreePlanter, ViewportConfig, WorldSeed,
};

fn terrain(seed: u64) -> TerrainGenerator {
    TerrainGenerator::new(
        WorldSeed::new(seed),
        &ViewportConfig::default(),
        &TerrainConfig::default(),
        LayerConfig::default(),
    )
}

fn planter(seed: u64) -> TreePlanter {
    TreePlanter::new(
        WorldSeed::new(seed),
        FoliageConfig::default(),
        LeafConfig::default(),
        LayerConfig::default(),
    )
}

/// (x bits, y bits, tag) -> count
fn placements(scene: &Scene<Behaviour>) -> BTreeMap<(u32, u32, &'static str), usize> {
    let mut multiset = BTreeMap::new();
    for (_, _, object) in scene.iter() {
        let key = (
            object.body.top_left.x.to_bits(),
            object.body.top_left.y.to_bits(),
            object.tag.name(),
        );
        *multiset.entry(key).or_insert(0) += 1;
    }
    multiset
}

/// Test: height is stable across calls and across independent instances.
#[test]
fn test_height_is_deterministic() {
    let a = HeightNoise::new(WorldSeed::new(2024), 600.0, 1600.0);
    let b = HeightNoise::new(WorldSeed::new(2024), 600.0, 1600.0);

    for i in -5_000..5_000 {
        let x = i as f32 * 3.7;
        let first = a.height_at(x);
        assert_eq!(first.to_bits(), a.height_at(x).to_bits(), "repeat call differs at {x}");
        assert_eq!(first.to_bits(), b.height_at(x).to_bits(), "instances differ at {x}");
    }
}

/// Test: terrain for [0, 300) regenerates to the identical multiset of (position, tag).
#[test]
fn test_terrain_regeneration_is_idempotent() {
    let first = {
        let mut scene: Scene<Behaviour> = Scene::new();
        terrain(100).generate_range(0.0, 299.0, &mut scene);
        placements(&scene)
    };

    // a brand new generator, as after a full eviction
    let second = {
        let mut scene: Scene<Behaviour> = Scene::new();
        terrain(100).generate_range(0.0, 299.0, &mut scene);
        placements(&scene)
    };

    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert!(first.values().all(|&count| count == 1));
}

/// Test: generating a range in pieces yields the same cells as in one go.
#[test]
fn test_terrain_pieces_match_whole() {
    let generator = terrain(7);

    let mut whole: Scene<Behaviour> = Scene::new();
    generator.generate_span(ColumnSpan::new(-40, 40), &mut whole);

    let mut pieces: Scene<Behaviour> = Scene::new();
    generator.generate_span(ColumnSpan::new(11, 40), &mut pieces);
    generator.generate_span(ColumnSpan::new(-40, -1), &mut pieces);
    generator.generate_span(ColumnSpan::new(0, 10), &mut pieces);

    assert_eq!(placements(&whole), placements(&pieces));
}

/// Test: tree columns in [-1000, 1000) are the same across independent passes.
#[test]
fn test_tree_columns_are_reproducible() {
    let heights = terrain(100);
    let span = ColumnSpan::within(-1000.0, 999.0);

    let first: Vec<i64> = planter(100).tree_columns(span, &heights).collect();
    let second: Vec<i64> = planter(100).tree_columns(span, &heights).collect();

    assert_eq!(first, second);
    assert!(!first.is_empty());

    let mut first_scene: Scene<Behaviour> = Scene::new();
    planter(100).plant_span(span, &heights, &mut first_scene);
    let mut second_scene: Scene<Behaviour> = Scene::new();
    planter(100).plant_span(span, &heights, &mut second_scene);
    assert_eq!(placements(&first_scene), placements(&second_scene));
}

/// Test: about one column in ten grows a tree.
#[test]
fn test_tree_density() {
    let heights = |_x: f32| 600.0_f32;

    for seed in [0, 100, 31_337] {
        let trees = planter(seed)
            .tree_columns(ColumnSpan::new(0, 9_999), &heights)
            .count();

        println!("seed {seed}: {trees} trees in 10,000 columns");
        assert!(
            (900..=1100).contains(&trees),
            "seed {seed}: {trees} trees in 10,000 columns"
        );
    }
}

/// Test: another seed grows a different forest.
#[test]
fn test_seed_changes_forest() {
    let heights = |_x: f32| 600.0_f32;
    let span = ColumnSpan::new(0, 999);

    let a: Vec<i64> = planter(1).tree_columns(span, &heights).collect();
    let b: Vec<i64> = planter(2).tree_columns(span, &heights).collect();

    assert_ne!(a, b);
}
