use approx::assert_abs_diff_eq;
use tileset::{plan, Affine, JobPlan, LayerRange, PlanConfig, TileDims, TileRecord, TileSet};

/// Two layers of two 1000x1000 tiles: side by side on z=0, stacked on z=1.
fn four_tiles() -> TileSet {
    let record = |id: i64, z: i32, x: f64, y: f64| TileRecord {
        id,
        z,
        path: format!("/scope/{z}/{id}.tif"),
        transform: Affine::translation(x, y),
    };
    TileSet::from_records(TileDims::new(1000, 1000), [
        record(2, 1, 0.0, 900.0),
        record(1, 0, 900.0, 0.0),
        record(1, 1, 0.0, 0.0),
        record(0, 0, 0.0, 0.0),
    ])
}

#[test]
fn layers_and_overlaps() {
    let mut tiles = four_tiles();
    tiles.sort_by_layer_then_id();
    tiles.init_aux().unwrap();

    let layers = tiles.layers().collect::<Vec<_>>();
    assert_eq!(layers, vec![
        LayerRange { z: 0, start: 0, end: 2 },
        LayerRange { z: 1, start: 2, end: 4 },
    ]);

    for layer in &layers {
        let olap = tiles.overlap(layer.start, layer.start + 1).unwrap();
        assert_abs_diff_eq!(olap, 0.1, epsilon = 2e-3);
        assert_abs_diff_eq!(olap, tiles.overlap(layer.start + 1, layer.start).unwrap(), epsilon = 1e-12);
    }

    // Tiles in different layers are never paired, but their geometry still overlaps.
    assert!(tiles.overlap(0, 2).unwrap() > 0.9);
}

#[test]
fn one_job_per_layer() {
    let mut tiles = four_tiles();
    let config = PlanConfig { block_size: 100, ..Default::default() };
    let mut jobs = JobPlan::new("ptest", vec!["-nf".to_string()]);
    let summary = plan(&mut tiles, &config, &mut jobs).unwrap();

    assert_eq!((summary.layers, summary.tiles, summary.jobs, summary.blocks), (2, 4, 2, 2));

    let z0 = &jobs.layers[0];
    assert_eq!(z0.z, 0);
    assert_eq!(z0.blocks.len(), 1);
    assert_eq!((z0.blocks[0].ix, z0.blocks[0].iy), (0, 0));
    assert_eq!(z0.blocks[0].jobs.len(), 1);
    assert_eq!(z0.blocks[0].jobs[0].invocation, "ptest 0/0@0/1 -nf");

    let z1 = &jobs.layers[1];
    assert_eq!(z1.z, 1);
    assert_eq!(z1.blocks[0].jobs.len(), 1);
    assert_eq!(z1.blocks[0].jobs[0].target, "1/1.2.map.tif");
}

#[test]
fn threshold_excludes_small_overlaps() {
    let mut tiles = four_tiles();
    let config = PlanConfig { min_overlap: 0.2, ..Default::default() };
    let summary = plan(&mut tiles, &config, &mut JobPlan::new("ptest", vec![])).unwrap();
    assert_eq!(summary.jobs, 0);
    assert_eq!(summary.blocks, 0);
}
