use criterion::{criterion_group, criterion_main, Criterion, black_box};

use terrafit::core::types::IVec3;
use terrafit::generation::terrain_scan::{self, ScanKind};
use terrafit::generation::topology;
use terrafit::template::Template;
use terrafit::voxel::{ChunkCoord, GridWorld, Location, Material, WorldId};

fn hills() -> GridWorld {
    let mut world = GridWorld::overworld(1);
    world.load_area(ChunkCoord::new(-2, -2), ChunkCoord::new(2, 2));
    for x in -32..48 {
        for z in -32..48 {
            let top = 64 + ((x as f64 / 9.0).sin() * 3.0) as i32;
            world.fill_column(x, z, -60, top, Material::Stone);
        }
    }
    world
}

fn bench_terrain_scan(c: &mut Criterion) {
    let world = hills();
    let template = Template::solid("keep", IVec3::new(32, 24, 32), IVec3::new(16, 1, 16), Material::StoneBricks)
        .expect("valid template");
    let anchor = Location::new(WorldId(0), 8.0, 65, 8.0);

    for stride in [1, 3] {
        c.bench_function(&format!("terrain_scan_surface_stride_{}", stride), |b| {
            b.iter(|| terrain_scan::scan(black_box(&world), &template, &anchor, stride, ScanKind::Surface))
        });
    }

    c.bench_function("terrain_scan_underground_stride_3", |b| {
        b.iter(|| terrain_scan::scan(black_box(&world), &template, &anchor.with_y(20), 3, ScanKind::Underground))
    });
}

fn bench_topology_scan(c: &mut Criterion) {
    let world = hills();
    let template = Template::solid("keep", IVec3::new(32, 24, 32), IVec3::new(16, 1, 16), Material::StoneBricks)
        .expect("valid template");
    let anchor = Location::new(WorldId(0), 8.0, 65, 8.0);

    c.bench_function("topology_scan_stride_3", |b| {
        b.iter(|| topology::scan(black_box(&world), 100.0, 3, &template, &anchor))
    });
}

criterion_group!(benches, bench_terrain_scan, bench_topology_scan);
criterion_main!(benches);
