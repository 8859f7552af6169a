//! Example: Generate a terrain map
//!
//! Run with `RUST_LOG=debug` to see per-round relaxation timings.

use tracing_subscriber::EnvFilter;
use voronoi_terrain_map::mesh::{border_overlay, hull_overlay, triangulation_overlay};
use voronoi_terrain_map::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("Voronoi Terrain Map Example");
    println!("===========================\n");

    // Seeds are drawn at random unless set; print them so the map can be reproduced
    let config = MapConfigBuilder::new()
        .site_count(1000)?
        .domain_side(900)?
        .zoom_scale(4.0)?
        .relaxation_rounds(2)
        .build()?;

    println!("Configuration:");
    println!("  Sites requested: {}", config.site_count);
    println!("  Domain side: {}", config.domain_side);
    println!("  Zoom scale: {}", config.zoom_scale);
    println!("  Relaxation rounds: {}", config.relaxation_rounds);
    println!("  Elevation seed: {}", config.elevation_seed);
    println!("  Moisture seed: {}", config.moisture_seed);
    println!();

    let map = Map::generate(config)?;

    println!("Statistics:");
    println!("  Regions: {}", map.num_regions());
    println!("  Triangles: {}", map.num_triangles());
    println!("  Edges: {}", map.num_edges());
    println!("  Hull edges: {}", map.hull_edges().len());

    let water = map
        .cells()
        .iter()
        .filter(|c| config.biome.is_water(c.elevation))
        .count();
    let pct = water as f64 / map.cell_count() as f64 * 100.0;
    println!("  Water cells: {} ({:.1}%)", water, pct);

    let total_neighbors: usize = map.cells().iter().map(|c| c.neighbor_count()).sum();
    println!(
        "  Average neighbors per cell: {:.2}",
        total_neighbors as f64 / map.cell_count() as f64
    );
    println!();

    println!("Sample cells:");
    for cell in map.cells().iter().take(5) {
        println!(
            "  Cell {}: center=({:.1}, {:.1}), elevation={:.3}, moisture={:.3}, color={:?}",
            cell.index, cell.center.x, cell.center.y, cell.elevation, cell.moisture, cell.color
        );
    }

    #[cfg(feature = "spatial-index")]
    {
        let middle = DVec2::splat(config.domain_side as f64 / 2.0);
        if let Some(index) = map.find_cell_at(middle) {
            println!("\nDomain center lies in cell {} ({} neighbors)", index, map.neighbors(index).len());
        }
    }

    let mesh = generate_mesh(&map);
    println!("\nMesh: {} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count());
    println!(
        "Overlays: {} triangulation edges, {} hull edges, {} border segments",
        triangulation_overlay(&map).len(),
        hull_overlay(&map).len(),
        border_overlay(&map).len()
    );

    println!("\nReproduce with elevation seed {} and moisture seed {}", map.elevation_seed(), map.moisture_seed());

    Ok(())
}
