//! This example intersects two polygons, checks the result for validity and triangulates it.
//!
//! ```shell
//! RUST_LOG=debug cargo run --example overlay_and_triangulate
//! ```

use anyhow::{anyhow, Result};
use planara::operation::overlay::{OverlayOp, OverlayOpCode};
use planara::operation::valid::IsValidOp;
use planara::triangulate::ConstrainedDelaunayTriangulator;
use planara::types::{Coordinate, Geometry, LinearRing, Polygon};

fn ring(points: &[(f64, f64)]) -> LinearRing {
    LinearRing::new(points.iter().map(|p| Coordinate::from(*p)).collect())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let frame: Geometry = Polygon::new(
        ring(&[(0.0, 0.0), (40.0, 0.0), (40.0, 30.0), (0.0, 30.0), (0.0, 0.0)]),
        vec![ring(&[(5.0, 5.0), (15.0, 5.0), (15.0, 25.0), (5.0, 25.0), (5.0, 5.0)])],
    )
    .into();
    let wedge: Geometry = Polygon::new(
        ring(&[(10.0, -10.0), (60.0, 15.0), (10.0, 40.0), (10.0, -10.0)]),
        vec![],
    )
    .into();

    let intersection = OverlayOp::overlay(&frame, &wedge, OverlayOpCode::Intersection)?;
    log::info!(
        "Intersection: {} with area {:.2}",
        intersection.geometry_type(),
        intersection.area()
    );

    if let Some(err) = IsValidOp::new(&intersection).validation_error()? {
        return Err(anyhow!("overlay produced an invalid geometry: {err}"));
    }

    let triangles = ConstrainedDelaunayTriangulator::new().triangles(&intersection)?;
    let area: f64 = triangles.iter().map(|tri| tri.area()).sum();
    log::info!("Triangulated into {} triangles with area {area:.2}", triangles.len());
    for tri in &triangles {
        let [a, b, c] = tri.coordinates();
        log::debug!("{a} {b} {c}");
    }

    Ok(())
}
