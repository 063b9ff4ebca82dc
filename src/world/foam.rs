//! Shoreline extraction
//!
//! Marching squares over `terrain_height - water_level` on a regular grid
//! covering the chunk. Every cell whose corners straddle the water level
//! contributes a segment of the zero contour; each endpoint carries the
//! horizontal direction pointing out over the water.

use glam::Vec2;

use crate::world::terrain::Terrain;

/// Chunks whose sampled height range clears the water by this much in either
/// direction cannot contain a shoreline.
const SHORE_SCAN_MARGIN: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoamSegment {
    pub start: Vec2,
    pub end: Vec2,
    /// Unit xz direction toward open water at `start`
    pub start_normal: Vec2,
    pub end_normal: Vec2,
}

/// Whether a chunk spanning `[min_height, max_height]` needs a foam pass.
pub fn may_have_shoreline(terrain: &Terrain, min_height: f32, max_height: f32) -> bool {
    let water = terrain.settings().zones.water_level;
    min_height <= water + SHORE_SCAN_MARGIN && max_height >= water - SHORE_SCAN_MARGIN
}

/// Appends the water-level contour inside the square starting at
/// `(origin_x, origin_z)` with side `size`.
pub fn extract_shoreline(
    terrain: &Terrain,
    origin_x: f32,
    origin_z: f32,
    size: f32,
    out: &mut Vec<FoamSegment>,
) {
    let spacing = terrain.settings().foam.grid_spacing;
    let water = terrain.settings().zones.water_level;
    if !(spacing > 0.0 && size > 0.0) {
        return;
    }
    let cells = (size / spacing).round().max(1.0) as usize;
    let side = cells + 1;

    let coord = |origin: f32, i: usize| origin + size * i as f32 / cells as f32;

    let mut field = Vec::with_capacity(side * side);
    for iz in 0..side {
        let z = coord(origin_z, iz);
        for ix in 0..side {
            field.push(terrain.terrain_height(coord(origin_x, ix), z) - water);
        }
    }

    for iz in 0..cells {
        for ix in 0..cells {
            let corners = [
                field[iz * side + ix],
                field[iz * side + ix + 1],
                field[(iz + 1) * side + ix],
                field[(iz + 1) * side + ix + 1],
            ];
            let p00 = Vec2::new(coord(origin_x, ix), coord(origin_z, iz));
            let p11 = Vec2::new(coord(origin_x, ix + 1), coord(origin_z, iz + 1));

            for (start, end) in cell_segments(p00, p11, corners).into_iter().flatten() {
                push_segment(terrain, start, end, out);
            }
        }
    }
}

/// Contour pieces of one marching-squares cell spanning `p00..p11`.
///
/// `d` holds the signed corner values in the order 00, 10, 01, 11. Saddles
/// are split by the sign of the cell centre: when it matches corner 00, the
/// 00 and 11 corners are joined and the segments cut off 10 and 01.
pub fn cell_segments(p00: Vec2, p11: Vec2, d: [f32; 4]) -> [Option<(Vec2, Vec2)>; 2] {
    let [d00, d10, d01, d11] = d;
    let p10 = Vec2::new(p11.x, p00.y);
    let p01 = Vec2::new(p00.x, p11.y);

    // Edge order: bottom, right, top, left
    let crossed = [
        edge_crossing(p00, d00, p10, d10),
        edge_crossing(p10, d10, p11, d11),
        edge_crossing(p01, d01, p11, d11),
        edge_crossing(p00, d00, p01, d01),
    ];

    match crossed {
        [Some(bottom), Some(right), Some(top), Some(left)] => {
            let center = (d00 + d10 + d01 + d11) * 0.25;
            if (center < 0.0) == (d00 < 0.0) {
                [Some((bottom, right)), Some((top, left))]
            } else {
                [Some((bottom, left)), Some((right, top))]
            }
        }
        _ => {
            let mut points = crossed.into_iter().flatten();
            match (points.next(), points.next()) {
                (Some(a), Some(b)) => [Some((a, b)), None],
                _ => [None, None],
            }
        }
    }
}

fn edge_crossing(pa: Vec2, a: f32, pb: Vec2, b: f32) -> Option<Vec2> {
    if (a < 0.0) == (b < 0.0) {
        return None;
    }
    let t = a / (a - b);
    Some(pa.lerp(pb, t))
}

fn push_segment(terrain: &Terrain, start: Vec2, end: Vec2, out: &mut Vec<FoamSegment>) {
    out.push(FoamSegment {
        start,
        end,
        start_normal: seaward(terrain, start),
        end_normal: seaward(terrain, end),
    });
}

/// Downhill in xz is toward the water at a shoreline point.
fn seaward(terrain: &Terrain, p: Vec2) -> Vec2 {
    (-terrain.terrain_gradient(p.x, p.y)).normalize_or_zero()
}
