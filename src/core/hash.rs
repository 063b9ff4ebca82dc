//! Coordinate hashes used to derive placement attributes.
//!
//! These mappings are part of the world's identity: changing any constant
//! here changes which flower colour, rock rotation or tree type appears at a
//! given spot. Treat them as fixed.

/// `fract(sin(x·a + z·b) · 43758.5453)`, in [0, 1).
pub fn sin_hash(x: f32, z: f32, a: f64, b: f64) -> f64 {
    let v = ((x as f64) * a + (z as f64) * b).sin() * 43758.5453;
    v - v.floor()
}

/// Tree model index from the density that admitted the tree.
pub fn tree_type(density: f32, types: u32) -> u32 {
    ((density * 30.0).floor() as i64).unsigned_abs() as u32 % types.max(1)
}

/// Flower palette index from the jittered position.
pub fn flower_color_index(x: f32, z: f32, colors: u32) -> u32 {
    (((x * 7.7 + z * 3.3) * 100.0).floor() as i64).unsigned_abs() as u32 % colors.max(1)
}

/// Rotation seed for rocks and logs; consumers take it modulo a full turn.
pub fn rotation_seed(x: f32, z: f32) -> f32 {
    x * 17.3 + z * 11.7
}

/// Stable 32-bit seed for procedurally authored objects (cottages).
pub fn object_seed(x: f32, z: f32) -> u32 {
    (sin_hash(x, z, 12.9898, 78.233) * u32::MAX as f64) as u32
}

/// Small per-anchor count in `0..=max`, used for tuft and garden clusters.
pub fn cluster_count(x: f32, z: f32, max: u32) -> u32 {
    (sin_hash(x, z, 91.7, 37.3) * (max as f64 + 1.0)).floor() as u32
}
