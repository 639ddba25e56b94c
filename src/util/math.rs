use glam::DVec2;

/// Squared euclidean distance. Preferred in hot loops (no sqrt).
#[inline]
pub fn distance_squared(a: DVec2, b: DVec2) -> f64 {
    let d = b - a;
    d.x * d.x + d.y * d.y
}

#[inline]
pub fn distance(a: DVec2, b: DVec2) -> f64 {
    distance_squared(a, b).sqrt()
}

/// Rescale `v` down to `max_len` if it is longer. Never amplifies.
#[inline]
pub fn clamp_length(v: DVec2, max_len: f64) -> DVec2 {
    let max_len = max_len.max(0.0);
    let len = v.x.hypot(v.y);
    if len > max_len {
        v / len * max_len
    } else {
        v
    }
}
