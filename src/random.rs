// Random draws shared by bolts, particles and the spawner

use ::rand as external_rand;
use external_rand::Rng;

/// Normally distributed sample using the polar (Marsaglia) method.
///
/// Two uniform variates in (-1, 1) are drawn until they land strictly inside
/// the unit circle and off the origin. A zero `stddev` returns `mean` exactly
/// and leaves the generator untouched.
pub fn gaussian<R: Rng + ?Sized>(rng: &mut R, mean: f32, stddev: f32) -> f32 {
    if stddev == 0.0 {
        return mean;
    }
    loop {
        let v1: f32 = 2.0 * rng.gen::<f32>() - 1.0;
        let v2: f32 = 2.0 * rng.gen::<f32>() - 1.0;
        let s = v1 * v1 + v2 * v2;
        if s >= 1.0 || s == 0.0 {
            continue;
        }
        let factor = (-2.0 * s.ln() / s).sqrt();
        return mean + v1 * factor * stddev;
    }
}

/// Bernoulli trial; `p <= 0` never fires and `p >= 1` always does.
pub fn chance<R: Rng + ?Sized>(rng: &mut R, p: f32) -> bool {
    rng.gen_bool(f64::from(p.clamp(0.0, 1.0)))
}

/// Uniform draw in `[lo, hi]`, tolerating `lo == hi`.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if lo >= hi {
        return lo;
    }
    rng.gen_range(lo..=hi)
}
