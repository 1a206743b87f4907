//! Normal distribution helpers used by the truncated normal sampler.
use std::f32::consts::SQRT_2;

/// Standard normal CDF (Abramowitz & Stegun 7.1.26, absolute error below 1.5e-7).
pub fn normal_cdf(x: f32) -> f32 {
    const A1: f32 = 0.254_829_6;
    const A2: f32 = -0.284_496_74;
    const A3: f32 = 1.421_413_7;
    const A4: f32 = -1.453_152;
    const A5: f32 = 1.061_405_4;
    const P: f32 = 0.327_591_1;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs() / SQRT_2;

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();

    0.5 * (1.0 + sign * y)
}

fn rational_approximation(t: f32) -> f32 {
    // Abramowitz & Stegun 26.2.23, absolute error below 4.5e-4.
    const C: [f32; 3] = [2.515_517, 0.802_853, 0.010_328];
    const D: [f32; 3] = [1.432_788, 0.189_269, 0.001_308];
    t - ((C[2] * t + C[1]) * t + C[0]) / (((D[2] * t + D[1]) * t + D[0]) * t + 1.0)
}

/// Inverse of the standard normal CDF. Returns `None` outside the open interval (0, 1).
pub fn normal_cdf_inverse(p: f32) -> Option<f32> {
    if !(p > 0.0 && p < 1.0) {
        return None;
    }
    Some(if p < 0.5 {
        -rational_approximation((-2.0 * p.ln()).sqrt())
    } else {
        rational_approximation((-2.0 * (1.0 - p).ln()).sqrt())
    })
}

/// Maps a uniform draw `u` in [0, 1] to a normal sample truncated to `[min, max]`.
///
/// The result always lies inside the range, including when the range excludes the mean.
pub fn truncated_normal_sample(u: f32, min: f32, max: f32, mean: f32, std_dev: f32) -> f32 {
    if u <= 0.0 {
        return min;
    }
    if u >= 1.0 {
        return max;
    }
    if std_dev == 0.0 {
        return mean.clamp(min, max);
    }

    let a = normal_cdf((min - mean) / std_dev);
    let b = normal_cdf((max - mean) / std_dev);
    let c = a + u * (b - a);

    match normal_cdf_inverse(c) {
        Some(z) => (z * std_dev + mean).clamp(min, max),
        None if c <= 0.0 => min,
        None => max,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cdf_is_symmetric_around_zero() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-6);
        for x in [0.5f32, 1.0, 2.0, 3.0] {
            assert!((normal_cdf(x) + normal_cdf(-x) - 1.0).abs() < 1e-5);
        }
        assert!((normal_cdf(1.0) - 0.841_344_7).abs() < 1e-4);
    }

    #[test]
    fn inverse_rejects_closed_endpoints() {
        assert!(normal_cdf_inverse(0.0).is_none());
        assert!(normal_cdf_inverse(1.0).is_none());
        assert!(normal_cdf_inverse(f32::NAN).is_none());
    }

    #[test]
    fn inverse_roughly_undoes_cdf() {
        for x in [-2.0f32, -0.5, 0.0, 0.7, 1.5] {
            let back = normal_cdf_inverse(normal_cdf(x)).unwrap();
            assert!((back - x).abs() < 5e-3, "x={x} back={back}");
        }
    }

    #[test]
    fn endpoints_and_zero_deviation_are_handled() {
        assert_eq!(truncated_normal_sample(0.0, -1.0, 1.0, 0.0, 1.0), -1.0);
        assert_eq!(truncated_normal_sample(1.0, -1.0, 1.0, 0.0, 1.0), 1.0);
        assert_eq!(truncated_normal_sample(0.3, -1.0, 1.0, 5.0, 0.0), 1.0);
    }

    #[test]
    fn range_excluding_mean_still_stays_in_range() {
        for i in 1..100 {
            let u = i as f32 / 100.0;
            let v = truncated_normal_sample(u, 10.0, 11.0, 0.0, 1.0);
            assert!((10.0..=11.0).contains(&v), "u={u} v={v}");
        }
    }
}
