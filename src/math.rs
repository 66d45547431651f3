//! Vector, rotation and easing helpers.
//!
//! Thin layer over [`glam`] for the handful of operations the generators and
//! the camera share. Everything here is a pure function.
//!
//! # Axes
//!
//! World space uses x to the right, y pointing *down* and z going into the
//! screen. "Up" for a landmark is therefore `-y`.

use glam::{Vec2, Vec3};

/// Rotate `v` in the X-Z plane (yaw) by `angle` radians.
///
/// `x' = x·cos − z·sin`, `z' = x·sin + z·cos`; y is untouched.
#[inline]
pub fn rotate_xz(v: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    rotate_xz_cached(v, sin, cos)
}

/// [`rotate_xz`] with a precomputed sine/cosine pair.
#[inline]
pub fn rotate_xz_cached(v: Vec3, sin: f32, cos: f32) -> Vec3 {
    Vec3::new(v.x * cos - v.z * sin, v.y, v.x * sin + v.z * cos)
}

/// Rotate `p` about `pivot` by `angle` radians in screen space.
#[inline]
pub fn rotate_about(p: Vec2, pivot: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    rotate_about_cached(p, pivot, sin, cos)
}

/// [`rotate_about`] with a precomputed sine/cosine pair.
#[inline]
pub fn rotate_about_cached(p: Vec2, pivot: Vec2, sin: f32, cos: f32) -> Vec2 {
    let d = p - pivot;
    pivot + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

/// Rotate `v` about the X axis.
#[inline]
pub fn rotate_yz(v: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(v.x, v.y * cos - v.z * sin, v.y * sin + v.z * cos)
}

/// Rotate `v` about the Z axis.
#[inline]
pub fn rotate_xy(v: Vec3, angle: f32) -> Vec3 {
    let (sin, cos) = angle.sin_cos();
    Vec3::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos, v.z)
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Where `v` sits between `a` and `b`, clamped to `[0, 1]`.
///
/// Returns 0 for an empty range.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        return 0.0;
    }
    clamp01((v - a) / (b - a))
}

/// Clamp to `[0, 1]`, mapping NaN to 0.
#[inline]
pub fn clamp01(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

/// Cubic ease-in-out on `[0, 1]`.
#[inline]
pub fn ease_in_out_cubic(t: f32) -> f32 {
    let t = clamp01(t);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// Cubic ease-out on `[0, 1]`.
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = clamp01(t);
    1.0 - (1.0 - t).powi(3)
}

/// Snap a coordinate down to the pixel grid: `floor(v / grid) * grid`.
///
/// A non-positive grid leaves the value unchanged.
#[inline]
pub fn snap_to_grid(v: f32, grid: f32) -> f32 {
    if grid <= 0.0 {
        v
    } else {
        (v / grid).floor() * grid
    }
}

/// True when every component is finite.
#[inline]
pub fn is_finite3(v: Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

/// Point `i` of `n` on a Fibonacci sphere of unit radius.
///
/// Gives an even spread without poles bunching up.
pub fn fibonacci_sphere(i: u32, n: u32) -> Vec3 {
    let n = n.max(1) as f32;
    let golden = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
    let y = if n <= 1.0 {
        0.0
    } else {
        1.0 - (i as f32 / (n - 1.0)) * 2.0
    };
    let radius = (1.0 - y * y).max(0.0).sqrt();
    let theta = golden * i as f32;
    Vec3::new(theta.cos() * radius, y, theta.sin() * radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_rotate_xz_quarter_turn() {
        let v = rotate_xz(Vec3::new(1.0, 5.0, 0.0), FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert_eq!(v.y, 5.0);
        assert!((v.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rotate_about_pivot_is_fixed() {
        let pivot = Vec2::new(10.0, 20.0);
        let p = rotate_about(pivot, pivot, 1.3);
        assert!((p - pivot).length() < 1e-5);

        let q = rotate_about(Vec2::new(11.0, 20.0), pivot, PI);
        assert!((q - Vec2::new(9.0, 20.0)).length() < 1e-5);
    }

    #[test]
    fn test_snap_to_grid_floors() {
        assert_eq!(snap_to_grid(5.9, 2.0), 4.0);
        assert_eq!(snap_to_grid(-0.5, 2.0), -2.0);
        assert_eq!(snap_to_grid(6.0, 2.0), 6.0);
        assert_eq!(snap_to_grid(3.3, 0.0), 3.3);
    }

    #[test]
    fn test_easing_endpoints() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-6);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(clamp01(f32::NAN), 0.0);
    }

    #[test]
    fn test_inverse_lerp_empty_range() {
        assert_eq!(inverse_lerp(2.0, 2.0, 5.0), 0.0);
        assert!((inverse_lerp(0.0, 4.0, 1.0) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_fibonacci_sphere_unit_length() {
        for i in 0..50 {
            let p = fibonacci_sphere(i, 50);
            assert!((p.length() - 1.0).abs() < 1e-4);
        }
    }
}
