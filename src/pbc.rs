// file: `src/pbc.rs`
//! Periodic boundary helpers for a cubic box centred on the origin.
//!
//! Coordinates live in `[-L/2, L/2)`. The minimum-image displacement uses
//! `f64::round`, which rounds half-way cases away from zero; a separation of
//! exactly `L/2` along an axis therefore maps to `-L/2` (or `+L/2` for a
//! negative separation). Both images have the same length, so distances are
//! unaffected by the tie rule.
use nalgebra::Vector3;

/// Minimum-image displacement `r_i - r_j`
#[inline]
pub fn minimum_image(r_i: &Vector3<f64>, r_j: &Vector3<f64>, box_length: f64) -> Vector3<f64> {
    let mut d = r_i - r_j;
    for k in 0..3 {
        d[k] -= box_length * (d[k] / box_length).round();
    }
    d
}

/// Euclidean length of the minimum-image displacement
#[inline]
pub fn minimum_image_distance(r_i: &Vector3<f64>, r_j: &Vector3<f64>, box_length: f64) -> f64 {
    minimum_image(r_i, r_j, box_length).norm()
}

/// Wrap a single component back into `[-L/2, L/2)`
#[inline]
pub fn wrap_coordinate(x: f64, box_length: f64) -> f64 {
    let half = 0.5 * box_length;
    let wrapped = x - box_length * (x / box_length + 0.5).floor();
    // rounding in x/L + 0.5 can push the result one box past either edge
    if wrapped >= half {
        wrapped - box_length
    } else if wrapped < -half {
        wrapped + box_length
    } else {
        wrapped
    }
}

#[inline]
pub fn wrap_position(pos: &Vector3<f64>, box_length: f64) -> Vector3<f64> {
    pos.map(|x| wrap_coordinate(x, box_length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::prelude::*;

    fn random_point(rng: &mut StdRng, bound: f64) -> Vector3<f64> {
        Vector3::new(
            rng.gen_range(-bound..bound),
            rng.gen_range(-bound..bound),
            rng.gen_range(-bound..bound),
        )
    }

    #[test]
    fn test_minimum_image_within_half_box() {
        let l = 10.0;
        let a = Vector3::new(4.5, 0.0, 0.0);
        let b = Vector3::new(-4.5, 0.0, 0.0);
        // direct separation 9, image separation 1
        assert_relative_eq!(minimum_image_distance(&a, &b, l), 1.0, epsilon = 1e-12);
        let d = minimum_image(&a, &b, l);
        assert_relative_eq!(d.x, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_minimum_image_tie_rounds_away_from_zero() {
        let l = 4.0;
        let a = Vector3::new(1.0, 0.0, 0.0);
        let b = Vector3::new(-1.0, 0.0, 0.0);
        assert_eq!(minimum_image(&a, &b, l).x, -2.0);
        assert_eq!(minimum_image(&b, &a, l).x, 2.0);
        assert_eq!(minimum_image_distance(&a, &b, l), 2.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let mut rng = StdRng::seed_from_u64(7);
        let l = 6.3;
        for _ in 0..200 {
            let a = random_point(&mut rng, 9.0);
            let b = random_point(&mut rng, 9.0);
            assert_eq!(
                minimum_image_distance(&a, &b, l),
                minimum_image_distance(&b, &a, l)
            );
        }
    }

    #[test]
    fn test_distance_invariant_under_lattice_translation() {
        let mut rng = StdRng::seed_from_u64(11);
        let l = 5.0;
        for _ in 0..200 {
            let a = random_point(&mut rng, 2.5);
            let b = random_point(&mut rng, 2.5);
            let shift_a = Vector3::new(
                rng.gen_range(-3..=3) as f64,
                rng.gen_range(-3..=3) as f64,
                rng.gen_range(-3..=3) as f64,
            ) * l;
            let shift_b = Vector3::new(
                rng.gen_range(-3..=3) as f64,
                rng.gen_range(-3..=3) as f64,
                rng.gen_range(-3..=3) as f64,
            ) * l;
            let base = minimum_image_distance(&a, &b, l);
            assert_relative_eq!(
                minimum_image_distance(&(a + shift_a), &(b + shift_b), l),
                base,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_wrap_into_half_open_box() {
        let l = 10.0;
        assert_eq!(wrap_coordinate(5.0, l), -5.0);
        assert_eq!(wrap_coordinate(-5.0, l), -5.0);
        assert_relative_eq!(wrap_coordinate(7.0, l), -3.0, epsilon = 1e-12);
        assert_relative_eq!(wrap_coordinate(-13.0, l), -3.0, epsilon = 1e-12);
        assert_eq!(wrap_coordinate(1.25, l), 1.25);

        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let x = rng.gen_range(-50.0..50.0);
            let w = wrap_coordinate(x, l);
            assert!((-5.0..5.0).contains(&w), "{} wrapped to {}", x, w);
        }
    }

    #[test]
    fn test_wrap_near_box_edges_stays_inside() {
        for l in [1.0, 3.0, 8.22, 10.0, 4.309] {
            let half = 0.5_f64 * l;
            let mut below_top = half;
            let mut above_bottom = -half;
            for _ in 0..64 {
                // one ulp inward from each edge per iteration
                below_top = f64::from_bits(below_top.to_bits() - 1);
                above_bottom = f64::from_bits(above_bottom.to_bits() - 1);
                for x in [below_top, above_bottom, below_top + l, above_bottom - l] {
                    let w = wrap_coordinate(x, l);
                    assert!(w >= -half && w < half, "L={} x={} wrapped to {}", l, x, w);
                }
            }
        }
        // the case that used to fall below -L/2
        let w = wrap_coordinate(1.4999999999999998, 3.0);
        assert!((-1.5..1.5).contains(&w), "wrapped to {}", w);
    }

    #[test]
    fn test_wrap_position_componentwise() {
        let wrapped = wrap_position(&Vector3::new(12.0, -3.0, 15.0), 10.0);
        assert_relative_eq!(wrapped, Vector3::new(2.0, -3.0, -5.0), epsilon = 1e-12);
    }
}
