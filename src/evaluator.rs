// file: `src/evaluator.rs`
use crate::energy::EnergyModel;
use crate::error::{McError, Result};
use crate::pbc::minimum_image_distance;
use itertools::Itertools;
use nalgebra::Vector3;

/// Pair-energy sums under the minimum-image convention with a spherical cutoff.
///
/// `total_energy` is O(N²) and meant for initialization and drift checks.
/// The sampler works with `particle_energy_at`, which is O(N).
#[derive(Debug, Clone)]
pub struct EnergyEvaluator {
    model: EnergyModel,
    cutoff: f64,
}

impl EnergyEvaluator {
    pub fn new(model: EnergyModel, cutoff: f64) -> Result<Self> {
        if !(cutoff > 0.0 && cutoff.is_finite()) {
            return Err(McError::InvalidConfig(format!(
                "Cutoff radius must be positive, got {}",
                cutoff
            )));
        }
        Ok(Self { model, cutoff })
    }

    pub fn model(&self) -> &EnergyModel {
        &self.model
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Sum over unordered pairs `i < j` with `d_ij < cutoff`
    pub fn total_energy(&self, coordinates: &[Vector3<f64>], box_length: f64) -> f64 {
        (0..coordinates.len())
            .tuple_combinations::<(usize, usize)>()
            .map(|(i, j)| self.pair_energy(&coordinates[i], &coordinates[j], box_length))
            .sum()
    }

    /// Energy of particle `index` against every other particle
    pub fn particle_energy(
        &self,
        coordinates: &[Vector3<f64>],
        box_length: f64,
        index: usize,
    ) -> f64 {
        self.particle_energy_at(coordinates, box_length, index, &coordinates[index])
    }

    /// Energy particle `index` would have at `position`, all others held fixed.
    ///
    /// Equivalent to `particle_energy` on a copy of `coordinates` with
    /// entry `index` replaced, without materializing the copy.
    pub fn particle_energy_at(
        &self,
        coordinates: &[Vector3<f64>],
        box_length: f64,
        index: usize,
        position: &Vector3<f64>,
    ) -> f64 {
        coordinates
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != index)
            .map(|(_, other)| self.pair_energy(position, other, box_length))
            .sum()
    }

    /// Tail correction for the configured cutoff.
    ///
    /// Zero when fewer than two particles exist, since there is no pair to correct.
    pub fn tail_correction(&self, n_particles: usize, box_length: f64) -> f64 {
        if n_particles < 2 {
            return 0.0;
        }
        self.model
            .cutoff_correction(self.cutoff, n_particles, box_length)
    }

    #[inline]
    fn pair_energy(&self, a: &Vector3<f64>, b: &Vector3<f64>, box_length: f64) -> f64 {
        let r = minimum_image_distance(a, b, box_length);
        if r < self.cutoff {
            self.model.calc_energy(r)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::prelude::*;
    use rand::rngs::StdRng;

    fn random_coords(n: usize, box_length: f64, seed: u64) -> Vec<Vector3<f64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let half = 0.5 * box_length;
        (0..n)
            .map(|_| {
                Vector3::new(
                    rng.gen_range(-half..half),
                    rng.gen_range(-half..half),
                    rng.gen_range(-half..half),
                )
            })
            .collect()
    }

    #[test]
    fn test_rejects_non_positive_cutoff() {
        assert!(EnergyEvaluator::new(EnergyModel::unitless(), 0.0).is_err());
        assert!(EnergyEvaluator::new(EnergyModel::unitless(), -1.0).is_err());
        assert!(EnergyEvaluator::new(EnergyModel::unitless(), f64::NAN).is_err());
    }

    #[test]
    fn test_two_particles() {
        let eval = EnergyEvaluator::new(EnergyModel::unitless(), 3.0).unwrap();
        let l = 10.0;
        let coords = vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.5, 0.0, 0.0)];
        let expected = EnergyModel::unitless().calc_energy(1.5);
        assert_relative_eq!(eval.total_energy(&coords, l), expected, epsilon = 1e-14);
        assert_relative_eq!(eval.particle_energy(&coords, l, 0), expected, epsilon = 1e-14);
        assert_relative_eq!(eval.particle_energy(&coords, l, 1), expected, epsilon = 1e-14);
    }

    #[test]
    fn test_pair_through_boundary() {
        let eval = EnergyEvaluator::new(EnergyModel::unitless(), 2.0).unwrap();
        let coords = vec![Vector3::new(-4.5, 0.0, 0.0), Vector3::new(4.0, 0.0, 0.0)];
        // image separation 1.5 across the x boundary of a 10-box
        let expected = EnergyModel::unitless().calc_energy(1.5);
        assert_relative_eq!(eval.total_energy(&coords, 10.0), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_cutoff_is_strict() {
        let eval = EnergyEvaluator::new(EnergyModel::unitless(), 2.0).unwrap();
        let at_cutoff = vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 0.0, 0.0)];
        assert_eq!(eval.total_energy(&at_cutoff, 10.0), 0.0);
        assert_eq!(eval.particle_energy(&at_cutoff, 10.0, 0), 0.0);

        let inside = vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.999, 0.0, 0.0)];
        assert!(eval.total_energy(&inside, 10.0) < 0.0);
    }

    #[test]
    fn test_particle_energies_sum_to_twice_total() {
        let l = 6.0;
        let coords = random_coords(40, l, 2019);
        let eval = EnergyEvaluator::new(EnergyModel::lennard_jones(1.0, 1.0), 2.5).unwrap();
        let total = eval.total_energy(&coords, l);
        let sum: f64 = (0..coords.len())
            .map(|i| eval.particle_energy(&coords, l, i))
            .sum();
        assert_relative_eq!(sum, 2.0 * total, max_relative = 1e-10);
    }

    #[test]
    fn test_energy_at_matches_replaced_copy() {
        let l = 5.0;
        let coords = random_coords(15, l, 42);
        let eval = EnergyEvaluator::new(EnergyModel::buckingham(0.3, 2.0, 0.5), 2.4).unwrap();
        let trial = Vector3::new(0.1, -2.2, 1.7);

        let mut copy = coords.clone();
        copy[3] = trial;

        assert_eq!(
            eval.particle_energy_at(&coords, l, 3, &trial),
            eval.particle_energy(&copy, l, 3)
        );
    }

    #[test]
    fn test_single_particle_has_no_energy() {
        let eval = EnergyEvaluator::new(EnergyModel::unitless(), 1.0).unwrap();
        let coords = vec![Vector3::new(0.3, 0.2, 0.1)];
        assert_eq!(eval.total_energy(&coords, 3.0), 0.0);
        assert_eq!(eval.particle_energy(&coords, 3.0, 0), 0.0);
    }

    #[test]
    fn test_tail_correction_uses_cutoff() {
        let eval = EnergyEvaluator::new(EnergyModel::unitless(), 1.5).unwrap();
        assert_eq!(
            eval.tail_correction(64, 4.0),
            EnergyModel::unitless().cutoff_correction(1.5, 64, 4.0)
        );
        assert_eq!(eval.tail_correction(1, 4.0), 0.0);
    }
}
