// file: `src/system.rs`
use crate::error::{McError, Result};
use crate::pbc::wrap_position;
use nalgebra::Vector3;
use rand::Rng;
use rand_distr::{Distribution, Uniform};

/// Particle configuration in a cubic periodic box.
///
/// Every coordinate component stays in `[-L/2, L/2)`. Only the sampler
/// mutates positions, and it does so one particle at a time.
#[derive(Debug, Clone)]
pub struct SystemState {
    reduced_density: f64,
    box_length: f64,
    coordinates: Vec<Vector3<f64>>,
}

impl SystemState {
    /// Place `n_particles` uniformly at random in a box sized for `reduced_density`
    pub fn random<R: Rng + ?Sized>(
        n_particles: usize,
        reduced_density: f64,
        rng: &mut R,
    ) -> Result<Self> {
        if n_particles == 0 {
            return Err(McError::InvalidConfig(
                "Particle count must be positive".to_string(),
            ));
        }
        if !(reduced_density > 0.0 && reduced_density.is_finite()) {
            return Err(McError::InvalidConfig(
                "Reduced density must be positive".to_string(),
            ));
        }

        let box_length = box_length_for(n_particles, reduced_density);
        let half = 0.5 * box_length;
        let uniform = Uniform::new(-half, half);
        let mut coordinates = Vec::with_capacity(n_particles);
        for _ in 0..n_particles {
            let pos = Vector3::new(
                uniform.sample(&mut *rng),
                uniform.sample(&mut *rng),
                uniform.sample(&mut *rng),
            );
            coordinates.push(wrap_position(&pos, box_length));
        }

        Ok(Self {
            reduced_density,
            box_length,
            coordinates,
        })
    }

    /// Fill the first `n_particles` sites of the smallest simple cubic
    /// lattice that holds them, spread evenly over the box
    pub fn cubic_lattice(n_particles: usize, reduced_density: f64) -> Result<Self> {
        if n_particles == 0 {
            return Err(McError::InvalidConfig(
                "Particle count must be positive".to_string(),
            ));
        }
        if !(reduced_density > 0.0 && reduced_density.is_finite()) {
            return Err(McError::InvalidConfig(
                "Reduced density must be positive".to_string(),
            ));
        }

        let box_length = box_length_for(n_particles, reduced_density);
        let mut n_per_side = 1;
        while n_per_side * n_per_side * n_per_side < n_particles {
            n_per_side += 1;
        }
        let spacing = box_length / n_per_side as f64;
        let origin = -0.5 * box_length + 0.5 * spacing;

        let mut coordinates = Vec::with_capacity(n_particles);
        'fill: for i in 0..n_per_side {
            for j in 0..n_per_side {
                for k in 0..n_per_side {
                    if coordinates.len() == n_particles {
                        break 'fill;
                    }
                    coordinates.push(Vector3::new(
                        origin + i as f64 * spacing,
                        origin + j as f64 * spacing,
                        origin + k as f64 * spacing,
                    ));
                }
            }
        }

        Ok(Self {
            reduced_density,
            box_length,
            coordinates,
        })
    }

    /// Use explicit coordinates; they are wrapped into the box
    pub fn from_coordinates(coordinates: Vec<Vector3<f64>>, box_length: f64) -> Result<Self> {
        if coordinates.is_empty() {
            return Err(McError::InvalidConfig(
                "Particle count must be positive".to_string(),
            ));
        }
        if !(box_length > 0.0 && box_length.is_finite()) {
            return Err(McError::InvalidConfig(
                "Box length must be positive".to_string(),
            ));
        }
        let n = coordinates.len() as f64;
        let coordinates = coordinates
            .iter()
            .map(|p| wrap_position(p, box_length))
            .collect();
        Ok(Self {
            reduced_density: n / box_length.powi(3),
            box_length,
            coordinates,
        })
    }

    pub fn n_particles(&self) -> usize {
        self.coordinates.len()
    }

    pub fn reduced_density(&self) -> f64 {
        self.reduced_density
    }

    pub fn box_length(&self) -> f64 {
        self.box_length
    }

    pub fn coordinates(&self) -> &[Vector3<f64>] {
        &self.coordinates
    }

    pub(crate) fn set_position(&mut self, index: usize, pos: Vector3<f64>) {
        self.coordinates[index] = wrap_position(&pos, self.box_length);
    }
}

/// `L = (N / ρ*)^(1/3)`
pub fn box_length_for(n_particles: usize, reduced_density: f64) -> f64 {
    (n_particles as f64 / reduced_density).cbrt()
}
