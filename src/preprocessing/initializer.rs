//! Vector initializers for new vocabulary entries

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal as NormalDist};

use crate::error::{Error, Result};

/// Produces the embedding vector of a newly inserted token
pub trait Initializer {
    /// Vector of length `dim`
    fn initialize(&mut self, dim: usize) -> Array1<f32>;
}

impl<F> Initializer for F
where
    F: FnMut(usize) -> Array1<f32>,
{
    fn initialize(&mut self, dim: usize) -> Array1<f32> {
        self(dim)
    }
}

fn check_scale(scale: f32) -> Result<f32> {
    if scale.is_finite() && scale >= 0.0 {
        Ok(scale)
    } else {
        Err(Error::Config(format!("initializer scale must be finite and non-negative, got {scale}")))
    }
}

/// Uniform samples in `[-scale, scale]`
#[derive(Debug, Clone)]
pub struct Uniform {
    scale: f32,
    rng: StdRng,
}

impl Uniform {
    /// Uniform initializer seeded from the OS
    pub fn new(scale: f32) -> Result<Self> {
        Ok(Self { scale: check_scale(scale)?, rng: StdRng::from_os_rng() })
    }

    /// Reproducible uniform initializer
    pub fn seeded(scale: f32, seed: u64) -> Result<Self> {
        Ok(Self { scale: check_scale(scale)?, rng: StdRng::seed_from_u64(seed) })
    }

    /// Half-width of the sampling interval
    pub fn scale(&self) -> f32 {
        self.scale
    }
}

impl Default for Uniform {
    /// `[-1, 1]`
    fn default() -> Self {
        Self { scale: 1.0, rng: StdRng::from_os_rng() }
    }
}

impl Initializer for Uniform {
    fn initialize(&mut self, dim: usize) -> Array1<f32> {
        let scale = self.scale;
        Array1::from_shape_fn(dim, |_| self.rng.random_range(-scale..=scale))
    }
}

/// Gaussian samples with mean 0 and standard deviation `scale`
#[derive(Debug, Clone)]
pub struct Normal {
    dist: NormalDist<f32>,
    rng: StdRng,
}

impl Normal {
    /// Gaussian initializer seeded from the OS
    pub fn new(scale: f32) -> Result<Self> {
        Self::with_rng(scale, StdRng::from_os_rng())
    }

    /// Reproducible Gaussian initializer
    pub fn seeded(scale: f32, seed: u64) -> Result<Self> {
        Self::with_rng(scale, StdRng::seed_from_u64(seed))
    }

    fn with_rng(scale: f32, rng: StdRng) -> Result<Self> {
        let dist = NormalDist::new(0.0, check_scale(scale)?)
            .map_err(|e| Error::Config(format!("invalid normal initializer: {e}")))?;
        Ok(Self { dist, rng })
    }
}

impl Initializer for Normal {
    fn initialize(&mut self, dim: usize) -> Array1<f32> {
        Array1::from_shape_fn(dim, |_| self.dist.sample(&mut self.rng))
    }
}

/// All-zero vectors
#[derive(Debug, Clone, Copy, Default)]
pub struct Zeros;

impl Initializer for Zeros {
    fn initialize(&mut self, dim: usize) -> Array1<f32> {
        Array1::zeros(dim)
    }
}
