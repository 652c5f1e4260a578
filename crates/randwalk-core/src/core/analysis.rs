use super::random::RandomNumberKind;
use nalgebra::{Point2, Vector2};

/// Ensemble statistics of particle displacement from the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffusionSummary {
    pub particle_count: usize,
    pub steps: u64,
    pub centroid: Point2<f64>,
    pub mean_squared_displacement: f64,
    pub rms_displacement: f64,
    pub max_displacement: f64,
}

impl DiffusionSummary {
    pub fn from_positions<I>(positions: I, steps: u64) -> Self
    where
        I: IntoIterator<Item = Point2<f64>>,
    {
        let mut count = 0usize;
        let mut sum = Vector2::<f64>::zeros();
        let mut sum_sq = 0.0;
        let mut max_sq = 0.0f64;

        for p in positions {
            let r = p.coords;
            let r_sq = r.norm_squared();
            sum += r;
            sum_sq += r_sq;
            max_sq = max_sq.max(r_sq);
            count += 1;
        }

        if count == 0 {
            return Self {
                particle_count: 0,
                steps,
                centroid: Point2::origin(),
                mean_squared_displacement: 0.0,
                rms_displacement: 0.0,
                max_displacement: 0.0,
            };
        }

        let n = count as f64;
        let msd = sum_sq / n;
        Self {
            particle_count: count,
            steps,
            centroid: Point2::from(sum / n),
            mean_squared_displacement: msd,
            rms_displacement: msd.sqrt(),
            max_displacement: max_sq.sqrt(),
        }
    }

    /// Two-dimensional estimate `MSD / (4 n)`, in squared length units per step.
    pub fn diffusion_coefficient(&self) -> Option<f64> {
        (self.steps > 0 && self.particle_count > 0)
            .then(|| self.mean_squared_displacement / (4.0 * self.steps as f64))
    }
}

/// Per-axis variance of a single step.
pub fn step_variance(kind: RandomNumberKind, fluctuation: f64) -> f64 {
    let f2 = fluctuation * fluctuation;
    match kind {
        RandomNumberKind::Gaussian => f2,
        RandomNumberKind::Uniform => f2 / 12.0,
    }
}

/// Mean squared displacement expected after `steps` independent steps in two dimensions.
pub fn expected_mean_squared_displacement(
    kind: RandomNumberKind,
    fluctuation: f64,
    steps: u64,
) -> f64 {
    2.0 * steps as f64 * step_variance(kind, fluctuation)
}
