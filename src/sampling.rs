//! Blue-noise sample sets for the blocker search and PCF kernels.
//!
//! Points come from Bridson-style dart throwing inside the unit disc, then
//! get stretched to `[-1, 1]^2` so the shader can scale them by a kernel
//! radius directly.

use glam::Vec2;
use rand::Rng;

use crate::renderer::gpu::{Gpu, TextureId};

/// Upper bound on generation runs per distribution.
pub const MAX_ATTEMPTS: usize = 100;

/// Candidates tried around each active sample before it is retired.
const CANDIDATES_PER_SAMPLE: usize = 30;

/// An immutable sample set. Replace it wholesale to change the count.
#[derive(Clone, Debug)]
pub struct SampleDistribution {
    pub points: Vec<Vec2>,
    pub requested: usize,
    pub attempts: usize,
}

impl SampleDistribution {
    /// True when fewer than `requested` points could be placed.
    pub fn is_short(&self) -> bool {
        self.points.len() < self.requested
    }
}

/// Generates `num_samples` Poisson-disc offsets in `[-1, 1]^2`.
///
/// Each run asks for twice as many points as needed so the minimum spacing
/// is tight enough to usually overshoot. Runs repeat until one reaches the
/// target or [`MAX_ATTEMPTS`] is spent; the largest run wins.
pub fn generate_distribution<R: Rng>(rng: &mut R, num_samples: usize) -> SampleDistribution {
    let mut best: Vec<Vec2> = Vec::new();
    let mut attempts = 0;

    while attempts < MAX_ATTEMPTS {
        attempts += 1;
        let points = poisson_points(rng, num_samples * 2);
        if points.len() > best.len() {
            best = points;
        }
        if best.len() >= num_samples {
            break;
        }
    }

    best.truncate(num_samples);
    let distribution = SampleDistribution {
        points: best.into_iter().map(|p| p * 2.0 - Vec2::ONE).collect(),
        requested: num_samples,
        attempts,
    };
    if distribution.is_short() {
        log::warn!(
            "couldn't generate Poisson-disc distribution with {num_samples} samples, using {}",
            distribution.points.len()
        );
    }
    distribution
}

/// Dart throwing in the disc of radius 0.5 centred at (0.5, 0.5). The
/// minimum distance is derived from `target` as `sqrt(target) / target`;
/// the run keeps going until no active sample can spawn a neighbour, so the
/// result may hold more or fewer than `target` points.
pub fn poisson_points<R: Rng>(rng: &mut R, target: usize) -> Vec<Vec2> {
    if target == 0 {
        return Vec::new();
    }
    let min_dist = (target as f32).sqrt() / target as f32;
    let mut grid = Grid::new(min_dist);

    let first = loop {
        let p = Vec2::new(rng.gen(), rng.gen());
        if in_disc(p) {
            break p;
        }
    };

    let mut samples = vec![first];
    let mut active = vec![first];
    grid.insert(first);

    while !active.is_empty() {
        let index = rng.gen_range(0..active.len());
        let center = active.swap_remove(index);

        for _ in 0..CANDIDATES_PER_SAMPLE {
            let radius = min_dist * (1.0 + rng.gen::<f32>());
            let angle = rng.gen::<f32>() * std::f32::consts::TAU;
            let candidate = center + radius * Vec2::from_angle(angle);
            if in_disc(candidate) && !grid.has_neighbour(candidate, min_dist) {
                samples.push(candidate);
                active.push(candidate);
                grid.insert(candidate);
            }
        }
    }

    samples
}

fn in_disc(p: Vec2) -> bool {
    p.distance_squared(Vec2::splat(0.5)) <= 0.25
}

/// Background grid over the unit square; a cell holds at most one sample.
struct Grid {
    cell_size: f32,
    width: usize,
    cells: Vec<Option<Vec2>>,
}

impl Grid {
    fn new(min_dist: f32) -> Self {
        let cell_size = min_dist / std::f32::consts::SQRT_2;
        let width = (1.0 / cell_size).ceil() as usize;
        Self {
            cell_size,
            width,
            cells: vec![None; width * width],
        }
    }

    fn cell(&self, p: Vec2) -> (usize, usize) {
        let clamp = |v: f32| ((v / self.cell_size) as usize).min(self.width - 1);
        (clamp(p.x.max(0.0)), clamp(p.y.max(0.0)))
    }

    fn insert(&mut self, p: Vec2) {
        let (x, y) = self.cell(p);
        self.cells[y * self.width + x] = Some(p);
    }

    fn has_neighbour(&self, p: Vec2, min_dist: f32) -> bool {
        let (cx, cy) = self.cell(p);
        let min_sq = min_dist * min_dist;
        let lo = |c: usize| c.saturating_sub(2);
        let hi = |c: usize| (c + 3).min(self.width);
        for y in lo(cy)..hi(cy) {
            for x in lo(cx)..hi(cx) {
                if let Some(q) = self.cells[y * self.width + x] {
                    if q.distance_squared(p) < min_sq {
                        return true;
                    }
                }
            }
        }
        false
    }
}

/// The two lookup textures the lit shader samples: unit 0 drives the
/// blocker search, unit 1 drives PCF.
pub struct DistributionTextures {
    pub blocker_search: TextureId,
    pub pcf: TextureId,
}

impl DistributionTextures {
    pub fn create<R: Rng>(
        gpu: &mut dyn Gpu,
        rng: &mut R,
        blocker_samples: usize,
        pcf_samples: usize,
    ) -> Self {
        let textures = Self {
            blocker_search: gpu.create_distribution_texture(),
            pcf: gpu.create_distribution_texture(),
        };
        upload(gpu, textures.blocker_search, rng, blocker_samples);
        upload(gpu, textures.pcf, rng, pcf_samples);
        textures
    }

    pub fn regenerate_blocker_search<R: Rng>(&self, gpu: &mut dyn Gpu, rng: &mut R, count: usize) {
        upload(gpu, self.blocker_search, rng, count);
    }

    pub fn regenerate_pcf<R: Rng>(&self, gpu: &mut dyn Gpu, rng: &mut R, count: usize) {
        upload(gpu, self.pcf, rng, count);
    }

    pub fn release(self, gpu: &mut dyn Gpu) {
        gpu.delete_texture(self.blocker_search);
        gpu.delete_texture(self.pcf);
    }
}

fn upload<R: Rng>(gpu: &mut dyn Gpu, texture: TextureId, rng: &mut R, count: usize) {
    let distribution = generate_distribution(rng, count);
    log::debug!(
        "Poisson-disc distribution: {}/{} samples after {} attempt(s)",
        distribution.points.len(),
        distribution.requested,
        distribution.attempts
    );
    gpu.upload_distribution(texture, &distribution.points);
}
