//! Chunked parallel ray emission.
//!
//! The requested ray count is split into fixed-size chunks that are
//! sampled independently with rayon. Every chunk owns an RNG seeded from
//! the user seed and its index, so a given seed and count always produce
//! the same rays no matter how many threads run.

use std::time::Instant;

use lumen_core::{LightRay, RaySource, Scene};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

/// Default number of rays per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Odd 64-bit constant (2^64 / golden ratio) used to spread chunk seeds.
const SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Emission settings.
#[derive(Debug, Clone)]
pub struct EmissionConfig {
    /// Rays drawn from each source
    pub rays_per_source: usize,
    /// Base seed for every chunk RNG
    pub seed: u64,
    /// Rays per parallel work item
    pub chunk_size: usize,
}

impl Default for EmissionConfig {
    fn default() -> Self {
        Self {
            rays_per_source: 1000,
            seed: 0,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// A contiguous run of rays sampled by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmissionChunk {
    /// Position of this chunk in emission order
    pub index: usize,
    /// Index of the first ray
    pub start: usize,
    /// Number of rays in this chunk
    pub len: usize,
}

/// Split `total` rays into chunks of at most `chunk_size`.
///
/// A chunk size of zero is treated as one.
pub fn generate_chunks(total: usize, chunk_size: usize) -> Vec<EmissionChunk> {
    let chunk_size = chunk_size.max(1);
    (0..total)
        .step_by(chunk_size)
        .enumerate()
        .map(|(index, start)| EmissionChunk {
            index,
            start,
            len: chunk_size.min(total - start),
        })
        .collect()
}

fn chunk_seed(seed: u64, index: usize) -> u64 {
    seed ^ (index as u64).wrapping_mul(SEED_STRIDE)
}

/// Sample the rays of a single chunk.
pub fn emit_chunk(source: &RaySource, chunk: &EmissionChunk, seed: u64) -> Vec<LightRay> {
    let mut rng = StdRng::seed_from_u64(chunk_seed(seed, chunk.index));
    (0..chunk.len).map(|_| source.next_ray(&mut rng)).collect()
}

/// Draw `config.rays_per_source` rays from `source` in parallel.
///
/// Rays come back in chunk order.
pub fn emit(source: &RaySource, config: &EmissionConfig) -> Vec<LightRay> {
    let chunks = generate_chunks(config.rays_per_source, config.chunk_size);
    let start = Instant::now();

    let per_chunk: Vec<Vec<LightRay>> = chunks
        .par_iter()
        .map(|chunk| emit_chunk(source, chunk, config.seed))
        .collect();
    let rays = per_chunk.concat();

    log::debug!(
        "Emitted {} rays from '{}' in {} chunks ({:.2?})",
        rays.len(),
        source.name,
        chunks.len(),
        start.elapsed()
    );
    rays
}

/// Rays emitted by one source.
#[derive(Debug, Clone)]
pub struct SourceBatch {
    pub source_name: String,
    pub rays: Vec<LightRay>,
}

/// Emit rays from every source in the scene, in scene order.
///
/// Each source gets its own seed derived from `config.seed` and its
/// position among the sources.
pub fn emit_scene(scene: &Scene, config: &EmissionConfig) -> Vec<SourceBatch> {
    let batches: Vec<SourceBatch> = scene
        .sources()
        .enumerate()
        .map(|(i, source)| {
            let config = EmissionConfig {
                seed: config.seed.wrapping_add(i as u64),
                ..config.clone()
            };
            SourceBatch {
                source_name: source.name.clone(),
                rays: emit(source, &config),
            }
        })
        .collect();

    let total: usize = batches.iter().map(|b| b.rays.len()).sum();
    log::info!(
        "Emitted {} rays from {} sources in scene '{}'",
        total,
        batches.len(),
        scene.name
    );
    batches
}
