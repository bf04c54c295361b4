//! Seeded random streams, one per stage.
//!
//! Every stage that needs randomness derives its own ChaCha8 stream from
//! the master seed and a stage tag, so a stage's output is reproducible
//! regardless of thread count or what other stages consumed.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Tags naming each consumer of randomness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageTag {
    PlateSeeds,
    PlateMotion,
    PlateBias,
    PartitionNoise,
    ShearNoise,
    DetailNoise,
    Erosion,
}

impl StageTag {
    fn salt(self) -> u64 {
        match self {
            StageTag::PlateSeeds => 0x706c_6174,
            StageTag::PlateMotion => 0x6d6f_7469,
            StageTag::PlateBias => 0x6269_6173,
            StageTag::PartitionNoise => 0x7061_7274,
            StageTag::ShearNoise => 0x7368_6561,
            StageTag::DetailNoise => 0x6e6f_6973,
            StageTag::Erosion => 0x6572_6f64,
        }
    }
}

/// Mixes the master seed with a stage salt (splitmix64 finalizer).
pub fn stage_seed(master: u64, tag: StageTag) -> u64 {
    let mut z = master ^ tag.salt().wrapping_mul(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Seeded stream for a stage.
pub fn stage_rng(master: u64, tag: StageTag) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(stage_seed(master, tag))
}

/// Noise seeds are i32 in the noise backend; fold the mixed seed down.
pub fn stage_noise_seed(master: u64, tag: StageTag) -> i32 {
    let s = stage_seed(master, tag);
    (s ^ (s >> 32)) as i32
}
