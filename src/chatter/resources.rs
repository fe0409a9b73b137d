use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Random source shared by every chatter system.
#[derive(Resource, Debug)]
pub struct ChatterRng(pub StdRng);

impl ChatterRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for ChatterRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}
