use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Random source for incident and breakdown rolls.
#[derive(Resource, Debug)]
pub struct StorytellerRng(pub StdRng);

impl StorytellerRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for StorytellerRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}
