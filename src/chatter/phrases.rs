//! Static text pools for bubbles.
use rand::seq::SliceRandom;
use rand::Rng;

use super::bubble::components::BubbleCategory;

pub const DEFAULT_ENTHUSIASTIC_LINE: &str = "So excited to chat!";

pub const DEFAULT_CHAT_SNIPPETS: &[&str] = &[
    "Did you hear about...",
    "So I was thinking...",
    "You won't believe this!",
    "Let me tell you...",
    "The other day I...",
    "Isn't it amazing?",
    "What do you think about...",
    "I've been wondering...",
    "Have you ever noticed...",
    "Between you and me...",
];

pub const DEFAULT_JOKES: &[&str] = &[
    "Why did the colonist bring a ladder to the bar? They heard the drinks were on the house!",
    "What do you call a lazy colonist? A bed-rester!",
    "Why don't raiders use bathrooms? They prefer to be in-continent!",
    "How many colonists does it take to change a light bulb? None, they prefer the darkness mood buff!",
    "What's a colonist's favorite exercise? The mental break!",
    "Why was the mechanoid feeling down? It had a chip on its shoulder!",
];

/// Configured text pools, one per bubble category.
#[derive(Debug, Clone)]
pub struct PhraseBook {
    enthusiastic: String,
    chat: Vec<String>,
    jokes: Vec<String>,
}

impl PhraseBook {
    pub fn new(enthusiastic: impl Into<String>, chat: Vec<String>, jokes: Vec<String>) -> Self {
        Self {
            enthusiastic: enthusiastic.into(),
            chat,
            jokes,
        }
    }

    pub fn chat(&self) -> &[String] {
        &self.chat
    }

    pub fn jokes(&self) -> &[String] {
        &self.jokes
    }

    pub fn enthusiastic(&self) -> &str {
        &self.enthusiastic
    }

    /// Text for a bubble of `category` when the caller supplied none.
    ///
    /// Empty pools fall back to the enthusiastic line so a bubble never shows blank.
    pub fn pick<R: Rng + ?Sized>(&self, category: BubbleCategory, rng: &mut R) -> String {
        let pool = match category {
            BubbleCategory::Enthusiastic => return self.enthusiastic.clone(),
            BubbleCategory::Chat => &self.chat,
            BubbleCategory::Joke => &self.jokes,
        };

        pool.choose(rng)
            .cloned()
            .unwrap_or_else(|| self.enthusiastic.clone())
    }
}

impl Default for PhraseBook {
    fn default() -> Self {
        Self::new(
            DEFAULT_ENTHUSIASTIC_LINE,
            DEFAULT_CHAT_SNIPPETS.iter().map(|s| s.to_string()).collect(),
            DEFAULT_JOKES.iter().map(|s| s.to_string()).collect(),
        )
    }
}
