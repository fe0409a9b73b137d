pub mod components;
pub mod errors;
pub mod layout;
pub mod manager;
pub mod systems;

pub use components::{Bubble, BubbleCategory, BubbleId, BubbleProfile, SoundCue};
pub use errors::BubbleRejection;
pub use layout::{render_bubble, BubbleLayout, BubbleStyle, GlyphEstimate, TextMeasure};
pub use manager::{BubbleManager, BubbleSpeaker};
pub use systems::{BubbleCueMessage, BubbleEmitter};
