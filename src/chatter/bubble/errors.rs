//! Rejections returned when a bubble cannot be shown.
use std::fmt;

use crate::colony::components::ColonistId;

/// Precondition failures for `BubbleManager::trigger`.
///
/// Callers drop these silently; they are never worth a warning.
#[derive(Debug, Clone, PartialEq)]
pub enum BubbleRejection {
    /// The speaker is dead, despawned or unknown.
    InvalidSpeaker { colonist: ColonistId },
    /// The speaker had a bubble less than the cooldown ago.
    CoolingDown {
        colonist: ColonistId,
        remaining_secs: f32,
    },
}

impl BubbleRejection {
    pub fn invalid_speaker(colonist: ColonistId) -> Self {
        Self::InvalidSpeaker { colonist }
    }

    pub fn cooling_down(colonist: ColonistId, remaining_secs: f32) -> Self {
        Self::CoolingDown {
            colonist,
            remaining_secs,
        }
    }

    pub fn colonist(&self) -> ColonistId {
        match self {
            Self::InvalidSpeaker { colonist } | Self::CoolingDown { colonist, .. } => *colonist,
        }
    }
}

impl fmt::Display for BubbleRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSpeaker { colonist } => {
                write!(f, "{} cannot show a bubble right now", colonist)
            }
            Self::CoolingDown {
                colonist,
                remaining_secs,
            } => write!(
                f,
                "{} is on bubble cooldown for another {:.2}s",
                colonist, remaining_secs
            ),
        }
    }
}

impl std::error::Error for BubbleRejection {}
