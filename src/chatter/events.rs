//! Messages broadcast by the chatter systems.
use bevy::prelude::Message;

use crate::colony::components::ColonistId;

use super::interactions::InteractionKind;
use super::mental_break::BreakSeverity;

/// Fired when a colonist's mood drops below their hooked break threshold.
#[derive(Message, Debug, Clone)]
pub struct MentalBreakMessage {
    pub colonist: ColonistId,
    pub severity: BreakSeverity,
}

/// Fired when two colonists complete a social interaction.
#[derive(Message, Debug, Clone)]
pub struct InteractionMessage {
    pub initiator: ColonistId,
    pub recipient: ColonistId,
    pub kind: InteractionKind,
}
