use serde::{Deserialize, Serialize};

use crate::TeamColor;

/// Referee commands, as relayed by the game controller.
///
/// Colour-carrying commands name the team the command applies to.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(tag = "type", content = "team")]
pub enum RefereeCommand {
    #[default]
    Halt,
    Stop,
    NormalStart,
    ForceStart,
    PrepareKickoff(TeamColor),
    PreparePenalty(TeamColor),
    DirectFree(TeamColor),
    Timeout(TeamColor),
    BallPlacement(TeamColor),
    Goal(TeamColor),
}

impl RefereeCommand {
    /// The team the command concerns, if any.
    pub fn team(&self) -> Option<TeamColor> {
        match self {
            RefereeCommand::PrepareKickoff(c)
            | RefereeCommand::PreparePenalty(c)
            | RefereeCommand::DirectFree(c)
            | RefereeCommand::Timeout(c)
            | RefereeCommand::BallPlacement(c)
            | RefereeCommand::Goal(c) => Some(*c),
            _ => None,
        }
    }

    /// Whether robots may move at all.
    pub fn allows_motion(&self) -> bool {
        !matches!(self, RefereeCommand::Halt | RefereeCommand::Timeout(_))
    }
}

/// The last referee command together with the time it was issued (seconds).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct RefereeState {
    pub command: RefereeCommand,
    pub timestamp: f64,
}

impl RefereeState {
    pub fn new(command: RefereeCommand, timestamp: f64) -> Self {
        Self { command, timestamp }
    }
}
