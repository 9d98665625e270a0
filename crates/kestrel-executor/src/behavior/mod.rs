//! Hierarchical state machines over robots: skills at the leaves, tactics
//! sequencing skills for one robot, plays assigning tactics across a team.

mod machine;
mod play;
mod skill;
mod tactic;

use kestrel_core::{Uid, World};
use thiserror::Error;

pub use machine::{Machine, State, StateId, Transition};
pub use play::{Play, Playbook, Player, Players, TacticSet};
pub use skill::{run_skill, Heading, Lookpoint, Skill};
pub use tactic::Tactic;

/// Programming errors surfaced while stepping behaviors. The executor stops on
/// the first one.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BehaviorError {
    #[error("behavior `{name}` has no implementation")]
    Unimplemented { name: String },
    #[error("robot {uid} was left without a current tactic")]
    MissingTactic { uid: Uid },
    #[error("robot {uid} has no tactic named `{tactic}`")]
    UnknownTactic { uid: Uid, tactic: String },
}

/// Anything that can be advanced by one control cycle.
pub trait Steppable {
    fn name(&self) -> &str;

    fn step(&mut self, world: &World) -> Result<(), BehaviorError>;

    fn busy(&self, _world: &World) -> bool {
        false
    }
}

/// A behavior at any level of the hierarchy.
pub enum Behavior {
    Skill(Box<dyn Skill>),
    Tactic(Box<Tactic>),
    Play(Box<Play>),
}

impl Behavior {
    pub fn skill(skill: impl Skill + 'static) -> Self {
        Behavior::Skill(Box::new(skill))
    }

    pub fn tactic(tactic: Tactic) -> Self {
        Behavior::Tactic(Box::new(tactic))
    }

    pub fn play(play: Play) -> Self {
        Behavior::Play(Box::new(play))
    }
}

impl Steppable for Behavior {
    fn name(&self) -> &str {
        match self {
            Behavior::Skill(skill) => skill.name(),
            Behavior::Tactic(tactic) => tactic.name(),
            Behavior::Play(play) => play.name(),
        }
    }

    fn step(&mut self, world: &World) -> Result<(), BehaviorError> {
        match self {
            Behavior::Skill(skill) => {
                run_skill(skill.as_mut(), world);
                Ok(())
            }
            Behavior::Tactic(tactic) => tactic.step(world),
            Behavior::Play(play) => play.step(world),
        }
    }

    fn busy(&self, world: &World) -> bool {
        match self {
            Behavior::Skill(skill) => skill.busy(world),
            Behavior::Tactic(tactic) => tactic.busy(world),
            Behavior::Play(play) => play.busy(world),
        }
    }
}

impl std::fmt::Debug for Behavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Behavior::Skill(skill) => write!(f, "Skill({})", skill.name()),
            Behavior::Tactic(tactic) => write!(f, "Tactic({})", tactic.name()),
            Behavior::Play(play) => write!(f, "Play({})", play.name()),
        }
    }
}
