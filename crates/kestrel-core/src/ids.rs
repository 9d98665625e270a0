use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TeamColor {
    Blue,
    Yellow,
}

impl TeamColor {
    pub fn opponent(&self) -> TeamColor {
        match self {
            TeamColor::Blue => TeamColor::Yellow,
            TeamColor::Yellow => TeamColor::Blue,
        }
    }

    /// Constant mixed into [`Uuid`]s so that robots of different teams never
    /// share an identifier.
    const fn uuid_bits(&self) -> u32 {
        match self {
            TeamColor::Blue => 0,
            TeamColor::Yellow => 1 << 16,
        }
    }
}

impl std::fmt::Display for TeamColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamColor::Blue => write!(f, "blue"),
            TeamColor::Yellow => write!(f, "yellow"),
        }
    }
}

/// Robot identifier, unique within one team only.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Uid(u16);

impl Uid {
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    pub fn as_u16(&self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for Uid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Robot identifier, unique across the whole world.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Uuid(u32);

impl Uuid {
    pub fn new(color: TeamColor, uid: Uid) -> Self {
        Self(color.uuid_bits() | uid.0 as u32)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Non-owning reference to a robot: the team it belongs to and its uid.
///
/// Behaviors hold this instead of the robot itself and resolve it against the
/// [`World`](crate::World) every time they run.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct RobotId {
    pub color: TeamColor,
    pub uid: Uid,
}

impl RobotId {
    pub fn new(color: TeamColor, uid: Uid) -> Self {
        Self { color, uid }
    }

    pub fn uuid(&self) -> Uuid {
        Uuid::new(self.color, self.uid)
    }
}

impl std::fmt::Display for RobotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.color, self.uid)
    }
}
