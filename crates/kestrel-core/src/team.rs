use parking_lot::{Mutex, MutexGuard};

use crate::{FieldGeometry, LazyMap, Robot, RobotId, TeamColor, Uid};

/// Goalkeeper used until the referee names one.
pub const DEFAULT_GOALKEEPER: Uid = Uid::new(0);

/// The robots of one team, keyed by uid. Unknown uids produce a fresh,
/// inactive robot.
pub type Roster = LazyMap<Uid, Robot>;

/// One of the two teams.
///
/// The roster sits behind a lock: every mutation coming from an update record
/// and every full iteration over the robots must hold it, because looking up a
/// uid may insert a robot.
pub struct Team {
    color: TeamColor,
    /// Sign of the x coordinate of this team's own goal
    side: f64,
    pub score: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    goalkeeper: Option<Uid>,
    robots: Mutex<Roster>,
}

impl Team {
    pub fn new(color: TeamColor, side: f64, geometry: &FieldGeometry) -> Self {
        let geometry = geometry.clone();
        Self {
            color,
            side,
            score: 0,
            yellow_cards: 0,
            red_cards: 0,
            goalkeeper: None,
            robots: Mutex::new(LazyMap::new(move |uid: &Uid| {
                log::debug!("Creating robot {} for the {} team", uid, color);
                Robot::new(RobotId::new(color, *uid), &geometry)
            })),
        }
    }

    pub fn color(&self) -> TeamColor {
        self.color
    }

    pub fn side(&self) -> f64 {
        self.side
    }

    pub(crate) fn set_side(&mut self, side: f64) {
        self.side = side;
    }

    pub fn goalkeeper(&self) -> Uid {
        self.goalkeeper.unwrap_or(DEFAULT_GOALKEEPER)
    }

    pub fn set_goalkeeper(&mut self, uid: Uid) {
        self.goalkeeper = Some(uid);
    }

    /// Acquire the roster lock.
    pub fn lock(&self) -> MutexGuard<'_, Roster> {
        self.robots.lock()
    }

    /// Copies of the currently active robots.
    pub fn active_robots(&self) -> Vec<Robot> {
        self.lock()
            .values()
            .filter(|r| r.is_active())
            .cloned()
            .collect()
    }

    /// Uids of the currently active robots, in ascending order.
    pub fn active_uids(&self) -> Vec<Uid> {
        self.lock()
            .iter()
            .filter(|(_, r)| r.is_active())
            .map(|(uid, _)| *uid)
            .collect()
    }
}

impl std::fmt::Debug for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Team")
            .field("color", &self.color)
            .field("side", &self.side)
            .field("score", &self.score)
            .field("goalkeeper", &self.goalkeeper())
            .field("robots", &self.lock().len())
            .finish()
    }
}
