use crate::{
    Ball, FieldGeometry, Goal, RefereeState, Robot, RobotId, Team, TeamColor, Vector2,
};

/// The shared picture of the match: two teams, the ball, both goals and the
/// referee state.
///
/// Exactly one team carries each colour. Teams live in `teams[0]` (negative
/// side) and `teams[1]` (positive side); swapping sides moves them between the
/// slots without rebuilding them.
pub struct World {
    geometry: FieldGeometry,
    teams: [Team; 2],
    ball: Ball,
    goals: [Goal; 2],
    referee: RefereeState,
    /// Latest observation timestamp or cycle time applied to the world, in
    /// seconds
    clock: f64,
}

impl World {
    /// Create a world with the blue team defending the negative side.
    pub fn new(geometry: FieldGeometry) -> Self {
        Self::with_sides(geometry, TeamColor::Blue)
    }

    /// Create a world with `negative_side` defending the goal at negative x.
    pub fn with_sides(geometry: FieldGeometry, negative_side: TeamColor) -> Self {
        let teams = [
            Team::new(negative_side, -1.0, &geometry),
            Team::new(negative_side.opponent(), 1.0, &geometry),
        ];
        Self {
            ball: Ball::new(geometry.ball_radius),
            goals: [Goal::new(&geometry, -1.0), Goal::new(&geometry, 1.0)],
            teams,
            geometry,
            referee: RefereeState::default(),
            clock: 0.0,
        }
    }

    pub fn geometry(&self) -> &FieldGeometry {
        &self.geometry
    }

    /// Replace the field dimensions and rebuild both goals. Robot and ball
    /// dimensions keep the values the world was created with.
    pub fn set_geometry(&mut self, geometry: FieldGeometry) {
        self.goals = [Goal::new(&geometry, -1.0), Goal::new(&geometry, 1.0)];
        self.geometry = geometry;
    }

    fn team_index(&self, color: TeamColor) -> Option<usize> {
        self.teams.iter().position(|t| t.color() == color)
    }

    /// Get the team with the given colour.
    ///
    /// # Panics
    ///
    /// Panics if no team has this colour, which means the world was corrupted.
    pub fn team(&self, color: TeamColor) -> &Team {
        match self.team_index(color) {
            Some(i) => &self.teams[i],
            None => panic!("No team with color {} in the world", color),
        }
    }

    /// Mutable variant of [`World::team`].
    ///
    /// # Panics
    ///
    /// Panics if no team has this colour.
    pub fn team_mut(&mut self, color: TeamColor) -> &mut Team {
        match self.team_index(color) {
            Some(i) => &mut self.teams[i],
            None => panic!("No team with color {} in the world", color),
        }
    }

    pub fn try_team(&self, color: TeamColor) -> Option<&Team> {
        self.team_index(color).map(|i| &self.teams[i])
    }

    /// The team defending the goal with the given side sign.
    pub fn team_on_side(&self, side: f64) -> &Team {
        if side < 0.0 {
            &self.teams[0]
        } else {
            &self.teams[1]
        }
    }

    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter()
    }

    /// Exchange the sides of the two teams.
    pub fn swap_sides(&mut self) {
        self.teams.swap(0, 1);
        self.teams[0].set_side(-1.0);
        self.teams[1].set_side(1.0);
        log::info!(
            "Sides swapped, {} now defends the negative goal",
            self.teams[0].color()
        );
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn ball_mut(&mut self) -> &mut Ball {
        &mut self.ball
    }

    /// The goal at the given side sign.
    pub fn goal(&self, side: f64) -> &Goal {
        if side < 0.0 {
            &self.goals[0]
        } else {
            &self.goals[1]
        }
    }

    /// The goal `color` defends.
    pub fn own_goal(&self, color: TeamColor) -> &Goal {
        self.goal(self.team(color).side())
    }

    /// The goal `color` attacks.
    pub fn opponent_goal(&self, color: TeamColor) -> &Goal {
        self.goal(-self.team(color).side())
    }

    pub fn referee(&self) -> &RefereeState {
        &self.referee
    }

    pub fn set_referee(&mut self, referee: RefereeState) {
        self.referee = referee;
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Move the world clock forward; it never runs backwards.
    pub fn advance_clock(&mut self, timestamp: f64) {
        self.clock = self.clock.max(timestamp);
    }

    /// Run `f` on the robot under its team's lock, creating the robot if the
    /// uid was never seen.
    ///
    /// `f` must not reach back into the same team; the lock is not reentrant.
    pub fn with_robot<R>(&self, id: RobotId, f: impl FnOnce(&mut Robot) -> R) -> R {
        let mut roster = self.team(id.color).lock();
        f(roster.get_or_create(&id.uid))
    }

    /// A copy of the robot's current state.
    pub fn robot(&self, id: RobotId) -> Robot {
        self.with_robot(id, |robot| robot.clone())
    }

    /// Copies of every active robot on the field, both teams.
    pub fn active_robots(&self) -> Vec<Robot> {
        self.teams.iter().flat_map(|t| t.active_robots()).collect()
    }

    /// Positions of every active robot except `except`.
    pub fn obstacles(&self, except: RobotId) -> Vec<Vector2> {
        self.active_robots()
            .into_iter()
            .filter(|r| r.id() != except)
            .map(|r| r.position())
            .collect()
    }

    /// Mark robots that have not been seen for `timeout` seconds as inactive.
    pub fn expire_robots(&self, timeout: f64) -> usize {
        let now = self.clock;
        let mut expired = 0;
        for team in &self.teams {
            for robot in team.lock().values_mut() {
                if robot.expire(now, timeout) {
                    log::debug!("Robot {} went inactive", robot.id());
                    expired += 1;
                }
            }
        }
        expired
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("teams", &self.teams)
            .field("ball", &self.ball)
            .field("referee", &self.referee)
            .field("clock", &self.clock)
            .finish()
    }
}
