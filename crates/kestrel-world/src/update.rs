use kestrel_core::{
    Angle, FieldGeometry, RefereeState, RobotId, TeamColor, Uid, Vector2, Vector3, World,
};
use serde::{Deserialize, Serialize};

use crate::{Observation, TrackedId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BallUpdate {
    pub timestamp: f64,
    pub position: Vector2,
    pub velocity: Vector2,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobotUpdate {
    pub timestamp: f64,
    pub position: Vector2,
    /// `None` keeps the last known heading
    pub orientation: Option<Angle>,
    pub velocity: Vector2,
    pub angular_speed: f64,
}

/// A change to the world, produced off the control thread and applied on it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Update {
    Ball(BallUpdate),
    Robot {
        id: RobotId,
        data: RobotUpdate,
    },
    Geometry(FieldGeometry),
    Referee(RefereeState),
    TeamInfo {
        color: TeamColor,
        score: u32,
        yellow_cards: u32,
        red_cards: u32,
        goalkeeper: Option<Uid>,
    },
}

impl Update {
    /// Build an update from a filtered observation.
    pub fn from_observation(obs: &Observation) -> Self {
        let position = Vector2::new(obs.x, obs.y);
        let velocity = obs.velocity.unwrap_or_else(Vector3::zeros);
        match obs.target {
            TrackedId::Ball => Update::Ball(BallUpdate {
                timestamp: obs.timestamp,
                position,
                velocity: velocity.xy(),
            }),
            TrackedId::Robot(id) => Update::Robot {
                id,
                data: RobotUpdate {
                    timestamp: obs.timestamp,
                    position,
                    orientation: obs.angle.map(Angle::from_radians),
                    velocity: velocity.xy(),
                    angular_speed: velocity.z,
                },
            },
        }
    }

    /// Mutate the one entity this update targets.
    ///
    /// Robot updates are applied under the owning team's lock and mark the
    /// robot as seen.
    pub fn apply(&self, world: &mut World) {
        match self {
            Update::Ball(data) => {
                world
                    .ball_mut()
                    .update(data.position, data.velocity, data.timestamp);
                world.advance_clock(data.timestamp);
            }
            Update::Robot { id, data } => {
                world.with_robot(*id, |robot| {
                    robot.update(data.position, data.orientation);
                    robot.set_velocity(data.velocity, data.angular_speed);
                    robot.mark_seen(data.timestamp);
                });
                world.advance_clock(data.timestamp);
            }
            Update::Geometry(geometry) => {
                log::debug!("Applying new field geometry");
                world.set_geometry(geometry.clone());
            }
            Update::Referee(state) => {
                world.set_referee(*state);
                world.advance_clock(state.timestamp);
            }
            Update::TeamInfo {
                color,
                score,
                yellow_cards,
                red_cards,
                goalkeeper,
            } => {
                let team = world.team_mut(*color);
                team.score = *score;
                team.yellow_cards = *yellow_cards;
                team.red_cards = *red_cards;
                if let Some(uid) = goalkeeper {
                    team.set_goalkeeper(*uid);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use kestrel_core::RefereeCommand;

    use super::*;

    fn world() -> World {
        World::new(FieldGeometry::default())
    }

    #[test]
    fn robot_update_touches_only_its_robot() {
        let mut world = world();
        let target = RobotId::new(TeamColor::Yellow, Uid::new(2));
        let bystander = RobotId::new(TeamColor::Yellow, Uid::new(3));
        world.with_robot(bystander, |r| {
            r.update(Vector2::new(-1.0, -1.0), None);
            r.mark_seen(0.0);
        });

        Update::Robot {
            id: target,
            data: RobotUpdate {
                timestamp: 0.5,
                position: Vector2::new(1.0, 2.0),
                orientation: Some(Angle::from_degrees(90.0)),
                velocity: Vector2::new(0.1, 0.0),
                angular_speed: 0.2,
            },
        }
        .apply(&mut world);

        let robot = world.robot(target);
        assert!(robot.is_active());
        assert_eq!(robot.position(), Vector2::new(1.0, 2.0));
        assert_eq!(robot.orientation(), Some(Angle::from_degrees(90.0)));
        assert_eq!(robot.velocity(), Vector2::new(0.1, 0.0));
        assert_eq!(robot.last_seen(), Some(0.5));

        let other = world.robot(bystander);
        assert_eq!(other.position(), Vector2::new(-1.0, -1.0));
        assert_eq!(other.last_seen(), Some(0.0));
        assert_eq!(world.ball().last_seen(), None);
        assert_eq!(world.team(TeamColor::Blue).lock().len(), 0);
        assert_eq!(world.clock(), 0.5);
    }

    #[test]
    fn ball_update() {
        let mut world = world();
        Update::Ball(BallUpdate {
            timestamp: 1.0,
            position: Vector2::new(0.3, 0.4),
            velocity: Vector2::new(3.0, 4.0),
        })
        .apply(&mut world);
        assert_eq!(world.ball().position(), Vector2::new(0.3, 0.4));
        assert_eq!(world.ball().speed(), 5.0);
        assert_eq!(world.active_robots().len(), 0);
    }

    #[test]
    fn referee_and_team_info() {
        let mut world = world();
        Update::Referee(RefereeState::new(
            RefereeCommand::DirectFree(TeamColor::Blue),
            3.0,
        ))
        .apply(&mut world);
        Update::TeamInfo {
            color: TeamColor::Blue,
            score: 1,
            yellow_cards: 2,
            red_cards: 0,
            goalkeeper: Some(Uid::new(5)),
        }
        .apply(&mut world);

        assert_eq!(
            world.referee().command,
            RefereeCommand::DirectFree(TeamColor::Blue)
        );
        let blue = world.team(TeamColor::Blue);
        assert_eq!(blue.score, 1);
        assert_eq!(blue.yellow_cards, 2);
        assert_eq!(blue.goalkeeper(), Uid::new(5));
        assert_eq!(world.team(TeamColor::Yellow).score, 0);
    }

    #[test]
    fn geometry_update_resizes_field() {
        let mut world = world();
        Update::Geometry(FieldGeometry {
            field_length: 12.0,
            field_width: 9.0,
            ..Default::default()
        })
        .apply(&mut world);
        assert_eq!(world.geometry().field_length, 12.0);
        assert_eq!(world.goal(-1.0).center(), Vector2::new(-6.0, 0.0));
    }

    #[test]
    fn from_filtered_observation() {
        let id = RobotId::new(TeamColor::Blue, Uid::new(1));
        let obs = Observation::robot(id, 2.0, 0.5, -0.5, Some(0.25))
            .with_velocity(Vector3::new(1.0, 0.0, 0.5));
        match Update::from_observation(&obs) {
            Update::Robot { id: got, data } => {
                assert_eq!(got, id);
                assert_eq!(data.position, Vector2::new(0.5, -0.5));
                assert_eq!(data.orientation, Some(Angle::from_radians(0.25)));
                assert_eq!(data.velocity, Vector2::new(1.0, 0.0));
                assert_eq!(data.angular_speed, 0.5);
            }
            other => panic!("unexpected update {:?}", other),
        }

        let ball = Update::from_observation(&Observation::ball(1.0, 0.1, 0.2));
        assert!(matches!(ball, Update::Ball(BallUpdate { timestamp, .. }) if timestamp == 1.0));
    }
}
