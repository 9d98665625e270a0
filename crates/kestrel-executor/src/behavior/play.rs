use std::collections::BTreeMap;

use kestrel_core::{Robot, RobotId, TeamColor, Uid, World};

use super::{BehaviorError, Steppable, Tactic};

/// The tactics available to one robot, by name.
pub type TacticSet = BTreeMap<String, Tactic>;

/// A robot as seen by a play: its tactics and the one it runs this cycle.
pub struct Player {
    uid: Uid,
    tactics: TacticSet,
    current_tactic: Option<String>,
}

impl Player {
    pub fn new(uid: Uid, tactics: TacticSet) -> Self {
        Self {
            uid,
            tactics,
            current_tactic: None,
        }
    }

    pub fn uid(&self) -> Uid {
        self.uid
    }

    pub fn tactics(&self) -> &TacticSet {
        &self.tactics
    }

    pub fn tactic_mut(&mut self, name: &str) -> Option<&mut Tactic> {
        self.tactics.get_mut(name)
    }

    pub fn current_tactic(&self) -> Option<&str> {
        self.current_tactic.as_deref()
    }

    pub fn set_current_tactic(&mut self, name: impl Into<String>) {
        self.current_tactic = Some(name.into());
    }

    pub fn clear_current_tactic(&mut self) {
        self.current_tactic = None;
    }

    fn current_mut(&mut self) -> Result<&mut Tactic, BehaviorError> {
        let name = self
            .current_tactic
            .as_ref()
            .ok_or(BehaviorError::MissingTactic { uid: self.uid })?;
        self.tactics
            .get_mut(name)
            .ok_or_else(|| BehaviorError::UnknownTactic {
                uid: self.uid,
                tactic: name.clone(),
            })
    }
}

pub type Players = BTreeMap<Uid, Player>;

/// The team-specific part of a play: decide which tactic each robot runs.
pub trait Playbook: Send {
    fn name(&self) -> &str;

    /// Give every robot that should act this cycle a current tactic.
    fn setup_tactics(&mut self, world: &World, players: &mut Players);
}

type TacticsFactory = Box<dyn Fn(&Robot) -> TacticSet + Send>;

/// Orchestrates one team.
///
/// Every active robot of the team gets a [`Player`] the first time it is seen;
/// players are never removed. Each step the [`Playbook`] assigns tactics and
/// then every active robot's current tactic is stepped.
pub struct Play {
    color: TeamColor,
    tactics_factory: TacticsFactory,
    players: Players,
    playbook: Box<dyn Playbook>,
}

impl Play {
    pub fn new(
        color: TeamColor,
        tactics_factory: impl Fn(&Robot) -> TacticSet + Send + 'static,
        playbook: impl Playbook + 'static,
    ) -> Self {
        Self {
            color,
            tactics_factory: Box::new(tactics_factory),
            players: Players::new(),
            playbook: Box::new(playbook),
        }
    }

    pub fn color(&self) -> TeamColor {
        self.color
    }

    pub fn players(&self) -> &Players {
        &self.players
    }

    fn ensure_players(&mut self, world: &World, active: &[Uid]) {
        for uid in active {
            if !self.players.contains_key(uid) {
                let robot = world.robot(RobotId::new(self.color, *uid));
                log::debug!("New player {} for play {}", robot.id(), self.playbook.name());
                let tactics = (self.tactics_factory)(&robot);
                self.players.insert(*uid, Player::new(*uid, tactics));
            }
        }
    }
}

impl Steppable for Play {
    fn name(&self) -> &str {
        self.playbook.name()
    }

    fn step(&mut self, world: &World) -> Result<(), BehaviorError> {
        let active = world.team(self.color).active_uids();
        self.ensure_players(world, &active);
        self.playbook.setup_tactics(world, &mut self.players);

        for uid in &active {
            if let Some(player) = self.players.get_mut(uid) {
                player.current_mut()?.step(world)?;
            }
        }
        Ok(())
    }

    fn busy(&self, world: &World) -> bool {
        world.team(self.color).active_uids().iter().any(|uid| {
            self.players
                .get(uid)
                .and_then(|p| p.current_tactic().and_then(|name| p.tactics.get(name)))
                .map_or(false, |tactic| tactic.busy(world))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use kestrel_core::FieldGeometry;

    use super::*;

    struct AllRun(&'static str);

    impl Playbook for AllRun {
        fn name(&self) -> &str {
            "all-run"
        }

        fn setup_tactics(&mut self, _world: &World, players: &mut Players) {
            for player in players.values_mut() {
                player.set_current_tactic(self.0);
            }
        }
    }

    struct Lazy;

    impl Playbook for Lazy {
        fn name(&self) -> &str {
            "lazy"
        }

        fn setup_tactics(&mut self, _world: &World, _players: &mut Players) {}
    }

    fn world_with(uids: &[u16]) -> World {
        let world = World::new(FieldGeometry::default());
        for uid in uids {
            world.with_robot(RobotId::new(TeamColor::Blue, Uid::new(*uid)), |r| {
                r.mark_seen(0.0)
            });
        }
        world
    }

    fn idle_tactics(robot: &Robot) -> TacticSet {
        let mut set = TacticSet::new();
        set.insert("idle".to_owned(), Tactic::new("idle", robot.id()));
        set
    }

    #[test]
    fn players_are_created_once() {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = created.clone();
        let mut play = Play::new(
            TeamColor::Blue,
            move |robot: &Robot| {
                counter.fetch_add(1, Ordering::SeqCst);
                idle_tactics(robot)
            },
            AllRun("idle"),
        );

        let world = world_with(&[1, 2]);
        play.step(&world).unwrap();
        play.step(&world).unwrap();
        assert_eq!(created.load(Ordering::SeqCst), 2);
        assert_eq!(play.players().len(), 2);

        world.with_robot(RobotId::new(TeamColor::Blue, Uid::new(5)), |r| {
            r.mark_seen(0.0)
        });
        play.step(&world).unwrap();
        assert_eq!(created.load(Ordering::SeqCst), 3);
        assert_eq!(
            world
                .robot(RobotId::new(TeamColor::Blue, Uid::new(5)))
                .last_tactic(),
            Some("idle")
        );
    }

    #[test]
    fn missing_tactic_is_an_error() {
        let mut play = Play::new(TeamColor::Blue, idle_tactics, Lazy);
        let world = world_with(&[4]);
        assert_eq!(
            play.step(&world),
            Err(BehaviorError::MissingTactic { uid: Uid::new(4) })
        );
    }

    #[test]
    fn unknown_tactic_is_an_error() {
        let mut play = Play::new(TeamColor::Blue, idle_tactics, AllRun("dance"));
        let world = world_with(&[0]);
        assert_eq!(
            play.step(&world),
            Err(BehaviorError::UnknownTactic {
                uid: Uid::new(0),
                tactic: "dance".to_owned()
            })
        );
    }

    #[test]
    fn inactive_robots_are_not_stepped() {
        let mut play = Play::new(TeamColor::Blue, idle_tactics, Lazy);
        let world = world_with(&[]);
        world.with_robot(RobotId::new(TeamColor::Blue, Uid::new(2)), |_| {});
        assert!(play.step(&world).is_ok());
        assert!(play.players().is_empty());
    }
}
