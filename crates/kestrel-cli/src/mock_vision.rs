use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use anyhow::Result;
use kestrel_core::{
    Angle, FieldGeometry, PlayerCmd, RefereeCommand, RefereeState, RobotId, TeamColor, Uid,
    Vector2,
};
use kestrel_executor::sync::{CommandTransport, Decoded, Source};
use kestrel_world::{Observation, Update};
use parking_lot::Mutex;
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal};

const FRAME_PERIOD: Duration = Duration::from_millis(30);
/// Geometry and referee state are repeated this often, in seconds
const BROADCAST_PERIOD: f64 = 3.0;
const PLAYERS_PER_TEAM: u16 = 6;
/// Standard deviation of the position noise, in metres
const POSITION_NOISE: f64 = 0.01;
/// Standard deviation of the heading noise, in radians
const HEADING_NOISE: f64 = 0.02;

struct MockPlayer {
    id: RobotId,
    position: Vector2,
    heading: Angle,
    /// Last commanded speeds, in the robot frame
    command: Option<PlayerCmd>,
}

impl MockPlayer {
    fn step(&mut self, dt: f64) {
        let Some(cmd) = self.command else {
            return;
        };
        let forward = self.heading.unit_vector();
        let left = Vector2::new(-forward.y, forward.x);
        self.position += (forward * cmd.tangent_speed + left * cmd.normal_speed) * dt;
        self.heading = Angle::from_radians(self.heading.radians() + cmd.angular_speed * dt);
    }
}

/// A tiny kinematic field: own robots follow the commands they receive,
/// opponents stand still and the ball drifts to a stop.
pub struct MockField {
    players: Vec<MockPlayer>,
    ball: Vector2,
    ball_velocity: Vector2,
}

impl MockField {
    pub fn new(own_color: TeamColor) -> Arc<Mutex<Self>> {
        let mut players = Vec::new();
        for color in [own_color, own_color.opponent()] {
            let x = if color == own_color { -1.0 } else { 1.0 };
            for i in 0..PLAYERS_PER_TEAM {
                players.push(MockPlayer {
                    id: RobotId::new(color, Uid::new(i)),
                    position: Vector2::new(x, (f64::from(i) - 2.5) * 0.8),
                    heading: if color == own_color { Angle::ZERO } else { Angle::PI },
                    command: None,
                });
            }
        }
        Arc::new(Mutex::new(Self {
            players,
            ball: Vector2::zeros(),
            ball_velocity: Vector2::new(0.4, 0.2),
        }))
    }

    fn step(&mut self, dt: f64) {
        for player in &mut self.players {
            player.step(dt);
        }
        self.ball += self.ball_velocity * dt;
        self.ball_velocity *= (1.0 - 0.5 * dt).max(0.0);
    }
}

/// Vision source reading the mock field with Gaussian noise.
pub struct MockVision {
    field: Arc<Mutex<MockField>>,
    geometry: FieldGeometry,
    start: Instant,
    next_frame: Instant,
    last_broadcast: Option<f64>,
    rng: StdRng,
    position_noise: Normal<f64>,
    heading_noise: Normal<f64>,
}

impl MockVision {
    pub fn new(field: Arc<Mutex<MockField>>, geometry: FieldGeometry, seed: u64) -> Result<Self> {
        let now = Instant::now();
        Ok(Self {
            field,
            geometry,
            start: now,
            next_frame: now,
            last_broadcast: None,
            rng: StdRng::seed_from_u64(seed),
            position_noise: Normal::new(0.0, POSITION_NOISE)?,
            heading_noise: Normal::new(0.0, HEADING_NOISE)?,
        })
    }

    fn frame(&mut self, timestamp: f64) -> Vec<Decoded> {
        let mut batch = Vec::new();
        if self
            .last_broadcast
            .map_or(true, |last| timestamp - last >= BROADCAST_PERIOD)
        {
            batch.push(Decoded::Update(Update::Referee(RefereeState::new(
                RefereeCommand::ForceStart,
                timestamp,
            ))));
            batch.push(Decoded::Update(Update::Geometry(self.geometry.clone())));
            self.last_broadcast = Some(timestamp);
        }

        let mut field = self.field.lock();
        field.step(FRAME_PERIOD.as_secs_f64());
        for player in &field.players {
            let x = player.position.x + self.position_noise.sample(&mut self.rng);
            let y = player.position.y + self.position_noise.sample(&mut self.rng);
            let angle = player.heading.radians() + self.heading_noise.sample(&mut self.rng);
            batch.push(Decoded::Observation(Observation::robot(
                player.id,
                timestamp,
                x,
                y,
                Some(angle),
            )));
        }
        batch.push(Decoded::Observation(Observation::ball(
            timestamp,
            field.ball.x + self.position_noise.sample(&mut self.rng),
            field.ball.y + self.position_noise.sample(&mut self.rng),
        )));
        batch
    }
}

impl Source for MockVision {
    fn name(&self) -> &str {
        "mock-vision"
    }

    fn recv(&mut self, timeout: Duration) -> Result<Vec<Decoded>> {
        let now = Instant::now();
        if now < self.next_frame {
            let wait = self.next_frame - now;
            if wait > timeout {
                thread::sleep(timeout);
                return Ok(Vec::new());
            }
            thread::sleep(wait);
        }
        self.next_frame += FRAME_PERIOD;
        let timestamp = self.start.elapsed().as_secs_f64();
        Ok(self.frame(timestamp))
    }
}

/// Delivers commands to the own robots on the mock field.
pub struct MockRadio {
    field: Arc<Mutex<MockField>>,
    color: TeamColor,
}

impl MockRadio {
    pub fn new(field: Arc<Mutex<MockField>>, color: TeamColor) -> Self {
        Self { field, color }
    }
}

impl CommandTransport for MockRadio {
    fn send(&mut self, commands: &[PlayerCmd]) -> Result<()> {
        let mut field = self.field.lock();
        for cmd in commands {
            log::trace!("Sending {:?}", cmd);
            let id = RobotId::new(self.color, cmd.uid);
            match field.players.iter_mut().find(|p| p.id == id) {
                Some(player) => player.command = Some(*cmd),
                None => log::warn!("No mock robot for {}", id),
            }
        }
        Ok(())
    }
}
