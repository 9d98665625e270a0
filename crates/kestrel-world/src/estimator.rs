use std::collections::HashMap;

use kestrel_core::{wrap_angle, RobotId, TrackerSettings, Vector3};

use crate::{filter::Kalman, Update};

/// What an observation is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackedId {
    Ball,
    Robot(RobotId),
}

/// A single timestamped sample of one entity's pose.
///
/// After [`StateEstimator::filter`] the pose fields hold the filtered estimate
/// and `velocity` holds the velocity reported for the entity.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub target: TrackedId,
    /// Capture time in seconds
    pub timestamp: f64,
    pub x: f64,
    pub y: f64,
    /// Heading in radians. Always ignored for the ball.
    pub angle: Option<f64>,
    /// Raw velocity (vx, vy, angular), if the source measures one
    pub velocity: Option<Vector3>,
}

impl Observation {
    pub fn ball(timestamp: f64, x: f64, y: f64) -> Self {
        Self {
            target: TrackedId::Ball,
            timestamp,
            x,
            y,
            angle: None,
            velocity: None,
        }
    }

    pub fn robot(id: RobotId, timestamp: f64, x: f64, y: f64, angle: Option<f64>) -> Self {
        Self {
            target: TrackedId::Robot(id),
            timestamp,
            x,
            y,
            angle,
            velocity: None,
        }
    }

    pub fn with_velocity(mut self, velocity: Vector3) -> Self {
        self.velocity = Some(velocity);
        self
    }
}

/// Filter state for one entity.
#[derive(Debug, Clone)]
struct Track {
    filter: Kalman<3>,
    /// Timestamp of the last observation folded in
    last_timestamp: f64,
    /// Velocity derived from the last two filtered poses
    velocity: Vector3,
    /// Whether the entity carries a heading
    has_angle: bool,
}

impl Track {
    fn new(obs: &Observation, settings: &TrackerSettings) -> Self {
        let has_angle = matches!(obs.target, TrackedId::Robot(_));
        let (q, r) = noise(has_angle, settings);
        let angle = if has_angle { obs.angle.unwrap_or(0.0) } else { 0.0 };
        Self {
            filter: Kalman::new(
                Vector3::new(obs.x, obs.y, wrap_angle(angle)),
                settings.initial_variance,
                q,
                r,
            ),
            last_timestamp: obs.timestamp - settings.nominal_period,
            velocity: Vector3::zeros(),
            has_angle,
        }
    }

    fn update_settings(&mut self, settings: &TrackerSettings) {
        let (q, r) = noise(self.has_angle, settings);
        self.filter.set_noise(q, r);
    }

    fn update(&mut self, obs: &mut Observation) {
        let dt = obs.timestamp - self.last_timestamp;
        let previous = *self.filter.state();

        let u = match (obs.velocity, self.has_angle) {
            (Some(v), true) => v,
            (Some(v), false) => Vector3::new(v.x, v.y, 0.0),
            (None, _) => Vector3::zeros(),
        };
        self.filter.predict(&u, dt);

        // Bring the measured heading within half a turn of the prediction so
        // the innovation is the short way around.
        let predicted = *self.filter.state();
        let measured_angle = match (self.has_angle, obs.angle) {
            (true, Some(angle)) => Some(predicted.z + wrap_angle(angle - predicted.z)),
            _ => None,
        };
        let z = Vector3::new(obs.x, obs.y, measured_angle.unwrap_or(predicted.z));
        self.filter
            .correct_partial(&z, &[true, true, measured_angle.is_some()]);

        let state = self.filter.state_mut();
        state.z = if self.has_angle { wrap_angle(state.z) } else { 0.0 };
        let state = *state;

        self.velocity = if dt > 0.0 {
            Vector3::new(
                (state.x - previous.x) / dt,
                (state.y - previous.y) / dt,
                wrap_angle(state.z - previous.z) / dt,
            )
        } else {
            Vector3::zeros()
        };
        self.last_timestamp = self.last_timestamp.max(obs.timestamp);

        obs.x = state.x;
        obs.y = state.y;
        if self.has_angle && obs.angle.is_some() {
            obs.angle = Some(state.z);
        }
        if obs.velocity.is_none() {
            obs.velocity = Some(self.velocity);
        }
    }
}

fn noise(has_angle: bool, settings: &TrackerSettings) -> (Vector3, Vector3) {
    let (q, r) = if has_angle {
        (settings.robot_process_noise, settings.robot_measurement_noise)
    } else {
        (settings.ball_process_noise, settings.ball_measurement_noise)
    };
    (Vector3::from(q), Vector3::from(r))
}

/// Turns raw pose samples into filtered ones, one Kalman filter per entity.
///
/// Filters are created the first time an entity is observed. The first
/// observation of an entity is treated as arriving one nominal period after a
/// fictitious previous one.
#[derive(Debug)]
pub struct StateEstimator {
    tracks: HashMap<TrackedId, Track>,
    settings: TrackerSettings,
}

impl StateEstimator {
    pub fn new(settings: &TrackerSettings) -> Self {
        Self {
            tracks: HashMap::new(),
            settings: settings.clone(),
        }
    }

    /// Re-tune every existing filter. Filter states are kept.
    pub fn update_settings(&mut self, settings: &TrackerSettings) {
        self.settings = settings.clone();
        for track in self.tracks.values_mut() {
            track.update_settings(&self.settings);
        }
    }

    /// Fold `obs` into its entity's filter and overwrite its pose with the
    /// corrected estimate.
    ///
    /// Out-of-order or repeated timestamps are accepted: the control term is
    /// skipped for that step.
    pub fn filter(&mut self, obs: &mut Observation) {
        let settings = &self.settings;
        let track = self.tracks.entry(obs.target).or_insert_with(|| {
            log::debug!("Creating filter for {:?}", obs.target);
            Track::new(obs, settings)
        });
        track.update(obs);
    }

    /// Filter `obs` and turn the result into an update for the world.
    pub fn process(&mut self, mut obs: Observation) -> Update {
        self.filter(&mut obs);
        Update::from_observation(&obs)
    }

    /// Number of entities being tracked.
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn is_tracking(&self, id: &TrackedId) -> bool {
        self.tracks.contains_key(id)
    }

    /// Current heading variance of an entity's filter.
    pub fn heading_variance(&self, id: &TrackedId) -> Option<f64> {
        self.tracks
            .get(id)
            .map(|track| track.filter.covariance()[(2, 2)])
    }

    /// Current position variance (x, y) of an entity's filter.
    pub fn variance(&self, id: &TrackedId) -> Option<(f64, f64)> {
        self.tracks.get(id).map(|track| {
            let p = track.filter.covariance();
            (p[(0, 0)], p[(1, 1)])
        })
    }
}
