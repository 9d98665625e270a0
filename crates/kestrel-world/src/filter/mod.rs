mod kalman;

pub use kalman::Kalman;
