use super::variable::Variable;

/// Discrete PID controller.
///
/// The error of a step is `input - feedback`. The integral is the clamped sum
/// of errors and the derivative is the difference to the previous error, so
/// the gains are per-step rather than per-second.
#[derive(Debug, Clone)]
pub struct Pid<T> {
    kp: f64,
    ki: f64,
    kd: f64,
    integral_limit: f64,
    output_limit: f64,
    integral: T,
    previous_error: T,
}

impl<T> Pid<T>
where
    T: Variable,
{
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            integral_limit: f64::INFINITY,
            output_limit: f64::INFINITY,
            integral: T::zero(),
            previous_error: T::zero(),
        }
    }

    pub fn with_integral_limit(mut self, limit: f64) -> Self {
        self.integral_limit = limit;
        self
    }

    pub fn with_output_limit(mut self, limit: f64) -> Self {
        self.output_limit = limit;
        self
    }

    pub fn step(&mut self, input: T, feedback: T) -> T {
        let error = input - feedback;
        self.integral = (self.integral + error).cap_magnitude(self.integral_limit);
        let derivative = error - self.previous_error;
        self.previous_error = error;

        (error * self.kp + self.integral * self.ki + derivative * self.kd)
            .cap_magnitude(self.output_limit)
    }

    /// Forget the accumulated integral and the previous error.
    pub fn reset(&mut self) {
        self.integral = T::zero();
        self.previous_error = T::zero();
    }
}
