use nalgebra::{SMatrix, SVector};

/// Measurement variance standing in for a component that was not measured
const UNOBSERVED_VARIANCE: f64 = 1e12;

/// Linear Kalman filter with identity transition and observation matrices.
///
/// The model is "constant position plus known velocity": the control input is
/// a velocity, integrated over `dt` during prediction.
#[allow(non_snake_case)]
#[derive(Debug, Clone)]
pub struct Kalman<const N: usize> {
    /// Process noise covariance
    Q: SMatrix<f64, N, N>,
    /// Measurement noise covariance
    R: SMatrix<f64, N, N>,
    /// Error covariance
    P: SMatrix<f64, N, N>,
    /// State estimate
    x: SVector<f64, N>,
}

impl<const N: usize> Kalman<N> {
    /// Create a filter from the diagonals of `Q` and `R`.
    pub fn new(
        x: SVector<f64, N>,
        initial_variance: f64,
        process_noise: SVector<f64, N>,
        measurement_noise: SVector<f64, N>,
    ) -> Self {
        Kalman {
            Q: SMatrix::from_diagonal(&process_noise),
            R: SMatrix::from_diagonal(&measurement_noise),
            P: SMatrix::identity() * initial_variance,
            x,
        }
    }

    pub fn set_noise(&mut self, process_noise: SVector<f64, N>, measurement_noise: SVector<f64, N>) {
        self.Q = SMatrix::from_diagonal(&process_noise);
        self.R = SMatrix::from_diagonal(&measurement_noise);
    }

    /// Advance the state by `u * dt` and grow the covariance by `Q`.
    ///
    /// A non-positive `dt` contributes no motion.
    pub fn predict(&mut self, u: &SVector<f64, N>, dt: f64) {
        if dt > 0.0 {
            self.x += u * dt;
        }
        self.P += self.Q;
    }

    /// Fold in a measurement. Returns the corrected state.
    ///
    /// If the innovation covariance cannot be inverted the measurement is
    /// dropped and the predicted state is kept.
    pub fn correct(&mut self, z: &SVector<f64, N>) -> SVector<f64, N> {
        self.correct_partial(z, &[true; N])
    }

    /// Like [`Kalman::correct`], but components with `observed[i] == false`
    /// carry no information: their estimate and variance are left as
    /// predicted.
    #[allow(non_snake_case)]
    pub fn correct_partial(&mut self, z: &SVector<f64, N>, observed: &[bool; N]) -> SVector<f64, N> {
        let mut R = self.R;
        let mut r = z - self.x;
        for (i, seen) in observed.iter().enumerate() {
            if !seen {
                R[(i, i)] = UNOBSERVED_VARIANCE;
                r[i] = 0.0;
            }
        }
        let S = self.P + R;
        match S.try_inverse() {
            Some(S_inv) => {
                let K = self.P * S_inv;
                self.x += K * r;
                self.P = (SMatrix::<f64, N, N>::identity() - K) * self.P;
            }
            None => log::warn!("Singular innovation covariance, dropping measurement"),
        }
        self.x
    }

    pub fn state(&self) -> &SVector<f64, N> {
        &self.x
    }

    pub fn state_mut(&mut self) -> &mut SVector<f64, N> {
        &mut self.x
    }

    pub fn covariance(&self) -> &SMatrix<f64, N, N> {
        &self.P
    }
}
