//! Error types for integration runs.

use thiserror::Error;

/// Failures reported by the integrators.
///
/// Adaptive-solver failures are never retried or replaced by a fixed-step
/// result; they reach the caller as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegrationError {
    #[error("Step size dt must be finite and positive, got {dt}.")]
    InvalidStep { dt: f64 },

    #[error("Final time must be finite and non-negative, got {t_final}.")]
    InvalidHorizon { t_final: f64 },

    #[error("State dimension mismatch. Expected {expected}, got {actual}.")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Adaptive solver exceeded {max_steps} steps at t = {t}.")]
    MaxStepsReached { t: f64, max_steps: u32 },

    #[error("Adaptive solver step size underflow at t = {t}.")]
    StepSizeUnderflow { t: f64 },

    #[error("Adaptive solver detected stiffness at t = {t}.")]
    StiffnessDetected { t: f64 },
}

pub type Result<T> = std::result::Result<T, IntegrationError>;
