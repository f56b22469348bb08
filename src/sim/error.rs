use thiserror::Error;

/// A station action that was refused. State is untouched when this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StationError {
    #[error("Put on safety goggles first (press G).")]
    SafetyGateOff,
}
