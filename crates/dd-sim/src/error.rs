use dd_core::{DdError, DroneId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] DdError),

    #[error("delivery task for {drone} did not finish: {reason}")]
    TaskFailed {
        drone:  DroneId,
        reason: String,
    },
}

pub type SimResult<T> = Result<T, SimError>;
