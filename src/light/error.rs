use thiserror::Error;

#[derive(Error, Debug)]
pub enum LightError {
    #[error("No device found")]
    DeviceNotFound,

    #[error("Invalid light command: {0}")]
    InvalidCommand(String),

    #[error("No Bluetooth adapter available")]
    NoAdapter,

    #[error("Light characteristic {0} not found")]
    CharacteristicNotFound(String),

    #[error("Bluetooth transport error: {0}")]
    Transport(String),

    #[error("Light control unavailable: built without `{0}` support")]
    Unsupported(&'static str),
}

pub type LightResult<T> = std::result::Result<T, LightError>;
