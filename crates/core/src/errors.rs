use displaydoc::Display;

/// A specialized result type for the bulb driver.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while driving the bulb.
#[derive(Display, Debug)]
pub enum Error {
    /// The hue range must satisfy `0 <= min < max <= 1`, got {min}..{max}.
    InvalidHueRange { min: f64, max: f64 },
    /// The {name} level must be within `0..=1`, got {level}.
    InvalidLevel { name: &'static str, level: f64 },
    /// The {name} duration must be positive.
    InvalidDuration { name: &'static str },
    /// Malformed bulb address "{0}", expected six colon-separated hex octets.
    InvalidAddress(String),
    /// The bulb did not acknowledge the connection in time.
    ConnectTimeout,
    /// The bulb rejected the connection: {0}.
    ConnectRejected(String),
    /// The BLE session has been closed unexpectedly.
    SessionClosed,
    /// Unable to write a command to the BLE session in time.
    SendTimeout,
    /// I/O error: {0}.
    Io(std::io::Error),
}

impl Error {
    /// Creates a new level validation error.
    pub(crate) fn invalid_level(name: &'static str, level: f64) -> Self {
        Self::InvalidLevel { name, level }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
