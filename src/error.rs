//! Error types and handling for `WeatherCheck`

use thiserror::Error;

/// Main error type for the `WeatherCheck` application
#[derive(Error, Debug)]
pub enum WeatherCheckError {
    /// The location could not be resolved to coordinates
    #[error("Location not found: {location}")]
    LocationNotFound { location: String },

    /// Network or transport failure talking to the provider
    #[error("Provider unreachable: {message}")]
    ProviderUnreachable { message: String },

    /// The provider answered with a body we could not map
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WeatherCheckError {
    /// Create a new location-not-found error
    pub fn location_not_found<S: Into<String>>(location: S) -> Self {
        Self::LocationNotFound {
            location: location.into(),
        }
    }

    /// Create a new provider-unreachable error
    pub fn provider_unreachable<S: Into<String>>(message: S) -> Self {
        Self::ProviderUnreachable {
            message: message.into(),
        }
    }

    /// Create a new malformed-response error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether this error means "nothing to show" rather than a failure worth alerting on
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, WeatherCheckError::LocationNotFound { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherCheckError::LocationNotFound { location } => {
                format!("No weather data is available for '{location}'.")
            }
            WeatherCheckError::ProviderUnreachable { .. } => {
                "Unable to reach the weather provider. Please check your internet connection."
                    .to_string()
            }
            WeatherCheckError::MalformedResponse { .. } => {
                "The weather provider returned data we could not understand.".to_string()
            }
            WeatherCheckError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
            WeatherCheckError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<serde_json::Error> for WeatherCheckError {
    fn from(err: serde_json::Error) -> Self {
        WeatherCheckError::malformed(err.to_string())
    }
}

/// The request URL is stripped first, it carries the API key
impl From<reqwest::Error> for WeatherCheckError {
    fn from(err: reqwest::Error) -> Self {
        WeatherCheckError::provider_unreachable(err.without_url().to_string())
    }
}
