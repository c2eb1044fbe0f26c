use thiserror::Error;

use crate::provider::ProviderId;

/// Failure to obtain a payload from a provider. Never retried.
///
/// `Clone` so a failed forecast request can travel inside an otherwise
/// successful payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Failed to reach {provider}: {message}")]
    Transport { provider: ProviderId, message: String },

    #[error("{provider} request failed with status {status}: {message}")]
    Status { provider: ProviderId, status: u16, message: String },

    #[error("{provider} returned an unreadable body: {message}")]
    InvalidBody { provider: ProviderId, message: String },
}

impl FetchError {
    pub fn provider(&self) -> ProviderId {
        match self {
            FetchError::Transport { provider, .. }
            | FetchError::Status { provider, .. }
            | FetchError::InvalidBody { provider, .. } => *provider,
        }
    }
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Malformed {provider} payload: {reason}")]
    MalformedPayload { provider: ProviderId, reason: String },
}

impl WeatherError {
    pub(crate) fn malformed(provider: ProviderId, reason: impl Into<String>) -> Self {
        WeatherError::MalformedPayload { provider, reason: reason.into() }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, WeatherError::MalformedPayload { .. })
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
