use chromiumoxide::error::CdpError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("CDP error: {0}")]
    Cdp(String),

    /// The DevTools connection is gone; the session cannot be driven again.
    #[error("Browser disconnected: {0}")]
    Disconnected(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CdpError> for Error {
    fn from(err: CdpError) -> Self {
        match err {
            CdpError::Ws(_) | CdpError::NoResponse | CdpError::ChannelSendError(_) => {
                Error::Disconnected(err.to_string())
            }
            other => Error::Cdp(other.to_string()),
        }
    }
}

impl From<Error> for tvqa_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Disconnected(reason) => tvqa_core::Error::SessionLost(reason),
            Error::Io(e) => tvqa_core::Error::Io(e),
            other => tvqa_core::Error::Browser(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnect_maps_to_session_lost() {
        let core: tvqa_core::Error = Error::Disconnected("socket closed".to_string()).into();
        assert!(core.is_session_lost());

        let core: tvqa_core::Error = Error::Cdp("no node".to_string()).into();
        assert!(!core.is_session_lost());
        assert!(core.to_string().contains("no node"));
    }

    #[test]
    fn test_no_response_is_disconnect() {
        assert!(matches!(Error::from(CdpError::NoResponse), Error::Disconnected(_)));
    }
}
