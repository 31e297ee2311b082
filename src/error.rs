use thiserror::Error;

/// Failure talking to one of the external collaborators.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request to {service} failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} responded with status {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },
    #[error("failed to obtain access token: {0}")]
    Auth(String),
    #[error("unexpected response from {service}: {detail}")]
    Malformed {
        service: &'static str,
        detail: String,
    },
    #[error("mail delivery failed: {0}")]
    Mail(String),
}

impl ServiceError {
    pub fn transport(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Self::Transport { service, source }
    }

    pub fn malformed(service: &'static str, detail: impl ToString) -> Self {
        Self::Malformed {
            service,
            detail: detail.to_string(),
        }
    }
}
