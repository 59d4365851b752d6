use thiserror::Error;

/// Failures talking to the CRM. Never carries credentials.
#[derive(Debug, Error)]
pub enum CrmError {
    #[error("crm transport error: {0}")]
    Transport(String),
    #[error("crm returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("sheet transport error: {0}")]
    Transport(String),
    #[error("sheet returned {0}")]
    Status(u16),
}

impl CrmError {
    /// Request URLs hold the access and secret keys, so they are dropped.
    pub fn transport(e: reqwest::Error) -> Self {
        Self::Transport(e.without_url().to_string())
    }
}

impl SheetError {
    pub fn transport(e: reqwest::Error) -> Self {
        Self::Transport(e.without_url().to_string())
    }
}
