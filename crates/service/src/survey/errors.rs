use thiserror::Error;

/// Errors a survey request can surface to the client
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurveyError {
    #[error("Missing phone")]
    MissingPhone,
}
