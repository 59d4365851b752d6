use service::survey::SurveyService;

/// Shared handler state; cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub survey: SurveyService,
}
