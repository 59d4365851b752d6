use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use service::survey::domain::{SurveyReply, SurveyRequest};

use crate::errors::ApiError;
use crate::observability;
use crate::state::AppState;

/// Reply to the first page's `action: "retrieve"` call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
    pub success: bool,
    pub first_name: String,
    pub exists: bool,
}

/// Reply to a survey or feedback submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub first_name: String,
    pub is_existing: bool,
}

pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<SurveyRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let _timer = observability::REQUEST_DURATION.start_timer();
    observability::REQUESTS_TOTAL.inc();

    let Json(req) = payload?;
    let outcome = state.survey.handle(req).await?;
    observability::record_delivery(&outcome.report);

    let resp = match outcome.reply {
        SurveyReply::Lookup(l) => {
            observability::LOOKUPS_TOTAL.inc();
            Json(LookupResponse { success: true, first_name: l.first_name, exists: l.exists })
                .into_response()
        }
        SurveyReply::Submitted(s) => {
            observability::SUBMISSIONS_TOTAL.inc();
            Json(SubmitResponse { success: true, first_name: s.first_name, is_existing: s.is_existing })
                .into_response()
        }
    };
    Ok(resp)
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
