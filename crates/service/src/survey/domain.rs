use serde::Deserialize;

/// Body posted by the form pages.
///
/// `firstName` is sent by the survey and feedback pages but the CRM name is
/// authoritative, so it is only logged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyRequest {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyAction {
    /// First page: look the lead up, write nothing.
    Retrieve,
    /// Survey or feedback page: update the CRM and log to the sheet.
    Submit,
}

impl SurveyRequest {
    pub fn action(&self) -> SurveyAction {
        match self.action.as_deref() {
            Some("retrieve") => SurveyAction::Retrieve,
            _ => SurveyAction::Submit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupOutcome {
    pub first_name: String,
    pub exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub first_name: String,
    pub is_existing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurveyReply {
    Lookup(LookupOutcome),
    Submitted(SubmitOutcome),
}

/// What happened to one outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepStatus {
    /// Collaborator not configured, or not needed for this action.
    #[default]
    Skipped,
    Ok,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryReport {
    pub crm_lookup: StepStatus,
    pub crm_update: StepStatus,
    pub sheet: StepStatus,
}

impl DeliveryReport {
    pub fn crm_failed(&self) -> bool {
        self.crm_lookup == StepStatus::Failed || self.crm_update == StepStatus::Failed
    }

    pub fn sheet_failed(&self) -> bool {
        self.sheet == StepStatus::Failed
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyOutcome {
    pub reply: SurveyReply,
    pub report: DeliveryReport,
}
