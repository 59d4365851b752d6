use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use super::domain::{
    DeliveryReport, LookupOutcome, StepStatus, SubmitOutcome, SurveyAction, SurveyOutcome,
    SurveyReply, SurveyRequest,
};
use super::errors::SurveyError;
use crate::crm::{LeadRepository, LeadSnapshot, LeadUpdate};
use crate::phone;
use crate::sheet::{ResponseLog, SheetRow};

/// Survey workflow independent of the web framework.
///
/// Either collaborator may be absent (missing credentials or URL); its step
/// is then skipped.
#[derive(Clone)]
pub struct SurveyService {
    leads: Option<Arc<dyn LeadRepository>>,
    responses: Option<Arc<dyn ResponseLog>>,
    owner_id: String,
}

impl SurveyService {
    pub fn new(
        leads: Option<Arc<dyn LeadRepository>>,
        responses: Option<Arc<dyn ResponseLog>>,
        owner_id: impl Into<String>,
    ) -> Self {
        Self { leads, responses, owner_id: owner_id.into() }
    }

    pub fn crm_enabled(&self) -> bool {
        self.leads.is_some()
    }

    pub fn sheet_enabled(&self) -> bool {
        self.responses.is_some()
    }

    /// Run one survey request.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::crm::{mock::MockLeadRepository, LeadRepository, LeadSnapshot};
    /// use service::survey::{SurveyService, domain::{SurveyReply, SurveyRequest}};
    /// let leads: Arc<dyn LeadRepository> = Arc::new(MockLeadRepository::default().with_lead(
    ///     "+971-501234567",
    ///     LeadSnapshot { first_name: "Amina".into(), prospect_stage: None },
    /// ));
    /// let svc = SurveyService::new(Some(leads), None, "owner");
    /// let req = SurveyRequest { phone: Some("+971-501234567".into()), action: Some("retrieve".into()), ..Default::default() };
    /// let out = tokio_test::block_on(svc.handle(req)).unwrap();
    /// match out.reply {
    ///     SurveyReply::Lookup(l) => assert!(l.exists && l.first_name == "Amina"),
    ///     _ => unreachable!(),
    /// }
    /// ```
    #[instrument(skip(self, req), fields(action = ?req.action()))]
    pub async fn handle(&self, req: SurveyRequest) -> Result<SurveyOutcome, SurveyError> {
        let raw_phone = req
            .phone
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(SurveyError::MissingPhone)?;
        let phone = phone::normalize(raw_phone);
        let masked = phone::mask(&phone.sheet);
        if !phone.is_complete() {
            debug!(event = "phone_incomplete", phone = %masked, "phone is not a 9-digit local number; forwarding as-is");
        }
        if let Some(name) = req.first_name.as_deref() {
            debug!(client_first_name = %name, "client-supplied first name ignored");
        }

        let mut report = DeliveryReport::default();
        let lead = self.lookup(&phone.crm, &mut report).await;
        let first_name = lead.as_ref().map(|l| l.first_name.clone()).unwrap_or_default();
        let exists = lead.is_some();

        if req.action() == SurveyAction::Retrieve {
            info!(event = "lead_lookup", phone = %masked, exists, "lead lookup served");
            return Ok(SurveyOutcome {
                reply: SurveyReply::Lookup(LookupOutcome { first_name, exists }),
                report,
            });
        }

        let status = req.status.unwrap_or_default();
        let feedback = req.feedback.unwrap_or_default();

        if let Some(leads) = &self.leads {
            let update = LeadUpdate {
                phone: phone.crm.clone(),
                status: status.clone(),
                feedback: feedback.clone(),
                owner_id: self.owner_id.clone(),
                prospect_stage: lead.and_then(|l| l.prospect_stage),
            };
            report.crm_update = match leads.upsert(&update).await {
                Ok(()) => StepStatus::Ok,
                Err(e) => {
                    warn!(event = "crm_upsert_failed", error = %e, "Lead.CreateOrUpdate failed");
                    StepStatus::Failed
                }
            };
        }

        if let Some(responses) = &self.responses {
            let row = SheetRow { phone: phone.sheet.clone(), status: status.clone(), feedback };
            report.sheet = match responses.append(&row).await {
                Ok(()) => StepStatus::Ok,
                Err(e) => {
                    error!(event = "sheet_append_failed", error = %e, "writing to sheet failed");
                    StepStatus::Failed
                }
            };
        }

        info!(
            event = "survey_submitted",
            phone = %masked,
            %status,
            existing = exists,
            crm_update = ?report.crm_update,
            sheet = ?report.sheet,
            "survey response processed"
        );
        Ok(SurveyOutcome {
            reply: SurveyReply::Submitted(SubmitOutcome { first_name, is_existing: exists }),
            report,
        })
    }

    async fn lookup(&self, crm_phone: &str, report: &mut DeliveryReport) -> Option<LeadSnapshot> {
        let leads = self.leads.as_ref()?;
        match leads.find_by_phone(crm_phone).await {
            Ok(found) => {
                report.crm_lookup = StepStatus::Ok;
                found
            }
            Err(e) => {
                warn!(event = "crm_lookup_failed", error = %e, "RetrieveLeadByPhoneNumber failed");
                report.crm_lookup = StepStatus::Failed;
                None
            }
        }
    }
}
