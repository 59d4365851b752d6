//! LeadSquared REST client.
//!
//! Authentication is by `accessKey`/`secretKey` query parameters, so request
//! URLs are never logged and transport errors are stripped of them.

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::{LeadRepository, LeadSnapshot, LeadUpdate};
use crate::errors::CrmError;
use crate::phone;

const RETRIEVE_BY_PHONE_PATH: &str = "/v2/LeadManagement.svc/RetrieveLeadByPhoneNumber";
const CREATE_OR_UPDATE_PATH: &str = "/v2/LeadManagement.svc/Lead.CreateOrUpdate";

#[derive(Clone)]
pub struct LeadSquaredClient {
    http: reqwest::Client,
    base_url: String,
    access_key: String,
    secret_key: String,
}

impl LeadSquaredClient {
    pub fn new(http: reqwest::Client, base_url: &str, access_key: &str, secret_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// First lead of a retrieve response; anything but a non-empty array means "no lead".
///
/// Only the first record is read. Fields that are not strings count as absent.
fn first_lead(body: serde_json::Value) -> Option<LeadSnapshot> {
    let records: Vec<serde_json::Value> = serde_json::from_value(body).ok()?;
    let lead = records.into_iter().next()?;
    let text = |key: &str| lead.get(key).and_then(|v| v.as_str()).map(str::to_string);
    Some(LeadSnapshot {
        first_name: text("FirstName").unwrap_or_default(),
        prospect_stage: text("ProspectStage").filter(|s| !s.is_empty()),
    })
}

#[async_trait]
impl LeadRepository for LeadSquaredClient {
    #[instrument(skip(self, crm_phone), fields(phone = %phone::mask(crm_phone)))]
    async fn find_by_phone(&self, crm_phone: &str) -> Result<Option<LeadSnapshot>, CrmError> {
        let resp = self
            .http
            .get(self.url(RETRIEVE_BY_PHONE_PATH))
            .query(&[
                ("accessKey", self.access_key.as_str()),
                ("secretKey", self.secret_key.as_str()),
                ("phone", crm_phone),
            ])
            .send()
            .await
            .map_err(CrmError::transport)?;

        let status = resp.status();
        if !status.is_success() {
            warn!(event = "crm_lookup_status", status = status.as_u16(), "lead lookup returned non-success; treating as no lead");
            return Ok(None);
        }

        let body = match resp.json::<serde_json::Value>().await {
            Ok(v) => v,
            Err(e) => {
                debug!(event = "crm_lookup_parse", error = %e.without_url(), "lead lookup body was not json");
                return Ok(None);
            }
        };
        let lead = first_lead(body);
        debug!(event = "crm_lookup", found = lead.is_some(), "lead lookup finished");
        Ok(lead)
    }

    #[instrument(skip(self, update), fields(phone = %phone::mask(&update.phone)))]
    async fn upsert(&self, update: &LeadUpdate) -> Result<(), CrmError> {
        let resp = self
            .http
            .post(self.url(CREATE_OR_UPDATE_PATH))
            .query(&[
                ("postUpdatedLead", "false"),
                ("accessKey", self.access_key.as_str()),
                ("secretKey", self.secret_key.as_str()),
            ])
            .json(&update.attributes())
            .send()
            .await
            .map_err(CrmError::transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CrmError::Status { status: status.as_u16(), body });
        }
        debug!(event = "crm_upsert", status = status.as_u16(), "lead create-or-update accepted");
        Ok(())
    }
}
