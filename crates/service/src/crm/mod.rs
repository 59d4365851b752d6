//! CRM access: the lead repository seam plus the LeadSquared implementation.

pub mod leadsquared;

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::CrmError;

pub use leadsquared::LeadSquaredClient;

/// What the survey needs to know about an existing lead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadSnapshot {
    pub first_name: String,
    /// `None` when the CRM has no stage or an empty one.
    pub prospect_stage: Option<String>,
}

/// Fields written on every submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadUpdate {
    /// CRM-format phone (`+971-XXXXXXXXX`), also the search key.
    pub phone: String,
    pub status: String,
    pub feedback: String,
    pub owner_id: String,
    /// Stage read during lookup; written back so the update never clears it.
    pub prospect_stage: Option<String>,
}

/// One `{ "Attribute": .., "Value": .. }` pair of a LeadSquared payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LeadAttribute {
    pub attribute: String,
    pub value: String,
}

impl LeadAttribute {
    fn new(attribute: &str, value: &str) -> Self {
        Self { attribute: attribute.to_string(), value: value.to_string() }
    }
}

impl LeadUpdate {
    /// Attribute list in the order the CRM receives it.
    pub fn attributes(&self) -> Vec<LeadAttribute> {
        let mut attrs = vec![
            LeadAttribute::new("Phone", &self.phone),
            LeadAttribute::new("SearchBy", "Phone"),
            LeadAttribute::new("mx_Customer_Satisfaction_Survey", &self.status),
            LeadAttribute::new("mx_feedback", &self.feedback),
            LeadAttribute::new("OwnerId", &self.owner_id),
        ];
        if let Some(stage) = self.prospect_stage.as_deref().filter(|s| !s.is_empty()) {
            attrs.push(LeadAttribute::new("ProspectStage", stage));
        }
        attrs
    }
}

/// Lead lookup and upsert keyed by CRM-format phone.
#[async_trait]
pub trait LeadRepository: Send + Sync {
    async fn find_by_phone(&self, phone: &str) -> Result<Option<LeadSnapshot>, CrmError>;
    async fn upsert(&self, update: &LeadUpdate) -> Result<(), CrmError>;
}

/// Simple in-memory mock repository for tests
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockLeadRepository {
        leads: Mutex<HashMap<String, LeadSnapshot>>, // key: crm phone
        updates: Mutex<Vec<LeadUpdate>>,
        lookups: Mutex<Vec<String>>,
        fail_lookup: bool,
        fail_upsert: bool,
    }

    impl MockLeadRepository {
        pub fn with_lead(self, phone: &str, lead: LeadSnapshot) -> Self {
            self.leads.lock().unwrap().insert(phone.to_string(), lead);
            self
        }

        pub fn failing_lookup(mut self) -> Self {
            self.fail_lookup = true;
            self
        }

        pub fn failing_upsert(mut self) -> Self {
            self.fail_upsert = true;
            self
        }

        pub fn updates(&self) -> Vec<LeadUpdate> {
            self.updates.lock().unwrap().clone()
        }

        pub fn lookups(&self) -> Vec<String> {
            self.lookups.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LeadRepository for MockLeadRepository {
        async fn find_by_phone(&self, phone: &str) -> Result<Option<LeadSnapshot>, CrmError> {
            self.lookups.lock().unwrap().push(phone.to_string());
            if self.fail_lookup {
                return Err(CrmError::Transport("mock lookup failure".into()));
            }
            Ok(self.leads.lock().unwrap().get(phone).cloned())
        }

        async fn upsert(&self, update: &LeadUpdate) -> Result<(), CrmError> {
            self.updates.lock().unwrap().push(update.clone());
            if self.fail_upsert {
                return Err(CrmError::Status { status: 500, body: "mock upsert failure".into() });
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(stage: Option<&str>) -> LeadUpdate {
        LeadUpdate {
            phone: "+971-501234567".into(),
            status: "Satisfied".into(),
            feedback: String::new(),
            owner_id: "owner-1".into(),
            prospect_stage: stage.map(str::to_string),
        }
    }

    #[test]
    fn attributes_follow_crm_order() {
        let names: Vec<String> = update(None).attributes().into_iter().map(|a| a.attribute).collect();
        assert_eq!(
            names,
            ["Phone", "SearchBy", "mx_Customer_Satisfaction_Survey", "mx_feedback", "OwnerId"]
        );
    }

    #[test]
    fn existing_stage_is_written_back() {
        let attrs = update(Some("Customer")).attributes();
        assert_eq!(attrs.last(), Some(&LeadAttribute::new("ProspectStage", "Customer")));
    }

    #[test]
    fn empty_stage_is_not_sent() {
        assert_eq!(update(Some("")).attributes().len(), 5);
    }

    #[test]
    fn attribute_serializes_pascal_case() {
        let json = serde_json::to_value(LeadAttribute::new("SearchBy", "Phone")).unwrap();
        assert_eq!(json, serde_json::json!({"Attribute": "SearchBy", "Value": "Phone"}));
    }
}
