//! Service layer for the survey relay.
//! - `phone` turns whatever the form sent into CRM and sheet formats.
//! - `crm` and `sheet` wrap the two outbound HTTP collaborators behind traits.
//! - `survey` sequences lookup, update and logging for one submission.

pub mod errors;
pub mod phone;
pub mod crm;
pub mod sheet;
pub mod survey;
