//! Survey workflow: domain types, errors, and the sequencing service.
//!
//! One request runs lookup, update and sheet logging strictly in order.
//! Only a missing phone is reported to the caller; collaborator failures are
//! logged and recorded in the [`domain::DeliveryReport`].

pub mod domain;
pub mod errors;
pub mod service;

pub use service::SurveyService;
