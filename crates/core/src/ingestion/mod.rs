//! Calendar meeting ingestion

pub mod ports;
pub mod service;

pub use service::{build_meeting_lead, MeetingIngestionPipeline};
