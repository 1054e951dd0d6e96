//! Meeting-lead queries and status transitions

pub mod service;

pub use service::MeetingLeadService;
