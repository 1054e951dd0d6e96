//! Domain types and models
//!
//! Records persisted by the stores, the provider boundary types the adapters
//! translate raw JSON into, and the small request/response shapes shared by
//! the services and the HTTP surface.

pub mod credential;
pub mod meeting_lead;
pub mod provider_event;

pub use credential::{
    AuthorizationRequest, CalendarCredential, ConnectionState, CredentialGrant, CredentialView,
    ExchangeOutcome, ExchangeRequest, PendingAuthorization, TokenGrant,
};
pub use meeting_lead::{
    MeetingEnrichment, MeetingLead, MeetingLeadStatus, NewMeetingLead, SyncReport, UpsertOutcome,
};
pub use provider_event::{EventTime, ProviderEvent, SyncWindow};
