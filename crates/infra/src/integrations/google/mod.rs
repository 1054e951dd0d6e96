//! Google identity and calendar adapters

pub mod calendar;
pub mod oauth;
mod types;

pub use calendar::GoogleCalendarClient;
pub use oauth::GoogleIdentityProvider;
