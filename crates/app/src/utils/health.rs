//! Health report types for the `/health` endpoint

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Overall health of the service.
///
/// The service is healthy only when every component is.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub is_healthy: bool,
    pub components: Vec<ComponentHealth>,
    pub checked_at: DateTime<Utc>,
}

impl HealthStatus {
    #[must_use]
    pub fn from_components(components: Vec<ComponentHealth>) -> Self {
        Self {
            is_healthy: components.iter().all(|c| c.is_healthy),
            components,
            checked_at: Utc::now(),
        }
    }
}

/// Health of a single component.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentHealth {
    pub name: String,
    pub is_healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentHealth {
    pub fn healthy(name: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: true, message: None }
    }

    pub fn unhealthy(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), is_healthy: false, message: Some(message.into()) }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_unhealthy_component_fails_the_report() {
        let status = HealthStatus::from_components(vec![
            ComponentHealth::healthy("database"),
            ComponentHealth::unhealthy("scheduler", "not running"),
        ]);

        assert!(!status.is_healthy);
        assert_eq!(status.components[1].message.as_deref(), Some("not running"));
    }

    #[test]
    fn serializes_camel_case_and_omits_empty_message() {
        let status = HealthStatus::from_components(vec![ComponentHealth::healthy("database")]);

        let json = serde_json::to_value(&status).unwrap();

        assert_eq!(json["isHealthy"], true);
        assert!(json["components"][0].get("message").is_none());
    }
}
