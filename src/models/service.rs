// systemd service models

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub name: String,
    pub load_state: String,
    pub active_state: String,
    pub sub_state: String,
    pub description: String,
    pub unit: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub main_pid: String,
    pub memory: String,
    pub tasks: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDetail {
    pub service: ServiceRecord,
    /// Raw `systemctl status` output.
    pub status: String,
    pub logs: Vec<String>,
    pub properties: HashMap<String, String>,
}

/// Unit actions accepted by POST /api/services/{name}/{action}.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
    Enable,
    Disable,
}

impl ServiceAction {
    /// The `systemctl` verb.
    pub fn verb(self) -> &'static str {
        match self {
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
            ServiceAction::Enable => "enable",
            ServiceAction::Disable => "disable",
        }
    }

    /// Past tense used in the success message, e.g. "Service started".
    pub fn past_tense(self) -> &'static str {
        match self {
            ServiceAction::Start => "started",
            ServiceAction::Stop => "stopped",
            ServiceAction::Restart => "restarted",
            ServiceAction::Enable => "enabled",
            ServiceAction::Disable => "disabled",
        }
    }
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

impl FromStr for ServiceAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(ServiceAction::Start),
            "stop" => Ok(ServiceAction::Stop),
            "restart" => Ok(ServiceAction::Restart),
            "enable" => Ok(ServiceAction::Enable),
            "disable" => Ok(ServiceAction::Disable),
            other => Err(format!("unknown service action: {}", other)),
        }
    }
}

/// Body returned by the mutating endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionStatus {
    pub fn container(status: &str) -> Self {
        Self {
            status: status.to_string(),
            message: None,
        }
    }

    pub fn service(action: ServiceAction) -> Self {
        Self {
            status: "success".to_string(),
            message: Some(format!("Service {}", action.past_tense())),
        }
    }
}
