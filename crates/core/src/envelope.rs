//! Request envelope model.
//!
//! A minimal subset of the voice platform's request envelope: only the parts
//! needed to identify who a request belongs to. Unknown fields are ignored so
//! full platform payloads deserialize without loss of the fields we care about.

use serde::{Deserialize, Serialize};

/// Top-level request envelope sent by the platform to a skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
    #[serde(default)]
    pub context: Context,
    #[serde(default)]
    pub request: serde_json::Value,
}

/// Session information, present only for in-session requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    #[serde(default)]
    pub new: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<Application>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Request context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    #[serde(rename = "System", default)]
    pub system: SystemState,
}

/// System state carried on every request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<Application>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_id: String,
}

/// The account that invoked the skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// The device the request came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_id: String,
}

impl RequestEnvelope {
    /// Creates an envelope carrying only a user identity.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            version: "1.0".to_string(),
            session: None,
            context: Context {
                system: SystemState {
                    user: Some(User {
                        user_id: user_id.into(),
                        access_token: None,
                    }),
                    ..SystemState::default()
                },
            },
            request: serde_json::Value::Null,
        }
    }

    /// Creates an envelope carrying a user and a device identity.
    pub fn for_device(user_id: impl Into<String>, device_id: impl Into<String>) -> Self {
        let mut envelope = Self::for_user(user_id);
        envelope.context.system.device = Some(Device {
            device_id: device_id.into(),
        });
        envelope
    }

    /// The invoking user's id, if present.
    pub fn user_id(&self) -> Option<&str> {
        self.context
            .system
            .user
            .as_ref()
            .map(|user| user.user_id.as_str())
    }

    /// The invoking device's id, if present.
    pub fn device_id(&self) -> Option<&str> {
        self.context
            .system
            .device
            .as_ref()
            .map(|device| device.device_id.as_str())
    }
}
