use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Citizen,
    Officer,
    Admin,
}

/// Account as seen by the workflow; authentication lives elsewhere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            email: email.into(),
            role,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn deactivated(mut self) -> Self {
        self.is_active = false;
        self
    }

    pub fn is_officer(&self) -> bool {
        self.role == Role::Officer
    }
}

/// A push target registered by one of the user's devices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceRegistration {
    pub user_id: Uuid,
    #[serde(rename = "deviceToken")]
    pub token: String,
    pub platform: String,
    pub registered_at: DateTime<Utc>,
}

impl DeviceRegistration {
    pub const UNKNOWN_PLATFORM: &'static str = "unknown";

    /// Blank or missing platform reads as "unknown"
    pub fn new(user_id: Uuid, token: impl Into<String>, platform: Option<&str>, now: DateTime<Utc>) -> Self {
        let platform = platform
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(Self::UNKNOWN_PLATFORM);

        Self {
            user_id,
            token: token.into().trim().to_string(),
            platform: platform.to_string(),
            registered_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_platform_defaults_to_unknown() {
        let user = Uuid::new_v4();

        let device = DeviceRegistration::new(user, " fcm-abc ", None, Utc::now());
        assert_eq!(device.token, "fcm-abc");
        assert_eq!(device.platform, "unknown");

        let device = DeviceRegistration::new(user, "apns-1", Some("  "), Utc::now());
        assert_eq!(device.platform, "unknown");

        let json = serde_json::to_value(DeviceRegistration::new(user, "apns-1", Some("ios"), Utc::now())).unwrap();
        assert_eq!(json["deviceToken"], "apns-1");
        assert_eq!(json["platform"], "ios");
        assert!(json.get("registeredAt").is_some());
    }
}
