use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::ComplaintError;

// ============================================================================
// Complaint Value Objects
// ============================================================================

/// Civic issue category chosen by the citizen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Road,
    Water,
    Electricity,
    Sanitation,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Road,
        Category::Water,
        Category::Electricity,
        Category::Sanitation,
        Category::Other,
    ];

    /// Fixed category → department routing table
    pub fn department(self) -> Department {
        match self {
            Category::Road => Department::PublicWorks,
            Category::Water => Department::WaterSupply,
            Category::Electricity => Department::ElectricityBoard,
            Category::Sanitation => Department::Sanitation,
            Category::Other => Department::General,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Road => "Road",
            Category::Water => "Water",
            Category::Electricity => "Electricity",
            Category::Sanitation => "Sanitation",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ComplaintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| ComplaintError::UnknownCategory(s.to_string()))
    }
}

/// Organizational unit derived from the category, never set directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "Public Works")]
    PublicWorks,
    #[serde(rename = "Water Supply")]
    WaterSupply,
    #[serde(rename = "Electricity Board")]
    ElectricityBoard,
    #[serde(rename = "Sanitation Department")]
    Sanitation,
    General,
}

impl Department {
    pub fn as_str(self) -> &'static str {
        match self {
            Department::PublicWorks => "Public Works",
            Department::WaterSupply => "Water Supply",
            Department::ElectricityBoard => "Electricity Board",
            Department::Sanitation => "Sanitation Department",
            Department::General => "General",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complaint lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComplaintStatus {
    Pending,
    #[serde(rename = "In Progress", alias = "InProgress")]
    InProgress,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::InProgress => "In Progress",
            ComplaintStatus::Resolved => "Resolved",
            ComplaintStatus::Rejected => "Rejected",
        }
    }

    /// Statuses that still count towards an officer's workload
    pub const OPEN: [ComplaintStatus; 2] = [ComplaintStatus::Pending, ComplaintStatus::InProgress];
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = ComplaintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Pending" => Ok(ComplaintStatus::Pending),
            "In Progress" | "InProgress" => Ok(ComplaintStatus::InProgress),
            "Resolved" => Ok(ComplaintStatus::Resolved),
            "Rejected" => Ok(ComplaintStatus::Rejected),
            _ => Err(ComplaintError::UnknownStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Where the issue was observed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub author: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// One entry of the append-only status history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: ComplaintStatus,
    pub changed_by: Uuid,
    pub changed_at: DateTime<Utc>,
    pub notes: Option<String>,
}

// ============================================================================
// Human-readable complaint identifier
// ============================================================================

/// `COMP-YYYYMMDD-NNNNN`, suffix in `[10000, 99999]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HumanId(String);

impl HumanId {
    pub const PREFIX: &'static str = "COMP";
    pub const SUFFIX_MIN: u32 = 10_000;
    pub const SUFFIX_MAX: u32 = 99_999;

    /// Build an id for `date`; the suffix is clamped into the allowed range
    pub fn new(date: NaiveDate, suffix: u32) -> Self {
        let suffix = suffix.clamp(Self::SUFFIX_MIN, Self::SUFFIX_MAX);
        Self(format!("{}-{}-{}", Self::PREFIX, date.format("%Y%m%d"), suffix))
    }

    /// Parse and validate an existing identifier
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.split('-');
        let (prefix, date, suffix) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() || prefix != Self::PREFIX {
            return None;
        }
        if date.len() != 8 || suffix.len() != 5 {
            return None;
        }
        NaiveDate::parse_from_str(date, "%Y%m%d").ok()?;
        let n: u32 = suffix.parse().ok()?;
        if !(Self::SUFFIX_MIN..=Self::SUFFIX_MAX).contains(&n) {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    pub fn date(&self) -> Option<NaiveDate> {
        let segment = self.0.split('-').nth(1)?;
        NaiveDate::parse_from_str(segment, "%Y%m%d").ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HumanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_department_mapping() {
        assert_eq!(Category::Road.department(), Department::PublicWorks);
        assert_eq!(Category::Water.department(), Department::WaterSupply);
        assert_eq!(Category::Electricity.department(), Department::ElectricityBoard);
        assert_eq!(Category::Sanitation.department(), Department::Sanitation);
        assert_eq!(Category::Other.department(), Department::General);
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Water".parse::<Category>().unwrap(), Category::Water);
        assert_eq!(" Road ".parse::<Category>().unwrap(), Category::Road);

        let err = "Parks".parse::<Category>().unwrap_err();
        assert!(matches!(err, ComplaintError::UnknownCategory(c) if c == "Parks"));
    }

    #[test]
    fn test_category_and_status_parsing_are_case_sensitive() {
        assert!(matches!("water".parse::<Category>(), Err(ComplaintError::UnknownCategory(_))));
        assert!(matches!("ROAD".parse::<Category>(), Err(ComplaintError::UnknownCategory(_))));
        assert!(matches!("resolved".parse::<ComplaintStatus>(), Err(ComplaintError::UnknownStatus(_))));
        assert!(matches!("in progress".parse::<ComplaintStatus>(), Err(ComplaintError::UnknownStatus(_))));

        assert_eq!(" In Progress ".parse::<ComplaintStatus>().unwrap(), ComplaintStatus::InProgress);
        assert_eq!("InProgress".parse::<ComplaintStatus>().unwrap(), ComplaintStatus::InProgress);
    }

    #[test]
    fn test_status_parsing_accepts_wire_names() {
        assert_eq!("In Progress".parse::<ComplaintStatus>().unwrap(), ComplaintStatus::InProgress);
        assert_eq!("InProgress".parse::<ComplaintStatus>().unwrap(), ComplaintStatus::InProgress);
        assert_eq!("Resolved".parse::<ComplaintStatus>().unwrap(), ComplaintStatus::Resolved);
        assert!(matches!(
            "Closed".parse::<ComplaintStatus>(),
            Err(ComplaintError::UnknownStatus(_))
        ));
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&ComplaintStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");

        let department = serde_json::to_string(&Department::Sanitation).unwrap();
        assert_eq!(department, "\"Sanitation Department\"");
    }

    #[test]
    fn test_human_id_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let id = HumanId::new(date, 12345);

        assert_eq!(id.as_str(), "COMP-20240307-12345");
        assert_eq!(id.date(), Some(date));
        assert_eq!(HumanId::parse("COMP-20240307-12345"), Some(id));
    }

    #[test]
    fn test_human_id_rejects_malformed() {
        assert!(HumanId::parse("COMP-20240307-1234").is_none());
        assert!(HumanId::parse("COMP-20241307-12345").is_none());
        assert!(HumanId::parse("CASE-20240307-12345").is_none());
        assert!(HumanId::parse("COMP-20240307-09999").is_none());
        assert!(HumanId::parse("COMP-20240307-12345-1").is_none());
    }

    #[test]
    fn test_priority_defaults_to_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
    }
}
