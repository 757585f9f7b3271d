//! Domain identifier types with validation
//!
//! Newtype wrappers so appointment, patient and draft identifiers cannot be
//! mixed up at call sites.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::time::{date_key, ClockTime};

/// Persisted appointment identifier
///
/// Assigned by the clinic backend (a document id).
///
/// # Examples
///
/// ```
/// use slotwise::domain::ids::AppointmentId;
/// use std::str::FromStr;
///
/// let id = AppointmentId::from_str("665f1c2e9b1d4a0012ab34cd").unwrap();
/// assert_eq!(id.as_str(), "665f1c2e9b1d4a0012ab34cd");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppointmentId(String);

impl AppointmentId {
    /// Creates a new AppointmentId, rejecting blank input
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Appointment ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the appointment ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AppointmentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for AppointmentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Patient identifier
///
/// Reference to a patient record owned by the external patient service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientId(String);

impl PatientId {
    /// Creates a new PatientId, rejecting blank input
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Patient ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the patient ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Draft identifier
///
/// Unique within one draft set. Format: `{YYYY-MM-DD}-{HH:MM}-{sequence}`.
///
/// # Examples
///
/// ```
/// use slotwise::domain::ids::DraftId;
/// use slotwise::domain::time::ClockTime;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
/// let time: ClockTime = "09:00".parse().unwrap();
/// let id = DraftId::from_parts(date, time, 3);
/// assert_eq!(id.as_str(), "2024-06-10-09:00-3");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DraftId(String);

impl DraftId {
    /// Builds the id from its slot and the set's sequence counter
    pub fn from_parts(date: NaiveDate, time: ClockTime, sequence: u64) -> Self {
        Self(format!("{}-{}-{}", date_key(date), time, sequence))
    }

    /// Returns the draft ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DraftId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("Draft ID cannot be empty".to_string());
        }
        Ok(Self(s.to_string()))
    }
}

impl AsRef<str> for DraftId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appointment_id_valid() {
        let id = AppointmentId::new("apt-1").unwrap();
        assert_eq!(id.as_str(), "apt-1");
        assert_eq!(id.to_string(), "apt-1");
        assert_eq!(id.into_inner(), "apt-1");
    }

    #[test]
    fn test_appointment_id_empty() {
        assert!(AppointmentId::new("").is_err());
        assert!(AppointmentId::new("   ").is_err());
    }

    #[test]
    fn test_patient_id_from_str() {
        let id = PatientId::from_str("P1").unwrap();
        assert_eq!(id.as_ref(), "P1");
        assert!(PatientId::from_str("").is_err());
    }

    #[test]
    fn test_draft_id_from_parts() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let time = ClockTime::from_hm(14, 5).unwrap();
        assert_eq!(DraftId::from_parts(date, time, 12).as_str(), "2024-06-10-14:05-12");
    }

    #[test]
    fn test_draft_ids_differ_by_sequence() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let time = ClockTime::from_hm(9, 0).unwrap();
        assert_ne!(
            DraftId::from_parts(date, time, 1),
            DraftId::from_parts(date, time, 2)
        );
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let id = AppointmentId::new("abc").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc\"");
    }
}
