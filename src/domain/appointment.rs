//! Appointment vocabulary shared by the scheduler and the clinic API
//!
//! Visit types, color tags and statuses use the exact labels the clinic
//! backend stores, so they serialize without translation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::SchedulingError;
use super::ids::{AppointmentId, PatientId};
use super::time::ClockTime;

/// Kind of visit being booked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisitType {
    #[serde(rename = "New Patient")]
    NewPatient,
    #[serde(rename = "Re-evaluation")]
    ReEvaluation,
    #[serde(rename = "Regular Visit")]
    RegularVisit,
    #[serde(rename = "Follow-Up")]
    FollowUp,
    #[serde(rename = "Treatment")]
    Treatment,
    #[serde(rename = "Emergency")]
    Emergency,
}

impl VisitType {
    pub const ALL: [VisitType; 6] = [
        VisitType::NewPatient,
        VisitType::ReEvaluation,
        VisitType::RegularVisit,
        VisitType::FollowUp,
        VisitType::Treatment,
        VisitType::Emergency,
    ];

    /// Label used by the clinic backend
    pub fn label(&self) -> &'static str {
        match self {
            VisitType::NewPatient => "New Patient",
            VisitType::ReEvaluation => "Re-evaluation",
            VisitType::RegularVisit => "Regular Visit",
            VisitType::FollowUp => "Follow-Up",
            VisitType::Treatment => "Treatment",
            VisitType::Emergency => "Emergency",
        }
    }

    /// Color tag a draft takes whenever its visit type is set
    pub fn default_color(&self) -> ColorTag {
        match self {
            VisitType::NewPatient => ColorTag::Yellow,
            VisitType::ReEvaluation => ColorTag::Blue,
            VisitType::RegularVisit | VisitType::FollowUp | VisitType::Treatment => {
                ColorTag::Green
            }
            VisitType::Emergency => ColorTag::Red,
        }
    }
}

impl Default for VisitType {
    fn default() -> Self {
        VisitType::RegularVisit
    }
}

impl fmt::Display for VisitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VisitType {
    type Err = SchedulingError;

    /// Case-insensitive; accepts the backend label or a hyphen/underscore slug
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_lowercase();
        VisitType::ALL
            .into_iter()
            .find(|v| {
                v.label()
                    .chars()
                    .filter(|c| !matches!(c, ' ' | '-'))
                    .collect::<String>()
                    .to_lowercase()
                    == normalized
            })
            .ok_or_else(|| SchedulingError::UnknownVisitType(s.to_string()))
    }
}

/// Calendar color classification carried through to the stored appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Green,
    Yellow,
    Blue,
    White,
    Red,
}

impl ColorTag {
    pub fn label(&self) -> &'static str {
        match self {
            ColorTag::Green => "green",
            ColorTag::Yellow => "yellow",
            ColorTag::Blue => "blue",
            ColorTag::White => "white",
            ColorTag::Red => "red",
        }
    }
}

impl fmt::Display for ColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ColorTag {
    type Err = SchedulingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "green" => Ok(ColorTag::Green),
            "yellow" => Ok(ColorTag::Yellow),
            "blue" => Ok(ColorTag::Blue),
            "white" => Ok(ColorTag::White),
            "red" => Ok(ColorTag::Red),
            _ => Err(SchedulingError::UnknownColorTag(s.to_string())),
        }
    }
}

/// Appointment status as tracked by the clinic backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[serde(rename = "Scheduled")]
    Scheduled,
    #[serde(rename = "Checked-In")]
    CheckedIn,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
    #[serde(rename = "Checked-Out")]
    CheckedOut,
    #[serde(rename = "Cancelled")]
    Cancelled,
    #[serde(rename = "Rescheduled")]
    Rescheduled,
}

impl AppointmentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::CheckedIn => "Checked-In",
            AppointmentStatus::InProgress => "In Progress",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::CheckedOut => "Checked-Out",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Rescheduled => "Rescheduled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An appointment already persisted by the clinic backend
///
/// Read-only from the scheduler's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingAppointment {
    pub id: AppointmentId,
    pub patient_id: Option<PatientId>,
    pub patient_display_name: String,
    pub date: NaiveDate,
    pub time: ClockTime,
    pub duration_minutes: u32,
    /// `None` when the backend holds a label this crate does not know
    pub visit_type: Option<VisitType>,
    pub status: AppointmentStatus,
}

impl ExistingAppointment {
    pub fn is_cancelled(&self) -> bool {
        self.status == AppointmentStatus::Cancelled
    }

    /// Start as minutes since midnight
    pub fn start_minutes(&self) -> u32 {
        self.time.minutes()
    }

    /// Exclusive end as minutes since midnight
    pub fn end_minutes(&self) -> u32 {
        self.time.end_minutes(self.duration_minutes)
    }

    /// Closed-open overlap with `[start, end)`; touching intervals do not overlap
    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        start < self.end_minutes() && end > self.start_minutes()
    }
}

/// Patient search hit used when assigning a patient to a draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub id: PatientId,
    pub display_name: String,
    #[serde(default)]
    pub record_number: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(VisitType::NewPatient, ColorTag::Yellow)]
    #[test_case(VisitType::ReEvaluation, ColorTag::Blue)]
    #[test_case(VisitType::RegularVisit, ColorTag::Green)]
    #[test_case(VisitType::FollowUp, ColorTag::Green)]
    #[test_case(VisitType::Treatment, ColorTag::Green)]
    #[test_case(VisitType::Emergency, ColorTag::Red)]
    fn test_visit_type_default_color(visit_type: VisitType, color: ColorTag) {
        assert_eq!(visit_type.default_color(), color);
    }

    #[test_case("New Patient", VisitType::NewPatient)]
    #[test_case("re-evaluation", VisitType::ReEvaluation)]
    #[test_case("regular_visit", VisitType::RegularVisit)]
    #[test_case("Follow-Up", VisitType::FollowUp)]
    #[test_case("followup", VisitType::FollowUp)]
    #[test_case("EMERGENCY", VisitType::Emergency)]
    fn test_visit_type_from_str(input: &str, expected: VisitType) {
        assert_eq!(input.parse::<VisitType>().unwrap(), expected);
    }

    #[test]
    fn test_visit_type_unknown() {
        assert!(matches!(
            "Massage".parse::<VisitType>(),
            Err(SchedulingError::UnknownVisitType(_))
        ));
    }

    #[test]
    fn test_visit_type_serde_labels() {
        let json = serde_json::to_string(&VisitType::ReEvaluation).unwrap();
        assert_eq!(json, "\"Re-evaluation\"");
        let back: VisitType = serde_json::from_str("\"Follow-Up\"").unwrap();
        assert_eq!(back, VisitType::FollowUp);
    }

    #[test]
    fn test_status_serde_labels() {
        let json = serde_json::to_string(&AppointmentStatus::CheckedIn).unwrap();
        assert_eq!(json, "\"Checked-In\"");
        let back: AppointmentStatus = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(back, AppointmentStatus::InProgress);
    }

    #[test]
    fn test_color_tag_parse() {
        assert_eq!("White".parse::<ColorTag>().unwrap(), ColorTag::White);
        assert!("purple".parse::<ColorTag>().is_err());
    }

    fn existing(time: &str, duration: u32) -> ExistingAppointment {
        ExistingAppointment {
            id: AppointmentId::new("a1").unwrap(),
            patient_id: None,
            patient_display_name: "Jane Doe".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            time: time.parse().unwrap(),
            duration_minutes: duration,
            visit_type: Some(VisitType::RegularVisit),
            status: AppointmentStatus::Scheduled,
        }
    }

    #[test]
    fn test_overlap_is_closed_open() {
        let apt = existing("10:00", 30);
        // 10:30 start touches the end
        assert!(!apt.overlaps(630, 660));
        // 09:30-10:00 touches the start
        assert!(!apt.overlaps(570, 600));
        assert!(apt.overlaps(615, 630));
        assert!(apt.overlaps(590, 700));
    }
}
