//! Schedule configuration: operating hours, break periods and the slot grid
//!
//! This is a plain value object. It is deserialized from the `[schedule]`
//! section of the configuration file and handed to the scheduling workflow
//! at construction time; nothing reads it from ambient state.

use serde::{Deserialize, Serialize};

use crate::domain::{AppointmentDuration, ClockTime};

/// Clinic opening window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl Default for OperatingHours {
    fn default() -> Self {
        Self {
            start: clock(8, 0),
            end: clock(18, 0),
        }
    }
}

/// A window in which no new appointment may start
///
/// Breaks may overlap each other and the operating-hours boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakPeriod {
    pub name: String,
    pub start: ClockTime,
    pub end: ClockTime,
}

impl BreakPeriod {
    pub fn new(name: impl Into<String>, start: ClockTime, end: ClockTime) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    /// `start <= time < end`
    pub fn contains(&self, time: ClockTime) -> bool {
        self.start <= time && time < self.end
    }

    /// Closed-open overlap with `[start, end)` in minutes since midnight
    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        start < self.end.minutes() && end > self.start.minutes()
    }

    fn validate(&self) -> Result<(), String> {
        if self.start >= self.end {
            return Err(format!(
                "schedule.breaks '{}': start {} must be before end {}",
                self.name, self.start, self.end
            ));
        }
        Ok(())
    }
}

/// How break periods constrain a candidate placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakOverlapPolicy {
    /// Only the start time is checked; an appointment may run into a break
    #[default]
    StartOnly,
    /// The whole `[start, start + duration)` interval must avoid every break
    FullInterval,
}

/// Anchors offered in the time-slot step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotGridSettings {
    /// First anchor
    #[serde(default = "default_grid_start")]
    pub start: ClockTime,

    /// Anchors stop before this time
    #[serde(default = "default_grid_end")]
    pub end: ClockTime,

    /// Spacing between anchors
    #[serde(default = "default_grid_interval")]
    pub interval_minutes: u32,

    /// Generate from operating hours instead of `start`/`end`
    #[serde(default)]
    pub follow_operating_hours: bool,
}

impl Default for SlotGridSettings {
    fn default() -> Self {
        Self {
            start: default_grid_start(),
            end: default_grid_end(),
            interval_minutes: default_grid_interval(),
            follow_operating_hours: false,
        }
    }
}

/// Operating hours, breaks and placement policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfiguration {
    #[serde(default)]
    pub operating_hours: OperatingHours,

    /// Kept in configured order
    #[serde(default = "default_breaks")]
    pub breaks: Vec<BreakPeriod>,

    #[serde(default)]
    pub break_overlap_policy: BreakOverlapPolicy,

    /// Duration given to every new draft
    #[serde(default, rename = "default_duration_minutes")]
    pub default_duration: AppointmentDuration,

    #[serde(default)]
    pub slot_grid: SlotGridSettings,
}

impl Default for ScheduleConfiguration {
    fn default() -> Self {
        Self {
            operating_hours: OperatingHours::default(),
            breaks: default_breaks(),
            break_overlap_policy: BreakOverlapPolicy::default(),
            default_duration: AppointmentDuration::default(),
            slot_grid: SlotGridSettings::default(),
        }
    }
}

impl ScheduleConfiguration {
    /// Validates the schedule
    ///
    /// # Errors
    ///
    /// Returns a message naming the first offending value.
    pub fn validate(&self) -> Result<(), String> {
        if self.operating_hours.start >= self.operating_hours.end {
            return Err(format!(
                "schedule.operating_hours: start {} must be before end {}",
                self.operating_hours.start, self.operating_hours.end
            ));
        }

        for period in &self.breaks {
            period.validate()?;
        }

        let grid = &self.slot_grid;
        if grid.interval_minutes == 0 {
            return Err("schedule.slot_grid.interval_minutes must be > 0".to_string());
        }
        if grid.start >= grid.end {
            return Err(format!(
                "schedule.slot_grid: start {} must be before end {}",
                grid.start, grid.end
            ));
        }

        Ok(())
    }

    pub fn set_operating_hours(&mut self, hours: OperatingHours) {
        self.operating_hours = hours;
    }

    /// Appends a break; the caller decides whether to `validate` afterwards
    pub fn add_break(&mut self, period: BreakPeriod) {
        self.breaks.push(period);
    }

    /// Removes every break with this name, returning how many were removed
    pub fn remove_break(&mut self, name: &str) -> usize {
        let before = self.breaks.len();
        self.breaks.retain(|b| b.name != name);
        before - self.breaks.len()
    }

    pub fn set_break_overlap_policy(&mut self, policy: BreakOverlapPolicy) {
        self.break_overlap_policy = policy;
    }

    pub fn set_default_duration(&mut self, duration: AppointmentDuration) {
        self.default_duration = duration;
    }

    /// Time anchors offered for a day, ascending
    ///
    /// By default the grid ignores operating hours and runs 07:00 to 18:30 in
    /// 30 minute steps.
    pub fn slot_anchors(&self) -> Vec<ClockTime> {
        let grid = &self.slot_grid;
        let (start, end) = if grid.follow_operating_hours {
            (self.operating_hours.start, self.operating_hours.end)
        } else {
            (grid.start, grid.end)
        };

        if grid.interval_minutes == 0 {
            return Vec::new();
        }

        (start.minutes()..end.minutes())
            .step_by(grid.interval_minutes as usize)
            .filter_map(ClockTime::from_minutes)
            .collect()
    }
}

fn clock(hour: u32, minute: u32) -> ClockTime {
    ClockTime::from_hm(hour, minute).unwrap_or_default()
}

fn default_grid_start() -> ClockTime {
    clock(7, 0)
}

fn default_grid_end() -> ClockTime {
    clock(19, 0)
}

fn default_grid_interval() -> u32 {
    30
}

fn default_breaks() -> Vec<BreakPeriod> {
    vec![BreakPeriod::new("Lunch", clock(12, 0), clock(13, 0))]
}
