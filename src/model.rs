use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Seconds in a day. `24:00` is a valid closing time.
pub const SECONDS_PER_DAY: u32 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// ISO weekday number, Monday = 1 .. Sunday = 7.
    pub fn iso_number(self) -> u8 {
        self as u8 + 1
    }

    pub fn from_iso_number(n: u8) -> Option<Day> {
        n.checked_sub(1).and_then(|i| Day::ALL.get(i as usize).copied())
    }

    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Day {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Day::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown day: {s:?}"))
    }
}

/// Time of day as seconds since midnight, `0..=86_400`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(SECONDS_PER_DAY);

    pub fn from_secs(secs: u32) -> Option<Self> {
        (secs <= SECONDS_PER_DAY).then_some(TimeOfDay(secs))
    }

    /// `None` unless `minutes < 60` and the result is at most `24:00`.
    pub fn hm(hours: u32, minutes: u32) -> Option<Self> {
        if minutes >= 60 {
            return None;
        }
        hours
            .checked_mul(3600)
            .and_then(|secs| secs.checked_add(minutes * 60))
            .and_then(Self::from_secs)
    }

    pub fn secs(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = (self.0 / 3600, self.0 % 3600 / 60, self.0 % 60);
        if s == 0 {
            write!(f, "{h:02}:{m:02}")
        } else {
            write!(f, "{h:02}:{m:02}:{s:02}")
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || format!("invalid time of day: {s:?} (expected HH:MM or HH:MM:SS)");
        let parts: Vec<&str> = s.trim().split(':').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(bad());
        }
        let mut nums = [0u32; 3];
        for (slot, part) in nums.iter_mut().zip(&parts) {
            if part.is_empty() || part.len() > 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(bad());
            }
            *slot = part.parse().map_err(|_| bad())?;
        }
        let [h, m, sec] = nums;
        if m >= 60 || sec >= 60 {
            return Err(bad());
        }
        TimeOfDay::from_secs(h * 3600 + m * 60 + sec).ok_or_else(bad)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> String {
        t.to_string()
    }
}

/// Half-open window `[open, close)` on a weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub day: Day,
    pub open: TimeOfDay,
    pub close: TimeOfDay,
}

impl TimeWindow {
    /// Does not check `open < close`: malformed windows must be representable
    /// so that the overlap check can reject them.
    pub fn new(day: Day, open: TimeOfDay, close: TimeOfDay) -> Self {
        Self { day, open, close }
    }

    pub fn is_well_formed(&self) -> bool {
        self.open < self.close
    }

    pub fn duration_secs(&self) -> u32 {
        self.close.secs().saturating_sub(self.open.secs())
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.day == other.day && self.open < other.close && other.open < self.close
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}, {})", self.day, self.open, self.close)
    }
}

// ── Entities ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldType {
    pub id: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: Ulid,
    pub name: String,
    pub size: String,
    pub field_type_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub id: u64,
    pub field_id: Ulid,
    pub window: TimeWindow,
}

/// Filter handed to the field query store. Built from a validated `GetFieldsRequest`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFilter {
    pub name: Option<String>,
    pub size: Option<String>,
    pub field_type: Option<u32>,
    pub day: Option<Day>,
    pub offset: usize,
    pub limit: usize,
}

// ── Requests ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRequest {
    pub name: String,
    pub size: String,
    pub field_type: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    pub day: String,
    pub open_hour: TimeOfDay,
    pub close_hour: TimeOfDay,
}

impl AvailabilityRequest {
    pub fn new(day: impl Into<String>, open_hour: TimeOfDay, close_hour: TimeOfDay) -> Self {
        Self {
            day: day.into(),
            open_hour,
            close_hour,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetFieldsRequest {
    pub name: Option<String>,
    pub size: Option<String>,
    pub field_type: Option<u32>,
    /// ISO weekday number; keeps fields with at least one window on that day.
    pub availability: Option<u8>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

// ── Responses ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldTypeResponse {
    pub id: u32,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub id: u64,
    pub day: Day,
    pub open_hour: TimeOfDay,
    pub close_hour: TimeOfDay,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldResponse {
    pub id: Ulid,
    pub name: String,
    pub size: String,
    pub field_type: FieldTypeResponse,
    pub availabilities: Vec<AvailabilityResponse>,
}

impl From<&FieldType> for FieldTypeResponse {
    fn from(ft: &FieldType) -> Self {
        Self {
            id: ft.id,
            description: ft.description.clone(),
        }
    }
}

impl From<&Availability> for AvailabilityResponse {
    fn from(a: &Availability) -> Self {
        Self {
            id: a.id,
            day: a.window.day,
            open_hour: a.window.open,
            close_hour: a.window.close,
        }
    }
}

impl FieldResponse {
    /// Availabilities are sorted by day, then opening time.
    pub fn assemble(field: &Field, field_type: &FieldType, availabilities: &[Availability]) -> Self {
        let mut windows: Vec<AvailabilityResponse> =
            availabilities.iter().map(AvailabilityResponse::from).collect();
        windows.sort_by_key(|a| (a.day, a.open_hour));
        Self {
            id: field.id,
            name: field.name.clone(),
            size: field.size.clone(),
            field_type: field_type.into(),
            availabilities: windows,
        }
    }
}

/// Change records broadcast after a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    FieldCreated {
        id: Ulid,
        name: String,
    },
    FieldUpdated {
        id: Ulid,
        name: String,
    },
    AvailabilityAdded {
        id: u64,
        field_id: Ulid,
        window: TimeWindow,
    },
    AvailabilityUpdated {
        id: u64,
        field_id: Ulid,
        window: TimeWindow,
    },
    AvailabilityRemoved {
        id: u64,
        field_id: Ulid,
    },
}

impl Event {
    pub fn field_id(&self) -> Ulid {
        match self {
            Event::FieldCreated { id, .. } | Event::FieldUpdated { id, .. } => *id,
            Event::AvailabilityAdded { field_id, .. }
            | Event::AvailabilityUpdated { field_id, .. }
            | Event::AvailabilityRemoved { field_id, .. } => *field_id,
        }
    }
}
