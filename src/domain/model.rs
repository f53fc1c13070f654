use crate::utils::error::{Result, SeatingError};
use crate::utils::validation::validate_positive_number;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// 隊伍人數上限預設值
pub const DEFAULT_TEAM_CAPACITY: usize = 4;
/// 每個座位佔用的連續座位數（中間空 k-1 個）
pub const DEFAULT_SKIP_FACTOR: usize = 3;
/// Minimum member count for a team that just gained a member to be level A (`> 1`).
pub const LEVEL_A_MIN_MEMBERS: usize = 2;
/// Minimum member count for a team that just lost a member to stay level A.
///
/// Kept apart from [`LEVEL_A_MIN_MEMBERS`]: older registration flows applied a
/// four-member threshold here, and the two values must be configurable separately.
pub const SOURCE_LEVEL_A_MIN_MEMBERS: usize = 2;
/// Lowest accepted level A threshold: a team of one (or none) is always level B.
pub const LEVEL_A_THRESHOLD_FLOOR: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    #[serde(alias = "a")]
    A,
    #[serde(alias = "b")]
    B,
}

impl Level {
    /// Order in which room-mode seating walks the levels.
    pub const ALL: [Level; 2] = [Level::A, Level::B];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::A => "A",
            Level::B => "B",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = SeatingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "A" | "a" => Ok(Level::A),
            "B" | "b" => Ok(Level::B),
            other => Err(SeatingError::ValidationError {
                message: format!("unknown level '{}', expected A or B", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(pub String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(StudentId);
string_id!(TeamId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    /// Level the student registered for.
    pub level: Level,
}

impl Student {
    pub fn new(id: impl Into<StudentId>, name: impl Into<String>, level: Level) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level,
        }
    }
}

/// Rules shared by the transfer and seating engines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeatingRules {
    pub team_capacity: usize,
    pub skip_factor: usize,
    /// Seat every level A team before any level B team in flat mode.
    pub separate_levels: bool,
    pub level_a_min_members: usize,
    pub source_level_a_min_members: usize,
}

impl Default for SeatingRules {
    fn default() -> Self {
        Self {
            team_capacity: DEFAULT_TEAM_CAPACITY,
            skip_factor: DEFAULT_SKIP_FACTOR,
            separate_levels: true,
            level_a_min_members: LEVEL_A_MIN_MEMBERS,
            source_level_a_min_members: SOURCE_LEVEL_A_MIN_MEMBERS,
        }
    }
}

impl SeatingRules {
    /// Both level A thresholds must be at least [`LEVEL_A_THRESHOLD_FLOOR`].
    pub fn validate_level_thresholds(&self) -> Result<()> {
        validate_positive_number(
            "rules.level_a_min_members",
            self.level_a_min_members,
            LEVEL_A_THRESHOLD_FLOOR,
        )?;
        validate_positive_number(
            "rules.source_level_a_min_members",
            self.source_level_a_min_members,
            LEVEL_A_THRESHOLD_FLOOR,
        )
    }
}

/// A team is level A when it has at least `min_members` members and all of them
/// registered for level A. Everything else is level B.
pub fn derive_level(members: &[Student], min_members: usize) -> Level {
    if members.len() >= min_members && members.iter().all(|s| s.level == Level::A) {
        Level::A
    } else {
        Level::B
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Team {
    id: TeamId,
    name: String,
    level: Level,
    members: Vec<Student>,
    capacity: usize,
}

impl Team {
    pub fn new(id: impl Into<TeamId>, name: impl Into<String>, capacity: usize) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            level: Level::B,
            members: Vec::new(),
            capacity,
        }
    }

    /// Builds a team from an existing member list, deriving its level.
    pub fn with_members(
        id: impl Into<TeamId>,
        name: impl Into<String>,
        capacity: usize,
        members: Vec<Student>,
        level_a_min_members: usize,
    ) -> Result<Self> {
        let id = id.into();
        if members.len() > capacity {
            return Err(SeatingError::CapacityExceeded {
                team_id: id.to_string(),
                capacity,
            });
        }
        Ok(Self {
            level: derive_level(&members, level_a_min_members),
            id,
            name: name.into(),
            members,
            capacity,
        })
    }

    pub fn id(&self) -> &TeamId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn members(&self) -> &[Student] {
        &self.members
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.capacity
    }

    pub fn member(&self, student_id: &StudentId) -> Option<&Student> {
        self.members.iter().find(|s| &s.id == student_id)
    }

    pub fn contains(&self, student_id: &StudentId) -> bool {
        self.member(student_id).is_some()
    }

    /// New team value with `student` appended and the level recomputed.
    pub(crate) fn with_added(&self, student: Student, min_members: usize) -> Team {
        let mut members = self.members.clone();
        members.push(student);
        self.rebuilt(members, min_members)
    }

    /// New team value without `student_id` and the level recomputed.
    pub(crate) fn with_removed(&self, student_id: &StudentId, min_members: usize) -> Team {
        let members = self
            .members
            .iter()
            .filter(|s| &s.id != student_id)
            .cloned()
            .collect();
        self.rebuilt(members, min_members)
    }

    fn rebuilt(&self, members: Vec<Student>, min_members: usize) -> Team {
        Team {
            id: self.id.clone(),
            name: self.name.clone(),
            level: derive_level(&members, min_members),
            members,
            capacity: self.capacity,
        }
    }
}

/// All teams of one competition, in registration order.
///
/// Teams are shared behind `Arc`, so a snapshot produced by a transfer only
/// allocates the two teams that changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Roster {
    teams: Vec<Arc<Team>>,
}

impl Roster {
    pub fn new(teams: Vec<Team>) -> Result<Self> {
        let mut team_ids = HashSet::new();
        let mut student_ids = HashSet::new();
        for team in &teams {
            if !team_ids.insert(team.id.clone()) {
                return Err(SeatingError::ValidationError {
                    message: format!("team id {} appears more than once", team.id),
                });
            }
            for student in &team.members {
                if !student_ids.insert(student.id.clone()) {
                    return Err(SeatingError::ValidationError {
                        message: format!("student {} is a member of more than one team", student.id),
                    });
                }
            }
        }
        Ok(Self {
            teams: teams.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn empty() -> Self {
        Self { teams: Vec::new() }
    }

    pub fn teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter().map(|t| t.as_ref())
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn team(&self, id: &TeamId) -> Option<&Team> {
        self.teams().find(|t| &t.id == id)
    }

    pub fn team_of(&self, student_id: &StudentId) -> Option<&Team> {
        self.teams().find(|t| t.contains(student_id))
    }

    pub fn teams_at(&self, level: Level) -> Vec<&Team> {
        self.teams().filter(|t| t.level == level).collect()
    }

    pub fn level_counts(&self) -> BTreeMap<Level, usize> {
        let mut counts = BTreeMap::new();
        for team in self.teams() {
            *counts.entry(team.level).or_insert(0) += 1;
        }
        counts
    }

    /// Checks capacity and level derivation for every team.
    ///
    /// Uses `rules.level_a_min_members`; a roster produced under a different
    /// source threshold can legitimately fail here.
    pub fn check_invariants(&self, rules: &SeatingRules) -> Result<()> {
        for team in self.teams() {
            if team.len() > team.capacity {
                return Err(SeatingError::CapacityExceeded {
                    team_id: team.id.to_string(),
                    capacity: team.capacity,
                });
            }
            let expected = derive_level(&team.members, rules.level_a_min_members);
            if team.level != expected {
                return Err(SeatingError::ValidationError {
                    message: format!(
                        "team {} is level {} but its members make it level {}",
                        team.id, team.level, expected
                    ),
                });
            }
        }
        Ok(())
    }

    /// Returns a new roster with the teams matching `updated` ids swapped in place.
    pub(crate) fn replacing(&self, updated: &[Team]) -> Roster {
        let teams = self
            .teams
            .iter()
            .map(|current| {
                updated
                    .iter()
                    .find(|t| t.id == current.id)
                    .map(|t| Arc::new(t.clone()))
                    .unwrap_or_else(|| Arc::clone(current))
            })
            .collect();
        Roster { teams }
    }
}

/// A queued move of one student between two teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub student: StudentId,
    pub from: TeamId,
    pub to: TeamId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    pub level: Level,
    pub seat_codes: Vec<String>,
}

impl Room {
    pub fn new(name: impl Into<String>, level: Level, seat_codes: Vec<String>) -> Self {
        Self {
            name: name.into(),
            level,
            seat_codes,
        }
    }

    /// Room whose seats are numbered `1..=count`.
    pub fn numbered(name: impl Into<String>, level: Level, count: usize) -> Self {
        Self::new(name, level, (1..=count).map(|n| n.to_string()).collect())
    }

    pub fn seat_count(&self) -> usize {
        self.seat_codes.len()
    }

    /// Pool-wide code of one of this room's seats: `<roomName><code>`.
    pub fn qualify(&self, code: &str) -> String {
        format!("{}{}", self.name, code)
    }

    pub fn qualified_codes(&self) -> impl Iterator<Item = String> + '_ {
        self.seat_codes.iter().map(|c| self.qualify(c))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentMode {
    Flat,
    Rooms,
}

impl FromStr for AssignmentMode {
    type Err = SeatingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(AssignmentMode::Flat),
            "rooms" | "room" => Ok(AssignmentMode::Rooms),
            other => Err(SeatingError::InvalidConfigValueError {
                field: "seating.mode".to_string(),
                value: other.to_string(),
                reason: "Expected 'flat' or 'rooms'".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatAssignment {
    pub team_id: TeamId,
    pub team_name: String,
    pub level: Level,
    pub seat_code: String,
    /// Room name in room mode, venue name in flat mode.
    pub site: String,
    pub site_capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentResult {
    pub assignments: Vec<SeatAssignment>,
    pub insufficient_seats: bool,
    pub required_seats: usize,
    pub available_capacity: usize,
    /// Teams left without a seat, in seating order.
    pub unseated: Vec<TeamId>,
}

impl AssignmentResult {
    pub fn assignment_for(&self, team_id: &TeamId) -> Option<&SeatAssignment> {
        self.assignments.iter().find(|a| &a.team_id == team_id)
    }

    pub fn seated_count(&self) -> usize {
        self.assignments.len()
    }

    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.assignments
            .iter()
            .map(|a| ExportRow {
                site_name: a.site.clone(),
                site_capacity: a.site_capacity,
                team_level: a.level,
                team_id: a.team_id.to_string(),
                team_name: a.team_name.clone(),
                team_seat: a.seat_code.clone(),
            })
            .collect()
    }
}

/// One row of the tabular seating export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub site_name: String,
    pub site_capacity: usize,
    pub team_level: Level,
    pub team_id: String,
    pub team_name: String,
    pub team_seat: String,
}

/// Persisted form of a roster: the student directory plus team membership by id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RosterDocument {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub teams: Vec<TeamRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub members: Vec<StudentId>,
    /// Overrides `rules.team_capacity` for this team.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
}
