use crate::adapters::export::ExportFormat;
use crate::core::seat_pool::{FlatPool, RoomPool, SeatPool};
use crate::core::ConfigProvider;
use crate::domain::model::{AssignmentMode, Level, Room, SeatingRules, TransferRequest};
use crate::utils::error::{Result, SeatingError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub competition: CompetitionConfig,
    #[serde(default)]
    pub rules: SeatingRules,
    pub roster: RosterConfig,
    pub seating: SeatingConfig,
    pub export: ExportConfig,
    pub notification: Option<NotificationConfig>,
    #[serde(default)]
    pub transfers: Vec<TransferRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionConfig {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatingConfig {
    pub mode: AssignmentMode,
    pub venue: Option<String>,
    pub flat_seats: Option<Vec<String>>,
    pub flat_seat_count: Option<usize>,
    #[serde(default)]
    pub rooms: Vec<RoomConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    pub name: String,
    pub level: Level,
    pub seats: Option<Vec<String>>,
    pub seat_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_path: String,
    pub formats: Vec<String>,
    pub bundle: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub webhook: Option<String>,
}

impl RoomConfig {
    fn to_room(&self) -> Result<Room> {
        match (&self.seats, self.seat_count) {
            (Some(seats), None) => Ok(Room::new(self.name.clone(), self.level, seats.clone())),
            (None, Some(count)) => Ok(Room::numbered(self.name.clone(), self.level, count)),
            _ => Err(SeatingError::ConfigValidationError {
                field: format!("seating.rooms.{}", self.name),
                message: "set exactly one of 'seats' or 'seat_count'".to_string(),
            }),
        }
    }
}

impl SessionConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SeatingError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SeatingError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ROSTER_PATH})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SeatingError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("competition.name", &self.competition.name)?;
        validation::validate_path("roster.path", &self.roster.path)?;
        validation::validate_path("export.output_path", &self.export.output_path)?;

        validation::validate_positive_number("rules.team_capacity", self.rules.team_capacity, 1)?;
        validation::validate_positive_number("rules.skip_factor", self.rules.skip_factor, 1)?;
        self.rules.validate_level_thresholds()?;

        validation::validate_allowed_values("export.formats", &self.export.formats, &ExportFormat::NAMES)?;
        if self.export.formats.is_empty() {
            return Err(SeatingError::MissingConfigError {
                field: "export.formats".to_string(),
            });
        }
        if let Some(bundle) = &self.export.bundle {
            validation::validate_path("export.bundle", bundle)?;
        }

        if let Some(webhook) = self.notification.as_ref().and_then(|n| n.webhook.as_deref()) {
            validation::validate_url("notification.webhook", webhook)?;
        }

        for room in &self.seating.rooms {
            validation::validate_non_empty_string("seating.rooms.name", &room.name)?;
        }

        // 實際建立座位池，確認沒有重複的教室或座位
        self.seat_pool().map(|_| ())
    }

    pub fn export_formats(&self) -> Result<Vec<ExportFormat>> {
        self.export.formats.iter().map(|f| f.parse()).collect()
    }

    pub fn webhook(&self) -> Option<&str> {
        self.notification.as_ref().and_then(|n| n.webhook.as_deref())
    }

    fn flat_pool(&self) -> Result<FlatPool> {
        let venue = self
            .seating
            .venue
            .clone()
            .unwrap_or_else(|| self.competition.name.clone());
        match (&self.seating.flat_seats, self.seating.flat_seat_count) {
            (Some(seats), None) => FlatPool::new(venue, seats.clone()),
            (None, Some(count)) => Ok(FlatPool::numbered(venue, count)),
            (None, None) => Err(SeatingError::MissingConfigError {
                field: "seating.flat_seats".to_string(),
            }),
            (Some(_), Some(_)) => Err(SeatingError::ConfigValidationError {
                field: "seating.flat_seats".to_string(),
                message: "set either 'flat_seats' or 'flat_seat_count', not both".to_string(),
            }),
        }
    }

    fn room_pool(&self) -> Result<RoomPool> {
        if self.seating.rooms.is_empty() {
            return Err(SeatingError::MissingConfigError {
                field: "seating.rooms".to_string(),
            });
        }
        let rooms = self
            .seating
            .rooms
            .iter()
            .map(RoomConfig::to_room)
            .collect::<Result<Vec<_>>>()?;
        RoomPool::from_rooms(rooms)
    }
}

impl ConfigProvider for SessionConfig {
    fn competition_name(&self) -> &str {
        &self.competition.name
    }

    fn rules(&self) -> &SeatingRules {
        &self.rules
    }

    fn transfers(&self) -> &[TransferRequest] {
        &self.transfers
    }

    fn seat_pool(&self) -> Result<SeatPool> {
        match self.seating.mode {
            AssignmentMode::Flat => self.flat_pool().map(SeatPool::Flat),
            AssignmentMode::Rooms => self.room_pool().map(SeatPool::Rooms),
        }
    }
}

impl Validate for SessionConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
