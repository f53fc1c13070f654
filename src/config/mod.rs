pub mod toml_config;

pub use toml_config::SessionConfig;

#[cfg(feature = "cli")]
use crate::domain::model::AssignmentMode;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "contest-seating")]
#[command(about = "Apply team transfers and assign contest seats from a session file")]
pub struct CliArgs {
    /// Path to the session TOML file
    #[arg(short, long, default_value = "seating.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Compute and print the seating without saving, exporting or notifying
    #[arg(long)]
    pub dry_run: bool,

    /// Override rules.skip_factor
    #[arg(long)]
    pub skip_factor: Option<usize>,

    /// Override seating.mode (flat or rooms)
    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<AssignmentMode>,
}

#[cfg(feature = "cli")]
fn parse_mode(value: &str) -> Result<AssignmentMode, String> {
    value.parse().map_err(|e: crate::utils::error::SeatingError| e.to_string())
}

#[cfg(feature = "cli")]
impl CliArgs {
    /// 將命令列參數覆蓋到設定檔
    pub fn apply_overrides(&self, config: &mut SessionConfig) {
        if let Some(k) = self.skip_factor {
            config.rules.skip_factor = k;
            tracing::info!("🔧 Skip factor overridden to: {}", k);
        }
        if let Some(mode) = self.mode {
            config.seating.mode = mode;
            tracing::info!("🔧 Seating mode overridden to: {:?}", mode);
        }
    }
}
