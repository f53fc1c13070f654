use crate::core::{Exporter, Storage};
use crate::domain::model::{AssignmentResult, ExportRow};
use crate::utils::error::{Result, SeatingError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::str::FromStr;
use zip::write::{FileOptions, ZipWriter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    pub const NAMES: [&'static str; 3] = ["csv", "tsv", "json"];

    pub fn file_name(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "assignments.csv",
            ExportFormat::Tsv => "assignments.tsv",
            ExportFormat::Json => "assignments.json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = SeatingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "csv" => Ok(ExportFormat::Csv),
            "tsv" => Ok(ExportFormat::Tsv),
            "json" => Ok(ExportFormat::Json),
            other => Err(SeatingError::InvalidConfigValueError {
                field: "export.formats".to_string(),
                value: other.to_string(),
                reason: format!("Unsupported format. Valid formats: {}", Self::NAMES.join(", ")),
            }),
        }
    }
}

/// JSON envelope around a seating result.
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub competition: &'a str,
    pub generated_at: DateTime<Utc>,
    pub insufficient_seats: bool,
    pub required_seats: usize,
    pub available_capacity: usize,
    pub rows: Vec<ExportRow>,
    pub unseated: Vec<String>,
}

pub fn render_delimited(rows: &[ExportRow], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    // 沒有資料時仍輸出表頭
    if rows.is_empty() {
        writer.write_record([
            "siteName",
            "siteCapacity",
            "teamLevel",
            "teamId",
            "teamName",
            "teamSeat",
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| SeatingError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| SeatingError::ValidationError {
        message: format!("export is not valid UTF-8: {}", e),
    })
}

pub fn render_json(
    competition: &str,
    result: &AssignmentResult,
    generated_at: DateTime<Utc>,
) -> Result<String> {
    let document = ExportDocument {
        competition,
        generated_at,
        insufficient_seats: result.insufficient_seats,
        required_seats: result.required_seats,
        available_capacity: result.available_capacity,
        rows: result.export_rows(),
        unseated: result.unseated.iter().map(|id| id.to_string()).collect(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Writes the requested formats through a [`Storage`], optionally packed into one zip.
pub struct AssignmentExporter<S: Storage> {
    storage: S,
    formats: Vec<ExportFormat>,
    bundle: Option<String>,
}

impl<S: Storage> AssignmentExporter<S> {
    pub fn new(storage: S, formats: Vec<ExportFormat>, bundle: Option<String>) -> Self {
        Self {
            storage,
            formats,
            bundle,
        }
    }

    pub fn render(
        &self,
        competition: &str,
        result: &AssignmentResult,
    ) -> Result<Vec<(ExportFormat, String)>> {
        let rows = result.export_rows();
        let generated_at = Utc::now();
        self.formats
            .iter()
            .map(|format| {
                let body = match format {
                    ExportFormat::Csv => render_delimited(&rows, b',')?,
                    ExportFormat::Tsv => render_delimited(&rows, b'\t')?,
                    ExportFormat::Json => render_json(competition, result, generated_at)?,
                };
                Ok((*format, body))
            })
            .collect()
    }
}

#[async_trait]
impl<S: Storage> Exporter for AssignmentExporter<S> {
    async fn export(&self, competition: &str, result: &AssignmentResult) -> Result<Vec<String>> {
        let files = self.render(competition, result)?;

        if let Some(bundle) = &self.bundle {
            tracing::debug!("Creating ZIP bundle with {} files", files.len());
            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (format, body) in &files {
                    zip.start_file::<_, ()>(format.file_name(), FileOptions::default())?;
                    zip.write_all(body.as_bytes())?;
                }
                zip.finish()?.into_inner()
            };
            self.storage.write_file(bundle, &zip_data).await?;
            return Ok(vec![bundle.clone()]);
        }

        let mut written = Vec::with_capacity(files.len());
        for (format, body) in files {
            self.storage
                .write_file(format.file_name(), body.as_bytes())
                .await?;
            written.push(format.file_name().to_string());
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Level, SeatAssignment, TeamId};

    fn result() -> AssignmentResult {
        AssignmentResult {
            assignments: vec![SeatAssignment {
                team_id: TeamId::from("t1"),
                team_name: "Lambda, Inc".to_string(),
                level: Level::A,
                seat_code: "R11".to_string(),
                site: "R1".to_string(),
                site_capacity: 30,
            }],
            insufficient_seats: true,
            required_seats: 2,
            available_capacity: 1,
            unseated: vec![TeamId::from("t2")],
        }
    }

    #[test]
    fn test_csv_columns() {
        let csv = render_delimited(&result().export_rows(), b',').unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "siteName,siteCapacity,teamLevel,teamId,teamName,teamSeat"
        );
        assert_eq!(lines.next().unwrap(), "R1,30,A,t1,\"Lambda, Inc\",R11");
    }

    #[test]
    fn test_empty_export_keeps_header() {
        let tsv = render_delimited(&[], b'\t').unwrap();
        assert!(tsv.starts_with("siteName\tsiteCapacity"));
    }

    #[test]
    fn test_json_lists_unseated() {
        let json = render_json("Regional", &result(), Utc::now()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["competition"], "Regional");
        assert_eq!(value["unseated"][0], "t2");
        assert_eq!(value["rows"][0]["teamSeat"], "R11");
    }

    #[test]
    fn test_unknown_format() {
        assert!("xlsx".parse::<ExportFormat>().is_err());
        assert_eq!("tsv".parse::<ExportFormat>().unwrap(), ExportFormat::Tsv);
    }
}
