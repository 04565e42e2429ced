use std::fs;
use std::path::Path;

use crate::{error::DomainError, report::RunReport};

pub const REPORT_FILE_NAME: &str = "classification_results.json";

pub trait ReportExporter {
    fn export(&self, report: &RunReport) -> Result<Vec<u8>, DomainError>;

    fn write_to(&self, report: &RunReport, path: &Path) -> Result<(), DomainError> {
        let bytes = self.export(report)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

/// Pretty-printed UTF-8 JSON with two-space indentation.
pub struct JsonExporter;

impl ReportExporter for JsonExporter {
    fn export(&self, report: &RunReport) -> Result<Vec<u8>, DomainError> {
        serde_json::to_vec_pretty(report).map_err(|err| DomainError::Serialization(err.to_string()))
    }
}
