pub mod error;
pub mod io;
pub mod report;
pub mod run;
pub mod threshold;

pub use crate::error::DomainError;
pub use crate::io::{JsonExporter, ReportExporter, REPORT_FILE_NAME};
pub use crate::report::{ClassificationResult, RunReport, Verdict, VerdictCounts};
pub use crate::run::{
    CandidateFile, RunParameters, RunStamp, RunSummary, DEFAULT_DEVICE, DEVICE_CHOICES,
};
pub use crate::threshold::{Threshold, DEFAULT_THRESHOLD};
