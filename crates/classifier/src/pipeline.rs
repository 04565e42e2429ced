use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, instrument, warn};
use voxsort_audio::{scan_candidates, SpeakerScorer};
use voxsort_domain::{
    CandidateFile, ClassificationResult, JsonExporter, ReportExporter, RunParameters, RunReport,
    RunStamp, RunSummary, Verdict,
};

use crate::config::{ClassifierConfig, FailurePolicy};
use crate::copy::copy_preserving;
use crate::error::ClassifierError;
use crate::layout::OutputLayout;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunPhase {
    Initialized,
    Scoring,
    Reporting,
    Copying,
    Done,
}

/// Scores every candidate sequentially, writes the report, then copies files
/// into the `target/` and `other/` buckets.
pub struct BatchClassifier<S> {
    scorer: S,
    config: ClassifierConfig,
}

impl<S: SpeakerScorer> BatchClassifier<S> {
    pub fn new(scorer: S, config: ClassifierConfig) -> Self {
        Self { scorer, config }
    }

    pub fn into_scorer(self) -> S {
        self.scorer
    }

    #[instrument(skip(self, params), fields(target = ?params.target, input_dir = ?params.input_dir))]
    pub fn run(
        &mut self,
        params: &RunParameters,
        stamp: RunStamp,
    ) -> Result<RunSummary, ClassifierError> {
        let layout = OutputLayout::create(&self.config.output_root, &stamp)?;
        let mut report = RunReport::new(
            params.target_speaker(),
            params.threshold,
            stamp.report_timestamp()?,
        );
        let candidates = scan_candidates(&params.input_dir, self.config.order).map_err(
            |source| ClassifierError::Scan {
                path: params.input_dir.clone(),
                source,
            },
        )?;
        log_phase(RunPhase::Initialized);

        println!("\nProcessing {} audio files...", candidates.len());
        println!("Target speaker: {}", report.target_speaker);
        println!("Threshold: {}", params.threshold);
        println!("Output directory: {}\n", layout.run_dir.display());

        log_phase(RunPhase::Scoring);
        let (sorted, skipped) = self.score_all(params, &candidates, &mut report)?;

        log_phase(RunPhase::Reporting);
        let report_path = layout.report_path();
        JsonExporter.write_to(&report, &report_path)?;

        log_phase(RunPhase::Copying);
        println!("\nCopying files...");
        for verdict in [Verdict::Target, Verdict::Other] {
            let bucket: Vec<&CandidateFile> = sorted
                .iter()
                .filter(|(_, v)| *v == verdict)
                .map(|(candidate, _)| *candidate)
                .collect();
            copy_bucket(&layout, verdict, &bucket)?;
        }

        let counts = report.counts();
        let summary = RunSummary {
            total: candidates.len(),
            target: counts.target,
            other: counts.other,
            skipped,
            run_dir: layout.run_dir.clone(),
            report_path,
        };
        log_phase(RunPhase::Done);
        print_summary(&summary);
        Ok(summary)
    }

    fn score_all<'a>(
        &mut self,
        params: &RunParameters,
        candidates: &'a [CandidateFile],
        report: &mut RunReport,
    ) -> Result<(Vec<(&'a CandidateFile, Verdict)>, usize), ClassifierError> {
        let bar = progress_bar(candidates.len(), "Verifying speakers");
        let mut sorted = Vec::with_capacity(candidates.len());
        let mut skipped = 0usize;

        for candidate in candidates {
            bar.set_message(candidate.name.clone());
            match self
                .scorer
                .score(&params.target, &candidate.path, params.threshold)
            {
                Ok(score) => {
                    let verdict = Verdict::from_same_speaker(score.same_speaker);
                    bar.suspend(|| {
                        println!(
                            "{:<30} | Score: {:.4} | Status: {}",
                            candidate.name,
                            score.score,
                            verdict.label()
                        )
                    });
                    report.push(ClassificationResult::new(
                        candidate.name.clone(),
                        score.score,
                        verdict,
                    ));
                    sorted.push((candidate, verdict));
                }
                Err(source) => match self.config.failure_policy {
                    FailurePolicy::FailFast => {
                        bar.abandon();
                        return Err(ClassifierError::Scoring {
                            file: candidate.name.clone(),
                            source,
                        });
                    }
                    FailurePolicy::SkipAndContinue => {
                        warn!(file = %candidate.name, error = %source, "scoring failed, skipping");
                        skipped += 1;
                    }
                },
            }
            bar.inc(1);
        }
        bar.finish_and_clear();
        Ok((sorted, skipped))
    }
}

fn copy_bucket(
    layout: &OutputLayout,
    verdict: Verdict,
    files: &[&CandidateFile],
) -> Result<(), ClassifierError> {
    let bar = progress_bar(files.len(), &format!("Copying {} files", verdict.bucket()));
    let dir = layout.bucket(verdict);
    for candidate in files {
        copy_preserving(&candidate.path, &dir.join(&candidate.name)).map_err(|source| {
            ClassifierError::Copy {
                file: candidate.name.clone(),
                source,
            }
        })?;
        bar.inc(1);
    }
    bar.finish_and_clear();
    Ok(())
}

fn progress_bar(len: usize, prefix: &str) -> ProgressBar {
    let bar = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{prefix} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
    {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar.set_prefix(prefix.to_string());
    bar.enable_steady_tick(Duration::from_millis(200));
    bar
}

fn log_phase(phase: RunPhase) {
    info!(?phase, "run phase");
}

fn print_summary(summary: &RunSummary) {
    println!("\nClassification complete!");
    println!("Total files processed: {}", summary.total);
    println!("Files classified as target speaker: {}", summary.target);
    println!("Files classified as other speakers: {}", summary.other);
    if summary.skipped > 0 {
        println!("Files skipped after scoring errors: {}", summary.skipped);
    }
    println!(
        "{} target, {} other, {} total",
        summary.target, summary.other, summary.total
    );
    println!("\nResults saved to: {}", summary.report_path.display());
    println!("Classified audio files saved in: {}", summary.run_dir.display());
}
