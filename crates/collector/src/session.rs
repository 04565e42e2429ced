use std::io::{self, Write};

use tracing::{error, warn};

use crate::collector::Collector;
use crate::error::CollectError;
use crate::launch::RunLauncher;
use crate::prompt::{Interrupt, Prompter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed,
    Cancelled,
    /// Rejected before anything ran.
    Rejected(String),
    Failed(String),
}

const BANNER: &str = "\
==========================================================================================
 * Sorts a dataset of speech clips by voiceprint, separating the clips in which one
   particular speaker talks alone so the dataset can be cleaned.
 * Every clip must already be a .wav file with vocals isolated and sliced.
 * About ten seconds of clean reference audio is enough, but its quality largely
   decides the quality of the sorting.
 * Singing can be sorted too, with lower accuracy; loosen or tighten the threshold.
==========================================================================================
";

const CAVEAT: &str = "\
  * This is not a way to pull one speaker out of an arbitrary mix of recordings; expect
    few clips, or clips that are mostly but not only the target speaker.
  * Choosing material carefully up front works best; treat this tool as a way to weed
    out stray interruptions.
";

/// Collects parameters and launches one run. Every failure is reported on
/// `out` and returned as an outcome; none escapes as an error. A run that
/// fails after `interrupt` fired counts as cancelled.
pub fn run_session<P, L, W>(
    collector: &Collector,
    prompter: &mut P,
    launcher: &mut L,
    interrupt: &Interrupt,
    out: &mut W,
) -> io::Result<SessionOutcome>
where
    P: Prompter + ?Sized,
    L: RunLauncher + ?Sized,
    W: Write,
{
    writeln!(out, "\n{BANNER}")?;
    writeln!(out, "{CAVEAT}")?;

    let params = match collector.collect(prompter) {
        Ok(params) => params,
        Err(err) => return report(out, err),
    };

    let name = params.target_speaker();
    writeln!(out, "\nClassifying clips that match: {name}\n")?;
    if let Err(err) = launcher.launch(&params) {
        if interrupt.is_triggered() {
            warn!(%err, "run interrupted");
            return report(out, CollectError::Cancelled);
        }
        return report(out, err);
    }
    writeln!(out, "\nClassification finished: {name}\n")?;
    Ok(SessionOutcome::Completed)
}

fn report<W: Write>(out: &mut W, err: CollectError) -> io::Result<SessionOutcome> {
    match err {
        CollectError::Cancelled => {
            writeln!(out, "\nOperation cancelled by user\n")?;
            Ok(SessionOutcome::Cancelled)
        }
        CollectError::Prompt(err) => {
            error!(%err, "cannot read answers");
            writeln!(out, "Error reading answers: {err}")?;
            Ok(SessionOutcome::Failed(err.to_string()))
        }
        err if err.is_configuration() => {
            warn!(%err, "configuration rejected");
            writeln!(out, "Error: {err}")?;
            Ok(SessionOutcome::Rejected(err.to_string()))
        }
        err => {
            error!(%err, "run failed");
            writeln!(out, "Error while classifying: {err}")?;
            Ok(SessionOutcome::Failed(err.to_string()))
        }
    }
}
