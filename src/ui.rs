//! Terminal UI: spinners, per-rule outcome lines, and captured script
//! output.
//!
//! # Design goals
//!
//! - **Clean by default.** While an action runs the user sees only a spinner
//!   and the rule label.  Script `print` output is captured and hidden.
//! - **Informative on failure.** If a rule fails, the error and everything
//!   the script printed are replayed in full so the operator can diagnose
//!   the problem without re-running.
//! - **Testable without a terminal.** [`RunOutcome`] is a plain data type;
//!   building one does not touch the terminal.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use vaultic::{Action, ScriptAction};

// ─── Icons ───────────────────────────────────────────────────────────────────

/// Braille spinner frames, same style as indicatif's default.
static SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Green ✓, printed when a rule succeeds.
pub(crate) fn icon_ok() -> console::StyledObject<&'static str> {
    style("✓").green().bold()
}
/// Red ✗, printed when a rule fails.
fn icon_err() -> console::StyledObject<&'static str> {
    style("✗").red().bold()
}
/// Cyan ✓, printed next to the final success summary.
fn icon_done() -> console::StyledObject<&'static str> {
    style("✓").cyan().bold()
}

// ─── Run outcome ──────────────────────────────────────────────────────────────

/// The outcome of running one rule.
///
/// Carries the rule label plus whatever the script printed so it can be
/// replayed to the terminal when something goes wrong.
#[derive(Debug)]
pub struct RunOutcome {
    /// Rule label, e.g. `"nightly"`.
    pub label: String,
    /// Whether the rule completed without error.
    pub success: bool,
    /// Everything the script printed while running.
    pub output: String,
    /// The error message, if any.
    pub error: Option<String>,
}

impl RunOutcome {
    /// Print the one-line summary (✓/✗ + label) to stdout.
    ///
    /// On failure, also prints the error and the captured script output so
    /// the operator has everything they need without re-running.
    pub fn print(&self) {
        if self.success {
            println!("  {}  {}", icon_ok(), style(&self.label).bold());
        } else {
            println!("  {}  {}", icon_err(), style(&self.label).bold());

            if let Some(ref msg) = self.error {
                eprintln!();
                eprintln!("  {} {}", style("Error:").red().bold(), msg);
            }

            if !self.output.is_empty() {
                eprintln!();
                eprintln!("  {} script output:", style("►").dim());
                for line in self.output.lines() {
                    eprintln!("    {line}");
                }
            }
        }
    }

    /// Returns `true` if the rule did not succeed.
    pub const fn failed(&self) -> bool {
        !self.success
    }
}

// ─── Spinner ──────────────────────────────────────────────────────────────────

/// Create and start an indeterminate spinner for `label`.
///
/// The spinner ticks at ~80 ms and is automatically cleared when
/// [`ProgressBar::finish_and_clear`] is called.
fn make_spinner(label: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("  {spinner:.cyan}  {msg}")
            .unwrap()
            .tick_chars(SPINNER_CHARS),
    );
    pb.set_message(format!("{}", style(label).dim()));
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

// ─── Running actions ──────────────────────────────────────────────────────────

/// Run a bound action behind a spinner, returning a [`RunOutcome`].
///
/// The spinner is cleared before the outcome line is printed, so the
/// terminal always shows a clean, static summary when the rule finishes.
/// Whatever the script printed is drained into the outcome either way.
pub fn run_action(label: &str, mut action: ScriptAction) -> RunOutcome {
    let spinner = make_spinner(label);
    let result = action.run();
    spinner.finish_and_clear();

    let output = action.take_output();
    match result {
        Ok(()) => RunOutcome {
            label: label.to_string(),
            success: true,
            output,
            error: None,
        },
        Err(e) => RunOutcome {
            label: label.to_string(),
            success: false,
            output,
            error: Some(e.to_string()),
        },
    }
}

/// A synthetic failure for steps that never reached the script, e.g. a rule
/// that could not be found or an action that would not bind.
pub fn failed_step(label: &str, error: String) -> RunOutcome {
    RunOutcome {
        label: label.to_string(),
        success: false,
        output: String::new(),
        error: Some(error),
    }
}

// ─── Summary banner ───────────────────────────────────────────────────────────

/// Print the final summary after all rules have run.
///
/// Shows a success banner when every rule passed, or a failure banner
/// listing the rules that failed.
pub fn print_summary(outcomes: &[RunOutcome]) {
    let failed: Vec<&RunOutcome> = outcomes.iter().filter(|o| o.failed()).collect();
    println!();
    if failed.is_empty() {
        println!(
            "  {} {}",
            icon_done(),
            style("All rules completed successfully.").cyan().bold()
        );
    } else {
        eprintln!("  {}  {}", icon_err(), style("Run failed.").red().bold());
        for o in &failed {
            eprintln!("    {} {}", icon_err(), style(&o.label).red());
        }
    }
    println!();
}

// ─── Tests ────────────────────────────────────────────────────────────────────
