//! Window evaluation command

use anyhow::Result;
use chrono::{Timelike, Utc};
use colored::Colorize;
use operator_lib::window::is_within_window;
use serde::Serialize;

use crate::output::{format_window, print_info, print_json, print_success, print_warning, OutputFormat};

/// Result of evaluating a window at one hour
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WindowEvaluation {
    pub start_hour: u32,
    pub end_hour: u32,
    pub hour: u32,
    pub inside: bool,
    pub wraps_midnight: bool,
    pub covered_hours: Vec<u32>,
}

impl WindowEvaluation {
    pub fn new(start_hour: u32, end_hour: u32, hour: u32) -> Self {
        Self {
            start_hour,
            end_hour,
            hour,
            inside: is_within_window(hour, start_hour, end_hour),
            wraps_midnight: start_hour > end_hour,
            covered_hours: (0..24)
                .filter(|h| is_within_window(*h, start_hour, end_hour))
                .collect(),
        }
    }
}

/// Evaluate a window at `at`, or the current UTC hour
pub fn evaluate_window(start: u32, end: u32, at: Option<u32>, format: OutputFormat) -> Result<()> {
    let hour = at.unwrap_or_else(|| Utc::now().hour());
    let evaluation = WindowEvaluation::new(start, end, hour);

    match format {
        OutputFormat::Json => print_json(&evaluation)?,
        OutputFormat::Table => {
            println!("Window: {}", format_window(start, end).cyan());
            print_info(&format!(
                "Covers {} hour(s): {}",
                evaluation.covered_hours.len(),
                evaluation
                    .covered_hours
                    .iter()
                    .map(|h| h.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
            if evaluation.inside {
                print_success(&format!("{:02}:00 UTC is inside the window", hour));
            } else {
                print_warning(&format!(
                    "{:02}:00 UTC is outside the window; workloads are left as they are",
                    hour
                ));
            }
        }
    }

    Ok(())
}
