//! Report rendering for stdout.

use serde::Serialize;

use fanout_types::{RunReport, RunSummary};

use crate::command::{CommandError, CommandOutput};

pub type CommandReport = RunReport<String, CommandOutput, CommandError>;

/// Summary line, then one line per failed or rejected item in input order.
#[must_use]
pub fn render_text(report: &CommandReport) -> String {
    let mut out = format!("{}\n", report.summary());
    for record in report.records_in_input_order() {
        if let Some(reason) = record.rejected_reason() {
            out.push_str(&format!(
                "rejected [{}] {}: {reason}\n",
                record.input_index(),
                record.input_item()
            ));
        } else if record.is_failed()
            && let Some(output) = record.output_result()
        {
            out.push_str(&format!(
                "failed   [{}] {}: {output}\n",
                record.input_index(),
                record.input_item()
            ));
        }
    }
    out
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    summary: RunSummary,
    failed: Vec<FailedItem<'a>>,
    rejected: Vec<RejectedItem<'a>>,
}

#[derive(Debug, Serialize)]
struct FailedItem<'a> {
    index: usize,
    item: &'a str,
    exit_code: Option<i32>,
}

#[derive(Debug, Serialize)]
struct RejectedItem<'a> {
    index: usize,
    item: &'a str,
    reason: String,
}

pub fn render_json(report: &CommandReport) -> serde_json::Result<String> {
    let mut json = JsonReport {
        summary: report.summary(),
        failed: Vec::new(),
        rejected: Vec::new(),
    };
    for record in report.records_in_input_order() {
        if let Some(reason) = record.rejected_reason() {
            json.rejected.push(RejectedItem {
                index: record.input_index(),
                item: record.input_item(),
                reason: reason.to_string(),
            });
        } else if record.is_failed()
            && let Some(output) = record.output_result()
        {
            json.failed.push(FailedItem {
                index: record.input_index(),
                item: record.input_item(),
                exit_code: output.exit_code,
            });
        }
    }
    serde_json::to_string_pretty(&json)
}
