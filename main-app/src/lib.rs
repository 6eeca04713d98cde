// Copyright 2026 The MinimumAnswers developers.
// This file is part of MinimumAnswers.
// MinimumAnswers is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MinimumAnswers is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MinimumAnswers.  If not, see <https://www.gnu.org/licenses/>.

//! Glue between the command line and the simulation library.
//! Results go to stdout, logs to stderr.

use plurality::answer_drawer::AnswerDrawer;
use plurality::experiment::BatchReport;
use plurality::fairness::FairnessReport;
use plurality::random_source::RollHistory;
use plurality::report::{difficulties_block, fairness_lines, history_report, json_line, result_line};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log to stderr. RUST_LOG overrides the default level, which is info, or debug if verbose.
pub fn init_logging(verbose:bool) {
    let filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum OutputFormat {
    /// Tab separated, as used for spreadsheets.
    Text,
    /// One JSON object per line.
    Json,
}

impl OutputFormat {
    pub fn new(json:bool) -> Self { if json { OutputFormat::Json } else { OutputFormat::Text } }
}

/// What to print for a finished batch. A failed batch prints nothing, as it has already been logged.
pub fn format_batch(report:&BatchReport,format:OutputFormat) -> anyhow::Result<Option<String>> {
    let Ok(result) = &report.result else { return Ok(None) };
    Ok(Some(match format {
        OutputFormat::Json => json_line(result)?,
        OutputFormat::Text => match difficulties_block(result) {
            Some(difficulties) => result_line(result)+&difficulties,
            None => result_line(result),
        },
    }))
}

#[derive(Serialize)]
struct FairnessOutput<'a> {
    percentages : &'a [u32],
    difference : u32,
    #[serde(flatten)]
    report : &'a FairnessReport,
}

/// The distribution that was used, followed by the per option comparison.
pub fn format_fairness(drawer:&AnswerDrawer,report:&FairnessReport,format:OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => json_line(&FairnessOutput{percentages:drawer.distribution().percentages(),difference:drawer.difference(),report})?,
        OutputFormat::Text => format!("{}\n{}",drawer,fairness_lines(report)),
    })
}

pub fn format_history(history:&RollHistory,format:OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => json_line(history)?,
        OutputFormat::Text => history_report(history),
    })
}
