// Copyright 2026 The MinimumAnswers developers.
// This file is part of MinimumAnswers.
// MinimumAnswers is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MinimumAnswers is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MinimumAnswers.  If not, see <https://www.gnu.org/licenses/>.


//! Text output. Results are tab separated so they can be pasted into a spreadsheet.


use std::fmt::Write;
use serde::Serialize;
use crate::experiment::{AggregateResult, Mode};
use crate::fairness::FairnessReport;
use crate::random_source::RollHistory;

/// One line per batch.
/// * Fixed modes : options, votes, win %, draw %
/// * Adaptive mode : options, margin threshold, average votes used, win %
pub fn result_line(result:&AggregateResult) -> String {
    match result.mode {
        Mode::Fixed | Mode::ControlledDifficulty => format!("{}\t{:4}\t{:.2}\t{:.2}",result.num_options,result.parameter,result.win_rate,result.draw_rate),
        Mode::Adaptive => format!("{}\t{}\t{:.2}\t{:.2}",result.num_options,result.parameter,result.average_votes,result.win_rate),
    }
}

/// The generated difficulties, most common first, if they were measured.
pub fn difficulties_block(result:&AggregateResult) -> Option<String> {
    result.difficulties.as_ref().map(|d|d.ranked_descending().to_string())
}

/// One line per option : name, expected percentage, observed percentage.
pub fn fairness_lines(report:&FairnessReport) -> String {
    let mut res = String::new();
    for o in &report.options {
        let _ = writeln!(res,"{:>5}|{:>3}| {:.6}",o.option.to_string(),o.expected,o.observed);
    }
    res
}

/// Everything that was rolled. For each n that roll was called with, a header and then how often each result came up, most common first.
pub fn history_report(history:&RollHistory) -> String {
    let mut res = String::new();
    for (n,rolls) in history {
        let _ = writeln!(res,"\nMax number to roll: {} Total rolls: {}",n,rolls.total_weighted());
        let _ = writeln!(res,"{}",rolls.ranked_descending());
    }
    res
}

/// For machine readable output.
pub fn json_line<T:Serialize+?Sized>(value:&T) -> serde_json::Result<String> { serde_json::to_string(value) }
