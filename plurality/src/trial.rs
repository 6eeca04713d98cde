// Copyright 2026 The MinimumAnswers developers.
// This file is part of MinimumAnswers.
// MinimumAnswers is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MinimumAnswers is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MinimumAnswers.  If not, see <https://www.gnu.org/licenses/>.


//! A single trial: make up a population of voters, collect some votes, and see whether
//! plurality voting found the right answer.


use serde::{Serialize,Deserialize};
use thiserror::Error;
use crate::answer_drawer::{AnswerDrawer, DrawError};
use crate::distribution::{GenerationError, GenerationRequest, OptionIndex};
use crate::occurrence_counter::OccurrenceCounter;
use crate::random_source::RandomSource;

/// What plurality voting made of a tally.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,Serialize,Deserialize)]
pub enum Decision {
    /// The most voted option is the correct one.
    Win,
    /// The top two options have the same number of votes, so no decision can be made.
    Draw,
    /// The most voted option is not the correct one.
    Wrong,
}

/// See if plurality voting found the correct result.
pub fn decide<T:Clone+PartialEq>(correct:&T,votes:&OccurrenceCounter<T>) -> Decision {
    let top = votes.top(2);
    if top.len()==2 && top.count_at(0)==top.count_at(1) { Decision::Draw }
    else if votes.top_single()==Some(correct) { Decision::Win }
    else { Decision::Wrong }
}

/// When to stop collecting votes.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum StoppingRule {
    /// Collect exactly this many votes.
    FixedCount(usize),
    /// Keep collecting votes until the leader is at least threshold votes ahead of the runner up.
    /// If max_votes is given, a trial that reaches it without meeting the threshold fails.
    Margin{threshold:usize,max_votes:Option<usize>},
}

#[derive(Error,Debug,Clone,PartialEq,Eq)]
pub enum TrialError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Draw(#[from] DrawError),
    #[error("Still no margin of {threshold} after {limit} votes (margin {margin})")]
    VoteLimitExceeded{threshold:usize,limit:usize,margin:isize},
}

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub struct TrialOutcome {
    pub decision : Decision,
    pub votes_used : usize,
    /// The top two difference of the distribution the voters were drawn from.
    pub difficulty : u32,
}

/// Draw exactly n votes.
pub fn tally_fixed<R:RandomSource+?Sized>(drawer:&AnswerDrawer,n:usize,rng:&mut R) -> Result<OccurrenceCounter<OptionIndex>,TrialError> {
    let mut votes = OccurrenceCounter::new();
    for _ in 0..n {
        votes.add(drawer.draw(rng)?);
    }
    Ok(votes)
}

/// Draw votes one at a time until the margin between the top two is at least threshold.
/// An empty tally has a negative margin, so at least one vote is always drawn for a positive threshold.
pub fn tally_until_margin<R:RandomSource+?Sized>(drawer:&AnswerDrawer,threshold:usize,max_votes:Option<usize>,rng:&mut R) -> Result<OccurrenceCounter<OptionIndex>,TrialError> {
    let mut votes = OccurrenceCounter::new();
    let mut drawn = 0;
    while votes.margin_top_two() < threshold as isize {
        if let Some(limit) = max_votes {
            if drawn>=limit { return Err(TrialError::VoteLimitExceeded{threshold,limit,margin:votes.margin_top_two()}) }
        }
        votes.add(drawer.draw(rng)?);
        drawn+=1;
    }
    Ok(votes)
}

/// Collect votes from the given voters according to the rule, and decide.
pub fn run_with_drawer<R:RandomSource+?Sized>(drawer:&AnswerDrawer,rule:StoppingRule,rng:&mut R) -> Result<TrialOutcome,TrialError> {
    let votes = match rule {
        StoppingRule::FixedCount(n) => tally_fixed(drawer,n,rng)?,
        StoppingRule::Margin{threshold,max_votes} => tally_until_margin(drawer,threshold,max_votes,rng)?,
    };
    // a draw is not expected under the margin rule, but decide copes anyway.
    Ok(TrialOutcome{
        decision: decide(&drawer.top_option(),&votes),
        votes_used: votes.total_weighted().max(0) as usize,
        difficulty: drawer.difference(),
    })
}

/// A whole trial: generate a population, collect votes, decide.
pub fn run_trial<R:RandomSource+?Sized>(request:&GenerationRequest,rule:StoppingRule,rng:&mut R) -> Result<TrialOutcome,TrialError> {
    let drawer = AnswerDrawer::new(request.generate(rng)?);
    run_with_drawer(&drawer,rule,rng)
}
