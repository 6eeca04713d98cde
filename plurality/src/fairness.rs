// Copyright 2026 The MinimumAnswers developers.
// This file is part of MinimumAnswers.
// MinimumAnswers is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MinimumAnswers is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MinimumAnswers.  If not, see <https://www.gnu.org/licenses/>.


//! Check that the simulated voters really answer according to their distribution,
//! by drawing a large number of answers and comparing the observed frequencies.


use serde::{Serialize,Deserialize};
use crate::answer_drawer::AnswerDrawer;
use crate::distribution::{GenerationRequest, OptionIndex};
use crate::experiment::{ExperimentError, percentage};
use crate::occurrence_counter::OccurrenceCounter;
use crate::random_source::{RandomService, RandomSource};
use crate::trial::tally_fixed;

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct OptionFairness {
    pub option : OptionIndex,
    /// The percentage in the distribution.
    pub expected : u32,
    /// The percentage of draws that produced this option.
    pub observed : f64,
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
pub struct FairnessReport {
    pub draws : usize,
    /// Every option of the distribution, in order.
    pub options : Vec<OptionFairness>,
}

impl FairnessReport {
    /// The largest gap, in percentage points, between expected and observed.
    pub fn worst_deviation(&self) -> f64 {
        self.options.iter().map(|o|(o.observed-o.expected as f64).abs()).fold(0.0,f64::max)
    }
}

/// Draw the given number of answers and compare with the distribution.
pub fn check_fairness<R:RandomSource+?Sized>(drawer:&AnswerDrawer,draws:usize,rng:&mut R) -> Result<FairnessReport,ExperimentError> {
    if draws==0 { return Err(ExperimentError::NoDraws) }
    let votes : OccurrenceCounter<OptionIndex> = tally_fixed(drawer,draws,rng)?;
    let options = drawer.distribution().options().map(|(option,expected)|OptionFairness{
        option,
        expected,
        observed: percentage(votes.count(&option).max(0) as usize,draws),
    }).collect();
    Ok(FairnessReport{draws,options})
}

/// Generate a distribution as requested, then check the answers drawn from it.
pub fn run_fairness_check(request:&GenerationRequest,draws:usize,random:&RandomService) -> Result<(AnswerDrawer,FairnessReport),ExperimentError> {
    let mut rng = random.source_for_batch(0);
    let distribution = request.generate(&mut rng).map_err(|source|ExperimentError::Generation{num_options:request.num_options,parameter:draws,source})?;
    let drawer = AnswerDrawer::new(distribution);
    tracing::debug!(%drawer,"Checking fairness");
    let report = check_fairness(&drawer,draws,&mut rng)?;
    Ok((drawer,report))
}
