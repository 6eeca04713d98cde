// Copyright 2026 The MinimumAnswers developers.
// This file is part of MinimumAnswers.
// MinimumAnswers is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MinimumAnswers is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MinimumAnswers.  If not, see <https://www.gnu.org/licenses/>.


//! Run many trials for each combination of number of options and number of votes (or margin),
//! and summarise how often plurality voting got it right.
//!
//! Each combination is a batch. Batches are independent and run in parallel on a fixed size pool.


use std::fmt;
use std::fmt::{Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;
use rayon::prelude::*;
use serde::{Serialize,Deserialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use crate::distribution::{GenerationError, GenerationRequest, MAX_DIFFERENCE, difference_is_possible};
use crate::occurrence_counter::OccurrenceCounter;
use crate::random_source::{RandomService, RandomSource};
use crate::trial::{Decision, StoppingRule, TrialError, run_trial};

/// The number of threads batches are run on, unless told otherwise.
pub const DEFAULT_POOL_SIZE : usize = 16;

/// The window of differences used for ordinary trials. A difference of at least 1 means
/// there is always a unique correct answer.
pub const DEFAULT_MIN_DIFFERENCE : u32 = 1;
pub const DEFAULT_MAX_DIFFERENCE : u32 = MAX_DIFFERENCE;

/// The hardest difficulty used by the controlled difficulty mode (99 is impossible).
pub const MAX_CONTROLLED_DIFFICULTY : u32 = 98;

#[derive(Error,Debug)]
pub enum ExperimentError {
    #[error("Bad configuration for {num_options} options, parameter {parameter} : {source}")]
    Generation{num_options:usize,parameter:usize,#[source] source:GenerationError},
    #[error("The number of iterations must be positive")]
    NoIterations,
    #[error("The number of threads must be positive")]
    NoThreads,
    #[error("The number of draws must be positive")]
    NoDraws,
    #[error(transparent)]
    Trial(#[from] TrialError),
    #[error("The margin threshold must be at least 1")]
    ZeroThreshold,
    #[error("The range {0} is empty")]
    EmptyRange(InclusiveRange),
    #[error("Could not create a pool of {threads} threads")]
    Pool{threads:usize,#[source] source:rayon::ThreadPoolBuildError},
}

#[derive(Error,Debug,Clone,PartialEq,Eq)]
pub enum RangeParseError {
    #[error("Could not parse number in range : {0}")]
    Number(#[from] ParseIntError),
}

/// A range of values such as number of options, first and last inclusive.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub struct InclusiveRange {
    pub first : usize,
    pub last : usize,
}

impl InclusiveRange {
    pub fn new(first:usize,last:usize) -> Self { InclusiveRange{first,last} }
    pub fn single(value:usize) -> Self { InclusiveRange{first:value,last:value} }
    pub fn is_empty(&self) -> bool { self.first>self.last }
    pub fn iter(&self) -> impl Iterator<Item=usize> { self.first..=self.last }
}

impl Display for InclusiveRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.first==self.last { write!(f,"{}",self.first) } else { write!(f,"{}..={}",self.first,self.last) }
    }
}

/// Accepts `7`, `3..=6`, `3..7` or `3-6`.
impl FromStr for InclusiveRange {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some((first,last)) = s.split_once("..=") {
            Ok(InclusiveRange::new(first.trim().parse()?,last.trim().parse()?))
        } else if let Some((first,last)) = s.split_once("..") {
            let last : usize = last.trim().parse()?;
            // an exclusive range 3..3 is empty.
            Ok(match last.checked_sub(1) {
                Some(last) => InclusiveRange::new(first.trim().parse()?,last),
                None => InclusiveRange::new(1,0),
            })
        } else if let Some((first,last)) = s.split_once('-') {
            Ok(InclusiveRange::new(first.trim().parse()?,last.trim().parse()?))
        } else {
            Ok(InclusiveRange::single(s.parse()?))
        }
    }
}

/// The different sorts of experiment.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub enum Mode {
    /// A fixed number of votes per trial. The parameter is the number of votes.
    Fixed,
    /// Like Fixed, but the trials cycle evenly through every achievable difficulty rather than
    /// letting the random generation decide how hard each trial is.
    ControlledDifficulty,
    /// Keep collecting votes until the margin between the top two reaches the parameter.
    Adaptive,
}

/// What to run. Usually constructed from the command line.
#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct ExperimentConfig {
    pub mode : Mode,
    pub iterations : usize,
    pub options : InclusiveRange,
    /// The number of votes for the fixed modes, the margin threshold for the adaptive mode.
    pub parameter : InclusiveRange,
    /// Adaptive mode only. A trial that uses this many votes without reaching the margin is skipped.
    pub max_votes : Option<usize>,
    /// Keep a histogram of the difficulties generated.
    pub measure_difficulties : bool,
    pub pool_size : usize,
}

impl ExperimentConfig {
    pub fn new(mode:Mode,iterations:usize,options:InclusiveRange,parameter:InclusiveRange) -> Self {
        ExperimentConfig{mode,iterations,options,parameter,max_votes:None,measure_difficulties:false,pool_size:DEFAULT_POOL_SIZE}
    }

    /// One batch per (number of options, parameter) pair, options varying slowest.
    pub fn batches(&self) -> Result<Vec<BatchSpec>,ExperimentError> {
        if self.iterations==0 { return Err(ExperimentError::NoIterations) }
        if self.pool_size==0 { return Err(ExperimentError::NoThreads) }
        if self.options.is_empty() { return Err(ExperimentError::EmptyRange(self.options)) }
        if self.parameter.is_empty() { return Err(ExperimentError::EmptyRange(self.parameter)) }
        if self.mode==Mode::Adaptive && self.parameter.first==0 { return Err(ExperimentError::ZeroThreshold) }
        let mut res = vec![];
        for num_options in self.options.iter() {
            for parameter in self.parameter.iter() {
                res.push(BatchSpec{
                    mode: self.mode,
                    num_options,
                    parameter,
                    iterations: self.iterations,
                    max_votes: self.max_votes,
                    measure_difficulties: self.measure_difficulties,
                });
            }
        }
        Ok(res)
    }
}

/// All the trials for one combination of settings.
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize)]
pub struct BatchSpec {
    pub mode : Mode,
    pub num_options : usize,
    pub parameter : usize,
    pub iterations : usize,
    pub max_votes : Option<usize>,
    pub measure_difficulties : bool,
}

impl BatchSpec {
    pub fn stopping_rule(&self) -> StoppingRule {
        match self.mode {
            Mode::Fixed | Mode::ControlledDifficulty => StoppingRule::FixedCount(self.parameter),
            Mode::Adaptive => StoppingRule::Margin{threshold:self.parameter,max_votes:self.max_votes},
        }
    }

    /// The distributions to generate, cycled through in order.
    pub fn generation_plan(&self) -> Vec<GenerationRequest> {
        match self.mode {
            Mode::Fixed | Mode::Adaptive => vec![GenerationRequest::new(self.num_options,DEFAULT_MIN_DIFFERENCE,DEFAULT_MAX_DIFFERENCE)],
            Mode::ControlledDifficulty => controlled_difficulties(self.num_options).into_iter().map(|d|GenerationRequest::new(self.num_options,d,d)).collect(),
        }
    }

    /// The number of trials actually run. In controlled difficulty mode, the iterations are
    /// rounded up to a whole number of passes through the difficulties.
    pub fn trials(&self,plan_len:usize) -> usize {
        if plan_len<=1 { self.iterations } else { self.iterations.div_ceil(plan_len)*plan_len }
    }
}

/// Every difficulty from 1 to 98 that can be generated for the given number of options.
/// With 2 options the shares always differ by an even amount, so only even difficulties are used.
pub fn controlled_difficulties(num_options:usize) -> Vec<u32> {
    (1..=MAX_CONTROLLED_DIFFICULTY).filter(|d|difference_is_possible(num_options,*d)).collect()
}

/// The summary of a batch.
#[derive(Debug,Clone,Serialize,Deserialize)]
pub struct AggregateResult {
    pub mode : Mode,
    pub num_options : usize,
    pub parameter : usize,
    /// Number of trials attempted, including skipped ones.
    pub trials : usize,
    pub wins : usize,
    pub draws : usize,
    pub wrong : usize,
    /// Trials that failed and so were not counted as anything.
    pub skipped : usize,
    /// Percentages of trials.
    pub win_rate : f64,
    pub draw_rate : f64,
    pub wrong_rate : f64,
    /// Mean number of votes used by the trials that completed.
    pub average_votes : f64,
    #[serde(skip_serializing_if = "Option::is_none",default)]
    pub difficulties : Option<OccurrenceCounter<u32>>,
}

/// Running totals while a batch is in progress.
struct Accumulator {
    wins : usize,
    draws : usize,
    wrong : usize,
    skipped : usize,
    votes : usize,
    difficulties : Option<OccurrenceCounter<u32>>,
}

impl Accumulator {
    fn new(measure_difficulties:bool) -> Self {
        Accumulator{wins:0,draws:0,wrong:0,skipped:0,votes:0,difficulties:if measure_difficulties {Some(OccurrenceCounter::new())} else {None}}
    }

    fn finish(self,spec:&BatchSpec,trials:usize) -> AggregateResult {
        let completed = self.wins+self.draws+self.wrong;
        AggregateResult{
            mode: spec.mode,
            num_options: spec.num_options,
            parameter: spec.parameter,
            trials,
            wins: self.wins,
            draws: self.draws,
            wrong: self.wrong,
            skipped: self.skipped,
            win_rate: percentage(self.wins,trials),
            draw_rate: percentage(self.draws,trials),
            wrong_rate: percentage(self.wrong,trials),
            average_votes: if completed==0 { 0.0 } else { self.votes as f64/completed as f64 },
            difficulties: self.difficulties,
        }
    }
}

/// 100*part/whole, 0 if whole is 0.
pub fn percentage(part:usize,whole:usize) -> f64 {
    if whole==0 { 0.0 } else { part as f64*100.0/whole as f64 }
}

/// Run all the trials in a batch.
///
/// A configuration that cannot generate distributions stops the batch immediately.
/// Any other failure of a single trial is logged and the trial is skipped, so a long run is not lost to one bad trial.
pub fn run_batch<R:RandomSource+?Sized>(spec:&BatchSpec,rng:&mut R) -> Result<AggregateResult,ExperimentError> {
    let config_error = |source:GenerationError| ExperimentError::Generation{num_options:spec.num_options,parameter:spec.parameter,source};
    if spec.iterations==0 { return Err(ExperimentError::NoIterations) }
    if let StoppingRule::Margin{threshold:0,..} = spec.stopping_rule() { return Err(ExperimentError::ZeroThreshold) }
    let plan = spec.generation_plan();
    for request in &plan { request.validate().map_err(config_error)?; }
    if plan.is_empty() { return Err(config_error(GenerationError::Infeasible{num_options:spec.num_options,min:1,max:MAX_CONTROLLED_DIFFICULTY})) }
    let trials = spec.trials(plan.len());
    let rule = spec.stopping_rule();
    debug!(?spec,trials,"Starting batch");
    let mut acc = Accumulator::new(spec.measure_difficulties);
    for trial in 0..trials {
        let request = &plan[trial%plan.len()];
        match run_trial(request,rule,rng) {
            Ok(outcome) => {
                match outcome.decision {
                    Decision::Win => acc.wins+=1,
                    Decision::Draw => acc.draws+=1,
                    Decision::Wrong => acc.wrong+=1,
                }
                acc.votes+=outcome.votes_used;
                if let Some(difficulties) = &mut acc.difficulties { difficulties.add(outcome.difficulty); }
            }
            Err(TrialError::Generation(source)) => return Err(config_error(source)),
            Err(e) => {
                warn!(num_options=spec.num_options,parameter=spec.parameter,trial,error=%e,"Skipping trial");
                acc.skipped+=1;
            }
        }
    }
    let res = acc.finish(spec,trials);
    info!(num_options=res.num_options,parameter=res.parameter,win_rate=res.win_rate,skipped=res.skipped,"Finished batch");
    Ok(res)
}

/// A batch and what became of it.
#[derive(Debug)]
pub struct BatchReport {
    pub spec : BatchSpec,
    pub result : Result<AggregateResult,ExperimentError>,
}

/// Run every batch in the configuration on a pool of config.pool_size threads.
///
/// on_finished is called as each batch finishes, in whatever order that happens.
/// Returns once every batch has finished, with the reports in batch order.
pub fn run_experiment<F>(config:&ExperimentConfig,random:&RandomService,on_finished:F) -> Result<Vec<BatchReport>,ExperimentError>
where F : Fn(&BatchReport) + Sync
{
    let batches = config.batches()?;
    let pool = rayon::ThreadPoolBuilder::new().num_threads(config.pool_size).build().map_err(|source|ExperimentError::Pool{threads:config.pool_size,source})?;
    info!(batches=batches.len(),threads=config.pool_size,policy=?random.policy(),"Running experiment");
    let reports = pool.install(||{
        batches.into_par_iter().enumerate().map(|(batch_no,spec)|{
            let mut rng = random.source_for_batch(batch_no);
            let result = run_batch(&spec,&mut rng);
            if let Err(e) = &result { error!(num_options=spec.num_options,parameter=spec.parameter,error=%e,"Batch aborted"); }
            let report = BatchReport{spec,result};
            on_finished(&report);
            report
        }).collect::<Vec<_>>()
    });
    Ok(reports)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ranges() {
        assert_eq!(Ok(InclusiveRange::new(3,6)),"3..=6".parse::<InclusiveRange>());
        assert_eq!(Ok(InclusiveRange::new(3,6)),"3..7".parse::<InclusiveRange>());
        assert_eq!(Ok(InclusiveRange::new(3,6)),"3-6".parse::<InclusiveRange>());
        assert_eq!(Ok(InclusiveRange::single(33)),"33".parse::<InclusiveRange>());
        assert!("3..0".parse::<InclusiveRange>().unwrap().is_empty());
        assert!("x".parse::<InclusiveRange>().is_err());
        assert_eq!("3..=6",InclusiveRange::new(3,6).to_string());
        assert_eq!("4",InclusiveRange::single(4).to_string());
    }

    #[test]
    fn batches_cover_the_grid() {
        let config = ExperimentConfig::new(Mode::Fixed,10,InclusiveRange::new(2,3),InclusiveRange::new(5,7));
        let batches = config.batches().unwrap();
        assert_eq!(6,batches.len());
        assert_eq!((2,5),(batches[0].num_options,batches[0].parameter));
        assert_eq!((3,7),(batches[5].num_options,batches[5].parameter));
        assert_eq!(StoppingRule::FixedCount(5),batches[0].stopping_rule());
    }

    #[test]
    fn bad_configurations() {
        let config = ExperimentConfig::new(Mode::Fixed,0,InclusiveRange::single(2),InclusiveRange::single(3));
        assert!(matches!(config.batches(),Err(ExperimentError::NoIterations)));
        let config = ExperimentConfig{pool_size:0,..ExperimentConfig::new(Mode::Fixed,5,InclusiveRange::single(2),InclusiveRange::single(3))};
        assert!(matches!(config.batches(),Err(ExperimentError::NoThreads)));
        let config = ExperimentConfig::new(Mode::Adaptive,5,InclusiveRange::single(2),InclusiveRange::new(0,3));
        assert!(matches!(config.batches(),Err(ExperimentError::ZeroThreshold)));
        let config = ExperimentConfig::new(Mode::Fixed,5,InclusiveRange::new(4,3),InclusiveRange::single(3));
        assert!(matches!(config.batches(),Err(ExperimentError::EmptyRange(_))));
    }

    #[test]
    fn controlled_difficulties_for_two_options_are_even() {
        let two = controlled_difficulties(2);
        assert_eq!(49,two.len());
        assert!(two.iter().all(|d|d%2==0));
        assert_eq!(98,controlled_difficulties(3).len());
        let spec = BatchSpec{mode:Mode::ControlledDifficulty,num_options:2,parameter:5,iterations:100,max_votes:None,measure_difficulties:false};
        assert_eq!(49,spec.generation_plan().len());
        assert_eq!(147,spec.trials(49));
    }

    #[test]
    fn percentages() {
        assert_eq!(25.0,percentage(1,4));
        assert_eq!(0.0,percentage(3,0));
    }
}
