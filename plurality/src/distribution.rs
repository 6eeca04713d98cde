// Copyright 2026 The MinimumAnswers developers.
// This file is part of MinimumAnswers.
// MinimumAnswers is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MinimumAnswers is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MinimumAnswers.  If not, see <https://www.gnu.org/licenses/>.


//! Percentage distributions over a set of options, and random generation of them
//! with a controlled gap between the two most popular options.


use std::fmt;
use std::fmt::{Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;
use serde::{Serialize,Deserialize};
use thiserror::Error;
use crate::random_source::RandomSource;

/// The percentages in a distribution always add up to this.
pub const TOTAL_PERCENTAGE : u32 = 100;
pub const MIN_OPTIONS : usize = 2;
pub const MAX_OPTIONS : usize = 100;
/// The largest possible difference between the two most popular options.
pub const MAX_DIFFERENCE : u32 = 100;

/// An option, referred to by position, 0 being first. Displayed as opt0, opt1 etc.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OptionIndex(pub usize);

// type alias really, don't want long display
impl fmt::Display for OptionIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "opt{}", self.0) }
}
impl fmt::Debug for OptionIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { write!(f, "opt{}", self.0) }
}
impl FromStr for OptionIndex {
    type Err = ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(OptionIndex(s.strip_prefix("opt").unwrap_or(s).parse()?))
    }
}

#[derive(Error,Debug,Clone,PartialEq,Eq)]
pub enum DistributionError {
    #[error("A distribution needs at least 2 options ({0} given)")]
    TooFewOptions(usize),
    #[error("Option {option} has percentage {percentage}, more than 100")]
    PercentageOutOfRange{option:OptionIndex,percentage:u32},
    #[error("The percentages add up to {0}, not 100")]
    WrongTotal(u32),
}

/// How likely each option is to be chosen by a voter, in whole percentages.
/// Always has at least 2 options, and the percentages add up to exactly 100.
/// Serialized as the plain list of percentages, which is checked again when deserialized.
#[derive(Clone,Debug,PartialEq,Eq,Serialize,Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct Distribution {
    percentages : Vec<u32>,
}

impl Distribution {
    /// percentages[i] is the percentage for option i.
    pub fn new(percentages:Vec<u32>) -> Result<Self,DistributionError> {
        if percentages.len()<MIN_OPTIONS { return Err(DistributionError::TooFewOptions(percentages.len())) }
        if let Some((i,&percentage)) = percentages.iter().enumerate().find(|(_,p)|**p>TOTAL_PERCENTAGE) {
            return Err(DistributionError::PercentageOutOfRange{option:OptionIndex(i),percentage})
        }
        let total : u32 = percentages.iter().sum();
        if total!=TOTAL_PERCENTAGE { return Err(DistributionError::WrongTotal(total)) }
        Ok(Distribution{percentages})
    }

    pub fn len(&self) -> usize { self.percentages.len() }
    /// Never true, as there are always at least 2 options.
    pub fn is_empty(&self) -> bool { self.percentages.is_empty() }

    /// None if there is no such option.
    pub fn percentage(&self,option:OptionIndex) -> Option<u32> { self.percentages.get(option.0).copied() }
    pub fn percentages(&self) -> &[u32] { &self.percentages }
    pub fn percentages_copy(&self) -> Vec<u32> { self.percentages.clone() }

    /// Options, in order, with their percentages.
    pub fn options(&self) -> impl Iterator<Item=(OptionIndex,u32)> + '_ {
        self.percentages.iter().enumerate().map(|(i,p)|(OptionIndex(i),*p))
    }

    /// The difficulty of this distribution. See [top_two_difference].
    pub fn top_two_difference(&self) -> u32 { top_two_difference(&self.percentages) }

    /// The correct answer. See [arg_max].
    pub fn arg_max(&self) -> OptionIndex { arg_max(&self.percentages).unwrap_or(OptionIndex(0)) }
}

impl TryFrom<Vec<u32>> for Distribution {
    type Error = DistributionError;
    fn try_from(percentages: Vec<u32>) -> Result<Self, Self::Error> { Distribution::new(percentages) }
}

impl From<Distribution> for Vec<u32> {
    fn from(distribution: Distribution) -> Self { distribution.percentages }
}

/// `opt0:25` style, one option per line.
impl Display for Distribution {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (option,percentage) in self.options() {
            writeln!(f,"{}:{}",option,percentage)?;
        }
        Ok(())
    }
}

/// The highest value minus the next highest. If the highest value occurs twice, this is 0.
/// A single value is compared against 0.
pub fn top_two_difference(values:&[u32]) -> u32 {
    let mut highest = 0;
    let mut second = 0;
    for &v in values {
        if v>highest { second=highest; highest=v; }
        else if v>second { second=v; }
    }
    let repeated_max = values.iter().filter(|v|**v==highest).count()>1;
    if repeated_max { 0 } else { highest-second }
}

/// The first option (in order) holding the highest value. None if there are no values.
pub fn arg_max(values:&[u32]) -> Option<OptionIndex> {
    let max = values.iter().max()?;
    values.iter().position(|v|v==max).map(OptionIndex)
}

#[derive(Error,Debug,Clone,PartialEq,Eq)]
pub enum GenerationError {
    #[error("The possible number of options must be between [2-100] ({0} given)")]
    NumberOfOptions(usize),
    #[error("The minimum difference must be between [0-100] ({0} given)")]
    MinDifference(u32),
    #[error("The maximum difference must be between [0-100] ({0} given)")]
    MaxDifference(u32),
    #[error("The minimum difference ({min}) cannot be more than the maximum difference ({max})")]
    MinAboveMax{min:u32,max:u32},
    #[error("You can never get a difference of 99. 100-0=100, 99-1=98")]
    Difference99,
    #[error("No distribution over {num_options} options has a difference between {min} and {max}")]
    Infeasible{num_options:usize,min:u32,max:u32},
    #[error("No distribution with a difference between {min} and {max} found in {attempts} attempts")]
    AttemptsExhausted{min:u32,max:u32,attempts:usize},
}

/// A request for a random distribution over num_options options, where the difference between the
/// most popular and second most popular options is in min_difference..=max_difference.
///
/// For example 2 options with differences 10..=90 cannot be closer than 55 to 45, and cannot
/// be further apart than 95 to 5 (regardless of which option gets what).
#[derive(Clone,Copy,Debug,PartialEq,Eq,Serialize,Deserialize)]
pub struct GenerationRequest {
    pub num_options : usize,
    pub min_difference : u32,
    pub max_difference : u32,
    /// Give up after this many rejected distributions. None means keep trying forever, which is
    /// fine for wide windows but can take a very long time for very unlikely ones.
    #[serde(skip_serializing_if = "Option::is_none",default)]
    pub max_attempts : Option<usize>,
}

impl GenerationRequest {
    pub fn new(num_options:usize,min_difference:u32,max_difference:u32) -> Self {
        GenerationRequest{num_options,min_difference,max_difference,max_attempts:None}
    }
    pub fn with_max_attempts(self,max_attempts:usize) -> Self { GenerationRequest{max_attempts:Some(max_attempts),..self} }

    /// Check the request makes sense before trying to satisfy it.
    pub fn validate(&self) -> Result<(),GenerationError> {
        if self.num_options<MIN_OPTIONS || self.num_options>MAX_OPTIONS { return Err(GenerationError::NumberOfOptions(self.num_options)) }
        if self.min_difference>MAX_DIFFERENCE { return Err(GenerationError::MinDifference(self.min_difference)) }
        if self.max_difference>MAX_DIFFERENCE { return Err(GenerationError::MaxDifference(self.max_difference)) }
        if self.min_difference>self.max_difference { return Err(GenerationError::MinAboveMax{min:self.min_difference,max:self.max_difference}) }
        if self.min_difference==99 && self.max_difference==99 { return Err(GenerationError::Difference99) }
        if !(self.min_difference..=self.max_difference).any(|d|difference_is_possible(self.num_options,d)) {
            return Err(GenerationError::Infeasible{num_options:self.num_options,min:self.min_difference,max:self.max_difference})
        }
        Ok(())
    }

    /// Make distributions until one is within the required window.
    ///
    /// Each candidate gives the first option a uniformly chosen percentage in 0..=100, the next
    /// option a percentage in 0..=(whatever is left), and so on. The last option gets the remainder.
    pub fn generate<R:RandomSource+?Sized>(&self,rng:&mut R) -> Result<Distribution,GenerationError> {
        self.validate()?;
        let mut attempts = 0;
        loop {
            if let Some(max_attempts) = self.max_attempts {
                if attempts>=max_attempts { return Err(GenerationError::AttemptsExhausted{min:self.min_difference,max:self.max_difference,attempts}) }
            }
            attempts+=1;
            let mut percentages = Vec::with_capacity(self.num_options);
            let mut remaining = TOTAL_PERCENTAGE;
            for _ in 0..self.num_options-1 {
                // roll(n) gives a value below n, and cannot be called with 0.
                let percentage = if remaining>0 { rng.roll(remaining as usize+1) as u32 } else { 0 };
                remaining-=percentage;
                percentages.push(percentage);
            }
            percentages.push(remaining);
            let difference = top_two_difference(&percentages);
            if difference>=self.min_difference && difference<=self.max_difference {
                return Ok(Distribution{percentages});
            }
        }
    }
}

/// Shorthand for [GenerationRequest::generate] with no limit on attempts.
pub fn generate<R:RandomSource+?Sized>(num_options:usize,min_difference:u32,max_difference:u32,rng:&mut R) -> Result<Distribution,GenerationError> {
    GenerationRequest::new(num_options,min_difference,max_difference).generate(rng)
}

/// Whether some distribution over num_options options has the given top two difference.
///
/// With the top two at s+d and s, the other options hold 100-d-2s between them, each at most s.
/// So some integer s is needed with (100-d)/num_options <= s <= (100-d)/2.
pub fn difference_is_possible(num_options:usize,difference:u32) -> bool {
    if difference>MAX_DIFFERENCE || num_options<MIN_OPTIONS { return false }
    let rest = (TOTAL_PERCENTAGE-difference) as usize;
    rest.div_ceil(num_options) <= rest/2
}
