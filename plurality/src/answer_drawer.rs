// Copyright 2026 The MinimumAnswers developers.
// This file is part of MinimumAnswers.
// MinimumAnswers is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MinimumAnswers is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MinimumAnswers.  If not, see <https://www.gnu.org/licenses/>.


//! Simulated voters, answering according to a distribution.


use std::fmt;
use std::fmt::{Display, Formatter};
use thiserror::Error;
use crate::distribution::{Distribution, OptionIndex, TOTAL_PERCENTAGE};
use crate::random_source::RandomSource;

/// Number of slots in the lookup table, one per percent.
pub const ROLLER_SLOTS : usize = TOTAL_PERCENTAGE as usize;

#[derive(Error,Debug,Clone,PartialEq,Eq)]
pub enum DrawError {
    #[error("Rolled slot {slot}, but there are only {slots} slots")]
    SlotOutOfRange{slot:usize,slots:usize},
}

/// Draws answers according to a distribution.
///
/// The distribution is expanded into a table with one slot per percent, each holding the option
/// whose cumulative range covers it, so a draw is a single roll and a lookup.
#[derive(Clone,Debug)]
pub struct AnswerDrawer {
    distribution : Distribution,
    roller : Vec<OptionIndex>,
    top_option : OptionIndex,
    difference : u32,
}

impl AnswerDrawer {
    pub fn new(distribution:Distribution) -> Self {
        let mut roller = Vec::with_capacity(ROLLER_SLOTS);
        for (option,percentage) in distribution.options() {
            roller.extend(std::iter::repeat_n(option,percentage as usize));
        }
        let top_option = distribution.arg_max();
        let difference = distribution.top_two_difference();
        AnswerDrawer{distribution,roller,top_option,difference}
    }

    /// One voter's answer.
    pub fn draw<R:RandomSource+?Sized>(&self,rng:&mut R) -> Result<OptionIndex,DrawError> {
        let slot = rng.roll(ROLLER_SLOTS);
        self.roller.get(slot).copied().ok_or(DrawError::SlotOutOfRange{slot,slots:self.roller.len()})
    }

    /// The correct answer: the most likely option.
    pub fn top_option(&self) -> OptionIndex { self.top_option }
    /// The difference in percentage between the two most likely options.
    pub fn difference(&self) -> u32 { self.difference }
    /// The number of options.
    pub fn len(&self) -> usize { self.distribution.len() }
    pub fn is_empty(&self) -> bool { self.distribution.is_empty() }
    pub fn distribution(&self) -> &Distribution { &self.distribution }
    pub fn options_copy(&self) -> Distribution { self.distribution.clone() }
}

impl Display for AnswerDrawer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (option,percentage) in self.distribution.options() {
            writeln!(f,"{}\t{}",option,percentage)?;
        }
        writeln!(f,"Difference\t{}",self.difference)
    }
}
