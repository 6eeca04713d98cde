// Copyright 2026 The MinimumAnswers developers.
// This file is part of MinimumAnswers.
// MinimumAnswers is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MinimumAnswers is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MinimumAnswers.  If not, see <https://www.gnu.org/licenses/>.

//! Estimate how many answers a crowdsourcing system needs before plurality voting can be trusted,
//! by simulating voters with a known distribution of answers.

pub mod occurrence_counter;
pub mod random_source;
pub mod distribution;
pub mod answer_drawer;
pub mod trial;
pub mod experiment;
pub mod fairness;
pub mod report;
