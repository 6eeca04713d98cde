// Copyright 2026 The MinimumAnswers developers.
// This file is part of MinimumAnswers.
// MinimumAnswers is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MinimumAnswers is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MinimumAnswers.  If not, see <https://www.gnu.org/licenses/>.


//! Sources of uniformly distributed integers.
//!
//! There are two policies, chosen once per run.
//! * Unlogged: every batch of trials gets its own generator. Nothing is shared, nothing is recorded.
//! * Logged: one generator shared by everyone behind a lock, and every roll is recorded
//!   so the fairness of the rolls can be checked afterwards. Much slower.


use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Serialize,Deserialize};
use crate::occurrence_counter::OccurrenceCounter;

/// Something that can roll a fair n sided die (numbered from 0).
pub trait RandomSource {
    /// A uniformly distributed integer in 0..n. n must be positive.
    fn roll(&mut self,n:usize) -> usize;
}

/// For each distinct n rolls were made with, how often each result came up.
pub type RollHistory = BTreeMap<usize,OccurrenceCounter<usize>>;

#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize,Default)]
pub enum RandomPolicy {
    #[default]
    Unlogged,
    Logged,
}

/// A generator owned by a single batch. No synchronization, no history.
#[derive(Clone)]
pub struct UnloggedRandom {
    rng : ChaCha20Rng,
}

impl UnloggedRandom {
    /// Reproducible. Different streams from the same seed are independent.
    pub fn seeded(seed:u64,stream:u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        rng.set_stream(stream);
        UnloggedRandom{rng}
    }
    pub fn from_entropy() -> Self { UnloggedRandom{rng:ChaCha20Rng::from_os_rng()} }
}

impl RandomSource for UnloggedRandom {
    fn roll(&mut self,n:usize) -> usize { self.rng.random_range(0..n) }
}

struct LoggedState {
    rng : ChaCha20Rng,
    history : RollHistory,
}

/// A handle to the shared, recording generator. Clones share the same generator and history.
#[derive(Clone)]
pub struct LoggedRandom {
    state : Arc<Mutex<LoggedState>>,
}

impl LoggedRandom {
    fn new(rng:ChaCha20Rng) -> Self {
        LoggedRandom{state:Arc::new(Mutex::new(LoggedState{rng,history:RollHistory::new()}))}
    }
    pub fn seeded(seed:u64) -> Self { Self::new(ChaCha20Rng::seed_from_u64(seed)) }
    pub fn from_entropy() -> Self { Self::new(ChaCha20Rng::from_os_rng()) }

    /// A copy of everything rolled so far.
    pub fn history(&self) -> RollHistory {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).history.clone()
    }
}

impl RandomSource for LoggedRandom {
    fn roll(&mut self,n:usize) -> usize {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let res = state.rng.random_range(0..n);
        state.history.entry(n).or_default().add(res);
        res
    }
}

/// The source of randomness for a whole run. Constructed once at start up and
/// passed to whatever needs to hand out generators.
pub struct RandomService {
    policy : RandomPolicy,
    seed : Option<u64>,
    logged : Option<LoggedRandom>,
}

impl RandomService {
    /// If seed is None, generators are seeded from the operating system.
    pub fn new(policy:RandomPolicy,seed:Option<u64>) -> Self {
        let logged = match policy {
            RandomPolicy::Unlogged => None,
            RandomPolicy::Logged => Some(match seed { Some(seed) => LoggedRandom::seeded(seed), None => LoggedRandom::from_entropy() }),
        };
        RandomService{policy,seed,logged}
    }

    pub fn policy(&self) -> RandomPolicy { self.policy }

    /// The generator to be used by the given batch.
    pub fn source_for_batch(&self,batch:usize) -> BatchRandom {
        match &self.logged {
            Some(logged) => BatchRandom::Logged(logged.clone()),
            None => BatchRandom::Unlogged(match self.seed {
                Some(seed) => UnloggedRandom::seeded(seed,batch as u64),
                None => UnloggedRandom::from_entropy(),
            }),
        }
    }

    /// Everything rolled so far. Always empty under the unlogged policy.
    pub fn history(&self) -> RollHistory {
        self.logged.as_ref().map(|l|l.history()).unwrap_or_default()
    }
}

/// Whichever generator the policy in force hands out.
#[derive(Clone)]
pub enum BatchRandom {
    Unlogged(UnloggedRandom),
    Logged(LoggedRandom),
}

impl RandomSource for BatchRandom {
    fn roll(&mut self,n:usize) -> usize {
        match self {
            BatchRandom::Unlogged(r) => r.roll(n),
            BatchRandom::Logged(r) => r.roll(n),
        }
    }
}
