// Copyright 2026 The MinimumAnswers developers.
// This file is part of MinimumAnswers.
// MinimumAnswers is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MinimumAnswers is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MinimumAnswers.  If not, see <https://www.gnu.org/licenses/>.


use std::sync::Mutex;
use plurality::answer_drawer::AnswerDrawer;
use plurality::distribution::{generate, Distribution, GenerationError, GenerationRequest, OptionIndex};
use plurality::experiment::{run_batch, run_experiment, BatchSpec, ExperimentConfig, ExperimentError, InclusiveRange, Mode};
use plurality::fairness::run_fairness_check;
use plurality::random_source::{RandomPolicy, RandomService, RandomSource, UnloggedRandom};
use plurality::trial::{run_with_drawer, Decision, StoppingRule, TrialError};

/// Plays back a fixed list of rolls, each reduced modulo the requested n.
struct ScriptedRandom {
    rolls : Vec<usize>,
    used : usize,
}

impl ScriptedRandom {
    fn new(rolls:Vec<usize>) -> Self { ScriptedRandom{rolls,used:0} }
}

impl RandomSource for ScriptedRandom {
    fn roll(&mut self,n:usize) -> usize {
        let res = self.rolls[self.used%self.rolls.len()]%n;
        self.used+=1;
        res
    }
}

#[test]
fn difference_of_50_with_2_options() {
    let mut rng = UnloggedRandom::seeded(7,0);
    for _ in 0..20 {
        let d = generate(2,50,50,&mut rng).unwrap();
        assert!(d.percentages()==[75,25] || d.percentages()==[25,75],"got {:?}",d.percentages());
    }
}

#[test]
fn widest_window_always_succeeds() {
    let mut rng = UnloggedRandom::seeded(11,0);
    for num_options in 2..=10 {
        let d = generate(num_options,0,100,&mut rng).unwrap();
        assert_eq!(num_options,d.len());
        assert_eq!(100,d.percentages().iter().sum::<u32>());
    }
}

#[test]
fn attempts_run_out() {
    // always rolling 0 gives [0,...,0,100], a difference of 100, never 0.
    let mut rng = ScriptedRandom::new(vec![0]);
    let request = GenerationRequest::new(100,0,0).with_max_attempts(5);
    assert_eq!(Err(GenerationError::AttemptsExhausted{min:0,max:0,attempts:5}),request.generate(&mut rng));
}

#[test]
fn tied_top_is_found_or_gives_up() {
    // a difference of 0 only needs the top two to tie.
    let mut rng = UnloggedRandom::seeded(3,0);
    match GenerationRequest::new(100,0,0).with_max_attempts(1000).generate(&mut rng) {
        Ok(d) => {
            assert_eq!(0,d.top_two_difference());
            assert_eq!(100,d.len());
        }
        Err(e) => assert!(matches!(e,GenerationError::AttemptsExhausted{attempts:1000,..}),"unexpected error {}",e),
    }
}

#[test]
fn impossible_requests_are_rejected_up_front() {
    let mut rng = ScriptedRandom::new(vec![0]);
    assert_eq!(Err(GenerationError::Difference99),generate(3,99,99,&mut rng));
    assert_eq!(Err(GenerationError::NumberOfOptions(1)),generate(1,0,100,&mut rng));
    assert!(matches!(generate(2,51,51,&mut rng),Err(GenerationError::Infeasible{..})));
    assert_eq!(0,rng.used);
}

#[test]
fn adaptive_stops_at_first_sufficient_margin() {
    let drawer = AnswerDrawer::new(Distribution::new(vec![75,25]).unwrap());
    // slot 0 is opt0, slot 80 is opt1.
    let mut rng = ScriptedRandom::new(vec![0,80,0,0,0,0,0,80,80,80]);
    let outcome = run_with_drawer(&drawer,StoppingRule::Margin{threshold:5,max_votes:None},&mut rng).unwrap();
    assert_eq!(Decision::Win,outcome.decision);
    assert_eq!(7,outcome.votes_used);
    assert_eq!(7,rng.used);
    assert_eq!(50,outcome.difficulty);
}

#[test]
fn adaptive_can_pick_the_wrong_answer() {
    let drawer = AnswerDrawer::new(Distribution::new(vec![75,25]).unwrap());
    let mut rng = ScriptedRandom::new(vec![99]);
    let outcome = run_with_drawer(&drawer,StoppingRule::Margin{threshold:3,max_votes:None},&mut rng).unwrap();
    assert_eq!(Decision::Wrong,outcome.decision);
    assert_eq!(3,outcome.votes_used);
}

#[test]
fn fixed_count_can_draw() {
    let drawer = AnswerDrawer::new(Distribution::new(vec![60,40]).unwrap());
    let mut rng = ScriptedRandom::new(vec![10,70]);
    let outcome = run_with_drawer(&drawer,StoppingRule::FixedCount(4),&mut rng).unwrap();
    assert_eq!(Decision::Draw,outcome.decision);
    assert_eq!(4,outcome.votes_used);
}

#[test]
fn vote_limit_is_enforced() {
    let drawer = AnswerDrawer::new(Distribution::new(vec![50,30,20]).unwrap());
    let mut rng = ScriptedRandom::new(vec![0,60]);
    let res = run_with_drawer(&drawer,StoppingRule::Margin{threshold:2,max_votes:Some(6)},&mut rng);
    assert_eq!(Err(TrialError::VoteLimitExceeded{threshold:2,limit:6,margin:0}),res);
}

#[test]
fn trials_over_the_vote_limit_are_skipped() {
    let spec = BatchSpec{mode:Mode::Adaptive,num_options:2,parameter:100,iterations:4,max_votes:Some(3),measure_difficulties:false};
    let res = run_batch(&spec,&mut UnloggedRandom::seeded(5,0)).unwrap();
    assert_eq!(4,res.trials);
    assert_eq!(4,res.skipped);
    assert_eq!(0,res.wins+res.draws+res.wrong);
    assert_eq!(0.0,res.win_rate);
    assert_eq!(0.0,res.average_votes);
}

#[test]
fn controlled_batch_measures_every_difficulty() {
    let spec = BatchSpec{mode:Mode::ControlledDifficulty,num_options:2,parameter:3,iterations:49,max_votes:None,measure_difficulties:true};
    let res = run_batch(&spec,&mut UnloggedRandom::seeded(9,0)).unwrap();
    assert_eq!(49,res.trials);
    let difficulties = res.difficulties.unwrap();
    assert_eq!(49,difficulties.len());
    assert!(difficulties.iter().all(|(d,n)|d%2==0 && n==1));
}

#[test]
fn seeded_experiments_repeat() {
    let mut config = ExperimentConfig::new(Mode::Fixed,200,InclusiveRange::new(2,3),InclusiveRange::new(1,4));
    config.pool_size = 3;
    let run = || {
        let random = RandomService::new(RandomPolicy::Unlogged,Some(42));
        let finished = Mutex::new(0);
        let reports = run_experiment(&config,&random,|_|*finished.lock().unwrap()+=1).unwrap();
        assert_eq!(8,*finished.lock().unwrap());
        reports.into_iter().map(|r|{ let r = r.result.unwrap(); (r.num_options,r.parameter,r.wins,r.draws,r.wrong) }).collect::<Vec<_>>()
    };
    let first = run();
    assert_eq!(first,run());
    assert_eq!((2,1),(first[0].0,first[0].1));
    assert_eq!((3,4),(first[7].0,first[7].1));
    assert!(first.iter().all(|&(_,_,w,d,x)|w+d+x==200));
    // one vote can never draw.
    assert_eq!(0,first[0].3);
}

#[test]
fn a_bad_batch_does_not_stop_the_others() {
    let config = ExperimentConfig::new(Mode::Fixed,10,InclusiveRange::new(1,2),InclusiveRange::single(3));
    let random = RandomService::new(RandomPolicy::Unlogged,Some(1));
    let reports = run_experiment(&config,&random,|_|{}).unwrap();
    assert_eq!(2,reports.len());
    assert!(matches!(reports[0].result,Err(ExperimentError::Generation{num_options:1,source:GenerationError::NumberOfOptions(1),..})));
    assert_eq!(10,reports[1].result.as_ref().unwrap().trials);
}

#[test]
fn logged_random_records_every_roll() {
    let config = ExperimentConfig::new(Mode::Fixed,5,InclusiveRange::single(2),InclusiveRange::single(3));
    let random = RandomService::new(RandomPolicy::Logged,Some(8));
    run_experiment(&config,&random,|_|{}).unwrap();
    let history = random.history();
    // every vote is a roll over the 100 slot table.
    assert_eq!(15,history[&100].total_weighted());
    assert!(history[&100].values().all(|&slot|slot<100));
    // every attempt to generate 2 options rolls the first share out of 0..=100.
    assert!(history[&101].total_weighted()>=5);
}

#[test]
fn drawn_answers_follow_the_distribution() {
    let random = RandomService::new(RandomPolicy::Unlogged,Some(2024));
    let (drawer,report) = run_fairness_check(&GenerationRequest::new(4,10,60),100_000,&random).unwrap();
    assert_eq!(4,report.options.len());
    assert_eq!(OptionIndex(0),report.options[0].option);
    assert_eq!(drawer.distribution().percentages(),report.options.iter().map(|o|o.expected).collect::<Vec<_>>().as_slice());
    assert!(report.worst_deviation()<1.0,"deviation {}",report.worst_deviation());
    assert!(matches!(run_fairness_check(&GenerationRequest::new(4,10,60),0,&random),Err(ExperimentError::NoDraws)));
}
