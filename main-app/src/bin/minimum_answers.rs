// Copyright 2026 The MinimumAnswers developers.
// This file is part of MinimumAnswers.
// MinimumAnswers is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// MinimumAnswers is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with MinimumAnswers.  If not, see <https://www.gnu.org/licenses/>.


use clap::{Parser, Subcommand};
use main_app::{format_batch, format_fairness, format_history, init_logging, OutputFormat};
use plurality::distribution::GenerationRequest;
use plurality::experiment::{run_experiment, ExperimentConfig, InclusiveRange, Mode, DEFAULT_POOL_SIZE};
use plurality::fairness::run_fairness_check;
use plurality::random_source::{RandomPolicy, RandomService};
use tracing::error;

#[derive(Parser)]
#[command(version = "0.1", name="minimum_answers")]
/// Estimate how many answers are needed before plurality voting over them can be trusted,
/// by simulating voters drawn from random distributions of answers.
///
/// Ranges may be given as 3..=6, 3..7, 3-6 or just 3.
struct Opts {
    /// The number of threads to run batches on.
    #[arg(long, global = true, default_value_t = DEFAULT_POOL_SIZE)]
    threads : usize,

    /// Share one random number generator between all threads and record every roll, printing a summary at the end.
    /// Much slower.
    #[arg(long, global = true)]
    logged_random : bool,

    /// Seed the random number generators, for reproducible runs.
    #[arg(long, global = true)]
    seed : Option<u64>,

    /// Keep a histogram of the difficulties generated in each batch and print it after the batch.
    #[arg(long, global = true)]
    measure_difficulties : bool,

    /// Print one JSON object per line rather than tab separated values.
    #[arg(long, global = true)]
    json : bool,

    /// Log in more detail to stderr.
    #[arg(short, long, global = true)]
    verbose : bool,

    #[command(subcommand)]
    command : Command,
}

#[derive(Subcommand)]
enum Command {
    /// A fixed number of votes per trial. Prints options, votes, win % and draw %.
    Fixed {
        #[arg(long, default_value = "3")]
        options : InclusiveRange,
        #[arg(long, default_value = "33")]
        votes : InclusiveRange,
        #[arg(long, default_value_t = 100_000)]
        iterations : usize,
    },
    /// Like fixed, but trials cycle evenly through every achievable difficulty.
    Controlled {
        #[arg(long, default_value = "2")]
        options : InclusiveRange,
        #[arg(long, default_value = "1..=50")]
        votes : InclusiveRange,
        #[arg(long, default_value_t = 100_000)]
        iterations : usize,
    },
    /// Collect votes until the leader is far enough ahead. Prints options, threshold, average votes used and win %.
    Adaptive {
        #[arg(long, default_value = "6")]
        options : InclusiveRange,
        /// The margin the leader needs over the runner up.
        #[arg(long, default_value = "24")]
        threshold : InclusiveRange,
        #[arg(long, default_value_t = 1_000_000)]
        iterations : usize,
        /// Skip trials that have used this many votes without reaching the threshold.
        #[arg(long)]
        max_votes : Option<usize>,
    },
    /// Check that simulated voters answer according to their distribution.
    Fairness {
        #[arg(long, default_value_t = 3)]
        options : usize,
        #[arg(long, default_value_t = 1)]
        min_diff : u32,
        #[arg(long, default_value_t = 100)]
        max_diff : u32,
        #[arg(long, default_value_t = 10_000_000)]
        draws : usize,
    },
}

fn main() -> anyhow::Result<()> {
    let opt : Opts = Opts::parse();
    init_logging(opt.verbose);
    let format = OutputFormat::new(opt.json);
    let policy = if opt.logged_random { RandomPolicy::Logged } else { RandomPolicy::Unlogged };
    let random = RandomService::new(policy,opt.seed);

    let config = match opt.command {
        Command::Fixed{options,votes,iterations} => ExperimentConfig::new(Mode::Fixed,iterations,options,votes),
        Command::Controlled{options,votes,iterations} => ExperimentConfig::new(Mode::ControlledDifficulty,iterations,options,votes),
        Command::Adaptive{options,threshold,iterations,max_votes} => ExperimentConfig{max_votes,..ExperimentConfig::new(Mode::Adaptive,iterations,options,threshold)},
        Command::Fairness{options,min_diff,max_diff,draws} => {
            let (drawer,report) = run_fairness_check(&GenerationRequest::new(options,min_diff,max_diff),draws,&random)?;
            println!("{}",format_fairness(&drawer,&report,format)?);
            print_history(&random,format)?;
            return Ok(());
        }
    };
    let config = ExperimentConfig{measure_difficulties:opt.measure_difficulties,pool_size:opt.threads,..config};

    run_experiment(&config,&random,|report|{
        match format_batch(report,format) {
            Ok(Some(text)) => println!("{}",text),
            Ok(None) => {}
            Err(e) => error!(error=%e,"Could not format result"),
        }
    })?;
    print_history(&random,format)?;
    Ok(())
}

/// Only the logged policy has a history.
fn print_history(random:&RandomService,format:OutputFormat) -> anyhow::Result<()> {
    if random.policy()==RandomPolicy::Logged {
        println!("{}",format_history(&random.history(),format)?);
    }
    Ok(())
}
