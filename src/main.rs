#![allow(dead_code)]

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use log::{error, info};
use rand::random;
use took::Timer;

use crate::cli::{Command, GenerateArguments, ProgramArguments, SolveArguments, ValidateArguments};
use crate::generator::{generate_instance, GeneratorParams};
use crate::io::instance_file::write_instance;
use crate::io::solution_file::{load_solution_file, write_solution_file, SolutionFile};
use crate::io::{
    commit_paths, input_files_in_dir, input_to_output, load_instance, write_summary,
    InstanceReport, RunSummary,
};
use crate::solution::Cost;
use crate::solver::SolverResult;
use crate::utils::validator::{validate_solution, ValidatorResult};
use crate::utils::{create_seeded_rng, BatchProgressTracker, DefaultBatchTracker};

mod cli;
mod generator;
mod io;
mod problem;
mod solution;
mod solver;
mod utils;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = argfile::expand_args_from(
        std::env::args_os(),
        argfile::parse_fromfile,
        argfile::PREFIX,
    )?;
    let args = ProgramArguments::parse_from(args);
    info!("{:?}", &args);

    match args.command {
        Command::Solve(args) => solve(&args),
        Command::Generate(args) => generate(&args),
        Command::Validate(args) => validate(&args),
    }
}

fn solve(args: &SolveArguments) -> anyhow::Result<()> {
    let output_dir = Path::new(&args.output_directory);
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("cannot create output directory '{}'", output_dir.display()))?;
    let inputs = if args.all {
        input_files_in_dir(&args.input)?
    } else {
        vec![PathBuf::from(&args.input)]
    };
    if inputs.is_empty() {
        bail!("no .in files found in '{}'", args.input);
    }

    let mut summary = RunSummary::default();
    let mut written = Vec::new();
    let mut tracker = DefaultBatchTracker::new(inputs.len() as u64);
    for input in &inputs {
        tracker.update(&input.display().to_string());
        let timer = Timer::new();
        match solve_single(input, output_dir, args) {
            Ok((output, result)) => {
                summary.push(InstanceReport::solved(
                    input,
                    &output,
                    &result.cost,
                    timer.took().as_std().as_secs_f64(),
                ));
                written.push(output);
            }
            Err(err) => {
                // only batch runs survive a bad instance, a single run fails
                if !args.all {
                    return Err(err.context(format!("cannot solve '{}'", input.display())));
                }
                error!("failed to solve '{}': {:#}", input.display(), err);
                summary.push(InstanceReport::failed(
                    input,
                    &err,
                    timer.took().as_std().as_secs_f64(),
                ));
            }
        }
        tracker.inc();
    }
    drop(tracker);

    info!(
        "{} solved, {} failed",
        summary.num_solved(),
        summary.num_failed()
    );

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &summary)?;
    }
    if args.commit {
        commit_paths(&written, "add solutions")?;
    }
    Ok(())
}

fn solve_single(
    input: &Path,
    output_dir: &Path,
    args: &SolveArguments,
) -> anyhow::Result<(PathBuf, SolverResult)> {
    let load_timer = Timer::new();
    let instance = load_instance(input.display().to_string())?;
    instance.validate()?;
    info!(
        "instance '{}' loaded after {}",
        instance.name,
        load_timer.took()
    );

    info!("starting solver");
    let result = solver::solve(&instance, &args.solver)?;
    info!("finished after {}", result.time);

    let output = input_to_output(input, output_dir);
    write_solution_file(
        &output,
        &SolutionFile::from_solution(&result.solution, &instance),
    )?;
    Ok((output, result))
}

fn generate(args: &GenerateArguments) -> anyhow::Result<()> {
    let seed_value = args.seed.unwrap_or_else(|| random::<i128>().abs());
    info!("seed: {}", seed_value);
    let mut rng = create_seeded_rng(seed_value);

    let params = GeneratorParams {
        num_locations: args.locations,
        num_homes: args.tas,
        max_attempts: args.max_attempts,
    };
    let instance = generate_instance(&params, &mut rng)?;

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| format!("{}.in", args.locations));
    write_instance(&out, &instance)?;
    info!(
        "wrote '{}' with {} locations and {} homes",
        out,
        instance.num_locations(),
        instance.num_homes()
    );
    Ok(())
}

fn validate(args: &ValidateArguments) -> anyhow::Result<()> {
    let pairs: Vec<(PathBuf, PathBuf)> = if args.all {
        let output_dir = Path::new(&args.output);
        input_files_in_dir(&args.input)?
            .into_iter()
            .map(|input| {
                let output = input_to_output(&input, output_dir);
                (input, output)
            })
            .collect()
    } else {
        vec![(PathBuf::from(&args.input), PathBuf::from(&args.output))]
    };
    if pairs.is_empty() {
        bail!("no .in files found in '{}'", args.input);
    }

    let mut num_invalid = 0;
    for (input, output) in &pairs {
        match validate_pair(input, output) {
            Ok(cost) => println!("{}: valid, cost {}", output.display(), cost),
            Err(err) => {
                num_invalid += 1;
                println!("{}: {:#}", output.display(), err);
            }
        }
    }
    if num_invalid > 0 {
        bail!(
            "{} of {} solution file(s) failed validation",
            num_invalid,
            pairs.len()
        );
    }
    Ok(())
}

fn validate_pair(input: &Path, output: &Path) -> anyhow::Result<Cost> {
    let instance = load_instance(input.display().to_string())?;
    instance.validate()?;
    let solution = load_solution_file(output.display().to_string())?.resolve(&instance)?;
    match validate_solution(&instance, &solution) {
        ValidatorResult::Valid(cost) => Ok(cost),
        ValidatorResult::ConstraintViolation(violation) => {
            bail!("constraint violated: {:?}", violation)
        }
    }
}
