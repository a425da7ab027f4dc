#[cfg(feature = "use-grb")]
use anyhow::bail;
#[cfg(feature = "use-grb")]
use log::{info, warn};
#[cfg(feature = "use-grb")]
use took::Timer;
use took::Took;

use crate::cli::SolverArguments;
use crate::problem::dth::DTHInstance;
use crate::solution::{Cost, Solution};
#[cfg(feature = "use-grb")]
use crate::utils::logging::format_log_solution_timed;
#[cfg(feature = "use-grb")]
use crate::utils::validator::{validate_solution, ValidatorResult};

#[cfg(feature = "use-grb")]
pub mod mip;

pub struct SolverResult {
    pub solution: Solution,
    pub cost: Cost,
    pub time: Took,
}

#[cfg(not(feature = "use-grb"))]
pub fn solve(_instance: &DTHInstance, _args: &SolverArguments) -> anyhow::Result<SolverResult> {
    Err(anyhow::Error::msg(
        "this executable was built without gurobi support -- recompile with 'use-grb' to enable.",
    ))
}

#[cfg(feature = "use-grb")]
pub fn solve(instance: &DTHInstance, args: &SolverArguments) -> anyhow::Result<SolverResult> {
    let timer = Timer::new();
    let (solution, model_objective) = mip::solve_with_mip(instance, args)?;

    // the model's arithmetic is floating point; the validator recomputes the
    // cost exactly and is authoritative
    let cost = match validate_solution(instance, &solution) {
        ValidatorResult::Valid(cost) => cost,
        ValidatorResult::ConstraintViolation(violation) => {
            bail!("solver produced an invalid solution: {:?}", violation)
        }
    };
    if (cost.total() - model_objective).abs() > 1e-4 {
        warn!(
            "model objective {} differs from recomputed cost {}",
            model_objective,
            cost.total()
        );
    }

    info!(
        "{}",
        format_log_solution_timed(&solution, &cost, timer.took())
    );
    Ok(SolverResult {
        solution,
        cost,
        time: timer.took(),
    })
}
