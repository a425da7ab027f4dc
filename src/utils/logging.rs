use took::Took;

use crate::solution::{Cost, Solution};

pub fn format_log_solution_timed(sol: &Solution, cost: &Cost, took: Took) -> String {
    format!("{}, took: {took}", format_log_solution(sol, cost))
}

pub fn format_log_solution(sol: &Solution, cost: &Cost) -> String {
    format!(
        "{} legs, {} drop-offs, cost {}",
        sol.number_of_legs(),
        sol.number_of_dropoff_groups(),
        cost,
    )
}
