use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use grb::expr::{GurobiSum, LinExpr};
use log::debug;

use crate::cli::SolverArguments;
use crate::problem::dth::DTHInstance;
use crate::problem::Num;
use crate::solution::{DropoffGroup, Solution};

/// Objective weight per unit of driving distance; walking counts in full.
const DRIVING_WEIGHT: f64 = 2.0 / 3.0;
/// Binary variables at least this large count as selected.
const SELECTION_THRESHOLD: f64 = 0.99;

/// Builds and optimizes the routing model for `instance`.
///
/// One binary per directed road decides whether the car drives it, one binary
/// per (home, location) pair decides where each TA leaves the car, and a
/// continuous order variable per non-start location rules out cycles that
/// bypass the start (Miller-Tucker-Zemlin). Returns the extracted solution
/// together with the model objective.
pub fn solve_with_mip(
    instance: &DTHInstance,
    args: &SolverArguments,
) -> Result<(Solution, f64)> {
    let n = instance.num_locations();
    let start = instance.start;

    let mut env = grb::Env::empty()?;
    env.set(
        grb::parameter::IntParam::OutputFlag,
        args.solver_stdout_logging.into(),
    )?;
    let env = env.start()?;

    let mut model = grb::Model::with_env("dth", &env)?;
    model.set_param(
        grb::parameter::DoubleParam::TimeLimit,
        args.time_limit_in_seconds as f64,
    )?;
    if let Some(threads) = args.threads {
        model.set_param(grb::parameter::IntParam::Threads, threads)?;
    }

    let arcs: Vec<(usize, usize, Num)> = instance.adjacency().edges().collect();

    let mut x = Vec::with_capacity(arcs.len());
    let mut outgoing: Vec<Vec<grb::Var>> = vec![Vec::new(); n];
    let mut incoming: Vec<Vec<grb::Var>> = vec![Vec::new(); n];
    for &(from, to, weight) in &arcs {
        let var_obj = DRIVING_WEIGHT * f64::from(weight);
        let var = grb::add_intvar!(model,
            name: format!("x_{}_{}", from, to).as_str(),
            obj: var_obj,
            bounds: 0..1)?;
        outgoing[from].push(var);
        incoming[to].push(var);
        x.push(var);
    }

    let mut dropoff = Vec::with_capacity(instance.num_homes());
    for home in instance.iter_homes() {
        let mut vars = Vec::with_capacity(n);
        for v in 0..n {
            let walk = instance.walk_distance(v, home).with_context(|| {
                format!(
                    "no walking route from '{}' to '{}'",
                    instance.location_name(v),
                    instance.location_name(home)
                )
            })?;
            let var_obj = f64::from(walk);
            let var = grb::add_intvar!(model,
                name: format!("d_{}_{}", home, v).as_str(),
                obj: var_obj,
                bounds: 0..1)?;
            vars.push(var);
        }
        dropoff.push(vars);
    }

    // every TA leaves the car exactly once
    for (k, home) in instance.iter_homes().enumerate() {
        model.add_constr(
            format!("serve_{}", home).as_str(),
            grb::c!(dropoff[k].clone().grb_sum() == 1),
        )?;
    }

    // leaving the car anywhere but the start requires the car to drive there
    for (k, home) in instance.iter_homes().enumerate() {
        for v in 0..n {
            if v == start {
                continue;
            }
            model.add_constr(
                format!("link_{}_{}", home, v).as_str(),
                grb::c!(dropoff[k][v] <= incoming[v].clone().grb_sum()),
            )?;
        }
    }

    // the car leaves every location it enters, and enters each at most once
    for v in 0..n {
        model.add_constr(
            format!("flow_{}", v).as_str(),
            grb::c!(incoming[v].clone().grb_sum() == outgoing[v].clone().grb_sum()),
        )?;
        model.add_constr(
            format!("visit_{}", v).as_str(),
            grb::c!(incoming[v].clone().grb_sum() <= 1),
        )?;
    }

    let mut order: Vec<Option<grb::Var>> = vec![None; n];
    for v in 0..n {
        if v == start {
            continue;
        }
        let var = model.add_var(
            format!("u_{}", v).as_str(),
            grb::VarType::Continuous,
            0.0,
            0.0,
            (n - 1) as f64,
            std::iter::empty(),
        )?;
        order[v] = Some(var);
    }
    // selected arcs away from the start must increase the order, so every
    // cycle has to pass through the start
    let mtz_bound = (n - 1) as f64;
    for (i, &(from, to, _)) in arcs.iter().enumerate() {
        if from == start || to == start {
            continue;
        }
        if let (Some(u_from), Some(u_to)) = (order[from], order[to]) {
            let mut expr = LinExpr::new();
            expr.add_term(1.0, u_from);
            expr.add_term(-1.0, u_to);
            expr.add_term(n as f64, x[i]);
            model.add_constr(
                format!("mtz_{}_{}", from, to).as_str(),
                grb::c!(expr <= mtz_bound),
            )?;
        }
    }

    model.set_attr(grb::attr::ModelSense, grb::ModelSense::Minimize)?;
    model.optimize()?;

    if model.get_attr(grb::attr::SolCount)? == 0 {
        bail!("No solutions found (Status: {:?})", model.status()?);
    }
    let objective = model.get_attr(grb::attr::ObjVal)?;
    debug!(
        "model finished with objective {} (bound {})",
        objective,
        model.get_attr(grb::attr::ObjBound)?
    );

    let mut successor: Vec<Option<usize>> = vec![None; n];
    let mut num_selected = 0;
    for (i, &(from, to, _)) in arcs.iter().enumerate() {
        if model.get_obj_attr(grb::attr::X, &x[i])? > SELECTION_THRESHOLD {
            if let Some(other) = successor[from] {
                bail!(
                    "two selected roads leave '{}' (to '{}' and to '{}')",
                    instance.location_name(from),
                    instance.location_name(other),
                    instance.location_name(to)
                );
            }
            successor[from] = Some(to);
            num_selected += 1;
        }
    }
    let tour = extract_tour(instance, start, &successor, num_selected)?;

    let mut groups: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (k, home) in instance.iter_homes().enumerate() {
        let mut location = None;
        for v in 0..n {
            if model.get_obj_attr(grb::attr::X, &dropoff[k][v])? > SELECTION_THRESHOLD {
                location = Some(v);
                break;
            }
        }
        match location {
            Some(v) => groups.entry(v).or_default().push(home),
            None => bail!(
                "no drop-off selected for home '{}'",
                instance.location_name(home)
            ),
        }
    }
    let dropoffs = groups
        .into_iter()
        .map(|(location, homes)| DropoffGroup { location, homes })
        .collect();

    Ok((Solution::new(tour, dropoffs), objective))
}

/// Follows the selected roads from the start until they close. Errors if they
/// dead-end or leave legs over, which would mean a second, disjoint cycle.
fn extract_tour(
    instance: &DTHInstance,
    start: usize,
    successor: &[Option<usize>],
    num_selected: usize,
) -> Result<Vec<usize>> {
    let mut tour = vec![start];
    let mut current = start;
    let mut steps = 0;
    while let Some(next) = successor[current] {
        steps += 1;
        tour.push(next);
        current = next;
        if current == start {
            break;
        }
        if steps > num_selected {
            bail!(
                "selected roads do not return to '{}'",
                instance.location_name(start)
            );
        }
    }
    if steps != num_selected {
        bail!(
            "{} roads selected but the tour through '{}' uses {}",
            num_selected,
            instance.location_name(start),
            steps
        );
    }
    Ok(tour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::adjacency::AdjacencyMatrixBuilder;
    use crate::problem::dth::create_instance_with;
    use crate::utils::validator::assert_valid_solution;

    fn args() -> SolverArguments {
        SolverArguments {
            time_limit_in_seconds: 60,
            threads: Some(1),
            solver_stdout_logging: false,
        }
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|it| it.to_string()).collect()
    }

    #[test]
    fn prefers_walking_when_driving_is_wasted() -> Result<()> {
        // a - b - c with the only home at c: driving there and back costs
        // (2/3) * 4, walking costs 2
        let mut builder = AdjacencyMatrixBuilder::with_num_locations(3);
        builder.set_edge(0, 1, Num::ONE);
        builder.set_edge(1, 2, Num::ONE);
        let instance = create_instance_with(
            "line".into(),
            names(&["a", "b", "c"]),
            &names(&["c"]),
            "a",
            builder.build(),
        )?;

        let (solution, objective) = solve_with_mip(&instance, &args())?;
        assert_valid_solution(&instance, &solution);
        assert_eq!(solution.tour, vec![0]);
        assert_eq!(
            solution.dropoffs,
            vec![DropoffGroup {
                location: 0,
                homes: vec![2],
            }]
        );
        assert!((objective - 2.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn drives_a_cycle_that_serves_every_home() -> Result<()> {
        // unit square with homes at b, c and d: the full cycle costs
        // (2/3) * 4, every parking alternative costs more
        let mut builder = AdjacencyMatrixBuilder::with_num_locations(4);
        builder.set_edge(0, 1, Num::ONE);
        builder.set_edge(1, 2, Num::ONE);
        builder.set_edge(2, 3, Num::ONE);
        builder.set_edge(3, 0, Num::ONE);
        let instance = create_instance_with(
            "square".into(),
            names(&["a", "b", "c", "d"]),
            &names(&["b", "c", "d"]),
            "a",
            builder.build(),
        )?;

        let (solution, objective) = solve_with_mip(&instance, &args())?;
        assert_valid_solution(&instance, &solution);
        assert_eq!(solution.tour.len(), 5);
        assert_eq!(solution.tour.first(), Some(&0));
        assert_eq!(solution.tour.last(), Some(&0));
        assert_eq!(
            solution.dropoffs,
            vec![
                DropoffGroup {
                    location: 1,
                    homes: vec![1],
                },
                DropoffGroup {
                    location: 2,
                    homes: vec![2],
                },
                DropoffGroup {
                    location: 3,
                    homes: vec![3],
                },
            ]
        );
        assert!((objective - 8.0 / 3.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn allows_short_loops_when_the_start_is_the_last_index() -> Result<()> {
        // start sits at index 2: driving a - b - a and letting both TAs walk
        // from b costs (2/3) * 2 + 1, parking costs 3
        let mut builder = AdjacencyMatrixBuilder::with_num_locations(3);
        builder.set_edge(2, 1, Num::ONE);
        builder.set_edge(1, 0, Num::ONE);
        let instance = create_instance_with(
            "reversed".into(),
            names(&["c", "b", "a"]),
            &names(&["b", "c"]),
            "a",
            builder.build(),
        )?;

        let (solution, objective) = solve_with_mip(&instance, &args())?;
        assert_valid_solution(&instance, &solution);
        assert_eq!(solution.tour, vec![2, 1, 2]);
        assert_eq!(solution.dropoffs.len(), 1);
        assert_eq!(solution.dropoffs[0].location, 1);
        let mut homes = solution.dropoffs[0].homes.clone();
        homes.sort_unstable();
        assert_eq!(homes, vec![0, 1]);
        assert!((objective - 7.0 / 3.0).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn a_lone_start_yields_an_empty_tour() -> Result<()> {
        let builder = AdjacencyMatrixBuilder::with_num_locations(1);
        let instance =
            create_instance_with("lone".into(), names(&["a"]), &[], "a", builder.build())?;

        let (solution, objective) = solve_with_mip(&instance, &args())?;
        assert_valid_solution(&instance, &solution);
        assert_eq!(solution.tour, vec![0]);
        assert!(solution.dropoffs.is_empty());
        assert!(objective.abs() < 1e-9);
        Ok(())
    }
}
