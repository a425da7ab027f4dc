use anyhow::{bail, Result};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::problem::adjacency::AdjacencyMatrixBuilder;
use crate::problem::dth::{create_instance_with, DTHInstance, MAX_LOCATIONS};
use crate::problem::Num;
use crate::utils::Random;

pub const EDGE_PROBABILITY: f64 = 0.25;
pub const DEFAULT_MAX_ATTEMPTS: usize = 100;

pub struct GeneratorParams {
    pub num_locations: usize,
    pub num_homes: usize,
    pub max_attempts: usize,
}

/// Generates a random instance that passes `DTHInstance::validate`.
///
/// Locations are points in the unit square with numeric names in shuffled
/// order; each unordered pair gets a road with probability 1/4, weighted by
/// the Euclidean distance rounded to five places. A sparse sample can come
/// out disconnected, and rounding can break the metric property on nearly
/// collinear triples, so candidates are validated and redrawn until one
/// conforms or `max_attempts` is exhausted.
pub fn generate_instance(params: &GeneratorParams, rng: &mut Random) -> Result<DTHInstance> {
    if params.num_locations == 0 {
        bail!("need at least one location");
    }
    if params.num_locations > MAX_LOCATIONS {
        bail!(
            "cannot generate {} locations, the format allows at most {}",
            params.num_locations,
            MAX_LOCATIONS
        );
    }
    if params.num_homes > params.num_locations {
        bail!(
            "cannot place {} homes among {} locations",
            params.num_homes,
            params.num_locations
        );
    }
    for attempt in 1..=params.max_attempts.max(1) {
        let candidate = random_instance(params, rng)?;
        match candidate.validate() {
            Ok(()) => {
                debug!("accepted candidate on attempt {}", attempt);
                return Ok(candidate);
            }
            Err(reason) => debug!("rejected candidate {}: {:#}", attempt, reason),
        }
    }
    bail!(
        "no valid instance with {} locations after {} attempts",
        params.num_locations,
        params.max_attempts
    )
}

fn random_instance(params: &GeneratorParams, rng: &mut Random) -> Result<DTHInstance> {
    let n = params.num_locations;

    let mut names: Vec<String> = (0..n).map(|i| i.to_string()).collect();
    names.shuffle(rng);

    let points: Vec<(f64, f64)> = (0..n).map(|_| (rng.gen::<f64>(), rng.gen::<f64>())).collect();

    let home_names: Vec<String> = rand::seq::index::sample(rng, n, params.num_homes)
        .iter()
        .map(|i| names[i].clone())
        .collect();
    let start_name = names[rng.gen_range(0..n)].clone();

    let mut builder = AdjacencyMatrixBuilder::with_num_locations(n);
    for i in 0..n {
        for j in (i + 1)..n {
            if rng.gen_bool(EDGE_PROBABILITY) {
                let (xi, yi) = points[i];
                let (xj, yj) = points[j];
                let dist = ((xi - xj).powi(2) + (yi - yj).powi(2)).sqrt();
                builder.set_edge(i, j, Num::from(dist));
            }
        }
    }

    create_instance_with(n.to_string(), names, &home_names, &start_name, builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::instance_file::write_instance_to;
    use crate::utils::create_seeded_rng;

    fn params(num_locations: usize, num_homes: usize) -> GeneratorParams {
        GeneratorParams {
            num_locations,
            num_homes,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    #[test]
    fn generated_instances_conform() -> Result<()> {
        let mut rng = create_seeded_rng(7);
        let instance = generate_instance(&params(30, 10), &mut rng)?;
        assert_eq!(instance.num_locations(), 30);
        assert_eq!(instance.num_homes(), 10);
        instance.validate()?;

        let mut sorted = instance.location_names.clone();
        sorted.sort();
        let mut expected: Vec<String> = (0..30).map(|i| i.to_string()).collect();
        expected.sort();
        assert_eq!(sorted, expected);
        Ok(())
    }

    #[test]
    fn generation_is_deterministic_per_seed() -> Result<()> {
        let a = generate_instance(&params(20, 5), &mut create_seeded_rng(99))?;
        let b = generate_instance(&params(20, 5), &mut create_seeded_rng(99))?;
        let (mut buf_a, mut buf_b) = (Vec::new(), Vec::new());
        write_instance_to(&mut buf_a, &a)?;
        write_instance_to(&mut buf_b, &b)?;
        assert_eq!(buf_a, buf_b);
        Ok(())
    }

    #[test]
    fn a_single_location_works() -> Result<()> {
        let mut rng = create_seeded_rng(1);
        let instance = generate_instance(&params(1, 0), &mut rng)?;
        assert_eq!(instance.num_locations(), 1);
        instance.validate()
    }

    #[test]
    fn rejects_more_homes_than_locations() {
        let mut rng = create_seeded_rng(1);
        assert!(generate_instance(&params(3, 4), &mut rng).is_err());
    }

    #[test]
    fn rejects_more_locations_than_the_format_allows() {
        let mut rng = create_seeded_rng(1);
        let err = generate_instance(&params(MAX_LOCATIONS + 1, 10), &mut rng).unwrap_err();
        assert!(err.to_string().contains("at most"), "{}", err);
    }
}
