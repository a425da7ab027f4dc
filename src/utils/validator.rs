use fixedbitset::FixedBitSet;

use crate::problem::dth::DTHInstance;
use crate::problem::{LocationId, Num};
use crate::solution::{Cost, Solution};

#[derive(Debug)]
pub enum Violation {
    EmptyTour,
    TourStart { found: LocationId },
    TourNotClosed { last: LocationId },
    MissingRoad { from: LocationId, to: LocationId },
    DropoffOffTour { location: LocationId },
    NotAHome { location: LocationId },
    HomeServedTwice { home: LocationId },
    HomeNotServed { home: LocationId },
    UnreachableWalk { from: LocationId, to: LocationId },
}

#[derive(Debug)]
pub enum ValidatorResult {
    Valid(Cost),
    ConstraintViolation(Violation),
}

impl ValidatorResult {
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Valid(_) => true,
            _ => false,
        }
    }

    pub fn cost(&self) -> Option<&Cost> {
        match self {
            Self::Valid(cost) => Some(cost),
            _ => None,
        }
    }

    pub fn assert_valid(&self) {
        match self {
            Self::Valid(_) => {}
            Self::ConstraintViolation(violation) => {
                assert!(false, "{:?}", violation)
            }
        }
    }
}

/// Checks a solution against its instance and scores it.
///
/// The tour must be a closed walk at the start location (a single-element
/// tour means the car stays parked); every leg must be an existing road;
/// drop-offs must happen on the tour; the groups must serve every home
/// exactly once. Revisiting locations on the tour is allowed.
pub fn validate_solution(instance: &DTHInstance, solution: &Solution) -> ValidatorResult {
    use ValidatorResult::*;
    use Violation::*;

    if solution.tour.is_empty() {
        return ConstraintViolation(EmptyTour);
    }
    if solution.tour[0] != instance.start {
        return ConstraintViolation(TourStart {
            found: solution.tour[0],
        });
    }
    let last = *solution.tour.last().unwrap();
    if solution.tour.len() > 1 && last != instance.start {
        return ConstraintViolation(TourNotClosed { last });
    }

    let mut driving = Num::ZERO;
    let mut visited = FixedBitSet::with_capacity(instance.num_locations());
    visited.insert(solution.tour[0]);
    for leg in solution.tour.windows(2) {
        let (from, to) = (leg[0], leg[1]);
        match instance.distance(from, to) {
            Some(weight) => driving += weight,
            None => return ConstraintViolation(MissingRoad { from, to }),
        }
        visited.insert(to);
    }

    let mut walking = Num::ZERO;
    let mut served = FixedBitSet::with_capacity(instance.num_locations());
    for group in &solution.dropoffs {
        if !visited.contains(group.location) {
            return ConstraintViolation(DropoffOffTour {
                location: group.location,
            });
        }
        for &home in &group.homes {
            if !instance.is_home(home) {
                return ConstraintViolation(NotAHome { location: home });
            }
            if served.contains(home) {
                return ConstraintViolation(HomeServedTwice { home });
            }
            served.insert(home);
            match instance.walk_distance(group.location, home) {
                Some(dist) => walking += dist,
                None => {
                    return ConstraintViolation(UnreachableWalk {
                        from: group.location,
                        to: home,
                    })
                }
            }
        }
    }
    for home in instance.iter_homes() {
        if !served.contains(home) {
            return ConstraintViolation(HomeNotServed { home });
        }
    }

    Valid(Cost { driving, walking })
}

pub fn assert_valid_solution(instance: &DTHInstance, solution: &Solution) {
    validate_solution(instance, solution).assert_valid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::adjacency::AdjacencyMatrixBuilder;
    use crate::problem::dth::create_instance_with;
    use crate::solution::DropoffGroup;

    /// Line graph a-b-c with unit weights, home at c, start at a.
    fn line_instance() -> DTHInstance {
        let mut builder = AdjacencyMatrixBuilder::with_num_locations(3);
        builder.set_edge(0, 1, Num::ONE);
        builder.set_edge(1, 2, Num::ONE);
        create_instance_with(
            "line".into(),
            vec!["a".into(), "b".into(), "c".into()],
            &["c".into()],
            "a",
            builder.build(),
        )
        .unwrap()
    }

    fn group(location: LocationId, homes: &[LocationId]) -> DropoffGroup {
        DropoffGroup {
            location,
            homes: homes.to_vec(),
        }
    }

    #[test]
    fn scores_a_full_drive() {
        let instance = line_instance();
        let solution = Solution::new(vec![0, 1, 2, 1, 0], vec![group(2, &[2])]);
        match validate_solution(&instance, &solution) {
            ValidatorResult::Valid(cost) => {
                assert_eq!(cost.driving, Num::from(4));
                assert_eq!(cost.walking, Num::ZERO);
            }
            other => panic!("expected valid, got {:?}", other),
        }
    }

    #[test]
    fn scores_a_parked_car() {
        let instance = line_instance();
        let solution = Solution::new(vec![0], vec![group(0, &[2])]);
        match validate_solution(&instance, &solution) {
            ValidatorResult::Valid(cost) => {
                assert_eq!(cost.driving, Num::ZERO);
                assert_eq!(cost.walking, Num::from(2));
            }
            other => panic!("expected valid, got {:?}", other),
        }
    }

    #[test]
    fn rejects_wrong_start() {
        let instance = line_instance();
        let solution = Solution::new(vec![1, 0, 1], vec![group(1, &[2])]);
        assert!(matches!(
            validate_solution(&instance, &solution),
            ValidatorResult::ConstraintViolation(Violation::TourStart { found: 1 })
        ));
    }

    #[test]
    fn rejects_open_tours() {
        let instance = line_instance();
        let solution = Solution::new(vec![0, 1], vec![group(1, &[2])]);
        assert!(matches!(
            validate_solution(&instance, &solution),
            ValidatorResult::ConstraintViolation(Violation::TourNotClosed { last: 1 })
        ));
    }

    #[test]
    fn rejects_legs_without_roads() {
        let instance = line_instance();
        let solution = Solution::new(vec![0, 2, 0], vec![group(2, &[2])]);
        assert!(matches!(
            validate_solution(&instance, &solution),
            ValidatorResult::ConstraintViolation(Violation::MissingRoad { from: 0, to: 2 })
        ));
    }

    #[test]
    fn rejects_dropoffs_off_the_tour() {
        let instance = line_instance();
        let solution = Solution::new(vec![0], vec![group(1, &[2])]);
        assert!(matches!(
            validate_solution(&instance, &solution),
            ValidatorResult::ConstraintViolation(Violation::DropoffOffTour { location: 1 })
        ));
    }

    #[test]
    fn rejects_broken_home_partitions() {
        let instance = line_instance();

        let unserved = Solution::new(vec![0], vec![]);
        assert!(matches!(
            validate_solution(&instance, &unserved),
            ValidatorResult::ConstraintViolation(Violation::HomeNotServed { home: 2 })
        ));

        let twice = Solution::new(vec![0], vec![group(0, &[2]), group(0, &[2])]);
        assert!(matches!(
            validate_solution(&instance, &twice),
            ValidatorResult::ConstraintViolation(Violation::HomeServedTwice { home: 2 })
        ));

        let not_a_home = Solution::new(vec![0], vec![group(0, &[1, 2])]);
        assert!(matches!(
            validate_solution(&instance, &not_a_home),
            ValidatorResult::ConstraintViolation(Violation::NotAHome { location: 1 })
        ));
    }

    #[test]
    fn accepts_tours_that_revisit_locations() {
        let instance = line_instance();
        let solution = Solution::new(vec![0, 1, 0, 1, 2, 1, 0], vec![group(2, &[2])]);
        assert_valid_solution(&instance, &solution);
    }
}
