use std::fmt::{Display, Formatter};

use crate::problem::{LocationId, Num};

/// TAs dropped off at one location of the tour. Each TA then walks the
/// shortest route from `location` to their home.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropoffGroup {
    pub location: LocationId,
    pub homes: Vec<LocationId>,
}

/// The car's closed tour plus the drop-off assignment.
///
/// The tour either is the single start location (car stays parked) or starts
/// and ends at the start location with every consecutive pair an existing
/// road.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    pub tour: Vec<LocationId>,
    pub dropoffs: Vec<DropoffGroup>,
}

impl Solution {
    pub fn new(tour: Vec<LocationId>, dropoffs: Vec<DropoffGroup>) -> Self {
        Self { tour, dropoffs }
    }

    pub fn number_of_legs(&self) -> usize {
        self.tour.len().saturating_sub(1)
    }

    pub fn number_of_dropoff_groups(&self) -> usize {
        self.dropoffs.len()
    }
}

/// Exact cost components: `driving` sums the tour legs, `walking` sums the
/// shortest-path distances of all TAs. The reported objective weighs driving
/// at two thirds, so the blend leaves fixed point only in `total()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cost {
    pub driving: Num,
    pub walking: Num,
}

impl Cost {
    pub const ZERO: Self = Self {
        driving: Num::ZERO,
        walking: Num::ZERO,
    };

    /// `(2/3) * driving + walking`, computed in raw `i128` units with a
    /// single final division.
    pub fn total(&self) -> f64 {
        let thirds = 2 * self.driving.value() as i128 + 3 * self.walking.value() as i128;
        thirds as f64 / 300_000.0
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.5} (driving {}, walking {})",
            self.total(),
            self.driving,
            self.walking
        )
    }
}
