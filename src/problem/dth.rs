use std::fmt::{Debug, Formatter};

use ahash::AHashMap;
use anyhow::{bail, Result};
use fixedbitset::FixedBitSet;

use crate::problem::adjacency::{AdjacencyMatrix, ShortestPaths};
use crate::problem::Num;

pub const MAX_LOCATIONS: usize = 200;
pub const MAX_NAME_LEN: usize = 20;
pub const MAX_EDGE_WEIGHT: Num = Num::from_i64(2_000_000_000);

/// A drive-the-TAs-home instance: an undirected weighted road graph over
/// named locations, the subset of locations that are TA homes, and the
/// location where the car starts and must end.
pub struct DTHInstance {
    pub name: String,
    pub location_names: Vec<String>,
    pub homes: Vec<usize>,
    pub start: usize,
    pub(crate) adjacency: AdjacencyMatrix,
    pub(crate) walking: ShortestPaths,
    name_to_index: AHashMap<String, usize>,
    home_mask: FixedBitSet,
}

impl Debug for DTHInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "DTH instance '{}':", self.name)
            .and(writeln!(
                f,
                "{} locations, {} homes, start at '{}'",
                self.num_locations(),
                self.num_homes(),
                self.location_names[self.start]
            ))
            .and(write!(
                f,
                "{} roads, max weight {}",
                self.adjacency.num_undirected_edges(),
                self.adjacency.max_weight()
            ))
    }
}

impl DTHInstance {
    pub fn num_locations(&self) -> usize {
        self.location_names.len()
    }

    pub fn num_homes(&self) -> usize {
        self.homes.len()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    pub fn location_name(&self, idx: usize) -> &str {
        &self.location_names[idx]
    }

    #[inline(always)]
    pub fn is_home(&self, idx: usize) -> bool {
        self.home_mask.contains(idx)
    }

    pub fn iter_homes(&self) -> impl Iterator<Item = usize> + '_ {
        self.homes.iter().copied()
    }

    /// Direct road weight, `None` when the two locations are not adjacent.
    #[inline(always)]
    pub fn distance(&self, from: usize, to: usize) -> Option<Num> {
        self.adjacency.weight(from, to)
    }

    /// Shortest-path distance a TA walks, `None` when unreachable.
    #[inline(always)]
    pub fn walk_distance(&self, from: usize, to: usize) -> Option<Num> {
        self.walking.dist(from, to)
    }

    pub fn adjacency(&self) -> &AdjacencyMatrix {
        &self.adjacency
    }

    /// Full conformance check of the instance data: size and name limits,
    /// empty diagonal, symmetry, connectivity, and the metric property
    /// (every road is itself a shortest route; in exact five-digit
    /// arithmetic this is the triangle-inequality check of the format).
    /// Weight ranges are already enforced by `create_instance_with`.
    pub fn validate(&self) -> Result<()> {
        let n = self.num_locations();
        if n == 0 {
            bail!("instance has no locations");
        }
        if n > MAX_LOCATIONS {
            bail!("too many locations: {} (limit {})", n, MAX_LOCATIONS);
        }
        for name in &self.location_names {
            if name.is_empty()
                || name.len() > MAX_NAME_LEN
                || !name.bytes().all(|b| b.is_ascii_alphanumeric())
            {
                bail!(
                    "invalid location name '{}': names are 1-{} alphanumeric characters",
                    name,
                    MAX_NAME_LEN
                );
            }
        }
        for i in 0..n {
            if self.adjacency.has_edge(i, i) {
                bail!("location '{}' has a self-loop entry", self.location_names[i]);
            }
        }
        for i in 0..n {
            for j in (i + 1)..n {
                if self.adjacency.weight(i, j) != self.adjacency.weight(j, i) {
                    bail!(
                        "asymmetric entries between '{}' and '{}': {} vs {}",
                        self.location_names[i],
                        self.location_names[j],
                        fmt_entry(self.adjacency.weight(i, j)),
                        fmt_entry(self.adjacency.weight(j, i)),
                    );
                }
            }
        }
        if !self.walking.is_connected() {
            for i in 0..n {
                for j in 0..n {
                    if self.walking.dist(i, j).is_none() {
                        bail!(
                            "graph is not connected: no route from '{}' to '{}'",
                            self.location_names[i],
                            self.location_names[j]
                        );
                    }
                }
            }
        }
        for (i, j, w) in self.adjacency.edges() {
            if i > j {
                continue;
            }
            // connectivity was checked above, every pair has a distance
            let shortest = self.walking.dist(i, j).unwrap_or(Num::MAX);
            if shortest < w {
                bail!(
                    "metric violation: road '{}'-'{}' weighs {} but the shortest route is {}",
                    self.location_names[i],
                    self.location_names[j],
                    w,
                    shortest
                );
            }
        }
        Ok(())
    }
}

fn fmt_entry(entry: Option<Num>) -> String {
    match entry {
        Some(w) => w.to_string(),
        None => "x".to_string(),
    }
}

pub fn create_instance_with(
    name: String,
    location_names: Vec<String>,
    home_names: &[String],
    start_name: &str,
    adjacency: AdjacencyMatrix,
) -> Result<DTHInstance> {
    if adjacency.num_locations() != location_names.len() {
        bail!(
            "adjacency matrix covers {} locations but {} are named",
            adjacency.num_locations(),
            location_names.len()
        );
    }
    let mut name_to_index = AHashMap::with_capacity(location_names.len());
    for (idx, name) in location_names.iter().enumerate() {
        if name_to_index.insert(name.clone(), idx).is_some() {
            bail!("duplicate location name '{}'", name);
        }
    }
    let mut home_mask = FixedBitSet::with_capacity(location_names.len());
    let mut homes = Vec::with_capacity(home_names.len());
    for home in home_names {
        match name_to_index.get(home.as_str()) {
            Some(&idx) => {
                if home_mask.contains(idx) {
                    bail!("home '{}' is listed twice", home);
                }
                home_mask.insert(idx);
                homes.push(idx);
            }
            None => bail!("home '{}' is not a known location", home),
        }
    }
    let start = match name_to_index.get(start_name) {
        Some(&idx) => idx,
        None => bail!("start '{}' is not a known location", start_name),
    };
    // weights must be in range before the shortest-path pass, path sums over
    // out-of-range entries can overflow the raw i64
    for (i, j, w) in adjacency.edges() {
        if w <= Num::ZERO {
            bail!(
                "road '{}'-'{}' has non-positive weight {}",
                location_names[i],
                location_names[j],
                w
            );
        }
        if w > MAX_EDGE_WEIGHT {
            bail!(
                "road '{}'-'{}' exceeds the weight limit: {}",
                location_names[i],
                location_names[j],
                w
            );
        }
    }
    let walking = ShortestPaths::compute(&adjacency);
    Ok(DTHInstance {
        name,
        location_names,
        homes,
        start,
        adjacency,
        walking,
        name_to_index,
        home_mask,
    })
}
