use crate::problem::Num;

/// Dense adjacency matrix over `Option<Num>` where `None` means "no road".
///
/// Entries are stored exactly as given; symmetry is a property the instance
/// validation checks, not something the builder repairs.
#[derive(Debug, Clone)]
pub struct AdjacencyMatrix {
    n: usize,
    data: Vec<Option<Num>>,
    max_weight: Num,
}

impl AdjacencyMatrix {
    #[inline(always)]
    fn idx(&self, from: usize, to: usize) -> usize {
        debug_assert!(from < self.n);
        debug_assert!(to < self.n);
        from * self.n + to
    }

    #[inline(always)]
    pub fn num_locations(&self) -> usize {
        self.n
    }

    #[inline(always)]
    pub fn weight(&self, from: usize, to: usize) -> Option<Num> {
        self.data[self.idx(from, to)]
    }

    #[inline(always)]
    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.data[self.idx(from, to)].is_some()
    }

    pub fn max_weight(&self) -> Num {
        self.max_weight
    }

    /// Directed arcs with a finite weight, diagonal excluded.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, Num)> + '_ {
        (0..self.n).flat_map(move |from| {
            (0..self.n).filter_map(move |to| {
                if from == to {
                    None
                } else {
                    self.weight(from, to).map(|w| (from, to, w))
                }
            })
        })
    }

    pub fn neighbors(&self, from: usize) -> impl Iterator<Item = (usize, Num)> + '_ {
        (0..self.n).filter_map(move |to| {
            if from == to {
                None
            } else {
                self.weight(from, to).map(|w| (to, w))
            }
        })
    }

    pub fn num_undirected_edges(&self) -> usize {
        self.edges().filter(|(from, to, _)| from < to).count()
    }
}

pub struct AdjacencyMatrixBuilder {
    n: usize,
    data: Vec<Option<Num>>,
    max_weight: Num,
}

impl AdjacencyMatrixBuilder {
    pub fn with_num_locations(num_locations: usize) -> Self {
        Self {
            n: num_locations,
            data: vec![None; num_locations * num_locations],
            max_weight: Num::ZERO,
        }
    }

    /// Sets a single matrix cell, as read from an instance file.
    pub fn set_entry(&mut self, from: usize, to: usize, weight: Num) -> &mut Self {
        if weight > self.max_weight {
            self.max_weight = weight;
        }
        self.data[from * self.n + to] = Some(weight);
        self
    }

    /// Sets both directions of an undirected road.
    pub fn set_edge(&mut self, a: usize, b: usize, weight: Num) -> &mut Self {
        self.set_entry(a, b, weight).set_entry(b, a, weight)
    }

    pub fn build(self) -> AdjacencyMatrix {
        AdjacencyMatrix {
            n: self.n,
            data: self.data,
            max_weight: self.max_weight,
        }
    }
}

/// All-pairs shortest path distances, Floyd-Warshall over the exact
/// fixed-point weights. `None` means unreachable.
#[derive(Debug, Clone)]
pub struct ShortestPaths {
    n: usize,
    data: Vec<Option<Num>>,
}

impl ShortestPaths {
    pub fn compute(matrix: &AdjacencyMatrix) -> Self {
        let n = matrix.num_locations();
        let mut data: Vec<Option<Num>> = vec![None; n * n];
        for i in 0..n {
            data[i * n + i] = Some(Num::ZERO);
            for (j, w) in matrix.neighbors(i) {
                data[i * n + j] = Some(w);
            }
        }
        for k in 0..n {
            for i in 0..n {
                let d_ik = match data[i * n + k] {
                    Some(d) => d,
                    None => continue,
                };
                for j in 0..n {
                    if let Some(d_kj) = data[k * n + j] {
                        let candidate = d_ik + d_kj;
                        let slot = &mut data[i * n + j];
                        if slot.map_or(true, |current| candidate < current) {
                            *slot = Some(candidate);
                        }
                    }
                }
            }
        }
        Self { n, data }
    }

    #[inline(always)]
    pub fn dist(&self, from: usize, to: usize) -> Option<Num> {
        debug_assert!(from < self.n);
        debug_assert!(to < self.n);
        self.data[from * self.n + to]
    }

    pub fn is_connected(&self) -> bool {
        self.data.iter().all(|d| d.is_some())
    }
}
