use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use itertools::Itertools;

use crate::problem::dth::DTHInstance;
use crate::solution::{DropoffGroup, Solution};

/**
Solution file layout (one solution per `.out` file):

    line 1: the car's tour as location names, whitespace-separated; either
        the starting location alone or a closed walk beginning and ending
        at the starting location
    line 2: D, the number of drop-off lines
    next D lines: a drop-off location name followed by the names of the
        homes whose TAs get off there

The record keeps names; `resolve` turns them into a `Solution` against an
instance, `from_solution` goes the other way.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionFile {
    pub tour: Vec<String>,
    pub dropoffs: Vec<(String, Vec<String>)>,
}

impl SolutionFile {
    pub fn from_solution(solution: &Solution, instance: &DTHInstance) -> Self {
        let name = |idx: usize| instance.location_name(idx).to_string();
        Self {
            tour: solution.tour.iter().map(|&v| name(v)).collect(),
            dropoffs: solution
                .dropoffs
                .iter()
                .filter(|group| !group.homes.is_empty())
                .map(|group| {
                    (
                        name(group.location),
                        group.homes.iter().map(|&h| name(h)).collect(),
                    )
                })
                .collect(),
        }
    }

    pub fn resolve(&self, instance: &DTHInstance) -> Result<Solution> {
        let mut tour = Vec::with_capacity(self.tour.len());
        for name in &self.tour {
            match instance.index_of(name) {
                Some(idx) => tour.push(idx),
                None => bail!("unknown location '{}' on the tour", name),
            }
        }
        let mut dropoffs = Vec::with_capacity(self.dropoffs.len());
        for (location, homes) in &self.dropoffs {
            let location = match instance.index_of(location) {
                Some(idx) => idx,
                None => bail!("unknown drop-off location '{}'", location),
            };
            let mut resolved = Vec::with_capacity(homes.len());
            for home in homes {
                match instance.index_of(home) {
                    Some(idx) => resolved.push(idx),
                    None => bail!(
                        "unknown home '{}' in the drop-off at '{}'",
                        home,
                        instance.location_name(location)
                    ),
                }
            }
            dropoffs.push(DropoffGroup {
                location,
                homes: resolved,
            });
        }
        Ok(Solution::new(tour, dropoffs))
    }
}

pub fn load_solution_file(path: impl Into<String>) -> Result<SolutionFile> {
    let path = path.into();
    let f = File::open(&path).with_context(|| format!("cannot open '{}'", path))?;
    read_solution_file(BufReader::new(f)).with_context(|| format!("while reading '{}'", path))
}

pub fn read_solution_file(reader: impl BufRead) -> Result<SolutionFile> {
    let mut lines = reader.lines();

    let tour_line = lines.next().context("missing tour line")??;
    let tour = tour_line
        .split_whitespace()
        .map(str::to_string)
        .collect::<Vec<_>>();
    if tour.is_empty() {
        bail!("tour line is empty");
    }

    let num_dropoffs = lines
        .next()
        .context("missing drop-off count line")??
        .trim()
        .parse::<usize>()
        .context("drop-off count is not a number")?;

    let mut dropoffs = Vec::with_capacity(num_dropoffs);
    for i in 0..num_dropoffs {
        let line = lines
            .next()
            .with_context(|| format!("missing drop-off line {}", i + 1))??;
        let mut tokens = line.split_whitespace().map(str::to_string);
        let location = match tokens.next() {
            Some(location) => location,
            None => bail!("drop-off line {} is empty", i + 1),
        };
        dropoffs.push((location, tokens.collect()));
    }

    Ok(SolutionFile { tour, dropoffs })
}

pub fn write_solution_file(path: impl AsRef<Path>, solution: &SolutionFile) -> Result<()> {
    let path = path.as_ref();
    let f = File::create(path)
        .with_context(|| format!("cannot create '{}'", path.display()))?;
    let mut writer = BufWriter::new(f);
    write_solution_file_to(&mut writer, solution)
}

pub fn write_solution_file_to(w: &mut impl Write, solution: &SolutionFile) -> Result<()> {
    writeln!(w, "{}", solution.tour.iter().join(" "))?;
    writeln!(w, "{}", solution.dropoffs.len())?;
    for (location, homes) in &solution.dropoffs {
        if homes.is_empty() {
            writeln!(w, "{}", location)?;
        } else {
            writeln!(w, "{} {}", location, homes.iter().join(" "))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::adjacency::AdjacencyMatrixBuilder;
    use crate::problem::dth::create_instance_with;
    use crate::problem::Num;
    use crate::utils::validator::assert_valid_solution;

    /// Square a-b-c-d with unit edges, homes at b and d, start at a.
    fn square_instance() -> DTHInstance {
        let mut builder = AdjacencyMatrixBuilder::with_num_locations(4);
        builder.set_edge(0, 1, Num::ONE);
        builder.set_edge(1, 2, Num::ONE);
        builder.set_edge(2, 3, Num::ONE);
        builder.set_edge(3, 0, Num::ONE);
        create_instance_with(
            "square".into(),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            &["b".into(), "d".into()],
            "a",
            builder.build(),
        )
        .unwrap()
    }

    const SAMPLE: &str = "\
a b c d a
2
b b
d d
";

    #[test]
    fn parses_a_solution_file() -> Result<()> {
        let file = read_solution_file(SAMPLE.as_bytes())?;
        assert_eq!(file.tour, vec!["a", "b", "c", "d", "a"]);
        assert_eq!(
            file.dropoffs,
            vec![
                ("b".to_string(), vec!["b".to_string()]),
                ("d".to_string(), vec!["d".to_string()])
            ]
        );
        Ok(())
    }

    #[test]
    fn parses_a_parked_car() -> Result<()> {
        let file = read_solution_file("a\n1\na b d\n".as_bytes())?;
        assert_eq!(file.tour, vec!["a"]);
        assert_eq!(
            file.dropoffs,
            vec![("a".to_string(), vec!["b".to_string(), "d".to_string()])]
        );
        Ok(())
    }

    #[test]
    fn resolves_names_against_the_instance() -> Result<()> {
        let instance = square_instance();
        let solution = read_solution_file(SAMPLE.as_bytes())?.resolve(&instance)?;
        assert_eq!(solution.tour, vec![0, 1, 2, 3, 0]);
        assert_eq!(solution.dropoffs.len(), 2);
        assert_eq!(solution.dropoffs[0].location, 1);
        assert_eq!(solution.dropoffs[0].homes, vec![1]);
        assert_valid_solution(&instance, &solution);
        Ok(())
    }

    #[test]
    fn rejects_unknown_names() {
        let instance = square_instance();
        let err = read_solution_file("a z a\n0\n".as_bytes())
            .unwrap()
            .resolve(&instance)
            .unwrap_err();
        assert!(err.to_string().contains("unknown location 'z'"), "{}", err);

        let err = read_solution_file("a\n1\na z\n".as_bytes())
            .unwrap()
            .resolve(&instance)
            .unwrap_err();
        assert!(err.to_string().contains("unknown home 'z'"), "{}", err);
    }

    #[test]
    fn written_solutions_parse_back_identically() -> Result<()> {
        let instance = square_instance();
        let solution = Solution::new(
            vec![0, 1, 2, 3, 0],
            vec![
                DropoffGroup {
                    location: 1,
                    homes: vec![1],
                },
                DropoffGroup {
                    location: 3,
                    homes: vec![3],
                },
            ],
        );
        let file = SolutionFile::from_solution(&solution, &instance);
        let mut buffer = Vec::new();
        write_solution_file_to(&mut buffer, &file)?;
        let reread = read_solution_file(buffer.as_slice())?;
        assert_eq!(reread, file);
        assert_eq!(reread.resolve(&instance)?, solution);
        Ok(())
    }

    #[test]
    fn rejects_malformed_files() {
        assert!(read_solution_file("".as_bytes()).is_err());
        assert!(read_solution_file("a\nnope\n".as_bytes()).is_err());
        let err = read_solution_file("a\n2\na b\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("drop-off line 2"), "{}", err);
    }
}
