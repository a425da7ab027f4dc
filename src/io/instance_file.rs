use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use itertools::Itertools;

use crate::problem::adjacency::AdjacencyMatrixBuilder;
use crate::problem::dth::{create_instance_with, DTHInstance};
use crate::problem::Num;

/**
Instance file layout (one instance per `.in` file):

    line 1: L, the number of locations
    line 2: H, the number of TA homes
    line 3: L location names, whitespace-separated
    line 4: H home names
    line 5: name of the starting location
    next L lines: rows of the L x L adjacency matrix; entry j of row i is
        the road weight between locations i and j, a decimal with at most
        five fractional digits, or the letter x when there is no road

The parser checks counts and token shapes; weight ranges are rejected when
the parsed instance is constructed. Symmetry, the empty diagonal and the
metric property are `DTHInstance::validate`'s job.
 */
pub fn load_instance(path: impl Into<String>) -> Result<DTHInstance> {
    let path = path.into();
    let f = File::open(&path).with_context(|| format!("cannot open '{}'", path))?;
    let name = Path::new(&path)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.clone());
    read_instance(BufReader::new(f), name).with_context(|| format!("while reading '{}'", path))
}

pub fn read_instance(reader: impl BufRead, name: String) -> Result<DTHInstance> {
    let mut lines = reader.lines();

    let num_locations = next_line(&mut lines, "location count line")?
        .trim()
        .parse::<usize>()
        .context("location count is not a number")?;
    let num_homes = next_line(&mut lines, "home count line")?
        .trim()
        .parse::<usize>()
        .context("home count is not a number")?;

    let location_names = read_names(&mut lines, num_locations, "location names")?;
    let home_names = read_names(&mut lines, num_homes, "home names")?;
    let start_name = next_line(&mut lines, "starting location line")?
        .trim()
        .to_string();

    let mut builder = AdjacencyMatrixBuilder::with_num_locations(num_locations);
    for i in 0..num_locations {
        let row = next_line(&mut lines, &format!("matrix row {}", i + 1))?;
        let entries = row.split_whitespace().collect::<Vec<_>>();
        if entries.len() != num_locations {
            bail!(
                "matrix row {} has {} entries, expected {}",
                i + 1,
                entries.len(),
                num_locations
            );
        }
        for (j, entry) in entries.iter().enumerate() {
            if *entry == "x" {
                continue;
            }
            let weight = entry.parse::<Num>().with_context(|| {
                format!("bad weight in matrix row {}, column {}", i + 1, j + 1)
            })?;
            builder.set_entry(i, j, weight);
        }
    }

    create_instance_with(name, location_names, &home_names, &start_name, builder.build())
}

fn next_line(
    lines: &mut impl Iterator<Item = std::io::Result<String>>,
    what: &str,
) -> Result<String> {
    let line = lines.next().with_context(|| format!("missing {}", what))??;
    Ok(line)
}

fn read_names(
    lines: &mut impl Iterator<Item = std::io::Result<String>>,
    expected: usize,
    what: &str,
) -> Result<Vec<String>> {
    let line = next_line(lines, &format!("{} line", what))?;
    let names = line
        .split_whitespace()
        .map(str::to_string)
        .collect::<Vec<_>>();
    if names.len() != expected {
        bail!("expected {} {}, found {}", expected, what, names.len());
    }
    Ok(names)
}

pub fn write_instance(path: impl AsRef<Path>, instance: &DTHInstance) -> Result<()> {
    let path = path.as_ref();
    let f = File::create(path)
        .with_context(|| format!("cannot create '{}'", path.display()))?;
    let mut writer = BufWriter::new(f);
    write_instance_to(&mut writer, instance)
}

pub fn write_instance_to(w: &mut impl Write, instance: &DTHInstance) -> Result<()> {
    let n = instance.num_locations();
    writeln!(w, "{}", n)?;
    writeln!(w, "{}", instance.num_homes())?;
    writeln!(w, "{}", instance.location_names.iter().join(" "))?;
    writeln!(
        w,
        "{}",
        instance
            .iter_homes()
            .map(|h| instance.location_name(h))
            .join(" ")
    )?;
    writeln!(w, "{}", instance.location_name(instance.start))?;
    for i in 0..n {
        let row = (0..n)
            .map(|j| match instance.distance(i, j) {
                Some(weight) => weight.to_string(),
                None => "x".to_string(),
            })
            .join(" ");
        writeln!(w, "{}", row)?;
    }
    Ok(())
}
