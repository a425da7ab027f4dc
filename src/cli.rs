use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version)]
pub struct ProgramArguments {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "solve instances and write drop-off plans")]
    Solve(SolveArguments),
    #[command(about = "generate a random instance")]
    Generate(GenerateArguments),
    #[command(about = "check drop-off plans against their instances")]
    Validate(ValidateArguments),
}

#[derive(clap::Args, Debug)]
pub struct SolveArguments {
    #[arg(help = "instance file, or a directory with --all")]
    pub input: String,

    #[arg(help = "directory to store the solution files", default_value = ".")]
    pub output_directory: String,

    #[arg(
        long,
        help = "solve every .in file in the input directory",
        default_value = "false"
    )]
    pub all: bool,

    #[arg(
        long,
        help = "git-commit the written solution files",
        default_value = "false"
    )]
    pub commit: bool,

    #[arg(long, help = "file to store the run summary as json")]
    pub summary: Option<String>,

    #[command(flatten)]
    pub solver: SolverArguments,
}

#[derive(clap::Args, Clone, Debug)]
pub struct SolverArguments {
    #[arg(long, default_value = "300")]
    pub time_limit_in_seconds: u64,

    #[arg(long, help = "thread count for the solver (default: solver chooses)")]
    pub threads: Option<i32>,

    #[arg(long, help = "print solver output to stdout", default_value = "false")]
    pub solver_stdout_logging: bool,
}

#[derive(clap::Args, Debug)]
pub struct GenerateArguments {
    #[arg(help = "number of locations")]
    pub locations: usize,

    #[arg(help = "number of TAs")]
    pub tas: usize,

    #[arg(long, help = "instance file to write (default: <locations>.in)")]
    pub out: Option<String>,

    #[arg(long, help = "rng seed")]
    pub seed: Option<i128>,

    #[arg(
        long,
        default_value = "100",
        help = "generation attempts before giving up"
    )]
    pub max_attempts: usize,
}

#[derive(clap::Args, Debug)]
pub struct ValidateArguments {
    #[arg(help = "instance file, or a directory with --all")]
    pub input: String,

    #[arg(help = "solution file, or the output directory with --all")]
    pub output: String,

    #[arg(
        long,
        help = "validate every .in file in the input directory",
        default_value = "false"
    )]
    pub all: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        ProgramArguments::command().debug_assert()
    }
}
