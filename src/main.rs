use std::io::Write;

use clap::{Parser, Subcommand};

use crate::{datasource::UserDataSource, error::Error, seed::SeedOutcome};

mod datasource;
mod error;
mod paginate;
mod record;
mod seed;
#[cfg(test)]
mod seed_test;
mod stats;
#[cfg(test)]
mod stats_test;
mod stream;

#[derive(Parser)]
#[command(name = "userstream")]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the user_data table and load it from a CSV file
    Seed {
        /// Candidate database paths, tried in order
        #[arg(long = "database", required = true)]
        databases: Vec<String>,
        /// Path to the CSV file with a user_id,name,email,age header
        #[arg(long, required = true)]
        csv: String,
    },
    /// Print every user as one JSON object per line
    Users {
        /// Candidate database paths, tried in order
        #[arg(long = "database", required = true)]
        databases: Vec<String>,
    },
    /// Print users in fixed-size batches, one JSON array per line
    Batches {
        /// Candidate database paths, tried in order
        #[arg(long = "database", required = true)]
        databases: Vec<String>,
        #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(i64).range(1..))]
        batch_size: i64,
    },
    /// Print users older than a threshold, scanned batch by batch
    Filter {
        /// Candidate database paths, tried in order
        #[arg(long = "database", required = true)]
        databases: Vec<String>,
        #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(i64).range(1..))]
        batch_size: i64,
        #[arg(long, default_value_t = 25)]
        min_age: i64,
    },
    /// Print LIMIT/OFFSET pages, one JSON array per line
    Pages {
        /// Candidate database paths, tried in order
        #[arg(long = "database", required = true)]
        databases: Vec<String>,
        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(i64).range(1..))]
        page_size: i64,
    },
    /// Print the average age computed in a single streaming pass
    AverageAge {
        /// Candidate database paths, tried in order
        #[arg(long = "database", required = true)]
        databases: Vec<String>,
    },
}

fn run<W: Write>(args: Args, w: &mut W) -> std::result::Result<(), Error> {
    match args.command {
        Commands::Seed { databases, csv } => {
            let mut source = UserDataSource::connect_any(&databases)?;
            seed::ensure_schema(&mut source)?;
            match seed::import_csv(&mut source, &csv)? {
                SeedOutcome::AlreadyPopulated { rows } => {
                    writeln!(w, "Data already exists in user_data table ({rows} rows)")?;
                }
                SeedOutcome::Imported { inserted, skipped } => {
                    writeln!(w, "Successfully inserted {inserted} rows into user_data table")?;
                    if skipped > 0 {
                        writeln!(w, "Skipped {skipped} rows with invalid UUID format")?;
                    }
                }
            }
            writeln!(w, "\nSample data from user_data table:")?;
            for record in source.fetch_page(0, 5)? {
                writeln!(w, "{}", serde_json::to_string(&record)?)?;
            }
        }
        Commands::Users { databases } => {
            let source = UserDataSource::connect_any(&databases)?;
            let mut cursor = source.users()?;
            for record in cursor.iter()? {
                writeln!(w, "{}", serde_json::to_string(&record?)?)?;
            }
        }
        Commands::Batches { databases, batch_size } => {
            let source = UserDataSource::connect_any(&databases)?;
            let mut cursor = source.users()?;
            for batch in stream::batches(cursor.iter()?, batch_size as usize) {
                writeln!(w, "{}", serde_json::to_string(&batch?)?)?;
            }
        }
        Commands::Filter {
            databases,
            batch_size,
            min_age,
        } => {
            let source = UserDataSource::connect_any(&databases)?;
            let mut cursor = source.users()?;
            for record in stream::older_than(stream::batches(cursor.iter()?, batch_size as usize), min_age) {
                writeln!(w, "{}", serde_json::to_string(&record?)?)?;
            }
        }
        Commands::Pages { databases, page_size } => {
            let source = UserDataSource::connect_any(&databases)?;
            for page in paginate::pages(&source, page_size) {
                writeln!(w, "{}", serde_json::to_string(&page?)?)?;
            }
        }
        Commands::AverageAge { databases } => {
            let source = UserDataSource::connect_any(&databases)?;
            let mut cursor = source.ages()?;
            let average = stats::average_age(cursor.iter()?)?;
            writeln!(w, "Average age of users: {average:.2}")?;
        }
    }
    Ok(())
}

fn cli<W1: Write, W2: Write>(args: Args, stdout: &mut W1, stderr: &mut W2) -> i32 {
    match run(args, stdout) {
        Ok(()) => 0,
        Err(err) => {
            writeln!(stderr, "{err}").expect("Failed to write an error message.");
            1
        }
    }
}

fn main() {
    let code = cli(Args::parse(), &mut std::io::stdout(), &mut std::io::stderr());
    std::process::exit(code);
}
