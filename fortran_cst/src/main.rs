//! Simple parser CLI command, for testing.
//! Parses a single free-form file and dumps the tree.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use fortran_cst::{grammar, scan};

#[derive(clap::Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Fortran input file
    input: PathBuf,

    /// Dump the flat statement stream instead of the tree
    #[arg(short, long)]
    statements: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    let cli = Cli::parse();

    let source = std::fs::read_to_string(&cli.input)?;

    if cli.statements {
        for logical in scan::split_statements(&source, &scan::FreeForm) {
            println!("{:?}", grammar::parse_statement(logical));
        }
        return Ok(());
    }

    let tree = fortran_cst::parse(&source);
    println!("{tree:#?}");
    if tree.has_errors() {
        anyhow::bail!("{} syntax errors in {}", tree.errors, cli.input.display());
    }
    Ok(())
}
