//! `rivet_cli`: the thin adapter binary for spec.md §6's CLI surface.
//!
//! Grounded on `spicy_cli::main`'s read-parse-run-report shape, with
//! argument parsing upgraded to `clap` derive (the idiomatic choice across
//! the retrieval pack; see SPEC_FULL.md §11) and `anyhow` wrapping `main`
//! the way `viterbo`'s `cli` crate does, while every library error stays
//! `thiserror`-typed underneath.

use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use rivet_core::{run_from_firep, EngineConfig};
use rivet_io::bifiltration_input::BifiltrationInput;
use rivet_io::format::{write, PersistenceDocument};

/// Computes two-parameter persistent homology of a bifiltration.
#[derive(Debug, Parser)]
#[command(name = "rivet", version)]
struct Cli {
    /// Path to the bifiltration input file.
    input: String,

    /// Path to write the persistence-format output to.
    output: String,

    /// Homological dimension to compute.
    #[arg(short = 'H', long = "hom-dim", default_value_t = 0)]
    hom_dim: usize,

    /// Number of x-axis bins (reserved for future grid-rendering adapters).
    #[arg(short = 'x', long = "xbins", default_value_t = 0)]
    xbins: usize,

    /// Number of y-axis bins (reserved for future grid-rendering adapters).
    #[arg(short = 'y', long = "ybins", default_value_t = 0)]
    ybins: usize,

    /// Verbosity level (0 = silent, higher prints progress events).
    #[arg(short = 'V', long = "verbose", default_value_t = 0)]
    verbosity: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let text = fs::read_to_string(&cli.input).with_context(|| format!("reading {}", cli.input))?;
    let bifiltration = BifiltrationInput::parse(&text).map_err(|e| anyhow::anyhow!("MalformedInput: {e}"))?;
    let firep = bifiltration.into_firep(cli.hom_dim);

    let config = EngineConfig {
        hom_dim: cli.hom_dim,
        ..EngineConfig::default()
    };
    let output = run_from_firep(&firep, &config).map_err(|e| anyhow::anyhow!("{}: {e}", e.kind()))?;

    if cli.verbosity > 0 {
        eprintln!(
            "computed {} betti entries, {} arrangement faces",
            output.betti.len(),
            output.arrangement.face_count()
        );
    }

    let support = rivet_core::support_from_betti(&firep);
    let doc = PersistenceDocument {
        hom_dim: cli.hom_dim,
        x_grades: &bifiltration.x_grades,
        y_grades: &bifiltration.y_grades,
        support: &support,
        output: &output,
    };
    let rendered = write(&doc);
    fs::write(&cli.output, rendered).with_context(|| format!("writing {}", cli.output))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;
    use std::io::Write;

    #[test]
    fn end_to_end_single_edge_triangle_writes_output() {
        let mut input = NamedTempFile::new().unwrap();
        writeln!(input, "2 2\n0\n1\n0\n1\n1 1\n1 1 0\n1 1\n1 1 0 0").unwrap();
        let output = NamedTempFile::new().unwrap();

        let cli = Cli {
            input: input.path().to_string_lossy().into_owned(),
            output: output.path().to_string_lossy().into_owned(),
            hom_dim: 1,
            xbins: 0,
            ybins: 0,
            verbosity: 0,
        };
        run(&cli).unwrap();

        let written = fs::read_to_string(output.path()).unwrap();
        assert!(written.starts_with("RIVET_0 1 2 2"));
    }
}
