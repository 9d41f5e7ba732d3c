// Licensed under the Apache-2.0 license

use clap::{Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;

mod svd_gen;

#[derive(Parser, Debug)]
#[command(
    name = "xtask",
    author,
    version,
    about = "Workspace tasks for the SVD register generator"
)]
struct Xtask {
    /// Log compilation progress at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    xtask: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate register and interrupt constants from an SVD file
    SvdGen {
        /// Path to the SVD file
        #[arg(value_name = "SVD")]
        svd_file: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Only emit these peripherals (repeatable)
        #[arg(long = "include", value_name = "NAME")]
        include: Vec<String>,

        /// Never emit these peripherals (repeatable)
        #[arg(long = "exclude", value_name = "NAME")]
        exclude: Vec<String>,

        /// Do not emit the group-relative offset module
        #[arg(long)]
        no_groups: bool,

        /// Do not emit descriptions as doc comments
        #[arg(long)]
        no_docs: bool,
    },
}

fn main() {
    let cli = Xtask::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    // Logs go to stderr so generated code on stdout stays clean.
    let _ = SimpleLogger::new().with_level(level).with_colors(true).init();

    let result = match &cli.xtask {
        Commands::SvdGen {
            svd_file,
            output,
            include,
            exclude,
            no_groups,
            no_docs,
        } => svd_gen::generate(
            svd_file,
            output.as_deref(),
            include,
            exclude,
            *no_groups,
            *no_docs,
        ),
    };
    result.unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}
