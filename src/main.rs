use std::fs;
use std::io::Read;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use gridmark_lib::{Options, ast, parse, render_html};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Markdown file to convert. Reads stdin when omitted or "-".
    path: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Disable the grid table extension
    #[arg(long)]
    no_grid_tables: bool,

    /// Print the parsed block tree as JSON instead of HTML
    #[arg(long)]
    ast: bool,

    /// Show detailed output
    #[arg(short, long)]
    verbose: bool,
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) if path != "-" => {
            fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
        }
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let source = read_input(cli.path.as_deref())?;
    let mut options = match &cli.config {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };
    if cli.no_grid_tables {
        options.grid_tables = false;
    }
    let document = parse(&source, &options);
    if cli.ast {
        println!("{}", serde_json::to_string_pretty(&ast::dump(&document))?);
    } else {
        print!("{}", render_html(&document));
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    if let Err(err) = run(&cli) {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}
