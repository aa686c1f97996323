use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use pyimports::graph::ImportGraph;
use pyimports::{Config, Environment, config, discovery, env, output, parse_version};

#[derive(Parser, Debug)]
#[command(
    name = "pyimports",
    version,
    disable_version_flag = true,
    about = "Import dependency graph analyzer for Python projects"
)]
struct Cli {
    /// Print version
    #[arg(long = "version", action = clap::ArgAction::Version)]
    version: (),

    /// Input file(s) or directories
    #[arg(required_unless_present = "generate_config")]
    filenames: Vec<String>,

    /// Display the import tree
    #[arg(long)]
    tree: bool,

    /// Display a list of unresolved imports
    #[arg(long)]
    unresolved: bool,

    /// Dump the dependency graph as JSON
    #[arg(long)]
    json: bool,

    /// Don't descend into system and builtin dependencies
    #[arg(long)]
    trim: bool,

    /// Python version of the project being analyzed (MAJOR.MINOR)
    #[arg(short = 'V', long)]
    python_version: Option<String>,

    /// Directories to search for imports, separated like PYTHONPATH
    #[arg(short = 'p', long)]
    pythonpath: Option<String>,

    /// Location of a typeshed checkout for standard library stubs
    #[arg(short = 'T', long)]
    typeshed: Option<String>,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a sample configuration file and exit
    #[arg(long, value_name = "FILE")]
    generate_config: Option<PathBuf>,
}

fn main() -> ExitCode {
    reset_sigpipe();
    let cli = Cli::parse();

    if let Some(path) = &cli.generate_config {
        return match config::generate_default(path) {
            Ok(()) => {
                println!("Wrote {}", path.display());
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("{err}");
                ExitCode::FAILURE
            }
        };
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path).map_err(|e| e.to_string())?,
        None => Config::default(),
    };

    let version_string = cli
        .python_version
        .clone()
        .unwrap_or_else(|| config.python_version.clone());
    let python_version = parse_version(&version_string).map_err(|e| e.to_string())?;

    let pythonpath = match &cli.pythonpath {
        Some(joined) => std::env::split_paths(joined)
            .map(|p| p.to_string_lossy().into_owned())
            .filter(|p| !p.is_empty())
            .collect(),
        None => config.make_pythonpath(),
    };

    let typeshed = env::typeshed_location(cli.typeshed.as_deref());
    let environment = Environment::new(&pythonpath, typeshed.as_deref(), python_version)
        .map_err(|e| e.to_string())?;

    let filenames = discovery::expand_source_files(&cli.filenames);
    if filenames.is_empty() {
        return Err("No source files found.".to_string());
    }

    let graph = ImportGraph::create(environment, &filenames, cli.trim);
    let typeshed = graph.env().typeshed_location.clone();
    let typeshed = typeshed.as_deref();

    if cli.tree {
        println!("Source tree:");
        print!("{}", output::format_tree(&graph, typeshed));
    } else if cli.unresolved {
        print!("{}", output::format_unresolved(&graph));
    } else if cli.json {
        let value = output::deps_json(&graph);
        match serde_json::to_string_pretty(&value) {
            Ok(text) => println!("{text}"),
            Err(err) => return Err(format!("Failed to serialize graph: {err}")),
        }
    } else {
        println!("{}", output::formatted_deps_list(&graph, typeshed));
    }
    Ok(())
}

fn reset_sigpipe() {
    // Restore default SIGPIPE so `pyimports ... | head` exits quietly
    // instead of panicking on BrokenPipe.
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}
