use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use clap::{Args, Parser as ClapParser, Subcommand};
use jsonq::cli::{self, CliError, EvalOptions, PutOptions, QueryOptions};

#[derive(ClapParser)]
#[command(name = "jsonq")]
#[command(about = "jsonq - Query and edit JSON documents with path expressions")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Input {
    /// JSON input (reads from stdin if neither this nor --file is given)
    #[arg(short, long, conflicts_with = "file")]
    input: Option<String>,

    /// Read JSON input from a file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Pretty-print the output
    #[arg(short, long)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a path against a JSON document
    Get {
        /// The path, e.g. '$.items[?(@.value > 15)].name'
        path: String,

        #[command(flatten)]
        input: Input,
    },

    /// Show how a path splits into segments
    Explain {
        /// The path to explain
        path: String,
    },

    /// Evaluate a boolean filter expression
    Eval {
        /// The expression, e.g. "(3 + 4) * 2 == 14"
        expression: String,
    },

    /// Write a value into a JSON document and print the result
    Put {
        /// Target path; its last component is the key written
        path: String,

        /// The value to write, as JSON
        value: String,

        #[command(flatten)]
        input: Input,

        /// Do not replace an existing member
        #[arg(long)]
        keep: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Get { path, input } => run_get(path, input),
        Commands::Explain { path } => cli::execute_explain(&path).map(|lines| print!("{}", lines)),
        Commands::Eval { expression } => {
            cli::execute_eval(&EvalOptions { expression }).map(|truth| println!("{}", truth))
        }
        Commands::Put {
            path,
            value,
            input,
            keep,
        } => run_put(path, value, input, keep),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn read_input(input: &Input) -> Result<Option<String>, CliError> {
    if let Some(text) = &input.input {
        return Ok(Some(text.clone()));
    }
    if let Some(file) = &input.file {
        return Ok(Some(fs::read_to_string(file)?));
    }
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(Some(buffer))
}

fn print_json(output: &serde_json::Value, pretty: bool) -> Result<(), CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(output)
    } else {
        serde_json::to_string(output)
    }?;
    println!("{}", json);
    Ok(())
}

fn run_get(path: String, input: Input) -> Result<(), CliError> {
    let options = QueryOptions {
        path,
        input: read_input(&input)?,
        pretty: input.pretty,
    };
    let output = cli::execute_get(&options)?;
    print_json(&output, options.pretty)
}

fn run_put(path: String, value: String, input: Input, keep: bool) -> Result<(), CliError> {
    let options = PutOptions {
        path,
        value,
        input: read_input(&input)?,
        pretty: input.pretty,
        keep,
    };
    let output = cli::execute_put(&options)?;
    print_json(&output, options.pretty)
}
