use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Parser as ClapParser, Subcommand};
use storeql::cli::{self, CheckOptions, CheckResult, CliError};
use storeql::output::{to_json, to_json_pretty};
use storeql::{InterpreterConfig, interpreter::DEFAULT_FETCH_LIMIT};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(ClapParser)]
#[command(name = "storeql")]
#[command(about = "StoreQL - A query language for store products, orders, and stores")]
#[command(version)]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and execute a StoreQL query against a JSON data set
    Check {
        /// The StoreQL query to execute
        query: String,

        /// JSON data set (reads from stdin if neither this nor --data is given)
        #[arg(short, long, conflicts_with = "data")]
        input: Option<String>,

        /// File containing the JSON data set
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't execute
        #[arg(long)]
        syntax_only: bool,

        /// Maximum records returned by SELECT and FIND
        #[arg(long, env = "STOREQL_FETCH_LIMIT", default_value_t = DEFAULT_FETCH_LIMIT)]
        fetch_limit: usize,
    },

    /// Check that a query lexes and parses
    Validate {
        query: String,
    },

    /// Print the tokens of a query
    Tokenize {
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the syntax tree of a query
    Parse {
        query: String,
    },

    /// Print the StoreQL grammar
    Grammar {
        /// Output as JSON instead of BNF
        #[arg(long)]
        json: bool,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'storeql docs' to list categories)
        category: String,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "storeql=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            query,
            input,
            data,
            pretty,
            syntax_only,
            fetch_limit,
        } => run_check(query, input, data, pretty, syntax_only, fetch_limit),
        Commands::Validate { query } => storeql::validate(&query)
            .map(|()| println!("Query is valid"))
            .map_err(CliError::from),
        Commands::Tokenize { query, json } => cli::render_tokens(&query, json).map(print_block),
        Commands::Parse { query } => cli::render_parse(&query).map(print_block),
        Commands::Grammar { json } => cli::render_grammar(json).map(print_block),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| print!("{}", content)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn print_block(text: String) {
    if text.ends_with('\n') {
        print!("{}", text);
    } else {
        println!("{}", text);
    }
}

fn run_check(
    query: String,
    input: Option<String>,
    data: Option<PathBuf>,
    pretty: bool,
    syntax_only: bool,
    fetch_limit: usize,
) -> Result<(), CliError> {
    let input = match (input, data) {
        (Some(s), _) => Some(s),
        (None, Some(path)) => Some(fs::read_to_string(path)?),
        (None, None) if !syntax_only && !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        (None, None) => None,
    };

    let options = CheckOptions {
        query,
        input,
        syntax_only,
        config: InterpreterConfig { fetch_limit },
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Success(result) => {
            let json = if pretty {
                to_json_pretty(&result)?
            } else {
                to_json(&result)?
            };
            println!("{}", json);
        }
    }
    Ok(())
}
