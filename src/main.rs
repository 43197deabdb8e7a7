use clap::{Parser as ClapParser, Subcommand};
use std::io::{self, Read};
use tracing::Level;
use verdict::DEFAULT_TAG_NAME;
use verdict::cli::{self, CheckOptions, CheckResult, CliError};

#[derive(ClapParser)]
#[command(name = "verdict")]
#[command(about = "Verdict - boolean filter expressions over JSON data")]
#[command(version)]
struct Cli {
    /// Log parsing and evaluation to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression against JSON input
    Check {
        /// The expression to evaluate
        expression: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print filtered output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't evaluate
        #[arg(long)]
        syntax_only: bool,

        /// Keep the matching elements of an array or object
        #[arg(short, long)]
        filter: bool,

        /// Maximum number of match expressions (0 = unlimited)
        #[arg(long, default_value_t = 0)]
        max_expressions: usize,

        /// Tag name for record field aliases
        #[arg(long, default_value = DEFAULT_TAG_NAME)]
        tag_name: String,
    },

    /// Show how an expression parses
    Dump {
        /// The expression to parse
        expression: String,

        /// Maximum number of match expressions (0 = unlimited)
        #[arg(long, default_value_t = 0)]
        max_expressions: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(io::stderr)
        .init();

    let result = match cli.command {
        Commands::Check {
            expression,
            input,
            pretty,
            syntax_only,
            filter,
            max_expressions,
            tag_name,
        } => run_check(CheckOptions {
            expression,
            input,
            pretty,
            syntax_only,
            filter,
            max_expressions,
            tag_name,
        }),
        Commands::Dump {
            expression,
            max_expressions,
        } => run_dump(&expression, max_expressions),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(mut options: CheckOptions) -> Result<(), CliError> {
    if options.input.is_none() && !options.syntax_only && !atty::is(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        options.input = Some(buffer);
    }

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Verdict(matched) => println!("{}", matched),
        CheckResult::Filtered(json) => println!("{}", json),
    }
    Ok(())
}

fn run_dump(expression: &str, max_expressions: usize) -> Result<(), CliError> {
    let dump = cli::execute_dump(expression, max_expressions)?;
    println!("{}", dump.canonical);
    println!("grouped: {}", dump.grouped);
    println!("match expressions: {}", dump.leaves);
    println!("{:#?}", dump.tree);
    Ok(())
}
