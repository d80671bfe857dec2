use clap::{Parser as ClapParser, Subcommand};
use condex::cli::{self, CheckOptions, CheckResult, CliError};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "condex")]
#[command(about = "condex - evaluate conditions or compile them to template syntax")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression and print the result as JSON
    Eval {
        /// The expression to evaluate
        expression: String,

        /// Variables as a JSON object (reads from stdin if piped)
        #[arg(short, long)]
        vars: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print the expression as a template conditional
    Template {
        /// The expression to render
        expression: String,
    },

    /// Only validate syntax
    Check {
        /// The expression to check
        expression: String,
    },

    /// List the available builtin functions
    Functions,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Eval {
            expression,
            vars,
            pretty,
        } => run_eval(expression, vars, pretty),
        Commands::Template { expression } => {
            cli::render_template(&expression).map(|rendered| println!("{}", rendered))
        }
        Commands::Check { expression } => run_check(expression),
        Commands::Functions => {
            for name in cli::function_names() {
                println!("{}", name);
            }
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_eval(expression: String, vars: Option<String>, pretty: bool) -> Result<(), CliError> {
    let vars = match vars {
        Some(s) => Some(s),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = CheckOptions {
        expression,
        vars,
        syntax_only: false,
    };

    if let CheckResult::Success(output) = cli::execute_check(&options)? {
        let json = if pretty {
            serde_json::to_string_pretty(&output)
        } else {
            serde_json::to_string(&output)
        }?;
        println!("{}", json);
    }
    Ok(())
}

fn run_check(expression: String) -> Result<(), CliError> {
    let options = CheckOptions {
        expression,
        vars: None,
        syntax_only: true,
    };

    if let CheckResult::SyntaxValid = cli::execute_check(&options)? {
        println!("Syntax is valid");
    }
    Ok(())
}
