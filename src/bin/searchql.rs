//! searchql — inspect and compile search queries
//!
//! # Usage
//!
//! ```bash
//! # Show the parsed expression
//! searchql parse 'title:rust price:>=10'
//!
//! # Canonical form
//! searchql fmt 'a b OR c'
//!
//! # Compile to SQL
//! searchql --field price:number sql 'laptop price:<1000' --column title --search-type tsvector
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use searchql::ast::Expression;
use searchql::parser::{parse_with_options, tokenize, TokenKind};
use searchql::prelude::*;
use searchql::SearchConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "searchql")]
#[command(version)]
#[command(about = "Parse, validate and compile search-box queries", long_about = None)]
#[command(after_help = "EXAMPLES:
    searchql parse 'title:rust AND (tag:IN(cli, web) OR stars:>=100)'
    searchql --field price:number fmt 'laptop price:10..50'
    searchql sql 'red shoes*' --column title --column body --search-type tsvector")]
struct Cli {
    /// Config file (defaults to ./searchql.toml, then the user config dir)
    #[arg(short, long, global = true, env = "SEARCHQL_CONFIG")]
    config: Option<PathBuf>,

    /// Declare a field as name:type (string, number, date, boolean). Replaces config fields.
    #[arg(long = "field", global = true)]
    fields: Vec<FieldSchema>,

    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "table")]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a query and print the expression tree
    Parse {
        query: String,
    },
    /// Print the canonical form of a query
    Fmt {
        query: String,
    },
    /// Compile a query to a parameterized SQL predicate
    Sql {
        query: String,

        /// Column searched by unscoped terms (repeatable). Replaces config columns.
        #[arg(long = "column")]
        columns: Vec<String>,

        /// Unscoped term matching strategy
        #[arg(long)]
        search_type: Option<SearchType>,
    },
    /// Print the token stream
    Tokens {
        query: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("searchql=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("searchql=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => SearchConfig::load(path)?,
        None => SearchConfig::discover().context("Failed to load configuration")?,
    };
    if !cli.fields.is_empty() {
        config.fields = cli.fields.clone();
    }

    match &cli.command {
        Commands::Parse { query } => {
            let expression = parse_or_report(query, &config)?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&expression)?),
                OutputFormat::Table => match &expression {
                    Some(expr) => print_tree(expr, 0),
                    None => println!("{}", "(empty query)".dimmed()),
                },
            }
        }
        Commands::Fmt { query } => {
            let expression = parse_or_report(query, &config)?;
            let text = expression.as_ref().map(serialize).unwrap_or_default();
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string(&text)?),
                OutputFormat::Table => println!("{}", text),
            }
        }
        Commands::Sql {
            query,
            columns,
            search_type,
        } => {
            if !columns.is_empty() {
                config.searchable_columns = columns.clone();
            }
            if let Some(search_type) = search_type {
                config.search_type = *search_type;
            }

            let expression = parse_or_report(query, &config)?;
            let search_query = SearchQuery { expression };
            let sql = search_query_to_sql(
                &search_query,
                &config.searchable_columns,
                &config.fields,
                &config.sql_options(),
            )?;

            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&sql)?),
                OutputFormat::Table => {
                    println!("{}", "Generated SQL:".green().bold());
                    println!("{}", sql.text.white());
                    if !sql.values.is_empty() {
                        println!();
                        println!("{}", "Bindings:".cyan());
                        for (i, value) in sql.values.iter().enumerate() {
                            println!("  ${} = {}", i + 1, value.yellow());
                        }
                    }
                }
            }
        }
        Commands::Tokens { query } => print_tokens(query, cli.format)?,
    }

    Ok(())
}

/// Parse with the configured fields and limits, printing diagnostics on failure.
fn parse_or_report(query: &str, config: &SearchConfig) -> anyhow::Result<Option<Expression>> {
    match parse_with_options(query, &config.fields, &config.parse_options()) {
        Ok(parsed) => Ok(parsed.expression),
        Err(err) => {
            print_diagnostics(query, &err.errors);
            anyhow::bail!("{} problem(s) in query", err.errors.len())
        }
    }
}

fn print_diagnostics(query: &str, errors: &[ValidationError]) {
    // Newlines and tabs would break the caret alignment.
    let line: String = query
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    let column = |byte: usize| query.get(..byte).map_or(byte, |s| s.chars().count());

    eprintln!("  {}", line);
    for error in errors {
        let start = column(error.position);
        let end = column(error.position + error.length);
        let width = end.saturating_sub(start).max(1);
        eprintln!(
            "  {}{} {} {}",
            " ".repeat(start),
            "^".repeat(width).red().bold(),
            error.code.to_string().red(),
            error.message
        );
    }
}

fn print_tree(expr: &Expression, depth: usize) {
    let indent = "  ".repeat(depth);
    match expr {
        Expression::SearchTerm { value } => {
            println!("{}{} {}", indent, "TERM".cyan(), value.yellow());
        }
        Expression::Wildcard { prefix, quoted } => {
            let quoted = if *quoted { " (quoted)" } else { "" };
            println!("{}{} {}*{}", indent, "WILDCARD".cyan(), prefix.yellow(), quoted.dimmed());
        }
        Expression::FieldValue { field, value } => {
            println!("{}{} {} = {}", indent, "FIELD".cyan(), field_label(field), value.yellow());
        }
        Expression::Range {
            field,
            operator,
            value,
            value2,
        } => match value2 {
            Some(upper) => println!(
                "{}{} {} {} {} AND {}",
                indent,
                "RANGE".cyan(),
                field_label(field),
                operator,
                value.yellow(),
                upper.yellow()
            ),
            None => println!(
                "{}{} {} {} {}",
                indent,
                "RANGE".cyan(),
                field_label(field),
                operator,
                value.yellow()
            ),
        },
        Expression::In { field, values } => {
            let values: Vec<String> = values.iter().map(|v| v.yellow().to_string()).collect();
            println!("{}{} {} ({})", indent, "IN".cyan(), field_label(field), values.join(", "));
        }
        Expression::And { left, right } => {
            println!("{}{}", indent, "AND".magenta().bold());
            print_tree(left, depth + 1);
            print_tree(right, depth + 1);
        }
        Expression::Or { left, right } => {
            println!("{}{}", indent, "OR".magenta().bold());
            print_tree(left, depth + 1);
            print_tree(right, depth + 1);
        }
        Expression::Not { expression } => {
            println!("{}{}", indent, "NOT".magenta().bold());
            print_tree(expression, depth + 1);
        }
    }
}

fn field_label(field: &Field) -> String {
    match field.field_type {
        Some(ty) => format!("{}{}", field.name.white().bold(), format!(":{}", ty).dimmed()),
        None => field.name.white().bold().to_string(),
    }
}

fn print_tokens(query: &str, format: OutputFormat) -> anyhow::Result<()> {
    let tokens = tokenize(query);

    match format {
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = tokens
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "kind": format!("{:?}", t.kind),
                        "position": t.position,
                        "length": t.length,
                        "text": t.text,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Table => {
            println!(
                "{:18} {:10} {}",
                "Kind".white().bold(),
                "Span".white().bold(),
                "Text".white().bold()
            );
            println!("{}", "─".repeat(48).dimmed());
            for token in &tokens {
                let kind = format!("{:?}", token.kind);
                let kind = match token.kind {
                    TokenKind::Invalid | TokenKind::UnterminatedString => kind.red(),
                    TokenKind::Keyword(_) => kind.magenta(),
                    TokenKind::Eof => kind.dimmed(),
                    _ => kind.cyan(),
                };
                let span = format!("{}..{}", token.position, token.end());
                println!("{:18} {:10} {}", kind, span, token.text.yellow());
            }
        }
    }

    Ok(())
}
