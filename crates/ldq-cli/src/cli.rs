use clap::{Args, Parser, Subcommand, ValueEnum};
use ldq_query::{CriterionOp, Direction};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser)]
#[command(name = "ldq")]
#[command(about = "ldq - compile LDPath criteria into SPARQL")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace); defaults to warn
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (toml, yaml or json)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Effective log level: explicit level, then --verbose, then warn
    pub fn level(&self) -> LevelFilter {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level.into(),
            (None, true) => LevelFilter::DEBUG,
            (None, false) => LevelFilter::WARN,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the SPARQL query for a criterion
    Compile(QueryArgs),

    /// Run a criterion against a fixture file and print matching resources
    Run {
        /// Fixture with one `<s> <p> <o> [<g>] .` statement per line
        data: PathBuf,

        #[command(flatten)]
        query: QueryArgs,
    },
}

/// Criterion and query modifiers shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Path expression, e.g. `oa:hasBody/rdf:value`
    pub path: String,

    /// Value the path must match (IRI, prefixed name, quoted or bare literal)
    #[arg(long)]
    pub value: Option<String>,

    /// How the value is matched
    #[arg(long, value_enum, default_value = "eq", requires = "value")]
    pub op: OpArg,

    /// Extra namespace prefix as `prefix=namespace`
    #[arg(short = 'p', long = "prefix", value_parser = parse_prefix)]
    pub prefixes: Vec<(String, String)>,

    /// Restrict matching to a named graph
    #[arg(short, long)]
    pub graph: Option<String>,

    /// Required `rdf:type` of results
    #[arg(short = 't', long = "type")]
    pub type_iri: Option<String>,

    /// Sort results by the value of this path
    #[arg(long)]
    pub order_by: Option<String>,

    /// Sort descending
    #[arg(long, requires = "order_by")]
    pub desc: bool,

    /// Maximum number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Number of results to skip
    #[arg(long)]
    pub offset: Option<usize>,
}

impl QueryArgs {
    pub fn direction(&self) -> Direction {
        if self.desc {
            Direction::Desc
        } else {
            Direction::Asc
        }
    }
}

/// Value comparison on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OpArg {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Contains,
}

impl From<OpArg> for CriterionOp {
    fn from(op: OpArg) -> Self {
        match op {
            OpArg::Eq => CriterionOp::Eq,
            OpArg::Ne => CriterionOp::Ne,
            OpArg::Lt => CriterionOp::Lt,
            OpArg::Le => CriterionOp::Le,
            OpArg::Gt => CriterionOp::Gt,
            OpArg::Ge => CriterionOp::Ge,
            OpArg::Contains => CriterionOp::Contains,
        }
    }
}

fn parse_prefix(raw: &str) -> Result<(String, String), String> {
    let (prefix, namespace) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected prefix=namespace, got '{}'", raw))?;
    if namespace.is_empty() {
        return Err(format!("empty namespace for prefix '{}'", prefix));
    }
    Ok((prefix.to_string(), namespace.to_string()))
}
