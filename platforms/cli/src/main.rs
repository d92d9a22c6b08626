use anyhow::{bail, Context, Result};
use clap::Parser;
use multitape::{
    analyze, run_case_with, Engine, RunConfig, RunReport, TableLoader, TableManager, Tape,
    TransitionTable, BLANK_SYMBOL, DEFAULT_CASE_SEPARATOR, DEFAULT_MAX_STEPS,
};
use std::io::{self, Read};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    /// The transition table file to execute
    #[clap(short, long, conflicts_with = "builtin")]
    table: Option<PathBuf>,

    /// Name of a bundled table to execute instead of a file
    #[clap(short, long)]
    builtin: Option<String>,

    /// File with one input case per line
    #[clap(short, long)]
    input: Option<PathBuf>,

    /// An input case; may be repeated. Takes precedence over --input
    #[clap(short, long)]
    case: Vec<String>,

    /// Step budget per case
    #[clap(short, long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Separator between tape segments of a multi-tape case
    #[clap(short, long, default_value_t = DEFAULT_CASE_SEPARATOR)]
    separator: char,

    /// Print every configuration of the machine
    #[clap(short = 'd', long)]
    trace: bool,

    /// Print one JSON report per case
    #[clap(short, long, conflicts_with = "trace")]
    json: bool,

    /// List the bundled tables and exit
    #[clap(short, long)]
    list: bool,

    /// Log filter used when RUST_LOG is not set
    #[clap(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    if cli.list {
        for name in TableManager::names() {
            println!("{name}");
        }
        return Ok(());
    }

    let table = load_table(&cli)?;
    for warning in analyze(&table) {
        tracing::warn!(%warning, "Table analysis");
    }

    let config = RunConfig {
        max_steps: cli.max_steps,
        separator: cli.separator,
    };

    for (index, case) in read_cases(&cli)?.iter().enumerate() {
        if cli.trace {
            println!("=== Input {}: {:?} ===", index + 1, case);
        }

        let result = run_case_with(&table, case, &config, |engine| {
            if cli.trace {
                print_configuration(engine);
            }
        });

        match result {
            Ok(report) if cli.json => {
                println!("{}", serde_json::to_string(&report)?);
            }
            Ok(report) => {
                if !cli.trace {
                    println!("=== Input {}: {:?} ===", index + 1, case);
                }
                print_report(&report);
            }
            Err(e) => eprintln!("Input {}: {}", index + 1, e),
        }
    }

    Ok(())
}

fn load_table(cli: &Cli) -> Result<TransitionTable> {
    match (&cli.table, &cli.builtin) {
        (Some(path), _) => TableLoader::load_table(path)
            .with_context(|| format!("failed to load table from {}", path.display())),
        (None, Some(name)) => match TableManager::by_name(name) {
            Some(bundled) => Ok(bundled.table.clone()),
            None => bail!(
                "unknown bundled table '{}' (available: {})",
                name,
                TableManager::names().join(", ")
            ),
        },
        (None, None) => bail!("either --table or --builtin is required"),
    }
}

/// Cases come from `--case`, then `--input`, then piped stdin.
fn read_cases(cli: &Cli) -> Result<Vec<String>> {
    if !cli.case.is_empty() {
        return Ok(cli.case.clone());
    }

    if let Some(path) = &cli.input {
        return TableLoader::load_cases(path)
            .with_context(|| format!("failed to read cases from {}", path.display()));
    }

    if atty::is(atty::Stream::Stdin) {
        bail!("no input cases: use --case, --input or pipe cases on stdin");
    }

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read cases from stdin")?;

    Ok(multitape::parse_cases(&input))
}

fn print_report(report: &RunReport) {
    println!("Outcome: {}", report.outcome);
    println!("Final state: {}", report.state);
    println!("Final tapes: {:?}", report.tapes);
    println!("Steps taken: {}", report.steps);
    println!();
}

fn print_configuration(engine: &Engine) {
    let read = engine
        .symbols()
        .iter()
        .map(|symbol| format!("'{symbol}'"))
        .collect::<Vec<_>>()
        .join(", ");
    println!("Turing machine state: ( {}, {} )", engine.current_state(), read);

    for (index, tape) in engine.tapes().iter().enumerate() {
        println!(
            "tape {}: I:{} S:{} Word: {}",
            index,
            tape.head() + 1,
            engine.step_count(),
            render_with_head(tape)
        );
    }
    println!();
}

/// Renders the written span of `tape`, widened to include the head, with the head cell
/// in brackets.
fn render_with_head(tape: &Tape) -> String {
    let head = tape.head();
    let (min, max) = tape
        .bounds()
        .map_or((head, head), |(min, max)| (min.min(head), max.max(head)));

    (min..=max)
        .map(|i| {
            let symbol = tape.get(i);
            if i == head {
                format!("[{symbol}]")
            } else if symbol == BLANK_SYMBOL {
                " ".to_string()
            } else {
                symbol.to_string()
            }
        })
        .collect()
}
