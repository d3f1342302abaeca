//! ink CLI: negation-free forward-chaining reasoner.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use ink_reason::config::EngineConfig;
use ink_reason::engine::{Engine, ProgramOutcome};
use ink_reason::export::Snapshot;
use ink_reason::kb::Statement;
use ink_reason::provenance::DerivationKind;
use ink_reason::syntax::Program;

#[derive(Parser)]
#[command(name = "ink", version, about = "Negation-free forward-chaining reasoner")]
struct Cli {
    /// Engine configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program and print one answer (⊤ or ?) per query.
    Run {
        /// Path to the program.
        file: PathBuf,

        /// Also print how every derived fact was obtained.
        #[arg(long)]
        explain: bool,
    },

    /// Parse and load a program without running it.
    Check {
        /// Path to the program.
        file: PathBuf,
    },

    /// Run a program and print the converged knowledge base as JSON.
    Export {
        /// Path to the program.
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    let mut engine = Engine::new(config);

    match cli.command {
        Commands::Run { file, explain } => {
            let program = read_program(&engine, &file)?;
            let lines = statement_lines(&program);
            let outcome = engine.execute_program(program.into_statements())?;

            for query in &outcome.answers {
                match &query.result {
                    Ok(answer) => println!("{answer}"),
                    Err(err) => {
                        eprintln!("line {}:", lines[query.index]);
                        eprintln!("{:?}", miette::Report::new(err.clone()));
                    }
                }
            }

            if explain {
                print_ledger(&engine);
            }
            report_rejections(&outcome, &lines)?;
        }

        Commands::Check { file } => {
            let program = read_program(&engine, &file)?;
            let lines = statement_lines(&program);
            let statements = program.into_statements();

            let mut counts = Counts::default();
            let mut rejected = Vec::new();
            for (index, statement) in statements.into_iter().enumerate() {
                counts.tally(&statement);
                if statement.is_query() {
                    continue;
                }
                if let Err(err) = engine.load(statement) {
                    rejected.push((index, err));
                }
            }

            println!("{}", file.display());
            println!("  verbs:            {}", counts.verbs);
            println!("  facts:            {}", counts.facts);
            println!("  classifications:  {}", counts.classifications);
            println!("  propositions:     {}", counts.propositions);
            println!("  rules:            {}", counts.rules);
            println!("  queries:          {}", counts.queries);
            println!("  rejected:         {}", rejected.len());

            let total = rejected.len();
            for (index, err) in rejected {
                eprintln!("line {}:", lines[index]);
                eprintln!("{:?}", miette::Report::new(err));
            }
            if total > 0 {
                miette::bail!("{total} statement(s) rejected");
            }
        }

        Commands::Export { file } => {
            let program = read_program(&engine, &file)?;
            let lines = statement_lines(&program);
            let outcome = engine.execute_program(program.into_statements())?;
            let json = Snapshot::capture(engine.kb())
                .to_json_pretty()
                .into_diagnostic()?;
            println!("{json}");
            report_rejections(&outcome, &lines)?;
        }
    }

    Ok(())
}

fn read_program(engine: &Engine, file: &Path) -> Result<Program> {
    let source = std::fs::read_to_string(file).into_diagnostic()?;
    let name = file.display().to_string();
    Ok(engine.parse(&name, &source)?)
}

fn statement_lines(program: &Program) -> Vec<usize> {
    program.iter().map(|s| s.line).collect()
}

fn report_rejections(outcome: &ProgramOutcome, lines: &[usize]) -> Result<()> {
    for rejected in &outcome.rejected {
        eprintln!("line {}:", lines[rejected.index]);
        eprintln!("{:?}", miette::Report::new(rejected.error.clone()));
    }
    if !outcome.rejected.is_empty() {
        miette::bail!("{} statement(s) rejected", outcome.rejected.len());
    }
    Ok(())
}

fn print_ledger(engine: &Engine) {
    let kb = engine.kb();
    let symbols = kb.symbols();
    if kb.provenance().is_empty() {
        println!("(nothing derived)");
        return;
    }
    println!("derivations:");
    for record in kb.provenance().iter() {
        let by = match record.kind {
            DerivationKind::Rule { rule } => kb
                .rules()
                .get(rule)
                .map_or_else(|| rule.to_string(), |r| r.render(symbols)),
            DerivationKind::Closure => "classification closure".to_string(),
        };
        println!(
            "  [round {}] {}  by {}",
            record.round,
            record.atom.render(symbols),
            by
        );
    }
}

#[derive(Default)]
struct Counts {
    verbs: usize,
    facts: usize,
    classifications: usize,
    propositions: usize,
    rules: usize,
    queries: usize,
}

impl Counts {
    fn tally(&mut self, statement: &Statement) {
        match statement {
            Statement::DeclareVerb(_) => self.verbs += 1,
            Statement::Fact(_) => self.facts += 1,
            Statement::Classification(_) => self.classifications += 1,
            Statement::Proposition(_) => self.propositions += 1,
            Statement::Rule(_) => self.rules += 1,
            Statement::Query(_) => self.queries += 1,
        }
    }
}
