use bnf_sample::{Grammar, GrammarError, Sampler, SamplerConfig, read_grammar};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Generate random strings from a BNF grammar
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the grammar file
    grammar_file: PathBuf,

    /// Number of samples to generate
    #[arg(default_value_t = 1)]
    count: usize,

    /// Rule to start from, defaults to the first rule in the grammar
    #[arg(short, long)]
    rule: Option<String>,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Fail instead of recursing deeper than this many nested rules
    #[arg(long)]
    max_depth: Option<usize>,

    /// Print the parsed grammar instead of sampling it
    #[arg(long, value_enum)]
    emit: Option<Emit>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Emit {
    Bnf,
    Json,
}

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .format_timestamp(None)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("bnf-sample: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let grammar = load(&cli.grammar_file)?;
    info!(
        "Loaded {} rules from {}",
        grammar.len(),
        cli.grammar_file.display()
    );

    match cli.emit {
        Some(Emit::Bnf) => {
            println!("{}", grammar);
            return Ok(());
        }
        Some(Emit::Json) => {
            println!("{}", serde_json::to_string_pretty(&grammar)?);
            return Ok(());
        }
        None => {}
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let config = SamplerConfig {
        max_depth: cli.max_depth,
    };
    let sampler = Sampler::with_config(&grammar, config);

    for _ in 0..cli.count {
        let text = match &cli.rule {
            Some(rule) => sampler.sample(&mut rng, rule)?,
            None => sampler.sample_first(&mut rng)?,
        };
        println!("{}", text);
    }

    Ok(())
}

/// Read the grammar file, refusing grammars without any rules
fn load(path: &Path) -> Result<Grammar, Box<dyn Error>> {
    let file = File::open(path)?;
    match read_grammar(file) {
        Ok(grammar) if grammar.is_empty() => Err(GrammarError::EmptyGrammar.into()),
        Ok(grammar) => Ok(grammar),
        Err(err) => {
            warn!("{} rules were read before the error", err.partial.len());
            Err(err.into())
        }
    }
}
