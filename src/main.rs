use anyhow::{Context, Result};
use carpet::{
    format, normalize_tree, propagate_modifiers, to_json, CompositionEdge, CompositionRead,
    ModifierConflict, NodeRecord, ParseError, Workbench, WorkbenchConfig,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "carpet")]
#[command(about = "Parser, normalizer and store for Carpet phrase notation", long_about = None)]
struct Cli {
    /// Workbench config file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Lexicon file (JSON), overrides the config
    #[arg(short, long, global = true)]
    lexicon: Option<PathBuf>,

    /// Language to parse in, overrides the config
    #[arg(long, global = true)]
    lang: Option<String>,

    /// Dictionary file or directory (YAML), added after the config's
    #[arg(short, long, global = true)]
    dictionary: Vec<PathBuf>,

    /// Extra comma-separated words for the lexicon
    #[arg(short, long, global = true, value_delimiter = ',')]
    words: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a phrase
    Validate {
        /// Phrase to validate
        phrase: String,
    },
    /// Print a phrase in canonical notation
    Fmt {
        /// Phrase to format
        phrase: String,
    },
    /// Print the structured document of a phrase
    Doc {
        /// Phrase to parse
        phrase: String,
    },
    /// Push modifiers down onto primary and sole children
    Normalize {
        /// Phrase to normalize
        phrase: String,

        /// Normalize every level instead of only the root
        #[arg(long)]
        deep: bool,
    },
    /// Save a phrase to the store and load it back
    Store {
        /// Phrase to store
        phrase: String,

        /// Print the stored rows as JSON
        #[arg(long)]
        rows: bool,
    },
}

#[derive(Serialize)]
struct Rows<'a> {
    nodes: Vec<&'a NodeRecord>,
    edges: Vec<&'a CompositionEdge>,
}

fn workbench(cli: &Cli) -> Result<Workbench> {
    let mut config = match &cli.config {
        Some(path) => WorkbenchConfig::from_file(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => WorkbenchConfig::default(),
    };
    if let Some(lexicon) = &cli.lexicon {
        config.lexicon = Some(lexicon.clone());
    }
    if let Some(lang) = &cli.lang {
        config.language = lang.as_str().into();
    }
    config.dictionaries.extend(cli.dictionary.iter().cloned());
    config.words.extend(cli.words.iter().cloned());

    Ok(Workbench::open(config)?)
}

fn report(phrase: &str, err: &ParseError) -> ! {
    let span = err.span();
    let start = phrase.get(..span.start).map_or(0, |s| s.chars().count());
    let width = phrase
        .get(span.start..span.end)
        .map_or(1, |s| s.chars().count().max(1));
    eprintln!("✗ Parse error: {}", err);
    eprintln!("  {}", phrase);
    eprintln!("  {}{}", " ".repeat(start), "^".repeat(width));
    std::process::exit(1);
}

fn print_conflicts(conflicts: &[ModifierConflict]) {
    for conflict in conflicts {
        eprintln!(
            "warning: child {} already has '{}', kept '{}' on the parent",
            conflict.child_index, conflict.child_suffix, conflict.parent_suffix
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut bench = workbench(&cli)?;

    match cli.command {
        Commands::Validate { phrase } => match bench.parse(&phrase) {
            Ok(node) => {
                println!("✓ Phrase is valid ({} nodes)", node.size());
                Ok(())
            }
            Err(e) => report(&phrase, &e),
        },
        Commands::Fmt { phrase } => match bench.parse(&phrase) {
            Ok(node) => {
                println!("{}", format(&node));
                Ok(())
            }
            Err(e) => report(&phrase, &e),
        },
        Commands::Doc { phrase } => match bench.parse(&phrase) {
            Ok(node) => {
                println!("{}", to_json(&node)?);
                Ok(())
            }
            Err(e) => report(&phrase, &e),
        },
        Commands::Normalize { phrase, deep } => match bench.parse(&phrase) {
            Ok(mut node) => {
                let conflicts = if deep {
                    normalize_tree(&mut node)
                } else {
                    propagate_modifiers(&mut node)
                };
                print_conflicts(&conflicts);
                println!("{}", format(&node));
                for child in node.child_nodes() {
                    println!("  {}", format(child));
                }
                Ok(())
            }
            Err(e) => report(&phrase, &e),
        },
        Commands::Store { phrase, rows } => match bench.parse(&phrase) {
            Ok(node) => {
                let id = bench.save(&node)?;
                let store = bench.store();
                println!(
                    "Saved {} under {} ({} nodes, {} edges)",
                    format(&node),
                    id,
                    store.node_count(),
                    store.edge_count()
                );
                if rows {
                    let rows = Rows {
                        nodes: store.nodes().collect(),
                        edges: store.edges().collect(),
                    };
                    println!("{}", serde_json::to_string_pretty(&rows)?);
                }
                let loaded = bench.load(id)?;
                println!("Loaded {} with {} children", format(&loaded), store.child_edges(id).len());
                Ok(())
            }
            Err(e) => report(&phrase, &e),
        },
    }
}
