use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use entity_manifest::flat::{self, LengthStats};
use entity_manifest::tree_render::{self, RenderOptions};
use entity_manifest::{document, tour};

const DEFAULT_OUTPUT: &str = "output.yaml";

#[derive(Parser)]
#[command(name = "entity-manifest")]
#[command(about = "Load, edit and save tagged YAML entity documents")]
struct Cli {
    /// Source document
    #[arg(
        short,
        long,
        global = true,
        env = "ENTITY_MANIFEST_FILE",
        default_value = "data.yaml"
    )]
    file: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect, edit and save the document, then analyze the result
    Tour {
        /// Where to write the edited document
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },
    /// Print the group and record hierarchy
    Tree {
        /// Also print each record's fields
        #[arg(long)]
        fields: bool,
    },
    /// Print every record as a JSON row
    Flatten {
        /// Keep rows whose ship_class contains this text
        #[arg(long)]
        class: Option<String>,

        /// Keep rows whose name contains this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,

        /// Longest ships first
        #[arg(long)]
        sort_by_length: bool,
    },
    /// Print length statistics as JSON
    Stats,
    /// List records where a field is missing or blank
    Check {
        #[arg(long, default_value = "manufacturer")]
        field: String,
    },
}

/// Initialize tracing with output to stderr (for JSON output) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "entity_manifest=info".into()),
    );

    if use_stderr {
        // JSON mode: log to stderr so stdout stays parseable
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = matches!(
        cli.command,
        Some(Commands::Flatten { .. }) | Some(Commands::Stats)
    );
    init_tracing(use_stderr);

    let mut collection = document::load(&cli.file)
        .with_context(|| format!("failed to load {}", cli.file.display()))?;

    let command = cli.command.unwrap_or(Commands::Tour {
        output: PathBuf::from(DEFAULT_OUTPUT),
    });

    match command {
        Commands::Tour { output } => {
            print_lines(tour::inspect(&collection)?);
            print_lines(tour::apply_edits(&mut collection)?);

            document::save(&output, &collection)
                .with_context(|| format!("failed to save {}", output.display()))?;

            print_lines(tour::analyze(&collection)?);
        }
        Commands::Tree { fields } => {
            print!(
                "{}",
                tree_render::render_tree(&collection, RenderOptions { fields })
            );
        }
        Commands::Flatten {
            class,
            search,
            sort_by_length,
        } => {
            let mut rows = collection.flatten();
            if let Some(class) = class {
                rows = flat::filter_class(&rows, &class);
            }
            if let Some(query) = search {
                rows = flat::search_names(&rows, &query);
            }
            if sort_by_length {
                flat::sort_by_length_desc(&mut rows);
            }
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Commands::Stats => match LengthStats::describe(&collection.flatten()) {
            Some(stats) => println!("{}", serde_json::to_string_pretty(&stats)?),
            None => println!("null"),
        },
        Commands::Check { field } => {
            let rows = collection.flatten();
            let missing = flat::missing_field(&rows, &field);
            for row in &missing {
                println!("Missing {}: {} ({})", field, row.name, row.group);
            }
            if !missing.is_empty() {
                anyhow::bail!("{} record(s) missing {}", missing.len(), field);
            }
        }
    }

    Ok(())
}
