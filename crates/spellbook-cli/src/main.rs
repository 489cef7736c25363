mod cli;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use owo_colors::OwoColorize;
use spellbook::{
    generate_variants, CardId, ComboId, FeatureId, GenerationConfig, Result, SpellbookError,
    SqliteStore, ThreadCount, UniqueId, Variant, VariantFilter, VariantStatus,
};

use cli::{Cli, Commands, OrderArg, StatusArg};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".bright_red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            database,
            max_cards,
            threads,
        } => {
            let mut config = config;
            if let Some(max_cards) = max_cards {
                config = config.with_max_cards(max_cards);
            }
            if let Some(threads) = threads {
                config = config.with_thread_count(thread_count(threads));
            }
            cmd_generate(&database, &config)
        }
        Commands::Show {
            database,
            unique_id,
        } => cmd_show(&database, &UniqueId::from_hex(unique_id)),
        Commands::List {
            database,
            status,
            all,
            card,
            feature,
            combo,
            order,
            desc,
        } => {
            let filter = list_filter(
                (!all).then_some(status),
                card,
                feature,
                combo,
                order,
                desc,
            );
            cmd_list(&database, &filter)
        }
        Commands::SetStatus {
            database,
            unique_id,
            status,
        } => {
            let store = SqliteStore::open(&database)?;
            store.set_status(&UniqueId::from_hex(unique_id), status.into())?;
            println!(
                "{} status set to {}",
                "✓".bright_green(),
                status_label(status.into())
            );
            Ok(())
        }
        Commands::ShowConfig => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<GenerationConfig> {
    let Some(path) = path else {
        return Ok(GenerationConfig::default());
    };
    let config = match path.extension().and_then(|ext| ext.to_str()) {
        Some("yaml") | Some("yml") => GenerationConfig::from_yaml_file(path)?,
        _ => GenerationConfig::load(path)?,
    };
    Ok(config)
}

fn thread_count(threads: usize) -> ThreadCount {
    match threads {
        0 => ThreadCount::Auto,
        1 => ThreadCount::None,
        n => ThreadCount::Count(n),
    }
}

fn cmd_generate(database: &Path, config: &GenerationConfig) -> Result<()> {
    spellbook::console::init();

    let mut store = SqliteStore::open(database)?;
    let summary = generate_variants(&mut store, config)?;
    let (added, restored, deleted) = summary.counts();
    println!(
        "Generated variants: {} added, {} restored, {} deleted",
        added.bright_green(),
        restored.bright_cyan(),
        deleted.bright_red()
    );
    for seed in &summary.failed_seeds {
        println!("  {} combo {} skipped", "!".bright_yellow(), seed);
    }
    Ok(())
}

fn cmd_show(database: &Path, unique_id: &UniqueId) -> Result<()> {
    let store = SqliteStore::open(database)?;
    let variant = store
        .variant(unique_id)?
        .ok_or_else(|| SpellbookError::Store(format!("variant not found: {unique_id}")))?;
    print_variant(&variant);
    Ok(())
}

fn list_filter(
    status: Option<StatusArg>,
    card: Option<i64>,
    feature: Option<i64>,
    combo: Option<i64>,
    order: OrderArg,
    descending: bool,
) -> VariantFilter {
    VariantFilter {
        status: status.map(VariantStatus::from),
        card: card.map(CardId),
        feature: feature.map(FeatureId),
        combo: combo.map(ComboId),
        order: order.into(),
        descending,
    }
}

fn cmd_list(database: &Path, filter: &VariantFilter) -> Result<()> {
    let store = SqliteStore::open(database)?;
    let variants = store.list_variants(filter)?;
    for variant in &variants {
        println!(
            "{}  {}  {}",
            variant.unique_id,
            status_label(variant.status),
            variant
                .includes
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    println!("{} variants", variants.len().bright_white().bold());
    Ok(())
}

fn print_variant(variant: &Variant) {
    let join = |ids: Vec<String>| ids.join(", ");
    println!("{}", variant.unique_id.bright_white().bold());
    println!("  status:   {}", status_label(variant.status));
    println!(
        "  cards:    {}",
        join(variant.includes.iter().map(|c| c.to_string()).collect())
    );
    println!(
        "  combos:   {}",
        join(variant.of.iter().map(|c| c.to_string()).collect())
    );
    println!(
        "  produces: {}",
        join(variant.produces.iter().map(|f| f.to_string()).collect())
    );
    if !variant.prerequisites.is_empty() {
        println!("\n{}", "Prerequisites".bright_cyan());
        println!("{}", variant.prerequisites);
    }
    if !variant.description.is_empty() {
        println!("\n{}", "Steps".bright_cyan());
        println!("{}", variant.description);
    }
}

fn status_label(status: VariantStatus) -> String {
    match status {
        VariantStatus::New => status.as_str().bright_blue().to_string(),
        VariantStatus::Ok => status.as_str().bright_green().to_string(),
        VariantStatus::NotWorking => status.as_str().bright_red().to_string(),
        VariantStatus::Restore => status.as_str().bright_yellow().to_string(),
    }
}
