//! Colored console output for generation passes.
//!
//! Provides a `tracing` layer that formats Spellbook events with colors.
//!
//! ## Log Levels
//!
//! - **INFO**: Pass lifecycle (fetching, model building, enumeration, saving)
//! - **WARN**: Seeds skipped for a cyclic or too deep rule graph
//! - **DEBUG**: Per-seed and per-variant progress

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::Instant;

use num_format::{Locale, ToFormattedString};
use owo_colors::OwoColorize;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

static INIT: OnceLock<()> = OnceLock::new();
static EPOCH: OnceLock<Instant> = OnceLock::new();
static PASS_START_NANOS: AtomicU64 = AtomicU64::new(0);

/// Package version for banner display.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initializes console output.
///
/// Safe to call multiple times - only the first call has effect.
/// `RUST_LOG` overrides the default `spellbook=info` filter.
pub fn init() {
    INIT.get_or_init(|| {
        print_banner();

        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::WARN.into())
            .from_env_lossy();
        let filter = match "spellbook=info".parse() {
            Ok(directive) if std::env::var_os(EnvFilter::DEFAULT_ENV).is_none() => {
                filter.add_directive(directive)
            }
            _ => filter,
        };

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(SpellbookConsoleLayer)
            .try_init();
    });
}

fn mark_pass_start() {
    let epoch = EPOCH.get_or_init(Instant::now);
    let nanos = epoch.elapsed().as_nanos() as u64;
    PASS_START_NANOS.store(nanos, Ordering::Relaxed);
}

fn elapsed_secs() -> f64 {
    let Some(epoch) = EPOCH.get() else {
        return 0.0;
    };
    let start_nanos = PASS_START_NANOS.load(Ordering::Relaxed);
    let now_nanos = epoch.elapsed().as_nanos() as u64;
    now_nanos.saturating_sub(start_nanos) as f64 / 1_000_000_000.0
}

fn print_banner() {
    let banner = r#"
 ____             _ _ _                 _
/ ___| _ __   ___| | | |__   ___   ___ | | __
\___ \| '_ \ / _ \ | | '_ \ / _ \ / _ \| |/ /
 ___) | |_) |  __/ | | |_) | (_) | (_) |   <
|____/| .__/ \___|_|_|_.__/ \___/ \___/|_|\_\
      |_|
"#;

    let version_line = format!("               v{} - Combo Variant Generator\n", VERSION);

    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", banner.bright_cyan());
    let _ = writeln!(stdout, "{}", version_line.bright_white().bold());
    let _ = stdout.flush();
}

/// A tracing layer that formats Spellbook events with colors.
pub struct SpellbookConsoleLayer;

impl<S: Subscriber> Layer<S> for SpellbookConsoleLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if !metadata.target().starts_with("spellbook") {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let output = format_event(&visitor, *metadata.level());
        if !output.is_empty() {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    event: Option<String>,
    error: Option<String>,
    unique_id: Option<String>,
    status: Option<String>,
    seed: Option<u64>,
    seeds: Option<u64>,
    threads: Option<u64>,
    cards: Option<u64>,
    features: Option<u64>,
    combos: Option<u64>,
    variants: Option<u64>,
    failed_seeds: Option<u64>,
    sat_calls: Option<u64>,
    added: Option<u64>,
    restored: Option<u64>,
    deleted: Option<u64>,
    duration_ms: Option<u64>,
}

impl Visit for EventVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let s = format!("{:?}", value);
        let s = s.trim_matches('"').to_string();
        match field.name() {
            "event" => self.event = Some(s),
            "error" => self.error = Some(s),
            "unique_id" => self.unique_id = Some(s),
            "status" => self.status = Some(s),
            _ => {}
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        match field.name() {
            "seed" => self.seed = Some(value),
            "seeds" => self.seeds = Some(value),
            "threads" => self.threads = Some(value),
            "cards" => self.cards = Some(value),
            "features" => self.features = Some(value),
            "combos" => self.combos = Some(value),
            "variants" => self.variants = Some(value),
            "failed_seeds" => self.failed_seeds = Some(value),
            "sat_calls" => self.sat_calls = Some(value),
            "added" => self.added = Some(value),
            "restored" => self.restored = Some(value),
            "deleted" => self.deleted = Some(value),
            "duration_ms" => self.duration_ms = Some(value),
            _ => {}
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_u64(field, value as u64);
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "event" => self.event = Some(value.to_string()),
            "error" => self.error = Some(value.to_string()),
            "unique_id" => self.unique_id = Some(value.to_string()),
            "status" => self.status = Some(value.to_string()),
            _ => {}
        }
    }
}

fn format_event(v: &EventVisitor, level: Level) -> String {
    let event = v.event.as_deref().unwrap_or("");

    match event {
        "fetch_variants" => {
            mark_pass_start();
            format!(
                "{} {} Fetching variants",
                format_elapsed(),
                "▶".bright_green().bold()
            )
        }
        "build_model" => format_build_model(v),
        "enumeration_start" => format_enumeration_start(v),
        "enumeration_complete" => format_enumeration_complete(v),
        "seed_failed" => format_seed_failed(v),
        "save_variants" => format!(
            "{} {} Saving {} variants",
            format_elapsed(),
            "▶".bright_blue(),
            count(v.variants).bright_yellow()
        ),
        "delete_variants" => format!(
            "{} {} Deleting {} variants",
            format_elapsed(),
            "▶".bright_blue(),
            count(v.variants).bright_yellow()
        ),
        "generation_complete" => format_generation_complete(v),
        "variant_created" | "variant_updated" if level == Level::DEBUG => format_variant(v, event),
        _ => String::new(),
    }
}

fn count(value: Option<u64>) -> String {
    value.unwrap_or(0).to_formatted_string(&Locale::en)
}

fn format_elapsed() -> String {
    format!("{:>7.3}s", elapsed_secs())
        .bright_black()
        .to_string()
}

fn format_build_model(v: &EventVisitor) -> String {
    format!(
        "{} {} Building model │ {} cards │ {} features │ {} combos",
        format_elapsed(),
        "▶".bright_blue(),
        count(v.cards).bright_yellow(),
        count(v.features).bright_yellow(),
        count(v.combos).bright_yellow(),
    )
}

fn format_enumeration_start(v: &EventVisitor) -> String {
    format!(
        "{} {} Enumerating │ {} seeds │ {} threads",
        format_elapsed(),
        "▶".bright_blue(),
        count(v.seeds).bright_yellow(),
        count(v.threads).bright_yellow(),
    )
}

fn format_enumeration_complete(v: &EventVisitor) -> String {
    let mut output = format!(
        "{} {} Enumeration ended │ {} │ {} variants │ {} SAT calls",
        format_elapsed(),
        "◀".bright_blue(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow(),
        count(v.variants).white(),
        count(v.sat_calls).bright_magenta().bold(),
    );
    if let Some(failed) = v.failed_seeds.filter(|&n| n > 0) {
        output.push_str(&format!(
            " │ {} seeds failed",
            failed.to_formatted_string(&Locale::en).bright_red()
        ));
    }
    output
}

fn format_seed_failed(v: &EventVisitor) -> String {
    format!(
        "{} {} Seed {} skipped │ {}",
        format_elapsed(),
        "✗".bright_red(),
        v.seed.unwrap_or(0).bright_yellow(),
        v.error.as_deref().unwrap_or("rule graph error").red()
    )
}

fn format_variant(v: &EventVisitor, event: &str) -> String {
    let action = if event == "variant_created" {
        "created"
    } else {
        "updated"
    };
    let id = v.unique_id.as_deref().unwrap_or("");
    format!(
        "{} {} {} {} │ {}",
        format_elapsed(),
        "·".bright_black(),
        &id[..id.len().min(12)],
        action.bright_black(),
        v.status.as_deref().unwrap_or("").white()
    )
}

fn format_generation_complete(v: &EventVisitor) -> String {
    let mut output = format!(
        "{} {} Generation complete │ {}",
        format_elapsed(),
        "■".bright_cyan().bold(),
        format_duration_ms(v.duration_ms.unwrap_or(0)).yellow()
    );

    let rows = [
        ("Added:", count(v.added)),
        ("Restored:", count(v.restored)),
        ("Deleted:", count(v.deleted)),
        ("Failed seeds:", count(v.failed_seeds)),
    ];

    output.push_str("\n\n");
    output.push_str(
        &"╔══════════════════════════════════════════╗"
            .bright_cyan()
            .to_string(),
    );
    output.push('\n');
    for (label, value) in rows {
        output.push_str(&format!(
            "{}  {:<18}{:>20}  {}",
            "║".bright_cyan(),
            label,
            value,
            "║".bright_cyan()
        ));
        output.push('\n');
    }
    output.push_str(
        &"╚══════════════════════════════════════════╝"
            .bright_cyan()
            .to_string(),
    );
    output.push('\n');

    output
}

fn format_duration_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.2}s", ms as f64 / 1000.0)
    } else {
        let mins = ms / 60_000;
        let secs = (ms % 60_000) / 1000;
        format!("{}m {}s", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_ms() {
        assert_eq!(format_duration_ms(250), "250ms");
        assert_eq!(format_duration_ms(1500), "1.50s");
        assert_eq!(format_duration_ms(125_000), "2m 5s");
    }

    #[test]
    fn test_unknown_events_are_silent() {
        let visitor = EventVisitor {
            event: Some("model_built".to_string()),
            ..EventVisitor::default()
        };
        assert!(format_event(&visitor, Level::DEBUG).is_empty());
    }

    #[test]
    fn test_generation_summary_lists_counts() {
        let visitor = EventVisitor {
            event: Some("generation_complete".to_string()),
            added: Some(1234),
            restored: Some(2),
            deleted: Some(0),
            duration_ms: Some(40),
            ..EventVisitor::default()
        };
        let output = format_event(&visitor, Level::INFO);
        assert!(output.contains("Generation complete"));
        assert!(output.contains("1,234"));
        assert!(output.contains("Restored:"));
    }

    #[test]
    fn test_variant_lines_only_at_debug() {
        let visitor = EventVisitor {
            event: Some("variant_created".to_string()),
            unique_id: Some("3a316d6d3226f84c1e46".to_string()),
            status: Some("NEW".to_string()),
            ..EventVisitor::default()
        };
        assert!(format_event(&visitor, Level::INFO).is_empty());
        assert!(format_event(&visitor, Level::DEBUG).contains("3a316d6d3226"));
    }

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
    }
}
