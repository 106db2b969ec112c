use std::sync::Arc;

use clap::{Arg, ArgAction, Command};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use villagestay_translate::backend::{BackendKind, Connectivity};
use villagestay_translate::{
    FilePreferences, HostEnvironment, MockBackend, MockMode, PreferenceStore, TranslationConfig,
    TranslationEngine, find_language, normalize_language,
};

async fn read_stdin_lines() -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut texts = Vec::new();
    while let Some(line) = lines.next_line().await? {
        texts.push(line);
    }
    Ok(texts)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("villagestay-translate")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate VillageStay interface text with the best available backend")
        .arg(
            Arg::new("target")
                .help("Target language code (e.g., hi, ta, bn)")
                .required_unless_present_any(["status", "remember"])
                .index(1),
        )
        .arg(
            Arg::new("text")
                .help("Texts to translate; read line by line from stdin when omitted")
                .num_args(0..)
                .index(2),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .short('s')
                .help("Source language code (default: en)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("JSON configuration file"),
        )
        .arg(
            Arg::new("remember")
                .long("remember")
                .short('r')
                .help(
                    "Preference file; the target language is saved there and reused when omitted",
                ),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use a mock backend instead of real services")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("offline")
                .long("offline")
                .help("Treat the network as unreachable; only the offline dictionary is used")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("status")
                .long("status")
                .help("Print backend availability as JSON and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log backend selection and cache activity")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_level.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let mut config = match matches.get_one::<String>("config") {
        Some(path) => TranslationConfig::from_file(path)?,
        None => TranslationConfig::from_env()?,
    };
    if let Some(source) = matches.get_one::<String>("source") {
        config.source_language = normalize_language(source)?;
    }

    let engine = if matches.get_flag("mock") {
        TranslationEngine::builder()
            .with_config(&config)
            .backend(Arc::new(
                MockBackend::new(BackendKind::Online, MockMode::Suffix).with_batching(),
            ))
            .build()
    } else {
        let host = HostEnvironment {
            connectivity: Connectivity::new(!matches.get_flag("offline")),
            ..HostEnvironment::default()
        };
        TranslationEngine::from_config(&config, host)?
    };
    engine.initialize().await;

    if matches.get_flag("status") {
        let status = engine.get_status();
        let tier = status.tier(false);
        let report = json!({
            "status": status,
            "tier": tier,
            "description": tier.description(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let preferences = matches
        .get_one::<String>("remember")
        .map(|path| FilePreferences::with_key(path, config.preference_key.clone()));
    let target = match (matches.get_one::<String>("target"), &preferences) {
        (Some(target), _) => normalize_language(target)?,
        (None, Some(store)) => store
            .load_language()?
            .ok_or("no remembered language, pass a target language")?,
        (None, None) => return Err("missing target language".into()),
    };
    if find_language(&target).is_none() {
        tracing::warn!("'{}' is not one of the VillageStay languages", target);
    }
    if let Some(store) = &preferences {
        store.save_language(&target)?;
    }

    let texts: Vec<String> = match matches.get_many::<String>("text") {
        Some(values) => values.cloned().collect(),
        None => read_stdin_lines().await?,
    };

    if verbose {
        eprintln!("🌍 {} → {}", config.source_language, target);
        eprintln!("📦 {} texts", texts.len());
    }

    for translation in engine.translate_batch(&texts, &target).await {
        println!("{}", translation);
    }

    if verbose {
        let stats = engine.cache().stats();
        eprintln!(
            "✅ Cache: {} entries, {} hits, {} misses",
            stats.entries, stats.hits, stats.misses
        );
    }

    Ok(())
}
