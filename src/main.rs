//! 命令行主程序入口

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use transync::env::{self, EnvVar};
use transync::translation::pipeline::{coverage, detect, load_source_strings};
use transync::translation::{
    prune_store, write_exports, Adapter, ConfigManager, LanguageOutcome, LanguageStatus, SyncConfig,
    SyncOptions, SyncOrchestrator, SyncPlan, SyncReport, TranslationError, TranslationResult,
    TranslationStore,
};

/// Incremental translation tracking and sync
#[derive(Parser, Debug)]
#[command(name = "transync", version, about)]
struct Cli {
    /// Config file (TOML or JSON); searched in default locations when omitted
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Translate new and missing strings, remove stale records, persist
    Sync {
        /// Source strings: JSON array, JSON object values, or one string per line
        #[arg(long, value_name = "PATH")]
        strings: PathBuf,
        /// Target language (repeatable); overrides the configured list
        #[arg(long = "lang", value_name = "LANG")]
        langs: Vec<String>,
        /// Print the plan without calling the adapter or writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Print translation coverage per language
    Status {
        #[arg(long, value_name = "PATH")]
        strings: PathBuf,
        #[arg(long = "lang", value_name = "LANG")]
        langs: Vec<String>,
    },
    /// Write <lang>.json export files from the store
    Export {
        /// Output directory; defaults to the configured export_dir
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
        #[arg(long = "lang", value_name = "LANG")]
        langs: Vec<String>,
    },
    /// Delete records whose text is no longer a source string
    Prune {
        #[arg(long, value_name = "PATH")]
        strings: PathBuf,
    },
    /// Write an example config file
    InitConfig {
        #[arg(default_value = "transync.toml")]
        path: PathBuf,
    },
    /// Print environment variable documentation
    EnvDocs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("Error: {}", error);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => env::core::LogLevel::get().unwrap_or_else(|_| "info".to_string()),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let level = level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    let no_color = env::core::NoColor::get().unwrap_or(false);

    // 日志写到 stderr，stdout 只输出报告
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(!no_color)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> TranslationResult<ExitCode> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Sync {
            strings,
            langs,
            dry_run,
        } => {
            let config = load_config(config_path, langs)?;
            run_sync(&config, &strings, dry_run).await
        }
        Command::Status { strings, langs } => {
            let config = load_config(config_path, langs)?;
            run_status(&config, &strings).await
        }
        Command::Export { out, langs } => {
            let config = load_config(config_path, langs)?;
            run_export(&config, out).await
        }
        Command::Prune { strings } => {
            // 清理不调用适配器，只需要存储路径
            let config = read_config(config_path)?;
            config.validate_store()?;
            let current = load_source_strings(&strings).await?;
            let deleted = prune_store(&config.store_path(), &current).await?;
            println!("Pruned {} stale record(s)", deleted);
            Ok(ExitCode::SUCCESS)
        }
        Command::InitConfig { path } => {
            if path.exists() {
                return Err(TranslationError::ConfigError(format!(
                    "{} already exists",
                    path.display()
                )));
            }
            ConfigManager::generate_example_config(&path)?;
            println!("Wrote example config to {}", path.display());
            Ok(ExitCode::SUCCESS)
        }
        Command::EnvDocs => {
            print!("{}", env::generate_env_docs());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// 读取配置（文件与环境变量），不做验证
fn read_config(path: Option<&Path>) -> TranslationResult<SyncConfig> {
    let manager = match path {
        Some(path) => ConfigManager::from_path(path)?,
        None => ConfigManager::new()?,
    };
    Ok(manager.into_config())
}

/// 加载配置并应用命令行语言覆盖
fn load_config(path: Option<&Path>, langs: Vec<String>) -> TranslationResult<SyncConfig> {
    let mut config = read_config(path)?;

    if !langs.is_empty() {
        config.target_langs = langs;
    }
    config.validate()?;
    Ok(config)
}

async fn run_sync(config: &SyncConfig, strings: &Path, dry_run: bool) -> TranslationResult<ExitCode> {
    let current = load_source_strings(strings).await?;
    let adapter = Adapter::from_config(config)?;
    let orchestrator = SyncOrchestrator::new(adapter, SyncOptions::from_config(config))
        .with_observer(|outcome: &LanguageOutcome| print_outcome(outcome));

    if dry_run {
        print_plan(&orchestrator.plan(&current).await);
        return Ok(ExitCode::SUCCESS);
    }

    let report = orchestrator.sync(&current).await?;
    print_report(&report);

    if report.failed().next().is_some() {
        return Ok(ExitCode::from(2));
    }
    if report.export_error.is_some() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_status(config: &SyncConfig, strings: &Path) -> TranslationResult<ExitCode> {
    let current = load_source_strings(strings).await?;
    let store = TranslationStore::load(&config.store_path()).await;
    let change_set = detect(&current, &store);

    println!("Store: {} record(s)", store.len());
    println!("Strings: {}", change_set.summary());
    for entry in coverage(&current, &store, &config.target_langs) {
        println!(
            "  {:<8} {:>5}/{:<5} {:>6.1}%{}",
            entry.lang,
            entry.translated,
            entry.total,
            entry.percent(),
            if entry.is_complete() { "" } else { "  incomplete" }
        );
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_export(config: &SyncConfig, out: Option<PathBuf>) -> TranslationResult<ExitCode> {
    let dir = out.or_else(|| config.export_dir()).ok_or_else(|| {
        TranslationError::ConfigError("no export directory: pass --out or set export_dir".to_string())
    })?;

    let store = TranslationStore::load(&config.store_path()).await;
    for path in write_exports(&store, &config.target_langs, &dir).await? {
        println!("Wrote {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}

fn print_outcome(outcome: &LanguageOutcome) {
    match &outcome.status {
        LanguageStatus::UpToDate => println!("  {}: up to date", outcome.lang),
        LanguageStatus::Translated {
            requested,
            merged,
            missing,
        } => {
            print!("  {}: translated {}/{}", outcome.lang, merged, requested);
            if *missing > 0 {
                print!(" ({} missing)", missing);
            }
            println!();
        }
        LanguageStatus::Failed { error } => println!("  {}: FAILED {}", outcome.lang, error),
    }
}

fn print_plan(plan: &SyncPlan) {
    println!("Strings: {}", plan.change_set.summary());
    for (lang, work) in &plan.work {
        println!("  {}: {} string(s) to translate", lang, work);
    }
    if plan.is_noop() {
        println!("Nothing to do");
    }
}

fn print_report(report: &SyncReport) {
    println!(
        "Strings: {} new, {} changed, {} unchanged",
        report.new_strings, report.changed_strings, report.unchanged_strings
    );
    println!(
        "Store: {} record(s), {} stale deleted",
        report.records, report.deleted
    );
    for path in &report.exported {
        println!("Exported {}", path.display());
    }
    if let Some(error) = &report.export_error {
        println!("Export failed: {}", error);
    }
}
