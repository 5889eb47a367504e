mod output;

use anyhow::{Context, bail};
use chatscout_core::config::{ChatscoutConfig, ConfigLoader, StrategyKind};
use chatscout_core::model::Role;
use chatscout_core::page::PageDriver;
use chatscout_core::reporter::Reporter;
use chatscout_core::strategy::{
    AutoDetect, ClickLearn, DetectionStrategy, ManualSelectors, SmartAutoDetect, detect_framework,
};
use chatscout_core::validator::page_structure;
use chatscout_h::HeadlessBrowser;
use clap::{Parser, Subcommand};
use output::OutputFormat;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chatscout", version, about = "Detect CSS selectors of chatbot web UIs")]
struct Args {
    /// Chatbot page to open
    url: String,

    #[command(subcommand)]
    mode: Option<Mode>,

    /// Configuration file (defaults to ./chatscout.yaml, then ~/.chatscout/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Launch browser in visible mode (not headless)
    #[arg(long, global = true)]
    visible: bool,

    /// Where to write the selector map
    #[arg(long, global = true)]
    out: Option<PathBuf>,

    /// Write confidence, method and alternatives for each selector
    #[arg(long, global = true)]
    detailed: bool,

    /// Write JSON instead of YAML
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Mode {
    /// Match the page against the built-in pattern catalog
    Auto {
        /// Identify the chatbot framework first
        #[arg(long)]
        smart: bool,
    },
    /// Click each element in a visible browser window
    Learn {
        /// Seconds allowed for each click
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Do not outline elements under the pointer
        #[arg(long)]
        no_highlight: bool,
    },
    /// Check selectors you already know
    Manual {
        #[arg(long)]
        textarea: String,
        #[arg(long)]
        submit_button: String,
        #[arg(long)]
        bot_messages: String,
        #[arg(long)]
        thread_container: Option<String>,
    },
    /// Print the page structure and detected framework
    Inspect,
}

#[derive(Serialize)]
struct Inspection {
    url: String,
    title: String,
    framework: String,
    structure: chatscout_core::validator::PageStructure,
}

/// Accept bare hosts (`example.com/chat`) as well as full URLs.
fn normalize_url(raw: &str) -> anyhow::Result<String> {
    let parsed = match url::Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => url::Url::parse(&format!("https://{}", raw))
            .with_context(|| format!("invalid url: {}", raw))?,
        Err(e) => return Err(e).with_context(|| format!("invalid url: {}", raw)),
    };
    Ok(parsed.to_string())
}

fn default_mode(config: &ChatscoutConfig) -> anyhow::Result<Mode> {
    Ok(match config.detection.strategy {
        StrategyKind::Auto => Mode::Auto {
            smart: config.detection.smart,
        },
        StrategyKind::Click => Mode::Learn {
            timeout_secs: None,
            no_highlight: false,
        },
        StrategyKind::Manual => bail!("manual detection needs selectors: use the `manual` subcommand"),
    })
}

fn console_reporter() -> Arc<dyn Reporter> {
    Arc::new(|msg: &str| println!("{}", msg))
}

/// Per-click timeout: `learn --timeout-secs` wins over the config.
fn capture_timeout(mode: Option<&Mode>, config: &ChatscoutConfig) -> Duration {
    match mode {
        Some(Mode::Learn {
            timeout_secs: Some(secs),
            ..
        }) => Duration::from_secs(*secs),
        _ => config.capture.timeout(),
    }
}

/// Strategy for a detection mode; `None` for `inspect`, which detects nothing.
fn build_strategy(
    mode: Mode,
    page: Arc<dyn PageDriver>,
    config: &ChatscoutConfig,
) -> Option<Box<dyn DetectionStrategy>> {
    let timeout = capture_timeout(Some(&mode), config);
    let strategy: Box<dyn DetectionStrategy> = match mode {
        Mode::Auto { smart } if smart || config.detection.smart => {
            Box::new(SmartAutoDetect::new(page))
        }
        Mode::Auto { .. } => Box::new(AutoDetect::new(page)),
        Mode::Learn { no_highlight, .. } => Box::new(
            ClickLearn::new(page)
                .with_timeout(timeout)
                .with_host_grace(config.capture.host_grace())
                .with_highlight(config.capture.highlight && !no_highlight)
                .with_reporter(console_reporter()),
        ),
        Mode::Manual {
            textarea,
            submit_button,
            bot_messages,
            thread_container,
        } => {
            let mut selectors = vec![
                (Role::Textarea, textarea),
                (Role::SubmitButton, submit_button),
                (Role::BotMessages, bot_messages),
            ];
            selectors.extend(thread_container.map(|s| (Role::ThreadContainer, s)));
            Box::new(ManualSelectors::new(page, selectors))
        }
        Mode::Inspect => return None,
    };
    Some(strategy)
}

async fn inspect(
    page: &dyn PageDriver,
    url: String,
    title: String,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let inspection = Inspection {
        url,
        title,
        framework: detect_framework(page).await.to_string(),
        structure: page_structure(page).await,
    };
    println!("{}", output::render(&inspection, format)?);
    Ok(())
}

async fn run(args: Args, browser: &mut HeadlessBrowser, config: &ChatscoutConfig) -> anyhow::Result<bool> {
    let url = normalize_url(&args.url)?;
    let nav = browser.navigate(&url).await?;
    info!("Loaded {} ({})", nav.url, nav.title);
    let page: Arc<dyn PageDriver> = browser.page()?;

    let out = args.out.unwrap_or_else(|| config.output.path.clone());
    let format = OutputFormat::for_path(&out, args.json);
    let mode = match args.mode {
        Some(mode) => mode,
        None => default_mode(config)?,
    };

    let Some(strategy) = build_strategy(mode, page.clone(), config) else {
        inspect(page.as_ref(), nav.url, nav.title, format).await?;
        return Ok(true);
    };
    info!("Running {} detection", strategy.name());
    let result = strategy.detect().await;

    for line in output::summary_lines(&result) {
        println!("{}", line);
    }
    output::write_selectors(
        &out,
        &result.selectors,
        args.detailed || config.output.detailed,
        format,
    )?;
    println!("Selettori salvati in {}", out.display());

    Ok(result.success())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr; stdout carries instructions and results.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from(path)
            .await
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ConfigLoader::load_default().await?,
    };
    // Click learning is pointless without a window to click in.
    let learning = matches!(args.mode, Some(Mode::Learn { .. }))
        || (args.mode.is_none() && config.detection.strategy == StrategyKind::Click);
    config.browser.visible |= args.visible || learning;

    let mut browser = HeadlessBrowser::from_config(&config.browser).with_capture_timeout(
        capture_timeout(args.mode.as_ref(), &config),
        config.capture.host_grace(),
    );
    if let Err(e) = browser.launch().await {
        eprintln!("Failed to launch browser: {}", e);
        return Err(e.into());
    }

    let outcome = run(args, &mut browser, &config).await;
    browser.close().await?;

    Ok(if outcome? {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
