use chatscout_core::validator::{ProbeAction, probe};
use chatscout_h::HeadlessBrowser;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Action {
    Visibility,
    Clickable,
    Fillable,
}

impl From<Action> for ProbeAction {
    fn from(action: Action) -> Self {
        match action {
            Action::Visibility => ProbeAction::Visibility,
            Action::Clickable => ProbeAction::Clickable,
            Action::Fillable => ProbeAction::Fillable,
        }
    }
}

/// Probe CSS selectors against a page in headless Chromium.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Page to open
    url: String,

    /// Selector to probe (repeatable)
    #[arg(short, long = "selector", required = true)]
    selectors: Vec<String>,

    /// What a selector must satisfy to count as valid
    #[arg(long, value_enum, default_value = "visibility")]
    action: Action,

    /// Show the browser window
    #[arg(long)]
    visible: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut browser = HeadlessBrowser::new_with_visibility(args.visible);
    browser.launch().await?;
    let nav = browser.navigate(&args.url).await?;
    eprintln!("Opened {} ({})", nav.url, nav.title);

    let page = browser.page()?;
    let mut all_valid = true;
    for selector in &args.selectors {
        let result = probe(page.as_ref(), selector, args.action.into()).await;
        all_valid &= result.valid;
        println!(
            "{}",
            serde_json::json!({ "selector": selector, "result": result })
        );
    }

    browser.close().await?;
    if !all_valid {
        std::process::exit(1);
    }
    Ok(())
}
