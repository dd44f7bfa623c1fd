//! Command-line front end over [`Session`].

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use scout_core::{
    AppViewModel, ExportRequest, JobView, ResultsView, SearchKey, SessionPhase, WebsiteFilter,
};
use scout_logging::scout_info;

use crate::config::{ScoutConfig, CONFIG_FILENAME};
use crate::logging::{self, LogTarget};
use crate::session::Session;

#[derive(Parser, Debug)]
#[command(name = "scout", version, about = "Drive the map scraper service from the terminal")]
pub struct Cli {
    /// Config file; `./scout.ron` is used when present.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the service API, overriding config and environment.
    #[arg(long = "api-url", global = true)]
    pub api_url: Option<String>,

    #[arg(long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[arg(long = "log-to", value_enum, default_value_t = LogTarget::File, global = true)]
    pub log_to: LogTarget,

    /// Seconds to wait for a one-shot request.
    #[arg(long = "timeout", default_value_t = 30, global = true)]
    pub timeout_secs: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a scrape job.
    Scrape {
        keyword: String,
        location: String,
        /// Keep polling until the job finishes or Ctrl-C.
        #[arg(short, long)]
        watch: bool,
    },
    /// Show the status of an existing job.
    Status {
        keyword: String,
        location: String,
        #[arg(short, long)]
        watch: bool,
    },
    /// List stored businesses page by page, optionally for one keyword and location.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, requires = "location")]
        keyword: Option<String>,
        #[arg(long, requires = "keyword")]
        location: Option<String>,
    },
    /// Show the businesses found for one search.
    Search { keyword: String, location: String },
    /// Delete a business shown in the listing (or in a search, with --keyword/--location).
    Delete {
        id: String,
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Ask the service to write an export file.
    Export {
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long, value_enum)]
        website: Option<WebsiteArg>,
    },
    /// Show past searches.
    History,
    /// Check that the service answers.
    Ping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WebsiteArg {
    With,
    Without,
}

impl From<WebsiteArg> for WebsiteFilter {
    fn from(arg: WebsiteArg) -> Self {
        match arg {
            WebsiteArg::With => WebsiteFilter::With,
            WebsiteArg::Without => WebsiteFilter::Without,
        }
    }
}

/// Resolves config in order: defaults, file, environment, flags.
pub fn resolve_config(cli: &Cli) -> anyhow::Result<ScoutConfig> {
    let mut config = ScoutConfig::load(cli.config.as_deref())?
        .with_env(|name| std::env::var(name).ok());
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

/// Where the settings were read from, for the startup log.
fn config_source(cli: &Cli) -> String {
    match &cli.config {
        Some(path) => format!("loaded from {}", path.display()),
        None => format!("./{} if present, else defaults", CONFIG_FILENAME),
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    logging::initialize(cli.log_to, &config);
    scout_info!("Config: {}", config_source(&cli));
    scout_info!("scout starting against {}", config.api_url);

    let session = Session::new(&config).context("failed to set up the HTTP client")?;
    let within = Duration::from_secs(cli.timeout_secs.max(1));

    match cli.command {
        Command::Scrape {
            keyword,
            location,
            watch,
        } => {
            let key = session.submit_search(&keyword, &location)?;
            println!("Started scrape for {}", key);
            if watch {
                watch_job(&session).await?;
            } else {
                let view = session
                    .wait_until(within, |view| has_status(view, &key))
                    .await
                    .ok_or_else(|| anyhow!("timed out waiting for the job to start"))?;
                print_job(&view);
            }
        }
        Command::Status {
            keyword,
            location,
            watch,
        } => {
            let key = session.check_status(&keyword, &location)?;
            if watch {
                watch_job(&session).await?;
            } else {
                let view = session
                    .wait_until(within, |view| has_status(view, &key))
                    .await
                    .ok_or_else(|| anyhow!("timed out waiting for status of {}", key))?;
                print_job(&view);
            }
        }
        Command::List {
            page,
            keyword,
            location,
        } => {
            let filtered = match (keyword, location) {
                (Some(keyword), Some(location)) => {
                    session.filter_listing(&keyword, &location)?;
                    true
                }
                _ => false,
            };
            // Setting the filter already loads page 1.
            if !filtered || page != 1 {
                if filtered {
                    wait_for_results(&session, within).await?;
                }
                session.change_page(page)?;
            }
            let view = wait_for_results(&session, within).await?;
            print_results(&view.results);
        }
        Command::Search { keyword, location } => {
            session.check_status(&keyword, &location)?;
            let view = wait_for_results(&session, within).await?;
            session.stop_observing();
            print_results(&view.results);
        }
        Command::Delete {
            id,
            keyword,
            location,
            page,
        } => {
            match (keyword, location) {
                (Some(keyword), Some(location)) => {
                    session.check_status(&keyword, &location)?;
                }
                (None, None) => session.change_page(page)?,
                _ => bail!("--keyword and --location must be given together"),
            }
            let view = wait_for_results(&session, within).await?;
            session.stop_observing();
            if !view.results.ids().contains(&id.as_str()) {
                bail!("business {} is not in the loaded results", id);
            }
            if !session.delete_business(&id) {
                bail!("delete of {} was not issued", id);
            }
            let view = session
                .wait_until(within, |view| {
                    view.results.delete_error.is_some() || !view.results.ids().contains(&id.as_str())
                })
                .await
                .ok_or_else(|| anyhow!("timed out deleting {}", id))?;
            if let Some((_, err)) = &view.results.delete_error {
                bail!("delete failed: {}", err);
            }
            println!("Deleted {}", id);
        }
        Command::Export {
            keyword,
            location,
            website,
        } => {
            let request = match (keyword, location) {
                (None, None) => ExportRequest::all(),
                (keyword, location) => {
                    let key = SearchKey::parse(
                        keyword.as_deref().unwrap_or_default(),
                        location.as_deref().unwrap_or_default(),
                    )?;
                    ExportRequest::search(&key, website.map(WebsiteFilter::from))
                }
            };
            session.request_export(request)?;
            let view = session
                .wait_until(within, |view| !view.export.is_exporting)
                .await
                .ok_or_else(|| anyhow!("timed out waiting for the export"))?;
            if let Some(err) = &view.export.error {
                bail!("export failed: {}", err);
            }
            if let Some(result) = &view.export.result {
                println!(
                    "Exported {} records to {} ({})",
                    result.total_records, result.file_name, result.file_path
                );
            }
        }
        Command::History => {
            session.load_search_history();
            let view = session
                .wait_until(within, |view| !view.history.loading)
                .await
                .ok_or_else(|| anyhow!("timed out loading search history"))?;
            if let Some(err) = &view.history.error {
                bail!("history failed: {}", err);
            }
            for entry in &view.history.entries {
                let found = entry
                    .total_found
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "?".to_string());
                let when = entry
                    .last_scraped
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| "never".to_string());
                println!(
                    "{} in {}\tfound={}\tlast scraped {}",
                    entry.keyword, entry.location, found, when
                );
            }
        }
        Command::Ping => {
            session.test_service();
            let view = session
                .wait_until(within, |view| !view.probe.loading)
                .await
                .ok_or_else(|| anyhow!("timed out waiting for the service"))?;
            if let Some(err) = &view.probe.error {
                bail!("service check failed: {}", err);
            }
            if let Some(response) = &view.probe.response {
                println!("{}", serde_json::to_string_pretty(response)?);
            }
        }
    }
    Ok(())
}

/// True once the service has answered for `key` at least once.
fn has_status(view: &AppViewModel, key: &SearchKey) -> bool {
    view.phase != SessionPhase::Searching
        && view
            .job
            .as_ref()
            .is_some_and(|job| &job.key == key && job.answers > 0)
}

async fn wait_for_results(session: &Session, within: Duration) -> anyhow::Result<AppViewModel> {
    let view = session
        .wait_until(within, |view| !view.results.loading)
        .await
        .ok_or_else(|| anyhow!("timed out loading results"))?;
    if let Some(err) = &view.results.error {
        bail!("loading results failed: {}", err);
    }
    Ok(view)
}

/// Prints every status change until the job settles or the user interrupts.
async fn watch_job(session: &Session) -> anyhow::Result<()> {
    let mut views = session.subscribe();
    let mut last_line = String::new();
    loop {
        let finished = {
            let view = views.borrow_and_update();
            if let Some(job) = &view.job {
                let line = job_line(job);
                if line != last_line {
                    println!("{}", line);
                    last_line = line;
                }
            }
            view.job.as_ref().is_some_and(|job| job.status.is_terminal())
        };
        if finished {
            break;
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("Stopped watching");
                break;
            }
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    session.stop_observing();
    Ok(())
}

fn job_line(job: &JobView) -> String {
    let progress = match (&job.progress, job.percent) {
        (Some(progress), Some(percent)) => {
            format!(" {}/{} ({}%)", progress.processed, progress.total, percent)
        }
        _ => String::new(),
    };
    let error = job
        .error
        .as_ref()
        .map(|err| format!(" [last check failed: {}]", err))
        .unwrap_or_default();
    format!(
        "{} {:?}{} found={}{}",
        job.key, job.status, progress, job.total_found, error
    )
}

fn print_job(view: &AppViewModel) {
    match &view.job {
        Some(job) => {
            println!("{}", job_line(job));
            if let Some(at) = job.last_scraped_at {
                println!("Last scraped: {}", at.to_rfc3339());
            }
        }
        None => println!("No job"),
    }
}

fn print_results(results: &ResultsView) {
    println!("{} ({})", results.title, results.count);
    for row in &results.rows {
        let business = &row.business;
        let website = if row.has_website {
            business.website.as_deref().unwrap_or_default()
        } else {
            "-"
        };
        println!(
            "{}\t{}\t{}\t{}",
            business.id, business.name, business.address, website
        );
    }
    if let Some(pagination) = &results.pagination {
        if results.show_pager {
            println!(
                "Page {} of {} ({} total)",
                pagination.page, pagination.pages, pagination.total
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn config_source_names_the_file_read() {
        let cli = Cli::try_parse_from(["scout", "--config", "team.ron", "ping"]).unwrap();
        assert_eq!(config_source(&cli), "loaded from team.ron");

        let cli = Cli::try_parse_from(["scout", "history"]).unwrap();
        assert_eq!(config_source(&cli), "./scout.ron if present, else defaults");
    }

    #[test]
    fn list_filter_flags_come_in_pairs() {
        let cli = Cli::try_parse_from([
            "scout", "list", "--keyword", "coffee", "--location", "Austin",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::List { page: 1, keyword: Some(_), location: Some(_) }
        ));
        assert!(Cli::try_parse_from(["scout", "list", "--keyword", "coffee"]).is_err());
    }
}
