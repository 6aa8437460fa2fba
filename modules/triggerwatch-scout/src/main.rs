use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ai_client::Gemini;
use triggerwatch_classifier::{PromptAssembler, PromptLimits, ReferenceSet, TriggerClassifier};
use triggerwatch_common::{summary_to_json, Config, MovieQuery, TriggerVocabulary};
use triggerwatch_scout::MovieAnalyzer;
use triggerwatch_sources::{HttpFetcher, ScriptLocator, SummaryLocator, WikipediaClient};

#[derive(Parser)]
#[command(name = "triggerwatch", version, about = "Detect content triggers in movies")]
struct Cli {
    /// Reference data directory (overrides TRIGGERWATCH_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Cap on script text sent to the classifier, in bytes
    #[arg(long, global = true)]
    max_script_chars: Option<usize>,

    /// Cap on summary text sent to the classifier, in bytes
    #[arg(long, global = true)]
    max_summary_chars: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the encyclopedia summary as JSON
    Summary {
        #[arg(long)]
        title: String,
        #[arg(long)]
        director: Option<String>,
        #[arg(long = "imdb-id")]
        imdb_id: Option<String>,
    },
    /// Print the screenplay text
    Script {
        #[arg(long)]
        title: String,
        #[arg(long = "imdb-id")]
        imdb_id: String,
    },
    /// Run the full pipeline and print the report as JSON
    Analyze {
        #[arg(long)]
        title: String,
        #[arg(long = "imdb-id")]
        imdb_id: String,
        #[arg(long)]
        director: Option<String>,
    },
    /// Print the trigger vocabulary
    Vocabulary,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if let Some(n) = cli.max_script_chars {
        config.max_script_chars = n;
    }
    if let Some(n) = cli.max_summary_chars {
        config.max_summary_chars = n;
    }
    config.log_redacted();

    match cli.command {
        Command::Summary {
            title,
            director,
            imdb_id,
        } => {
            let locator = summary_locator(&config)?;
            let result = locator
                .get_summary(&title, director.as_deref(), imdb_id.as_deref())
                .await;
            println!("{}", serde_json::to_string_pretty(&summary_to_json(&result))?);
        }
        Command::Script { title, imdb_id } => {
            let locator = ScriptLocator::standard(Arc::new(HttpFetcher::new(&config.user_agent)?));
            match locator.get_script(&MovieQuery::new(&title, &imdb_id)).await {
                Ok(script) => {
                    info!(source = script.source.as_str(), url = script.url.as_str(), "Script retrieved");
                    println!("{}", script.text);
                }
                Err(e) => bail!("no script for {title} ({imdb_id}): {e}"),
            }
        }
        Command::Analyze {
            title,
            imdb_id,
            director,
        } => {
            // The backend credential is only required here.
            let api_key = config.require_gemini_key()?.to_string();

            let reference = ReferenceSet::load(&config.data_dir)
                .with_context(|| format!("loading reference data from {}", config.data_dir.display()))?;
            let vocabulary = reference.vocabulary().clone();

            let mut gemini = Gemini::new(api_key, &config.gemini_model);
            if let Some(url) = &config.gemini_base_url {
                gemini = gemini.with_base_url(url);
            }
            let limits = PromptLimits {
                max_script_chars: config.max_script_chars,
                max_summary_chars: config.max_summary_chars,
            };
            let classifier =
                TriggerClassifier::new(Box::new(gemini), PromptAssembler::new(&reference, limits));

            let http = http_client(&config)?;
            let analyzer = MovieAnalyzer::new(
                summary_locator_with(&config, http.clone()),
                ScriptLocator::standard(Arc::new(HttpFetcher::with_client(http))),
                classifier,
                vocabulary,
            );

            let mut query = MovieQuery::new(title, imdb_id);
            if let Some(director) = director {
                query = query.with_director(director);
            }
            let analysis = analyzer.analyze(&query).await;
            println!(
                "{}",
                serde_json::to_string_pretty(&analysis.to_json(analyzer.vocabulary()))?
            );
        }
        Command::Vocabulary => {
            let vocabulary = TriggerVocabulary::load_from_dir(&config.data_dir)?;
            info!(version = vocabulary.version(), labels = vocabulary.len(), "Vocabulary loaded");
            for label in vocabulary.labels() {
                println!("{label}");
            }
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout carries only command output.
/// `LOG_FORMAT=json` switches to structured JSON lines.
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("triggerwatch=info".parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn http_client(config: &Config) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .build()
        .context("building HTTP client")
}

fn summary_locator(config: &Config) -> Result<SummaryLocator> {
    Ok(summary_locator_with(config, http_client(config)?))
}

fn summary_locator_with(config: &Config, http: reqwest::Client) -> SummaryLocator {
    SummaryLocator::new(Arc::new(WikipediaClient::new(
        http,
        &config.wikipedia_api_url,
        &config.wikidata_api_url,
    )))
}
