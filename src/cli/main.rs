use std::{
    path::{Path, PathBuf},
    process::exit,
};

use clap::{Parser, Subcommand};
use color_eyre::{Section, config::HookBuilder, eyre};
use quill::{
    Article, Blog,
    config::{CONFIG_FILE, Config},
};
use serde::Serialize;
use tracing::{debug, error, level_filters::LevelFilter};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(about = "Query the articles of a static blog", long_about = None)]
#[command(version, author)]
struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit machine-readable JSON output
    #[arg(long, global = true)]
    json: bool,

    /// Path to the blog configuration (defaults to ./Blog.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all articles, newest first
    List,

    /// Print a single article
    Show { id: String },

    /// List the articles carrying a tag
    Tag { tag: String },

    /// Print one page of articles
    Page {
        /// Page number, starting at 1
        number: usize,
        #[arg(short, long, default_value_t = 10)]
        size: usize,
    },

    /// The most recently published articles
    Recent {
        #[arg(short, long, default_value_t = 5)]
        count: usize,
    },

    /// The most viewed articles according to the analytics report
    Trending,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    HookBuilder::default()
        .display_env_section(true)
        .panic_section("It looks like quill encountered a bug")
        .install()
        .expect("Failed to install color-eyre hook");

    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr);
    let filter_layer = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .with(tracing_error::ErrorLayer::default())
        .init();

    if let Err(err) = entry(cli).await {
        error!("{:#}", err);
        exit(1);
    }
}

async fn entry(cli: Cli) -> eyre::Result<()> {
    let config = load_config(cli.config.as_deref()).await?;
    let blog = Blog::from_config(&config);
    let output = Output { json: cli.json };

    match cli.command {
        Commands::List => {
            let articles = blog.get_all().await.note("Failed to load articles")?;
            output.articles(&articles)
        }
        Commands::Show { id } => {
            let Some(article) = blog.get_by_id(&id).await.note("Failed to load article")? else {
                return Err(eyre::eyre!("No article with id `{id}`")
                    .suggestion("Run `quill list` to see the available ids"));
            };
            output.article(&article)
        }
        Commands::Tag { tag } => {
            let articles = blog.get_by_tag(&tag).await?;
            output.articles(&articles)
        }
        Commands::Page { number, size } => {
            let page = blog.get_by_page(size, number).await?;
            if output.json {
                return output.emit_json(&page);
            }
            println!(
                "Page {} of {} ({} articles)",
                page.page_number(),
                page.total_pages(),
                page.total_items()
            );
            output.articles(page.items())
        }
        Commands::Recent { count } => {
            let articles = blog.get_most_recent(count).await?;
            output.articles(&articles)
        }
        Commands::Trending => {
            let articles = blog
                .get_trending()
                .await
                .note("Failed to resolve trending articles")?;
            if articles.is_empty() && !output.json {
                println!("Nothing is trending");
                return Ok(());
            }
            output.articles(&articles)
        }
    }
}

async fn load_config(path: Option<&Path>) -> eyre::Result<Config> {
    if let Some(path) = path {
        return Config::open(path)
            .await
            .note(format!("Can't open config `{}`", path.display()));
    }

    let default = Path::new(CONFIG_FILE);
    if default.is_file() {
        debug!("Using {}", CONFIG_FILE);
        return Config::open(default).await.note("Can't open config");
    }

    debug!("No {} found, using defaults", CONFIG_FILE);
    Ok(Config::default())
}

struct Output {
    json: bool,
}

impl Output {
    fn emit_json(&self, value: &impl Serialize) -> eyre::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn articles(&self, articles: &[Article]) -> eyre::Result<()> {
        if self.json {
            return self.emit_json(&articles);
        }

        if articles.is_empty() {
            println!("No articles");
            return Ok(());
        }

        for article in articles {
            println!(
                "• {} {} -> {}",
                article.published().date(),
                article.title().unwrap_or("(untitled)"),
                article.id()
            );
            if !article.tags().is_empty() {
                println!("  {}", article.tags().join(", "));
            }
        }
        Ok(())
    }

    fn article(&self, article: &Article) -> eyre::Result<()> {
        if self.json {
            return self.emit_json(article);
        }

        println!("{}", article.title().unwrap_or("(untitled)"));
        if let Some(author) = article.author() {
            println!("by {author}");
        }
        println!("published {}", article.published().date());
        if let Some(edited) = article.metadata().last_edited() {
            println!("edited {}", edited.date());
        }
        if !article.tags().is_empty() {
            println!("tags: {}", article.tags().join(", "));
        }
        println!();
        println!("{}", article.content());
        Ok(())
    }
}
