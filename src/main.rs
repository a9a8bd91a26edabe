/// Version injected at compile time via STACKSDK_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("STACKSDK_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use futures::TryStreamExt;
use serde_json::{Map, Value};
use stacksdk::cloud::format_error;
use stacksdk::resource::{get_all_schema_keys, get_schema, list_resources, FieldKind, ResourceSchema};
use stacksdk::{Config, ListQuery, Resource, Session};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Command line client for OpenStack-style cloud resources
#[derive(Parser, Debug)]
#[command(name = "stacksdk", version, about, long_about = None)]
struct Args {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print every known resource key
    Resources,

    /// List resources; URI parameters bind the path, other parameters filter
    List {
        /// Resource key, e.g. object_store.container
        key: String,
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        marker: Option<String>,
    },

    /// Fetch one resource
    Get {
        key: String,
        id: String,
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    /// Read the header attributes of one resource
    Head {
        key: String,
        /// Omitted for resources without an identifier (the account)
        id: Option<String>,
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
    },

    /// Delete one resource
    Delete {
        key: String,
        id: String,
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
        /// Succeed when the resource does not exist
        #[arg(long)]
        ignore_missing: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn parse_param(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    if key.is_empty() {
        return Err(format!("empty key in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// `--log-level` is the default directive; `RUST_LOG` directives refine it
fn log_filter(level: Level, directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .parse_lossy(directives.unwrap_or_default())
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(tracing_level, directives.as_deref()))
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("stacksdk {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("stacksdk").join("stacksdk.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".stacksdk").join("stacksdk.log");
    }
    PathBuf::from("stacksdk.log")
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _log_guard = match setup_logging(args.log_level) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Warning: logging disabled: {err:#}");
            None
        }
    };

    if let Err(err) = run(args).await {
        match err.downcast_ref::<stacksdk::Error>() {
            Some(sdk_err) => {
                tracing::error!("{:?}", sdk_err);
                eprintln!("Error: {}", format_error(sdk_err));
            }
            None => eprintln!("Error: {err:#}"),
        }
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    if let Command::Resources = args.command {
        for key in get_all_schema_keys() {
            println!("{key}");
        }
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load(),
    };
    let session = config.session()?;

    match args.command {
        Command::Resources => Ok(()),
        Command::List {
            key,
            params,
            limit,
            marker,
        } => list(&session, schema(&key)?, params, limit, marker).await,
        Command::Get { key, id, params } => {
            let mut resource = build(schema(&key)?, Some(&id), params)?;
            resource.fetch(&session).await?;
            print_json(&resource)
        }
        Command::Head { key, id, params } => {
            let mut resource = build(schema(&key)?, id.as_deref(), params)?;
            resource.head(&session).await?;
            print_json(&resource)
        }
        Command::Delete {
            key,
            id,
            params,
            ignore_missing,
        } => {
            let mut resource = build(schema(&key)?, Some(&id), params)?;
            resource.delete(&session, ignore_missing).await?;
            tracing::info!("Deleted {} {}", key, id);
            Ok(())
        }
    }
}

fn schema(key: &str) -> Result<&'static ResourceSchema> {
    get_schema(key).ok_or_else(|| {
        anyhow!(
            "unknown resource `{}` (known: {})",
            key,
            get_all_schema_keys().join(", ")
        )
    })
}

/// Instance addressed by `id` plus the URI parameters
fn build(schema: &'static ResourceSchema, id: Option<&str>, params: Vec<(String, String)>) -> Result<Resource> {
    let mut attrs: Vec<(String, Value)> = params
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();

    if let Some(id) = id {
        let id_attribute = schema
            .id_attribute
            .ok_or_else(|| anyhow!("{} is not addressed by id", schema.key))?;
        attrs.push((id_attribute.to_string(), Value::String(id.to_string())));
    }

    Ok(Resource::from_attrs(schema, attrs)?)
}

async fn list(
    session: &Session,
    schema: &'static ResourceSchema,
    params: Vec<(String, String)>,
    limit: Option<u32>,
    marker: Option<String>,
) -> Result<()> {
    let mut uri = Map::new();
    let mut query = ListQuery::new();

    for (key, value) in params {
        match schema.field(&key) {
            Some(field) if field.kind == FieldKind::Uri => {
                uri.insert(key, Value::String(value));
            }
            _ => query = query.filter(key, value),
        }
    }
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    if let Some(marker) = marker {
        query = query.marker(marker);
    }

    let mut items = list_resources(session, schema, uri, query)?;
    let mut count = 0usize;
    while let Some(item) = items.try_next().await? {
        print_json(&item)?;
        count += 1;
    }
    tracing::info!("Listed {} {}", count, schema.key);

    Ok(())
}

fn print_json(resource: &Resource) -> Result<()> {
    println!("{}", serde_json::to_string(resource)?);
    Ok(())
}
