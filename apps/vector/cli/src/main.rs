//! Vector CLI
//!
//! Embeds text with Azure OpenAI and stores or queries the vectors in either
//! MongoDB Atlas vector search or Amazon S3 Vectors.

use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{EmbeddingConfig, Environment, FromEnv, MongoVectorConfig, S3VectorsConfig};
use domain_vector::{
    AzureOpenAIProvider, EmbeddingProvider, MetadataFilter, MongoVectorStore, S3VectorStore,
    VectorService, VectorStore,
};
use eyre::Result;
use serde::Serialize;
use serde_json::json;
use tracing::info;

mod movies;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// MongoDB Atlas vector search
    Mongo,
    /// Amazon S3 Vectors
    S3,
}

#[derive(Parser)]
#[command(name = "vector-cli")]
#[command(about = "Embed, store and query vectors in MongoDB Atlas or Amazon S3 Vectors")]
struct Cli {
    /// Vector backend to use
    #[arg(short, long, value_enum, default_value_t = Backend::Mongo, global = true)]
    backend: Backend,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed and batch-store the sample movie set
    Seed {
        /// Documents per backend write
        #[arg(long, default_value_t = 100)]
        batch_size: usize,

        /// Attempts per chunk before it is skipped
        #[arg(long, default_value_t = 3)]
        max_retries: u32,
    },

    /// Similarity search for a piece of text
    Query {
        text: String,

        /// Number of matches to return
        #[arg(short = 'k', long, default_value_t = 3)]
        top_k: u32,

        /// Only match movies of this genre
        #[arg(short, long)]
        genre: Option<String>,
    },

    /// Fetch one vector by key
    Get { key: String },

    /// Count stored vectors
    Count,

    /// Delete every stored vector
    DeleteAll {
        /// Log each key as it is deleted
        #[arg(short, long)]
        verbose: bool,
    },

    /// Compare two comma-separated vectors locally
    Distance(DistanceArgs),
}

#[derive(Args)]
struct DistanceArgs {
    // Qualified `Vec` so clap parses one value, not many
    /// First vector, e.g. `1,-2,3`
    #[arg(value_parser = parse_vector, allow_hyphen_values = true)]
    a: ::std::vec::Vec<f32>,

    /// Second vector
    #[arg(value_parser = parse_vector, allow_hyphen_values = true)]
    b: ::std::vec::Vec<f32>,

    /// cosine or euclidean
    #[arg(short, long, default_value = "cosine")]
    method: String,
}

fn parse_vector(raw: &str) -> Result<Vec<f32>, String> {
    raw.split(',')
        .map(|v| v.trim().parse::<f32>().map_err(|e| format!("invalid component {:?}: {}", v, e)))
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_distance(args: &DistanceArgs) -> Result<()> {
    let value = domain_vector::distance(&args.a, &args.b, &args.method)?;
    print_json(&json!({ "method": args.method, "distance": value }))
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let environment = Environment::from_env();
    init_tracing(&environment);

    let cli = Cli::parse();

    // Distance needs neither credentials nor a backend
    if let Commands::Distance(args) = &cli.command {
        return print_distance(args);
    }

    let embedder: Arc<dyn EmbeddingProvider> =
        Arc::new(AzureOpenAIProvider::new(EmbeddingConfig::from_env()?));
    info!(model = embedder.model(), "Embedding provider ready");

    match cli.backend {
        Backend::Mongo => {
            let store = MongoVectorStore::connect(&MongoVectorConfig::from_env()?).await?;
            if matches!(cli.command, Commands::Seed { .. }) {
                store.ensure_key_index().await?;
            }
            run(VectorService::new(store, embedder), cli.command).await
        }
        Backend::S3 => {
            let store = S3VectorStore::from_config(&S3VectorsConfig::from_env()?);
            run(VectorService::new(store, embedder), cli.command).await
        }
    }
}

async fn run<S: VectorStore>(service: VectorService<S>, command: Commands) -> Result<()> {
    info!(backend = service.repository().backend(), "Running command");

    match command {
        Commands::Seed {
            batch_size,
            max_retries,
        } => {
            let documents = movies::sample_movies();
            let report = service
                .batch_store(&documents, batch_size, max_retries)
                .await;
            print_json(&report)?;

            if !report.is_complete() {
                eyre::bail!(
                    "{} chunk(s) failed to store, starting at {:?}",
                    report.failed_starts.len(),
                    report.failed_starts
                );
            }
        }

        Commands::Query {
            text,
            top_k,
            genre,
        } => {
            let filter = genre.map(|genre| MetadataFilter::eq("genre", genre));
            let response = service.query(&text, top_k, filter).await;
            print_json(&response)?;
        }

        Commands::Get { key } => match service.get(&key).await {
            Some(record) => print_json(&record)?,
            None => eyre::bail!("No vector found with key {}", key),
        },

        Commands::Count => {
            print_json(&json!({ "count": service.count().await }))?;
        }

        Commands::DeleteAll { verbose } => {
            let deleted = service.delete_all(verbose).await;
            print_json(&json!({ "deleted": deleted }))?;
        }

        Commands::Distance(args) => print_distance(&args)?,
    }

    Ok(())
}
