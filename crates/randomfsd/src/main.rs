//! `randomfsd`: the RandomFS daemon and command-line client.
//!
//! # Usage
//!
//! ```text
//! randomfsd serve                            # start the HTTP API on :8080
//! randomfsd serve -c randomfs.toml           # start with a config file
//! randomfsd --store file serve -p 9000       # offline mode, blocks under ./data
//! randomfsd store ./report.pdf               # store a file, print its rd:// locator
//! randomfsd retrieve rd://randomfs/v4/...    # rebuild a file from its locator
//! randomfsd retrieve <hash> -o out.bin       # ...or from its representation id
//! randomfsd parse rd://randomfs/v4/...       # show a locator's fields
//! randomfsd benchmark -n 200 -s 65536        # in-memory store/retrieve benchmark
//! ```

mod config;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use randomfs_engine::{RandomFs, RandomFsConfig};
use randomfs_http::{ENDPOINTS, HttpServer, HttpServerConfig};
use randomfs_store::{ContentStore, FileStore, IpfsStore, MemoryStore};
use randomfs_types::{ContentId, LOCATOR_SCHEME, Locator};
use tracing::{info, warn};

use config::{CliConfig, StoreBackend};

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "randomfsd",
    version,
    about = "RandomFS: files as randomized blocks on a content-addressed store"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true, env = "RANDOMFS_CONFIG")]
    config: Option<PathBuf>,

    /// Content store backend.
    #[arg(long, global = true, value_enum, env = "RANDOMFS_STORE")]
    store: Option<StoreBackend>,

    /// IPFS HTTP API URL.
    #[arg(long, global = true, env = "RANDOMFS_IPFS_API")]
    ipfs_api: Option<String>,

    /// Data directory for the file backend.
    #[arg(long, global = true, env = "RANDOMFS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Block cache size in bytes.
    #[arg(long, global = true, env = "RANDOMFS_CACHE_SIZE")]
    cache_size: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server.
    Serve {
        /// Listen address (e.g. "127.0.0.1:8080").
        #[arg(short = 'l', long, env = "RANDOMFS_LISTEN_ADDR")]
        listen_addr: Option<String>,

        /// Listen port; replaces the port of the listen address.
        #[arg(short, long, env = "RANDOMFS_PORT")]
        port: Option<u16>,

        /// Directory of static files served outside the API.
        #[arg(short, long, env = "RANDOMFS_WEB_DIR")]
        web_dir: Option<PathBuf>,
    },

    /// Store a file and print its locator.
    Store {
        /// File to store.
        path: PathBuf,

        /// MIME type recorded for the file.
        #[arg(short = 't', long, default_value = "application/octet-stream")]
        content_type: String,
    },

    /// Rebuild a file from an rd:// locator or a representation id.
    Retrieve {
        /// `rd://...` locator or bare representation id.
        target: String,

        /// Output path; defaults to the stored filename in the current directory.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse an rd:// locator and print its fields.
    Parse {
        locator: String,
    },

    /// Run a quick store/retrieve benchmark (in-memory).
    Benchmark {
        /// Number of files to store and retrieve.
        #[arg(short = 'n', long, default_value = "100")]
        count: usize,

        /// Size of each file in bytes.
        #[arg(short, long, default_value = "10240")]
        size: usize,
    },
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    setup_tracing(&config.log.level);

    // CLI args override config file values.
    if let Some(backend) = cli.store {
        config.store.backend = backend;
    }
    if let Some(api) = cli.ipfs_api {
        config.store.ipfs_api = api;
    }
    if let Some(dir) = cli.data_dir {
        config.store.data_dir = dir;
    }
    if let Some(bytes) = cli.cache_size {
        config.cache.max_bytes = bytes;
    }

    match cli.command {
        Commands::Serve {
            listen_addr,
            port,
            web_dir,
        } => {
            if let Some(addr) = listen_addr {
                config.server.listen_addr = addr;
            }
            if let Some(port) = port {
                config.server.listen_addr = with_port(&config.server.listen_addr, port)?;
            }
            if let Some(dir) = web_dir {
                config.server.web_dir = dir;
            }
            cmd_serve(config).await
        }
        Commands::Store { path, content_type } => cmd_store(&config, &path, &content_type).await,
        Commands::Retrieve { target, output } => {
            cmd_retrieve(&config, &target, output.as_deref()).await
        }
        Commands::Parse { locator } => cmd_parse(&locator),
        Commands::Benchmark { count, size } => cmd_benchmark(&config, count, size).await,
    }
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the config value.
fn setup_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Replace the port of a `host:port` listen address.
fn with_port(listen_addr: &str, port: u16) -> Result<String> {
    let mut addr: SocketAddr = listen_addr
        .parse()
        .with_context(|| format!("invalid listen address {listen_addr:?}"))?;
    addr.set_port(port);
    Ok(addr.to_string())
}

/// Open the configured content store.
///
/// The IPFS backend must answer a version request before the store is
/// handed out.
async fn build_store(config: &CliConfig) -> Result<Arc<dyn ContentStore>> {
    let store: Arc<dyn ContentStore> = match config.store.backend {
        StoreBackend::Ipfs => Arc::new(
            IpfsStore::connect(&config.store.ipfs_api, config.store_timeout())
                .await
                .with_context(|| {
                    format!("failed to connect to IPFS at {}", config.store.ipfs_api)
                })?,
        ),
        StoreBackend::File => Arc::new(
            FileStore::new(&config.store.data_dir).context("failed to open data directory")?,
        ),
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}

/// Build a RandomFS instance over the configured store.
async fn build_engine(config: &CliConfig) -> Result<Arc<RandomFs>> {
    let store = build_store(config).await?;
    let engine =
        RandomFs::new(config.engine_config(), store).context("failed to initialize RandomFS")?;
    Ok(Arc::new(engine))
}

// -----------------------------------------------------------------------
// randomfsd serve
// -----------------------------------------------------------------------

async fn cmd_serve(config: CliConfig) -> Result<()> {
    info!("starting randomfsd");
    info!(
        listen_addr = %config.server.listen_addr,
        backend = %config.store.backend,
        ipfs_api = %config.store.ipfs_api,
        data_dir = %config.store.data_dir.display(),
        cache_max_bytes = config.cache.max_bytes,
        eviction = %config.cache.eviction,
        web_dir = %config.server.web_dir.display(),
        "server configuration"
    );

    let engine = build_engine(&config).await?;

    let mut server_config = HttpServerConfig::new(engine);
    if let Some(limit) = config.server.max_upload_bytes {
        server_config.max_upload_bytes = limit;
    }
    if config.server.web_dir.is_dir() {
        server_config.web_dir = Some(config.server.web_dir.clone());
    } else {
        warn!(
            web_dir = %config.server.web_dir.display(),
            "web directory not found, serving the API only"
        );
    }

    for (route, what) in ENDPOINTS {
        info!("  {route:<32} {what}");
    }

    HttpServer::new(server_config)
        .serve_with_shutdown(&config.server.listen_addr, shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("randomfsd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

// -----------------------------------------------------------------------
// randomfsd store / retrieve / parse
// -----------------------------------------------------------------------

async fn cmd_store(config: &CliConfig, path: &Path, content_type: &str) -> Result<()> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let engine = build_engine(config).await?;
    let locator = engine
        .store_file(&filename, &data, content_type)
        .await
        .context("failed to store file")?;

    println!("{locator}");
    println!("  hash: {}", locator.representation_id);
    println!("  size: {} bytes", locator.file_size);
    Ok(())
}

/// Interpret a retrieve target as either a full locator or a bare id.
fn representation_id(target: &str) -> Result<ContentId> {
    if target.starts_with(&format!("{LOCATOR_SCHEME}://")) {
        let locator = Locator::parse(target)?;
        Ok(locator.representation_id)
    } else if target.is_empty() || target.contains('/') {
        bail!("{target:?} is neither an rd:// locator nor a representation id")
    } else {
        Ok(ContentId::from(target))
    }
}

async fn cmd_retrieve(config: &CliConfig, target: &str, output: Option<&Path>) -> Result<()> {
    let id = representation_id(target)?;
    let engine = build_engine(config).await?;
    let (data, rep) = engine
        .retrieve_file(&id)
        .await
        .with_context(|| format!("failed to retrieve {id}"))?;

    let path = match output {
        Some(path) => path.to_path_buf(),
        None if rep.filename.is_empty() => PathBuf::from(id.as_str()),
        None => PathBuf::from(&rep.filename),
    };
    tokio::fs::write(&path, &data)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!(
        "{} ({} bytes, {}) -> {}",
        rep.filename,
        data.len(),
        rep.content_type,
        path.display()
    );
    Ok(())
}

fn cmd_parse(raw: &str) -> Result<()> {
    let locator = Locator::parse(raw)?;
    println!("host:           {}", locator.host);
    println!("version:        {}", locator.version);
    println!("file size:      {}", locator.file_size);
    println!("file name:      {}", locator.file_name);
    println!("timestamp:      {}", locator.timestamp);
    println!("representation: {}", locator.representation_id);
    Ok(())
}

// -----------------------------------------------------------------------
// randomfsd benchmark
// -----------------------------------------------------------------------

async fn cmd_benchmark(config: &CliConfig, count: usize, size: usize) -> Result<()> {
    let cache_max_bytes = config.cache.max_bytes;

    println!("RandomFS Benchmark");
    println!("  files:      {count}");
    println!("  size:       {size} bytes each");
    println!("  cache:      {cache_max_bytes} bytes ({})", config.cache.eviction);
    println!();

    // In-memory setup: measures pure engine throughput.
    let engine = RandomFs::new(
        RandomFsConfig {
            cache_max_bytes,
            eviction: config.cache.eviction,
            ..RandomFsConfig::default()
        },
        Arc::new(MemoryStore::new()),
    )?;

    let data = generate_bench_data(size);
    let total_bytes = count as u64 * size as u64;

    // --- Store ---
    print!("Storing {count} files... ");
    let start = Instant::now();
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let locator = engine
            .store_file(&format!("bench-{i}.bin"), &data, "application/octet-stream")
            .await?;
        ids.push(locator.representation_id);
    }
    let write_dur = start.elapsed();
    let write_mbs = total_bytes as f64 / write_dur.as_secs_f64() / 1_048_576.0;
    println!("{:.2}s ({write_mbs:.1} MB/s)", write_dur.as_secs_f64());

    // --- Retrieve ---
    print!("Retrieving {count} files... ");
    let start = Instant::now();
    for id in &ids {
        let _ = engine.retrieve_file(id).await?;
    }
    let read_dur = start.elapsed();
    let read_mbs = total_bytes as f64 / read_dur.as_secs_f64() / 1_048_576.0;
    println!("{:.2}s ({read_mbs:.1} MB/s)", read_dur.as_secs_f64());

    let stats = engine.stats();
    println!();
    println!("Summary:");
    println!("  Store throughput:    {write_mbs:.1} MB/s");
    println!("  Retrieve throughput: {read_mbs:.1} MB/s");
    println!("  Blocks generated:    {}", stats.blocks_generated);
    println!(
        "  Cache hits/misses:   {}/{}",
        stats.cache_hits, stats.cache_misses
    );
    println!(
        "  Total data:          {:.1} MB",
        total_bytes as f64 / 1_048_576.0
    );

    Ok(())
}

/// Generate deterministic test data for benchmarking.
fn generate_bench_data(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state: u32 = 0xDEAD_BEEF;
    for _ in 0..size {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((state >> 16) as u8);
    }
    data
}
