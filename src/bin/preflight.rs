use product_api::infra::logging;
use product_api::storage::ProductStore;
use product_api::{AppConfig, PostgresProductStore};

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight\n\
         \n\
         Reads .config.yaml (or CONFIG_FILE) and the environment:\n\
           DATABASE_URL (required), DATABASE_NAME, SERVER_HOST, SERVER_PORT\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    // Force-read config (nice error messages if missing)
    let config = AppConfig::load()?;
    let addr = config.server.bind_address();

    println!("> Preflight:");
    println!("  bind address={}", addr);
    println!("  database name={}", config.database.name);
    println!(
        "  timeouts: request={}s connect={}s shutdown grace={}s",
        config.server.request_timeout.as_secs(),
        config.database.connect_timeout.as_secs(),
        config.server.shutdown_grace.as_secs()
    );

    // Connect + ensure the collection exists
    let store = PostgresProductStore::connect(
        &config.database.connection_string,
        &config.database.name,
        config.database.max_connections,
        config.database.connect_timeout,
    )
    .await
    .map_err(|e| anyhow::anyhow!("Failed to connect to the product store: {}", e))?;
    println!("  Collection {} is present.", store.table());

    store.ping().await?;
    let count = store.find_all().await?.len();
    println!("  Store reachable, {} product(s) stored.", count);

    // Port availability
    match tokio::net::TcpListener::bind(&addr).await {
        Ok(_) => println!("  {} is free to bind.", addr),
        Err(e) => {
            return Err(anyhow::anyhow!("Cannot bind {}: {}", addr, e));
        }
    }

    println!("> Preflight OK.");
    Ok(())
}
