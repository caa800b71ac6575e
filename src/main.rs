use std::sync::Arc;

use clap::{Parser, Subcommand};
use sheetstore::api::{run_api_server, ApiConfig};
use sheetstore::client::StoreClient;
use sheetstore::store::{MemStore, SsStore};
use sheetstore::web::{run_web_server, WebConfig};

#[derive(Parser)]
#[command(name = "sheetstore")]
#[command(about = "Shared spreadsheet store: REST sync service and form UI")]
#[command(long_about = "Sheetstore - shared spreadsheet store

COMMANDS:
  serve - Run the store REST service
  web   - Run the server-rendered form UI

EXAMPLES:
  sheetstore serve --port 2345
  sheetstore web --store-url http://localhost:2345
  curl http://localhost:2345/api/store/sheet1")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Run the store REST service.

Routes (all JSON, rooted at /api/store):
  GET    /api/store/{name}          - list [cellId, formula] pairs
  PUT    /api/store/{name}          - replace whole sheet (201)
  PATCH  /api/store/{name}          - update cells in place (204)
  DELETE /api/store/{name}          - clear sheet (204)
  PUT    /api/store/{name}/{cell}   - replace one cell (201)
  PATCH  /api/store/{name}/{cell}   - update one cell (204)
  DELETE /api/store/{name}/{cell}   - delete one cell (204)

Errors share the shape {status, error: {code, message}}.")]
    /// Run the store REST service
    Serve {
        /// Host address to bind to (use 0.0.0.0 for all interfaces)
        #[arg(short = 'H', long, default_value = "127.0.0.1", env = "SHEETSTORE_HOST")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8080", env = "SHEETSTORE_PORT")]
        port: u16,
    },

    #[command(long_about = "Run the server-rendered form UI.

Serves a landing page that opens a spreadsheet by name and an update page
that applies clear/delete/update/copy actions through the evaluation
engine. Backed by a remote store service when --store-url is given, or by
an in-process store otherwise.")]
    /// Run the server-rendered form UI
    Web {
        /// Host address to bind to
        #[arg(short = 'H', long, default_value = "127.0.0.1", env = "SHEETSTORE_HOST")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8081", env = "SHEETSTORE_WEB_PORT")]
        port: u16,

        /// Base URL of a store service backing the pages; in-memory when omitted
        #[arg(long, env = "SHEETSTORE_STORE_URL")]
        store_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheetstore=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            run_api_server(ApiConfig { host, port }, Arc::new(MemStore::new())).await
        }

        Commands::Web { host, port, store_url } => {
            let store: Arc<dyn SsStore> = match store_url {
                Some(url) => Arc::new(StoreClient::new(url)),
                None => Arc::new(MemStore::new()),
            };
            run_web_server(WebConfig { host, port }, store).await
        }
    }
}
