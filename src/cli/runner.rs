//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::TapConfig;
use crate::engine::{SyncConfig, SyncEngine};
use crate::error::{Error, Result};
use crate::http::{Fetcher, HttpClient};
use crate::output::JsonLinesSink;
use crate::stream::{Catalog, StreamRequest};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::Arc;
use tracing::{error, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command, writing messages to stdout
    pub async fn run(&self) -> Result<()> {
        self.run_to(std::io::stdout()).await
    }

    /// Run the CLI command, writing messages to `out`
    pub async fn run_to<W: Write + Send>(&self, mut out: W) -> Result<()> {
        match &self.cli.command {
            Commands::Spec => self.spec(&mut out),
            Commands::Check => self.check(&mut out).await,
            Commands::Discover => self.discover(&mut out),
            Commands::Read { streams, max_pages } => self.read(out, streams, *max_pages).await,
            Commands::Streams => self.streams(&mut out),
        }
    }

    /// Load configuration
    fn load_config(&self) -> Result<TapConfig> {
        TapConfig::load(self.cli.config.as_deref(), self.cli.config_json.as_deref())
    }

    /// Show configuration spec
    fn spec(&self, out: &mut impl Write) -> Result<()> {
        write_message(
            out,
            &json!({
                "type": "SPEC",
                "spec": TapConfig::spec()
            }),
        )
    }

    /// Check connection
    async fn check(&self, out: &mut impl Write) -> Result<()> {
        let config = self.load_config()?;
        let client = HttpClient::with_config(config.http_config())?;

        info!("Checking connection to {}", config.base_url);

        let status = match client.fetch(&StreamRequest::new("/campaigns")).await {
            Ok(_) => json!({
                "status": "SUCCEEDED",
                "message": "Connection successful"
            }),
            Err(e) => json!({
                "status": "FAILED",
                "message": format!("Connection failed: {e}")
            }),
        };

        write_message(
            out,
            &json!({
                "type": "CONNECTION_STATUS",
                "connectionStatus": status
            }),
        )
    }

    /// Discover streams
    fn discover(&self, out: &mut impl Write) -> Result<()> {
        let catalog = Catalog::customerio()?;

        let streams: Vec<Value> = catalog
            .streams()
            .iter()
            .map(|stream| {
                json!({
                    "stream": stream.name,
                    "parent": stream.parent,
                    "key_properties": stream.primary_keys,
                    "replication_key": stream.replication_key,
                    "schema": stream.schema.to_json()
                })
            })
            .collect();

        write_message(
            out,
            &json!({
                "type": "CATALOG",
                "catalog": { "streams": streams }
            }),
        )
    }

    /// List stream names
    fn streams(&self, out: &mut impl Write) -> Result<()> {
        let catalog = Catalog::customerio()?;

        let streams: Vec<Value> = catalog
            .streams()
            .iter()
            .map(|stream| json!({"name": stream.name, "parent": stream.parent}))
            .collect();

        write_message(
            out,
            &json!({
                "type": "STREAMS",
                "streams": streams
            }),
        )
    }

    /// Read data
    async fn read<W: Write + Send>(
        &self,
        out: W,
        streams: &[String],
        max_pages: Option<u32>,
    ) -> Result<()> {
        let config = self.load_config()?;

        let max_pages = max_pages.unwrap_or(config.max_pages);
        if max_pages == 0 {
            return Err(Error::invalid_value("max_pages", "must be at least 1"));
        }

        let mut sync_config = SyncConfig::new(config.date_window()?).with_max_pages(max_pages);
        if !streams.is_empty() {
            sync_config = sync_config.with_selected(streams.iter().cloned());
        }

        let client = HttpClient::with_config(config.http_config())?;
        let mut engine = SyncEngine::new(Arc::new(client), Catalog::customerio()?, sync_config);

        let mut sink = JsonLinesSink::new(out);
        let result = engine.run(&mut sink).await;
        // Records emitted before a failure are still delivered
        sink.flush()?;

        if let Err(e) = result {
            error!(transport = e.is_transport(), "Read aborted: {e}");
            return Err(e);
        }

        Ok(())
    }
}

/// Write one JSON message line
fn write_message(out: &mut impl Write, message: &Value) -> Result<()> {
    serde_json::to_writer(&mut *out, message)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
