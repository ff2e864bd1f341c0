//! Tracing setup shared by the CRM binaries and test harnesses.

use anyhow::Result;
use once_cell::sync::OnceCell;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{self as sdk, Resource};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: OnceCell<()> = OnceCell::new();

/// Filter used when neither the config nor `RUST_LOG` provides one.
pub const DEFAULT_FILTER: &str = "info,sqlx=warn,sea_orm=warn";

/// Configuration for tracing initialization.
#[derive(Clone, Debug)]
pub struct ObsConfig {
    pub service_name: &'static str,
    pub env_filter: Option<String>,
    pub otlp_endpoint: Option<String>,
}

impl Default for ObsConfig {
    fn default() -> Self {
        Self {
            service_name: "crm",
            env_filter: None,
            otlp_endpoint: None,
        }
    }
}

impl ObsConfig {
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.env_filter = filter;
        self
    }

    pub fn with_otlp_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.otlp_endpoint = endpoint;
        self
    }

    /// Filter precedence: explicit config, then `RUST_LOG`, then [`DEFAULT_FILTER`].
    pub fn resolved_filter(&self) -> String {
        self.env_filter
            .clone()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string())
    }

    /// Explicit config first, then `OTLP_ENDPOINT`. Blank values count as unset.
    pub fn resolved_otlp_endpoint(&self) -> Option<String> {
        let configured = self.otlp_endpoint.as_deref().map(str::trim);
        configured
            .filter(|endpoint| !endpoint.is_empty())
            .map(str::to_string)
            .or_else(|| {
                std::env::var("OTLP_ENDPOINT")
                    .ok()
                    .filter(|endpoint| !endpoint.trim().is_empty())
            })
    }

    /// Batch span pipeline exporting OTLP over HTTP, tagged with the service name.
    fn tracer_provider(&self, endpoint: String) -> Result<sdk::trace::SdkTracerProvider> {
        let exporter = SpanExporter::builder()
            .with_http()
            .with_protocol(Protocol::HttpBinary)
            .with_endpoint(endpoint)
            .build()?;
        let resource = Resource::builder()
            .with_service_name(self.service_name)
            .build();
        Ok(sdk::trace::SdkTracerProvider::builder()
            .with_resource(resource)
            .with_batch_exporter(exporter)
            .build())
    }
}

/// Installs the fmt subscriber, plus an OTLP span exporter when
/// [`ObsConfig::resolved_otlp_endpoint`] yields one. Later calls are no-ops.
pub fn init_tracing(config: ObsConfig) -> Result<()> {
    INIT.get_or_try_init(|| install(&config))?;
    Ok(())
}

fn install(config: &ObsConfig) -> Result<()> {
    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_new(config.resolved_filter())?)
        .with(tracing_subscriber::fmt::layer().with_target(false));

    let endpoint = config.resolved_otlp_endpoint();
    let exporting = endpoint.is_some();
    match endpoint {
        Some(endpoint) => {
            let tracer = config
                .tracer_provider(endpoint)?
                .tracer(config.service_name);
            registry
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .try_init()?;
        }
        None => registry.try_init()?,
    }
    debug!(service = config.service_name, exporting, "tracing installed");
    Ok(())
}
