//! ipapi-client - Rust client for the ip-api.com geolocation API
//!
//! Wraps the ip-api.com HTTP endpoints for single-IP lookup, batch
//! lookup, DNS-based lookup, and batch DNS lookup, with field
//! selection, multiple output formats, and client-side tracking of
//! the free tier's 45-requests-per-minute allowance.
//!
//! ```rust,no_run
//! use ipapi_client::{Fields, IpApiClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = IpApiClient::new()?;
//!
//!     let result = client.lookup(Some("8.8.8.8"), None).await?;
//!     println!("{:?} / {:?}", result.country(), result.city());
//!
//!     let fields = Fields::names(["query", "country", "isp"]);
//!     let results = client
//!         .batch(&["8.8.8.8".into(), "1.1.1.1".into()], Some(&fields))
//!         .await?;
//!     for entry in &results {
//!         println!("{:?}: {:?}", entry.query(), entry.country());
//!     }
//!
//!     client.close();
//!     Ok(())
//! }
//! ```

use parking_lot::Mutex;
use tracing::{debug, warn};

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod query;

pub use api::{BatchQueryItem, Fields, LookupResult, OutputFormat, AVAILABLE_FIELDS};
pub use client::{ResponseMetadata, FREE_TIER_LIMIT, RATE_WINDOW};
pub use config::{ClientConfig, SUPPORTED_LANGUAGES};
pub use error::{IpApiError, Result};
pub use query::QueryTarget;

use client::{HttpTransport, RequestBudget};

/// Maximum number of entries accepted by the batch endpoint
pub const BATCH_LIMIT: usize = 100;

/// What a batch entry is validated as before sending
#[derive(Debug, Clone, Copy)]
enum BatchKind {
    Address,
    Domain,
}

/// Client for the ip-api.com geolocation API.
///
/// Owns an HTTP session opened at construction and released either
/// explicitly via [`close`](Self::close) or when the client drops.
/// One instance is meant for one caller at a time; share across
/// threads only behind your own synchronization.
pub struct IpApiClient {
    /// Construction-time settings
    config: ClientConfig,

    /// Client-side free-tier request budget
    budget: RequestBudget,

    /// Rate-limit metadata from the most recent response
    last_metadata: Mutex<Option<ResponseMetadata>>,

    /// HTTP session; `None` once closed
    transport: Option<HttpTransport>,
}

impl IpApiClient {
    /// Create a client with the default configuration (free tier,
    /// English, 10 second timeout)
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client from an explicit configuration.
    ///
    /// Fails with [`IpApiError::Config`] when the language is not one
    /// of [`SUPPORTED_LANGUAGES`].
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config.timeout)?;

        Ok(Self {
            config,
            budget: RequestBudget::free_tier(),
            last_metadata: Mutex::new(None),
            transport: Some(transport),
        })
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Look up geolocation data for one IP address or hostname.
    ///
    /// `None` looks up the caller's own public IP. Consumes one unit
    /// of the free-tier budget. The target and any field names are
    /// validated before anything is sent.
    pub async fn lookup(
        &self,
        target: Option<&str>,
        fields: Option<&Fields>,
    ) -> Result<LookupResult> {
        let target = QueryTarget::parse(target)?;
        let params = self.common_params(fields)?;
        let transport = self.transport()?;
        self.consume_budget()?;

        let url = self.single_url(OutputFormat::Json, &target);
        debug!(%target, "single lookup");
        let (result, metadata): (LookupResult, _) = transport.get_json(&url, &params).await?;
        *self.last_metadata.lock() = Some(metadata);

        Self::check_remote_status(result)
    }

    /// Look up one target and return the body as unparsed text in the
    /// requested format.
    ///
    /// Same validation and budget accounting as [`lookup`](Self::lookup);
    /// the response is handed to the caller as-is, including remote
    /// failure reports.
    pub async fn lookup_raw(
        &self,
        target: Option<&str>,
        fields: Option<&Fields>,
        format: OutputFormat,
    ) -> Result<String> {
        let target = QueryTarget::parse(target)?;
        let params = self.common_params(fields)?;
        let transport = self.transport()?;
        self.consume_budget()?;

        let url = self.single_url(format, &target);
        debug!(%target, %format, "raw lookup");
        let (body, metadata) = transport.get_text(&url, &params).await?;
        *self.last_metadata.lock() = Some(metadata);

        Ok(body)
    }

    /// Look up up to 100 IP addresses or hostnames in one exchange.
    ///
    /// The whole batch counts as a single unit against the free-tier
    /// budget, matching how the service bills batch calls. Returns
    /// one result per input, in input order; entries the service
    /// could not resolve keep their own `status`/`message` fields
    /// rather than failing the call.
    pub async fn batch(
        &self,
        targets: &[String],
        fields: Option<&Fields>,
    ) -> Result<Vec<LookupResult>> {
        self.batch_request(targets, fields, BatchKind::Address).await
    }

    /// Look up geolocation data for a domain via the service's DNS
    /// resolution.
    ///
    /// The domain is validated syntactically before sending; empty
    /// input or invalid characters fail with [`IpApiError::InvalidIp`].
    pub async fn dns_lookup(&self, domain: &str, fields: Option<&Fields>) -> Result<LookupResult> {
        query::validate_domain(domain)?;
        let params = self.common_params(fields)?;
        let transport = self.transport()?;
        self.consume_budget()?;

        let base = self.config.effective_base_url().trim_end_matches('/');
        let url = format!("{}/json/{}", base, domain);
        debug!(domain, "dns lookup");
        let (result, metadata): (LookupResult, _) = transport.get_json(&url, &params).await?;
        *self.last_metadata.lock() = Some(metadata);

        if !result.is_success() {
            let message = result.message().unwrap_or("unknown error").to_string();
            return Err(IpApiError::Api(message));
        }
        Ok(result)
    }

    /// Batch DNS lookup for up to 100 domains; same contract as
    /// [`batch`](Self::batch) with per-entry domain validation.
    pub async fn batch_dns(
        &self,
        domains: &[String],
        fields: Option<&Fields>,
    ) -> Result<Vec<LookupResult>> {
        self.batch_request(domains, fields, BatchKind::Domain).await
    }

    /// Rate-limit metadata (`X-Rl` / `X-Ttl`) from the most recent
    /// response, if any request has completed yet
    pub fn rate_limit_info(&self) -> Option<ResponseMetadata> {
        *self.last_metadata.lock()
    }

    /// Units left in the client-side budget window
    pub fn remaining_budget(&self) -> u32 {
        self.budget.remaining()
    }

    /// Release the HTTP session. Idempotent; later operations fail
    /// with [`IpApiError::Config`]. Dropping the client has the same
    /// effect.
    pub fn close(&mut self) {
        if self.transport.take().is_some() {
            debug!("client session closed");
        }
    }

    fn transport(&self) -> Result<&HttpTransport> {
        self.transport
            .as_ref()
            .ok_or_else(|| IpApiError::Config("client session is closed".to_string()))
    }

    /// Take one unit of budget, or fail before any network traffic.
    /// The pro tier is exempt from the client-side ceiling.
    fn consume_budget(&self) -> Result<()> {
        if self.config.is_pro_tier() {
            return Ok(());
        }
        if self.budget.try_acquire() {
            Ok(())
        } else {
            warn!(limit = self.budget.limit(), "client-side rate limit hit");
            Err(IpApiError::RateLimited {
                limit: self.budget.limit(),
                window: self.budget.window(),
            })
        }
    }

    /// Query parameters shared by all operations: field selector,
    /// non-default language, and the API key when present
    fn common_params(&self, fields: Option<&Fields>) -> Result<Vec<(&'static str, String)>> {
        let mut params = Vec::new();
        if let Some(fields) = fields {
            params.push(("fields", fields.to_query_param()?));
        }
        if self.config.lang != "en" {
            params.push(("lang", self.config.lang.clone()));
        }
        if let Some(key) = &self.config.api_key {
            params.push(("key", key.clone()));
        }
        Ok(params)
    }

    fn single_url(&self, format: OutputFormat, target: &QueryTarget) -> String {
        let base = self.config.effective_base_url().trim_end_matches('/');
        match target.path_segment() {
            Some(segment) => format!("{}/{}/{}", base, format.as_str(), segment),
            None => format!("{}/{}", base, format.as_str()),
        }
    }

    /// Classify a remote `status: fail` body for single lookups: an
    /// invalid-query report is the caller's fault, everything else is
    /// a service-side failure
    fn check_remote_status(result: LookupResult) -> Result<LookupResult> {
        if result.is_success() {
            return Ok(result);
        }
        let message = result.message().unwrap_or("unknown error").to_string();
        if message.to_lowercase().contains("invalid") {
            return Err(IpApiError::InvalidIp(message));
        }
        Err(IpApiError::Api(message))
    }

    async fn batch_request(
        &self,
        entries: &[String],
        fields: Option<&Fields>,
        kind: BatchKind,
    ) -> Result<Vec<LookupResult>> {
        if entries.is_empty() {
            return Err(IpApiError::Config("batch cannot be empty".to_string()));
        }
        if entries.len() > BATCH_LIMIT {
            return Err(IpApiError::Config(format!(
                "batch limit exceeded: {} entries (max {})",
                entries.len(),
                BATCH_LIMIT
            )));
        }

        for (index, entry) in entries.iter().enumerate() {
            let valid = match kind {
                BatchKind::Address => QueryTarget::parse(Some(entry)).is_ok(),
                BatchKind::Domain => query::validate_domain(entry).is_ok(),
            };
            if !valid {
                return Err(IpApiError::InvalidIp(format!(
                    "batch entry {} ('{}') is not valid",
                    index + 1,
                    entry
                )));
            }
        }

        let fields_param = fields.map(|f| f.to_query_param()).transpose()?;
        let lang = (self.config.lang != "en").then(|| self.config.lang.clone());
        let transport = self.transport()?;

        // The whole batch is billed as one request
        self.consume_budget()?;

        let body: Vec<BatchQueryItem> = entries
            .iter()
            .map(|entry| BatchQueryItem {
                query: entry.clone(),
                fields: fields_param.clone(),
                lang: lang.clone(),
            })
            .collect();

        let mut params = Vec::new();
        if let Some(key) = &self.config.api_key {
            params.push(("key", key.clone()));
        }

        let base = self.config.effective_base_url().trim_end_matches('/');
        let url = format!("{}/batch", base);
        debug!(entries = entries.len(), "batch lookup");
        let (results, metadata): (Vec<LookupResult>, _) =
            transport.post_json(&url, &params, &body).await?;
        *self.last_metadata.lock() = Some(metadata);

        if results.len() != entries.len() {
            return Err(IpApiError::Api(format!(
                "batch response had {} results for {} queries",
                results.len(),
                entries.len()
            )));
        }

        Ok(results)
    }
}

impl std::fmt::Debug for IpApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpApiClient")
            .field("lang", &self.config.lang)
            .field("pro_tier", &self.config.is_pro_tier())
            .field("closed", &self.transport.is_none())
            .finish()
    }
}
