use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::{
    form::action::{DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_MAX_UPLOAD_BYTES, UploadLimits},
    handler::{
        error::GENERIC_ERROR_MESSAGE,
        handler::{DEFAULT_ENDPOINT, MissingResultPolicy, SubmissionOptions},
    },
    transport::http::DEFAULT_BASE_URL,
};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "upload-form",
    version,
    about = "Submit documents to a /process endpoint and render the result"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: upload-form.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a document and render the server's result
    Submit {
        /// Processing action: semantic, similarity, summarization, qa_upload, qa_query
        #[arg(long)]
        action: String,

        /// Document to upload (not needed for qa_query)
        #[arg(long)]
        file: Option<String>,

        /// Question text for qa_query
        #[arg(long)]
        question: Option<String>,

        /// Server base URL
        #[arg(long)]
        url: Option<String>,

        /// Endpoint path on the server
        #[arg(long)]
        endpoint: Option<String>,

        /// Output format: console, html
        #[arg(long, default_value = "console")]
        format: String,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Render a saved JSON response without contacting a server
    Render {
        /// File holding the response body
        #[arg(long)]
        input: String,

        /// Output format: console, html
        #[arg(long, default_value = "console")]
        format: String,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `upload-form.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    #[serde(default)]
    pub missing_result: MissingResultPolicy,

    #[serde(default = "default_true")]
    pub guard_in_flight: bool,

    #[serde(default = "default_fallback")]
    pub fallback_message: String,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            missing_result: MissingResultPolicy::default(),
            guard_in_flight: true,
            fallback_message: GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_extensions")]
    pub allowed_extensions: Vec<String>,

    #[serde(default = "default_max_upload")]
    pub max_upload_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: default_extensions(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceConfig {
    /// JSONL trace file; tracing is off when unset
    pub path: Option<String>,
}

// Serde default helpers
fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }
fn default_endpoint() -> String { DEFAULT_ENDPOINT.to_string() }
fn default_true() -> bool { true }
fn default_fallback() -> String { GENERIC_ERROR_MESSAGE.to_string() }
fn default_extensions() -> Vec<String> {
    DEFAULT_ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}
fn default_max_upload() -> u64 { DEFAULT_MAX_UPLOAD_BYTES }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("upload-form.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Config Builders (merge CLI args with config file)
// ============================================================================

/// Resolve handler options: CLI endpoint > config > default.
pub fn build_submission_options(config: &AppConfig, endpoint: Option<&str>) -> SubmissionOptions {
    SubmissionOptions {
        endpoint: endpoint.unwrap_or(&config.server.endpoint).to_string(),
        missing_result: config.submission.missing_result,
        guard_in_flight: config.submission.guard_in_flight,
        fallback_message: config.submission.fallback_message.clone(),
    }
}

pub fn build_upload_limits(config: &AppConfig) -> UploadLimits {
    UploadLimits {
        allowed_extensions: config.upload.allowed_extensions.clone(),
        max_upload_bytes: config.upload.max_upload_bytes,
    }
}

pub fn resolve_base_url<'a>(config: &'a AppConfig, url: Option<&'a str>) -> &'a str {
    url.unwrap_or(&config.server.base_url)
}
