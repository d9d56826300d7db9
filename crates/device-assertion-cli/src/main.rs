// crates/device-assertion-cli/src/main.rs
// ============================================================================
// Module: Device Assertion CLI Entry Point
// Description: Command dispatcher for device assertion and token workflows.
// Purpose: Provide a safe CLI for asserting devices and verifying tokens.
// Dependencies: clap, device-assertion-config, device-assertion-core, serde_jcs, tokio.
// ============================================================================

//! ## Overview
//! The `device-assertion` CLI loads `device-assertion.toml`, asserts the
//! registration status of a device, and verifies assertion tokens offline.
//! Machine-readable output is canonical JSON; all other user-facing strings
//! are routed through the message catalog. Security posture: inputs are
//! untrusted and reads are size limited.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use device_assertion_cli::t;
use device_assertion_config::DeviceAssertionConfig;
use device_assertion_config::config_toml_example;
use device_assertion_core::AssertionClaims;
use device_assertion_core::AssertionResult;
use device_assertion_core::AssertionStatus;
use device_assertion_core::AssertionVerifier;
use device_assertion_core::Clock;
use device_assertion_core::DeviceId;
use device_assertion_core::SystemClock;
use device_assertion_core::TenantId;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a token file.
const MAX_TOKEN_BYTES: usize = 16 * 1024;
/// Exit code for assertions answered with `not_found` or `forbidden`.
const EXIT_DENIED: u8 = 2;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "device-assertion", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Assert the registration status of a device.
    Assert(AssertCommand),
    /// Verify an assertion token.
    Verify(VerifyCommand),
    /// Print the Ed25519 verifying key for the configured signer.
    PublicKey(PublicKeyCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `assert`.
#[derive(Args, Debug)]
struct AssertCommand {
    /// Config file path (defaults to `DEVICE_ASSERTION_CONFIG` or `device-assertion.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Tenant identifier.
    #[arg(long, value_name = "TENANT")]
    tenant: String,
    /// Device identifier.
    #[arg(long, value_name = "DEVICE")]
    device: String,
}

/// Arguments for `verify`.
#[derive(Args, Debug)]
struct VerifyCommand {
    /// Config file path used to derive the verifier.
    #[arg(long, value_name = "PATH", conflicts_with = "public_key")]
    config: Option<PathBuf>,
    /// Compact token to verify.
    #[arg(long, value_name = "TOKEN", conflicts_with = "token_file", required_unless_present = "token_file")]
    token: Option<String>,
    /// File holding the compact token.
    #[arg(long, value_name = "PATH")]
    token_file: Option<PathBuf>,
    /// Tenant the token must assert.
    #[arg(long, value_name = "TENANT", requires = "device")]
    tenant: Option<String>,
    /// Device the token must assert.
    #[arg(long, value_name = "DEVICE", requires = "tenant")]
    device: Option<String>,
    /// Base64 Ed25519 verifying key; verifies without a config file.
    #[arg(long, value_name = "BASE64")]
    public_key: Option<String>,
    /// Issuer required when verifying with `--public-key`.
    #[arg(long, value_name = "ISSUER", requires = "public_key")]
    issuer: Option<String>,
}

/// Arguments for `public-key`.
#[derive(Args, Debug)]
struct PublicKeyCommand {
    /// Config file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a configuration file.
    Validate(ConfigValidateCommand),
    /// Print a canonical example configuration.
    Example,
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Config file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Output Types
// ============================================================================

/// Output of `assert`.
#[derive(Debug, Serialize)]
struct AssertOutput<'a> {
    /// Tenant identifier as requested.
    tenant_id: &'a str,
    /// Device identifier as requested.
    device_id: &'a str,
    /// HTTP status a transport binding would answer with.
    http_status: u16,
    /// Assertion result (status and payload).
    #[serde(flatten)]
    result: &'a AssertionResult,
}

/// Output of `verify`.
#[derive(Debug, Serialize)]
struct VerifyOutput<'a> {
    /// Always true; rejected tokens exit with an error.
    valid: bool,
    /// Verified claims.
    claims: &'a AssertionClaims,
}

/// Output of `public-key`.
#[derive(Debug, Serialize)]
struct PublicKeyOutput {
    /// JWS algorithm name.
    algorithm: &'static str,
    /// Standard base64 verifying key.
    public_key: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a catalog message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Errors raised while reading bounded inputs.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Assert(command) => command_assert(command).await,
        Commands::Verify(command) => command_verify(&command),
        Commands::PublicKey(command) => command_public_key(&command),
        Commands::Config {
            command,
        } => command_config(command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Assert Command
// ============================================================================

/// Executes the assert command.
async fn command_assert(command: AssertCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let service = config
        .build_service()
        .map_err(|err| CliError::new(t!("service.build_failed", error = err)))?;
    let tenant_id = TenantId::new(command.tenant);
    let device_id = DeviceId::new(command.device);
    let result = service
        .assert_registration(&tenant_id, &device_id)
        .await
        .map_err(|err| CliError::new(t!("assert.failed", kind = err.kind(), error = err)))?;
    write_canonical_json(&AssertOutput {
        tenant_id: tenant_id.as_str(),
        device_id: device_id.as_str(),
        http_status: result.status().http_status(),
        result: &result,
    })?;
    Ok(ExitCode::from(status_exit_code(result.status())))
}

/// Maps an assertion status onto the process exit code.
const fn status_exit_code(status: AssertionStatus) -> u8 {
    match status {
        AssertionStatus::Success => 0,
        AssertionStatus::NotFound | AssertionStatus::Forbidden => EXIT_DENIED,
    }
}

// ============================================================================
// SECTION: Verify Command
// ============================================================================

/// Executes the verify command.
fn command_verify(command: &VerifyCommand) -> CliResult<ExitCode> {
    let token = read_token(command)?;
    let verifier = verifier_for(command)?;
    let now = SystemClock.now_unix_seconds();
    let verified = match (&command.tenant, &command.device) {
        (Some(tenant), Some(device)) => verifier.verify_for_device_at(
            &token,
            &TenantId::new(tenant.as_str()),
            &DeviceId::new(device.as_str()),
            now,
        ),
        _ => verifier.verify_at(&token, now),
    };
    let claims =
        verified.map_err(|err| CliError::new(t!("verify.rejected", kind = err.kind(), error = err)))?;
    write_canonical_json(&VerifyOutput {
        valid: true,
        claims: &claims,
    })?;
    Ok(ExitCode::SUCCESS)
}

/// Builds the verifier from `--public-key` or the config file.
fn verifier_for(command: &VerifyCommand) -> CliResult<AssertionVerifier> {
    if let Some(public_key) = &command.public_key {
        let verifier = AssertionVerifier::from_ed25519_public_key_base64(public_key)
            .map_err(|err| CliError::new(t!("verify.public_key_invalid", error = err)))?;
        return Ok(verifier.with_issuer(command.issuer.clone()));
    }
    load_config(command.config.as_deref())?
        .verifier()
        .map_err(|err| CliError::new(t!("verify.verifier_failed", error = err)))
}

/// Reads the token from `--token` or `--token-file`.
fn read_token(command: &VerifyCommand) -> CliResult<String> {
    let raw = match (&command.token, &command.token_file) {
        (Some(token), None) => token.clone(),
        (None, Some(path)) => {
            let bytes = read_bytes_with_limit(path, MAX_TOKEN_BYTES)
                .map_err(|err| read_limit_error(path, "token", err))?;
            String::from_utf8(bytes).map_err(|_| {
                CliError::new(t!("verify.token_not_utf8", path = path.display()))
            })?
        }
        _ => return Err(CliError::new(t!("verify.token_missing"))),
    };
    let token = raw.trim();
    if token.is_empty() {
        return Err(CliError::new(t!("verify.token_missing")));
    }
    Ok(token.to_string())
}

// ============================================================================
// SECTION: Public Key Command
// ============================================================================

/// Executes the public-key command.
fn command_public_key(command: &PublicKeyCommand) -> CliResult<ExitCode> {
    let verifier = load_config(command.config.as_deref())?
        .verifier()
        .map_err(|err| CliError::new(t!("public_key.build_failed", error = err)))?;
    let algorithm = verifier.algorithm();
    let public_key = verifier.public_key_base64().ok_or_else(|| {
        CliError::new(t!("public_key.unavailable", algorithm = algorithm.as_str()))
    })?;
    write_canonical_json(&PublicKeyOutput {
        algorithm: algorithm.as_str(),
        public_key,
    })?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
        ConfigCommand::Example => {
            write_stdout_bytes(config_toml_example().as_bytes())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = load_config(command.config.as_deref())?;
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Loads and validates the configuration.
fn load_config(path: Option<&Path>) -> CliResult<DeviceAssertionConfig> {
    DeviceAssertionConfig::load(path)
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let read_limit = limit.saturating_add(1);
    let mut limited = file.take(read_limit);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Formats a bounded read failure.
fn read_limit_error(path: &Path, kind: &str, err: ReadLimitError) -> CliError {
    match err {
        ReadLimitError::Io(err) => CliError::new(t!(
            "input.read_failed",
            kind = kind,
            path = path.display(),
            error = err
        )),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!(
            "input.read_too_large",
            kind = kind,
            path = path.display(),
            size = size,
            limit = limit
        )),
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Serializes a value as canonical JSON followed by a newline.
fn canonical_json_line<T: Serialize>(value: &T) -> CliResult<Vec<u8>> {
    let mut bytes = serde_jcs::to_vec(value)
        .map_err(|err| CliError::new(t!("output.serialize_failed", error = err)))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Writes canonical JSON to stdout.
fn write_canonical_json<T: Serialize>(value: &T) -> CliResult<()> {
    let bytes = canonical_json_line(value)?;
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
