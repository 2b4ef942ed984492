// crates/label-verifier-cli/src/main.rs
// ============================================================================
// Module: Label Verifier CLI Entry Point
// Description: Command dispatcher for local node admission and config tooling.
// Purpose: Run label verification from the command line with JSON output.
// Dependencies: clap, label-verifier-core, label-verifier-config, serde, tokio.
// ============================================================================

//! ## Overview
//! The label verifier CLI admits local "nodes" against the label chains in a
//! configuration file and validates configuration files. Each requested node
//! is admitted on its own blocking task so independent nodes verify
//! concurrently; Ctrl-C cancels every in-flight attempt. Decisions are
//! written to stdout as JSON and the exit code is non-zero when any node is
//! rejected. Security posture: inputs are untrusted and must be validated.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use label_verifier_builtins::LocalChannel;
use label_verifier_config::LabelVerifierConfig;
use label_verifier_config::MAX_ATTEMPT_TIMEOUT_MS;
use label_verifier_config::MIN_ATTEMPT_TIMEOUT_MS;
use label_verifier_config::config_toml_example;
use label_verifier_core::AdmissionRequest;
use label_verifier_core::CancellationToken;
use label_verifier_core::Decision;
use label_verifier_core::DiagnosticSink;
use label_verifier_core::FailureKind;
use label_verifier_core::Label;
use label_verifier_core::NodeAdmissionController;
use label_verifier_core::NodeHandle;
use label_verifier_core::NodeName;
use label_verifier_core::NoopDiagnosticSink;
use label_verifier_core::PrefixedSink;
use label_verifier_core::RemotePath;
use label_verifier_core::WriterDiagnosticSink;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "label-verifier", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Verify local nodes against their labels.
    Admit(AdmitCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Configuration for the `admit` command.
#[derive(Args, Debug)]
struct AdmitCommand {
    /// Optional config file path (defaults to label-verifier.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Node to admit as `NAME=label1,label2`; repeat for concurrent nodes.
    #[arg(long = "node", value_name = "NAME=LABELS", required = true, value_parser = parse_node_spec)]
    nodes: Vec<NodeSpec>,
    /// Workspace root for every node (defaults to the current directory).
    #[arg(long, value_name = "DIR")]
    workspace: Option<PathBuf>,
    /// Override the configured attempt timeout in milliseconds.
    #[arg(long = "timeout-ms", value_name = "MS")]
    timeout_ms: Option<u64>,
    /// Suppress diagnostic output on stderr.
    #[arg(long)]
    quiet: bool,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a label verifier configuration file.
    Validate(ConfigValidateCommand),
    /// Print the canonical example configuration.
    Example,
}

/// Configuration for the `config validate` command.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to label-verifier.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Node requested on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NodeSpec {
    /// Node name.
    name: NodeName,
    /// Labels claimed by the node, in order.
    labels: Vec<Label>,
}

// ============================================================================
// SECTION: Output Types
// ============================================================================

/// Admission result for one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct NodeReport {
    /// Node name.
    node: String,
    /// Labels claimed by the node.
    labels: Vec<String>,
    /// `admitted` or `rejected`.
    decision: &'static str,
    /// Label whose chain rejected the node.
    #[serde(skip_serializing_if = "Option::is_none")]
    failed_label: Option<String>,
    /// Kind of the verifier that rejected the node.
    #[serde(skip_serializing_if = "Option::is_none")]
    failed_verifier: Option<String>,
    /// Failure classification.
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_kind: Option<FailureKind>,
    /// Rejection message.
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl NodeReport {
    /// Builds a report from a decision.
    fn new(node: &NodeHandle, labels: &[Label], decision: &Decision) -> Self {
        let rejection = match decision {
            Decision::Admitted => None,
            Decision::Rejected(rejection) => Some(rejection),
        };
        Self {
            node: node.name.to_string(),
            labels: labels.iter().map(ToString::to_string).collect(),
            decision: decision.as_str(),
            failed_label: rejection.and_then(|r| r.label.as_ref()).map(ToString::to_string),
            failed_verifier: rejection.and_then(|r| r.verifier.clone()),
            failure_kind: rejection.map(|r| r.failure.kind),
            message: rejection.map(|r| r.message().to_string()),
        }
    }

    /// Returns true when the node was admitted.
    fn is_admitted(&self) -> bool {
        self.decision == "admitted"
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

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
    match cli.command {
        Commands::Admit(command) => command_admit(command).await,
        Commands::Config {
            command,
        } => command_config(&command),
    }
}

// ============================================================================
// SECTION: Admit Command
// ============================================================================

/// Executes the `admit` command.
async fn command_admit(command: AdmitCommand) -> CliResult<ExitCode> {
    ensure_unique_nodes(&command.nodes)?;
    let config = LabelVerifierConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    let registry = config
        .build_registry()
        .map_err(|err| CliError::new(format!("failed to build label chains: {err}")))?;
    let mut admission = config.admission_config();
    if let Some(timeout_ms) = command.timeout_ms {
        if !(MIN_ATTEMPT_TIMEOUT_MS..=MAX_ATTEMPT_TIMEOUT_MS).contains(&timeout_ms) {
            return Err(CliError::new(format!(
                "--timeout-ms must be between {MIN_ATTEMPT_TIMEOUT_MS} and {MAX_ATTEMPT_TIMEOUT_MS}"
            )));
        }
        admission.attempt_timeout = Some(Duration::from_millis(timeout_ms));
    }
    let audit = config
        .build_audit_sink()
        .map_err(|err| CliError::new(format!("failed to open audit sink: {err}")))?;
    let controller = Arc::new(
        NodeAdmissionController::new(registry).with_config(admission).with_audit_sink(audit),
    );
    let workspace = resolve_workspace(command.workspace)?;
    let diagnostics: Arc<dyn DiagnosticSink> = if command.quiet {
        Arc::new(NoopDiagnosticSink)
    } else {
        Arc::new(WriterDiagnosticSink::new(std::io::stderr()))
    };

    let cancellation = CancellationToken::new();
    let interrupt = {
        let token = cancellation.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel("interrupted");
            }
        })
    };
    let reports = admit_nodes(
        controller,
        Arc::new(LocalChannel::default()),
        diagnostics,
        &workspace,
        command.nodes,
        &cancellation,
    )
    .await;
    interrupt.abort();
    let reports = reports?;

    write_json(&reports)?;
    if reports.iter().all(NodeReport::is_admitted) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Admits every node on its own blocking task and collects the reports in
/// request order.
async fn admit_nodes(
    controller: Arc<NodeAdmissionController>,
    channel: Arc<LocalChannel>,
    diagnostics: Arc<dyn DiagnosticSink>,
    workspace: &RemotePath,
    nodes: Vec<NodeSpec>,
    cancellation: &CancellationToken,
) -> CliResult<Vec<NodeReport>> {
    let mut handles = Vec::with_capacity(nodes.len());
    for spec in nodes {
        let controller = Arc::clone(&controller);
        let channel = Arc::clone(&channel);
        let diagnostics = Arc::clone(&diagnostics);
        let cancellation = cancellation.clone();
        let node = NodeHandle::new(spec.name, workspace.clone());
        let labels = spec.labels;
        handles.push(tokio::task::spawn_blocking(move || {
            let sink = PrefixedSink::new(node.name.as_str(), diagnostics.as_ref());
            let decision = controller.admit(&AdmissionRequest {
                node: &node,
                labels: &labels,
                channel: channel.as_ref(),
                sink: &sink,
                cancellation: &cancellation,
            });
            NodeReport::new(&node, &labels, &decision)
        }));
    }
    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        let report = handle
            .await
            .map_err(|err| CliError::new(format!("admission task failed: {err}")))?;
        reports.push(report);
    }
    Ok(reports)
}

/// Rejects repeated node names.
fn ensure_unique_nodes(nodes: &[NodeSpec]) -> CliResult<()> {
    let mut seen = BTreeSet::new();
    for spec in nodes {
        if !seen.insert(&spec.name) {
            return Err(CliError::new(format!("duplicate node: {}", spec.name)));
        }
    }
    Ok(())
}

/// Resolves the workspace root shared by all nodes.
fn resolve_workspace(workspace: Option<PathBuf>) -> CliResult<RemotePath> {
    let path = match workspace {
        Some(path) => path,
        None => std::env::current_dir()
            .map_err(|err| CliError::new(format!("failed to resolve current directory: {err}")))?,
    };
    if !path.is_dir() {
        return Err(CliError::new(format!("workspace is not a directory: {}", path.display())));
    }
    Ok(RemotePath::new(path.to_string_lossy().into_owned()))
}

/// Parses a `NAME=label1,label2` node argument.
///
/// Labels may be separated by commas or spaces; a bare `NAME` claims no
/// labels.
fn parse_node_spec(value: &str) -> Result<NodeSpec, String> {
    let (name, labels) = value.split_once('=').unwrap_or((value, ""));
    let name = name.trim();
    if name.is_empty() {
        return Err("node name must be non-empty".to_string());
    }
    if name.chars().any(char::is_whitespace) {
        return Err(format!("node name must not contain whitespace: {name}"));
    }
    let labels = labels
        .split([',', ' '])
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(|label| Label::parse(label).map_err(|err| err.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(NodeSpec {
        name: NodeName::new(name),
        labels,
    })
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(command),
        ConfigCommand::Example => {
            write_stdout_line(config_toml_example().trim_end())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let config = LabelVerifierConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    config
        .build_registry()
        .map_err(|err| CliError::new(format!("failed to build label chains: {err}")))?;
    write_stdout_line(&format!("config ok: {} label(s)", config.labels.len()))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes pretty JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("failed to render json: {err}")))?;
    write_stdout_line(&text)
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
        .map_err(|err| CliError::new(format!("failed to write stdout: {err}")))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
