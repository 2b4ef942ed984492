// crates/label-verifier-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and the CLI.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for label verifier configuration. The output is
//! deterministic and must always load and validate.

/// Returns a canonical example `label-verifier.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[admission]
attempt_timeout_ms = 300000

[audit]
sink = "stderr"
# sink = "file"
# path = "label-verifier-audit.jsonl"

[[labels]]
name = "linux"

[[labels.verifiers]]
type = "shell_script"
script = "uname -s | grep -q Linux"

[[labels.verifiers]]
type = "path_exists"
path = "tools"
kind = "directory"

[[labels]]
name = "jdk17"

[[labels.verifiers]]
type = "env_var"
name = "JAVA_HOME"

[[labels.verifiers]]
type = "shell_script"
script = "\"$JAVA_HOME/bin/java\" -version"

[[labels]]
name = "retired"

[[labels.verifiers]]
type = "static_fail"
message = "label retired; use linux"
"#,
    )
}
