//! OpenAI provider via an external helper process.
//!
//! The helper (typically a short Python script using the official SDK) gets the
//! question as its last argument and the API key in `OPENAI_VECTOR_API_KEY`,
//! set on the child only. Whatever it prints on stdout is the answer.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use kgroute_core::config::KnowledgeConfig;
use kgroute_core::utils::{expand_home, truncate_string};

use crate::traits::CompletionProvider;

/// Env var the helper reads its API key from.
pub const API_KEY_ENV: &str = "OPENAI_VECTOR_API_KEY";

pub const TRANSCRIPTION_ERROR: &str = "There was an error transcribing the audio.";
pub const REQUEST_ERROR: &str = "There was an error making the request to OpenAI.";
pub const EMPTY_RESPONSE: &str = "The response from OpenAI was empty.";

/// Runs the configured helper once per question.
pub struct OpenAiHelper {
    program: String,
    args: Vec<String>,
    api_key: String,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiHelper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiHelper")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiHelper {
    /// Build the helper from config. `~` in the command line is expanded.
    pub fn new(config: &KnowledgeConfig) -> anyhow::Result<Self> {
        let mut parts = config.helper_command.iter().map(|part| expand_home(part));
        let program = parts
            .next()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("knowledge.helperCommand is empty"))?;

        Ok(OpenAiHelper {
            program,
            args: parts.collect(),
            api_key: config.key.trim().to_string(),
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
        })
    }

    fn command(&self, text: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(text)
            .env(API_KEY_ENV, &self.api_key)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

/// Log helper stderr, but only if it is text.
fn log_helper_failure(reason: &str, stderr: &[u8]) {
    match std::str::from_utf8(stderr) {
        Ok(output) => error!(reason, output = %output.trim(), "OpenAI helper failed"),
        Err(_) => error!(reason, "OpenAI helper failed: output contains invalid UTF-8"),
    }
}

#[async_trait]
impl CompletionProvider for OpenAiHelper {
    async fn complete(&self, text: &str) -> String {
        if text.is_empty() {
            return TRANSCRIPTION_ERROR.to_string();
        }

        info!(program = %self.program, "Making request to OpenAI...");

        let child = match self.command(text).spawn() {
            Ok(child) => child,
            Err(e) => {
                error!(program = %self.program, error = %e, "failed to launch OpenAI helper");
                return REQUEST_ERROR.to_string();
            }
        };

        // Dropping the future on timeout kills the child (kill_on_drop).
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                error!(error = %e, "failed to wait for OpenAI helper");
                return REQUEST_ERROR.to_string();
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.timeout.as_secs(),
                    "OpenAI helper timed out"
                );
                return REQUEST_ERROR.to_string();
            }
        };

        if !output.status.success() {
            log_helper_failure(&output.status.to_string(), &output.stderr);
            return REQUEST_ERROR.to_string();
        }

        let answer = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if answer.is_empty() {
            return EMPTY_RESPONSE.to_string();
        }

        debug!(answer = %truncate_string(&answer, 200), "OpenAI response");
        answer
    }

    fn display_name(&self) -> &str {
        "OpenAI"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use kgroute_core::config::ProviderKind;

    /// A helper running `script` under `sh -c`; the question arrives as `$0`.
    fn sh_helper(script: &str, timeout_secs: u64) -> OpenAiHelper {
        let config = KnowledgeConfig {
            enable: true,
            provider: ProviderKind::Openai,
            key: "  sk-test-key \n".to_string(),
            helper_command: vec!["sh".into(), "-c".into(), script.into()],
            timeout_secs,
            ..Default::default()
        };
        OpenAiHelper::new(&config).unwrap()
    }

    #[test]
    fn test_empty_command_rejected() {
        let config = KnowledgeConfig {
            helper_command: vec![],
            ..Default::default()
        };
        assert!(OpenAiHelper::new(&config).is_err());
    }

    #[test]
    fn test_debug_hides_key() {
        let helper = sh_helper("true", 5);
        assert!(!format!("{helper:?}").contains("sk-test-key"));
    }

    #[tokio::test]
    async fn test_success_trims_output() {
        let helper = sh_helper(r#"printf '  Answer to: %s \n\n' "$0""#, 5);
        assert_eq!(
            helper.complete("what is rust").await,
            "Answer to: what is rust"
        );
    }

    #[tokio::test]
    async fn test_key_passed_in_env_trimmed() {
        let helper = sh_helper(r#"printf '[%s]' "$OPENAI_VECTOR_API_KEY""#, 5);
        assert_eq!(helper.complete("q").await, "[sk-test-key]");
    }

    #[tokio::test]
    async fn test_empty_input_does_not_run_helper() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran");
        let helper = sh_helper(&format!("touch {}", marker.display()), 5);

        assert_eq!(helper.complete("").await, TRANSCRIPTION_ERROR);
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_nonzero_exit_ignores_partial_output() {
        let helper = sh_helper("echo 'partial answer'; echo 'quota exceeded' >&2; exit 3", 5);
        assert_eq!(helper.complete("q").await, REQUEST_ERROR);
    }

    #[tokio::test]
    async fn test_nonzero_exit_with_binary_stderr() {
        let helper = sh_helper(r"printf '\377\376' >&2; exit 1", 5);
        assert_eq!(helper.complete("q").await, REQUEST_ERROR);
    }

    #[tokio::test]
    async fn test_empty_output() {
        let helper = sh_helper("printf '   \n'", 5);
        assert_eq!(helper.complete("q").await, EMPTY_RESPONSE);
    }

    #[tokio::test]
    async fn test_launch_failure() {
        let config = KnowledgeConfig {
            key: "k".into(),
            helper_command: vec!["/nonexistent/openai-helper".into()],
            ..Default::default()
        };
        let helper = OpenAiHelper::new(&config).unwrap();
        assert_eq!(helper.complete("q").await, REQUEST_ERROR);
    }

    #[tokio::test]
    async fn test_timeout() {
        let helper = sh_helper("sleep 30", 1);
        assert_eq!(helper.complete("q").await, REQUEST_ERROR);
    }
}
