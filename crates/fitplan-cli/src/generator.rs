//! [`PlanGenerator`] backed by an external command.
//!
//! The command receives the prompt on stdin and must print the plan JSON
//! on stdout. Anything it writes to stderr is only surfaced on failure.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

use fitplan_core::{GenerationRequest, GeneratorOutput, PlanGenerator};

use crate::config::GeneratorSection;
use crate::prompt::build_prompt;

#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
    name: String,
    version: String,
    timeout: Duration,
}

impl CommandGenerator {
    pub fn from_config(section: &GeneratorSection) -> Self {
        Self {
            program: section.command.clone(),
            args: section.args.clone(),
            name: section
                .name
                .clone()
                .unwrap_or_else(|| section.command.clone()),
            version: section.version.clone(),
            timeout: Duration::from_secs(section.timeout_secs.max(1)),
        }
    }

    fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[async_trait]
impl PlanGenerator for CommandGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    async fn generate(&self, request: GenerationRequest<'_>) -> Result<GeneratorOutput> {
        let prompt = build_prompt(request);
        tracing::debug!(
            command = %self.command_line(),
            kind = %request.kind(),
            prompt_bytes = prompt.len(),
            "invoking plan generator"
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn generator `{}`", self.command_line()))?;

        let mut stdin = child.stdin.take().context("generator has no stdin")?;
        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();

        // Feed stdin while draining the output pipes so neither side blocks
        // on a full buffer.
        let write_prompt = async move {
            let result = stdin.write_all(prompt.as_bytes()).await;
            drop(stdin);
            result
        };
        let read_stdout = async {
            let mut buf = Vec::new();
            if let Some(ref mut pipe) = stdout_pipe {
                pipe.read_to_end(&mut buf).await.ok();
            }
            String::from_utf8_lossy(&buf).into_owned()
        };
        let read_stderr = async {
            let mut buf = Vec::new();
            if let Some(ref mut pipe) = stderr_pipe {
                pipe.read_to_end(&mut buf).await.ok();
            }
            String::from_utf8_lossy(&buf).into_owned()
        };

        let run = async {
            let (written, stdout, stderr) = tokio::join!(write_prompt, read_stdout, read_stderr);
            (written, child.wait().await, stdout, stderr)
        };

        let (written, status, stdout, stderr) = match tokio::time::timeout(self.timeout, run).await {
            Ok(result) => result,
            Err(_) => bail!(
                "generator `{}` timed out after {}s",
                self.command_line(),
                self.timeout.as_secs()
            ),
        };

        let status = status.context("failed to wait on generator")?;
        if !status.success() {
            bail!(
                "generator `{}` exited with {}: {}",
                self.command_line(),
                status,
                stderr.trim()
            );
        }
        // A generator may legitimately close stdin early once it has read
        // enough; only report the write error if it also produced nothing.
        if let Err(e) = written {
            if stdout.trim().is_empty() {
                return Err(e).context("failed to write prompt to generator");
            }
        }

        Ok(GeneratorOutput::Text(stdout))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use fitplan_core::model::{WorkoutPlanRequest, WorkoutPreferences};

    use super::*;

    fn section(command: &str, args: &[&str]) -> GeneratorSection {
        GeneratorSection {
            command: command.to_owned(),
            args: args.iter().map(|s| (*s).to_owned()).collect(),
            name: None,
            version: "1".to_owned(),
            timeout_secs: 5,
        }
    }

    fn request() -> WorkoutPlanRequest {
        WorkoutPlanRequest {
            preferences: WorkoutPreferences::default(),
            day_count: 3,
        }
    }

    #[tokio::test]
    async fn returns_stdout_as_text() {
        let generator = CommandGenerator::from_config(&section(
            "sh",
            &["-c", "cat > /dev/null; echo '{\"days\": []}'"],
        ));
        assert_eq!(generator.name(), "sh");

        let output = generator
            .generate(GenerationRequest::Workout(&request()))
            .await
            .unwrap();
        assert_eq!(output, GeneratorOutput::Text("{\"days\": []}\n".to_owned()));
    }

    #[tokio::test]
    async fn prompt_arrives_on_stdin() {
        let generator = CommandGenerator::from_config(&section("cat", &[]));
        let GeneratorOutput::Text(echoed) = generator
            .generate(GenerationRequest::Workout(&request()))
            .await
            .unwrap()
        else {
            panic!("expected text output");
        };
        assert!(echoed.contains("Generate exactly 3 training days"));
    }

    #[tokio::test]
    async fn non_zero_exit_reports_stderr() {
        let generator = CommandGenerator::from_config(&section(
            "sh",
            &["-c", "cat > /dev/null; echo 'quota exceeded' >&2; exit 3"],
        ));
        let err = generator
            .generate(GenerationRequest::Workout(&request()))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("quota exceeded"));
    }

    #[tokio::test]
    async fn missing_program_fails_to_spawn() {
        let generator = CommandGenerator::from_config(&section("fitplan-no-such-generator", &[]));
        let err = generator
            .generate(GenerationRequest::Workout(&request()))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("failed to spawn generator"));
    }
}
