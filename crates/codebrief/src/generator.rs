use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use libcodebrief_core::{Generate, GenerateError};
use tracing::debug;

/// Model capability backed by an external command.
///
/// The command runs through the platform shell with the prompt on stdin;
/// its stdout is the response.
pub struct CommandGenerator {
    command: String,
    workdir: PathBuf,
}

impl CommandGenerator {
    pub fn new(command: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            workdir: workdir.into(),
        }
    }

    fn shell(&self) -> Command {
        #[cfg(windows)]
        {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(&self.command);
            cmd
        }
        #[cfg(not(windows))]
        {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(&self.command);
            cmd
        }
    }
}

impl Generate for CommandGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        debug!(command = %self.command, bytes = prompt.len(), "running model command");

        let mut child = self
            .shell()
            .current_dir(&self.workdir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(GenerateError::Spawn)?;

        // Feed stdin from a thread so a chatty child cannot block on a full stdout pipe
        let writer = child.stdin.take().map(|mut stdin| {
            let prompt = prompt.to_string();
            std::thread::spawn(move || stdin.write_all(prompt.as_bytes()))
        });

        let output = child.wait_with_output().map_err(GenerateError::Spawn)?;
        if let Some(writer) = writer {
            match writer.join() {
                Ok(Err(e)) => debug!(error = %e, "model command closed stdin early"),
                Err(_) => debug!("stdin writer panicked"),
                Ok(Ok(())) => {}
            }
        }

        if !output.status.success() {
            return Err(GenerateError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let response = String::from_utf8_lossy(&output.stdout).into_owned();
        if response.trim().is_empty() {
            return Err(GenerateError::Empty);
        }
        Ok(response)
    }

    fn name(&self) -> &str {
        &self.command
    }
}
