//! Builds the front-end bundle for the static origin.
//!
//! The bundler bakes `PUBLIC_URL` into every asset link, so it has to point
//! at the place the build is deployed to, not at this server.

use std::{
    path::PathBuf,
    process::{Command, ExitStatus, Stdio},
};

use thiserror::Error;

pub const DEFAULT_PUBLIC_URL: &str = "https://andrew-chen-wang.github.io/spa-with-sessions-static";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` exited with {status}")]
    Failed { program: String, status: ExitStatus },
}

/// One bundler invocation.
#[derive(Clone, Debug)]
pub struct BuildCommand {
    pub program: String,
    pub args: Vec<String>,
    pub app_dir: PathBuf,
    pub public_url: String,
}

impl BuildCommand {
    /// `npm run <script>` inside `app_dir`.
    pub fn npm(app_dir: impl Into<PathBuf>, script: &str, public_url: &str) -> Self {
        Self {
            program: "npm".to_string(),
            args: vec!["run".to_string(), script.to_string()],
            app_dir: app_dir.into(),
            public_url: public_url.to_string(),
        }
    }

    /// Run to completion and return what it wrote to stdout. The child
    /// inherits this process' environment and stderr.
    pub fn run(&self) -> Result<Vec<u8>, BuildError> {
        tracing::info!(
            "running `{} {}` in {} with PUBLIC_URL={}",
            self.program,
            self.args.join(" "),
            self.app_dir.display(),
            self.public_url
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.app_dir)
            .env("PUBLIC_URL", &self.public_url)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| BuildError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(BuildError::Failed {
                program: self.program.clone(),
                status: output.status,
            });
        }

        Ok(output.stdout)
    }
}
