use async_trait::async_trait;
use tokio::process::Command;

use diskprobe_core::{MeasurementError, MeasurementSource};

const DU_PROGRAM: &str = "du";

/// Measures disk usage by running `du -sbx <path>`.
///
/// `-s` summarizes, `-b` reports apparent size in bytes and `-x` stays on the
/// filesystem of `path`. The child is killed if the measurement future is
/// dropped, so the poller's timeout also stops a stalled `du`.
#[derive(Clone, Debug)]
pub struct DuMeasurementSource {
    program: String,
}

impl Default for DuMeasurementSource {
    fn default() -> Self {
        Self::new(DU_PROGRAM)
    }
}

impl DuMeasurementSource {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// `du -sbx -- <path>`; the `--` keeps a path starting with `-` from
    /// being read as an option.
    fn command(&self, path: &str) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-sbx").arg("--").arg(path).kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl MeasurementSource for DuMeasurementSource {
    fn name(&self) -> &str {
        &self.program
    }

    async fn measure(&self, path: &str) -> Result<u64, MeasurementError> {
        let output = self
            .command(path)
            .output()
            .await
            .map_err(|source| MeasurementError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(MeasurementError::ToolFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_du_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse the byte count from `du -s` output (`<bytes>\t<path>`).
pub(crate) fn parse_du_output(stdout: &str) -> Result<u64, MeasurementError> {
    let line = stdout.trim();
    let field = line
        .split('\t')
        .next()
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .ok_or_else(|| MeasurementError::MalformedOutput(line.to_string()))?;

    field
        .parse::<u64>()
        .map_err(|source| MeasurementError::InvalidByteCount {
            value: field.to_string(),
            source,
        })
}
