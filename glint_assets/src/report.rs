use std::fmt;
use std::io;

use glint::shader::ShaderKind;

use crate::LoaderError;

/// Outcome of compiling a single stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageLog {
    pub kind: ShaderKind,
    pub success: bool,
    /// Driver diagnostics, usually empty on success
    pub log: String,
}

/// Per-stage compile diagnostics of a [`crate::Resource`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompileReport {
    stages: Vec<StageLog>,
}

impl CompileReport {
    pub(crate) fn new(stages: Vec<StageLog>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[StageLog] {
        &self.stages
    }

    pub fn is_success(&self) -> bool {
        self.stages.iter().all(|stage| stage.success)
    }

    /// Turns the first failed stage into [`LoaderError::DriverCompile`]
    pub fn check(&self) -> Result<(), LoaderError> {
        match self.stages.iter().find(|stage| !stage.success) {
            Some(stage) => Err(LoaderError::DriverCompile {
                stage: stage.kind,
                log: stage.log.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn write_to<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        write!(writer, "{self}")
    }
}

impl fmt::Display for CompileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stage in &self.stages {
            let status = if stage.success { "ok" } else { "failed" };
            writeln!(f, "{} stage: {status}", stage.kind)?;
            for line in stage.log.lines() {
                writeln!(f, "    {line}")?;
            }
        }
        Ok(())
    }
}
