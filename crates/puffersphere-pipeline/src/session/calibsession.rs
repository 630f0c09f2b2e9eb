//! Generic calibration session container.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

use super::problem_type::{InvalidationPolicy, ProblemType};
use super::types::{ExportRecord, LogEntry, SessionMetadata};

/// Config, input, intermediate state and output of one calibration run.
///
/// Step functions mutate the session in place and append to `log`. Replacing
/// the input clears computed results according to
/// [`ProblemType::on_input_change`]; replacing the config follows
/// [`ProblemType::on_config_change`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "P: ProblemType")]
pub struct CalibrationSession<P: ProblemType> {
    pub metadata: SessionMetadata,
    pub config: P::Config,
    input: Option<P::Input>,
    pub state: P::State,
    output: Option<P::Output>,
    pub exports: Vec<ExportRecord<P::Export>>,
    pub log: Vec<LogEntry>,
}

impl<P: ProblemType> CalibrationSession<P> {
    pub fn new() -> Self {
        Self {
            metadata: SessionMetadata::new(P::name(), P::schema_version()),
            config: P::Config::default(),
            input: None,
            state: P::State::default(),
            output: None,
            exports: Vec::new(),
            log: Vec::new(),
        }
    }

    /// New session holding `input`.
    ///
    /// # Errors
    ///
    /// Fails if [`ProblemType::validate_input`] rejects the input.
    pub fn with_input(input: P::Input) -> Result<Self> {
        let mut session = Self::new();
        session.set_input(input)?;
        Ok(session)
    }

    fn invalidate(&mut self, policy: InvalidationPolicy) {
        if policy.clear_state {
            self.state = P::State::default();
        }
        if policy.clear_output {
            self.output = None;
        }
        if policy.clear_exports {
            self.exports.clear();
        }
    }

    /// Replace the input.
    ///
    /// # Errors
    ///
    /// Fails if [`ProblemType::validate_input`] rejects the input; the
    /// session is left unchanged.
    pub fn set_input(&mut self, input: P::Input) -> Result<()> {
        P::validate_input(&input)?;
        self.invalidate(P::on_input_change());
        self.input = Some(input);
        self.metadata.touch();
        Ok(())
    }

    pub fn require_input(&self) -> Result<&P::Input> {
        self.input.as_ref().ok_or_else(|| anyhow!("input not set"))
    }

    /// Replace the config.
    ///
    /// # Errors
    ///
    /// Fails if [`ProblemType::validate_config`] rejects it.
    pub fn set_config(&mut self, config: P::Config) -> Result<()> {
        P::validate_config(&config)?;
        self.invalidate(P::on_config_change());
        self.config = config;
        self.metadata.touch();
        Ok(())
    }

    /// Edit a copy of the config and apply it through [`set_config`](Self::set_config).
    pub fn update_config<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut P::Config),
    {
        let mut config = self.config.clone();
        f(&mut config);
        self.set_config(config)
    }

    pub fn output(&self) -> Option<&P::Output> {
        self.output.as_ref()
    }

    pub fn require_output(&self) -> Result<&P::Output> {
        self.output.as_ref().ok_or_else(|| anyhow!("output not computed"))
    }

    pub fn set_output(&mut self, output: P::Output) {
        self.output = Some(output);
        self.metadata.touch();
    }

    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    pub fn clear_output(&mut self) {
        self.output = None;
        self.metadata.touch();
    }

    /// Convert the output to its export form and record it.
    pub fn export(&mut self) -> Result<P::Export> {
        let export = P::export(self.require_output()?, &self.config)?;
        self.exports.push(ExportRecord::new(export.clone()));
        self.metadata.touch();
        Ok(export)
    }

    /// Check that input is present and that input and config are acceptable.
    pub fn validate(&self) -> Result<()> {
        P::validate_input(self.require_input()?)?;
        P::validate_config(&self.config)
    }

    pub fn log_success(&mut self, operation: impl Into<String>) {
        self.log.push(LogEntry::success(operation));
        self.metadata.touch();
    }

    pub fn log_success_with_notes(
        &mut self,
        operation: impl Into<String>,
        notes: impl Into<String>,
    ) {
        self.log.push(LogEntry::success_with_notes(operation, notes));
        self.metadata.touch();
    }

    pub fn log_failure(&mut self, operation: impl Into<String>, error: impl Into<String>) {
        self.log.push(LogEntry::failure(operation, error));
        self.metadata.touch();
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Parse a session, rejecting other problem types and newer schemas.
    pub fn from_json(json: &str) -> Result<Self> {
        let session: Self = serde_json::from_str(json)?;
        if session.metadata.problem_type != P::name() {
            bail!(
                "session belongs to problem type '{}', expected '{}'",
                session.metadata.problem_type,
                P::name()
            );
        }
        if session.metadata.schema_version > P::schema_version() {
            bail!(
                "session schema version {} is newer than supported version {}",
                session.metadata.schema_version,
                P::schema_version()
            );
        }
        Ok(session)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)
            .with_context(|| format!("failed to write session {}", path.display()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read session {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("invalid session file {}", path.display()))
    }
}

impl<P: ProblemType> Default for CalibrationSession<P> {
    fn default() -> Self {
        Self::new()
    }
}
