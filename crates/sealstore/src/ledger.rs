// crates/sealstore/src/ledger.rs
// ============================================================================
// Module: Migration Ledger
// Description: Append-only ordered table of versioned migration steps.
// Purpose: Select the steps an upgrade between two versions must run.
// Dependencies: rusqlite
// ============================================================================

//! ## Overview
//! A [`MigrationLedger`] is an immutable list of [`MigrationStep`]s ordered by
//! strictly increasing threshold. A step with threshold `T` belongs to an
//! upgrade from `old` to `new` iff `old < T <= new`; an upgrade where
//! `old >= new` selects nothing, so no step at or below the stored version is
//! ever re-run and nothing ever runs backwards.
//!
//! The ledger is supplied as a value rather than read from a global, so tests
//! can substitute synthetic steps. Stores written by old builds may need the
//! full historical chain; new steps are appended, never inserted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use rusqlite::Connection;

use crate::error::StoreError;
use crate::purge::PurgeSpec;
use crate::statement::StatementBatch;
use crate::version::SchemaVersion;

// ============================================================================
// SECTION: Actions
// ============================================================================

/// Signature of a programmatic migration procedure.
pub type CustomProcedure = dyn Fn(&Connection) -> Result<(), StoreError> + Send + Sync;

/// Named programmatic migration procedure.
///
/// The procedure receives the connection that holds the upgrade transaction
/// and must do all of its work through it.
#[derive(Clone)]
pub struct CustomAction {
    /// Name used in logs and plans.
    name: String,
    /// Procedure body.
    procedure: Arc<CustomProcedure>,
}

impl CustomAction {
    /// Wraps a procedure under `name`.
    pub fn new<F>(name: impl Into<String>, procedure: F) -> Self
    where
        F: Fn(&Connection) -> Result<(), StoreError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            procedure: Arc::new(procedure),
        }
    }

    /// Returns the action name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the procedure.
    ///
    /// # Errors
    ///
    /// Returns whatever the procedure reports.
    pub fn run(&self, connection: &Connection) -> Result<(), StoreError> {
        (self.procedure)(connection)
    }
}

impl fmt::Debug for CustomAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomAction").field("name", &self.name).finish_non_exhaustive()
    }
}

/// One unit of schema or data change.
#[derive(Debug, Clone)]
pub enum MigrationAction {
    /// Raw statements run in order.
    Statements(StatementBatch),
    /// Removal of retired work-item kinds.
    Purge(PurgeSpec),
    /// Programmatic transformation over the upgrade transaction.
    Custom(CustomAction),
}

impl MigrationAction {
    /// Returns a short label for the action kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Statements(_) => "statements",
            Self::Purge(_) => "purge",
            Self::Custom(_) => "custom",
        }
    }
}

impl From<StatementBatch> for MigrationAction {
    fn from(batch: StatementBatch) -> Self {
        Self::Statements(batch)
    }
}

impl From<PurgeSpec> for MigrationAction {
    fn from(spec: PurgeSpec) -> Self {
        Self::Purge(spec)
    }
}

impl From<CustomAction> for MigrationAction {
    fn from(action: CustomAction) -> Self {
        Self::Custom(action)
    }
}

// ============================================================================
// SECTION: Steps
// ============================================================================

/// Versioned migration step.
///
/// A step usually carries one action; historical steps that bundled several
/// changes under one version keep them as an ordered list.
#[derive(Debug, Clone)]
pub struct MigrationStep {
    /// Version reached once this step has run.
    threshold: SchemaVersion,
    /// Human-readable summary.
    description: String,
    /// Actions in execution order.
    actions: Vec<MigrationAction>,
}

impl MigrationStep {
    /// Creates a step with no actions yet.
    #[must_use]
    pub fn new(threshold: u32, description: impl Into<String>) -> Self {
        Self {
            threshold: SchemaVersion::new(threshold),
            description: description.into(),
            actions: Vec::new(),
        }
    }

    /// Appends an action.
    #[must_use]
    pub fn then(mut self, action: impl Into<MigrationAction>) -> Self {
        self.actions.push(action.into());
        self
    }

    /// Returns the step threshold.
    #[must_use]
    pub const fn threshold(&self) -> SchemaVersion {
        self.threshold
    }

    /// Returns the step description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the step actions in execution order.
    #[must_use]
    pub fn actions(&self) -> &[MigrationAction] {
        &self.actions
    }
}

// ============================================================================
// SECTION: Ledger
// ============================================================================

/// Immutable, ordered migration history.
///
/// # Invariants
/// - Thresholds are non-zero and strictly increasing.
/// - Every step carries at least one action.
#[derive(Debug, Clone, Default)]
pub struct MigrationLedger {
    /// Steps in ascending threshold order.
    steps: Vec<MigrationStep>,
}

impl MigrationLedger {
    /// Builds a ledger from steps in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when a threshold is zero, thresholds are
    /// not strictly increasing, or a step has no actions.
    pub fn new(steps: Vec<MigrationStep>) -> Result<Self, StoreError> {
        let mut previous = SchemaVersion::UNSTAMPED;
        for step in &steps {
            if step.threshold.is_unstamped() {
                return Err(StoreError::Invalid(
                    "migration threshold must be greater than zero".to_string(),
                ));
            }
            if step.threshold <= previous {
                return Err(StoreError::Invalid(format!(
                    "migration thresholds must strictly increase: {} follows {previous}",
                    step.threshold
                )));
            }
            if step.actions.is_empty() {
                return Err(StoreError::Invalid(format!(
                    "migration step {} has no actions",
                    step.threshold
                )));
            }
            previous = step.threshold;
        }
        Ok(Self {
            steps,
        })
    }

    /// Returns the steps with `old < threshold <= new`, ascending.
    #[must_use]
    pub fn steps_between(&self, old: SchemaVersion, new: SchemaVersion) -> &[MigrationStep] {
        if old >= new {
            return &[];
        }
        let start = self.steps.partition_point(|step| step.threshold <= old);
        let end = self.steps.partition_point(|step| step.threshold <= new);
        self.steps.get(start .. end).unwrap_or_default()
    }

    /// Returns every step in order.
    #[must_use]
    pub fn steps(&self) -> &[MigrationStep] {
        &self.steps
    }

    /// Returns the highest threshold in the ledger.
    #[must_use]
    pub fn latest_version(&self) -> Option<SchemaVersion> {
        self.steps.last().map(MigrationStep::threshold)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::MigrationLedger;
    use super::MigrationStep;
    use crate::statement::StatementBatch;
    use crate::version::SchemaVersion;

    fn step(threshold: u32) -> MigrationStep {
        MigrationStep::new(threshold, format!("step {threshold}"))
            .then(StatementBatch::from("SELECT 1"))
    }

    fn thresholds(steps: &[MigrationStep]) -> Vec<u32> {
        steps.iter().map(|step| step.threshold().get()).collect()
    }

    #[test]
    fn rejects_out_of_order_thresholds() {
        assert!(MigrationLedger::new(vec![step(3), step(2)]).is_err());
        assert!(MigrationLedger::new(vec![step(3), step(3)]).is_err());
    }

    #[test]
    fn rejects_zero_threshold_and_empty_step() {
        assert!(MigrationLedger::new(vec![step(0)]).is_err());
        assert!(MigrationLedger::new(vec![MigrationStep::new(4, "empty")]).is_err());
    }

    #[test]
    fn selects_half_open_range() -> Result<(), String> {
        let ledger = MigrationLedger::new(vec![step(2), step(4), step(6), step(8)])
            .map_err(|err| err.to_string())?;
        let selected = ledger.steps_between(SchemaVersion::new(2), SchemaVersion::new(6));
        assert_eq!(thresholds(selected), [4, 6]);
        let selected = ledger.steps_between(SchemaVersion::new(0), SchemaVersion::new(100));
        assert_eq!(thresholds(selected), [2, 4, 6, 8]);
        assert!(ledger.steps_between(SchemaVersion::new(8), SchemaVersion::new(6)).is_empty());
        assert_eq!(ledger.latest_version(), Some(SchemaVersion::new(8)));
        Ok(())
    }
}
