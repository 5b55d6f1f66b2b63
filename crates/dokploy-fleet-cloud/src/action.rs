//! Planned actions for a submission

use serde::{Deserialize, Serialize};

/// A planned action for one declared resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Unique identifier for the action
    pub id: String,

    pub action_type: ActionType,

    /// Engine type token of the resource
    pub resource_type: String,

    /// Logical name of the resource
    pub resource_name: String,

    pub description: String,
}

impl Action {
    pub fn create(resource_type: impl Into<String>, resource_name: impl Into<String>) -> Self {
        let resource_type = resource_type.into();
        let resource_name = resource_name.into();
        Self {
            id: format!("create-{}", resource_name),
            action_type: ActionType::Create,
            description: format!("Create {} {}", resource_type, resource_name),
            resource_type,
            resource_name,
        }
    }

    pub fn no_op(resource_type: impl Into<String>, resource_name: impl Into<String>) -> Self {
        let resource_type = resource_type.into();
        let resource_name = resource_name.into();
        Self {
            id: format!("noop-{}", resource_name),
            action_type: ActionType::NoOp,
            description: format!("{} {} is already provisioned", resource_type, resource_name),
            resource_type,
            resource_name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// The engine has no record of the resource
    Create,
    /// The engine already reports the resource
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// Result of submitting a plan
///
/// Submission is all-or-nothing: any failure is returned as an error, so
/// only accepted actions are listed here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplyResult {
    pub accepted: Vec<ActionResult>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl ApplyResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_accepted(&mut self, action_id: String, message: String) {
        self.accepted.push(ActionResult { action_id, message });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResult {
    pub action_id: String,
    pub message: String,
}

/// Plan containing one action per declared resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub actions: Vec<Action>,

    /// Whether the plan has any changes
    pub has_changes: bool,
}

impl Plan {
    pub fn new(actions: Vec<Action>) -> Self {
        let has_changes = actions.iter().any(|a| a.action_type != ActionType::NoOp);
        Self {
            actions,
            has_changes,
        }
    }

    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            no_change: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

/// Summary of planned actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    pub create: usize,
    pub no_change: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} unchanged",
            self.create, self.no_change
        )
    }
}
