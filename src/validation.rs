use crate::{GraphStore, NodeId, NodeType};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Validation severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationSeverity {
    Info,    // Blue - informational
    Warning, // Yellow - probably unintended
    Error,   // Red - the flow cannot be walked
}

/// Validation issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: ValidationSeverity,
    pub message: String,
    pub affected_nodes: Vec<NodeId>,
    pub issue_type: ValidationIssueType,
}

/// Types of validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationIssueType {
    NoStartNode,
    MultipleStartNodes,
    UnreachableNode,
    Cycle,
    DeadEndQuestion,
}

/// Complete validation result
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self { issues: Vec::new() }
    }

    pub fn add_issue(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    fn with_severity(&self, severity: ValidationSeverity) -> Vec<&ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == severity).collect()
    }

    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == ValidationSeverity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == ValidationSeverity::Warning)
    }

    pub fn errors(&self) -> Vec<&ValidationIssue> {
        self.with_severity(ValidationSeverity::Error)
    }

    pub fn warnings(&self) -> Vec<&ValidationIssue> {
        self.with_severity(ValidationSeverity::Warning)
    }

    pub fn info(&self) -> Vec<&ValidationIssue> {
        self.with_severity(ValidationSeverity::Info)
    }

    /// Check if validation passed (no errors)
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// Whether any issue of this type was reported
    pub fn has_issue(&self, issue_type: ValidationIssueType) -> bool {
        self.issues.iter().any(|i| i.issue_type == issue_type)
    }
}

/// Structural checks over a flow
pub struct Validator;

impl Validator {
    /// Run all validations on a store
    pub fn validate(store: &GraphStore) -> ValidationResult {
        let mut result = ValidationResult::new();

        let mut starts: Vec<NodeId> = store
            .nodes()
            .values()
            .filter(|n| n.node_type == NodeType::Start)
            .map(|n| n.id.clone())
            .collect();
        starts.sort();

        match starts.len() {
            0 if !store.is_empty() => result.add_issue(ValidationIssue {
                severity: ValidationSeverity::Error,
                message: "No start node. The flow has no entry point.".to_string(),
                affected_nodes: vec![],
                issue_type: ValidationIssueType::NoStartNode,
            }),
            0 | 1 => {}
            n => result.add_issue(ValidationIssue {
                severity: ValidationSeverity::Error,
                message: format!("{n} start nodes found; a flow has exactly one."),
                affected_nodes: starts.clone(),
                issue_type: ValidationIssueType::MultipleStartNodes,
            }),
        }

        if let Some(cycle_nodes) = Self::detect_cycles(store) {
            result.add_issue(ValidationIssue {
                severity: ValidationSeverity::Warning,
                message: format!(
                    "Cycle detected involving {} nodes. Walking the flow may never finish.",
                    cycle_nodes.len()
                ),
                affected_nodes: cycle_nodes,
                issue_type: ValidationIssueType::Cycle,
            });
        }

        if !starts.is_empty() {
            let unreachable = Self::find_unreachable_nodes(store, &starts);
            if !unreachable.is_empty() {
                result.add_issue(ValidationIssue {
                    severity: ValidationSeverity::Warning,
                    message: format!(
                        "{} node(s) cannot be reached from the start node.",
                        unreachable.len()
                    ),
                    affected_nodes: unreachable,
                    issue_type: ValidationIssueType::UnreachableNode,
                });
            }
        }

        let mut dead_ends: Vec<NodeId> = store
            .nodes()
            .values()
            .filter(|n| n.node_type == NodeType::Question)
            .filter(|n| store.outgoing_edges(&n.id).is_empty())
            .map(|n| n.id.clone())
            .collect();
        if !dead_ends.is_empty() {
            dead_ends.sort();
            result.add_issue(ValidationIssue {
                severity: ValidationSeverity::Info,
                message: format!("{} question(s) have no answers yet.", dead_ends.len()),
                affected_nodes: dead_ends,
                issue_type: ValidationIssueType::DeadEndQuestion,
            });
        }

        result
    }

    /// Detect cycles in the edge graph using DFS
    fn detect_cycles(store: &GraphStore) -> Option<Vec<NodeId>> {
        let mut visited = HashSet::new();
        let mut rec_stack = HashSet::new();
        let mut cycle_nodes = Vec::new();

        let mut ids: Vec<&NodeId> = store.nodes().keys().collect();
        ids.sort();

        for node_id in ids {
            if !visited.contains(node_id)
                && Self::dfs_detect_cycle(
                    store,
                    node_id,
                    &mut visited,
                    &mut rec_stack,
                    &mut cycle_nodes,
                )
            {
                return Some(cycle_nodes);
            }
        }

        None
    }

    fn dfs_detect_cycle<'a>(
        store: &'a GraphStore,
        node_id: &'a NodeId,
        visited: &mut HashSet<&'a NodeId>,
        rec_stack: &mut HashSet<&'a NodeId>,
        cycle_nodes: &mut Vec<NodeId>,
    ) -> bool {
        visited.insert(node_id);
        rec_stack.insert(node_id);

        for edge in store.outgoing_edges(node_id) {
            let target = &edge.target;

            if !visited.contains(target) {
                if Self::dfs_detect_cycle(store, target, visited, rec_stack, cycle_nodes) {
                    cycle_nodes.push(node_id.clone());
                    return true;
                }
            } else if rec_stack.contains(target) {
                cycle_nodes.push(node_id.clone());
                cycle_nodes.push(target.clone());
                return true;
            }
        }

        rec_stack.remove(node_id);
        false
    }

    /// Nodes no start node leads to
    fn find_unreachable_nodes(store: &GraphStore, starts: &[NodeId]) -> Vec<NodeId> {
        let mut reachable = HashSet::new();
        let mut queue: Vec<&NodeId> = starts.iter().collect();

        while let Some(node_id) = queue.pop() {
            if !reachable.insert(node_id) {
                continue;
            }
            for edge in store.outgoing_edges(node_id) {
                queue.push(&edge.target);
            }
        }

        let mut unreachable: Vec<NodeId> = store
            .nodes()
            .keys()
            .filter(|id| !reachable.contains(id))
            .cloned()
            .collect();
        unreachable.sort();
        unreachable
    }
}

/// Extension trait for GraphStore to add validation
pub trait ValidatedStore {
    fn validate(&self) -> ValidationResult;

    /// Highest severity reported per node
    fn nodes_with_issues(&self, result: &ValidationResult) -> HashMap<NodeId, ValidationSeverity>;
}

impl ValidatedStore for GraphStore {
    fn validate(&self) -> ValidationResult {
        Validator::validate(self)
    }

    fn nodes_with_issues(&self, result: &ValidationResult) -> HashMap<NodeId, ValidationSeverity> {
        let mut nodes = HashMap::new();

        for issue in &result.issues {
            for node_id in &issue.affected_nodes {
                nodes
                    .entry(node_id.clone())
                    .and_modify(|severity| {
                        if issue.severity as u8 > *severity as u8 {
                            *severity = issue.severity;
                        }
                    })
                    .or_insert(issue.severity);
            }
        }

        nodes
    }
}
