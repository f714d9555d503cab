//! Toolbar edit and delete commands.
//!
//! Editing goes through an external modal: the router hands it the node's
//! current label, and the modal's confirmation comes back through
//! [`EditCommandRouter::on_save`].

use crate::{Edge, GraphStore, Node, NodeId, Result};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

pub const LABEL_SUFFIX_LEN: usize = 4;

/// What the modal is opened with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    pub id: NodeId,
    pub label: String,
}

/// Dialog that lets the user edit a node label
pub trait ModalCollaborator {
    fn open(&mut self, request: EditRequest);
}

/// Part of a label before the first `_`, or the whole label
pub fn first_segment(label: &str) -> &str {
    label.split_once('_').map_or(label, |(head, _)| head)
}

#[derive(Debug, Clone)]
pub struct EditCommandRouter {
    rng: StdRng,
}

impl EditCommandRouter {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Router with a fixed seed, for reproducible labels
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Hand the node's id and label to the modal. Returns `false` if the node is unknown.
    pub fn open_editor(
        &self,
        store: &GraphStore,
        node_id: &NodeId,
        modal: &mut dyn ModalCollaborator,
    ) -> bool {
        let Some(node) = store.node(node_id) else {
            debug!(id = %node_id, "edit requested for unknown node");
            return false;
        };

        modal.open(EditRequest {
            id: node.id.clone(),
            label: node.label.clone(),
        });
        true
    }

    /// Apply a confirmed edit and return the new label.
    ///
    /// The new label is the current label's first `_` segment plus a random
    /// 4-character suffix; `raw_input` is not used. Unknown ids yield `None`.
    pub fn on_save(&mut self, store: &mut GraphStore, node_id: &NodeId, raw_input: &str) -> Option<String> {
        let current = store.node(node_id)?.label.clone();
        let new_label = format!("{}_{}", first_segment(&current), self.suffix());

        debug!(id = %node_id, input = raw_input, label = %new_label, "label edited");
        store.update_node_label(node_id, new_label.clone());
        Some(new_label)
    }

    /// Delete a node together with every edge touching it
    pub fn on_delete(&mut self, store: &mut GraphStore, node_id: &NodeId) -> Result<(Node, Vec<Edge>)> {
        let removed = store.remove_node(node_id)?;
        info!(id = %node_id, edges = removed.1.len(), "node deleted");
        Ok(removed)
    }

    fn suffix(&mut self) -> String {
        (&mut self.rng)
            .sample_iter(&Alphanumeric)
            .take(LABEL_SUFFIX_LEN)
            .map(char::from)
            .collect()
    }
}

impl Default for EditCommandRouter {
    fn default() -> Self {
        Self::new()
    }
}
