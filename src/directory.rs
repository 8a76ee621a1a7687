use serde::Serialize;

use crate::models::{ConversationId, ConversationSummary};

/// Read side of the messaging core: which conversations exist and what they look like.
pub trait ConversationDirectory: Send + Sync {
    /// Current conversations, most recently updated first.
    fn list_conversation_ids(&self) -> Vec<ConversationId>;

    /// `None` when the conversation no longer exists (stale id).
    fn resolve_summary(&self, id: &ConversationId) -> Option<ConversationSummary>;
}

/// Mutation side of the messaging core.
pub trait DeletionService: Send + Sync {
    /// Delete the conversation and its history.
    fn delete_conversation(&self, id: &ConversationId) -> Result<(), String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionFailure {
    pub id: ConversationId,
    pub error: String,
}

/// Outcome of a bulk delete. Every id is attempted; failures do not stop the batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub attempted: Vec<ConversationId>,
    pub failures: Vec<DeletionFailure>,
}

impl DeletionReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn deleted_count(&self) -> usize {
        self.attempted.len() - self.failures.len()
    }

    pub(crate) fn record(&mut self, id: ConversationId, result: Result<(), String>) {
        if let Err(error) = result {
            log::warn!("Failed to delete conversation {}: {}", id, error);
            self.failures.push(DeletionFailure {
                id: id.clone(),
                error,
            });
        }
        self.attempted.push(id);
    }
}
