use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexSet;

use crate::config::ListConfig;
use crate::directory::{ConversationDirectory, DeletionReport, DeletionService};
use crate::models::{
    ConversationId, ConversationRow, ConversationSummary, EditToolbar, ListDisplay, UnreadBadge,
};
use crate::notify::{ChangeEvent, ChangeNotifier, EventQueue, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Editing,
}

/// Where a split-pane host should navigate after leaving edit mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Conversation(ConversationId),
    /// Nothing left to show.
    Empty,
}

// ---------------------------------------------------------------------------
// ListState
// ---------------------------------------------------------------------------

/// Ordered ids plus edit/selection state.
///
/// `selected` is always a subset of `ordered_ids`, and empty outside edit mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListState {
    ordered_ids: IndexSet<ConversationId>,
    edit_mode: bool,
    selected: IndexSet<ConversationId>,
}

impl ListState {
    pub fn ordered_ids(&self) -> impl Iterator<Item = &ConversationId> {
        self.ordered_ids.iter()
    }

    pub fn len(&self) -> usize {
        self.ordered_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered_ids.is_empty()
    }

    pub fn contains(&self, id: &ConversationId) -> bool {
        self.ordered_ids.contains(id)
    }

    pub fn edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn selected_ids(&self) -> impl Iterator<Item = &ConversationId> {
        self.selected.iter()
    }

    pub fn is_selected(&self, id: &ConversationId) -> bool {
        self.selected.contains(id)
    }

    pub fn selection_count(&self) -> usize {
        self.selected.len()
    }

    pub fn all_selected(&self) -> bool {
        !self.ordered_ids.is_empty() && self.selected.len() == self.ordered_ids.len()
    }
}

// ---------------------------------------------------------------------------
// ConversationListViewModel
// ---------------------------------------------------------------------------

/// Conversation list screen logic: ordering, edit mode, multi-select deletion.
///
/// Owned by the UI thread. External change notifications are posted into an
/// internal queue and applied by [`pump_events`](Self::pump_events) or
/// [`next_event`](Self::next_event).
pub struct ConversationListViewModel {
    directory: Arc<dyn ConversationDirectory>,
    deletion: Arc<dyn DeletionService>,
    notifier: Arc<dyn ChangeNotifier>,
    config: ListConfig,
    state: ListState,
    summaries: HashMap<ConversationId, ConversationSummary>,
    events: EventQueue,
    subscription: Option<Subscription>,
    navigation: Option<Navigation>,
    revision: u64,
}

impl std::fmt::Debug for ConversationListViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationListViewModel")
            .field("state", &self.state)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl ConversationListViewModel {
    pub fn new(
        directory: Arc<dyn ConversationDirectory>,
        deletion: Arc<dyn DeletionService>,
        notifier: Arc<dyn ChangeNotifier>,
    ) -> Self {
        Self::with_config(directory, deletion, notifier, ListConfig::default())
    }

    pub fn with_config(
        directory: Arc<dyn ConversationDirectory>,
        deletion: Arc<dyn DeletionService>,
        notifier: Arc<dyn ChangeNotifier>,
        config: ListConfig,
    ) -> Self {
        ConversationListViewModel {
            directory,
            deletion,
            notifier,
            config,
            state: ListState::default(),
            summaries: HashMap::new(),
            events: EventQueue::new(),
            subscription: None,
            navigation: None,
            revision: 0,
        }
    }

    // -- lifecycle -----------------------------------------------------------

    /// Screen became visible: subscribe to changes (once) and load the list.
    pub fn on_visible(&mut self) {
        if self.subscription.is_none() {
            let listener = self.events.poster().listener();
            self.subscription = Some(Subscription::new(self.notifier.clone(), listener));
        }
        self.refresh();
    }

    /// Screen was hidden: unsubscribe and discard all list state.
    pub fn on_hidden(&mut self) {
        self.subscription = None;
        let dropped = self.events.clear();
        if dropped > 0 {
            log::debug!("Discarded {} pending change events", dropped);
        }
        self.state = ListState::default();
        self.summaries.clear();
        self.navigation = None;
        self.recompute();
    }

    pub fn is_visible(&self) -> bool {
        self.subscription.is_some()
    }

    // -- change notifications -----------------------------------------------

    /// Apply every queued change event. Refreshes once if anything was pending.
    pub fn pump_events(&mut self) -> usize {
        let handled = self.drain_events();
        if handled > 0 && self.is_visible() {
            self.refresh();
        }
        handled
    }

    /// Wait for the next change event, then apply it along with anything queued behind it.
    pub async fn next_event(&mut self) -> Option<ChangeEvent> {
        let event = self.events.next().await?;
        log::debug!("Change event: {:?}", event);
        self.drain_events();
        if self.is_visible() {
            self.refresh();
        }
        Some(event)
    }

    fn drain_events(&mut self) -> usize {
        let mut drained = 0;
        while let Some(event) = self.events.try_next() {
            log::debug!("Change event: {:?}", event);
            drained += 1;
        }
        drained
    }

    // -- operations ----------------------------------------------------------

    /// Re-fetch the ordered ids from the directory, dropping stale entries.
    pub fn refresh(&mut self) {
        let ids = self.directory.list_conversation_ids();
        let mut ordered = IndexSet::with_capacity(ids.len());
        let mut summaries = HashMap::with_capacity(ids.len());
        let mut stale = 0usize;

        for id in ids {
            if ordered.contains(&id) {
                continue;
            }
            match self.directory.resolve_summary(&id) {
                Some(summary) => {
                    summaries.insert(id.clone(), summary);
                    ordered.insert(id);
                }
                None => {
                    log::debug!("Skipping stale conversation {}", id);
                    stale += 1;
                }
            }
        }

        let ListState {
            ordered_ids,
            selected,
            ..
        } = &mut self.state;
        *ordered_ids = ordered;
        selected.retain(|id| ordered_ids.contains(id));
        self.summaries = summaries;

        log::debug!(
            "Refreshed conversation list: {} rows, {} stale",
            self.state.len(),
            stale
        );
        self.recompute();
    }

    pub fn enter_edit_mode(&mut self) {
        self.state.edit_mode = true;
        self.state.selected.clear();
        self.recompute();
    }

    pub fn exit_edit_mode(&mut self) {
        self.state.edit_mode = false;
        self.state.selected.clear();
        if self.config.open_first_after_edit {
            self.navigation = Some(match self.first_conversation() {
                Some(id) => Navigation::Conversation(id.clone()),
                None => Navigation::Empty,
            });
        }
        self.recompute();
    }

    /// No-op outside edit mode or for ids not in the list.
    pub fn toggle_selection(&mut self, id: &ConversationId) {
        if !self.state.edit_mode || !self.state.contains(id) {
            return;
        }
        if !self.state.selected.shift_remove(id) {
            self.state.selected.insert(id.clone());
        }
        self.recompute();
    }

    pub fn select_all(&mut self) {
        if !self.state.edit_mode {
            return;
        }
        self.state.selected = self.state.ordered_ids.clone();
        self.recompute();
    }

    pub fn deselect_all(&mut self) {
        if !self.state.edit_mode {
            return;
        }
        self.state.selected.clear();
        self.recompute();
    }

    /// Delete every selected conversation, then refresh and leave edit mode.
    ///
    /// Each deletion is attempted even if an earlier one failed.
    pub fn delete_selected(&mut self) -> DeletionReport {
        let targets: Vec<ConversationId> = self.state.selected.iter().cloned().collect();
        let mut report = DeletionReport::default();

        for id in targets {
            let result = self.deletion.delete_conversation(&id);
            report.record(id, result);
        }

        log::info!(
            "Deleted {} of {} selected conversations",
            report.deleted_count(),
            report.attempted.len()
        );

        self.refresh();
        self.exit_edit_mode();
        report
    }

    /// Delete a single conversation outside multi-select. Refreshes regardless of outcome.
    pub fn remove_one(&mut self, id: &ConversationId) -> Result<(), String> {
        let result = self.deletion.delete_conversation(id);
        if let Err(e) = &result {
            log::warn!("Failed to delete conversation {}: {}", id, e);
        }
        self.refresh();
        if self.config.open_first_after_edit {
            self.exit_edit_mode();
        }
        result
    }

    // -- navigation ----------------------------------------------------------

    /// Conversation to open for a row tap. Row taps don't navigate in edit mode.
    pub fn open(&self, id: &ConversationId) -> Option<ConversationId> {
        if self.state.edit_mode || !self.state.contains(id) {
            return None;
        }
        Some(id.clone())
    }

    pub fn first_conversation(&self) -> Option<&ConversationId> {
        self.state.ordered_ids.first()
    }

    /// Pending split-pane navigation, if the last edit produced one.
    pub fn take_navigation(&mut self) -> Option<Navigation> {
        self.navigation.take()
    }

    // -- accessors -----------------------------------------------------------

    pub fn state(&self) -> &ListState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        if self.state.edit_mode {
            Mode::Editing
        } else {
            Mode::Normal
        }
    }

    pub fn selection_count(&self) -> usize {
        self.state.selection_count()
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn summary(&self, id: &ConversationId) -> Option<&ConversationSummary> {
        self.summaries.get(id)
    }

    pub fn config(&self) -> &ListConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ListConfig) {
        self.config = config;
        self.recompute();
    }

    /// Bumped on every display-affecting change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Render model for the current state.
    pub fn display(&self) -> ListDisplay {
        let editing = self.state.edit_mode;
        let rows = self
            .state
            .ordered_ids
            .iter()
            .filter_map(|id| self.summaries.get(id).map(|s| self.row(id, s, editing)))
            .collect();

        let toolbar = editing.then(|| {
            let all = self.state.all_selected();
            EditToolbar {
                select_all_visible: !all,
                deselect_all_visible: all,
                delete_enabled: self.state.selection_count() > 0,
            }
        });

        ListDisplay {
            empty: self.state.is_empty(),
            edit_mode: editing,
            edit_enabled: !self.state.is_empty(),
            rows,
            toolbar,
        }
    }

    fn row(&self, id: &ConversationId, summary: &ConversationSummary, editing: bool) -> ConversationRow {
        let unread_badge = if editing {
            None
        } else {
            UnreadBadge::new(summary.unread_count, self.config.unread_badge_cap)
        };
        ConversationRow {
            id: id.clone(),
            display_name: summary.effective_display_name(),
            preview: summary
                .last_message_preview
                .truncated(self.config.preview_max_chars),
            timestamp: summary.last_message_timestamp,
            unread_badge,
            emphasized: summary.unread_count > 0,
            is_group: summary.is_group(),
            selected: editing.then(|| self.state.is_selected(id)),
        }
    }

    fn recompute(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
