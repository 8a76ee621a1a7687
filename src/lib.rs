pub mod config;
pub mod directory;
pub mod models;
pub mod notify;
pub mod view_model;

#[cfg(test)]
mod testing;

pub use config::ListConfig;
pub use directory::{ConversationDirectory, DeletionFailure, DeletionReport, DeletionService};
pub use models::{ConversationId, ConversationSummary, LastMessagePreview, ListDisplay};
pub use notify::{ChangeEvent, ChangeNotifier, EventQueue, Listener, ListenerId, Subscription};
pub use view_model::{ConversationListViewModel, ListState, Mode, Navigation};
