pub mod ai;
pub mod capability;
pub mod chat;
pub mod config;
pub mod error;
pub mod settings;
pub mod sidebar;
pub mod state;
pub mod store;

// Re-export main types for convenience
pub use ai::{Responder, SimulatedResponder};
pub use capability::{ClipboardWriter, FilePicker, SelectedFile};
pub use chat::{ChatEvent, ChatSession};
pub use config::Config;
pub use error::ChatError;
pub use settings::{SettingField, Settings, SettingsChange, SettingsSection};
pub use sidebar::filter_conversations;
pub use state::{ChatMessage, ChatRole, Conversation};
pub use store::{reduce, Action, AppState, Store};
