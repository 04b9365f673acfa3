use std::path::Path;
use std::sync::Arc;

use parley_core::{
    filter_conversations, AppState, ChatError, ChatEvent, ChatMessage, ChatSession, ClipboardWriter,
    Config, Conversation, FilePicker, Responder, SettingField, Settings, SettingsChange,
    SettingsSection, Store,
};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
    Searching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Sidebar,
    Chat,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsFocus {
    #[default]
    Sections,
    Fields,
}

/// Transient toast shown in the bottom-right corner.
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub ticks_left: u8,
}

const NOTIFICATION_TICKS: u8 = 10;

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,
    pub store: Store,
    pub chat: ChatSession,

    // Sidebar state
    pub sidebar_state: ListState,
    pub sidebar_search: String,
    pub sidebar_collapsed: bool,

    // Chat view state
    pub selected_message: Option<usize>,
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of message area for scroll calculations
    pub chat_width: u16,  // Width of message area for wrap calculations

    // Settings panel state
    pub show_settings: bool,
    pub settings: Settings,
    pub settings_focus: SettingsFocus,
    pub section_state: ListState,
    pub field_state: ListState,

    // Attach prompt state
    pub show_attach_prompt: bool,
    pub attach_input: String,

    pub notification: Option<Notification>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub sidebar_area: Option<Rect>,
    pub messages_area: Option<Rect>,

    clipboard: Box<dyn ClipboardWriter>,
    file_picker: Box<dyn FilePicker>,
}

impl App {
    pub fn new(
        config: &Config,
        responder: Arc<dyn Responder>,
        clipboard: Box<dyn ClipboardWriter>,
        file_picker: Box<dyn FilePicker>,
    ) -> Self {
        let store = Store::new(AppState::initial(config.model()));
        let settings = Settings::for_model(config.model());

        let mut sidebar_state = ListState::default();
        sidebar_state.select(Some(0));
        let mut section_state = ListState::default();
        section_state.select(Some(0));

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Input,
            store,
            chat: ChatSession::new(responder),

            sidebar_state,
            sidebar_search: String::new(),
            sidebar_collapsed: false,

            selected_message: None,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            show_settings: false,
            settings,
            settings_focus: SettingsFocus::default(),
            section_state,
            field_state: ListState::default(),

            show_attach_prompt: false,
            attach_input: String::new(),

            notification: None,
            animation_frame: 0,

            sidebar_area: None,
            messages_area: None,

            clipboard,
            file_picker,
        }
    }

    // Sidebar

    pub fn visible_conversations(&self) -> Vec<&Conversation> {
        filter_conversations(self.store.conversations(), &self.sidebar_search)
    }

    pub fn highlighted_conversation_id(&self) -> Option<String> {
        let visible = self.visible_conversations();
        self.sidebar_state
            .selected()
            .and_then(|i| visible.get(i))
            .map(|c| c.id.clone())
    }

    pub fn sidebar_nav_down(&mut self) {
        let len = self.visible_conversations().len();
        if len > 0 {
            let i = self.sidebar_state.selected().unwrap_or(0);
            self.sidebar_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn sidebar_nav_up(&mut self) {
        let i = self.sidebar_state.selected().unwrap_or(0);
        self.sidebar_state.select(Some(i.saturating_sub(1)));
    }

    /// Point the sidebar highlight at the active conversation (or clamp it).
    pub fn sync_sidebar_selection(&mut self) {
        let visible = self.visible_conversations();
        let active = self.store.active_conversation_id();
        let index = active
            .and_then(|id| visible.iter().position(|c| c.id == id))
            .or_else(|| {
                let len = visible.len();
                (len > 0).then(|| self.sidebar_state.selected().unwrap_or(0).min(len - 1))
            });
        self.sidebar_state.select(index);
    }

    pub fn search_push(&mut self, c: char) {
        self.sidebar_search.push(c);
        self.reset_sidebar_highlight();
    }

    pub fn search_pop(&mut self) {
        self.sidebar_search.pop();
        self.reset_sidebar_highlight();
    }

    pub fn clear_search(&mut self) {
        self.sidebar_search.clear();
        self.sync_sidebar_selection();
    }

    fn reset_sidebar_highlight(&mut self) {
        let any = !self.visible_conversations().is_empty();
        self.sidebar_state.select(any.then_some(0));
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_collapsed = !self.sidebar_collapsed;
        if self.sidebar_collapsed && self.focus == FocusPane::Sidebar {
            self.focus = FocusPane::Chat;
        }
    }

    pub fn new_conversation(&mut self) {
        self.store.create_conversation();
        self.sidebar_search.clear();
        self.after_navigation();
        self.focus = FocusPane::Input;
        self.input_mode = InputMode::Editing;
    }

    pub fn select_highlighted(&mut self) {
        if let Some(id) = self.highlighted_conversation_id() {
            self.store.select_conversation(id);
            self.after_navigation();
        }
    }

    pub fn delete_highlighted(&mut self) {
        if let Some(id) = self.highlighted_conversation_id() {
            let result = self.store.delete_conversation(&id);
            self.absorb(result);
            self.after_navigation();
        }
    }

    fn after_navigation(&mut self) {
        if let Some(ChatEvent::Cancelled { .. }) = self.chat.conversation_changed(&self.store) {
            self.notify("Reply cancelled", "The pending reply was discarded");
        }
        self.selected_message = None;
        self.sync_sidebar_selection();
        self.scroll_chat_to_bottom();
    }

    // Chat

    pub fn active_messages(&self) -> &[ChatMessage] {
        self.store
            .active_conversation()
            .map(|c| c.messages.as_slice())
            .unwrap_or(&[])
    }

    pub fn send_message(&mut self) {
        let result = self.chat.send(&mut self.store);
        if result.is_ok() {
            self.selected_message = None;
            self.sync_sidebar_selection();
            self.scroll_chat_to_bottom();
        }
        self.absorb(result);
    }

    pub fn regenerate(&mut self) {
        let result = self.chat.regenerate(&mut self.store);
        if result.is_ok() {
            self.selected_message = None;
            self.scroll_chat_to_bottom();
        }
        self.absorb(result);
    }

    pub fn message_nav_down(&mut self) {
        let len = self.active_messages().len();
        if len > 0 {
            let next = self.selected_message.map(|i| i + 1).unwrap_or(0);
            self.selected_message = Some(next.min(len - 1));
        }
    }

    pub fn message_nav_up(&mut self) {
        if let Some(current) = self.selected_message {
            self.selected_message = Some(current.saturating_sub(1));
        } else if !self.active_messages().is_empty() {
            self.selected_message = Some(self.active_messages().len() - 1);
        }
    }

    pub fn copy_selected_message(&mut self) {
        let Some(message) = self
            .selected_message
            .and_then(|i| self.active_messages().get(i))
            .cloned()
        else {
            return;
        };

        match self.chat.copy_message(self.clipboard.as_ref(), &message) {
            Ok(()) => self.notify("Copied to clipboard", "Message content copied successfully"),
            Err(e) => {
                tracing::warn!(error = %e, "copy failed");
                self.notify("Copy failed", &e.to_string());
            }
        }
    }

    // Attachment

    pub fn open_attach_prompt(&mut self) {
        self.show_attach_prompt = true;
        self.attach_input.clear();
    }

    pub fn confirm_attach(&mut self) {
        self.show_attach_prompt = false;
        let requested = std::mem::take(&mut self.attach_input);
        if requested.trim().is_empty() {
            return;
        }

        match self.chat.attach(self.file_picker.as_ref(), Path::new(requested.trim())) {
            Ok(file) => {
                let description = format!("{} is ready to upload", file.name);
                self.notify("File selected", &description);
            }
            Err(e) => self.notify("Could not attach file", &e.to_string()),
        }
    }

    // Settings

    pub fn open_settings(&mut self) {
        self.show_settings = true;
        self.settings_focus = SettingsFocus::Sections;
        self.field_state.select(None);
    }

    pub fn current_section(&self) -> SettingsSection {
        SettingsSection::all()
            .get(self.section_state.selected().unwrap_or(0))
            .copied()
            .unwrap_or_default()
    }

    pub fn current_field(&self) -> Option<SettingField> {
        let fields = self.current_section().fields();
        self.field_state.selected().and_then(|i| fields.get(i).copied())
    }

    pub fn settings_nav_down(&mut self) {
        match self.settings_focus {
            SettingsFocus::Sections => {
                let i = self.section_state.selected().unwrap_or(0);
                self.section_state.select(Some((i + 1).min(SettingsSection::all().len() - 1)));
            }
            SettingsFocus::Fields => {
                let len = self.current_section().fields().len();
                if len > 0 {
                    let i = self.field_state.selected().unwrap_or(0);
                    self.field_state.select(Some((i + 1).min(len - 1)));
                }
            }
        }
    }

    pub fn settings_nav_up(&mut self) {
        match self.settings_focus {
            SettingsFocus::Sections => {
                let i = self.section_state.selected().unwrap_or(0);
                self.section_state.select(Some(i.saturating_sub(1)));
            }
            SettingsFocus::Fields => {
                let i = self.field_state.selected().unwrap_or(0);
                self.field_state.select(Some(i.saturating_sub(1)));
            }
        }
    }

    pub fn toggle_settings_focus(&mut self) {
        self.settings_focus = match self.settings_focus {
            SettingsFocus::Sections if !self.current_section().fields().is_empty() => {
                self.field_state.select(Some(0));
                SettingsFocus::Fields
            }
            SettingsFocus::Sections => SettingsFocus::Sections,
            SettingsFocus::Fields => {
                self.field_state.select(None);
                SettingsFocus::Sections
            }
        };
    }

    pub fn adjust_setting(&mut self, forward: bool) {
        let Some(field) = self.current_field() else {
            return;
        };
        if let Some(SettingsChange::Model(name)) = self.settings.adjust(field, forward) {
            self.store.set_selected_model(name);
        }
    }

    pub fn play_voice_sample(&mut self) {
        let message = self.settings.play_voice_sample();
        self.notify("Voice", &message);
    }

    // Housekeeping

    pub fn notify(&mut self, title: &str, description: &str) {
        self.notification = Some(Notification {
            title: title.to_string(),
            description: description.to_string(),
            ticks_left: NOTIFICATION_TICKS,
        });
    }

    /// Silent rejections become debug log lines; the rest become a toast.
    fn absorb(&mut self, result: Result<(), ChatError>) {
        if let Err(e) = result {
            if e.is_silent() {
                tracing::debug!(error = %e, "request ignored");
            } else {
                tracing::warn!(error = %e, "request failed");
                self.notify("Something went wrong", &e.to_string());
            }
        }
    }

    /// Called by the Tick event
    pub async fn tick(&mut self) {
        if self.chat.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }

        match self.chat.tick(&mut self.store).await {
            Some(ChatEvent::ReplyDelivered { .. }) | Some(ChatEvent::ReplyRequested { .. }) => {
                self.scroll_chat_to_bottom();
            }
            Some(ChatEvent::ReplyFailed { error, .. }) => {
                self.notify("Reply failed", &error.to_string());
            }
            Some(ChatEvent::Cancelled { .. }) | None => {}
        }

        if let Some(notification) = &mut self.notification {
            notification.ticks_left = notification.ticks_left.saturating_sub(1);
            if notification.ticks_left == 0 {
                self.notification = None;
            }
        }
    }

    /// Scroll chat to bottom so the newest message (or "Thinking...") is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for msg in self.active_messages() {
            total_lines = total_lines.saturating_add(1); // Role line
            for line in msg.content.lines() {
                let char_count = line.chars().count();
                total_lines = total_lines.saturating_add((char_count / wrap_width + 1) as u16);
            }
            total_lines = total_lines.saturating_add(1); // Blank line after message
        }
        if self.chat.is_pending() {
            total_lines = total_lines.saturating_add(2);
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        self.chat_scroll = total_lines.saturating_sub(visible_height);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    /// Abort anything in flight before the runtime goes away.
    pub fn shutdown(&mut self) {
        self.chat.cancel();
    }
}
