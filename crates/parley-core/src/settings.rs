//! Settings panel model
//!
//! Every option is a closed menu. Only the model choice leaves the panel:
//! [`Settings::adjust`] reports it so the caller can forward it to the store.
//! Nothing here is persisted.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, Serialize, Deserialize)]
pub enum ModelChoice {
    #[default]
    #[strum(serialize = "GPT-4")]
    Gpt4,
    #[strum(serialize = "GPT-3.5")]
    Gpt35,
    Claude,
    Gemini,
}

impl ModelChoice {
    pub fn from_name(name: &str) -> Option<Self> {
        Self::iter().find(|m| m.to_string() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[strum(serialize = "Auto-detect")]
    AutoDetect,
    English,
    Spanish,
    French,
    German,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, Serialize, Deserialize)]
pub enum Voice {
    #[default]
    Ember,
    Alloy,
    Echo,
    Fable,
    Nova,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter)]
pub enum SettingsSection {
    #[default]
    General,
    Notifications,
    Personalization,
    #[strum(serialize = "Connected apps")]
    ConnectedApps,
    #[strum(serialize = "Data controls")]
    DataControls,
    Security,
    Account,
}

impl SettingsSection {
    /// Sections in panel order.
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }

    pub fn fields(&self) -> &'static [SettingField] {
        match self {
            SettingsSection::General => &[
                SettingField::Model,
                SettingField::Theme,
                SettingField::Language,
                SettingField::SpokenLanguage,
                SettingField::Voice,
                SettingField::FollowUpSuggestions,
            ],
            SettingsSection::Notifications => &[SettingField::EmailNotifications, SettingField::PushNotifications],
            SettingsSection::DataControls => &[SettingField::DataSharing],
            SettingsSection::Security => &[SettingField::TwoFactorAuth],
            SettingsSection::Personalization | SettingsSection::ConnectedApps | SettingsSection::Account => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum SettingField {
    Model,
    Theme,
    Language,
    SpokenLanguage,
    Voice,
    FollowUpSuggestions,
    EmailNotifications,
    PushNotifications,
    DataSharing,
    TwoFactorAuth,
}

impl SettingField {
    pub fn label(&self) -> &'static str {
        match self {
            SettingField::Model => "Model",
            SettingField::Theme => "Theme",
            SettingField::Language => "Language",
            SettingField::SpokenLanguage => "Spoken language",
            SettingField::Voice => "Voice",
            SettingField::FollowUpSuggestions => "Show follow up suggestions in chats",
            SettingField::EmailNotifications => "Email notifications",
            SettingField::PushNotifications => "Push notifications",
            SettingField::DataSharing => "Data sharing",
            SettingField::TwoFactorAuth => "Two-factor authentication",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SettingField::Model => "Choose the AI model for your conversations",
            SettingField::Theme => "Appearance of the interface",
            SettingField::Language => "Language used in the interface",
            SettingField::SpokenLanguage => "For best results, select the language you mainly speak",
            SettingField::Voice => "Voice used for spoken replies",
            SettingField::FollowUpSuggestions => "",
            SettingField::EmailNotifications => "Receive updates and news via email",
            SettingField::PushNotifications => "Get notified about important updates",
            SettingField::DataSharing => "Allow anonymous usage data to improve the service",
            SettingField::TwoFactorAuth => "Add an extra layer of security to your account",
        }
    }

    pub fn is_toggle(&self) -> bool {
        matches!(
            self,
            SettingField::FollowUpSuggestions
                | SettingField::EmailNotifications
                | SettingField::PushNotifications
                | SettingField::DataSharing
                | SettingField::TwoFactorAuth
        )
    }
}

/// Step to the next (or previous) variant, wrapping around.
fn cycle<T: IntoEnumIterator + PartialEq + Copy>(current: T, forward: bool) -> T {
    let all: Vec<T> = T::iter().collect();
    let len = all.len();
    let pos = all.iter().position(|v| *v == current).unwrap_or(0);
    let next = if forward { (pos + 1) % len } else { (pos + len - 1) % len };
    all[next]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub model: ModelChoice,
    /// Configured model name that is not on the menu. Shown until the menu is used.
    pub custom_model: Option<String>,
    pub theme: Theme,
    pub language: Language,
    pub spoken_language: Language,
    pub voice: Voice,
    pub follow_up_suggestions: bool,
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub data_sharing: bool,
    pub two_factor_auth: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: ModelChoice::default(),
            custom_model: None,
            theme: Theme::default(),
            language: Language::default(),
            spoken_language: Language::default(),
            voice: Voice::default(),
            follow_up_suggestions: true,
            email_notifications: true,
            push_notifications: false,
            data_sharing: false,
            two_factor_auth: false,
        }
    }
}

/// A settings change that matters outside the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsChange {
    Model(String),
}

impl Settings {
    /// Defaults, with the model menu pointing at `model`. Names not on the
    /// menu are kept as a custom value.
    pub fn for_model(model: &str) -> Self {
        match ModelChoice::from_name(model) {
            Some(choice) => Self {
                model: choice,
                ..Self::default()
            },
            None => {
                tracing::warn!(model, "model is not on the settings menu; showing it as custom");
                Self {
                    custom_model: Some(model.to_string()),
                    ..Self::default()
                }
            }
        }
    }

    /// Cycle a menu or flip a toggle.
    pub fn adjust(&mut self, field: SettingField, forward: bool) -> Option<SettingsChange> {
        match field {
            SettingField::Model => {
                self.model = match self.custom_model.take() {
                    // Leaving a custom model lands on the first (or last) menu entry
                    Some(_) if forward => ModelChoice::iter().next().unwrap_or_default(),
                    Some(_) => ModelChoice::iter().last().unwrap_or_default(),
                    None => cycle(self.model, forward),
                };
                return Some(SettingsChange::Model(self.model.to_string()));
            }
            SettingField::Theme => self.theme = cycle(self.theme, forward),
            SettingField::Language => self.language = cycle(self.language, forward),
            SettingField::SpokenLanguage => self.spoken_language = cycle(self.spoken_language, forward),
            SettingField::Voice => self.voice = cycle(self.voice, forward),
            SettingField::FollowUpSuggestions => self.follow_up_suggestions = !self.follow_up_suggestions,
            SettingField::EmailNotifications => self.email_notifications = !self.email_notifications,
            SettingField::PushNotifications => self.push_notifications = !self.push_notifications,
            SettingField::DataSharing => self.data_sharing = !self.data_sharing,
            SettingField::TwoFactorAuth => self.two_factor_auth = !self.two_factor_auth,
        }
        tracing::debug!(field = field.label(), value = %self.value_label(field), "setting changed");
        None
    }

    pub fn value_label(&self, field: SettingField) -> String {
        let toggle = |on: bool| (if on { "On" } else { "Off" }).to_string();
        match field {
            SettingField::Model => self
                .custom_model
                .clone()
                .unwrap_or_else(|| self.model.to_string()),
            SettingField::Theme => self.theme.to_string(),
            SettingField::Language => self.language.to_string(),
            SettingField::SpokenLanguage => self.spoken_language.to_string(),
            SettingField::Voice => self.voice.to_string(),
            SettingField::FollowUpSuggestions => toggle(self.follow_up_suggestions),
            SettingField::EmailNotifications => toggle(self.email_notifications),
            SettingField::PushNotifications => toggle(self.push_notifications),
            SettingField::DataSharing => toggle(self.data_sharing),
            SettingField::TwoFactorAuth => toggle(self.two_factor_auth),
        }
    }

    /// There is no audio backend; the sample is only announced.
    pub fn play_voice_sample(&self) -> String {
        tracing::info!(voice = %self.voice, "playing voice sample");
        format!("Playing {} voice sample", self.voice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_panel() {
        let settings = Settings::default();
        assert_eq!(settings.value_label(SettingField::Model), "GPT-4");
        assert_eq!(settings.value_label(SettingField::Theme), "System");
        assert_eq!(settings.value_label(SettingField::Language), "Auto-detect");
        assert_eq!(settings.value_label(SettingField::Voice), "Ember");
        assert!(settings.follow_up_suggestions);
        assert!(settings.email_notifications);
        assert!(!settings.push_notifications);
        assert!(!settings.data_sharing);
        assert!(!settings.two_factor_auth);
    }

    #[test]
    fn test_model_change_is_reported() {
        let mut settings = Settings::default();
        assert_eq!(
            settings.adjust(SettingField::Model, true),
            Some(SettingsChange::Model("GPT-3.5".into()))
        );
        assert_eq!(
            settings.adjust(SettingField::Model, false),
            Some(SettingsChange::Model("GPT-4".into()))
        );
        assert_eq!(
            settings.adjust(SettingField::Model, false),
            Some(SettingsChange::Model("Gemini".into()))
        );
    }

    #[test]
    fn test_other_fields_stay_local() {
        let mut settings = Settings::default();
        assert_eq!(settings.adjust(SettingField::Theme, true), None);
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.adjust(SettingField::DataSharing, true), None);
        assert!(settings.data_sharing);
        assert_eq!(settings.adjust(SettingField::Voice, false), None);
        assert_eq!(settings.voice, Voice::Nova);
    }

    #[test]
    fn test_for_model() {
        assert_eq!(Settings::for_model("Claude").model, ModelChoice::Claude);
        assert_eq!(Settings::for_model("GPT-3.5").model, ModelChoice::Gpt35);
        assert_eq!(Settings::for_model("Claude").custom_model, None);
    }

    #[test]
    fn test_unlisted_model_is_shown_as_configured() {
        let mut settings = Settings::for_model("llama3");
        assert_eq!(settings.value_label(SettingField::Model), "llama3");

        // Nothing changes until the model field is touched
        assert_eq!(settings.adjust(SettingField::Theme, true), None);
        assert_eq!(settings.value_label(SettingField::Model), "llama3");

        assert_eq!(
            settings.adjust(SettingField::Model, true),
            Some(SettingsChange::Model("GPT-4".into()))
        );
        assert_eq!(settings.custom_model, None);

        let mut settings = Settings::for_model("llama3");
        assert_eq!(
            settings.adjust(SettingField::Model, false),
            Some(SettingsChange::Model("Gemini".into()))
        );
    }

    #[test]
    fn test_every_field_belongs_to_one_section() {
        for field in SettingField::iter() {
            let owners = SettingsSection::iter()
                .filter(|s| s.fields().contains(&field))
                .count();
            assert_eq!(owners, 1, "{:?}", field);
        }
    }

    #[test]
    fn test_section_labels() {
        assert_eq!(SettingsSection::ConnectedApps.to_string(), "Connected apps");
        assert_eq!(SettingsSection::iter().count(), 7);
    }

    #[test]
    fn test_voice_sample() {
        let settings = Settings::default();
        assert_eq!(settings.play_voice_sample(), "Playing Ember voice sample");
    }
}
