//! Service configuration read from the environment

use crate::notifier::TwilioCredentials;
use crate::session::DEFAULT_EXPIRATION_SECS;
use crate::state_machine::Template;
use chrono::Duration;

/// Content ids of the pre-approved templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateIds {
    pub first_prompt: String,
    pub dates: String,
    pub slots: String,
    pub employees: String,
}

impl TemplateIds {
    pub fn content_id(&self, template: Template) -> &str {
        match template {
            Template::FirstPrompt => &self.first_prompt,
            Template::Dates => &self.dates,
            Template::Slots => &self.slots,
            Template::Employees => &self.employees,
        }
    }
}

impl Default for TemplateIds {
    fn default() -> Self {
        Self {
            first_prompt: "default_first_message_sid".to_string(),
            dates: "default_dates_sid".to_string(),
            slots: "default_slots_sid".to_string(),
            employees: "default_employees_sid".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub db_path: String,
    pub session_ttl: Duration,
    pub templates: TemplateIds,
    /// `None` when any Twilio variable is missing
    pub twilio: Option<TwilioCredentials>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let port = var("SERVEEASE_PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        let db_path = var("SERVEEASE_DB_PATH").unwrap_or_else(|| {
            let home = var("HOME").unwrap_or_else(|| "/tmp".to_string());
            format!("{home}/.serve-ease/sessions.db")
        });

        let ttl_secs = var("SESSION_TTL_SECS")
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_EXPIRATION_SECS);

        let defaults = TemplateIds::default();
        let templates = TemplateIds {
            first_prompt: var("CONTENT_SID_FIRST_MESSAGE").unwrap_or(defaults.first_prompt),
            dates: var("CONTENT_SID_DATES").unwrap_or(defaults.dates),
            slots: var("CONTENT_SID_SLOTS").unwrap_or(defaults.slots),
            employees: var("CONTENT_SID_EMPLOYEES").unwrap_or(defaults.employees),
        };

        let twilio = match (
            var("TWILIO_ACCOUNT_SID"),
            var("TWILIO_AUTH_TOKEN"),
            var("TWILIO_PHONE_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from)) => Some(TwilioCredentials {
                account_sid,
                auth_token,
                from,
            }),
            _ => None,
        };

        Self {
            port,
            db_path,
            session_ttl: Duration::seconds(ttl_secs),
            templates,
            twilio,
        }
    }
}
