use std::env;

use crate::fault::ConfigFault;

pub(crate) const API_TOKEN_VAR: &str = "PRACTICUM_TOKEN";
pub(crate) const CHAT_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
pub(crate) const CHAT_ID_VAR: &str = "TELEGRAM_CHAT_ID";

/// Secrets needed to talk to the status API and the chat bot. Built once at
/// startup and handed to whichever component needs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Credentials {
    pub(crate) api_token: String,
    pub(crate) chat_token: String,
    pub(crate) chat_id: String,
}

impl Credentials {
    pub(crate) fn from_env() -> Result<Self, ConfigFault> {
        Self::load(|name| env::var(name).ok())
    }

    /// Looks every secret up through `lookup` and fails with all the missing
    /// names at once.
    pub(crate) fn load<F>(lookup: F) -> Result<Self, ConfigFault>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_token = lookup(API_TOKEN_VAR).unwrap_or_default();
        let chat_token = lookup(CHAT_TOKEN_VAR).unwrap_or_default();
        let chat_id = lookup(CHAT_ID_VAR).unwrap_or_default();

        let credentials = Self {
            api_token,
            chat_token,
            chat_id,
        };
        let missing = credentials.missing();
        if missing.is_empty() {
            Ok(credentials)
        } else {
            Err(ConfigFault::MissingCredentials(missing))
        }
    }

    pub(crate) fn missing(&self) -> Vec<&'static str> {
        [
            (API_TOKEN_VAR, &self.api_token),
            (CHAT_TOKEN_VAR, &self.chat_token),
            (CHAT_ID_VAR, &self.chat_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}
