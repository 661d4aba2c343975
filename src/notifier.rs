use std::time::Duration;

use anyhow::{bail, Context, Result};
use curl::easy::{Easy, Form};
use log::{error, info};

use crate::credentials::Credentials;

pub(crate) trait Notifier {
    fn send(&self, message: &str) -> Result<()>;
}

pub(crate) struct TelegramNotifier {
    token: String,
    chat_id: String,
    timeout: Duration,
}

impl TelegramNotifier {
    pub(crate) fn new(credentials: &Credentials, timeout: Duration) -> Self {
        Self {
            token: credentials.chat_token.clone(),
            chat_id: credentials.chat_id.clone(),
            timeout,
        }
    }
}

impl Notifier for TelegramNotifier {
    fn send(&self, message: &str) -> Result<()> {
        let mut easy = Easy::new();
        let mut form = Form::new();
        form.part("chat_id")
            .contents(self.chat_id.as_bytes())
            .add()
            .context("Failed to build chat_id form part")?;
        form.part("text")
            .contents(message.as_bytes())
            .add()
            .context("Failed to build text form part")?;
        easy.httppost(form)?;
        easy.timeout(self.timeout)?;
        easy.url(&format!(
            "https://api.telegram.org/bot{}/sendMessage",
            self.token
        ))?;
        // Telegram's JSON reply isn't needed, only the status code.
        easy.write_function(|data| Ok(data.len()))?;

        easy.perform().context("Telegram request failed")?;
        let response_code = easy.response_code()?;
        if response_code != 200 {
            bail!("Telegram returned status {}", response_code);
        }

        Ok(())
    }
}

impl<T> Notifier for Box<T>
where
    T: Notifier + ?Sized,
{
    fn send(&self, message: &str) -> Result<()> {
        (**self).send(message)
    }
}

/// Writes messages to the log instead of delivering them.
pub(crate) struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, message: &str) -> Result<()> {
        info!("Fake notification: {}", message);
        Ok(())
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct NotificationState {
    last_message: String,
}

impl NotificationState {
    #[cfg(test)]
    pub(crate) fn last_message(&self) -> &str {
        &self.last_message
    }

    /// Sends `message` unless it's the same as the one sent just before.
    /// A failed delivery still counts as sent, so the same text is never
    /// retried. Returns whether the notifier was called.
    pub(crate) fn notify_if_changed<N>(&mut self, notifier: &N, message: &str) -> bool
    where
        N: Notifier + ?Sized,
    {
        if message == self.last_message {
            return false;
        }

        match notifier.send(message) {
            Ok(()) => info!("Sent notification: {}", message),
            Err(err) => error!("Failed to send notification {:?}: {:?}", message, err),
        }
        message.clone_into(&mut self.last_message);

        true
    }
}
