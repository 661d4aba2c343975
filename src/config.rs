use std::{env, time::Duration};

use crate::fault::ConfigFault;

const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
const DEFAULT_RETRY_PERIOD_SECS: u64 = 600;
// 30 days, so the first poll picks up the latest status from the past month.
const DEFAULT_LOOKBACK_SECS: i64 = 2_592_000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    pub(crate) endpoint: String,
    pub(crate) retry_period: Duration,
    pub(crate) lookback_secs: i64,
    pub(crate) request_timeout: Duration,
    pub(crate) use_fake_notifier: bool,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self, ConfigFault> {
        Self::load(|name| env::var(name).ok())
    }

    pub(crate) fn load<F>(lookup: F) -> Result<Self, ConfigFault>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            endpoint: lookup("HOMEWORK_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned()),
            retry_period: Duration::from_secs(parse_or(
                &lookup,
                "RETRY_PERIOD_SECS",
                DEFAULT_RETRY_PERIOD_SECS,
            )?),
            lookback_secs: parse_or(&lookup, "LOOKBACK_SECS", DEFAULT_LOOKBACK_SECS)?,
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            use_fake_notifier: lookup("USE_FAKE_NOTIFIER").is_some(),
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigFault>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigFault::InvalidSetting { name, value }),
    }
}
