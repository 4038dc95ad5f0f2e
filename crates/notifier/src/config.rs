//! Notifier configuration, read from the environment

use flyer_exchanges::bitflyer::BitflyerConfig;
use flyer_exchanges::ExchangeError;

use std::fmt;
use std::time::Duration;
use thiserror::Error;
use zeroize::Zeroizing;

pub const ENV_LINE_CHANNEL_TOKEN: &str = "LINE_CHANNEL_TOKEN";
pub const ENV_LINE_USERID: &str = "LINE_USERID";
pub const ENV_POLL_SECS: &str = "NOTIFIER_POLL_SECS";

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Exchange(#[from] ExchangeError),

    #[error("{name} is set but {missing} is not")]
    PartialLine { name: &'static str, missing: &'static str },

    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// LINE Messaging API push target
#[derive(Clone)]
pub struct LineConfig {
    pub channel_token: Zeroizing<String>,
    pub user_id: String,
}

impl fmt::Debug for LineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineConfig")
            .field("channel_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub exchange: BitflyerConfig,
    /// `None` runs in dry-run mode: messages are only logged
    pub line: Option<LineConfig>,
    pub poll_interval: Duration,
}

impl NotifierConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let exchange = BitflyerConfig::new().with_credentials_from(&lookup)?;

        let line = match (lookup(ENV_LINE_CHANNEL_TOKEN), lookup(ENV_LINE_USERID)) {
            (Some(token), Some(user_id)) => Some(LineConfig {
                channel_token: Zeroizing::new(token),
                user_id,
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::PartialLine {
                    name: ENV_LINE_CHANNEL_TOKEN,
                    missing: ENV_LINE_USERID,
                });
            }
            (None, Some(_)) => {
                return Err(ConfigError::PartialLine {
                    name: ENV_LINE_USERID,
                    missing: ENV_LINE_CHANNEL_TOKEN,
                });
            }
        };

        let poll_interval = match lookup(ENV_POLL_SECS) {
            None => DEFAULT_POLL_INTERVAL,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        name: ENV_POLL_SECS,
                        value: raw,
                    });
                }
            },
        };

        Ok(Self {
            exchange,
            line,
            poll_interval,
        })
    }
}
