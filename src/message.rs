use serde::{Deserialize, Serialize};

// host framework's standard levels
pub const DEBUG: i32 = 10;
pub const INFO: i32 = 20;
pub const SUCCESS: i32 = 25;
pub const WARNING: i32 = 30;
pub const ERROR: i32 = 40;

/// One transient notification, surfaced to the client once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub level: i32,
    pub level_tag: String,
    pub message: String,
}

impl Message {
    /// Tag derived from the standard levels; unknown levels get an empty tag.
    pub fn new(level: i32, message: impl Into<String>) -> Self {
        Self {
            level,
            level_tag: default_level_tag(level).to_string(),
            message: message.into(),
        }
    }

    pub fn with_tag(level: i32, level_tag: impl Into<String>, message: impl Into<String>) -> Self {
        Self { level, level_tag: level_tag.into(), message: message.into() }
    }
}

pub fn default_level_tag(level: i32) -> &'static str {
    match level {
        DEBUG => "debug",
        INFO => "info",
        SUCCESS => "success",
        WARNING => "warning",
        ERROR => "error",
        _ => "",
    }
}

/// `LEVEL:TEXT` where LEVEL is a number or a standard tag, e.g. `success:Saved`.
impl std::str::FromStr for Message {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (level, text) = s
            .split_once(':')
            .ok_or_else(|| format!("expected LEVEL:TEXT, got `{s}`"))?;
        let level = match level.trim().to_ascii_lowercase().as_str() {
            "debug" => DEBUG,
            "info" => INFO,
            "success" => SUCCESS,
            "warning" => WARNING,
            "error" => ERROR,
            other => other
                .parse::<i32>()
                .map_err(|_| format!("unknown message level `{other}`"))?,
        };
        Ok(Self::new(level, text))
    }
}
