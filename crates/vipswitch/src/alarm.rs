//! dpinger alarm flag

/// State of the gateway monitor as reported by dpinger's `alert_cmd`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alarm {
    /// `0`: the primary gateway answers again
    Clear,
    /// `1`: the primary gateway is down
    Raised,
}

impl Alarm {
    pub fn primary_available(self) -> bool {
        matches!(self, Alarm::Clear)
    }
}

impl std::fmt::Display for Alarm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Alarm::Clear => write!(f, "clear"),
            Alarm::Raised => write!(f, "raised"),
        }
    }
}

/// clap value parser for the ALARM argument
pub fn parse_alarm(value: &str) -> Result<Alarm, String> {
    match value.trim() {
        "0" => Ok(Alarm::Clear),
        "1" => Ok(Alarm::Raised),
        other => Err(format!(
            "アラームフラグは 0 (正常) または 1 (障害) を指定してください: '{}'",
            other
        )),
    }
}
