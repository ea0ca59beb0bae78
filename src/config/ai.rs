// src/config/ai.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

fn default_daily_limit() -> u32 {
    200
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub enabled: bool,
    /// "openai" | "claude" (case-insensitive; claude is stubbed for now)
    pub provider: String,
    /// "ENV" means: read from OPENAI_API_KEY / CLAUDE_API_KEY (by provider)
    pub api_key: String,
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
    /// Upper bound for one fallback classification call, seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "openai".into(),
            api_key: String::new(),
            daily_limit: default_daily_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AiConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let mut cfg: AiConfig = serde_json::from_str(&data)?;

        // Normalize provider
        cfg.provider = cfg.provider.to_lowercase();

        // Resolve api key if "ENV"
        if cfg.api_key.trim().eq_ignore_ascii_case("env") {
            cfg.api_key = match cfg.provider.as_str() {
                "openai" => env::var("OPENAI_API_KEY")
                    .map_err(|_| anyhow::anyhow!("Missing OPENAI_API_KEY env var"))?,
                "claude" => env::var("CLAUDE_API_KEY")
                    .map_err(|_| anyhow::anyhow!("Missing CLAUDE_API_KEY env var"))?,
                other => anyhow::bail!("Unsupported provider in config: {other}"),
            };
        }

        if cfg.timeout_secs == 0 {
            cfg.timeout_secs = default_timeout_secs();
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_disabled_and_bounded() {
        let cfg = AiConfig::default();
        assert!(!cfg.enabled);
        assert_eq!(cfg.daily_limit, 200);
        assert_eq!(cfg.timeout_secs, 30);
    }

    #[test]
    fn zero_timeout_is_replaced() {
        let json = r#"{"enabled": false, "provider": "OpenAI", "api_key": "", "timeout_secs": 0}"#;
        let tmp = std::env::temp_dir().join("ai_cfg_zero_timeout.json");
        std::fs::write(&tmp, json).unwrap();
        let cfg = AiConfig::load_from_file(&tmp).unwrap();
        assert_eq!(cfg.provider, "openai");
        assert_eq!(cfg.timeout_secs, 30);
        let _ = std::fs::remove_file(&tmp);
    }
}
