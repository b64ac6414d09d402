use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub frontend_url: String,

    pub claude_api_key: String,
    pub claude_model: String,
    pub completion_timeout_secs: u64,

    /// Load the sample medications, reminders and mood entries at startup
    pub seed_demo_data: bool,

    pub assistant_rate_limit: u32,
    pub assistant_rate_window_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            frontend_url: "http://localhost:3000".into(),
            claude_api_key: String::new(),
            claude_model: "claude-sonnet-4-20250514".into(),
            completion_timeout_secs: 30,
            seed_demo_data: true,
            assistant_rate_limit: 20,
            assistant_rate_window_secs: 60,
        }
    }
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Unparseable config value, using default");
            default
        }),
        Err(_) => default,
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parsed_or("PORT", defaults.port),
            frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),

            claude_api_key: env::var("CLAUDE_API_KEY").unwrap_or_default(),
            claude_model: env::var("CLAUDE_MODEL").unwrap_or(defaults.claude_model),
            completion_timeout_secs: parsed_or(
                "COMPLETION_TIMEOUT_SECS",
                defaults.completion_timeout_secs,
            ),

            seed_demo_data: parsed_or("SEED_DEMO_DATA", defaults.seed_demo_data),

            assistant_rate_limit: parsed_or("ASSISTANT_RATE_LIMIT", defaults.assistant_rate_limit),
            assistant_rate_window_secs: parsed_or(
                "ASSISTANT_RATE_WINDOW_SECS",
                defaults.assistant_rate_window_secs,
            ),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
