/// Configuration for tracing initialization.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub service: &'static str,
    pub environment: String,
    pub json_format: bool,
    /// Filter used when `RUST_LOG` is unset, e.g. `info`.
    pub level: String,
}

impl TracingConfig {
    pub fn new(service: &'static str, environment: impl Into<String>) -> Self {
        Self {
            service,
            environment: environment.into(),
            json_format: false,
            level: "info".to_string(),
        }
    }

    pub fn with_json(mut self, json_format: bool) -> Self {
        self.json_format = json_format;
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn default_directives(&self) -> String {
        let level = self.level.to_lowercase();
        format!("{level},verbatim={level},tower_http={level},sqlx=warn")
    }
}
