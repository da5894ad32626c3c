use std::path::Path;

use secrecy::ExposeSecret;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, expansion or parsing
    /// fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let config = Self::from_toml(&raw)?;
        tracing::debug!(path = %path.display(), base_url = %config.client.base_url, "loaded configuration");

        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e:#}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute HTTP(S) URL,
    /// the session id is blank, or the log filter is empty
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_client()?;
        self.validate_telemetry()?;
        Ok(())
    }

    fn validate_client(&self) -> anyhow::Result<()> {
        let url = &self.client.base_url;

        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("client.base_url must use http or https, got '{}'", url.scheme());
        }

        if url.host_str().is_none_or(str::is_empty) {
            anyhow::bail!("client.base_url must include a host");
        }

        if let Some(ref sid) = self.client.session_id
            && sid.expose_secret().trim().is_empty()
        {
            anyhow::bail!("client.session_id must not be blank when set");
        }

        Ok(())
    }

    fn validate_telemetry(&self) -> anyhow::Result<()> {
        if self.telemetry.filter.trim().is_empty() {
            anyhow::bail!("telemetry.filter must not be empty");
        }

        Ok(())
    }
}
