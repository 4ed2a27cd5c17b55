//! Config command handler.

use logtail_axum::ServerConfig;

use crate::error::CliError;

/// Render the configuration as pretty JSON after validating it.
pub fn render(config: &ServerConfig) -> Result<String, CliError> {
    config.validate()?;
    serde_json::to_string_pretty(config).map_err(|e| CliError::Output(e.to_string()))
}

/// Execute the config command.
pub fn execute(config: &ServerConfig) -> Result<(), CliError> {
    println!("{}", render(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_defaults() {
        let json = tokio_test::assert_ok!(render(&ServerConfig::with_defaults()));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["addr"], "0.0.0.0:1111");
        assert_eq!(value["endpoint"]["route"], "/ws/uwsgi_log");
        assert_eq!(value["endpoint"]["source"], "/var/log/uwsgi/uwsgi.log");
        assert_eq!(value["tail"]["heartbeat_interval_secs"], 30);
        assert_eq!(value["acceptor"]["origins"]["mode"], "allow_all");
    }

    #[test]
    fn test_render_rejects_invalid() {
        let config = ServerConfig::with_defaults().with_endpoint("/ws/log", "relative.log");
        assert!(matches!(render(&config), Err(CliError::Config(_))));
    }
}
