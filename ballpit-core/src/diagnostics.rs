//! Diagnostics and error reporting for ballpit configs
//!
//! Formats configuration failures for developers, pointing at the offending
//! line of a JSON source when one is known.

use crate::config::ConfigError;

/// Format a config error, quoting the failing JSON line when available
pub fn format_config_error(error: &ConfigError, source: &str) -> String {
    let mut msg = format!("Config error: {}", error);

    if let ConfigError::Json(json) = error {
        let line = json.line();
        if line > 0 {
            if let Some(text) = source.lines().nth(line - 1) {
                msg.push_str(&format!("\n  at line {}: {}", line, text.trim_end()));
            }
        }
    }

    msg
}
