use serde::*;


/// The file path of the configuration file, unless overridden by the
/// `COMMISSIOND_CONFIG` environment variable.
#[cfg(target_family = "unix")]
pub const CONFIG_FILE_PATH: &str = "/etc/commissiond/config.toml";
#[cfg(target_family = "windows")]
pub const CONFIG_FILE_PATH: &str = "C:\\Program Files\\commissiond\\config.toml";

pub const DEFAULT_WEB_API_PORT: u16 = 8080;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub database_path: String,
	pub web_api_port: Option<u16>,
	/// Listen on all interfaces instead of only on localhost.
	pub expose_web_api: Option<bool>,
}


impl Config {
	pub fn web_api_port(&self) -> u16 { self.web_api_port.unwrap_or(DEFAULT_WEB_API_PORT) }

	pub fn is_exposed(&self) -> bool { self.expose_web_api.unwrap_or(false) }
}

impl Default for Config {
	fn default() -> Self {
		Self {
			database_path: String::default(),
			web_api_port: None,
			expose_web_api: None,
		}
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_config() {
		let config: Config = toml::from_str(
			r#"
			database_path = "/var/lib/commissiond/db.sqlite"
			web_api_port = 3000
			"#,
		)
		.unwrap();
		assert_eq!(config.database_path, "/var/lib/commissiond/db.sqlite");
		assert_eq!(config.web_api_port(), 3000);
		assert!(!config.is_exposed());
	}

	#[test]
	fn test_defaults() {
		let config: Config = toml::from_str(r#"database_path = "db.sqlite""#).unwrap();
		assert_eq!(config.web_api_port(), DEFAULT_WEB_API_PORT);
		assert!(!config.is_exposed());
	}
}
