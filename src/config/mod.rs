pub mod toml_config;

pub use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use crate::core::identity::InboundRequest;
#[cfg(feature = "cli")]
use crate::utils::error::InquiryError;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "grade-inquiry")]
#[command(about = "Look up a student's released grades for a term")]
pub struct CliConfig {
    #[arg(long, help = "Path to the TOML service configuration")]
    pub config: Option<String>,

    #[arg(long, help = "Path to the TOML record fixture (overrides data.fixture_path)")]
    pub fixture: Option<String>,

    #[arg(
        long,
        requires = "session_password",
        help = "Log in first and read grades through the resulting session"
    )]
    pub session_login: Option<String>,

    #[arg(long, help = "Password for --session-login")]
    pub session_password: Option<String>,

    #[arg(
        long = "header",
        value_name = "NAME:VALUE",
        help = "Request header; the student id is read from identity.header_name"
    )]
    pub headers: Vec<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List terms that have grade records, most recent first
    Terms,
    /// Show GPA and credit totals for a released term
    Summary {
        #[arg(long)]
        term: String,
    },
    /// Show per-course grades for a released term
    List {
        #[arg(long)]
        term: String,
    },
    /// Verify a login and print the resulting identity
    Login {
        #[arg(long)]
        login_id: String,
        #[arg(long)]
        password: String,
    },
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Loads the TOML config if given and applies command-line overrides.
    pub fn resolve_config(&self) -> crate::utils::error::Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        if let Some(fixture) = &self.fixture {
            config.data = Some(toml_config::DataConfig {
                fixture_path: fixture.clone(),
            });
        }
        Ok(config)
    }

    /// Builds the inbound request from `--header` values, reading the student
    /// id from the header named in the config.
    pub fn inbound_request(
        &self,
        config: &TomlConfig,
    ) -> crate::utils::error::Result<InboundRequest> {
        let mut request = InboundRequest::new(config.header_name());
        for raw in &self.headers {
            let Some((name, value)) = raw.split_once(':') else {
                return Err(InquiryError::InvalidConfigValueError {
                    field: "header".to_string(),
                    value: raw.clone(),
                    reason: "Expected NAME:VALUE".to_string(),
                });
            };
            request = request.header(name.trim(), value.trim());
        }
        Ok(request)
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use crate::core::identity::IdentityResolver;
    use crate::domain::model::StudentId;
    use crate::domain::ports::CallerSource;

    #[test]
    fn test_parse_summary_command() {
        let cli = CliConfig::try_parse_from([
            "grade-inquiry",
            "--fixture",
            "records.toml",
            "--header",
            "X-Student-Id: 42",
            "summary",
            "--term",
            "2024-1",
        ])
        .unwrap();

        assert!(matches!(cli.command, Command::Summary { ref term } if term == "2024-1"));

        let config = cli.resolve_config().unwrap();
        assert_eq!(config.fixture_path(), Some("records.toml"));

        let request = cli.inbound_request(&config).unwrap();
        assert_eq!(request.student_id_header(), Some("42"));
    }

    #[test]
    fn test_configured_header_name_selects_student_id() {
        let config = TomlConfig::from_toml_str("[identity]\nheader_name = \"X-Other\"\n").unwrap();
        let cli = CliConfig::try_parse_from([
            "grade-inquiry",
            "--header",
            "X-Student-Id: 1",
            "--header",
            "x-other: 7",
            "terms",
        ])
        .unwrap();

        let request = cli.inbound_request(&config).unwrap();
        let caller = IdentityResolver::new().resolve(&request).unwrap();
        assert_eq!(caller.student_id, StudentId(7));

        let default_only =
            CliConfig::try_parse_from(["grade-inquiry", "--header", "X-Student-Id: 1", "terms"])
                .unwrap();
        let request = default_only.inbound_request(&config).unwrap();
        assert!(IdentityResolver::new().resolve(&request).is_err());
    }

    #[test]
    fn test_header_without_separator_is_rejected() {
        let cli = CliConfig::try_parse_from(["grade-inquiry", "--header", "X-Student-Id", "terms"])
            .unwrap();
        let err = cli.inbound_request(&TomlConfig::default()).unwrap_err();
        assert!(matches!(err, InquiryError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_session_login_requires_password() {
        assert!(
            CliConfig::try_parse_from(["grade-inquiry", "--session-login", "20240501", "terms"])
                .is_err()
        );
        let cli = CliConfig::try_parse_from([
            "grade-inquiry",
            "--session-login",
            "20240501",
            "--session-password",
            "changeme",
            "terms",
        ])
        .unwrap();
        assert_eq!(cli.session_login.as_deref(), Some("20240501"));
    }

    #[test]
    fn test_term_is_required_for_list() {
        assert!(CliConfig::try_parse_from(["grade-inquiry", "list"]).is_err());
    }
}
