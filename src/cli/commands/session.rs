use crate::session::CookieConfig;
use anyhow::bail;
use clap::{Arg, ArgMatches, Command, builder::PossibleValuesParser};

pub const ARG_ENVIRONMENT: &str = "environment";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_OTP_TTL_SECONDS: &str = "otp-ttl-seconds";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

#[derive(Debug, Clone)]
pub struct Options {
    pub environment: Environment,
    pub session_ttl_seconds: u64,
    pub otp_ttl_seconds: u64,
}

impl Options {
    /// Parse session cookie arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a TTL is zero.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let environment = match matches.get_one::<String>(ARG_ENVIRONMENT).map(String::as_str) {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        };

        let session_ttl_seconds = matches
            .get_one::<u64>(ARG_SESSION_TTL_SECONDS)
            .copied()
            .unwrap_or(604_800);
        let otp_ttl_seconds = matches
            .get_one::<u64>(ARG_OTP_TTL_SECONDS)
            .copied()
            .unwrap_or(300);

        if session_ttl_seconds == 0 {
            bail!("--{ARG_SESSION_TTL_SECONDS} must be greater than zero");
        }
        if otp_ttl_seconds == 0 {
            bail!("--{ARG_OTP_TTL_SECONDS} must be greater than zero");
        }

        Ok(Self {
            environment,
            session_ttl_seconds,
            otp_ttl_seconds,
        })
    }

    /// Cookie settings: `Secure` only in production.
    #[must_use]
    pub fn cookie_config(&self) -> CookieConfig {
        CookieConfig::new()
            .with_session_ttl_seconds(self.session_ttl_seconds)
            .with_pending_ttl_seconds(self.otp_ttl_seconds)
            .with_secure(self.environment.is_production())
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_ENVIRONMENT)
                .long(ARG_ENVIRONMENT)
                .help("Deployment environment; production marks cookies Secure")
                .env("HOSPADMIN_ENVIRONMENT")
                .default_value("development")
                .value_parser(PossibleValuesParser::new(["development", "production"])),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session cookie TTL in seconds")
                .env("HOSPADMIN_SESSION_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_OTP_TTL_SECONDS)
                .long(ARG_OTP_TTL_SECONDS)
                .help("Pending OTP login cookie TTL in seconds")
                .env("HOSPADMIN_OTP_TTL_SECONDS")
                .default_value("300")
                .value_parser(clap::value_parser!(u64)),
        )
}
