use anyhow::{Context, bail};
use clap::{Arg, ArgMatches, Command};
use std::time::Duration;
use url::Url;

pub const ARG_BACKEND_URL: &str = "backend-url";
pub const ARG_BACKEND_TIMEOUT_SECONDS: &str = "backend-timeout-seconds";

#[derive(Debug, Clone)]
pub struct Options {
    pub url: Url,
    pub timeout: Duration,
}

impl Options {
    /// Parse backend arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the URL is missing or not http(s), or the timeout is zero.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let raw = match matches.get_one::<String>(ARG_BACKEND_URL) {
            Some(value) if !value.trim().is_empty() => value.trim(),
            _ => bail!("missing required argument: --{ARG_BACKEND_URL}"),
        };
        let url = Url::parse(raw).with_context(|| format!("invalid --{ARG_BACKEND_URL}: {raw}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("--{ARG_BACKEND_URL} must be an http or https URL: {raw}");
        }

        let seconds = matches
            .get_one::<u64>(ARG_BACKEND_TIMEOUT_SECONDS)
            .copied()
            .unwrap_or(10);
        if seconds == 0 {
            bail!("--{ARG_BACKEND_TIMEOUT_SECONDS} must be greater than zero");
        }

        Ok(Self {
            url,
            timeout: Duration::from_secs(seconds),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_BACKEND_URL)
                .long(ARG_BACKEND_URL)
                .help("Base URL of the hospital REST backend, example: https://api.hospital.tld/")
                .env("HOSPADMIN_BACKEND_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_BACKEND_TIMEOUT_SECONDS)
                .long(ARG_BACKEND_TIMEOUT_SECONDS)
                .help("Timeout for each backend request in seconds")
                .env("HOSPADMIN_BACKEND_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(args: &[&str]) -> anyhow::Result<ArgMatches> {
        let mut argv = vec!["hospadmin"];
        argv.extend_from_slice(args);
        Ok(with_args(Command::new("hospadmin")).try_get_matches_from(argv)?)
    }

    #[test]
    fn parses_url_and_timeout() -> anyhow::Result<()> {
        let options = Options::parse(&matches(&[
            "--backend-url",
            "https://api.hospital.tld/v1",
            "--backend-timeout-seconds",
            "3",
        ])?)?;
        assert_eq!(options.url.as_str(), "https://api.hospital.tld/v1");
        assert_eq!(options.timeout, Duration::from_secs(3));
        Ok(())
    }

    #[test]
    fn timeout_defaults_to_ten_seconds() -> anyhow::Result<()> {
        temp_env::with_vars([("HOSPADMIN_BACKEND_TIMEOUT_SECONDS", None::<&str>)], || {
            let options = Options::parse(&matches(&["--backend-url", "http://localhost:3000"])?)?;
            assert_eq!(options.timeout, Duration::from_secs(10));
            Ok(())
        })
    }

    #[test]
    fn rejects_bad_urls() -> anyhow::Result<()> {
        assert!(Options::parse(&matches(&["--backend-url", "not a url"])?).is_err());
        assert!(Options::parse(&matches(&["--backend-url", "ftp://files.tld"])?).is_err());
        assert!(
            Options::parse(&matches(&[
                "--backend-url",
                "http://localhost:3000",
                "--backend-timeout-seconds",
                "0"
            ])?)
            .is_err()
        );
        Ok(())
    }
}
