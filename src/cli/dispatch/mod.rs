//! Map parsed arguments to the action the binary runs.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::{ARG_PORT, backend, session};
use anyhow::Result;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let backend_opts = backend::Options::parse(matches)?;
    let session_opts = session::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        backend_url: backend_opts.url,
        backend_timeout: backend_opts.timeout,
        cookies: session_opts.cookie_config(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn builds_server_action() -> Result<()> {
        let matches = commands::new().try_get_matches_from(vec![
            "hospadmin",
            "--port",
            "9000",
            "--backend-url",
            "https://api.hospital.tld",
            "--environment",
            "production",
            "--session-ttl-seconds",
            "3600",
        ])?;

        let Action::Server(args) = handler(&matches)?;
        assert_eq!(args.port, 9000);
        assert_eq!(args.backend_url.as_str(), "https://api.hospital.tld/");
        assert!(args.cookies.secure());
        assert_eq!(args.cookies.session_attributes().max_age.as_secs(), 3600);
        Ok(())
    }

    #[test]
    fn invalid_backend_url_fails() -> Result<()> {
        let matches =
            commands::new().try_get_matches_from(vec!["hospadmin", "--backend-url", "nope"])?;
        assert!(handler(&matches).is_err());
        Ok(())
    }
}
