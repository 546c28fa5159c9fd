pub mod backend;
pub mod logging;
pub mod session;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_PORT: &str = "port";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("hospadmin")
        .about("Hospital administration web front end")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("HOSPADMIN_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = backend::with_args(command);
    let command = session::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend::ARG_BACKEND_URL;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "hospadmin");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Hospital administration web front end".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_check_port_and_backend() {
        let matches = new().get_matches_from(vec![
            "hospadmin",
            "--port",
            "9090",
            "--backend-url",
            "https://api.hospital.tld",
        ]);

        assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(9090));
        assert_eq!(
            matches.get_one::<String>(ARG_BACKEND_URL).cloned(),
            Some("https://api.hospital.tld".to_string())
        );
    }

    #[test]
    fn test_backend_url_is_required() {
        temp_env::with_vars([("HOSPADMIN_BACKEND_URL", None::<&str>)], || {
            assert!(new().try_get_matches_from(vec!["hospadmin"]).is_err());
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("HOSPADMIN_PORT", Some("443")),
                ("HOSPADMIN_BACKEND_URL", Some("http://localhost:3000")),
                ("HOSPADMIN_ENVIRONMENT", Some("production")),
                ("HOSPADMIN_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["hospadmin"]);
                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(443));
                assert_eq!(
                    matches.get_one::<String>(ARG_BACKEND_URL).cloned(),
                    Some("http://localhost:3000".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>(session::ARG_ENVIRONMENT).cloned(),
                    Some("production".to_string())
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("HOSPADMIN_LOG_LEVEL", Some(level)),
                    ("HOSPADMIN_BACKEND_URL", Some("http://localhost:3000")),
                ],
                || {
                    let matches = new().get_matches_from(vec!["hospadmin"]);
                    assert_eq!(
                        matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                        u8::try_from(index).ok()
                    );
                },
            );
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5_usize {
            temp_env::with_vars([("HOSPADMIN_LOG_LEVEL", None::<String>)], || {
                let mut args = vec![
                    "hospadmin".to_string(),
                    "--backend-url".to_string(),
                    "http://localhost:3000".to_string(),
                ];
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }
}
