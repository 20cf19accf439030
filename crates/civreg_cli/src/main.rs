//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `civreg_core` linkage.
//! - Open a registry from an optional JSON config file and print row counts.

use civreg_core::{
    open_registry, CompanyService, ContactService, RegistryConfig, SqliteCompanyRepository,
    SqliteContactRepository,
};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;

/// Opens a registry database and prints company/contact counts.
#[derive(Debug, Parser)]
#[command(name = "civreg_cli", version)]
struct Args {
    /// JSON registry config; an in-memory database is used when omitted.
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("civreg_cli error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), String> {
    println!("civreg_core ping={}", civreg_core::ping());
    println!("civreg_core version={}", civreg_core::core_version());

    let config = match args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .map_err(|err| format!("cannot read config `{}`: {err}", path.display()))?;
            RegistryConfig::from_json_str(&raw).map_err(|err| err.to_string())?
        }
        None => RegistryConfig::default(),
    };

    let mut conn = open_registry(&config).map_err(|err| err.to_string())?;
    let options = config.service_options();

    let companies = {
        let repo = SqliteCompanyRepository::try_new(&mut conn).map_err(|err| err.to_string())?;
        CompanyService::with_options(repo, options)
            .list_companies()
            .map_err(|err| err.to_string())?
            .len()
    };
    let contacts = {
        let repo = SqliteContactRepository::try_new(&mut conn).map_err(|err| err.to_string())?;
        ContactService::with_options(repo, options)
            .list_contacts()
            .map_err(|err| err.to_string())?
            .len()
    };

    info!("event=cli_probe module=cli status=ok companies={companies} contacts={contacts}");
    println!("civreg_core companies={companies} contacts={contacts}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{run, Args};
    use clap::{CommandFactory, Parser};
    use std::path::PathBuf;

    #[test]
    fn command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn config_path_is_optional_positional() {
        let args = Args::try_parse_from(["civreg_cli"]).unwrap();
        assert_eq!(args.config, None);

        let args = Args::try_parse_from(["civreg_cli", "/etc/civreg.json"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("/etc/civreg.json")));

        assert!(Args::try_parse_from(["civreg_cli", "a.json", "b.json"]).is_err());
    }

    #[test]
    fn run_reports_unreadable_config() {
        let err = run(Args {
            config: Some(PathBuf::from("/nonexistent/civreg.json")),
        })
        .unwrap_err();
        assert!(err.contains("cannot read config"));
    }

    #[test]
    fn run_without_config_uses_memory_database() {
        run(Args { config: None }).unwrap();
    }
}
