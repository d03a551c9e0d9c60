use std::env;
use std::process;

use log::{error, info};
use moddoc::config::Config;
use moddoc::logging;
use moddoc::{DocError, DocService, HttpFetcher, ProxyService};

const EXIT_FAILURE: i32 = 1;
const EXIT_NOT_FOUND: i32 = 2;

/// Split `path@version`, a separate version argument wins
fn parse_target(target: &str, version: Option<&str>) -> (String, Option<String>) {
    let (module, inline) = match target.split_once('@') {
        Some((module, version)) if !version.is_empty() => (module, Some(version.to_string())),
        Some((module, _)) => (module, None),
        None => (target, None),
    };
    (module.to_string(), version.map(str::to_string).or(inline))
}

fn exit_code(err: &DocError) -> i32 {
    if err.is_not_found() { EXIT_NOT_FOUND } else { EXIT_FAILURE }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        // Use eprintln for usage info since logger isn't initialized yet
        eprintln!("Usage: {} <module>[@<version>] [version]", args[0]);
        eprintln!("  Prints the documentation of a Go package as JSON.");
        eprintln!("  Without a version the newest published one is used.");
        eprintln!("Example: {} golang.org/x/mod/semver@v0.20.0", args[0]);
        process::exit(EXIT_FAILURE);
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            process::exit(EXIT_FAILURE);
        }
    };

    if let Err(e) = logging::init_logger(config.log_level) {
        eprintln!("Failed to initialize logger: {}", e);
        process::exit(EXIT_FAILURE);
    }

    info!("moddoc starting with proxy {}", config.proxy_url);
    info!("Command line arguments: {:?}", args);

    let fetcher = match HttpFetcher::new(&config.proxy_url, config.request_timeout) {
        Ok(fetcher) => fetcher.with_token(config.auth_token.clone()),
        Err(e) => {
            error!("Failed to create proxy client: {}", e);
            eprintln!("{}", e);
            process::exit(EXIT_FAILURE);
        }
    };
    let service = ProxyService::new(fetcher);

    let (module, version) = parse_target(&args[1], args.get(2).map(String::as_str));
    let version = match version {
        Some(version) => version,
        None => match service.resolve_version(&module).await {
            Ok(version) => version,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(EXIT_FAILURE);
            }
        },
    };
    info!("Requesting documentation for {}@{}", module, version);

    let doc = match service.get_doc(&module, &version).await {
        Ok(doc) => doc,
        Err(e) => {
            error!("Documentation request for {}@{} failed: {}", module, version, e);
            eprintln!("{}", e);
            process::exit(exit_code(&e));
        }
    };

    match serde_json::to_string_pretty(&doc) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("Failed to serialize documentation: {}", e);
            eprintln!("{}", e);
            process::exit(EXIT_FAILURE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_target() {
        assert_eq!(
            parse_target("example.com/a@v1.0.0", None),
            ("example.com/a".to_string(), Some("v1.0.0".to_string()))
        );
        assert_eq!(
            parse_target("example.com/a@v1.0.0", Some("v2.0.0")),
            ("example.com/a".to_string(), Some("v2.0.0".to_string()))
        );
        assert_eq!(parse_target("example.com/a@", None), ("example.com/a".to_string(), None));
        assert_eq!(parse_target("example.com/a", None), ("example.com/a".to_string(), None));
    }

    #[test]
    fn test_exit_code() {
        let not_found = DocError::NotFound {
            module: "example.com/a".to_string(),
            version: "v1.0.0".to_string(),
        };
        assert_eq!(exit_code(&not_found), EXIT_NOT_FOUND);
        let task = DocError::Task {
            message: "panicked".to_string(),
        };
        assert_eq!(exit_code(&task), EXIT_FAILURE);
    }
}
