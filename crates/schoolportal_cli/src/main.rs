//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify portal wiring end to end.
//! - Print JSON envelopes so output can be diffed.
//!
//! Reads `SCHOOLPORTAL_*` from the environment. Each invocation is a fresh
//! tab, so `login` and `guard` only share a session within `probe`.

use schoolportal_api::PortalApi;
use std::process::ExitCode;

const USAGE: &str = "usage: schoolportal_cli [ping | version | login <id> <password> | probe <id> <password> <role>]";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    match args.as_slice() {
        [] | ["ping"] => {
            println!("schoolportal_core ping={}", PortalApi::ping());
            println!("schoolportal_core version={}", PortalApi::core_version());
            ExitCode::SUCCESS
        }
        ["version"] => {
            println!("{}", PortalApi::core_version());
            ExitCode::SUCCESS
        }
        ["login", id, password] => with_api(|api| {
            let response = api.login(id, password);
            println!("{}", response.to_json());
            response.ok
        }),
        ["probe", id, password, role] => with_api(|api| {
            println!("{}", api.login(id, password).to_json());
            let route = api.check_route(Some(*role));
            println!("{}", route.to_json());
            route.ok
        }),
        _ => {
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
    }
}

fn with_api(run: impl FnOnce(&PortalApi) -> bool) -> ExitCode {
    match PortalApi::open_from_env() {
        Ok(api) if run(&api) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(message) => {
            eprintln!("schoolportal_cli: {message}");
            ExitCode::FAILURE
        }
    }
}
