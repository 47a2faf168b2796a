use std::process::ExitCode;

use sshhosts::{cli, exit_code_of, App, ConfigFile, Paths};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match cli::parse::<cli::MenuArgs>() {
        Ok(args) => args,
        Err(code) => return code,
    };

    let result = Paths::from_env()
        .map_err(anyhow::Error::from)
        .and_then(|paths| App::new(ConfigFile::new(paths.config), args.into()).run());

    match result {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(exit_code_of(&err))
        }
    }
}
