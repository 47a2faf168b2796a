use std::process::ExitCode;

use sshhosts::{add_host::add_host, cli, exit_code_of, prompt::Prompter, runner::SystemRunner, Paths};

fn run(args: cli::AddHostArgs) -> anyhow::Result<()> {
    let paths = Paths::from_env()?;
    let added = add_host(
        args.into(),
        &paths,
        &SystemRunner,
        &mut Prompter::stdio(),
        &whoami::username(),
    )?;

    if let Some(backup) = &added.backup {
        println!("Previous config saved to {}.", backup.display());
    }
    println!("Added Host \"{}\" to {}.", added.alias, added.config.display());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match cli::parse::<cli::AddHostArgs>() {
        Ok(args) => args,
        Err(code) => return code,
    };

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(exit_code_of(&err))
        }
    }
}
