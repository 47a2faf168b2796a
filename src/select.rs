use std::io::{BufRead, Write};

use log::debug;

use crate::{
    error::{Error, Result},
    prompt::Prompter,
    runner::CommandRunner,
};

pub const FUZZY_FINDER: &str = "fzf";

fn finder_args() -> Vec<String> {
    ["--prompt=ssh → ", "--height=40%", "--reverse", "--border"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Resolves one alias, through the fuzzy finder when it is installed and a
/// numbered menu otherwise.
pub fn pick_host<R: BufRead, W: Write>(
    runner: &impl CommandRunner,
    prompter: &mut Prompter<R, W>,
    hosts: &[String],
) -> Result<String> {
    if hosts.is_empty() {
        return Err(Error::NoHosts);
    }
    if runner.is_available(FUZZY_FINDER) {
        pick_with_finder(runner, hosts)
    } else {
        debug!("{FUZZY_FINDER} not found, falling back to menu");
        pick_from_menu(prompter, hosts)
    }
}

pub fn pick_with_finder(runner: &impl CommandRunner, hosts: &[String]) -> Result<String> {
    let out = runner
        .capture(FUZZY_FINDER, &finder_args(), Some(&hosts.join("\n")))
        .map_err(|e| Error::Selection(e.to_string()))?;
    if !out.success {
        return Err(Error::Selection(format!(
            "{FUZZY_FINDER} exited with {}",
            out.code.map_or_else(|| "signal".to_string(), |c| c.to_string())
        )));
    }
    Ok(out.stdout.trim().to_string())
}

pub fn pick_from_menu<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    hosts: &[String],
) -> Result<String> {
    if hosts.is_empty() {
        return Err(Error::NoHosts);
    }

    let mut menu = String::from("Select a host:\n");
    for (i, host) in hosts.iter().enumerate() {
        menu.push_str(&format!("{}) {}\n", i + 1, host));
    }
    menu.push_str("> ");
    prompter.write(&menu)?;

    let answer = prompter.read_line()?.ok_or(Error::InvalidChoice)?;
    let choice: usize = answer.trim().parse().map_err(|_| Error::InvalidChoice)?;
    if !(1..=hosts.len()).contains(&choice) {
        return Err(Error::InvalidChoice);
    }
    Ok(hosts[choice - 1].clone())
}
