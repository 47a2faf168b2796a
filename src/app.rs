use std::{
    fs,
    io::{BufRead, Write},
};

use anyhow::Context;
use log::debug;

use crate::{
    error::Error,
    launch::{launch, Mode},
    prompt::Prompter,
    runner::{CommandRunner, SystemRunner},
    select::pick_host,
    select_box::SelectBox,
    sshconfig::ConfigFile,
    terminal::Terminal,
};

/// What the picker does once a host is chosen.
#[derive(Clone, Debug, Default)]
pub struct PickerOptions {
    pub mode: Mode,
    pub print_only: bool,
    pub tui: bool,
    pub passthrough: Vec<String>,
}

pub struct App {
    config: ConfigFile,
    options: PickerOptions,
}

impl App {
    pub fn new(config: ConfigFile, options: PickerOptions) -> Self {
        App { config, options }
    }

    fn hosts(&self) -> anyhow::Result<Vec<String>> {
        if fs::metadata(self.config.path()).is_err() {
            return Err(Error::ConfigUnreadable(self.config.path().to_path_buf()).into());
        }
        self.config
            .hosts()
            .with_context(|| format!("reading {}", self.config.path().display()))
    }

    /// Reads the config and resolves one alias through fzf or the menu.
    pub fn resolve<R: BufRead, W: Write>(
        &self,
        runner: &impl CommandRunner,
        prompter: &mut Prompter<R, W>,
    ) -> anyhow::Result<String> {
        let hosts = self.hosts()?;
        match pick_host(runner, prompter, &hosts) {
            Ok(host) if !host.is_empty() => Ok(host),
            Ok(_) => Err(Error::NoHostSelected.into()),
            Err(e) => {
                debug!("selection failed: {e}");
                Err(Error::NoHostSelected.into())
            }
        }
    }

    fn resolve_tui(&self) -> anyhow::Result<String> {
        let hosts = self.hosts()?;
        if hosts.is_empty() {
            debug!("selection failed: {}", Error::NoHosts);
            return Err(Error::NoHostSelected.into());
        }

        let mut select_box = SelectBox::new(hosts);
        let selected = {
            let mut terminal = Terminal::new(select_box.height())?;
            select_box.select(&mut terminal)?
        };
        selected.ok_or_else(|| Error::NoHostSelected.into())
    }

    /// Picks a host and prints it or connects to it. Returns the exit code.
    pub fn run(&self) -> anyhow::Result<i32> {
        let host = if self.options.tui {
            self.resolve_tui()?
        } else {
            self.resolve(&SystemRunner, &mut Prompter::stdio())?
        };

        if self.options.print_only {
            println!("{host}");
            return Ok(0);
        }

        Ok(launch(&host, self.options.mode, &self.options.passthrough)?)
    }
}
