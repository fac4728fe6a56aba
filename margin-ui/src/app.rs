//! The interactive form loop.
//!
//! Reads one command per line, applies it to the [`FormSession`] and prints
//! the form after every calculation or reset. Generic over the reader and
//! writer so the loop runs the same against a terminal or a test buffer.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use margin_core::PricingSolver;
use tracing::{debug, warn};

use crate::{
    commands::{Command, HELP},
    config::AppConfig,
    logging,
    session::FormSession,
    view::FormView,
};

/// Whether the loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    session: FormSession,
    currency: String,
}

impl App {
    /// Builds the application from configuration.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let solver = PricingSolver::new(config.solver).context("invalid solver configuration")?;
        Ok(Self {
            session: FormSession::new(solver),
            currency: config.display.currency.clone(),
        })
    }

    pub fn session(&self) -> &FormSession {
        &self.session
    }

    /// Runs until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        input: R,
        out: &mut W,
    ) -> Result<()> {
        writeln!(out, "Margin Calculator")?;
        writeln!(
            out,
            "Target Margin is calculated on Net2. Added Value is part of Net2 BEFORE discount."
        )?;
        writeln!(out, "Type 'help' for commands.")?;
        self.show(out)?;

        for line in input.lines() {
            let line = line.context("failed to read command")?;
            let flow = match Command::parse(&line) {
                Ok(command) => self.handle(command, out)?,
                Err(error) => {
                    warn!(%error, line = %line, "command rejected");
                    writeln!(out, "{error}")?;
                    Flow::Continue
                }
            };
            if flow == Flow::Quit {
                break;
            }
        }
        out.flush()?;
        Ok(())
    }

    /// Applies one command.
    pub fn handle<W: Write>(
        &mut self,
        command: Command,
        out: &mut W,
    ) -> Result<Flow> {
        debug!(?command, "handling command");
        match command {
            Command::Set { field, value } => {
                if let Err(error) = self.session.edit(field, &value) {
                    writeln!(out, "{error}")?;
                }
            }
            Command::Clear(field) => {
                if let Err(error) = self.session.clear(field) {
                    writeln!(out, "{error}")?;
                }
            }
            Command::Calculate => {
                self.session.calculate();
                self.show(out)?;
            }
            Command::Reset => {
                self.session.reset();
                self.show(out)?;
            }
            Command::Show => self.show(out)?,
            Command::LogLevel(level) => match logging::set_log_level(&level) {
                Ok(()) => writeln!(out, "log level set to '{level}'")?,
                Err(error) => writeln!(out, "{error:#}")?,
            },
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn show<W: Write>(
        &self,
        out: &mut W,
    ) -> Result<()> {
        writeln!(out, "{}", FormView::new(self.session.snapshot(), &self.currency))?;
        Ok(())
    }
}
