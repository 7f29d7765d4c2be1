use clap::ValueEnum;
use std::io::{self, IsTerminal};

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    /// `Auto` means color only on a terminal and only when `NO_COLOR` is unset.
    pub fn enabled(self) -> bool {
        self.resolve(std::env::var_os("NO_COLOR").is_some(), io::stdout().is_terminal())
    }

    fn resolve(self, no_color: bool, is_terminal: bool) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => !no_color && is_terminal,
        }
    }
}
