use clap::{Args, Parser, Subcommand};
use doing_core::{TagBool, TagFilter};
use std::path::PathBuf;

use crate::render::ColorMode;

/// doing - a plain-text journal of what you were doing
#[derive(Parser, Debug)]
#[command(name = "doing", version, about)]
pub struct Cli {
    /// Journal file to use instead of the configured one.
    #[arg(long, global = true, alias = "doing_file", env = "DOING_FILE", value_name = "PATH")]
    pub doing_file: Option<PathBuf>,
    /// TOML configuration file. Defaults to `~/.config/doing/config.toml`.
    #[arg(long, global = true, alias = "config_file", value_name = "PATH")]
    pub config_file: Option<PathBuf>,
    /// Print status messages to stdout instead of stderr.
    #[arg(long, global = true)]
    pub stdout: bool,
    /// Control ANSI colors in output.
    /// By default, colors are disabled when output is redirected (e.g with `>` or `|`).
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,
    /// Log engine activity to stderr. `DOING_LOG` takes precedence.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add an entry (e.g. `doing now Writing docs @work`)
    Now(NowArgs),
    /// Add an entry to the Later section
    Later(LaterArgs),
    /// Add a finished entry, or finish the last one when no text is given
    Done(DoneArgs),
    /// Mark the most recent unfinished entries @done
    Finish(FinishArgs),
    /// Mark the most recent unfinished entry @done without a time
    Cancel(CancelArgs),
    /// Repeat the last entry as a new one
    #[command(alias = "resume")]
    Again(AgainArgs),
    /// Move entries to the Archive section
    Archive(ArchiveArgs),
    /// Add a section to the journal
    #[command(alias = "add_section")]
    AddSection(AddSectionArgs),
    /// List sections
    Sections {
        /// One section per line.
        #[arg(long, short)]
        column: bool,
    },
    /// List entries, optionally of one section (`doing show Later`) or tag (`doing show @work`)
    Show(ShowArgs),
    /// Show the most recent entry of the current section
    Last {
        #[command(flatten)]
        filter: TagArgs,
    },
    /// Add tags to the most recent entries
    Tag(TagCommandArgs),
}

/// Tag selection shared by several commands.
#[derive(Args, Debug, Clone)]
pub struct TagArgs {
    /// Only entries with these tags (comma or space separated, `@` optional).
    #[arg(long, short)]
    pub tag: Option<String>,
    /// How multiple tags combine: and, or, not.
    #[arg(long = "bool", value_name = "MODE", default_value = "or")]
    pub mode: TagBool,
}

impl TagArgs {
    pub fn filter(&self) -> doing_core::DoingResult<Option<TagFilter>> {
        self.tag
            .as_deref()
            .map(|tags| TagFilter::parse(tags, self.mode))
            .transpose()
    }
}

#[derive(Args, Debug)]
pub struct NowArgs {
    /// Section to add to (must exist).
    #[arg(long, short)]
    pub section: Option<String>,
    /// Backdate the entry (e.g. `20m`, `1h30m`).
    #[arg(long, short)]
    pub back: Option<String>,
    /// Mark the previous entry @done first.
    #[arg(long, short, alias = "finish_last")]
    pub finish_last: bool,
    /// Note lines to attach to the entry.
    #[arg(long, short)]
    pub note: Option<String>,
    #[arg(required = true)]
    pub text: Vec<String>,
}

#[derive(Args, Debug)]
pub struct LaterArgs {
    #[arg(long, short)]
    pub back: Option<String>,
    #[arg(long, short)]
    pub note: Option<String>,
    #[arg(required = true)]
    pub text: Vec<String>,
}

#[derive(Args, Debug)]
pub struct DoneArgs {
    #[arg(long, short)]
    pub section: Option<String>,
    /// Backdate the entry and its finish time.
    #[arg(long, short)]
    pub back: Option<String>,
    #[arg(long, short)]
    pub note: Option<String>,
    #[command(flatten)]
    pub filter: TagArgs,
    pub text: Vec<String>,
}

#[derive(Args, Debug)]
pub struct FinishArgs {
    /// How many entries to finish.
    pub count: Option<usize>,
    #[arg(long, short)]
    pub section: Option<String>,
    #[command(flatten)]
    pub filter: TagArgs,
}

#[derive(Args, Debug)]
pub struct CancelArgs {
    #[arg(long, short)]
    pub section: Option<String>,
    #[command(flatten)]
    pub filter: TagArgs,
}

#[derive(Args, Debug)]
pub struct AgainArgs {
    /// Only look in this section.
    #[arg(long, short)]
    pub section: Option<String>,
    #[arg(long, short)]
    pub note: Option<String>,
    #[command(flatten)]
    pub filter: TagArgs,
}

#[derive(Args, Debug)]
pub struct ArchiveArgs {
    /// Section to archive from.
    pub source: Option<String>,
    /// Destination section.
    #[arg(long)]
    pub to: Option<String>,
    /// Leave this many of the most recent entries in place.
    #[arg(long, short)]
    pub keep: Option<usize>,
    /// Only entries matching this text, or `/regex/`.
    #[arg(long)]
    pub search: Option<String>,
    #[command(flatten)]
    pub filter: TagArgs,
}

#[derive(Args, Debug)]
pub struct AddSectionArgs {
    /// Fail when the section already exists.
    #[arg(long)]
    pub strict: bool,
    #[arg(required = true)]
    pub name: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Section name, or `@tag` to show entries with that tag.
    pub target: Option<String>,
    /// Show at most this many entries.
    #[arg(long, short)]
    pub count: Option<usize>,
    /// Only entries matching this text, or `/regex/`.
    #[arg(long)]
    pub search: Option<String>,
    #[command(flatten)]
    pub filter: TagArgs,
}

#[derive(Args, Debug)]
pub struct TagCommandArgs {
    #[arg(long, short)]
    pub section: Option<String>,
    /// How many recent entries to tag.
    #[arg(long, short)]
    pub count: Option<usize>,
    /// Remove the tags instead.
    #[arg(long, short)]
    pub remove: bool,
    /// Tags to apply, e.g. `flagged` or `client(acme)`.
    #[arg(required = true)]
    pub tags: Vec<String>,
}
