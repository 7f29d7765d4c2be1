use doing_core::{Entry, timestamp};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use termimad::crossterm::style::{Color, Stylize};

static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|[^\w])(@\w+(?:\([^()]*\))?)").unwrap());

#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub use_color: bool,
    /// Send status messages to stdout instead of stderr.
    pub messages_to_stdout: bool,
}

pub struct Renderer {
    opts: RenderOptions,
}

impl Renderer {
    pub fn new(opts: RenderOptions) -> Self {
        Self { opts }
    }

    /// Status lines such as `Added "x" to Currently`.
    pub fn print_message(&self, message: &str) {
        if self.opts.messages_to_stdout {
            println!("{message}");
        } else {
            eprintln!("{message}");
        }
    }

    pub fn print_entries<'a>(&self, entries: impl IntoIterator<Item = &'a Entry>) {
        for entry in entries {
            print!("{}", self.format_entry(entry));
        }
    }

    pub fn print_sections<'a>(&self, names: impl Iterator<Item = &'a str>, column: bool) {
        let names: Vec<String> = names
            .map(|n| {
                if self.opts.use_color {
                    n.with(Color::Blue).to_string()
                } else {
                    n.to_string()
                }
            })
            .collect();
        if column {
            for name in names {
                println!("{name}");
            }
        } else {
            println!("{}", names.join("\t"));
        }
    }

    /// `2025-08-15 12:00 | subject`, followed by indented note lines.
    fn format_entry(&self, entry: &Entry) -> String {
        let mut stamp = timestamp::format(&entry.timestamp);
        let mut subject = entry.subject.clone();
        if self.opts.use_color {
            stamp = stamp.with(Color::Cyan).to_string();
            subject = highlight_tags(&subject);
        }

        let mut out = format!("{stamp} | {subject}\n");
        for note in &entry.notes {
            out.push('\t');
            out.push_str(note);
            out.push('\n');
        }
        out
    }
}

fn highlight_tags(subject: &str) -> String {
    TAG.replace_all(subject, |caps: &Captures| {
        format!("{}{}", &caps[1], caps[2].with(Color::Green))
    })
    .into_owned()
}
