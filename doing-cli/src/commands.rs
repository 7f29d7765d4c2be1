use anyhow::Result;
use doing_core::{
    Doing, Query, Search, TagBool, TagFilter,
    ops::{
        self, ArchiveOptions, CancelOptions, DoneOptions, FinishOptions, NowOptions,
        ResumeOptions, TagOptions,
    },
};

use crate::{
    cli::{Cli, Command, ShowArgs},
    config,
    render::{RenderOptions, Renderer},
};

/// Runs one command: load, apply or query, report.
pub fn run(cli: Cli) -> Result<()> {
    let config = config::load(cli.doing_file.as_deref(), cli.config_file.as_deref())?;
    let renderer = Renderer::new(RenderOptions {
        use_color: cli.color.enabled(),
        messages_to_stdout: cli.stdout,
    });
    let mut doing = Doing::open(config)?;

    let outcome = match cli.command {
        Command::Now(args) => {
            let subject = args.text.join(" ");
            let opts = NowOptions {
                section: args.section,
                back: args.back,
                finish_last: args.finish_last,
                note: args.note,
            };
            doing.apply(|j, ctx| ops::now(j, ctx, &subject, &opts))?
        }
        Command::Later(args) => {
            let subject = args.text.join(" ");
            doing.apply(|j, ctx| {
                ops::later(j, ctx, &subject, args.back.as_deref(), args.note.as_deref())
            })?
        }
        Command::Done(args) => {
            let subject = (!args.text.is_empty()).then(|| args.text.join(" "));
            let opts = DoneOptions {
                section: args.section,
                back: args.back,
                tags: args.filter.filter()?,
                note: args.note,
            };
            doing.apply(|j, ctx| ops::done(j, ctx, subject.as_deref(), &opts))?
        }
        Command::Finish(args) => {
            let opts = FinishOptions {
                section: args.section,
                tags: args.filter.filter()?,
                count: args.count,
            };
            doing.apply(|j, ctx| ops::finish(j, ctx, &opts))?
        }
        Command::Cancel(args) => {
            let opts = CancelOptions {
                section: args.section,
                tags: args.filter.filter()?,
            };
            doing.apply(|j, _| ops::cancel(j, &opts))?
        }
        Command::Again(args) => {
            let opts = ResumeOptions {
                section: args.section,
                tags: args.filter.filter()?,
                note: args.note,
            };
            doing.apply(|j, ctx| ops::resume(j, ctx, &opts))?
        }
        Command::Archive(args) => {
            let opts = ArchiveOptions {
                source: args.source,
                tags: args.filter.filter()?,
                search: args.search.as_deref().map(Search::parse).transpose()?,
                keep: args.keep,
                target: args.to,
            };
            doing.apply(|j, ctx| ops::archive(j, ctx, &opts))?
        }
        Command::AddSection(args) => {
            let name = args.name.join(" ");
            doing.apply(|j, _| ops::add_section(j, &name, args.strict))?
        }
        Command::Tag(args) => {
            let tags = TagFilter::parse(&args.tags.join(" "), TagBool::Or)?.tags;
            let opts = TagOptions {
                section: args.section,
                count: args.count,
                remove: args.remove,
            };
            doing.apply(|j, _| ops::tag(j, &tags, &opts))?
        }
        Command::Sections { column } => {
            renderer.print_sections(doing.journal().section_names(), column);
            return Ok(());
        }
        Command::Show(args) => return show(&doing, &renderer, args),
        Command::Last { filter } => {
            match doing.last(filter.filter()?.as_ref()) {
                Some(entry) => renderer.print_entries([entry]),
                None => renderer.print_message("No entries found"),
            }
            return Ok(());
        }
    };

    for message in &outcome.messages {
        renderer.print_message(message);
    }
    Ok(())
}

fn show(doing: &Doing, renderer: &Renderer, args: ShowArgs) -> Result<()> {
    let mut query = Query::default();
    let mut tags: Vec<String> = args.filter.tag.into_iter().collect();
    match args.target {
        Some(target) if target.starts_with('@') => tags.push(target),
        Some(section) => query = query.section(section),
        None => {}
    }
    if !tags.is_empty() {
        query = query.tags(TagFilter::parse(&tags.join(" "), args.filter.mode)?);
    }
    if let Some(search) = args.search {
        query = query.search(Search::parse(&search)?);
    }
    if let Some(count) = args.count {
        query = query.count(count);
    }

    let found: Vec<_> = doing.show(&query)?.map(|shown| shown.entry).collect();
    if found.is_empty() {
        renderer.print_message("No entries found");
    } else {
        renderer.print_entries(found);
    }
    Ok(())
}
