use super::interrupt::Interrupt;
use super::render::{print_messages, render_matches, render_page, render_text_list, Progress};
use super::setup::{
    print_grouped_help, print_help_for_command, print_subcommand_help, BinderCommands,
    CardCommands, Cli, Commands, DataCommands, MiscCommands, PageCommands,
};
use cardbinder::api::{BinderApi, CmdResult, ConfigAction, NewCard};
use cardbinder::binder::PageTarget;
use cardbinder::cancel::CancelFlag;
use cardbinder::config::BinderConfig;
use cardbinder::error::{BinderError, Result};
use cardbinder::hue::ImageHue;
use cardbinder::lookup::TcgApiSearch;
use cardbinder::sort::SortOrder;
use cardbinder::store::fs::FileStore;
use clap::Parser;
use colored::Colorize;
use directories::ProjectDirs;
use log::{debug, warn};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

const DATA_DIR_ENV: &str = "BINDER_DATA";

struct AppContext {
    api: BinderApi<FileStore, ImageHue, TcgApiSearch>,
    interrupt: Interrupt,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Top level gets grouped help, subcommands get clap's default
    if cli.help {
        if cli.command.is_none() {
            print_grouped_help();
        } else {
            print_subcommand_help(&cli.command);
        }
        return Ok(());
    }

    if let Some(Commands::Misc(MiscCommands::Help { command })) = &cli.command {
        return handle_help(command.clone());
    }

    let mut ctx = init_context()?;

    match cli.command {
        Some(Commands::Binder(cmd)) => match cmd {
            BinderCommands::Show => handle_show(&mut ctx),
            BinderCommands::Layout { size } => handle_layout(&mut ctx, size),
            BinderCommands::Page { target } => handle_page(&mut ctx, target),
            BinderCommands::Undo => handle_undo(&mut ctx),
        },
        Some(Commands::Cards(cmd)) => match cmd {
            CardCommands::Add {
                url,
                name,
                set,
                number,
                at,
            } => {
                let card = NewCard {
                    set_name: set,
                    card_number: number,
                    ..NewCard::new(url, name.unwrap_or_default())
                };
                handle_add(&mut ctx, card, at)
            }
            CardCommands::Delete { slot } => handle_delete(&mut ctx, slot),
            CardCommands::Move { from, to } => handle_move(&mut ctx, from, to),
            CardCommands::Sort { columns } => handle_sort(&mut ctx, columns),
            CardCommands::Search { query, add, at } => {
                handle_search(&mut ctx, query.join(" "), add, at)
            }
        },
        Some(Commands::Pages(cmd)) => match cmd {
            PageCommands::Capacity { slots, yes } => handle_capacity(&mut ctx, slots, yes),
            PageCommands::AddPage => handle_add_page(&mut ctx),
            PageCommands::Clear { yes } => handle_clear(&mut ctx, yes),
        },
        Some(Commands::Data(cmd)) => match cmd {
            DataCommands::ImportCsv { file } => handle_import_csv(&mut ctx, file),
            DataCommands::Import { file } => handle_import(&mut ctx, file),
            DataCommands::Export { file } => handle_export(&mut ctx, file),
        },
        Some(Commands::Misc(cmd)) => match cmd {
            MiscCommands::Config { key, value } => handle_config(&mut ctx, key, value),
            MiscCommands::Help { command } => handle_help(command),
        },
        None => handle_show(&mut ctx),
    }
}

/// `-v` raises the default filter to debug; `RUST_LOG` always wins.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "cardbinder", "cardbinder")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| BinderError::Api("Could not determine the data directory".into()))
}

fn init_context() -> Result<AppContext> {
    let data_dir = data_dir()?;
    debug!("data directory: {}", data_dir.display());

    let config = BinderConfig::load(&data_dir).unwrap_or_else(|e| {
        warn!("ignoring unreadable config: {}", e);
        BinderConfig::default()
    });
    let search = TcgApiSearch::new(
        config.lookup_base_url.clone(),
        Duration::from_millis(config.lookup_delay_ms),
    )?;

    let cancel = CancelFlag::new();
    let interrupt = Interrupt::install(cancel.clone());
    let mut progress = Progress::new("Loading binder");
    let api = interrupt.guard(|| {
        BinderApi::open_with_cancel(
            FileStore::new(data_dir.clone()),
            ImageHue::new(),
            search,
            config,
            data_dir,
            cancel,
            |done, total| progress.update(done, total),
        )
    });
    progress.finish();

    if let Some(err) = &api.load_report().discarded {
        eprintln!(
            "{}",
            format!("Saved binder could not be read and was reset ({})", err).yellow()
        );
    }
    if api.load_report().cancelled {
        eprintln!("{}", "Loading was cancelled; some cards were not restored".yellow());
    }

    Ok(AppContext { api, interrupt })
}

/// Converts a 1-based slot number from the command line to a global index.
fn slot_index(slot: usize) -> Result<usize> {
    slot.checked_sub(1)
        .ok_or_else(|| BinderError::Api("Slots are numbered from 1".into()))
}

/// Asks a yes/no question on stdin. Anything but y/yes, including EOF, is no.
fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

fn print_result(ctx: &AppContext, result: &CmdResult) {
    if let Some(view) = &result.page {
        print!("{}", render_page(view, ctx.api.load_report().saved_at));
        println!();
    }
    print_messages(&result.messages);
}

fn handle_show(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.show()?;
    print_result(ctx, &result);
    Ok(())
}

fn handle_layout(ctx: &mut AppContext, size: Option<i64>) -> Result<()> {
    let result = ctx.api.select_layout(size)?;
    print_result(ctx, &result);
    Ok(())
}

fn handle_page(ctx: &mut AppContext, target: PageTarget) -> Result<()> {
    let result = ctx.api.go_to_page(target)?;
    print_result(ctx, &result);
    Ok(())
}

fn handle_undo(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.undo()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_add(ctx: &mut AppContext, card: NewCard, at: Option<usize>) -> Result<()> {
    let target = at.map(slot_index).transpose()?;
    let result = ctx.api.add_card(card, target)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, slot: usize) -> Result<()> {
    let result = ctx.api.delete_card(slot_index(slot)?)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_move(ctx: &mut AppContext, from: usize, to: usize) -> Result<()> {
    let result = ctx.api.move_card(slot_index(from)?, slot_index(to)?)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_sort(ctx: &mut AppContext, columns: bool) -> Result<()> {
    let order = if columns {
        SortOrder::ColumnMajor
    } else {
        SortOrder::RowMajor
    };
    let mut progress = Progress::new("Analyzing colors");
    let result = ctx
        .api
        .sort(order, |done, total| progress.update(done, total));
    progress.finish();
    print_messages(&result?.messages);
    Ok(())
}

fn handle_search(
    ctx: &mut AppContext,
    query: String,
    add: Option<usize>,
    at: Option<usize>,
) -> Result<()> {
    let result = ctx.api.search(&query)?;
    print!("{}", render_matches(&result.matches));
    print_messages(&result.messages);

    let Some(n) = add else {
        return Ok(());
    };
    let found = n
        .checked_sub(1)
        .and_then(|i| result.matches.get(i))
        .cloned()
        .ok_or_else(|| BinderError::Api(format!("No search result {}", n)))?;
    let target = at.map(slot_index).transpose()?;
    let added = ctx.api.add_card(NewCard::from(found), target)?;
    print_messages(&added.messages);
    Ok(())
}

fn handle_capacity(ctx: &mut AppContext, slots: usize, yes: bool) -> Result<()> {
    let result = match ctx.api.set_capacity(slots, yes) {
        Err(BinderError::CapacityReductionRequiresConfirmation { requested, cards }) => {
            let question = format!(
                "Reducing to {} slots will remove {} of your {} cards. Continue?",
                requested,
                cards - requested,
                cards
            );
            if !confirm(&question)? {
                println!("{}", "Capacity unchanged".dimmed());
                return Ok(());
            }
            ctx.api.set_capacity(slots, true)?
        }
        other => other?,
    };
    print_messages(&result.messages);
    Ok(())
}

fn handle_add_page(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.api.add_page()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_clear(ctx: &mut AppContext, yes: bool) -> Result<()> {
    let cards = ctx.api.binder().tracker().cards;
    if cards > 0 && !yes && !confirm(&format!("Clear all {} cards?", cards))? {
        println!("{}", "Binder unchanged".dimmed());
        return Ok(());
    }
    let result = ctx.api.clear()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_import_csv(ctx: &mut AppContext, file: PathBuf) -> Result<()> {
    let mut progress = Progress::new("Looking up cards");
    let api = &mut ctx.api;
    let result = ctx
        .interrupt
        .guard(|| api.import_csv(&file, |done, total| progress.update(done, total)));
    progress.finish();
    print_messages(&result?.messages);
    Ok(())
}

fn handle_import(ctx: &mut AppContext, file: PathBuf) -> Result<()> {
    let mut progress = Progress::new("Loading cards");
    let api = &mut ctx.api;
    let result = ctx
        .interrupt
        .guard(|| api.import_binder(&file, |done, total| progress.update(done, total)));
    progress.finish();
    print_messages(&result?.messages);
    Ok(())
}

fn handle_export(ctx: &mut AppContext, file: Option<PathBuf>) -> Result<()> {
    let result = ctx.api.export(file)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key.clone(), value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };

    let result = ctx.api.configure(action)?;
    let mut lines = Vec::new();
    if key.is_none() {
        if let Some(config) = &result.config {
            for (k, v) in config.entries() {
                lines.push(format!("{} = {}", k, v));
            }
        }
        print!("{}", render_text_list(&lines, "No configuration values."));
    }
    print_messages(&result.messages);
    Ok(())
}

fn handle_help(command: Option<String>) -> Result<()> {
    match command {
        Some(cmd) => print_help_for_command(&cmd),
        None => print_grouped_help(),
    }
    Ok(())
}
