use cardbinder::binder::PageTarget;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "binder",
    bin_name = "binder",
    version = get_version(),
    disable_help_flag = true,
    disable_help_subcommand = true
)]
#[command(about = "Organize trading-card images in a paginated binder", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,

    /// Print help
    #[arg(short, long, global = true)]
    pub help: bool,
}

/// Command group definitions for help output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGroup {
    Binder,
    Cards,
    Pages,
    Data,
    Misc,
}

impl CommandGroup {
    pub fn heading(&self) -> &'static str {
        match self {
            CommandGroup::Binder => "Binder Commands:",
            CommandGroup::Cards => "Card Commands:",
            CommandGroup::Pages => "Capacity Commands:",
            CommandGroup::Data => "Data Commands:",
            CommandGroup::Misc => "Miscellaneous:",
        }
    }

    pub fn for_command(name: &str) -> Option<Self> {
        match name {
            "show" | "layout" | "page" | "undo" => Some(CommandGroup::Binder),
            "add" | "delete" | "move" | "sort" | "search" => Some(CommandGroup::Cards),
            "capacity" | "add-page" | "clear" => Some(CommandGroup::Pages),
            "import-csv" | "import" | "export" => Some(CommandGroup::Data),
            "config" | "help" => Some(CommandGroup::Misc),
            _ => None,
        }
    }

    pub fn all() -> &'static [CommandGroup] {
        &[
            CommandGroup::Binder,
            CommandGroup::Cards,
            CommandGroup::Pages,
            CommandGroup::Data,
            CommandGroup::Misc,
        ]
    }
}

pub fn get_grouped_help() -> String {
    let cmd = Cli::command();
    let version = cmd.get_version().unwrap_or("unknown");

    let mut output = String::new();
    output.push_str(&format!("binder {version}\n"));
    output.push_str("Organize trading-card images in a paginated binder\n");
    output.push('\n');
    output.push_str("Usage: binder [OPTIONS] [COMMAND]\n");

    let subcommands: Vec<_> = cmd.get_subcommands().collect();

    for group in CommandGroup::all() {
        let group_cmds: Vec<_> = subcommands
            .iter()
            .filter(|sc| {
                !sc.is_hide_set() && CommandGroup::for_command(sc.get_name()) == Some(*group)
            })
            .collect();

        if !group_cmds.is_empty() {
            output.push('\n');
            output.push_str(&format!("{}\n", group.heading()));
            for sc in group_cmds {
                let name = sc.get_name();
                let about = sc.get_about().map(|s| s.to_string()).unwrap_or_default();
                output.push_str(&format!("  {:<12} {}\n", name, about));
            }
        }
    }

    output.push('\n');
    output.push_str("Options:\n");
    output.push_str("  -v, --verbose    Verbose output\n");
    output.push_str("  -h, --help       Print help\n");
    output.push_str("  -V, --version    Print version\n");
    output.push('\n');
    output.push_str("Data is kept in the platform data directory, or in $BINDER_DATA when set.\n");

    output
}

pub fn print_grouped_help() {
    print!("{}", get_grouped_help());
}

/// Prints help for a specific subcommand using clap's built-in rendering
pub fn print_subcommand_help(command: &Option<Commands>) {
    let name = match command {
        Some(Commands::Binder(c)) => match c {
            BinderCommands::Show => "show",
            BinderCommands::Layout { .. } => "layout",
            BinderCommands::Page { .. } => "page",
            BinderCommands::Undo => "undo",
        },
        Some(Commands::Cards(c)) => match c {
            CardCommands::Add { .. } => "add",
            CardCommands::Delete { .. } => "delete",
            CardCommands::Move { .. } => "move",
            CardCommands::Sort { .. } => "sort",
            CardCommands::Search { .. } => "search",
        },
        Some(Commands::Pages(c)) => match c {
            PageCommands::Capacity { .. } => "capacity",
            PageCommands::AddPage => "add-page",
            PageCommands::Clear { .. } => "clear",
        },
        Some(Commands::Data(c)) => match c {
            DataCommands::ImportCsv { .. } => "import-csv",
            DataCommands::Import { .. } => "import",
            DataCommands::Export { .. } => "export",
        },
        Some(Commands::Misc(c)) => match c {
            MiscCommands::Config { .. } => "config",
            MiscCommands::Help { .. } => "help",
        },
        None => {
            print_grouped_help();
            return;
        }
    };

    print_help_for_command(name);
}

pub fn print_help_for_command(name: &str) {
    let mut cmd = Cli::command();

    for subcmd in cmd.get_subcommands_mut() {
        if subcmd.get_name() == name {
            let help = subcmd.render_help();
            print!("{}", help);
            return;
        }
    }

    eprintln!("Unknown command: {}", name);
    eprintln!();
    print_grouped_help();
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Binder(BinderCommands),

    #[command(flatten)]
    Cards(CardCommands),

    #[command(flatten)]
    Pages(PageCommands),

    #[command(flatten)]
    Data(DataCommands),

    #[command(flatten)]
    Misc(MiscCommands),
}

#[derive(Subcommand, Debug)]
pub enum BinderCommands {
    /// Show the current page
    #[command(alias = "ls", display_order = 1)]
    Show,

    /// Choose the grid size (2 for 2x2, 3 for 3x3, ...)
    #[command(display_order = 2)]
    Layout {
        /// Cards per row; defaults to the configured default_layout
        #[arg(allow_negative_numbers = true)]
        size: Option<i64>,
    },

    /// Go to a page: first, last, next, prev or a page number
    #[command(alias = "p", display_order = 3)]
    Page { target: PageTarget },

    /// Undo the last change
    #[command(alias = "u", display_order = 4)]
    Undo,
}

#[derive(Subcommand, Debug)]
pub enum CardCommands {
    /// Add a card by image URL
    #[command(alias = "a", display_order = 10)]
    Add {
        /// Image URL (or local path) of the card
        url: String,

        /// Card name
        #[arg(long)]
        name: Option<String>,

        /// Set name
        #[arg(long)]
        set: Option<String>,

        /// Card number within the set
        #[arg(long)]
        number: Option<String>,

        /// Slot to place the card in (defaults to the first empty slot)
        #[arg(long, value_name = "SLOT")]
        at: Option<usize>,
    },

    /// Remove the card in a slot
    #[command(alias = "rm", display_order = 11)]
    Delete { slot: usize },

    /// Swap the contents of two slots
    #[command(alias = "mv", display_order = 12)]
    Move { from: usize, to: usize },

    /// Sort every card by color
    #[command(display_order = 13)]
    Sort {
        /// Fill each page column by column instead of row by row
        #[arg(long)]
        columns: bool,
    },

    /// Search the card database by name
    #[command(display_order = 14)]
    Search {
        /// Search words (joined with spaces)
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Add the Nth result to the binder
        #[arg(long, value_name = "N")]
        add: Option<usize>,

        /// Slot for the added result (defaults to the first empty slot)
        #[arg(long, value_name = "SLOT", requires = "add")]
        at: Option<usize>,
    },
}

#[derive(Subcommand, Debug)]
pub enum PageCommands {
    /// Set the total number of slots (rounded up to whole pages)
    #[command(display_order = 20)]
    Capacity {
        slots: usize,

        /// Skip confirmation when cards would be removed
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Append one empty page
    #[command(display_order = 21)]
    AddPage,

    /// Remove every card
    #[command(display_order = 22)]
    Clear {
        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum DataCommands {
    /// Import a PriceCharting CSV export, looking up each card
    #[command(display_order = 30)]
    ImportCsv { file: PathBuf },

    /// Replace the binder with a JSON export
    #[command(display_order = 31)]
    Import { file: PathBuf },

    /// Export the binder to JSON (default: binder_<date>.json)
    #[command(display_order = 32)]
    Export { file: Option<PathBuf> },
}

#[derive(Subcommand, Debug)]
pub enum MiscCommands {
    /// Get or set configuration
    #[command(display_order = 40)]
    Config {
        /// Configuration key (e.g., default_layout)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Print help for binder or a subcommand
    #[command(display_order = 41)]
    Help {
        /// Subcommand to get help for
        command: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("binder").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_command_means_show() {
        assert!(parse(&[]).command.is_none());
    }

    #[test]
    fn parses_add_with_options() {
        let cli = parse(&["add", "https://x/a.png", "--name", "Pikachu", "--at", "4"]);
        match cli.command {
            Some(Commands::Cards(CardCommands::Add { url, name, at, .. })) => {
                assert_eq!(url, "https://x/a.png");
                assert_eq!(name.as_deref(), Some("Pikachu"));
                assert_eq!(at, Some(4));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn parses_page_targets() {
        match parse(&["page", "last"]).command {
            Some(Commands::Binder(BinderCommands::Page { target })) => {
                assert_eq!(target, PageTarget::Last)
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(Cli::try_parse_from(["binder", "page", "sideways"]).is_err());
    }

    #[test]
    fn negative_layout_reaches_the_library() {
        match parse(&["layout", "-1"]).command {
            Some(Commands::Binder(BinderCommands::Layout { size })) => assert_eq!(size, Some(-1)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn every_command_has_a_group() {
        let cmd = Cli::command();
        for sc in cmd.get_subcommands() {
            assert!(
                CommandGroup::for_command(sc.get_name()).is_some(),
                "{} has no help group",
                sc.get_name()
            );
        }
    }

    #[test]
    fn grouped_help_lists_commands() {
        let help = get_grouped_help();
        assert!(help.contains("import-csv"));
        assert!(help.contains("Capacity Commands:"));
    }
}
