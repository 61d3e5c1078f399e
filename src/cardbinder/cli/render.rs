use super::styles::{hue_style, STYLES};
use cardbinder::api::{CmdMessage, MessageLevel, PageView};
use cardbinder::lookup::CardMatch;
use cardbinder::model::Card;
use chrono::{DateTime, Utc};
use colored::Colorize;
use console::Term;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const GRID_WIDTH: usize = 100;
const MIN_CELL_WIDTH: usize = 12;
const EMPTY_MARKER: &str = "·";

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

/// Draws one page as an n×n grid of numbered cells.
pub(super) fn render_page(view: &PageView, saved_at: Option<DateTime<Utc>>) -> String {
    let size = view.layout.size();
    let number_width = (view.first_index + view.slots.len()).to_string().len();
    let cell_width = (GRID_WIDTH / size).max(MIN_CELL_WIDTH);
    let title_width = cell_width.saturating_sub(number_width + 2);

    let mut output = String::new();
    let mut header = format!(
        "Page {} of {}  {}x{}  Cards: {} / {} slots used",
        view.page, view.total_pages, size, size, view.tracker.cards, view.tracker.slots
    );
    if let Some(ts) = saved_at {
        header.push_str(&format!("  {}", STYLES.time.apply_to(format_saved_ago(ts))));
    }
    output.push_str(&format!("{}\n\n", STYLES.header.apply_to(header)));

    for (row_index, row) in view.rows().enumerate() {
        let mut line = String::new();
        for (col, slot) in row.iter().enumerate() {
            let number = view.first_index + row_index * size + col + 1;
            let label = format!("{:>width$}", number, width = number_width);
            line.push_str(&format!("{} ", STYLES.slot_number.apply_to(label)));

            let (text, styled) = match slot {
                Some(card) => {
                    let text = truncate_to_width(&card.title(), title_width);
                    let styled = card_style(card).apply_to(text.clone()).to_string();
                    (text, styled)
                }
                None => (
                    EMPTY_MARKER.to_string(),
                    STYLES.empty.apply_to(EMPTY_MARKER).to_string(),
                ),
            };
            line.push_str(&styled);
            if col + 1 < row.len() {
                let padding = title_width.saturating_sub(text.width()) + 1;
                line.push_str(&" ".repeat(padding));
            }
        }
        output.push_str(line.trim_end());
        output.push('\n');
    }

    output
}

fn card_style(card: &Card) -> console::Style {
    if card.is_direct_image {
        hue_style(card.hue)
    } else {
        STYLES.placeholder.clone()
    }
}

pub(super) fn render_matches(matches: &[CardMatch]) -> String {
    let mut output = String::new();
    let index_width = matches.len().to_string().len();
    for (i, found) in matches.iter().enumerate() {
        let index = format!("{:>width$}.", i + 1, width = index_width);
        output.push_str(&format!(
            "{} {} ({}) #{}\n",
            STYLES.result_index.apply_to(index),
            found.name,
            found.set_name,
            found.card_number
        ));
        output.push_str(&format!(
            "{}  {}\n",
            " ".repeat(index_width),
            found.image_url.dimmed()
        ));
    }
    output
}

pub(super) fn render_text_list(lines: &[String], empty_message: &str) -> String {
    if lines.is_empty() {
        return format!("{}\n", empty_message);
    }
    let mut output = lines.join("\n");
    output.push('\n');
    output
}

/// `(done, total)` counter on stderr, redrawn in place. Silent when stderr
/// is not a terminal.
pub(super) struct Progress {
    term: Term,
    label: &'static str,
    shown: bool,
}

impl Progress {
    pub fn new(label: &'static str) -> Self {
        Self {
            term: Term::stderr(),
            label,
            shown: false,
        }
    }

    pub fn update(&mut self, done: usize, total: usize) {
        if !self.term.is_term() {
            return;
        }
        let _ = self.term.clear_line();
        let _ = self
            .term
            .write_str(&format!("{} {}/{}", self.label, done, total));
        self.shown = true;
    }

    pub fn finish(&mut self) {
        if self.shown {
            let _ = self.term.clear_line();
            self.shown = false;
        }
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_saved_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let formatter = Formatter::new();
    format!("saved {}", formatter.convert(duration.to_std().unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardbinder::binder::Binder;
    use cardbinder::layout::Layout;

    fn view_with(cards: &[(&str, usize)]) -> PageView {
        let mut binder = Binder::default();
        let layout = Layout::new(2).unwrap();
        binder.select_layout(layout);
        for (name, index) in cards {
            binder
                .place_card(Card::new(format!("https://x/{}.png", name), *name), *index)
                .unwrap();
        }
        PageView::of(&binder, layout)
    }

    #[test]
    fn truncates_long_titles() {
        assert_eq!(truncate_to_width("Charizard", 20), "Charizard");
        assert_eq!(truncate_to_width("Charizard", 5), "Char…");
        assert_eq!(truncate_to_width("", 5), "");
    }

    #[test]
    fn page_shows_numbers_titles_and_empties() {
        let out = render_page(&view_with(&[("Pikachu", 0), ("Mew", 3)]), None);
        assert!(out.contains("Page 1 of 1"));
        assert!(out.contains("Cards: 2 / 4 slots used"));
        assert!(out.contains("Pikachu"));
        assert!(out.contains("Mew"));
        assert!(out.contains(EMPTY_MARKER));
        // header, blank line, two rows
        assert_eq!(out.lines().count(), 4);
    }

    #[test]
    fn numbers_continue_on_later_pages() {
        let out = render_page(&view_with(&[("Eevee", 5)]), None);
        assert!(out.contains("Page 2 of 2"));
        assert!(out.contains('5'));
        assert!(out.contains('8'));
    }

    #[test]
    fn saved_time_is_shown() {
        let out = render_page(&view_with(&[]), Some(Utc::now()));
        assert!(out.contains("saved"));
    }

    #[test]
    fn matches_are_numbered_from_one() {
        let matches = vec![CardMatch {
            image_url: "https://img/1.png".into(),
            name: "Mew".into(),
            set_name: "Promo".into(),
            card_number: "8".into(),
        }];
        let out = render_matches(&matches);
        assert!(out.contains("1."));
        assert!(out.contains("Mew (Promo) #8"));
    }

    #[test]
    fn empty_text_list() {
        assert_eq!(render_text_list(&[], "Nothing."), "Nothing.\n");
        assert_eq!(render_text_list(&["a = 1".into()], "Nothing."), "a = 1\n");
    }
}
