//! # Bulk CSV Import
//!
//! Reads a PriceCharting collection export and turns each row into a card.
//!
//! Parsing is forgiving: headers are matched case-insensitively with quotes
//! stripped and `-` read as `_`, so `"Product-Name"` finds `product_name`.
//! Quoted fields may contain commas. Rows without a name or a set are skipped.
//!
//! Fetching goes row by row through [`cascade_lookup`]. Japanese sets are not
//! in the remote database and become placeholders straight away, as does any
//! row the cascade cannot match. Both phases check the [`CancelFlag`] between
//! rows and keep whatever was produced so far.

use crate::cancel::CancelFlag;
use crate::error::{BinderError, Result};
use crate::hue::HueSource;
use crate::lookup::{cascade_lookup, CardSearch};
use crate::model::Card;
use log::{info, warn};

pub const PRODUCT_NAME: &str = "product_name";
pub const CONSOLE_NAME: &str = "console_name";
pub const CARD_NUMBER: &str = "card_number";
pub const GRADE: &str = "grade";

pub const NOT_FOUND_TEXT: &str = "Card+Not+Found";
pub const JAPANESE_TEXT: &str = "Japanese+Card+Placeholder";

/// One row that survived parsing, ready to be looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvCandidate {
    pub card_name: String,
    pub set_name: String,
    pub card_number: String,
    pub grade: Option<String>,
}

impl CsvCandidate {
    pub fn is_japanese(&self) -> bool {
        self.set_name.to_lowercase().contains("japanese")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCsv {
    pub candidates: Vec<CsvCandidate>,
    pub skipped: usize,
    pub cancelled: bool,
}

/// Cards produced by the fetch phase, in row order.
#[derive(Debug, Clone, Default)]
pub struct FetchedBatch {
    pub cards: Vec<Card>,
    pub found: usize,
    pub placeholders: usize,
    pub cancelled: bool,
}

impl FetchedBatch {
    pub fn summary(&self) -> String {
        if self.cancelled {
            format!(
                "Import cancelled ({} added, {} placeholders)",
                self.found, self.placeholders
            )
        } else {
            format!(
                "Imported {} cards, {} placeholders",
                self.found, self.placeholders
            )
        }
    }
}

struct Columns {
    product_name: usize,
    console_name: usize,
    card_number: Option<usize>,
    grade: Option<usize>,
}

impl Columns {
    fn from_header(line: &str) -> Result<Self> {
        let headers: Vec<String> = split_record(line)
            .into_iter()
            .map(|h| h.to_lowercase().replace('-', "_"))
            .collect();
        let find = |name: &str| headers.iter().position(|h| h == name);

        match (find(PRODUCT_NAME), find(CONSOLE_NAME)) {
            (Some(product_name), Some(console_name)) => Ok(Self {
                product_name,
                console_name,
                card_number: find(CARD_NUMBER),
                grade: find(GRADE),
            }),
            _ => Err(BinderError::InvalidFileFormat(
                "missing \"product-name\" or \"console-name\" headers".into(),
            )),
        }
    }
}

/// Parses CSV text into lookup candidates.
pub fn parse_csv(text: &str, cancel: &CancelFlag) -> Result<ParsedCsv> {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.len() < 2 {
        return Err(BinderError::InvalidFileFormat("empty CSV".into()));
    }
    let columns = Columns::from_header(lines[0])?;
    let mut parsed = ParsedCsv::default();

    for line in &lines[1..] {
        if cancel.is_cancelled() {
            info!("CSV import cancelled while parsing");
            parsed.cancelled = true;
            break;
        }
        let values = split_record(line);
        let field = |i: usize| values.get(i).cloned().unwrap_or_default();
        let optional = |i: Option<usize>| i.map(field).filter(|v| !v.is_empty());

        let (card_name, card_number) = split_number_suffix(
            &field(columns.product_name),
            &optional(columns.card_number).unwrap_or_default(),
        );
        let set_name = field(columns.console_name);

        if card_name.is_empty() || set_name.is_empty() {
            warn!("skipping row with missing name or set: {}", line);
            parsed.skipped += 1;
            continue;
        }
        parsed.candidates.push(CsvCandidate {
            card_name,
            set_name,
            card_number,
            grade: optional(columns.grade),
        });
    }
    Ok(parsed)
}

/// Splits one line on commas outside double quotes, trimming each field and
/// removing the quotes.
pub fn split_record(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields.into_iter().map(|f| f.trim().to_string()).collect()
}

/// Separates a trailing `#suffix` from the product name and reconciles it
/// with the number column. Returns `(card_name, card_number)`.
pub fn split_number_suffix(product_name: &str, card_number: &str) -> (String, String) {
    let Some(pound) = product_name.find('#') else {
        return (product_name.to_string(), card_number.to_string());
    };
    let suffix = product_name[pound + 1..].trim();
    let name = product_name[..pound].trim().to_string();
    if suffix.is_empty() {
        // A bare trailing '#' is not a suffix.
        return (product_name.to_string(), card_number.to_string());
    }

    let number = if card_number.is_empty() || (!is_numeric(card_number) && !is_numeric(suffix)) {
        suffix.to_string()
    } else if !card_number.contains(suffix) {
        format!("{} {}", card_number, suffix).trim().to_string()
    } else {
        card_number.to_string()
    };
    (name, number)
}

fn is_numeric(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

pub fn placeholder_url(base: &str, text: &str) -> String {
    format!("{}?text={}", base, text)
}

fn placeholder_card(candidate: &CsvCandidate, url: String) -> Card {
    Card::placeholder(
        url,
        candidate.card_name.clone(),
        Some(candidate.set_name.clone()),
        Some(candidate.card_number.clone()),
    )
}

/// Looks up every candidate in order, one at a time.
///
/// `progress` receives `(done, total)` before each row.
pub fn fetch_cards<C, H, P>(
    candidates: &[CsvCandidate],
    search: &mut C,
    hue: &mut H,
    placeholder_base: &str,
    cancel: &CancelFlag,
    mut progress: P,
) -> FetchedBatch
where
    C: CardSearch + ?Sized,
    H: HueSource + ?Sized,
    P: FnMut(usize, usize),
{
    let total = candidates.len();
    let mut batch = FetchedBatch::default();

    for (done, candidate) in candidates.iter().enumerate() {
        if cancel.is_cancelled() {
            info!("CSV import cancelled after {} of {} rows", done, total);
            batch.cancelled = true;
            break;
        }
        progress(done, total);

        if candidate.is_japanese() {
            info!(
                "skipping lookup for Japanese card {} ({})",
                candidate.card_name, candidate.set_name
            );
            batch
                .cards
                .push(placeholder_card(candidate, placeholder_url(placeholder_base, JAPANESE_TEXT)));
            batch.placeholders += 1;
            continue;
        }

        match cascade_lookup(
            search,
            &candidate.card_name,
            &candidate.set_name,
            &candidate.card_number,
        ) {
            Some(found) => {
                let card_hue = hue.hue(&found.image_url);
                batch.cards.push(
                    Card::new(found.image_url, found.name)
                        .with_set(found.set_name)
                        .with_number(found.card_number)
                        .with_direct_image(true)
                        .with_hue(card_hue),
                );
                batch.found += 1;
            }
            None => {
                batch.cards.push(placeholder_card(
                    candidate,
                    placeholder_url(placeholder_base, NOT_FOUND_TEXT),
                ));
                batch.placeholders += 1;
            }
        }
    }
    if cancel.is_cancelled() {
        batch.cancelled = true;
    }
    batch
}
