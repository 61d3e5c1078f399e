use crate::binder::Binder;
use crate::commands::CmdResult;
use crate::error::Result;
use crate::hue::HueSource;
use crate::lookup::CardMatch;
use crate::model::Card;
use log::info;

/// A card about to be placed, before its hue is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCard {
    pub image_url: String,
    pub name: String,
    pub set_name: Option<String>,
    pub card_number: Option<String>,
    /// Overrides the image-URL heuristic when set.
    pub is_direct_image: Option<bool>,
}

impl NewCard {
    pub fn new(image_url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            name: name.into(),
            set_name: None,
            card_number: None,
            is_direct_image: None,
        }
    }

    fn into_card(self) -> Card {
        let mut card = Card::new(self.image_url, self.name);
        if let Some(set) = self.set_name {
            card = card.with_set(set);
        }
        if let Some(number) = self.card_number {
            card = card.with_number(number);
        }
        if let Some(direct) = self.is_direct_image {
            card = card.with_direct_image(direct);
        }
        card
    }
}

impl From<CardMatch> for NewCard {
    fn from(found: CardMatch) -> Self {
        Self {
            image_url: found.image_url,
            name: found.name,
            set_name: Some(found.set_name),
            card_number: Some(found.card_number),
            is_direct_image: None,
        }
    }
}

/// Places a card at `target` (a global index), or the first empty slot, or
/// the end. The hue is resolved before the slot is written.
pub fn run<H: HueSource + ?Sized>(
    binder: &mut Binder,
    hue: &mut H,
    new_card: NewCard,
    target: Option<usize>,
) -> Result<CmdResult> {
    binder.require_layout()?;
    let mut card = new_card.into_card();
    if card.is_direct_image {
        card.hue = hue.hue(&card.image_url);
    }
    place(binder, card, target)
}

/// Writes an already-complete card.
pub fn place(binder: &mut Binder, card: Card, target: Option<usize>) -> Result<CmdResult> {
    let index = binder.placement_index(target);
    let title = card.title();
    binder.place_card(card, index)?;
    info!("placed {} at slot {}", title, index);

    Ok(CmdResult::mutated(format!(
        "Added {} to slot {} (page {})",
        title,
        index + 1,
        binder.current_page()
    )))
}
