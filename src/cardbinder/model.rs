use crate::layout::Layout;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static IMAGE_EXTENSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(jpeg|jpg|png|gif|webp|svg)(\?.*)?$").expect("image extension pattern")
});

/// A single trading card placed in the binder.
///
/// Cards carry no identity of their own: a slot's index is the only thing that
/// tells two placements apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub image_url: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    /// Dominant hue in degrees, `None` when unknown or not computable.
    #[serde(default)]
    pub hue: Option<f64>,
    /// Whether `image_url` can be rendered directly, as opposed to a text placeholder.
    #[serde(default)]
    pub is_direct_image: bool,
}

impl Card {
    pub fn new(image_url: impl Into<String>, name: impl Into<String>) -> Self {
        let image_url = image_url.into();
        let is_direct_image = is_likely_image_url(&image_url);
        Self {
            image_url,
            name: name.into(),
            set_name: None,
            card_number: None,
            hue: None,
            is_direct_image,
        }
    }

    /// A text-only card for entries whose image could not be found.
    pub fn placeholder(
        image_url: impl Into<String>,
        name: impl Into<String>,
        set_name: Option<String>,
        card_number: Option<String>,
    ) -> Self {
        Self {
            image_url: image_url.into(),
            name: name.into(),
            set_name: non_empty(set_name),
            card_number: non_empty(card_number),
            hue: None,
            is_direct_image: false,
        }
    }

    pub fn with_set(mut self, set_name: impl Into<String>) -> Self {
        self.set_name = non_empty(Some(set_name.into()));
        self
    }

    pub fn with_number(mut self, card_number: impl Into<String>) -> Self {
        self.card_number = non_empty(Some(card_number.into()));
        self
    }

    pub fn with_hue(mut self, hue: Option<f64>) -> Self {
        self.hue = hue;
        self
    }

    pub fn with_direct_image(mut self, is_direct_image: bool) -> Self {
        self.is_direct_image = is_direct_image;
        self
    }

    /// "Name (Set) #Number", omitting whatever is missing.
    pub fn title(&self) -> String {
        let mut title = if self.name.is_empty() {
            "Unknown Card".to_string()
        } else {
            self.name.clone()
        };
        if let Some(set) = &self.set_name {
            title.push_str(&format!(" ({})", set));
        }
        if let Some(number) = &self.card_number {
            title.push_str(&format!(" #{}", number));
        }
        title
    }
}

/// One grid position. `None` is an empty slot.
pub type Slot = Option<Card>;

/// Full, self-contained copy of the live binder state.
///
/// Used both as the undo history entry and as the unit handed to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinderSnapshot {
    pub slot_array: Vec<Slot>,
    pub layout: Option<Layout>,
    pub current_page: usize,
}

/// True for `data:` URLs and URLs ending in a known image extension.
pub fn is_likely_image_url(url: &str) -> bool {
    url.starts_with("data:") || IMAGE_EXTENSION.is_match(url)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
