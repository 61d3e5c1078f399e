use console::Style;
use once_cell::sync::Lazy;

pub struct BinderStyles {
    pub slot_number: Style,
    pub empty: Style,
    pub placeholder: Style,
    pub header: Style,
    pub time: Style,
    pub result_index: Style,
}

pub static STYLES: Lazy<BinderStyles> = Lazy::new(|| BinderStyles {
    slot_number: Style::new().yellow(),
    empty: Style::new().dim(),
    placeholder: Style::new().dim().italic(),
    header: Style::new().bold(),
    time: Style::new().color256(246).italic(),
    result_index: Style::new().yellow(),
});

/// Style for a card title, tinted by its hue bucket.
pub fn hue_style(hue: Option<f64>) -> Style {
    let Some(hue) = hue else {
        return Style::new();
    };
    match hue.rem_euclid(360.0) {
        h if h < 30.0 => Style::new().red(),
        h if h < 90.0 => Style::new().yellow(),
        h if h < 150.0 => Style::new().green(),
        h if h < 210.0 => Style::new().cyan(),
        h if h < 270.0 => Style::new().blue(),
        h if h < 330.0 => Style::new().magenta(),
        _ => Style::new().red(),
    }
}
