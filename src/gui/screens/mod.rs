pub mod grid;
pub mod slide;

use iced::widget::{button, row, text};
use iced::{Alignment, Element};

use super::Message;

/// "< label >" navigation bar; a side without a message is disabled
pub(super) fn nav_bar<'a>(
    label: String,
    prev: (&'a str, Option<Message>),
    next: (&'a str, Option<Message>),
) -> Element<'a, Message> {
    row![
        button(text(prev.0)).on_press_maybe(prev.1),
        text(label),
        button(text(next.0)).on_press_maybe(next.1),
    ]
    .spacing(10)
    .align_y(Alignment::Center)
    .into()
}
