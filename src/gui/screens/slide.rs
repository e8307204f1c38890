use iced::widget::{button, column, container, image as iced_image, row, text};
use iced::{Alignment, Element, Length};
use iced_widget::container::bordered_box;

use super::nav_bar;
use crate::gui::app::SlideStatus;
use crate::gui::{Message, SoilviewApp, Tool};

const MASK_PANE_TITLES: [&str; 3] = ["Original", "Pollution contours", "Polluted area only"];
const DETECTION_PANE_TITLES: [&str; 2] = ["Detections", "Original"];

/// One entry, one pane at a time
pub fn view(app: &SoilviewApp, pane: usize) -> Element<'_, Message> {
    let titles: &[&str] = match app.tool {
        Tool::Mask => &MASK_PANE_TITLES,
        Tool::Detection => &DETECTION_PANE_TITLES,
    };

    let body: Element<'_, Message> = match &app.slide {
        SlideStatus::Idle | SlideStatus::Loading => text("Processing...").into(),
        SlideStatus::Failed(error) => text(format!("Could not process this image: {}", error)).into(),
        SlideStatus::Ready(slide) => match slide.panes.get(pane) {
            Some(handle) => column![
                text(format!(
                    "{} - {} ({} region(s))",
                    slide.name,
                    titles.get(pane).copied().unwrap_or_default(),
                    slide.region_count
                )),
                iced_image::viewer(handle.clone())
                    .width(Length::Fill)
                    .height(Length::Fill),
            ]
            .spacing(10)
            .align_x(Alignment::Center)
            .into(),
            None => text("Nothing to show").into(),
        },
    };

    let pane_label = app.viewer.pane_label().unwrap_or_default();
    let pane_nav = nav_bar(
        pane_label,
        ("Previous", Some(Message::PrevPane)),
        ("Next", Some(Message::NextPane)),
    );
    let entry_nav = nav_bar(
        app.viewer.entry_label().unwrap_or_default(),
        ("Previous image", Some(Message::PrevEntry)),
        ("Next image", Some(Message::NextEntry)),
    );

    let actions = row![
        button(text("Back to grid")).on_press(Message::Close),
        button(text("Export")).on_press_maybe(matches!(app.slide, SlideStatus::Ready(_)).then_some(Message::Export)),
    ]
    .spacing(10);

    let content = column![
        container(body)
            .style(bordered_box)
            .padding(10)
            .width(Length::Fill)
            .height(Length::Fill),
        pane_nav,
        entry_nav,
        actions,
        text(&app.status),
    ]
    .spacing(10)
    .padding(20)
    .align_x(Alignment::Center);

    container(content)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}
