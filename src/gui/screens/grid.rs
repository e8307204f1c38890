use iced::widget::{Column, Row, button, column, container, image as iced_image, text};
use iced::{Alignment, Element, Length};

use super::nav_bar;
use crate::gui::{Message, SoilviewApp};
use crate::viewer::{GridCell, ViewerState};

/// Paged thumbnail grid
pub fn view(app: &SoilviewApp) -> Element<'_, Message> {
    let cells = app.viewer.grid_cells();
    let columns = app.config.columns.max(1);
    let thumb = app.config.thumbnail;

    let mut rows: Vec<Element<'_, Message>> = Vec::new();
    for chunk in cells.chunks(columns) {
        let items: Vec<Element<'_, Message>> = chunk
            .iter()
            .map(|cell| thumbnail(app, cell, thumb.max_width, thumb.max_height))
            .collect();
        rows.push(Row::with_children(items).spacing(10).into());
    }

    let grid: Element<'_, Message> = if rows.is_empty() {
        text("No images to show").into()
    } else {
        Column::with_children(rows).spacing(10).into()
    };

    let page = match app.viewer.state() {
        ViewerState::Grid { page } => page,
        ViewerState::Slide { .. } => 0,
    };
    let nav = nav_bar(
        app.viewer.page_label(),
        ("Previous page", (page > 0).then_some(Message::PrevPage)),
        ("Next page", (page + 1 < app.viewer.page_count()).then_some(Message::NextPage)),
    );

    let content = column![text("Pollution results").size(24), grid, nav, text(&app.status)]
        .spacing(20)
        .padding(20)
        .align_x(Alignment::Center);

    container(content)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}

fn thumbnail<'a>(app: &'a SoilviewApp, cell: &GridCell, width: u32, height: u32) -> Element<'a, Message> {
    let name = app
        .catalog
        .get(cell.entry)
        .map(|entry| entry.name.as_str())
        .unwrap_or_default();

    let picture: Element<'a, Message> = match app.thumbnails.get(&cell.entry) {
        Some(Ok(handle)) => iced_image::Image::new(handle.clone()).into(),
        Some(Err(error)) => text(error.as_str()).size(12).into(),
        None => text("Loading...").into(),
    };

    let body = column![
        text(name).size(14),
        container(picture)
            .width(Length::Fixed(width as f32))
            .height(Length::Fixed(height as f32))
            .center_x(Length::Fixed(width as f32))
            .center_y(Length::Fixed(height as f32)),
    ]
    .spacing(5)
    .align_x(Alignment::Center);

    button(body).on_press(Message::Open(cell.entry)).into()
}
