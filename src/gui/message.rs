use std::path::PathBuf;

use iced::widget::image::Handle;

use crate::processor::Ticket;

/// Display-ready panes of one processed entry
#[derive(Debug, Clone)]
pub struct SlidePanes {
    pub name: String,
    pub panes: Vec<Handle>,
    pub region_count: usize,
}

#[derive(Debug, Clone)]
pub enum Message {
    NextPage,
    PrevPage,
    Open(usize),
    Close,
    NextPane,
    PrevPane,
    NextEntry,
    PrevEntry,
    ThumbnailLoaded(usize, Result<Handle, String>),
    SlideLoaded(Ticket, Result<SlidePanes, String>),
    Export,
    ExportFolderPicked(Option<PathBuf>),
    Exported(Result<usize, String>),
}
