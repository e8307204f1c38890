use std::ops::Range;

use crate::config::ViewerConfig;

/// Where the user is: browsing a grid page or looking at one entry's panes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerState {
    Grid { page: usize },
    Slide { entry: usize, pane: usize },
}

/// Position of a thumbnail on the current grid page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub entry: usize,
    pub row: usize,
    pub column: usize,
}

/// Navigation state for a catalog of `entry_count` items.
///
/// Transitions that would leave the valid range are ignored and return `false`.
#[derive(Debug, Clone)]
pub struct Viewer {
    state: ViewerState,
    entry_count: usize,
    page_size: usize,
    columns: usize,
    pane_count: usize,
}

impl Viewer {
    pub fn new(entry_count: usize, page_size: usize, columns: usize, pane_count: usize) -> Self {
        Self {
            state: ViewerState::Grid { page: 0 },
            entry_count,
            page_size: page_size.max(1),
            columns: columns.max(1),
            pane_count: pane_count.max(1),
        }
    }

    pub fn from_config(entry_count: usize, config: &ViewerConfig, pane_count: usize) -> Self {
        Self::new(entry_count, config.page_size, config.columns, pane_count)
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn pane_count(&self) -> usize {
        self.pane_count
    }

    /// Always at least one page, an empty catalog shows an empty first page
    pub fn page_count(&self) -> usize {
        self.entry_count.div_ceil(self.page_size).max(1)
    }

    pub fn next_page(&mut self) -> bool {
        match self.state {
            ViewerState::Grid { page } if page + 1 < self.page_count() => {
                self.state = ViewerState::Grid { page: page + 1 };
                true
            }
            _ => false,
        }
    }

    pub fn prev_page(&mut self) -> bool {
        match self.state {
            ViewerState::Grid { page } if page > 0 => {
                self.state = ViewerState::Grid { page: page - 1 };
                true
            }
            _ => false,
        }
    }

    pub fn open(&mut self, entry: usize) -> bool {
        if entry >= self.entry_count {
            return false;
        }
        self.state = ViewerState::Slide { entry, pane: 0 };
        true
    }

    pub fn next_pane(&mut self) -> bool {
        match self.state {
            ViewerState::Slide { entry, pane } if pane + 1 < self.pane_count => {
                self.state = ViewerState::Slide { entry, pane: pane + 1 };
                true
            }
            _ => false,
        }
    }

    pub fn prev_pane(&mut self) -> bool {
        match self.state {
            ViewerState::Slide { entry, pane } if pane > 0 => {
                self.state = ViewerState::Slide { entry, pane: pane - 1 };
                true
            }
            _ => false,
        }
    }

    /// Step to the following entry without going back to the grid
    pub fn next_entry(&mut self) -> bool {
        match self.state {
            ViewerState::Slide { entry, pane } if entry + 1 < self.entry_count => {
                self.state = ViewerState::Slide { entry: entry + 1, pane };
                true
            }
            _ => false,
        }
    }

    pub fn prev_entry(&mut self) -> bool {
        match self.state {
            ViewerState::Slide { entry, pane } if entry > 0 => {
                self.state = ViewerState::Slide { entry: entry - 1, pane };
                true
            }
            _ => false,
        }
    }

    /// Back to the grid page holding the entry that was open
    pub fn close(&mut self) -> bool {
        match self.state {
            ViewerState::Slide { .. } => {
                self.state = ViewerState::Grid {
                    page: self.home_page(),
                };
                true
            }
            ViewerState::Grid { .. } => false,
        }
    }

    /// Entries shown on the current grid page, empty while a slide is open
    pub fn page_entries(&self) -> Range<usize> {
        match self.state {
            ViewerState::Grid { .. } => self.home_page_entries(),
            ViewerState::Slide { .. } => 0..0,
        }
    }

    /// Grid page on screen, or the one `close` returns to
    pub fn home_page(&self) -> usize {
        match self.state {
            ViewerState::Grid { page } => page,
            ViewerState::Slide { entry, .. } => entry / self.page_size,
        }
    }

    /// Entries of `home_page`, whether or not the grid is showing
    pub fn home_page_entries(&self) -> Range<usize> {
        let start = (self.home_page() * self.page_size).min(self.entry_count);
        let end = (start + self.page_size).min(self.entry_count);
        start..end
    }

    pub fn grid_cells(&self) -> Vec<GridCell> {
        let range = self.page_entries();
        let start = range.start;
        range
            .map(|entry| {
                let slot = entry - start;
                GridCell {
                    entry,
                    row: slot / self.columns,
                    column: slot % self.columns,
                }
            })
            .collect()
    }

    pub fn page_label(&self) -> String {
        format!("Page {} of {}", self.home_page() + 1, self.page_count())
    }

    /// "2/3" style position of the pane being shown
    pub fn pane_label(&self) -> Option<String> {
        match self.state {
            ViewerState::Slide { pane, .. } => Some(format!("{}/{}", pane + 1, self.pane_count)),
            ViewerState::Grid { .. } => None,
        }
    }

    /// "4 / 10" style position of the open entry
    pub fn entry_label(&self) -> Option<String> {
        match self.state {
            ViewerState::Slide { entry, .. } => Some(format!("{} / {}", entry + 1, self.entry_count)),
            ViewerState::Grid { .. } => None,
        }
    }
}
