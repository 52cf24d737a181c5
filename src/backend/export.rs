//! Exports the rendered table to a paginated document.
//!
//! The table is drawn off-screen into a ratatui [`Buffer`], flattened into a
//! [`Raster`] of text lines and sliced into fixed-height pages, the same way
//! a screenshot would be cut onto A4 sheets (210 x 295 units).

use crate::error::{Result, TableError};
use log::{info, warn};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::{self, JoinHandle};
use uuid::Uuid;

const FORM_FEED: char = '\x0c';

/// Rendered table contents, one string per terminal line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: u16,
    pub lines: Vec<String>,
}

impl Raster {
    pub fn from_buffer(buffer: &Buffer) -> Self {
        let area = buffer.area;
        let lines = (area.top()..area.bottom())
            .map(|y| {
                let line: String = (area.left()..area.right())
                    .filter_map(|x| buffer.cell((x, y)).map(|c| c.symbol()))
                    .collect();
                line.trim_end().to_string()
            })
            .collect();
        Self {
            width: area.width,
            lines,
        }
    }
}

/// Physical page geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page_width: f64,
    pub page_height: f64,
    /// Height of a terminal cell relative to its width.
    pub cell_aspect: f64,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 295.0,
            cell_aspect: 2.0,
        }
    }
}

impl PageLayout {
    /// How many raster lines fit on one page once the raster is scaled to page width.
    pub fn lines_per_page(&self, raster_width: u16) -> usize {
        let width = f64::from(raster_width.max(1));
        let line_height = self.cell_aspect * self.page_width / width;
        ((self.page_height / line_height).floor() as usize).max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub lines: Vec<String>,
}

/// Cuts the raster into pages. An empty raster still yields one blank page.
pub fn paginate(raster: &Raster, layout: &PageLayout) -> Vec<Page> {
    let per_page = layout.lines_per_page(raster.width);
    if raster.lines.is_empty() {
        return vec![Page {
            number: 1,
            lines: Vec::new(),
        }];
    }
    raster
        .lines
        .chunks(per_page)
        .enumerate()
        .map(|(i, chunk)| Page {
            number: i + 1,
            lines: chunk.to_vec(),
        })
        .collect()
}

pub fn document_name() -> String {
    format!("print{}.txt", Uuid::new_v4())
}

/// Writes the pages to `dir/print<uuid>.txt`, pages separated by form feeds.
pub fn write_document(dir: &Path, pages: &[Page]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let total = pages.len();
    let body = pages
        .iter()
        .map(|page| {
            let mut text = format!("Page {}/{}\n", page.number, total);
            text.push_str(&page.lines.join("\n"));
            text.push('\n');
            text
        })
        .collect::<Vec<_>>()
        .join(&FORM_FEED.to_string());

    let path = dir.join(document_name());
    fs::write(&path, body)?;
    Ok(path)
}

/// Runs exports off the event loop and reports each result on `tx`.
#[derive(Debug, Clone)]
pub struct Exporter {
    dir: PathBuf,
    layout: PageLayout,
    tx: UnboundedSender<Result<PathBuf>>,
}

impl Exporter {
    pub fn new(dir: PathBuf, layout: PageLayout, tx: UnboundedSender<Result<PathBuf>>) -> Self {
        Self { dir, layout, tx }
    }

    /// Renders the table with `render` at the width of the mounted `target` and writes it out.
    ///
    /// Fails immediately with [`TableError::RenderTargetMissing`] if the table was never drawn.
    pub fn start<F>(&self, target: Option<Rect>, render: F) -> Result<JoinHandle<()>>
    where
        F: FnOnce(u16) -> Buffer,
    {
        let Some(target) = target else {
            warn!("⚠️ Export requested before the table was drawn");
            return Err(TableError::RenderTargetMissing);
        };
        if target.width == 0 {
            return Err(TableError::RenderTargetMissing);
        }

        let raster = Raster::from_buffer(&render(target.width));
        let dir = self.dir.clone();
        let layout = self.layout;
        let tx = self.tx.clone();

        Ok(task::spawn(async move {
            let result = task::spawn_blocking(move || {
                let pages = paginate(&raster, &layout);
                write_document(&dir, &pages)
            })
            .await
            .unwrap_or_else(|e| Err(TableError::Io(e.to_string())));

            if let Ok(path) = &result {
                info!("🖨️ Exported table to {}", path.display());
            }
            let _ = tx.send(result);
        }))
    }
}
