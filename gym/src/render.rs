use log::debug;

use crate::{Result, Simulator};

pub const VIEW_ROWS: usize = 20;
pub const VIEW_COLS: usize = 10;
/// First board row shown on screen.
pub const VIEW_ROW_OFFSET: usize = 6;

pub type View = [[bool; VIEW_COLS]; VIEW_ROWS];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn no_alpha(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

pub const FILLED: Color = Color::no_alpha(0, 255, 0);
pub const EMPTY: Color = Color::no_alpha(0, 0, 0);

/// Something the visible 20×10 grid can be painted on.
///
/// A freshly opened surface shows every cell as [`EMPTY`].
pub trait Surface: Sized {
    fn open() -> Result<Self>;
    fn fill_cell(&mut self, row: usize, col: usize, color: Color);
    /// Shows everything filled since the last call.
    fn present(&mut self) -> Result<()>;
    fn close(&mut self);
}

/// Occupancy of the visible rows, including the falling piece.
pub fn visible_cells<G: Simulator>(game: &G) -> View {
    let cells = game.cells();
    let piece = game.current_piece().occupied();
    let mut view = [[false; VIEW_COLS]; VIEW_ROWS];
    for (r, row) in view.iter_mut().enumerate() {
        let board_row = r + VIEW_ROW_OFFSET;
        for (c, cell) in row.iter_mut().enumerate() {
            let settled = cells
                .get(board_row)
                .and_then(|row| row.get(c))
                .copied()
                .unwrap_or(false);
            *cell = settled || piece.contains(&(board_row, c));
        }
    }
    view
}

/// Remembers what is on screen so only changed cells get repainted.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderDiffTracker {
    shown: View,
}

impl RenderDiffTracker {
    pub const fn shown(&self) -> &View {
        &self.shown
    }

    /// Paints cells of `view` that differ from what is shown. Returns how many changed.
    pub fn update<S: Surface>(&mut self, view: &View, surface: &mut S) -> usize {
        let mut changed = 0;
        for (r, (shown_row, row)) in self.shown.iter_mut().zip(view).enumerate() {
            for (c, (shown, &filled)) in shown_row.iter_mut().zip(row).enumerate() {
                if *shown == filled {
                    continue;
                }
                *shown = filled;
                surface.fill_cell(r, c, if filled { FILLED } else { EMPTY });
                changed += 1;
            }
        }
        changed
    }
}

/// An open surface together with the shadow of what it displays.
#[derive(Debug)]
pub struct Viewer<S> {
    pub surface: S,
    tracker: RenderDiffTracker,
}

impl<S: Surface> Viewer<S> {
    pub fn open() -> Result<Self> {
        Ok(Self {
            surface: S::open()?,
            tracker: RenderDiffTracker::default(),
        })
    }

    pub fn draw(&mut self, view: &View) -> Result<usize> {
        let changed = self.tracker.update(view, &mut self.surface);
        self.surface.present()?;
        debug!("render repainted {changed} cells");
        Ok(changed)
    }

    pub fn close(mut self) {
        self.surface.close();
    }
}

/// Headless surface keeping the painted colours in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pub pixels: [[Color; VIEW_COLS]; VIEW_ROWS],
    /// Total `fill_cell` calls.
    pub fills: usize,
    pub frames: usize,
    pub closed: bool,
}

impl Surface for FrameBuffer {
    fn open() -> Result<Self> {
        Ok(Self {
            pixels: [[EMPTY; VIEW_COLS]; VIEW_ROWS],
            fills: 0,
            frames: 0,
            closed: false,
        })
    }

    fn fill_cell(&mut self, row: usize, col: usize, color: Color) {
        self.pixels[row][col] = color;
        self.fills += 1;
    }

    fn present(&mut self) -> Result<()> {
        self.frames += 1;
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
