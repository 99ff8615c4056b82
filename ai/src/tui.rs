use std::{io, time::Duration};

use crossterm::event::{self, KeyCode, KeyEventKind};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, BorderType, Paragraph},
};
use tetris_gym::{
    Color as CellColor, Surface,
    render::{VIEW_COLS, VIEW_ROWS},
};

type Image = [[Color; VIEW_COLS]; VIEW_ROWS];

const fn to_terminal(color: CellColor) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

fn render_as_text(img: &Image) -> Text<'_> {
    Text::from(
        img.iter()
            .map(|row| {
                Line::from(
                    row.iter()
                        .map(|color| Span::styled("  ", Style::default().bg(*color)))
                        .collect::<Vec<_>>(),
                )
            })
            .collect::<Vec<_>>(),
    )
}

/// Draws the board as coloured blocks in the alternate screen.
pub struct TerminalSurface {
    terminal: DefaultTerminal,
    image: Image,
    status: String,
}

impl TerminalSurface {
    /// Text shown beside the board on the next present.
    pub fn set_status(&mut self, status: String) {
        self.status = status;
    }

    /// Drains pending key presses. True once `q` was pressed.
    pub fn poll_quit(&self) -> io::Result<bool> {
        while event::poll(Duration::ZERO)? {
            if let event::Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && key.code == KeyCode::Char('q') {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn draw(frame: &mut Frame, image: &Image, status: &str) {
        let chunks = Layout::horizontal([
            Constraint::Min(VIEW_COLS as u16 * 2 + 2),
            Constraint::Fill(1),
        ])
        .split(frame.area());
        frame.render_widget(
            Paragraph::new(render_as_text(image))
                .block(Block::bordered().border_type(BorderType::Rounded)),
            chunks[0],
        );
        let lines = vec![
            Line::from(status.to_owned()),
            Line::from(""),
            Line::from("Controls: "),
            Line::from(" q: Quit"),
        ];
        frame.render_widget(
            Paragraph::new(Text::from(lines)).block(
                Block::bordered()
                    .title("Tetris")
                    .border_type(BorderType::Rounded),
            ),
            chunks[1],
        );
    }
}

impl Surface for TerminalSurface {
    fn open() -> tetris_gym::Result<Self> {
        let terminal = ratatui::try_init()?;
        fn panic_hook(info: &std::panic::PanicHookInfo) {
            ratatui::restore();
            eprintln!("Panic occurred: {info}");
        }
        std::panic::set_hook(Box::new(panic_hook));
        Ok(Self {
            terminal,
            image: [[to_terminal(tetris_gym::render::EMPTY); VIEW_COLS]; VIEW_ROWS],
            status: String::new(),
        })
    }

    fn fill_cell(&mut self, row: usize, col: usize, color: CellColor) {
        self.image[row][col] = to_terminal(color);
    }

    fn present(&mut self) -> tetris_gym::Result<()> {
        let image = &self.image;
        let status = &self.status;
        self.terminal
            .draw(|frame| Self::draw(frame, image, status))?;
        Ok(())
    }

    fn close(&mut self) {
        ratatui::restore();
    }
}
