//! GameView: maps a [`GameSnapshot`] into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::GameSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{Phase, PieceKind, BOARD_HEIGHT, BOARD_WIDTH};

const WELL_BG: Rgb = Rgb::new(30, 30, 40);
const OVERLAY_BG: Rgb = Rgb::new(16, 16, 24);
const BLACK: Rgb = Rgb::new(0, 0, 0);

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Name prompt contents shown while idle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromptView<'a> {
    pub name: &'a str,
    pub notice: Option<&'a str>,
}

/// Remote pad server status for the side panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadStatusView {
    pub port: u16,
    pub clients: u16,
}

/// Host-side state drawn next to the snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hud<'a> {
    pub prompt: PromptView<'a>,
    pub pad: Option<PadStatusView>,
}

/// A lightweight terminal renderer for the Tetris game.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
        }
    }
}

/// Frame geometry for one render pass.
#[derive(Debug, Clone, Copy)]
struct Frame {
    x: u16,
    y: u16,
    w: u16,
    h: u16,
}

impl Frame {
    fn inner_w(&self) -> u16 {
        self.w.saturating_sub(2)
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
        }
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        hud: &Hud<'_>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().into_cell(' '));

        let board_px_w = (BOARD_WIDTH as u16) * self.cell_w;
        let board_px_h = (BOARD_HEIGHT as u16) * self.cell_h;
        let frame = Frame {
            x: viewport.width.saturating_sub(board_px_w + 2) / 2,
            y: viewport.height.saturating_sub(board_px_h + 2) / 2,
            w: board_px_w + 2,
            h: board_px_h + 2,
        };

        let bg = CellStyle::plain(Rgb::new(80, 80, 90), WELL_BG);
        let border = CellStyle::plain(Rgb::new(200, 200, 200), BLACK);

        fb.fill_rect(frame.x + 1, frame.y + 1, board_px_w, board_px_h, ' ', bg);
        self.draw_border(fb, frame, border);

        // Merged cells.
        for (y, row) in snap.board.iter().enumerate() {
            for (x, code) in row.iter().enumerate() {
                match PieceKind::from_code(*code) {
                    Some(kind) => {
                        self.draw_board_cell(fb, frame, x as u16, y as u16, kind.color())
                    }
                    None => self.draw_empty_cell(fb, frame, x as u16, y as u16),
                }
            }
        }

        // Active piece, clipped to the well.
        if let Some(active) = snap.active.as_ref() {
            for (x, y) in active.cells() {
                if x >= 0 && x < BOARD_WIDTH as i8 && y >= 0 && y < BOARD_HEIGHT as i8 {
                    self.draw_board_cell(fb, frame, x as u16, y as u16, active.color);
                }
            }
        }

        self.draw_side_panel(fb, snap, hud, viewport, frame);

        match snap.phase {
            Phase::Idle => self.draw_prompt(fb, frame, &hud.prompt),
            Phase::Over => self.draw_game_over(fb, frame, snap),
            Phase::Playing => {}
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, hud: &Hud<'_>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, hud, viewport, &mut fb);
        fb
    }

    fn draw_border(&self, fb: &mut FrameBuffer, frame: Frame, style: CellStyle) {
        let Frame { x, y, w, h } = frame;
        if w < 2 || h < 2 {
            return;
        }

        fb.put_char(x, y, '┌', style);
        fb.put_char(x + w - 1, y, '┐', style);
        fb.put_char(x, y + h - 1, '└', style);
        fb.put_char(x + w - 1, y + h - 1, '┘', style);

        for dx in 1..w - 1 {
            fb.put_char(x + dx, y, '─', style);
            fb.put_char(x + dx, y + h - 1, '─', style);
        }
        for dy in 1..h - 1 {
            fb.put_char(x, y + dy, '│', style);
            fb.put_char(x + w - 1, y + dy, '│', style);
        }
    }

    fn draw_empty_cell(&self, fb: &mut FrameBuffer, frame: Frame, x: u16, y: u16) {
        let style = CellStyle::plain(Rgb::new(90, 90, 100), WELL_BG).dim();
        self.fill_cell_rect(fb, frame, x, y, '·', style);
    }

    fn draw_board_cell(&self, fb: &mut FrameBuffer, frame: Frame, x: u16, y: u16, color: Rgb) {
        let style = CellStyle::plain(color, WELL_BG).bold();
        self.fill_cell_rect(fb, frame, x, y, '█', style);
    }

    fn fill_cell_rect(
        &self,
        fb: &mut FrameBuffer,
        frame: Frame,
        cell_x: u16,
        cell_y: u16,
        ch: char,
        style: CellStyle,
    ) {
        let px = frame.x + 1 + cell_x * self.cell_w;
        let py = frame.y + 1 + cell_y * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        hud: &Hud<'_>,
        viewport: Viewport,
        frame: Frame,
    ) {
        let panel_x = frame.x.saturating_add(frame.w).saturating_add(2);
        if panel_x >= viewport.width || viewport.width - panel_x < 12 {
            return;
        }

        let label = CellStyle::default().bold();
        let value = CellStyle::plain(Rgb::new(200, 200, 200), BLACK);
        let dim = value.dim();

        let mut y = frame.y;
        for (name, n) in [("SCORE", snap.score), ("LINES", snap.lines), ("LEVEL", snap.level)] {
            fb.put_str(panel_x, y, name, label);
            fb.put_u32(panel_x, y + 1, n, value);
            y = y.saturating_add(3);
        }

        fb.put_str(panel_x, y, "SPEED", label);
        let w = fb.put_u32(panel_x, y + 1, snap.gravity_ms.round() as u32, value);
        fb.put_str(panel_x + w, y + 1, "ms", dim);
        y = y.saturating_add(3);

        fb.put_str(panel_x, y, "PLAYER", label);
        let player = if snap.player.is_empty() { "-" } else { snap.player.as_str() };
        fb.put_str(panel_x, y + 1, player, value);
        y = y.saturating_add(3);

        fb.put_str(panel_x, y, "PAD", label);
        match hud.pad {
            Some(pad) => {
                let w = fb.put_str(panel_x, y + 1, ":", value);
                let w = w + fb.put_u32(panel_x + w, y + 1, pad.port as u32, value);
                let w = w + fb.put_str(panel_x + w, y + 1, " clients ", dim);
                fb.put_u32(panel_x + w, y + 1, pad.clients as u32, value);
            }
            None => {
                fb.put_str(panel_x, y + 1, "OFF", value);
            }
        }
        y = y.saturating_add(3);

        let help = match snap.phase {
            Phase::Idle => "type name, Enter, Esc quits",
            Phase::Playing => "arrows/asd x z space r q",
            Phase::Over => "r: play again  q: quit",
        };
        if y < viewport.height {
            fb.put_str(panel_x, y, help, dim);
        }
    }

    fn clear_inner(&self, fb: &mut FrameBuffer, frame: Frame) {
        let style = CellStyle::plain(Rgb::new(220, 220, 220), OVERLAY_BG);
        fb.fill_rect(
            frame.x + 1,
            frame.y + 1,
            frame.inner_w(),
            frame.h.saturating_sub(2),
            ' ',
            style,
        );
    }

    fn put_centered(&self, fb: &mut FrameBuffer, frame: Frame, y: u16, text: &str, style: CellStyle) {
        let inner = frame.inner_w();
        let text_w = (text.chars().count() as u16).min(inner);
        let x = frame.x + 1 + (inner - text_w) / 2;
        let clipped: String = text.chars().take(inner as usize).collect();
        fb.put_str(x, y, &clipped, style);
    }

    fn draw_prompt(&self, fb: &mut FrameBuffer, frame: Frame, prompt: &PromptView<'_>) {
        self.clear_inner(fb, frame);
        let title = CellStyle::plain(Rgb::new(223, 173, 36), OVERLAY_BG).bold();
        let text = CellStyle::plain(Rgb::new(220, 220, 220), OVERLAY_BG);
        let notice = CellStyle::plain(Rgb::new(227, 78, 78), OVERLAY_BG).bold();

        let mut y = frame.y + 4;
        self.put_centered(fb, frame, y, "GIFT TETRIS", title);
        y += 3;
        self.put_centered(fb, frame, y, "ENTER YOUR NAME", text);
        y += 2;

        // Keep the tail of long names visible.
        let room = frame.inner_w().saturating_sub(4) as usize;
        let count = prompt.name.chars().count();
        let tail: String = prompt.name.chars().skip(count.saturating_sub(room)).collect();
        let line = format!("> {}_", tail);
        self.put_centered(fb, frame, y, &line, text.bold());
        y += 2;

        if let Some(msg) = prompt.notice {
            for line in wrap_words(msg, frame.inner_w() as usize) {
                self.put_centered(fb, frame, y, &line, notice);
                y += 1;
            }
        }
    }

    fn draw_game_over(&self, fb: &mut FrameBuffer, frame: Frame, snap: &GameSnapshot) {
        self.clear_inner(fb, frame);
        let title = CellStyle::plain(Rgb::new(255, 255, 255), OVERLAY_BG).bold();
        let text = CellStyle::plain(Rgb::new(227, 78, 78), OVERLAY_BG);
        let dim = CellStyle::plain(Rgb::new(200, 200, 200), OVERLAY_BG).dim();

        let mut y = frame.y + 2;
        self.put_centered(fb, frame, y, "GAME OVER", title);
        y += 2;

        let last = frame.y + frame.h.saturating_sub(3);
        if let Some(msg) = snap.closing_message.as_deref() {
            for line in wrap_words(msg, frame.inner_w().saturating_sub(2) as usize) {
                if y >= last {
                    break;
                }
                self.put_centered(fb, frame, y, &line, text);
                y += 1;
            }
        }

        self.put_centered(fb, frame, last, "r: play again", dim);
    }
}

/// Greedy word wrap; words longer than `width` are split.
pub fn wrap_words(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = chars.split_off(width);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }

        let len = chars.len();
        if current_len > 0 && current_len + 1 + len > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.extend(chars);
        current_len += len;
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}
