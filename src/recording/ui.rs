//! Terminal user interface for the recording workflow.
//!
//! Renders the live frequency spectrum while capturing, a progress screen
//! while the upload is in flight, the typewriter reveal of the result, and
//! the failure screen. Input handling follows the workflow states: the
//! recording loop and the result screens accept different key sets.

use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    style::{Color, Style},
    widgets::Paragraph,
};
use std::io::{stdout, Stdout};
use std::time::Instant;

use crate::recording::spectrum::MAX_MAGNITUDE;
use crate::ui::TypewriterAnimation;

/// Gradient endpoints for the spectrum bars (bright top, dim base).
const BAR_TOP: (u8, u8, u8) = (250, 204, 21);
const BAR_BASE: (u8, u8, u8) = (161, 98, 7);
/// Reflection color below the midline.
const MIRROR: Color = Color::Rgb(66, 47, 8);
const ACCENT: Color = Color::Rgb(250, 204, 21);
const DIM: Color = Color::Rgb(120, 100, 40);

/// User input command during recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingCommand {
    /// Continue recording (no key pressed)
    Continue,
    /// Stop and upload for transcription (Enter key)
    Transcribe,
    /// Exit without transcription (Escape or 'q')
    Cancel,
}

/// User input command on the Success and Error screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCommand {
    /// Keep showing the current screen
    Continue,
    /// Reset and start a new recording ('r')
    NewRecording,
    /// Leave the application (Escape, 'q' or Enter)
    Quit,
}

/// Terminal UI for the recording workflow.
pub struct RecorderTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    recording_start: Instant,
    spinner_frame: usize,
}

impl RecorderTui {
    /// Creates a new TUI instance and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(RecorderTui {
            terminal,
            recording_start: Instant::now(),
            spinner_frame: 0,
        })
    }

    /// Resets the recording clock (called when a capture session starts).
    pub fn mark_recording_start(&mut self) {
        self.recording_start = Instant::now();
    }

    /// Renders one frame of the spectrum visualization.
    ///
    /// Only called while the capture session is active; once the session
    /// ends the caller leaves this loop, so no frame is drawn against a
    /// dead feed.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render_spectrum(&mut self, feed: &[u64]) -> anyhow::Result<()> {
        let elapsed = self.recording_start.elapsed();

        self.terminal.draw(|frame| {
            let area = frame.area();
            let footer_height = 1;

            let content = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(footer_height),
            };

            draw_bars(frame, content, feed);

            let duration_secs = elapsed.as_secs();
            let minutes = duration_secs / 60;
            let secs = duration_secs % 60;

            let footer_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(footer_height),
                width: area.width,
                height: footer_height,
            };

            let help_text = ratatui::text::Line::from(vec![
                ratatui::text::Span::styled("● ", Style::default().fg(Color::Red)),
                ratatui::text::Span::raw(format!("{minutes}:{secs:02}")),
                ratatui::text::Span::styled(
                    "   Enter transcribe · Esc/q cancel",
                    Style::default().fg(DIM),
                ),
            ]);

            let footer = Paragraph::new(help_text)
                .style(Style::default().fg(ACCENT).bg(Color::Rgb(0, 0, 0)));
            frame.render_widget(footer, footer_area);
        })?;

        Ok(())
    }

    /// Renders one frame of the upload progress screen.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render_processing(&mut self) -> anyhow::Result<()> {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
        let dots = ".".repeat(self.spinner_frame / 4 % 4);

        self.terminal.draw(|frame| {
            let area = frame.area();
            let line = ratatui::text::Line::from(ratatui::text::Span::styled(
                format!("PROCESSING{dots}"),
                Style::default().fg(ACCENT),
            ));
            let paragraph = Paragraph::new(line).alignment(Alignment::Center);
            let centered = Rect {
                x: area.x,
                y: area.y + area.height / 2,
                width: area.width,
                height: 1,
            };
            frame.render_widget(paragraph, centered);
        })?;

        Ok(())
    }

    /// Renders one frame of the transcription reveal.
    ///
    /// Shows the visible portion of the animation with a block cursor, and
    /// the word statistics once the reveal is complete.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render_transcription(
        &mut self,
        animation: &TypewriterAnimation,
        entry_words: usize,
        total_words: u64,
    ) -> anyhow::Result<()> {
        let visible = animation.visible();
        let done = animation.is_complete() || animation.is_cancelled();

        self.terminal.draw(|frame| {
            let area = frame.area();

            let padding_x = area.width / 10;
            let text_area = Rect {
                x: area.x + padding_x,
                y: area.y + 2,
                width: area.width.saturating_sub(padding_x * 2),
                height: area.height.saturating_sub(4),
            };

            let cursor = if done { "" } else { "▌" };
            let text = format!("{visible}{cursor}");
            let paragraph = Paragraph::new(text)
                .style(Style::default().fg(Color::Rgb(254, 240, 199)))
                .wrap(ratatui::widgets::Wrap { trim: false });
            frame.render_widget(paragraph, text_area);

            let footer_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            };
            let footer_line = if done {
                ratatui::text::Line::from(vec![
                    ratatui::text::Span::styled(
                        format!("{entry_words} words · {total_words} total"),
                        Style::default().fg(ACCENT),
                    ),
                    ratatui::text::Span::styled(
                        "   r new recording · q quit",
                        Style::default().fg(DIM),
                    ),
                ])
            } else {
                ratatui::text::Line::from(ratatui::text::Span::styled(
                    "receiving…",
                    Style::default().fg(DIM),
                ))
            };
            frame.render_widget(Paragraph::new(footer_line), footer_area);
        })?;

        Ok(())
    }

    /// Renders the failure screen with the fixed user-facing message.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render_error(&mut self, message: &str) -> anyhow::Result<()> {
        self.terminal.draw(|frame| {
            let area = frame.area();

            let line = ratatui::text::Line::from(ratatui::text::Span::styled(
                message,
                Style::default().fg(Color::Rgb(248, 113, 113)),
            ));
            let paragraph = Paragraph::new(line)
                .alignment(Alignment::Center)
                .wrap(ratatui::widgets::Wrap { trim: true });
            frame.render_widget(paragraph, centered_message_area(area));

            let footer_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            };
            let footer = Paragraph::new(ratatui::text::Line::from(
                ratatui::text::Span::styled("r retry · q quit", Style::default().fg(DIM)),
            ));
            frame.render_widget(footer, footer_area);
        })?;

        Ok(())
    }

    /// Processes user input during recording.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_recording_input(&mut self) -> anyhow::Result<RecordingCommand> {
        if event::poll(std::time::Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return Ok(match key.code {
                    KeyCode::Enter => {
                        tracing::debug!("Enter pressed: proceeding to transcription");
                        RecordingCommand::Transcribe
                    }
                    KeyCode::Char('q') | KeyCode::Esc => {
                        tracing::debug!("Escape or 'q' pressed: canceling recording");
                        RecordingCommand::Cancel
                    }
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        tracing::debug!("Ctrl+C pressed: canceling recording");
                        RecordingCommand::Cancel
                    }
                    _ => RecordingCommand::Continue,
                });
            }
        }
        Ok(RecordingCommand::Continue)
    }

    /// Processes user input on the Success and Error screens.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_result_input(&mut self) -> anyhow::Result<ResultCommand> {
        if event::poll(std::time::Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return Ok(match key.code {
                    KeyCode::Char('r') => ResultCommand::NewRecording,
                    KeyCode::Char('q') | KeyCode::Esc | KeyCode::Enter => ResultCommand::Quit,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        ResultCommand::Quit
                    }
                    _ => ResultCommand::Continue,
                });
            }
        }
        Ok(ResultCommand::Continue)
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

/// Horizontally centered band at 80% of the terminal width, placed at the
/// vertical midline. Widths stay in u16 range on arbitrarily wide terminals.
fn centered_message_area(area: Rect) -> Rect {
    let width = area.width / 10 * 8;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + area.height / 2,
        width,
        height: 2.min(area.height),
    }
}

/// Paints the spectrum bars with a vertical gradient and a mirror below the
/// midline.
///
/// Bars are laid out left to right with a one-cell gap; bar width follows
/// `2.5 * W / bins` and bar height `magnitude / 1.5`, scaled to the drawing
/// area and clamped.
fn draw_bars(frame: &mut Frame, area: Rect, feed: &[u64]) {
    if feed.is_empty() || area.width == 0 || area.height < 2 {
        return;
    }

    // Upper two thirds carry the bars, the rest is the reflection zone
    let midline = area.height * 2 / 3;
    let bar_width = ((2.5 * area.width as f32 / feed.len() as f32) as u16).max(1);

    let mut x = area.x;
    for &magnitude in feed {
        if x >= area.x + area.width {
            break;
        }

        let scaled = (magnitude as f32 / 1.5) / MAX_MAGNITUDE as f32;
        let bar_height = ((scaled * midline as f32).round() as u16).min(midline);
        let width = bar_width.min(area.x + area.width - x);

        for row in 0..bar_height {
            // row 0 is the top of the bar
            let t = if bar_height > 1 {
                row as f32 / (bar_height - 1) as f32
            } else {
                0.0
            };
            let color = gradient(BAR_TOP, BAR_BASE, t);
            let y = area.y + midline - bar_height + row;
            for col in 0..width {
                frame
                    .buffer_mut()
                    .set_string(x + col, y, "█", Style::default().fg(color));
            }
        }

        // Low-intensity reflection under the midline, a quarter of the bar
        let mirror_height = (bar_height / 4).min(area.height - midline);
        for row in 0..mirror_height {
            let y = area.y + midline + row;
            for col in 0..width {
                frame
                    .buffer_mut()
                    .set_string(x + col, y, "█", Style::default().fg(MIRROR));
            }
        }

        x += width + 1;
    }
}

/// Linear interpolation between two RGB colors.
fn gradient(from: (u8, u8, u8), to: (u8, u8, u8), t: f32) -> Color {
    let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Color::Rgb(lerp(from.0, to.0), lerp(from.1, to.1), lerp(from.2, to.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_endpoints() {
        assert_eq!(gradient(BAR_TOP, BAR_BASE, 0.0), Color::Rgb(250, 204, 21));
        assert_eq!(gradient(BAR_TOP, BAR_BASE, 1.0), Color::Rgb(161, 98, 7));
    }

    #[test]
    fn test_message_area_on_wide_terminals() {
        // u16 arithmetic must not overflow on very wide terminals
        let area = centered_message_area(Rect::new(0, 0, 1000, 50));
        assert_eq!(area.width, 800);
        assert_eq!(area.x, 100);
        assert_eq!(area.y, 25);
    }

    #[test]
    fn test_message_area_fits_tiny_terminals() {
        let area = centered_message_area(Rect::new(0, 0, 5, 1));
        assert!(area.width <= 5);
        assert!(area.height <= 1);
    }

    #[test]
    fn test_gradient_midpoint_between_endpoints() {
        let Color::Rgb(r, g, b) = gradient((0, 0, 0), (100, 200, 50), 0.5) else {
            panic!("expected RGB color");
        };
        assert_eq!((r, g, b), (50, 100, 25));
    }
}
