//! Terminal rendering of the panel.
//!
//! [`TerminalDisplay`] implements the controller's [`Display`] boundary on
//! top of ratatui. Draw calls only update a snapshot; [`TerminalDisplay::flush`]
//! paints the snapshot once per loop iteration, so a burst of panel updates
//! costs a single frame.
//!
//! Canvas rectangles (1280x720) are scaled onto whatever cell grid the
//! terminal offers, so hit-testing and drawing agree at any size.

use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Rect as CellRect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph};

use lightdeck_core::layout::{SCREEN_HEIGHT, SCREEN_WIDTH};
use lightdeck_core::timing::{BACKLIGHT_AWAKE, BACKLIGHT_DIMMED};
use lightdeck_core::{DeviceStore, Display, Layout, Rect};
use lightdeck_types::{Light, Sensor};

/// A [`Display`] backed by a ratatui terminal.
pub struct TerminalDisplay<B: Backend> {
    terminal: Terminal<B>,
    layout: Layout,
    sensor: Sensor,
    panels: Vec<Option<Light>>,
    backlight: u8,
    area: CellRect,
    stale: bool,
}

impl<B: Backend> TerminalDisplay<B> {
    /// Wrap a terminal showing `panel_count` light panels.
    pub fn new(terminal: Terminal<B>, panel_count: usize) -> Self {
        Self {
            terminal,
            layout: Layout::new(panel_count),
            sensor: Sensor::new("", ""),
            panels: vec![None; panel_count],
            backlight: BACKLIGHT_AWAKE,
            area: CellRect::default(),
            stale: true,
        }
    }

    /// Cell grid size as `(columns, rows)` from the last frame or resize.
    pub fn size(&self) -> (u16, u16) {
        (self.area.width, self.area.height)
    }

    /// Record a terminal resize and repaint on the next flush.
    pub fn resize(&mut self, columns: u16, rows: u16) {
        self.area = CellRect::new(0, 0, columns, rows);
        self.stale = true;
    }

    /// Current backlight level.
    pub fn backlight(&self) -> u8 {
        self.backlight
    }

    /// The wrapped terminal.
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Paint the snapshot if anything changed since the last flush.
    pub fn flush(&mut self) -> Result<(), B::Error> {
        if !self.stale {
            return Ok(());
        }

        let view = View {
            layout: &self.layout,
            sensor: &self.sensor,
            panels: &self.panels,
            backlight: self.backlight,
        };
        let mut area = self.area;
        self.terminal.draw(|frame| {
            area = frame.area();
            view.render(frame);
        })?;

        self.area = area;
        self.stale = false;
        Ok(())
    }
}

impl<B: Backend> Display for TerminalDisplay<B> {
    fn draw_header(&mut self, store: &DeviceStore) {
        self.sensor = store.sensor().clone();
        self.stale = true;
    }

    fn draw_panel(&mut self, store: &DeviceStore, index: usize) {
        if index >= self.panels.len() {
            self.panels.resize(index + 1, None);
        }
        self.panels[index] = store.get(index).cloned();
        self.stale = true;
    }

    fn set_backlight(&mut self, level: u8) {
        if level != self.backlight {
            self.backlight = level;
            self.stale = true;
        }
    }
}

/// Everything one frame needs.
struct View<'a> {
    layout: &'a Layout,
    sensor: &'a Sensor,
    panels: &'a [Option<Light>],
    backlight: u8,
}

impl View<'_> {
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Clear, area);
        if self.backlight == BACKLIGHT_DIMMED {
            return;
        }

        self.render_header(frame, area);
        for (index, panel) in self.panels.iter().enumerate() {
            if let Some(light) = panel {
                self.render_panel(frame, area, index, light);
            }
        }
    }

    fn render_header(&self, frame: &mut Frame, area: CellRect) {
        let reading = if !self.sensor.is_enabled() {
            String::new()
        } else {
            match self.sensor.reading {
                Some(reading) => format!("{}  {} ", self.sensor.name, reading),
                None => format!("{}  -- ", self.sensor.name),
            }
        };

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .title(" lightdeck ")
            .title_style(Style::default().add_modifier(Modifier::BOLD));
        frame.render_widget(
            Paragraph::new(reading)
                .alignment(Alignment::Right)
                .block(block),
            to_cells(self.layout.header(), area),
        );
    }

    fn render_panel(&self, frame: &mut Frame, area: CellRect, index: usize, light: &Light) {
        let title = format!(" {} ", light.name);

        if !light.is_enabled() {
            let muted = Style::default().fg(Color::DarkGray);
            let panel = to_cells(self.layout.panel(index), area);
            frame.render_widget(
                Paragraph::new(centered_lines("(not configured)", panel.height))
                    .alignment(Alignment::Center)
                    .style(muted)
                    .block(Block::bordered().title(title).border_style(muted)),
                panel,
            );
            return;
        }

        frame.render_widget(
            Block::bordered().title(title),
            to_cells(self.layout.panel(index), area),
        );

        let (label, button_style) = if light.is_on {
            ("ON", Style::default().fg(Color::Black).bg(Color::Green))
        } else {
            ("OFF", Style::default().fg(Color::Gray))
        };
        let button = to_cells(self.layout.power_button(index), area);
        frame.render_widget(
            Paragraph::new(centered_lines(label, button.height))
                .alignment(Alignment::Center)
                .style(button_style.add_modifier(Modifier::BOLD))
                .block(Block::bordered()),
            button,
        );

        let gauge_color = if light.is_on {
            Color::Yellow
        } else {
            Color::DarkGray
        };
        frame.render_widget(
            Gauge::default()
                .ratio(f64::from(light.brightness.get()) / 100.0)
                .label(light.brightness.to_string())
                .gauge_style(Style::default().fg(gauge_color).bg(Color::Black)),
            to_cells(self.layout.slider_track(index), area),
        );
    }
}

/// Pad `text` with blank lines so it sits mid-way inside a bordered box.
fn centered_lines(text: &str, height: u16) -> Vec<Line<'_>> {
    let inner = height.saturating_sub(2);
    let pad = inner.saturating_sub(1) / 2;
    let mut lines = vec![Line::from(""); usize::from(pad)];
    lines.push(Line::from(text));
    lines
}

/// Scale a canvas rectangle onto the cell grid `area`.
fn to_cells(rect: Rect, area: CellRect) -> CellRect {
    let x0 = scale(rect.x, SCREEN_WIDTH, area.width);
    let x1 = scale(rect.right(), SCREEN_WIDTH, area.width);
    let y0 = scale(rect.y, SCREEN_HEIGHT, area.height);
    let y1 = scale(rect.bottom(), SCREEN_HEIGHT, area.height);

    CellRect::new(
        area.x + x0,
        area.y + y0,
        x1.saturating_sub(x0).max(1),
        y1.saturating_sub(y0).max(1),
    )
    .intersection(area)
}

fn scale(value: i32, extent: i32, cells: u16) -> u16 {
    let scaled = i64::from(value.clamp(0, extent)) * i64::from(cells) / i64::from(extent);
    u16::try_from(scaled).unwrap_or(cells)
}
