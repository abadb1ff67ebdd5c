use crossterm::event::KeyCode;
use itertools::Itertools;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Style};
use tui::widgets::{Block, Borders, Cell, Row, Table, TableState};
use tui::Frame;

use crate::app::App;
use crate::models::{Comparison, Metric, Trend, METRICS};
use crate::poller::Fetch;
use crate::views::{Request, ViewCtx, B};

static HEADERS: &[&str] = &["", "Statistic", "Value", "Change"];

static KEYBINDINGS: &[(&str, &str)] = &[
    ("↑↓", "Select"),
    ("Enter", "Graph"),
    ("Esc", "Stop graph"),
    ("r", "Refresh"),
    ("b", "Baseline"),
    ("a", "Auto-refresh"),
    ("+/-", "Interval"),
    ("s", "Save"),
    ("q", "Quit"),
];

#[derive(Default)]
pub struct DashboardView {
    table_state: TableState,
    selected: usize,
}

impl DashboardView {
    pub fn selected_metric(&self) -> Metric {
        METRICS[self.selected]
    }

    pub fn draw<F: Fetch>(
        &mut self,
        ctx: ViewCtx,
        app: &App<F>,
        frame: &mut Frame<B>,
        area: Rect,
    ) {
        let rects = Layout::default()
            .constraints([Constraint::Min(0)].as_ref())
            .horizontal_margin(1)
            .split(area);

        let header_cells = HEADERS
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().fg(Color::Green)));

        let header = Row::new(header_cells)
            .style(ctx.normal_style)
            .height(1)
            .bottom_margin(1);

        let tracked = app.history().tracked();
        let rows = METRICS
            .iter()
            .map(|metric| {
                let marker = if tracked == Some(*metric) { "●" } else { "" };
                let value = match app.current() {
                    None => "Loading...".to_string(),
                    Some(snapshot) => snapshot
                        .get(*metric)
                        .map(group_digits)
                        .unwrap_or_else(|| "-".to_string()),
                };

                Row::new(vec![
                    Cell::from(marker).style(Style::default().fg(Color::LightGreen)),
                    Cell::from(metric.label()),
                    Cell::from(value),
                    comparison_cell(app.comparison(*metric)),
                ])
            })
            .collect_vec();

        let table = Table::new(rows)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .title("Statistics")
                    .title_alignment(Alignment::Right),
            )
            .highlight_style(ctx.selected_style)
            .widths(&[
                Constraint::Length(2),
                Constraint::Percentage(30),
                Constraint::Percentage(35),
                Constraint::Percentage(30),
            ]);

        self.table_state.select(Some(self.selected));

        frame.render_stateful_widget(table, rects[0], &mut self.table_state);
    }

    pub fn on_key_pressed(&mut self, key: KeyCode) -> Request {
        match key {
            KeyCode::Char('q' | 'Q') => return Request::Exit,

            KeyCode::Up => {
                if self.selected > 0 {
                    self.selected -= 1;
                }
            }

            KeyCode::Down => {
                if self.selected + 1 < METRICS.len() {
                    self.selected += 1;
                }
            }

            KeyCode::Enter => return Request::Track(self.selected_metric()),
            KeyCode::Esc => return Request::Untrack,
            KeyCode::Char('r') => return Request::Refresh,
            KeyCode::Char('b') => return Request::ToggleBaseline,
            KeyCode::Char('a') => return Request::ToggleAutoRefresh,
            KeyCode::Char('+' | '=') => return Request::IncreaseInterval,
            KeyCode::Char('-') => return Request::DecreaseInterval,
            KeyCode::Char('s') => return Request::SaveSettings,

            _ => {}
        }

        Request::Noop
    }

    pub fn keybindings(&self) -> &[(&str, &str)] {
        KEYBINDINGS
    }
}

fn comparison_cell(comparison: Comparison) -> Cell<'static> {
    match comparison {
        Comparison::Unavailable => Cell::from("-").style(Style::default().fg(Color::Gray)),
        Comparison::Delta { value, trend } => {
            let (text, color) = match trend {
                Trend::Up => (format!("▲ +{}", group_digits(value)), Color::Green),
                Trend::Down => (format!("▼ {}", group_digits(value)), Color::Red),
                Trend::Flat => ("0".to_string(), Color::Gray),
            };

            Cell::from(text).style(Style::default().fg(color))
        }
    }
}

/// Formats with comma thousands separators, e.g. `-1,234,567`.
pub fn group_digits(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let grouped = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .join(",");

    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
