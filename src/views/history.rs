use tui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols::Marker,
    text::{Span, Spans},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::poller::Fetch;
use crate::views::B;

#[derive(Default)]
pub struct HistoryView;

impl HistoryView {
    pub fn draw<F: Fetch>(&mut self, app: &App<F>, frame: &mut Frame<B>, area: Rect) {
        let history = app.history();
        let block = Block::default()
            .title("History")
            .title_alignment(Alignment::Right)
            .borders(Borders::TOP);

        let metric = match history.tracked() {
            Some(metric) => metric,
            None => {
                let hint = Paragraph::new("Select a statistic and press Enter to graph it.")
                    .block(block)
                    .style(Style::default().fg(Color::Gray));

                frame.render_widget(hint, area);
                return;
            }
        };

        let rects = Layout::default()
            .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
            .direction(Direction::Vertical)
            .horizontal_margin(1)
            .split(area);

        let points = history.points();
        let datasets = vec![Dataset::default()
            .data(points.as_slice())
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))];

        let time_labels = match (history.series().first(), history.series().last()) {
            (Some(first), Some(last)) => vec![
                Span::raw(first.timestamp.format("%H:%M:%S").to_string()),
                Span::raw(last.timestamp.format("%H:%M:%S").to_string()),
            ],
            _ => Vec::new(),
        };

        let value_bounds = history.value_bounds();

        let chart = Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .title("Time")
                    .style(Style::default().fg(Color::White))
                    .labels(time_labels)
                    .bounds(history.time_bounds()),
            )
            .y_axis(
                Axis::default()
                    .title("Value")
                    .style(Style::default().fg(Color::White))
                    .labels(vec![
                        Span::raw((value_bounds[0] as i64).to_string()),
                        Span::raw((value_bounds[1] as i64).to_string()),
                    ])
                    .bounds(value_bounds),
            );

        frame.render_widget(chart, rects[0]);

        let legend = Paragraph::new(Spans::from(vec![
            Span::styled(" ", Style::default().bg(Color::Green)),
            Span::raw(format!(
                " {} ({} samples)",
                metric.label(),
                history.series().len()
            )),
        ]));

        frame.render_widget(legend, rects[1]);
    }
}
