use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use futures::channel::mpsc::{self, UnboundedReceiver};
use itertools::Itertools;
use std::io::Stdout;
use std::time::Duration;
use tokio::runtime::Runtime;
use tui::backend::CrosstermBackend;
use tui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Span, Spans};
use tui::widgets::{Block, Borders, Paragraph};
use tui::Frame;

use crate::app::{App, Fetcher, Msg};
use crate::client::StatsClient;
use crate::error::Result;
use crate::models::settings::FileStore;
use crate::models::Metric;
use crate::poller::Poller;

pub mod dashboard;
pub mod history;

pub type B = CrosstermBackend<Stdout>;

static TITLE: &str = "Live Wikipedia Statistics";

pub struct Context {
    runtime: Runtime,
    bus: UnboundedReceiver<Msg>,
    app: App<Fetcher>,
    dashboard: dashboard::DashboardView,
    history: history::HistoryView,
    view_ctx: ViewCtx,
}

#[derive(Copy, Clone)]
pub struct ViewCtx {
    selected_style: Style,
    normal_style: Style,
}

/// What a key press asks the dashboard to do.
pub enum Request {
    Noop,
    Exit,
    Refresh,
    ToggleBaseline,
    Track(Metric),
    Untrack,
    ToggleAutoRefresh,
    IncreaseInterval,
    DecreaseInterval,
    SaveSettings,
}

impl Context {
    pub fn new(client: StatsClient, settings_store: FileStore) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        let (sender, bus) = mpsc::unbounded();
        let handle = runtime.handle().clone();
        let fetcher = Fetcher::new(handle.clone(), client, sender.clone());
        let poller = Poller::new(handle, sender, fetcher);

        Ok(Self {
            runtime,
            bus,
            app: App::new(poller, Box::new(settings_store)),
            dashboard: Default::default(),
            history: Default::default(),
            view_ctx: ViewCtx {
                selected_style: Style::default().add_modifier(Modifier::REVERSED),
                normal_style: Style::default().add_modifier(Modifier::REVERSED),
            },
        })
    }

    /// Stops the ticking task and any request still in flight.
    pub fn shutdown(self) {
        self.runtime.shutdown_timeout(Duration::from_millis(500));
    }

    pub fn init(&mut self) {
        self.app.start();
    }

    /// Applies every tick and fetch result posted since the last call.
    pub fn process_messages(&mut self) {
        while let Ok(Some(msg)) = self.bus.try_next() {
            self.app.handle(msg);
        }
    }

    pub fn on_key_pressed(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }

        match self.dashboard.on_key_pressed(key.code) {
            Request::Noop => {}
            Request::Exit => return false,
            Request::Refresh => self.app.manual_refresh(),
            Request::ToggleBaseline => self.app.toggle_baseline(),
            Request::Track(metric) => self.app.track(metric),
            Request::Untrack => self.app.untrack(),
            Request::ToggleAutoRefresh => self.app.toggle_auto_refresh(),
            Request::IncreaseInterval => self.app.increase_interval(),
            Request::DecreaseInterval => self.app.decrease_interval(),
            Request::SaveSettings => self.app.save_settings(),
        }

        true
    }

    pub fn draw(&mut self, frame: &mut Frame<B>) {
        let rects = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Length(3),
                    Constraint::Length(10),
                    Constraint::Min(0),
                    Constraint::Length(1),
                ]
                .as_ref(),
            )
            .split(frame.size());

        self.draw_status(frame, rects[0]);
        self.dashboard.draw(self.view_ctx, &self.app, frame, rects[1]);
        self.history.draw(&self.app, frame, rects[2]);
        self.draw_keybindings(frame, rects[3]);
    }

    fn draw_status(&self, frame: &mut Frame<B>, area: Rect) {
        let settings = self.app.settings();
        let mut spans = Vec::new();

        match self.app.countdown() {
            Some(secs) => spans.push(Span::styled(
                format!("Next refresh in {}s", secs),
                Style::default().fg(Color::LightGreen),
            )),
            None => spans.push(Span::styled(
                "Auto-refresh off",
                Style::default().fg(Color::Yellow),
            )),
        }

        spans.push(Span::raw(format!(
            " | Interval: {}s | Compared to: {}",
            settings.refresh_interval(),
            self.app.baseline().label()
        )));

        if self.app.current().is_none() {
            spans.push(Span::raw(" | Loading..."));
        }

        let status = Paragraph::new(Spans::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .style(Style::default().bg(Color::DarkGray))
                .title(TITLE)
                .title_alignment(Alignment::Right),
        );

        frame.render_widget(status, area);
    }

    fn draw_keybindings(&self, frame: &mut Frame<B>, area: Rect) {
        let spans = self
            .dashboard
            .keybindings()
            .iter()
            .map(|(key, desc)| {
                vec![
                    Span::styled(format!(" {} ", key), self.view_ctx.normal_style),
                    Span::raw(format!(" {} ", desc)),
                ]
            })
            .concat();

        frame.render_widget(Paragraph::new(Spans::from(spans)), area);
    }
}
