use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use std::io;
use std::time::{Duration, Instant};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Gauge, List, ListItem, Paragraph, Row, Table, Wrap},
    Frame, Terminal,
};

use crate::report::{self, MISSING};
use crate::severity::Region;
use crate::weather::{nearby_storms, Observation};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Dashboard state between refreshes.
pub struct App {
    address: String,
    map_link: Option<String>,
    region: Region,
    radii_km: Vec<f64>,
    refresh: Duration,
    refreshes: usize,
    last_refresh: Option<Instant>,
    observation: Option<Observation>,
    error: Option<String>,
}

impl App {
    pub fn new(address: &str, region: Region, radii_km: Vec<f64>, refresh: Duration) -> Self {
        Self {
            address: address.to_string(),
            map_link: report::map_link(address),
            region,
            radii_km,
            refresh,
            refreshes: 0,
            last_refresh: None,
            observation: None,
            error: None,
        }
    }

    /// Takes a fetch result. A failed fetch keeps the previous observation on
    /// screen and reports the error in the status line.
    pub fn update(&mut self, result: anyhow::Result<Observation>) {
        self.last_refresh = Some(Instant::now());
        self.refreshes += 1;
        match result {
            Ok(observation) => {
                tracing::info!("Refreshed weather for {}", observation.location);
                self.observation = Some(observation);
                self.error = None;
            }
            Err(err) => {
                tracing::error!("Refresh failed: {:#}", err);
                self.error = Some(format!("Error occurred: {err:#}"));
            }
        }
    }

    /// Storm search radius for the current refresh. Each refresh moves on to
    /// the next configured radius.
    pub fn radius_km(&self) -> Option<f64> {
        if self.radii_km.is_empty() {
            return None;
        }
        let idx = self.refreshes.saturating_sub(1) % self.radii_km.len();
        Some(self.radii_km[idx])
    }

    pub fn due(&self) -> bool {
        match self.last_refresh {
            Some(at) => at.elapsed() >= self.refresh,
            None => true,
        }
    }

    /// Fraction of the refresh interval that has elapsed.
    fn progress(&self) -> f64 {
        let Some(at) = self.last_refresh else {
            return 0.0;
        };
        (at.elapsed().as_secs_f64() / self.refresh.as_secs_f64()).clamp(0.0, 1.0)
    }

    fn seconds_left(&self) -> u64 {
        match self.last_refresh {
            Some(at) => self.refresh.saturating_sub(at.elapsed()).as_secs(),
            None => 0,
        }
    }
}

pub fn run_app<B, F>(terminal: &mut Terminal<B>, app: &mut App, mut fetch: F) -> io::Result<()>
where
    B: Backend,
    F: FnMut() -> anyhow::Result<Observation>,
{
    loop {
        if app.due() {
            app.update(fetch());
        }

        terminal.draw(|f| ui(f, app))?;

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('r') => app.update(fetch()),
                    _ => {}
                }
            }
        }
    }
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(Color::Yellow),
        ))
        .title_alignment(Alignment::Left)
        .border_style(Style::default().fg(Color::Cyan))
        .border_type(BorderType::Rounded)
}

fn display_rows<'a>(title: &'a str, rows: Vec<report::Row>) -> Table<'a> {
    let width = rows.iter().map(|row| row.label.len()).max().unwrap_or(0) as u16 + 2;
    let rows: Vec<Row> = rows
        .into_iter()
        .map(|row| {
            Row::new(vec![
                Cell::from(format!(" {}", row.label)),
                Cell::from(row.value).style(Style::default().fg(Color::Green)),
            ])
        })
        .collect();

    Table::new(rows, [Constraint::Length(width), Constraint::Min(10)]).block(panel(title))
}

fn display_headline<'a>(app: &'a App) -> Paragraph<'a> {
    let mut lines = vec![Line::from(vec![
        Span::raw(" "),
        Span::styled(
            app.address.as_str(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    ])];

    if let Some(ref link) = app.map_link {
        lines.push(Line::from(vec![
            Span::raw(" "),
            Span::styled(
                link.as_str(),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ]));
    }

    let detail = match app.observation {
        Some(ref obs) => format!(
            " Lat: {}, Lon: {}  {}  {} ({})",
            obs.latitude,
            obs.longitude,
            obs.local_time.format("%d-%m-%Y %H:%M"),
            obs.timezone,
            app.region
        ),
        None => format!(" {MISSING}"),
    };
    lines.push(Line::from(detail));

    Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .border_type(BorderType::Rounded),
    )
}

fn display_warnings(obs: &Observation, region: Region) -> Paragraph<'static> {
    let mut lines = Vec::new();
    for row in report::warnings(obs, region) {
        lines.push(Line::from(Span::styled(
            row.label,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for text in row.value.lines() {
            lines.push(Line::from(Span::styled(
                format!(" {text}"),
                Style::default().fg(Color::Green),
            )));
        }
        lines.push(Line::from(""));
    }
    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(panel("Rain & Typhoon"))
}

fn display_storms(obs: &Observation, radius_km: Option<f64>) -> List<'static> {
    let items: Vec<ListItem> = match radius_km {
        Some(radius) => {
            let storms = nearby_storms(obs.latitude, obs.longitude, &obs.alerts, radius);
            report::storm_lines(&storms, radius)
                .into_iter()
                .map(|line| ListItem::new(format!(" {line}")))
                .collect()
        }
        None => vec![ListItem::new(format!(" {MISSING}"))],
    };
    List::new(items).block(panel("Nearby Storms"))
}

fn display_status(app: &App) -> Gauge<'_> {
    let label = match app.error {
        Some(ref err) => err.clone(),
        None => format!(
            "next refresh in {}s  (r: refresh, q: quit)",
            app.seconds_left()
        ),
    };
    let color = if app.error.is_some() {
        Color::Red
    } else {
        Color::Cyan
    };
    Gauge::default()
        .block(panel("Status"))
        .gauge_style(Style::default().fg(color))
        .ratio(app.progress())
        .label(label)
}

fn ui(f: &mut Frame, app: &App) {
    let vert_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    f.render_widget(display_headline(app), vert_layout[0]);
    f.render_widget(display_status(app), vert_layout[2]);

    let Some(ref obs) = app.observation else {
        let waiting = Paragraph::new(" Fetching weather...").block(panel("Weather"));
        f.render_widget(waiting, vert_layout[1]);
        return;
    };

    render_body(f, vert_layout[1], app, obs);
}

fn render_body(f: &mut Frame, area: Rect, app: &App, obs: &Observation) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let conditions = report::conditions(obs);
    let lchunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(conditions.len() as u16 + 2),
            Constraint::Min(0),
        ])
        .split(chunks[0]);

    f.render_widget(display_rows("Current Conditions", conditions), lchunks[0]);
    f.render_widget(
        display_rows("Derived", report::derived(obs, app.region)),
        lchunks[1],
    );

    let rchunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    f.render_widget(display_warnings(obs, app.region), rchunks[0]);
    f.render_widget(display_storms(obs, app.radius_km()), rchunks[1]);
}
