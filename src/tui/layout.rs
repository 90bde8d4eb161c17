use chrono::{DateTime, Local};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{app::App, style};
use crate::{
    api::Capability,
    core::snapshot::N_HISTORY_DAYS,
    quantity::energy::KilowattHours,
    render::{
        format::{FormattedMinor, FormattedPower, format_time_until},
        spark::{bar, hourly_bars},
    },
};

/// Renders the full dashboard frame.
pub fn render(frame: &mut Frame, app: &App, now: DateTime<Local>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // header
            Constraint::Length(4), // balance and rate
            Constraint::Length(4), // live power and dispatch
            Constraint::Length(4), // today by hour
            Constraint::Min(10),   // last days
            Constraint::Length(6), // sessions and charges
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    render_header(frame, app, now, rows[0]);
    let [left, right] = halves(rows[1]);
    render_balance(frame, app, left);
    render_rate(frame, app, now, right);
    let [left, right] = halves(rows[2]);
    render_live_power(frame, app, left);
    render_dispatch(frame, app, now, right);
    render_today(frame, app, rows[3]);
    render_history(frame, app, rows[4]);
    let [left, right] = halves(rows[5]);
    render_saving_sessions(frame, app, now, left);
    render_upcoming_charges(frame, app, right);
    render_footer(frame, app, rows[6]);
}

fn halves(area: Rect) -> [Rect; 2] {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    [chunks[0], chunks[1]]
}

fn panel(title: &str) -> Block<'_> {
    Block::default().title(format!(" {title} ")).borders(Borders::ALL)
}

fn muted(text: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(text.into(), Style::default().fg(style::MUTED)))
}

/// Shown in place of a missing section.
fn placeholder(app: &App, capability: Capability) -> Line<'static> {
    if !app.region.supports(capability) {
        muted(format!("not available in the {} region", app.region))
    } else if app.updated_at.is_none() {
        muted("loading…")
    } else {
        muted("unavailable")
    }
}

fn render_header(frame: &mut Frame, app: &App, now: DateTime<Local>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(20)])
        .split(area);

    let mut spans = vec![
        Span::styled(
            " OCTOPUS ",
            Style::default()
                .fg(style::HEADER_FG)
                .bg(style::HEADER_BG)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];
    if let Some(account) = &app.snapshot.account {
        let name = Style::default().add_modifier(Modifier::BOLD);
        spans.push(Span::styled(account.name.clone(), name));
        spans.push(Span::raw(format!(" │ {}", account.number)));
    }
    spans.push(Span::styled(format!(" │ {}", app.region), Style::default().fg(style::MUTED)));
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);

    let clock = if app.is_loading {
        format!("refreshing… {} ", now.format("%H:%M:%S"))
    } else {
        format!("{} ", now.format("%H:%M:%S"))
    };
    frame.render_widget(Paragraph::new(clock).alignment(Alignment::Right), chunks[1]);
}

fn render_balance(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match &app.snapshot.account {
        Some(account) => {
            let (label, color) = if account.is_in_credit() {
                ("credit", style::GOOD)
            } else {
                ("owed", style::WARNING)
            };
            vec![
                Line::from(vec![
                    Span::styled(
                        account.balance.abs().to_string(),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!(" {label}"), Style::default().fg(color)),
                ]),
                muted(account.status.clone()),
            ]
        }
        None => vec![placeholder(app, Capability::Account)],
    };
    frame.render_widget(Paragraph::new(lines).block(panel("Balance")), area);
}

fn render_rate(frame: &mut Frame, app: &App, now: DateTime<Local>, area: Rect) {
    let lines = match &app.snapshot.rate {
        Some(rate) => {
            let color = style::rate_color(rate.is_off_peak);
            vec![
                Line::from(vec![
                    Span::styled(
                        if rate.is_off_peak { "OFF-PEAK " } else { "PEAK " },
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        format!("{}/kWh", FormattedMinor::rate(rate.rate, app.currency)),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]),
                muted(format!(
                    "{} {} (at {}), then {}",
                    if rate.is_off_peak { "ends in" } else { "cheap rate in" },
                    format_time_until(rate.period_end, now),
                    rate.period_end.format("%H:%M"),
                    FormattedMinor::rate(rate.next_rate, app.currency),
                )),
            ]
        }
        None => vec![placeholder(app, Capability::Tariff)],
    };
    frame.render_widget(Paragraph::new(lines).block(panel("Rate")), area);
}

fn render_live_power(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match &app.snapshot.live_power {
        Some(live_power) => {
            let mut spans = vec![Span::styled(
                FormattedPower(live_power.demand).to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )];
            if let Some(rate) = &app.snapshot.rate {
                spans.push(Span::raw(format!(
                    "  ~{}/hr",
                    FormattedMinor::new(live_power.cost_per_hour(rate.rate), app.currency, 0),
                )));
            }
            vec![
                Line::from(spans),
                muted(format!("read at {}", live_power.read_at.format("%H:%M:%S"))),
            ]
        }
        None => vec![placeholder(app, Capability::LivePower)],
    };
    frame.render_widget(Paragraph::new(lines).block(panel("Live power")), area);
}

fn render_dispatch(frame: &mut Frame, app: &App, now: DateTime<Local>, area: Rect) {
    let lines = match &app.snapshot.dispatch_status {
        Some(status) => {
            if let Some(current) = &status.current {
                vec![
                    Line::from(Span::styled(
                        "CHARGING",
                        Style::default().fg(style::GOOD).add_modifier(Modifier::BOLD),
                    )),
                    muted(format!("until {}", current.interval.end.format("%H:%M"))),
                ]
            } else if let Some(next) = &status.next {
                vec![
                    Line::from(format!(
                        "next {} - {}",
                        next.interval.start.format("%H:%M"),
                        next.interval.end.format("%H:%M"),
                    )),
                    muted(format!("in {}", format_time_until(next.interval.start, now))),
                ]
            } else {
                vec![muted("no dispatches scheduled")]
            }
        }
        None => vec![placeholder(app, Capability::Dispatches)],
    };
    frame.render_widget(Paragraph::new(lines).block(panel("Smart charging")), area);
}

fn render_today(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match &app.snapshot.hourly_usage {
        Some(hourly) => {
            let spans: Vec<Span> = hourly_bars(hourly)
                .iter()
                .map(|bar| {
                    Span::styled(
                        format!("{0}{0}", bar.block),
                        Style::default().fg(style::hour_color(bar)),
                    )
                })
                .collect();
            let total: KilowattHours = hourly.iter().copied().sum();
            vec![
                Line::from(spans),
                muted(format!(
                    "{:<12}{:<12}{:<12}{:<10}{:<4}{total:.1}",
                    "0", "6", "12", "18", "23",
                )),
            ]
        }
        None if app.updated_at.is_some() && app.region.supports(Capability::Consumption) => {
            vec![muted("no readings for today yet")]
        }
        None => vec![placeholder(app, Capability::Consumption)],
    };
    frame.render_widget(Paragraph::new(lines).block(panel("Today by hour")), area);
}

fn render_history(frame: &mut Frame, app: &App, area: Rect) {
    let daily = &app.snapshot.daily_usage;
    if daily.is_empty() {
        let line = placeholder(app, Capability::Consumption);
        frame.render_widget(Paragraph::new(line).block(panel("Last days")), area);
        return;
    }

    let days: Vec<_> = daily.iter().rev().take(N_HISTORY_DAYS).collect();
    let max = days.iter().map(|(_, energy)| **energy).max().unwrap_or_default();
    let width = usize::from(area.width.saturating_sub(28)).max(1);
    let mut lines: Vec<Line> = days
        .iter()
        .map(|(date, energy)| {
            Line::from(vec![
                Span::styled(
                    date.format("%a %d  ").to_string(),
                    Style::default().fg(style::MUTED),
                ),
                Span::styled(bar(energy.0, max.0, width), Style::default().fg(style::USAGE)),
                Span::raw(format!("  {:>5.1} kWh", energy.0)),
            ])
        })
        .collect();

    let total: KilowattHours = days.iter().map(|(_, energy)| **energy).sum();
    #[allow(clippy::cast_precision_loss)]
    let average = total / days.len() as f64;
    lines.push(Line::from(vec![
        Span::styled("total ", Style::default().fg(style::MUTED)),
        Span::styled(format!("{total:.1}"), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled("  average ", Style::default().fg(style::MUTED)),
        Span::raw(format!("{average:.1}/day")),
    ]));

    let title = format!("Last {} days", days.len());
    frame.render_widget(Paragraph::new(lines).block(panel(&title)), area);
}

fn render_saving_sessions(frame: &mut Frame, app: &App, now: DateTime<Local>, area: Rect) {
    let sessions = &app.snapshot.saving_sessions;
    let lines = if !app.region.supports(Capability::SavingSessions) {
        vec![placeholder(app, Capability::SavingSessions)]
    } else if sessions.is_empty() {
        vec![muted("no upcoming sessions")]
    } else {
        sessions
            .iter()
            .take(4)
            .map(|session| {
                if session.is_active(now) {
                    Line::from(Span::styled(
                        format!("ACTIVE until {}", session.interval.end.format("%H:%M")),
                        Style::default().fg(style::GOOD).add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(format!(
                        "{} - {}  {} pts/kWh",
                        session.interval.start.format("%a %d %b %H:%M"),
                        session.interval.end.format("%H:%M"),
                        session.reward_per_kwh,
                    ))
                }
            })
            .collect()
    };
    frame.render_widget(Paragraph::new(lines).block(panel("Saving sessions")), area);
}

fn render_upcoming_charges(frame: &mut Frame, app: &App, area: Rect) {
    let dispatches = &app.snapshot.dispatches;
    let lines = if !app.region.supports(Capability::Dispatches) {
        vec![placeholder(app, Capability::Dispatches)]
    } else if dispatches.is_empty() {
        vec![muted("none planned")]
    } else {
        dispatches
            .iter()
            .take(4)
            .map(|dispatch| {
                Line::from(format!(
                    "{} - {}",
                    dispatch.interval.start.format("%a %H:%M"),
                    dispatch.interval.end.format("%H:%M"),
                ))
            })
            .collect()
    };
    frame.render_widget(Paragraph::new(lines).block(panel("Upcoming charges")), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();
    if let Some(tariff) = &app.snapshot.tariff {
        spans.push(Span::raw(format!(
            " {} · {}/day",
            tariff.name,
            FormattedMinor::new(tariff.standing_charge.0, app.currency, 1),
        )));
    }
    if let Some(updated_at) = app.updated_at {
        spans.push(Span::styled(
            format!(" · updated {}", updated_at.format("%H:%M:%S")),
            Style::default().fg(style::MUTED),
        ));
    }
    spans.push(Span::styled("  q:Quit  r:Refresh", Style::default().fg(style::MUTED)));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
