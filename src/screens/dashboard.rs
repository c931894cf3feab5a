/// Dashboard screen - grouped container overview with sparklines
///
/// Renders exclusively from the published view snapshot and the history
/// store; every mutation goes back through the monitor as an explicit call.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Sparkline, Wrap},
    Frame,
};

use crate::core::history::HistoryStore;
use crate::core::monitor::{ContainerRow, CyclePhase, DashboardView};
use crate::utils::{format_bytes, truncate_string, ContainerStatus};

/// Logs for one container, shown as an overlay
pub struct LogsPane {
    pub container: String,
    pub text: String,
}

/// UI-local state (selection, overlays); everything else comes from the view
pub struct DashboardState {
    pub selected: usize,
    pub logs: Option<LogsPane>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            selected: 0,
            logs: None,
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self, max: usize) {
        if self.selected + 1 < max {
            self.selected += 1;
        }
    }

    pub fn clamp_selection(&mut self, max: usize) {
        if max == 0 {
            self.selected = 0;
        } else if self.selected >= max {
            self.selected = max - 1;
        }
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

/// Container rows in group display order. Selection indexes into this list.
pub fn flattened_rows(view: &DashboardView) -> Vec<&ContainerRow> {
    view.groups
        .iter()
        .flat_map(|group| group.containers.iter())
        .filter_map(|info| view.containers.iter().find(|row| row.info.id == info.id))
        .collect()
}

pub fn render(
    f: &mut Frame,
    view: &DashboardView,
    history: &HistoryStore,
    state: &DashboardState,
    phase: CyclePhase,
    auto_refresh: bool,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Summary header
            Constraint::Min(0),    // Main area
            Constraint::Length(1), // Footer
        ])
        .split(f.size());

    render_header(f, chunks[0], view, phase, auto_refresh, history.window());

    if let Some(logs) = &state.logs {
        render_logs(f, chunks[1], logs);
    } else {
        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
            .split(chunks[1]);

        render_container_list(f, main[0], view, state);
        render_detail(f, main[1], view, history, state);
    }

    let footer = Paragraph::new(
        "[q] Quit  [↑↓] Select  [r] Refresh  [a] Auto  [c] Clear History  [+/-] Window  [x] Restart  [l] Logs",
    )
    .style(Style::default().fg(Color::Gray))
    .alignment(Alignment::Center);
    f.render_widget(footer, chunks[2]);
}

fn render_header(
    f: &mut Frame,
    area: Rect,
    view: &DashboardView,
    phase: CyclePhase,
    auto_refresh: bool,
    window: usize,
) {
    let phase_str = match phase {
        CyclePhase::Idle => "idle",
        CyclePhase::Polling => "polling...",
        CyclePhase::Updating => "updating...",
    };

    let refreshed = view
        .refreshed_at
        .map(|ts| ts.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    let mut spans = vec![
        Span::styled("Containers: ", Style::default().fg(Color::Gray)),
        Span::styled(
            view.summary.total.to_string(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  │  "),
        Span::styled("Running: ", Style::default().fg(Color::Gray)),
        Span::styled(
            view.summary.running.to_string(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  │  "),
        Span::styled("Instances: ", Style::default().fg(Color::Gray)),
        Span::styled(
            view.summary.active_projects.to_string(),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  │  "),
        Span::styled("Window: ", Style::default().fg(Color::Gray)),
        Span::styled(window.to_string(), Style::default().fg(Color::White)),
        Span::raw("  │  "),
        Span::styled(
            if auto_refresh { "auto" } else { "paused" },
            Style::default().fg(if auto_refresh { Color::Green } else { Color::Yellow }),
        ),
        Span::raw("  "),
        Span::styled(phase_str, Style::default().fg(Color::DarkGray)),
        Span::raw("  │  "),
        Span::styled(refreshed, Style::default().fg(Color::Blue)),
    ];

    if let Some(err) = &view.last_error {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            truncate_string(err, 40),
            Style::default().fg(Color::Red),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Docker Monitoring Hub"),
    );
    f.render_widget(header, area);
}

fn status_color(status: ContainerStatus) -> Color {
    match status {
        ContainerStatus::Running => Color::Green,
        ContainerStatus::Exited => Color::Red,
        ContainerStatus::Paused => Color::Yellow,
        ContainerStatus::Created => Color::Cyan,
        ContainerStatus::Other => Color::Gray,
    }
}

fn render_container_list(f: &mut Frame, area: Rect, view: &DashboardView, state: &DashboardState) {
    let mut items: Vec<ListItem> = Vec::new();
    // Index of the selected flattened row within `items`
    let mut highlight = None;
    let mut row_index = 0usize;

    for group in &view.groups {
        items.push(ListItem::new(Line::from(Span::styled(
            format!(
                "▸ {} ({}/{} running)",
                group.project,
                group.running_count(),
                group.containers.len()
            ),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ))));

        for info in &group.containers {
            let row = view.containers.iter().find(|r| r.info.id == info.id);
            let cpu = row
                .and_then(|r| r.sample.as_ref())
                .map(|s| format!("{:>6.1}%", s.cpu_percent))
                .unwrap_or_else(|| "     --".to_string());
            let mem = row
                .and_then(|r| r.sample.as_ref())
                .map(|s| format!("{:>10}", format_bytes(s.mem_usage_bytes)))
                .unwrap_or_else(|| "        --".to_string());

            if row_index == state.selected {
                highlight = Some(items.len());
            }

            items.push(ListItem::new(Line::from(vec![
                Span::raw(format!("   {:<22}", truncate_string(&info.name, 22))),
                Span::styled(
                    format!("{:<8}", info.status.label()),
                    Style::default().fg(status_color(info.status)),
                ),
                Span::styled(cpu, Style::default().fg(Color::Yellow)),
                Span::styled(mem, Style::default().fg(Color::Magenta)),
            ])));

            row_index += 1;
        }
    }

    if items.is_empty() {
        items.push(ListItem::new("No containers found."));
    }

    let mut list_state = ListState::default();
    list_state.select(highlight);

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Instances"))
        .highlight_style(Style::default().bg(Color::DarkGray));

    f.render_stateful_widget(list, area, &mut list_state);
}

fn render_detail(
    f: &mut Frame,
    area: Rect,
    view: &DashboardView,
    history: &HistoryStore,
    state: &DashboardState,
) {
    let rows = flattened_rows(view);
    let Some(row) = rows.get(state.selected) else {
        let empty = Paragraph::new("Select a container")
            .block(Block::default().borders(Borders::ALL).title("Inspector"));
        f.render_widget(empty, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Info
            Constraint::Length(4), // CPU sparkline
            Constraint::Length(4), // Memory sparkline
            Constraint::Min(0),
        ])
        .split(area);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Name:    ", Style::default().fg(Color::Gray)),
            Span::styled(row.info.name.clone(), Style::default().fg(Color::White)),
        ]),
        Line::from(vec![
            Span::styled("Image:   ", Style::default().fg(Color::Gray)),
            Span::raw(truncate_string(&row.info.image, 40)),
        ]),
        Line::from(vec![
            Span::styled("Status:  ", Style::default().fg(Color::Gray)),
            Span::styled(
                row.info.status_text.clone(),
                Style::default().fg(status_color(row.info.status)),
            ),
        ]),
        Line::from(vec![
            Span::styled("Uptime:  ", Style::default().fg(Color::Gray)),
            Span::raw(row.uptime.clone()),
        ]),
        Line::from(vec![
            Span::styled("Service: ", Style::default().fg(Color::Gray)),
            Span::raw(format!("{} ({})", row.info.service, row.info.project)),
        ]),
    ];

    if let Some(sample) = &row.sample {
        let (rx, tx) = sample.network_totals();
        lines.push(Line::from(vec![
            Span::styled("Memory:  ", Style::default().fg(Color::Gray)),
            Span::raw(format!(
                "{} / {} ({:.1}%)",
                format_bytes(sample.mem_usage_bytes),
                format_bytes(sample.mem_limit_bytes),
                sample.mem_percent
            )),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Network: ", Style::default().fg(Color::Gray)),
            Span::raw(format!("Rx {} / Tx {}", format_bytes(rx), format_bytes(tx))),
        ]));
    }

    let info = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Inspector: {}", row.info.id)),
    );
    f.render_widget(info, chunks[0]);

    let cpu_data: Vec<u64> = history
        .cpu_series(&row.info.id)
        .iter()
        .map(|v| v.round() as u64)
        .collect();
    let cpu_title = row
        .sample
        .as_ref()
        .map(|s| format!("CPU {:.2}%", s.cpu_percent))
        .unwrap_or_else(|| "CPU".to_string());
    let cpu_spark = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title(cpu_title))
        .data(&cpu_data)
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(cpu_spark, chunks[1]);

    let mem_data: Vec<u64> = history
        .mem_series(&row.info.id)
        .iter()
        .map(|v| v.round() as u64)
        .collect();
    let mem_title = row
        .sample
        .as_ref()
        .map(|s| format!("Memory {:.1}%", s.mem_percent))
        .unwrap_or_else(|| "Memory".to_string());
    let mem_spark = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title(mem_title))
        .data(&mem_data)
        .style(Style::default().fg(Color::Magenta));
    f.render_widget(mem_spark, chunks[2]);
}

fn render_logs(f: &mut Frame, area: Rect, logs: &LogsPane) {
    let paragraph = Paragraph::new(logs.text.clone())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Logs: {} (Esc to close)", logs.container)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}
