//! Terminal rendering. One function per view; the run loop calls [`render`]
//! every frame with the current [`App`].

use chrono::Datelike;
use ratatui::{prelude::*, widgets::*};

use crate::app::{App, StatsRange, View, stats_sessions_today};
use crate::dates;
use crate::model::SessionType;
use crate::schedule;
use crate::stats;
use crate::timer::Activity;

const ACCENT: Color = Color::LightRed;
const BORDER: Color = Color::DarkGray;

pub fn render(f: &mut Frame, app: &App) {
    match app.view {
        View::Timer => render_timer(f, app),
        View::Tasks => render_tasks(f, app),
        View::Stats => render_stats(f, app),
        View::Help => render_help(f),
    }
}

fn kind_color(kind: SessionType) -> Color {
    match kind {
        SessionType::Work => Color::LightRed,
        SessionType::ShortBreak => Color::LightGreen,
        SessionType::LongBreak => Color::LightBlue,
    }
}

fn render_timer(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(f.size());

    let header = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER))
        .title(Span::styled(
            " 🍅 TOMATINO ",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ));
    f.render_widget(header, chunks[0]);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(10),
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Length(2),
            Constraint::Min(4),
        ])
        .split(chunks[1]);

    let color = kind_color(app.timer.kind());
    f.render_widget(
        Paragraph::new(app.timer.kind().label().to_uppercase())
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[1],
    );

    let secs = app.timer.time_left_secs();
    f.render_widget(
        Paragraph::new(format!("{:02}:{:02}", secs / 60, secs % 60))
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[2],
    );

    let status = match app.timer.activity() {
        Activity::Running => Span::styled("● RUNNING", Style::default().fg(Color::Green)),
        Activity::Paused => Span::styled("⏸ PAUSED", Style::default().fg(Color::Yellow)),
        Activity::Idle => Span::styled("■ READY", Style::default().fg(Color::DarkGray)),
    };
    f.render_widget(
        Paragraph::new(Line::from(status)).alignment(Alignment::Center),
        sections[3],
    );

    f.render_widget(
        Gauge::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded),
            )
            .gauge_style(Style::default().fg(color).bg(Color::Black))
            .percent((app.timer.progress() * 100.0) as u16),
        sections[4],
    );

    let now = dates::now_ms();
    let today = stats_sessions_today(&app.sessions, now);
    let cadence = app.settings.sessions_until_long_break;
    let info = format!(
        "Session {} of {}  •  {today}/{} today",
        ((app.timer.session_ordinal() - 1) % cadence) + 1,
        cadence,
        app.settings.daily_session_goal,
    );
    f.render_widget(
        Paragraph::new(info)
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
        sections[5],
    );

    let focus = match app.timer.task_id() {
        Some(id) => app
            .tasks
            .iter()
            .find(|t| t.id == id)
            .map(|t| format!("Focus: {}", t.title))
            .unwrap_or_default(),
        None => String::new(),
    };
    let extra = app.status.clone().unwrap_or(focus);
    f.render_widget(
        Paragraph::new(extra)
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
        sections[6],
    );

    // Reminders surfaced for the break in progress.
    if !app.due_reminders.is_empty() {
        let mut lines = vec![Line::from(Span::styled(
            "Break reminders (press number to check off):",
            Style::default().fg(Color::Cyan),
        ))];
        for (i, id) in app.due_reminders.iter().enumerate() {
            if let Some(r) = app.reminders.iter().find(|r| &r.id == id) {
                lines.push(Line::from(format!("  {}. {} — {}", i + 1, r.title, r.description)));
            }
        }
        f.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center),
            sections[7],
        );
    }

    let controls = vec![
        Line::from(vec![
            span_key("Space"),
            Span::raw(" Start/Pause  •  "),
            span_key("S"),
            Span::raw(" Stop  •  "),
            span_key("R"),
            Span::raw(" Reset  •  "),
            span_key("W/B/L"),
            Span::raw(" Switch"),
        ]),
        Line::from(vec![
            span_key("T"),
            Span::raw(" Tasks  •  "),
            span_key("V"),
            Span::raw(" Stats  •  "),
            span_key("H"),
            Span::raw(" Help  •  "),
            span_key("Q"),
            Span::raw(" Quit"),
        ]),
    ];
    f.render_widget(
        Paragraph::new(controls)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray)),
        chunks[2],
    );
}

fn render_tasks(f: &mut Frame, app: &App) {
    let area = centered_rect(80, 90, f.size());
    let today = dates::local_date_of(dates::now_ms());

    let mut lines = vec![Line::from("")];
    let visible = app.visible_tasks();
    if visible.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No tasks yet. Press A to add one.",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }
    for (row, &idx) in visible.iter().enumerate() {
        let task = &app.tasks[idx];
        let selected = row == app.task_cursor;
        let focused = app.timer.task_id() == Some(task.id.as_str());
        let mark = if task.completed { "✔" } else { " " };
        let due = if schedule::is_due_today(task, today) { " [due]" } else { "" };
        let mode = if task.is_spaced() {
            " ↻sr"
        } else if task.is_recurring() {
            " ↻"
        } else {
            ""
        };
        let text = format!(
            "{} [{mark}] {}{mode}{due}  ({} sessions)",
            if focused { "▶" } else { " " },
            task.title,
            task.sessions_completed,
        );
        let style = if selected {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else if task.completed {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(text, style)));
    }

    lines.push(Line::from(""));
    if let Some(input) = &app.task_input {
        lines.push(Line::from(Span::styled(
            format!("  New task: {input}_"),
            Style::default().fg(Color::Cyan),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "  A add  •  Enter focus  •  C complete  •  D archive  •  JK move  •  Esc back",
            Style::default().fg(Color::DarkGray),
        )));
    }

    f.render_widget(
        Paragraph::new(lines).block(titled_block(" Tasks ")),
        area,
    );
}

fn render_stats(f: &mut Frame, app: &App) {
    let area = centered_rect(80, 90, f.size());
    let today = dates::local_date_of(dates::now_ms());

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Press Tab to cycle daily / weekly / monthly",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
        Line::from(""),
    ];

    let streak = stats::current_streak(&app.sessions, today);
    match app.stats_range {
        StatsRange::Daily => {
            let day = stats::daily(today, &app.sessions, &app.tasks, &app.completions);
            lines.push(heading("Today"));
            lines.push(stat_line("Sessions", day.sessions.to_string()));
            lines.push(stat_line(
                "Work / short / long",
                format!(
                    "{} / {} / {}",
                    day.work_sessions, day.short_break_sessions, day.long_break_sessions
                ),
            ));
            lines.push(stat_line("Focus time", format!("{} min", day.focus_minutes)));
            lines.push(stat_line("Tasks completed", day.tasks_completed.to_string()));
            lines.push(stat_line(
                "Reminders",
                format!("{} shown, {} done", day.reminders_shown, day.reminders_completed),
            ));
            let total = app.tasks.iter().filter(|t| t.archived_at.is_none()).count() as u32;
            let done = app
                .tasks
                .iter()
                .filter(|t| t.archived_at.is_none() && t.completed)
                .count() as u32;
            lines.push(stat_line(
                "Task completion",
                format!("{:.0}%", stats::completion_rate(done, total)),
            ));
            let goal = app.settings.daily_session_goal;
            lines.push(stat_line(
                "Daily goal",
                format!(
                    "{}/{}{}",
                    day.work_sessions,
                    goal,
                    if day.work_sessions >= goal { "  🎉" } else { "" }
                ),
            ));
        }
        StatsRange::Weekly => {
            let week = stats::weekly(today, &app.sessions, &app.tasks, &app.completions);
            lines.push(heading(&format!(
                "Week of {}",
                week.week_start.format("%B %d")
            )));
            lines.push(stat_line("Sessions", week.total_sessions.to_string()));
            lines.push(stat_line(
                "Focus time",
                format!("{} min", week.total_focus_minutes),
            ));
            lines.push(stat_line(
                "Tasks completed",
                week.total_tasks_completed.to_string(),
            ));
            lines.push(stat_line(
                "Average / day",
                format!("{:.1}", week.average_sessions_per_day),
            ));
            lines.push(stat_line(
                "Best day",
                week.best_day.format("%A").to_string(),
            ));
            lines.push(Line::from(""));
            for d in &week.daily {
                lines.push(stat_line(
                    &d.date.format("%a").to_string(),
                    format!("{} {}", "▇".repeat(d.sessions.min(40) as usize), d.sessions),
                ));
            }
        }
        StatsRange::Monthly => {
            let month = stats::monthly(
                today.year(),
                today.month(),
                &app.sessions,
                &app.tasks,
                &app.completions,
            );
            lines.push(heading(&today.format("%B %Y").to_string()));
            lines.push(stat_line("Sessions", month.total_sessions.to_string()));
            lines.push(stat_line(
                "Focus time",
                format!("{} min", month.total_focus_minutes),
            ));
            lines.push(stat_line(
                "Tasks completed",
                month.total_tasks_completed.to_string(),
            ));
            lines.push(stat_line(
                "Average / day",
                format!("{:.2}", month.average_sessions_per_day),
            ));
            lines.push(Line::from(""));
            for w in &month.weekly {
                lines.push(stat_line(
                    &format!("Week of {}", w.start.format("%d")),
                    format!("{} sessions, {} min", w.sessions, w.focus_minutes),
                ));
            }
        }
    }

    lines.push(Line::from(""));
    lines.push(stat_line("Streak", format!("{streak} day(s)")));

    f.render_widget(
        Paragraph::new(lines).block(titled_block(" Statistics ")),
        area,
    );
}

fn render_help(f: &mut Frame) {
    let area = centered_rect(70, 85, f.size());

    let help_text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "⌨️  KEYBOARD SHORTCUTS",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("  Timer:"),
        help_line("Space", "Start / pause"),
        help_line("S", "Stop and reset the countdown"),
        help_line("R", "Reset back to the first work session"),
        help_line("W / B / L", "Switch to work / short break / long break"),
        help_line("1-9", "Check off a break reminder"),
        Line::from(""),
        Line::from("  Tasks:"),
        help_line("T", "Open the task list"),
        help_line("A / N", "Add a task"),
        help_line("Enter", "Focus the timer on the selected task"),
        help_line("C", "Complete / uncomplete"),
        help_line("D", "Archive"),
        Line::from(""),
        Line::from("  Other:"),
        help_line("V", "Statistics (Tab cycles ranges)"),
        help_line("H / ?", "Toggle help"),
        help_line("Q / Ctrl+C", "Quit"),
    ];

    f.render_widget(
        Paragraph::new(help_text)
            .alignment(Alignment::Left)
            .block(titled_block(" Help ")),
        area,
    );
}

fn titled_block(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER))
}

fn span_key(text: &str) -> Span<'_> {
    Span::styled(text, Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {text}"),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ))
}

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("    {label:<22}")),
        Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
    ])
}

fn help_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("    "),
        Span::styled(key, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!("  {desc}")),
    ])
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
