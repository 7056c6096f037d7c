//! Rendering for the forecast widget.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use weathergrid_core::model::day_label;
use weathergrid_core::{DailySeries, ViewState};

use crate::app::{Focus, Inputs};

pub fn draw(frame: &mut Frame, state: &ViewState, inputs: &Inputs, focus: Focus) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    frame.render_widget(
        Paragraph::new("Weather Forecast using Open Meteo API")
            .style(Style::default().add_modifier(Modifier::BOLD)),
        rows[0],
    );

    draw_inputs(frame, rows[1], inputs, focus);
    draw_body(frame, rows[2], state);

    frame.render_widget(
        Paragraph::new("Tab switch field  Esc quit").style(Style::default().fg(Color::DarkGray)),
        rows[3],
    );
}

fn draw_inputs(frame: &mut Frame, area: Rect, inputs: &Inputs, focus: Focus) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    draw_field(frame, cols[0], "city", &inputs.city, "Enter city", focus == Focus::City);
    draw_field(
        frame,
        cols[1],
        "country",
        &inputs.country,
        "Enter country",
        focus == Focus::Country,
    );
}

fn draw_field(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    value: &str,
    placeholder: &str,
    focused: bool,
) {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let content = if value.is_empty() {
        Line::styled(placeholder.to_string(), Style::default().fg(Color::DarkGray))
    } else {
        Line::raw(value.to_string())
    };

    frame.render_widget(
        Paragraph::new(content).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .border_style(border),
        ),
        area,
    );
}

fn draw_body(frame: &mut Frame, area: Rect, state: &ViewState) {
    if let Some(daily) = state.grid() {
        draw_grid(frame, area, daily);
    } else if let Some(message) = state.visible_error() {
        frame.render_widget(
            Paragraph::new(message.to_string()).style(Style::default().fg(Color::Yellow)),
            area,
        );
    }
}

/// One bordered cell per forecast day, labeled "Today" / weekday.
fn draw_grid(frame: &mut Frame, area: Rect, daily: &DailySeries) {
    let count = daily.len().max(1) as u32;
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, count); daily.len()])
        .split(area);

    for (index, day) in daily.days().enumerate() {
        let lines = vec![
            Line::styled(
                day_label(index, day.date),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Line::raw(format!("{}° Max", day.temp_max)),
            Line::raw(format!("{}° Min", day.temp_min)),
            Line::styled(
                format!("{} mm rain", day.rain_sum),
                Style::default().fg(Color::Blue),
            ),
        ];
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
            cols[index],
        );
    }
}
