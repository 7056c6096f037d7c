//! Terminal event loop for the forecast widget.

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use weathergrid_core::{ForecastClient, ForecastView, GeocodingClient};

use crate::ui;

/// Which input box receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    City,
    Country,
}

impl Focus {
    fn toggle(self) -> Self {
        match self {
            Focus::City => Focus::Country,
            Focus::Country => Focus::City,
        }
    }
}

/// Editable input buffers. The view only sees settled values.
#[derive(Debug, Default)]
pub struct Inputs {
    pub city: String,
    pub country: String,
}

pub async fn run(geocoder: GeocodingClient, forecast: ForecastClient) -> Result<()> {
    let mut view = ForecastView::new(geocoder, forecast);
    view.start().await;
    tracing::info!("forecast view initialized");

    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &mut view).await;
    restore_terminal(&mut terminal)?;
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    view: &mut ForecastView,
) -> Result<()> {
    let mut inputs = Inputs::default();
    let mut focus = Focus::City;

    loop {
        // Drain settled messages before each frame.
        while let Some(msg) = view.try_next() {
            view.handle(msg);
        }

        terminal.draw(|frame| ui::draw(frame, view.state(), &inputs, focus))?;

        if event::poll(Duration::from_millis(33))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Esc => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Tab => focus = focus.toggle(),
                    KeyCode::Backspace => edit(&mut inputs, focus, view, |buf| {
                        buf.pop();
                    }),
                    KeyCode::Char(c) => edit(&mut inputs, focus, view, |buf| buf.push(c)),
                    _ => {}
                }
            }
        }
    }

    Ok(())
}

/// Apply an edit to the focused buffer and feed that field's debouncer
/// with the full current value.
fn edit(inputs: &mut Inputs, focus: Focus, view: &ForecastView, apply: impl FnOnce(&mut String)) {
    match focus {
        Focus::City => {
            apply(&mut inputs.city);
            view.on_city_input(inputs.city.clone());
        }
        Focus::Country => {
            apply(&mut inputs.country);
            view.on_country_input(inputs.country.clone());
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    terminal::enable_raw_mode()?;
    let mut out = io::stdout();
    execute!(out, EnterAlternateScreen, cursor::Hide)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    let mut out = io::stdout();
    execute!(out, cursor::Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    terminal.show_cursor()?;
    Ok(())
}
