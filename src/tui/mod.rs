use std::io::{self, IsTerminal, Stdout};

use color_eyre::Result;
use color_eyre::eyre::eyre;
use crossterm::ExecutableCommand;
use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::{Stream, StreamExt};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};
use tokio_util::sync::CancellationToken;

use crate::list::{Flow, InputEvent, ListState};

pub mod view;

/// Run the interactive list until the user quits or the shutdown token is
/// cancelled, returning the final state for persistence.
///
/// # Errors
///
/// Returns an error if stdout is not a terminal, terminal IO fails, or the
/// input stream yields an error.
pub async fn run(shutdown: &CancellationToken, state: ListState) -> Result<ListState> {
    if !io::stdout().is_terminal() {
        return Err(eyre!("stdout is not a terminal; an interactive session is required"));
    }

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut events = EventStream::new();
    let result = run_loop(&mut terminal, &mut events, shutdown, state).await;

    restore_terminal(&mut terminal);
    result
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) {
    let _ = disable_raw_mode();
    let _ = terminal.backend_mut().execute(LeaveAlternateScreen);
    let _ = terminal.show_cursor();
}

/// Draw/select loop: one event in arrival order, one transition, one render.
/// Generic over the backend and event stream so tests can drive it with a
/// `TestBackend` and a canned stream. Cancellation is only observed between
/// transitions, never in the middle of one.
async fn run_loop<B, S>(
    terminal: &mut Terminal<B>,
    events: &mut S,
    shutdown: &CancellationToken,
    mut state: ListState,
) -> Result<ListState>
where
    B: Backend,
    S: Stream<Item = io::Result<Event>> + Unpin,
{
    loop {
        terminal.draw(|frame| draw(frame, &state))?;

        tokio::select! {
            biased;
            () = shutdown.cancelled() => return Ok(state),
            maybe_event = events.next() => {
                let Some(event) = maybe_event else {
                    return Ok(state);
                };
                if let Some(input) = event_to_input(&event?) {
                    let (next, flow) = state.apply(input);
                    state = next;
                    if flow == Flow::Quit {
                        return Ok(state);
                    }
                }
            }
        }
    }
}

fn draw(frame: &mut Frame<'_>, state: &ListState) {
    frame.render_widget(Paragraph::new(view::render(state)), frame.area());
}

fn event_to_input(event: &Event) -> Option<InputEvent> {
    let Event::Key(key) = event else {
        return None;
    };
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(InputEvent::Quit),
        (_, KeyCode::Char('q') | KeyCode::Esc) => Some(InputEvent::Quit),
        (_, KeyCode::Up | KeyCode::Char('k')) => Some(InputEvent::MoveUp),
        (_, KeyCode::Down | KeyCode::Char('j')) => Some(InputEvent::MoveDown),
        (_, KeyCode::Char(' ') | KeyCode::Enter) => Some(InputEvent::Toggle),
        _ => None,
    }
}
