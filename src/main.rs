use std::{fs::OpenOptions, sync::Mutex, time::Duration};

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, DisableFocusChange, EnableFocusChange, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use tracing_subscriber::EnvFilter;

use daytrack::{
    application::session::Session,
    config::Config,
    domain::{clock::SystemClock, error::TaskResult, rollover::Rollover, task::{Department, TaskId}},
    infrastructure::json_store::JsonFileStore,
};

type AppSession = Session<JsonFileStore, SystemClock>;

fn main() -> Result<()> {
    let config = Config::from_env();
    init_tracing(&config)?;

    let store = JsonFileStore::new(&config.store_path);
    // a corrupt file must stop us here rather than be overwritten by an empty list
    let session = Session::open(store, SystemClock)
        .with_context(|| format!("could not open task file {}", config.store_path.display()))?;
    tracing::info!(store = %config.store_path.display(), "daytrack started");

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let res = run_app(&mut terminal, App::new(session));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableFocusChange)?;
    terminal.show_cursor()?;

    res
}

fn init_tracing(config: &Config) -> Result<()> {
    // stdout belongs to the terminal UI
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .with_context(|| format!("could not open log file {}", config.log_path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode { View, Create { daily: bool }, Edit(TaskId) }

struct App {
    session: AppSession,
    mode: Mode,
    list_state: ListState,
    selected: usize,
    filter: Option<Department>,
    draft_title: String,
    draft_department: Department,
    status: String,
}

impl App {
    fn new(session: AppSession) -> Self {
        Self {
            session,
            mode: Mode::View,
            list_state: ListState::default(),
            selected: 0,
            filter: None,
            draft_title: String::new(),
            draft_department: Department::Odoo,
            status: String::new(),
        }
    }

    fn visible_ids(&self) -> Vec<TaskId> { self.session.visible(self.filter).iter().map(|t| t.id).collect() }

    fn current_id(&self) -> Option<TaskId> { self.visible_ids().get(self.selected).copied() }

    fn clamp_selection(&mut self) {
        let len = self.visible_ids().len();
        if len == 0 { self.selected = 0; self.list_state.select(None); }
        else { if self.selected >= len { self.selected = len - 1; } self.list_state.select(Some(self.selected)); }
    }

    fn report(&mut self, result: TaskResult<String>) {
        self.status = match result {
            Ok(msg) => msg,
            Err(e) => { tracing::error!(error = %e, "intent failed"); format!("error: {e}") }
        };
        self.clamp_selection();
    }

    fn toggle_current(&mut self) {
        let Some(id) = self.current_id() else { return };
        let done = self.session.registry().get(id).is_some_and(|t| t.done);
        let res = self.session.toggle_done(id, !done).map(|_| format!("{id} {}", if done { "reopened" } else { "done" }));
        self.report(res);
    }

    fn delete_current(&mut self) {
        let Some(id) = self.current_id() else { return };
        let res = self.session.delete(id);
        self.selected = cursor_after_delete(self.selected, &res);
        self.report(res.map(|removed| if removed { format!("{id} deleted") } else { format!("{id} was already gone") }));
    }

    fn start_edit(&mut self) {
        let Some(id) = self.current_id() else { return };
        let Some(task) = self.session.registry().get(id) else { return };
        if task.done {
            self.status = format!("{id} is done; reopen it to edit");
            return;
        }
        self.draft_title = task.title.clone();
        self.mode = Mode::Edit(id);
    }

    fn submit(&mut self) {
        let title = std::mem::take(&mut self.draft_title);
        let res = match self.mode {
            Mode::Create { daily } => {
                let added = if daily { self.session.add_daily(&title, self.draft_department) } else { self.session.add(&title, self.draft_department) };
                added.map(|t| t.map_or_else(|| "empty title, nothing added".to_string(), |t| format!("{} added to {}", t.id, t.department)))
            }
            Mode::Edit(id) => self.session.set_title(id, &title).map(|_| format!("{id} renamed")),
            Mode::View => return,
        };
        self.mode = Mode::View;
        self.report(res);
    }
}

/// The cursor only moves up when a row actually disappeared.
fn cursor_after_delete(selected: usize, result: &TaskResult<bool>) -> usize {
    match result {
        Ok(true) => selected.saturating_sub(1),
        _ => selected,
    }
}

fn rollover_message(outcome: Rollover) -> String {
    match outcome {
        Rollover::SameDay => String::new(),
        Rollover::RolledOver { today } => format!("new day {}, daily tasks re-armed", today.format("%Y-%m-%d")),
    }
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, mut app: App) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    app.clamp_selection();

    loop {
        terminal.draw(|f| draw(f, &mut app))?;

        if !event::poll(tick_rate)? { continue; }
        match event::read()? {
            Event::FocusGained => {
                let res = app.session.resume().map(rollover_message);
                app.report(res);
            }
            Event::Key(key) if key.kind == KeyEventKind::Press => match app.mode {
                Mode::View => match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Up => { if app.selected > 0 { app.selected -= 1; } app.clamp_selection(); }
                    KeyCode::Down => { app.selected += 1; app.clamp_selection(); }
                    KeyCode::Left => { app.session.shift_selected(-1); app.clamp_selection(); }
                    KeyCode::Right => { app.session.shift_selected(1); app.clamp_selection(); }
                    KeyCode::Char('t') => { let today = app.session.today(); app.session.select(today); app.clamp_selection(); }
                    KeyCode::Enter | KeyCode::Char(' ') => app.toggle_current(),
                    KeyCode::Char('n') => { app.mode = Mode::Create { daily: false }; app.draft_title.clear(); }
                    KeyCode::Char('N') => { app.mode = Mode::Create { daily: true }; app.draft_title.clear(); }
                    KeyCode::Char('e') => app.start_edit(),
                    KeyCode::Char('d') => app.delete_current(),
                    KeyCode::Char('f') => {
                        app.filter = match app.filter { None => Some(Department::ALL[0]), Some(d) if d.next() == Department::ALL[0] => None, Some(d) => Some(d.next()) };
                        app.clamp_selection();
                    }
                    _ => {}
                },
                Mode::Create { .. } | Mode::Edit(_) => match key.code {
                    KeyCode::Esc => { app.mode = Mode::View; app.draft_title.clear(); }
                    KeyCode::Enter => app.submit(),
                    KeyCode::Backspace => { app.draft_title.pop(); }
                    KeyCode::Tab if matches!(app.mode, Mode::Create { .. }) => { app.draft_department = app.draft_department.next(); }
                    KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => app.draft_title.push(c),
                    _ => {}
                },
            },
            _ => {}
        }
    }
    Ok(())
}

fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1), Constraint::Length(3)])
        .split(f.size());

    let header = Paragraph::new("Space: toggle  n/N: new task/daily  e: edit  d: delete  f: filter  ←/→: day  t: today  q: quit")
        .block(Block::default().borders(Borders::ALL).title("daytrack"));
    f.render_widget(header, chunks[0]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[1]);

    let selected = app.session.selected();
    let items: Vec<ListItem> = app.session.visible(app.filter).into_iter().map(|t| {
        let mark = if t.done { "[x]" } else { "[ ]" };
        let when = match (t.date, t.time_done) {
            (_, Some(at)) => format!(" ({})", at.format("%H:%M")),
            (None, None) => " (daily)".to_string(),
            _ => String::new(),
        };
        let style = if t.done { Style::default().add_modifier(Modifier::CROSSED_OUT | Modifier::DIM) } else { Style::default() };
        ListItem::new(format!("{mark} {:<5} {}{when}", t.department.as_str(), t.title)).style(style)
    }).collect();
    let filter_label = app.filter.map_or("All", |d| d.as_str());
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!("{} [{filter_label}]", selected.format("%a %Y-%m-%d"))))
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED))
        .highlight_symbol(">> ");
    f.render_stateful_widget(list, middle[0], &mut app.list_state);

    let calendar = Paragraph::new(render_month(app.session.selected_month().iter().map(|d| (d.date, d.total, d.is_complete())), selected))
        .block(Block::default().borders(Borders::ALL).title(selected.format("%B %Y").to_string()));
    f.render_widget(calendar, middle[1]);

    let footer_text = match app.mode {
        Mode::View => app.status.clone(),
        Mode::Create { daily } => format!("New {}task [{}] (Tab: department): {}_", if daily { "daily " } else { "" }, app.draft_department, app.draft_title),
        Mode::Edit(id) => format!("Edit {id}: {}_", app.draft_title),
    };
    let footer = Paragraph::new(footer_text)
        .block(Block::default().borders(Borders::ALL).title(match app.mode { Mode::View => "info", Mode::Create { .. } => "create", Mode::Edit(_) => "edit" }));
    f.render_widget(footer, chunks[2]);
}

/// One line per week; `*` marks complete days, `.` days with open tasks.
fn render_month(days: impl Iterator<Item = (NaiveDate, usize, bool)>, selected: NaiveDate) -> String {
    let mut out = String::from("Mo  Tu  We  Th  Fr  Sa  Su\n");
    let mut first = true;
    for (date, total, complete) in days {
        if first {
            out.push_str(&"    ".repeat(date.weekday().num_days_from_monday() as usize));
            first = false;
        }
        let mark = if complete { '*' } else if total > 0 { '.' } else { ' ' };
        let day = if date == selected { format!("[{:>2}", date.day()) } else { format!("{:>3}", date.day()) };
        out.push_str(&format!("{day}{mark}"));
        if date.weekday().num_days_from_monday() == 6 { out.push('\n'); }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use daytrack::domain::error::TaskError;

    #[test]
    fn cursor_moves_up_only_after_a_removal() {
        assert_eq!(cursor_after_delete(2, &Ok(true)), 1);
        assert_eq!(cursor_after_delete(0, &Ok(true)), 0);
        assert_eq!(cursor_after_delete(2, &Ok(false)), 2);
        assert_eq!(cursor_after_delete(2, &Err(TaskError::NotFound(TaskId(5)))), 2);
    }

    #[test]
    fn rollover_status_is_readable() {
        assert_eq!(rollover_message(Rollover::SameDay), "");
        let today = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        assert_eq!(rollover_message(Rollover::RolledOver { today }), "new day 2024-03-02, daily tasks re-armed");
    }
}
