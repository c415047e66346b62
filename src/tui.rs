use std::io::stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
};

use crate::api::ScreeningApi;
use crate::cache::SystemClock;
use crate::debounce::{Debouncer, SEARCH_DEBOUNCE};
use crate::form::{ConditionForm, FormField};
use crate::format::{format_optional_date, truncate};
use crate::models::{EDUCATION_LEVELS, SCREENING_STATUSES};
use crate::notify::{Level, StatusLine};
use crate::pages::conditions::ConditionsCache;
use crate::pages::talents::TalentSearch;
use crate::pages::upload::UploadState;
use crate::tags::TagInput;
use crate::pages::{ConditionsPage, Page, PageContext, TalentsPage, UploadPage};
use crate::upload::path_from_drop;

const IDLE_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Conditions,
    Upload,
    Talents,
}

impl Tab {
    const ALL: [Tab; 3] = [Tab::Conditions, Tab::Upload, Tab::Talents];

    fn label(self) -> &'static str {
        match self {
            Tab::Conditions => "1 Conditions",
            Tab::Upload => "2 Upload",
            Tab::Talents => "3 Talents",
        }
    }
}

enum ActivePage {
    Conditions(ConditionsPage),
    Upload(UploadPage),
    Talents(TalentsPage),
}

impl ActivePage {
    fn tab(&self) -> Tab {
        match self {
            ActivePage::Conditions(_) => Tab::Conditions,
            ActivePage::Upload(_) => Tab::Upload,
            ActivePage::Talents(_) => Tab::Talents,
        }
    }

    fn as_page_mut(&mut self) -> &mut dyn Page {
        match self {
            ActivePage::Conditions(page) => page,
            ActivePage::Upload(page) => page,
            ActivePage::Talents(page) => page,
        }
    }
}

/// Line-input prompts layered over the active page.
enum Mode {
    Normal,
    Search(String),
    Nlp(String),
    Path(String),
    ConfirmDelete { id: i64, name: String },
}

/// Work that may hit the network; the loop draws the loading overlay first.
enum Action {
    Navigate(Tab),
    Refresh,
    GoToPage(u32),
    ConditionSearch(String),
    SubmitForm,
    Delete(i64),
    ParseNlp(String),
    TalentSearch(TalentSearch),
    TalentName(String),
    ShowTalent(i64),
    SelectFile(PathBuf),
    Upload,
}

struct App {
    page_size: u32,
    page: ActivePage,
    conditions_cache: Option<ConditionsCache>,
    mode: Mode,
    status: StatusLine,
    search_debounce: Debouncer<String>,
    quit: bool,
}

impl App {
    fn new(page_size: u32) -> Self {
        Self {
            page_size,
            page: ActivePage::Conditions(ConditionsPage::new(page_size, Box::new(SystemClock))),
            conditions_cache: None,
            mode: Mode::Normal,
            status: StatusLine::default(),
            search_debounce: Debouncer::new(SEARCH_DEBOUNCE),
            quit: false,
        }
    }

    fn activate(&mut self, api: &dyn ScreeningApi) {
        let mut ctx = PageContext::new(api, &mut self.status);
        self.page.as_page_mut().activate(&mut ctx);
    }

    /// Build the target page fresh, tear down the old one. Only the
    /// conditions list cache carries over.
    fn navigate(&mut self, tab: Tab, api: &dyn ScreeningApi) {
        if self.page.tab() == tab {
            return;
        }
        let next = match tab {
            Tab::Conditions => {
                let cache = self
                    .conditions_cache
                    .take()
                    .unwrap_or_else(|| ConditionsCache::new(self.page_size));
                ActivePage::Conditions(ConditionsPage::with_cache(cache, Box::new(SystemClock)))
            }
            Tab::Upload => ActivePage::Upload(UploadPage::new()),
            Tab::Talents => ActivePage::Talents(TalentsPage::new(self.page_size)),
        };
        let mut previous = std::mem::replace(&mut self.page, next);
        previous.as_page_mut().deactivate();
        if let ActivePage::Conditions(page) = previous {
            self.conditions_cache = Some(page.into_cache());
        }
        self.mode = Mode::Normal;
        self.search_debounce.cancel();
        self.activate(api);
    }

    fn perform(&mut self, action: Action, api: &dyn ScreeningApi) {
        if let Action::Navigate(tab) = action {
            self.navigate(tab, api);
            return;
        }
        let mut ctx = PageContext::new(api, &mut self.status);
        match (&mut self.page, action) {
            (ActivePage::Conditions(page), Action::Refresh) => {
                page.refresh(&mut ctx);
            }
            (ActivePage::Conditions(page), Action::GoToPage(n)) => {
                page.go_to_page(n, &mut ctx);
            }
            (ActivePage::Conditions(page), Action::ConditionSearch(text)) => {
                page.set_name_filter(&text, &mut ctx);
            }
            (ActivePage::Conditions(page), Action::SubmitForm) => {
                page.submit_form(&mut ctx);
            }
            (ActivePage::Conditions(page), Action::Delete(id)) => {
                page.delete(id, &mut ctx);
            }
            (ActivePage::Conditions(page), Action::ParseNlp(text)) => {
                page.parse_natural_language(&text, &mut ctx);
            }
            (ActivePage::Talents(page), Action::Refresh) => {
                page.load_data(&mut ctx);
            }
            (ActivePage::Talents(page), Action::GoToPage(n)) => {
                page.go_to_page(n, &mut ctx);
            }
            (ActivePage::Talents(page), Action::TalentSearch(search)) => {
                page.set_search(search, &mut ctx);
            }
            (ActivePage::Talents(page), Action::TalentName(name)) => {
                page.set_name(&name, &mut ctx);
            }
            (ActivePage::Talents(page), Action::ShowTalent(id)) => {
                page.show_detail(id, &mut ctx);
            }
            (ActivePage::Upload(page), Action::Refresh) => {
                page.load_conditions(&mut ctx);
            }
            (ActivePage::Upload(page), Action::SelectFile(path)) => {
                page.select_file(&path, &mut ctx);
            }
            (ActivePage::Upload(page), Action::Upload) => {
                page.submit(&mut ctx);
            }
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Option<Action> {
        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => {}
            Mode::Search(text) => return self.handle_search_key(text, key, now),
            Mode::Nlp(mut text) => {
                return match key.code {
                    KeyCode::Enter => Some(Action::ParseNlp(text)),
                    KeyCode::Esc => None,
                    code => {
                        edit_line(&mut text, code);
                        self.mode = Mode::Nlp(text);
                        None
                    }
                };
            }
            Mode::Path(mut text) => {
                return match key.code {
                    KeyCode::Enter => Some(Action::SelectFile(path_from_drop(&text))),
                    KeyCode::Esc => None,
                    code => {
                        edit_line(&mut text, code);
                        self.mode = Mode::Path(text);
                        None
                    }
                };
            }
            Mode::ConfirmDelete { id, .. } => {
                return match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::Delete(id)),
                    _ => None,
                };
            }
        }

        let has_modal = match &self.page {
            ActivePage::Conditions(page) => page.form().is_some(),
            ActivePage::Talents(page) => page.detail().is_some(),
            ActivePage::Upload(_) => false,
        };
        if !has_modal {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.quit = true;
                    return None;
                }
                KeyCode::Char('1') => return Some(Action::Navigate(Tab::Conditions)),
                KeyCode::Char('2') => return Some(Action::Navigate(Tab::Upload)),
                KeyCode::Char('3') => return Some(Action::Navigate(Tab::Talents)),
                _ => {}
            }
        }

        match &mut self.page {
            ActivePage::Conditions(page) => {
                if let Some(form) = page.form_mut() {
                    if key.code == KeyCode::Esc {
                        page.close_form();
                        return None;
                    }
                    return handle_form_key(form, key);
                }
                match key.code {
                    KeyCode::Down | KeyCode::Char('j') => page.select_next(),
                    KeyCode::Up | KeyCode::Char('k') => page.select_prev(),
                    KeyCode::Char('/') => {
                        self.mode = Mode::Search(page.name_filter().unwrap_or_default().to_string());
                    }
                    KeyCode::Char('n') => page.open_create(),
                    KeyCode::Char('e') => {
                        if let Some(id) = page.selected().map(|c| c.id) {
                            page.open_edit(id);
                        }
                    }
                    KeyCode::Char('d') => {
                        if let Some(c) = page.selected() {
                            self.mode = Mode::ConfirmDelete {
                                id: c.id,
                                name: c.name.clone(),
                            };
                        }
                    }
                    KeyCode::Char('p') => self.mode = Mode::Nlp(String::new()),
                    KeyCode::Char('[') => return Some(Action::GoToPage(page.pagination().prev_page())),
                    KeyCode::Char(']') => return Some(Action::GoToPage(page.pagination().next_page())),
                    KeyCode::Char('r') => return Some(Action::Refresh),
                    _ => {}
                }
                None
            }
            ActivePage::Talents(page) => {
                if page.detail().is_some() {
                    if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                        page.close_detail();
                    }
                    return None;
                }
                match key.code {
                    KeyCode::Down | KeyCode::Char('j') => page.select_next(),
                    KeyCode::Up | KeyCode::Char('k') => page.select_prev(),
                    KeyCode::Char('/') => {
                        self.mode = Mode::Search(page.search().name.clone().unwrap_or_default());
                    }
                    KeyCode::Char('s') => {
                        let mut search = page.search().clone();
                        search.screening_status =
                            cycle(search.screening_status.as_deref(), SCREENING_STATUSES);
                        return Some(Action::TalentSearch(search));
                    }
                    KeyCode::Char('l') => {
                        let mut search = page.search().clone();
                        search.education_level =
                            cycle(search.education_level.as_deref(), EDUCATION_LEVELS);
                        return Some(Action::TalentSearch(search));
                    }
                    KeyCode::Enter => return page.selected().map(|t| Action::ShowTalent(t.id)),
                    KeyCode::Char('[') => return Some(Action::GoToPage(page.pagination().prev_page())),
                    KeyCode::Char(']') => return Some(Action::GoToPage(page.pagination().next_page())),
                    KeyCode::Char('r') => return Some(Action::Refresh),
                    _ => {}
                }
                None
            }
            ActivePage::Upload(page) => {
                match key.code {
                    KeyCode::Char('o') if page.upload_area_visible() => {
                        self.mode = Mode::Path(String::new());
                    }
                    KeyCode::Char('c') => page.cycle_condition(),
                    KeyCode::Char('x') => page.remove_file(),
                    KeyCode::Enter if page.can_submit() => return Some(Action::Upload),
                    KeyCode::Enter if page.result_visible() => page.continue_screening(),
                    KeyCode::Char('r') => return Some(Action::Refresh),
                    _ => {}
                }
                None
            }
        }
    }

    fn handle_search_key(&mut self, mut text: String, key: KeyEvent, now: Instant) -> Option<Action> {
        let debounced = matches!(self.page, ActivePage::Talents(_));
        match key.code {
            KeyCode::Enter => {
                self.search_debounce.cancel();
                if debounced {
                    Some(Action::TalentName(text))
                } else {
                    Some(Action::ConditionSearch(text))
                }
            }
            KeyCode::Esc => {
                self.search_debounce.cancel();
                None
            }
            code => {
                let before = text.clone();
                edit_line(&mut text, code);
                if debounced && text != before {
                    self.search_debounce.push(text.clone(), now);
                }
                self.mode = Mode::Search(text);
                None
            }
        }
    }

    /// Bracketed paste: a file dropped on the terminal arrives as its path.
    fn handle_paste(&mut self, pasted: &str, now: Instant) -> Option<Action> {
        if matches!(self.mode, Mode::Path(_)) {
            self.mode = Mode::Normal;
            return Some(Action::SelectFile(path_from_drop(pasted)));
        }
        let pasted = pasted.trim_end_matches(['\r', '\n']);
        match &mut self.mode {
            Mode::Search(text) => {
                text.push_str(pasted);
                if matches!(self.page, ActivePage::Talents(_)) && !pasted.is_empty() {
                    self.search_debounce.push(text.clone(), now);
                }
                None
            }
            Mode::Nlp(text) => {
                text.push_str(pasted);
                None
            }
            Mode::Path(_) | Mode::ConfirmDelete { .. } => None,
            Mode::Normal => match &self.page {
                ActivePage::Upload(page) if page.upload_area_visible() => {
                    Some(Action::SelectFile(path_from_drop(pasted)))
                }
                _ => None,
            },
        }
    }
}

fn handle_form_key(form: &mut ConditionForm, key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
        return Some(Action::SubmitForm);
    }
    match key.code {
        KeyCode::Tab => form.focus = form.focus.next(),
        KeyCode::BackTab => form.focus = form.focus.prev(),
        _ => {}
    }
    match (form.focus, key.code) {
        (_, KeyCode::Tab | KeyCode::BackTab) => {}
        (FormField::Active, KeyCode::Char(' ')) => form.is_active = !form.is_active,
        (FormField::Education, KeyCode::Left) => form.cycle_education(false),
        (FormField::Education, KeyCode::Right) => form.cycle_education(true),
        (FormField::SchoolTier, KeyCode::Left) => form.cycle_school_tier(false),
        (FormField::SchoolTier, KeyCode::Right) => form.cycle_school_tier(true),
        (FormField::Skills | FormField::Major, code) => {
            if let Some(tags) = form.focused_tags_mut() {
                match code {
                    KeyCode::Enter => {
                        tags.commit();
                    }
                    KeyCode::Left => tags.cursor_left(),
                    KeyCode::Right => tags.cursor_right(),
                    KeyCode::Delete | KeyCode::Backspace if tags.cursor().is_some() => {
                        tags.remove_at_cursor();
                    }
                    KeyCode::Backspace if tags.input().is_empty() => {
                        tags.pop();
                    }
                    KeyCode::Backspace => tags.backspace(),
                    KeyCode::Char(c) => tags.push_char(c),
                    _ => {}
                }
            }
        }
        (_, KeyCode::Enter) => form.focus = form.focus.next(),
        (_, code) => {
            if let Some(text) = form.focused_text_mut() {
                edit_line(text, code);
            }
        }
    }
    None
}

fn edit_line(text: &mut String, code: KeyCode) {
    match code {
        KeyCode::Char(c) => text.push(c),
        KeyCode::Backspace => {
            text.pop();
        }
        _ => {}
    }
}

fn cycle(current: Option<&str>, options: &[&str]) -> Option<String> {
    let index = current.and_then(|c| options.iter().position(|o| *o == c));
    match index {
        None => options.first().map(|o| o.to_string()),
        Some(i) => options.get(i + 1).map(|o| o.to_string()),
    }
}

pub fn run_console(api: &dyn ScreeningApi, page_size: u32) -> Result<()> {
    let mut app = App::new(page_size);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableBracketedPaste)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut app, api);

    // Restore terminal
    stdout().execute(DisableBracketedPaste)?;
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    api: &dyn ScreeningApi,
) -> Result<()> {
    run_action(terminal, app, api, None)?;

    while !app.quit {
        terminal.draw(|frame| draw(frame, app))?;

        let now = Instant::now();
        let timeout = app
            .search_debounce
            .deadline()
            .map(|due| due.saturating_duration_since(now))
            .unwrap_or(IDLE_POLL);

        if event::poll(timeout)? {
            let action = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.status.clear();
                    app.handle_key(key, Instant::now())
                }
                Event::Paste(text) => app.handle_paste(&text, Instant::now()),
                _ => None,
            };
            if let Some(action) = action {
                run_action(terminal, app, api, Some(action))?;
            }
        }

        if let Some(name) = app.search_debounce.poll(Instant::now()) {
            run_action(terminal, app, api, Some(Action::TalentName(name)))?;
        }
    }
    Ok(())
}

/// Draw the loading overlay, then block on the call. `None` activates the
/// current page.
fn run_action(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    api: &dyn ScreeningApi,
    action: Option<Action>,
) -> Result<()> {
    app.status.busy = true;
    terminal.draw(|frame| draw(frame, app))?;
    match action {
        Some(action) => app.perform(action, api),
        None => app.activate(api),
    }
    app.status.busy = false;
    Ok(())
}

fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let titles: Vec<&str> = Tab::ALL.iter().map(|t| t.label()).collect();
    let selected = Tab::ALL
        .iter()
        .position(|t| *t == app.page.tab())
        .unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, chunks[0]);

    match &app.page {
        ActivePage::Conditions(page) => draw_conditions(frame, chunks[1], page),
        ActivePage::Upload(page) => draw_upload(frame, chunks[1], page),
        ActivePage::Talents(page) => draw_talents(frame, chunks[1], page),
    }

    draw_status(frame, chunks[2], &app.status);

    let help = match (&app.page, &app.mode) {
        (_, Mode::Search(_) | Mode::Nlp(_) | Mode::Path(_)) => " Enter:confirm  Esc:cancel",
        (_, Mode::ConfirmDelete { .. }) => " y:delete  any other key:cancel",
        (ActivePage::Conditions(page), _) if page.form().is_some() => {
            " Tab/S-Tab:field  Enter:add tag  \u{2190}/\u{2192}:pick tag  Del:remove tag  Space:toggle  \u{2190}/\u{2192}:choose  C-s:save  Esc:cancel"
        }
        (ActivePage::Conditions(_), _) => {
            " j/k:move  /:search  n:new  e:edit  d:delete  p:describe  [/]:page  r:refresh  1-3:tabs  q:quit"
        }
        (ActivePage::Talents(_), _) => {
            " j/k:move  /:search  s:status  l:education  Enter:detail  [/]:page  r:refresh  1-3:tabs  q:quit"
        }
        (ActivePage::Upload(_), _) => {
            " o:open file (or drop it here)  c:condition  Enter:screen  x:remove  1-3:tabs  q:quit"
        }
    };
    frame.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        chunks[3],
    );

    match &app.mode {
        Mode::Normal => {}
        Mode::Search(text) => draw_prompt(frame, "Search by name", text),
        Mode::Nlp(text) => draw_prompt(frame, "Describe the screening criteria", text),
        Mode::Path(text) => draw_prompt(frame, "Resume path (PDF, DOCX, DOC)", text),
        Mode::ConfirmDelete { name, .. } => {
            draw_prompt(frame, "Confirm", &format!("Delete condition '{}'? (y/n)", name))
        }
    }

    if app.status.busy {
        let area = centered_rect(24, 3, frame.area());
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new("Loading\u{2026}")
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL)),
            area,
        );
    }
}

fn draw_status(frame: &mut Frame, area: Rect, status: &StatusLine) {
    let Some(toast) = &status.toast else {
        return;
    };
    let color = match toast.level {
        Level::Success => Color::Green,
        Level::Info => Color::Cyan,
        Level::Warning => Color::Yellow,
        Level::Error => Color::Red,
    };
    frame.render_widget(
        Paragraph::new(format!(" {}", toast.message)).style(Style::default().fg(color)),
        area,
    );
}

fn draw_conditions(frame: &mut Frame, area: Rect, page: &ConditionsPage) {
    let mut title = format!(" {}  {} ", page.title(), page.pagination().summary());
    if let Some(filter) = page.name_filter() {
        title.push_str(&format!("[name: {}] ", filter));
    }
    let block = Block::default().borders(Borders::ALL).title(title);

    if page.items().is_empty() {
        frame.render_widget(
            Paragraph::new("No conditions found. Press n to create one, or p to describe one in plain words.")
                .block(block)
                .wrap(Wrap { trim: true }),
            area,
        );
    } else {
        let rows = page.items().iter().map(|c| {
            let active = if c.is_active { "yes" } else { "no" };
            let years = c
                .config
                .experience_years
                .map(|y| format!("{}+", y))
                .unwrap_or_else(|| "-".to_string());
            Row::new(vec![
                Cell::from(c.id.to_string()),
                Cell::from(truncate(&c.name, 28)),
                Cell::from(active),
                Cell::from(c.config.education_level.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(years),
                Cell::from(truncate(&c.config.skills.join(", "), 30)),
                Cell::from(format_optional_date(c.created_at.as_deref())),
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(6),
                Constraint::Length(30),
                Constraint::Length(6),
                Constraint::Length(11),
                Constraint::Length(5),
                Constraint::Min(20),
                Constraint::Length(16),
            ],
        )
        .header(
            Row::new(vec!["ID", "NAME", "ACTIVE", "EDUCATION", "EXP", "SKILLS", "CREATED"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(block)
        .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
        let mut state = TableState::default().with_selected(Some(page.selected_index()));
        frame.render_stateful_widget(table, area, &mut state);
    }

    if let Some(form) = page.form() {
        draw_form(frame, form);
    }
}

fn draw_form(frame: &mut Frame, form: &ConditionForm) {
    let area = centered_rect(70, 14, frame.area());
    let title = if form.is_edit() {
        " Edit condition "
    } else {
        " New condition "
    };

    let lines: Vec<Line> = FormField::ALL
        .iter()
        .map(|field| {
            let value = match field {
                FormField::Name => form.name.clone(),
                FormField::Description => form.description.clone(),
                FormField::Active => if form.is_active { "[x]" } else { "[ ]" }.to_string(),
                FormField::Education => select_label(form.education_level.as_deref()),
                FormField::Experience => form.experience_years.clone(),
                FormField::SchoolTier => select_label(form.school_tier.as_deref()),
                FormField::Skills => tag_line(&form.skills),
                FormField::Major => tag_line(&form.major),
            };
            let focused = *field == form.focus;
            let marker = if focused { "> " } else { "  " };
            let style = if focused {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{}{:<20}", marker, field.label()), style),
                Span::raw(value),
            ])
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn select_label(value: Option<&str>) -> String {
    format!("< {} >", value.unwrap_or("any"))
}

/// Chips in brackets, the one under the cursor in angle brackets, then
/// the text buffer.
fn tag_line(tags: &TagInput) -> String {
    let mut line = tags
        .chips()
        .iter()
        .enumerate()
        .map(|(i, chip)| {
            if tags.cursor() == Some(i) {
                format!("<{}>", chip)
            } else {
                format!("[{}]", chip)
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    if !line.is_empty() {
        line.push(' ');
    }
    line.push_str(tags.input());
    if tags.cursor().is_none() {
        line.push('_');
    }
    line
}

fn draw_talents(frame: &mut Frame, area: Rect, page: &TalentsPage) {
    let search = page.search();
    let mut title = format!(" {}  {} ", page.title(), page.pagination().summary());
    for (label, value) in [
        ("name", &search.name),
        ("education", &search.education_level),
        ("status", &search.screening_status),
    ] {
        if let Some(value) = value {
            title.push_str(&format!("[{}: {}] ", label, value));
        }
    }
    let block = Block::default().borders(Borders::ALL).title(title);

    if page.items().is_empty() {
        frame.render_widget(
            Paragraph::new("No talents match the current filters.").block(block),
            area,
        );
    } else {
        let rows = page.items().iter().map(|t| {
            let status_style = match t.screening_status.as_deref() {
                Some("qualified") => Style::default().fg(Color::Green),
                Some("unqualified") => Style::default().fg(Color::Red),
                Some("pending") => Style::default().fg(Color::Yellow),
                _ => Style::default(),
            };
            Row::new(vec![
                Cell::from(t.id.to_string()),
                Cell::from(truncate(&t.name, 18)),
                Cell::from(t.education_level.clone().unwrap_or_else(|| "-".to_string())),
                Cell::from(truncate(t.school.as_deref().unwrap_or("-"), 22)),
                Cell::from(truncate(t.major.as_deref().unwrap_or("-"), 20)),
                Cell::from(t.work_years.map(|y| format!("{:.1}", y)).unwrap_or_else(|| "-".to_string())),
                Cell::from(t.screening_status.clone().unwrap_or_else(|| "-".to_string())).style(status_style),
                Cell::from(format_optional_date(t.updated_at.as_deref())),
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(6),
                Constraint::Length(20),
                Constraint::Length(11),
                Constraint::Length(24),
                Constraint::Min(12),
                Constraint::Length(6),
                Constraint::Length(12),
                Constraint::Length(16),
            ],
        )
        .header(
            Row::new(vec!["ID", "NAME", "EDUCATION", "SCHOOL", "MAJOR", "YEARS", "STATUS", "UPDATED"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(block)
        .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
        let mut state = TableState::default().with_selected(Some(page.selected_index()));
        frame.render_stateful_widget(table, area, &mut state);
    }

    if let Some(talent) = page.detail() {
        let area = centered_rect(72, 18, frame.area());
        let field = |label: &str, value: Option<&str>| {
            Line::from(vec![
                Span::styled(format!("{:<16}", label), Style::default().fg(Color::Cyan)),
                Span::raw(value.unwrap_or("-").to_string()),
            ])
        };
        let years = talent.work_years.map(|y| format!("{:.1}", y));
        let mut lines = vec![
            Line::from(Span::styled(
                talent.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            field("Education", talent.education_level.as_deref()),
            field("School", talent.school.as_deref()),
            field("Major", talent.major.as_deref()),
            field("Work years", years.as_deref()),
            field("Graduated", talent.graduation_date.as_deref()),
            field("Phone", talent.phone.as_deref()),
            field("Email", talent.email.as_deref()),
            field("Status", talent.screening_status.as_deref()),
            field(
                "Screened",
                Some(format_optional_date(talent.screening_date.as_deref()).as_str()),
            ),
            Line::from(""),
            Line::from(Span::styled("Skills", Style::default().add_modifier(Modifier::BOLD))),
        ];
        for line in textwrap::fill(&talent.skills.join(", "), 66).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }

        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Talent ")),
            area,
        );
    }
}

fn draw_upload(frame: &mut Frame, area: Rect, page: &UploadPage) {
    let condition = match (page.condition_id(), page.selected_condition()) {
        (Some(id), Some(c)) => format!("#{} {}", id, c.name),
        _ => "none (parse only)".to_string(),
    };
    let hint = format!("  (c to change, {} active)", page.conditions().len());

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Condition: ", Style::default().fg(Color::Cyan)),
            Span::raw(condition),
            Span::styled(hint, Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
    ];

    if page.upload_area_visible() {
        lines.push(Line::from("Press o to choose a resume, or drop a file onto this window."));
        lines.push(Line::from(Span::styled(
            "PDF, DOCX or DOC, up to 10 MB",
            Style::default().fg(Color::DarkGray),
        )));
    }

    if page.file_info_visible() {
        let summary = page.file_summary().unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled("File: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(summary),
        ]));
        match page.state() {
            UploadState::Submitting(_) => lines.push(Line::from("Screening\u{2026}")),
            _ => lines.push(Line::from("Enter: screen this resume   x: remove")),
        }
    }

    if let Some(result) = page.result() {
        let (verdict, color) = if result.is_qualified {
            ("QUALIFIED", Color::Green)
        } else {
            ("NOT QUALIFIED", Color::Red)
        };
        lines.push(Line::from(Span::styled(
            verdict,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        if let Some(summary) = page.file_summary() {
            lines.push(Line::from(format!("File:            {}", summary)));
        }
        if let Some(id) = result.talent_id {
            lines.push(Line::from(format!("Talent:          #{}", id)));
        }
        if let Some(status) = &result.workflow_status {
            lines.push(Line::from(format!("Workflow status: {}", status)));
        }
        if let Some(secs) = result.processing_time {
            lines.push(Line::from(format!("Processing time: {:.2}s", secs)));
        }
        if let Some(reason) = &result.qualification_reason {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Reason",
                Style::default().add_modifier(Modifier::BOLD),
            )));
            for line in textwrap::fill(reason, 80).lines() {
                lines.push(Line::from(format!("  {}", line)));
            }
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter or x: screen another resume",
            Style::default().fg(Color::DarkGray),
        )));
    }

    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(format!(" {} ", page.title())))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_prompt(frame: &mut Frame, title: &str, text: &str) {
    let area = centered_rect(60, 3, frame.area());
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(format!("{}_", text))
            .block(Block::default().borders(Borders::ALL).title(format!(" {} ", title))),
        area,
    );
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
