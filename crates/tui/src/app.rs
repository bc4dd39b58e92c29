use std::{cmp, io, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use eventdesk_core::{list_customers, list_events, BookingDesk, BookingError, BookingResult};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::{error, info, warn};

use crate::form::{FormKind, FormModal, FormRequest, TextInput};

const TICK_RATE: Duration = Duration::from_millis(250);

const MENU_ITEMS: [&str; 7] = [
    "Add Event",
    "Register Customer",
    "Book Event",
    "Pay for Booking",
    "Show All Events",
    "Show All Customers",
    "Exit",
];

#[derive(Debug, Clone)]
struct Theme {
    accent: Color,
    primary_fg: Color,
    muted: Color,
    success: Color,
    error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            primary_fg: Color::White,
            muted: Color::DarkGray,
            success: Color::Green,
            error: Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Menu,
    Events,
    Customers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusKind {
    Info,
    Success,
    Failure,
}

/// Terminal front end over a [`BookingDesk`].
pub struct EventDeskApp {
    desk: BookingDesk,
    screen: Screen,
    form: Option<FormModal>,
    menu_cursor: usize,
    list_offset: usize,
    list_height: usize,
    status: String,
    status_kind: StatusKind,
    should_quit: bool,
    theme: Theme,
}

impl EventDeskApp {
    pub fn new(desk: BookingDesk) -> Self {
        let status = format!(
            "Loaded {} events and {} customers",
            desk.events().len(),
            desk.customers().len()
        );
        Self {
            desk,
            screen: Screen::Menu,
            form: None,
            menu_cursor: 0,
            list_offset: 0,
            list_height: 1,
            status,
            status_kind: StatusKind::Info,
            should_quit: false,
            theme: Theme::default(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);
        restore_terminal(&mut terminal)?;
        info!("Exiting");
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;
            if event::poll(TICK_RATE).context("failed to poll terminal events")? {
                let event = event::read().context("failed to read terminal event")?;
                self.handle_event(event);
            }
        }
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                self.handle_key(key);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if self.form.is_some() {
            self.handle_form_key(key);
            return;
        }
        match self.screen {
            Screen::Menu => self.handle_menu_key(key),
            Screen::Events | Screen::Customers => self.handle_list_key(key),
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Char('j') | KeyCode::Down => self.move_menu_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_menu_cursor(-1),
            KeyCode::Enter => self.activate_menu_item(self.menu_cursor),
            KeyCode::Char(ch) => {
                if let Some(digit) = ch.to_digit(10) {
                    match (digit as usize)
                        .checked_sub(1)
                        .filter(|index| *index < MENU_ITEMS.len())
                    {
                        Some(index) => {
                            self.menu_cursor = index;
                            self.activate_menu_item(index);
                        }
                        None => {
                            self.set_status("Invalid choice!".to_string(), StatusKind::Failure)
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn move_menu_cursor(&mut self, delta: isize) {
        let len = MENU_ITEMS.len() as isize;
        self.menu_cursor = (self.menu_cursor as isize + delta).rem_euclid(len) as usize;
    }

    fn activate_menu_item(&mut self, index: usize) {
        match index {
            0 => self.open_form(FormKind::AddEvent),
            1 => self.open_form(FormKind::RegisterCustomer),
            2 => self.open_form(FormKind::BookEvent),
            3 => self.open_form(FormKind::PayForBooking),
            4 => self.open_list(Screen::Events),
            5 => self.open_list(Screen::Customers),
            6 => self.should_quit = true,
            _ => {}
        }
    }

    fn open_form(&mut self, kind: FormKind) {
        self.form = Some(FormModal::new(kind));
        self.set_status(
            format!("{}: Enter to continue, Esc to cancel", kind.title()),
            StatusKind::Info,
        );
    }

    fn open_list(&mut self, screen: Screen) {
        self.screen = screen;
        self.list_offset = 0;
        self.set_status("Esc to return to the menu".to_string(), StatusKind::Info);
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        let total = self.list_lines().len();
        let max_offset = total.saturating_sub(self.list_height.max(1));
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Backspace => {
                self.screen = Screen::Menu;
                self.set_status("Returned to main menu".to_string(), StatusKind::Info);
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.list_offset = cmp::min(self.list_offset + 1, max_offset);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.list_offset = self.list_offset.saturating_sub(1);
            }
            KeyCode::PageDown => {
                self.list_offset = cmp::min(self.list_offset + self.list_height, max_offset);
            }
            KeyCode::PageUp => {
                self.list_offset = self.list_offset.saturating_sub(self.list_height);
            }
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        let mut submit = false;
        match key.code {
            KeyCode::Esc => {
                let title = form.kind().title();
                self.form = None;
                self.set_status(format!("{title} cancelled"), StatusKind::Info);
                return;
            }
            KeyCode::Enter => {
                if form.on_last_field() {
                    submit = true;
                } else {
                    form.focus_next();
                }
            }
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Left => edit(form, |input| input.move_cursor(-1)),
            KeyCode::Right => edit(form, |input| input.move_cursor(1)),
            KeyCode::Home => edit(form, TextInput::move_home),
            KeyCode::End => edit(form, TextInput::move_end),
            KeyCode::Backspace => edit(form, TextInput::backspace),
            KeyCode::Delete => edit(form, TextInput::delete),
            KeyCode::Char(ch) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    edit(form, |input| input.insert(ch));
                }
            }
            _ => {}
        }

        if submit {
            self.submit_form();
        }
    }

    fn submit_form(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        match form.parse() {
            Ok(request) => {
                self.form = None;
                self.apply_request(request);
            }
            Err(err) => {
                self.set_status(err.to_string(), StatusKind::Failure);
            }
        }
    }

    fn apply_request(&mut self, request: FormRequest) {
        let outcome: BookingResult<String> = match request {
            FormRequest::AddEvent(draft) => self
                .desk
                .add_event(draft)
                .map(|_| "Event Added Successfully.".to_string()),
            FormRequest::RegisterCustomer {
                name,
                cnic,
                contact,
            } => self
                .desk
                .register_customer(&name, &cnic, &contact)
                .map(|_| "Customer Registered Successfully.".to_string()),
            FormRequest::BookEvent {
                cnic,
                event_id,
                seats,
            } => self
                .desk
                .book_event(&cnic, event_id, seats)
                .map(|receipt| {
                    format!(
                        "Booking Successful! {} seat(s) for {} on {} ({} left)",
                        receipt.seats,
                        receipt.event_name,
                        receipt.booking_date,
                        receipt.remaining_seats
                    )
                }),
            FormRequest::PayForBooking { cnic } => self
                .desk
                .pay_for_booking(&cnic)
                .map(|_| "Payment successful. Status updated to Paid.".to_string()),
        };

        match outcome {
            Ok(message) => self.set_status(message, StatusKind::Success),
            Err(err) => self.report_failure(err),
        }
    }

    fn report_failure(&mut self, err: BookingError) {
        if err.is_rejection() {
            warn!(reason = %err, ?err, "Operation rejected");
            self.set_status(err.to_string(), StatusKind::Failure);
        } else {
            error!(?err, "Operation failed");
            self.set_status(format!("Error: {err}"), StatusKind::Failure);
        }
    }

    fn set_status(&mut self, message: String, kind: StatusKind) {
        self.status = message;
        self.status_kind = kind;
    }

    fn list_lines(&self) -> Vec<String> {
        match self.screen {
            Screen::Events => list_events(self.desk.events()),
            Screen::Customers => list_customers(self.desk.customers()),
            Screen::Menu => Vec::new(),
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(3)])
            .split(area);

        match self.screen {
            Screen::Menu => self.draw_menu(frame, layout[0]),
            Screen::Events => self.draw_list(frame, layout[0], "All Events"),
            Screen::Customers => self.draw_list(frame, layout[0], "All Customers"),
        }
        self.render_status(frame, layout[1]);
        if let Some(form) = &self.form {
            self.render_form(frame, form);
        }
    }

    fn draw_menu(&self, frame: &mut Frame, area: Rect) {
        let menu_height = (MENU_ITEMS.len() as u16 + 4).min(area.height);
        let menu_width = 36.min(area.width.max(1));
        let menu_area = centered_rect(menu_width, menu_height, area);

        let mut lines: Vec<Line> = MENU_ITEMS
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                if idx == self.menu_cursor {
                    Line::from(Span::styled(
                        format!("▶ {}. {item}", idx + 1),
                        Style::default()
                            .fg(self.theme.accent)
                            .add_modifier(Modifier::BOLD),
                    ))
                } else {
                    Line::from(Span::styled(
                        format!("  {}. {item}", idx + 1),
                        Style::default().fg(self.theme.primary_fg),
                    ))
                }
            })
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(
                "{} events · {} customers",
                self.desk.events().len(),
                self.desk.customers().len()
            ),
            Style::default().fg(self.theme.muted),
        )));

        let menu = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Event Management System"),
        );
        frame.render_widget(menu, menu_area);
    }

    fn draw_list(&mut self, frame: &mut Frame, area: Rect, title: &str) {
        self.list_height = area.height.saturating_sub(2) as usize;
        let lines: Vec<Line> = self
            .list_lines()
            .into_iter()
            .map(|line| Line::from(Span::styled(line, Style::default().fg(self.theme.primary_fg))))
            .collect();
        let total = lines.len();
        self.list_offset = cmp::min(self.list_offset, total.saturating_sub(1));

        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("--- {title} ---")),
            )
            .wrap(Wrap { trim: false })
            .scroll((self.list_offset as u16, 0));
        frame.render_widget(paragraph, area);
    }

    fn render_form(&self, frame: &mut Frame, form: &FormModal) {
        let frame_area = frame.size();
        let mut width = cmp::min(64_u16, frame_area.width.saturating_sub(4));
        width = cmp::max(width, 24_u16);
        let height = (form.fields().len() as u16 * 2 + 4)
            .min(frame_area.height.saturating_sub(2))
            .max(5_u16);
        let area = centered_rect(width, height, frame_area);

        frame.render_widget(Clear, area);

        let mut lines = Vec::new();
        let mut cursor = None;
        for (idx, field) in form.fields().iter().enumerate() {
            let focused = idx == form.focus();
            let label_style = if focused {
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.muted)
            };
            lines.push(Line::from(Span::styled(format!("{}:", field.label), label_style)));
            lines.push(Line::from(vec![
                Span::styled("> ", Style::default().fg(self.theme.accent)),
                Span::raw(field.input.value().to_string()),
            ]));
            if focused {
                cursor = Some((lines.len() - 1, field.input.cursor()));
            }
        }
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" next/submit  "),
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" move  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" cancel"),
        ]));

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(form.kind().title()),
        );
        frame.render_widget(paragraph, area);

        if let Some((row, col)) = cursor {
            let cursor_x = (area.x + 3 + col as u16).min(area.x + area.width.saturating_sub(2));
            let cursor_y = (area.y + 1 + row as u16).min(area.y + area.height.saturating_sub(2));
            frame.set_cursor(cursor_x, cursor_y);
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let color = match self.status_kind {
            StatusKind::Info => self.theme.primary_fg,
            StatusKind::Success => self.theme.success,
            StatusKind::Failure => self.theme.error,
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(
            self.status.clone(),
            Style::default().fg(color),
        )))
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn edit(form: &mut FormModal, action: impl FnOnce(&mut TextInput)) {
    if let Some(input) = form.focused_input() {
        action(input);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
