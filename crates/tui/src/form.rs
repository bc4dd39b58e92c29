//! Modal input forms for the mutating menu commands.

use std::{fmt, str::FromStr};

use eventdesk_core::EventDraft;

const MAX_FIELD_LEN: usize = 64;

/// Single-line text input with a character cursor.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.char_len() as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, len) as usize;
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    pub fn insert(&mut self, ch: char) {
        if ch.is_control() || self.char_len() >= MAX_FIELD_LEN {
            return;
        }
        let offset = self.byte_offset(self.cursor);
        self.value.insert(offset, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let offset = self.byte_offset(self.cursor);
        self.value.remove(offset);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let offset = self.byte_offset(self.cursor);
            self.value.remove(offset);
        }
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(offset, _)| offset)
            .unwrap_or(self.value.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    AddEvent,
    RegisterCustomer,
    BookEvent,
    PayForBooking,
}

impl FormKind {
    pub fn title(self) -> &'static str {
        match self {
            FormKind::AddEvent => "Add Event",
            FormKind::RegisterCustomer => "Register Customer",
            FormKind::BookEvent => "Book Event",
            FormKind::PayForBooking => "Pay for Booking",
        }
    }

    fn labels(self) -> &'static [&'static str] {
        match self {
            FormKind::AddEvent => &[
                "Event ID",
                "Event Name",
                "Venue",
                "Date",
                "Time",
                "Ticket Price",
                "Total Seats",
            ],
            FormKind::RegisterCustomer => &["Name", "CNIC", "Contact"],
            FormKind::BookEvent => &["CNIC", "Event ID", "Number of tickets (max 5)"],
            FormKind::PayForBooking => &["CNIC"],
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub input: TextInput,
}

/// Parsed, ready-to-run form submission.
#[derive(Debug, Clone, PartialEq)]
pub enum FormRequest {
    AddEvent(EventDraft),
    RegisterCustomer {
        name: String,
        cnic: String,
        contact: String,
    },
    BookEvent {
        cnic: String,
        event_id: i64,
        seats: u32,
    },
    PayForBooking {
        cnic: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub label: &'static str,
    pub expected: &'static str,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid {}: expected {}", self.label, self.expected)
    }
}

#[derive(Debug, Clone)]
pub struct FormModal {
    kind: FormKind,
    fields: Vec<FormField>,
    focus: usize,
}

impl FormModal {
    pub fn new(kind: FormKind) -> Self {
        let fields = kind
            .labels()
            .iter()
            .copied()
            .map(|label| FormField {
                label,
                input: TextInput::default(),
            })
            .collect();
        Self {
            kind,
            fields,
            focus: 0,
        }
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn focus_next(&mut self) {
        if self.focus + 1 < self.fields.len() {
            self.focus += 1;
        }
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.saturating_sub(1);
    }

    pub fn on_last_field(&self) -> bool {
        self.focus + 1 >= self.fields.len()
    }

    pub fn focused_input(&mut self) -> Option<&mut TextInput> {
        self.fields.get_mut(self.focus).map(|field| &mut field.input)
    }

    /// Validate the numeric fields and build the request. Text fields are taken verbatim.
    pub fn parse(&self) -> Result<FormRequest, FieldError> {
        let request = match self.kind {
            FormKind::AddEvent => FormRequest::AddEvent(EventDraft {
                id: self.number(0, "a whole number")?,
                name: self.text(1),
                location: self.text(2),
                date: self.text(3),
                time: self.text(4),
                price: self.price(5)?,
                total_seats: self.number(6, "a non-negative whole number")?,
            }),
            FormKind::RegisterCustomer => FormRequest::RegisterCustomer {
                name: self.text(0),
                cnic: self.text(1),
                contact: self.text(2),
            },
            FormKind::BookEvent => FormRequest::BookEvent {
                cnic: self.text(0),
                event_id: self.number(1, "a whole number")?,
                seats: self.number(2, "a whole number of tickets")?,
            },
            FormKind::PayForBooking => FormRequest::PayForBooking { cnic: self.text(0) },
        };
        Ok(request)
    }

    fn text(&self, index: usize) -> String {
        self.fields
            .get(index)
            .map(|field| field.input.value().to_string())
            .unwrap_or_default()
    }

    fn number<T: FromStr>(&self, index: usize, expected: &'static str) -> Result<T, FieldError> {
        self.text(index)
            .trim()
            .parse()
            .map_err(|_| self.field_error(index, expected))
    }

    fn price(&self, index: usize) -> Result<f64, FieldError> {
        let expected = "a decimal amount";
        let value: f64 = self.number(index, expected)?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.field_error(index, expected))
        }
    }

    fn field_error(&self, index: usize, expected: &'static str) -> FieldError {
        FieldError {
            label: self.fields.get(index).map(|field| field.label).unwrap_or("field"),
            expected,
        }
    }
}
