//! Shared domain models.

use std::fmt;

/// Event identifier used as a placeholder for customers without a booking.
pub const NO_EVENT_ID: i64 = 0;

/// A listed event with a fixed seat pool.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Caller-assigned identifier. Not checked for collisions.
    pub id: i64,
    /// Display name of the event.
    pub name: String,
    /// Venue.
    pub location: String,
    /// Free-form date text.
    pub date: String,
    /// Free-form time text.
    pub time: String,
    /// Ticket price.
    pub price: f64,
    /// Capacity of the seat pool.
    pub total_seats: u32,
    /// Seats already sold. Only ever increases.
    pub booked_seats: u32,
}

impl Event {
    /// Seats still available for booking, clamped at zero when the stored counts are inconsistent.
    pub fn remaining_seats(&self) -> u32 {
        self.total_seats.saturating_sub(self.booked_seats)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {}, Name: {}, Venue: {}, Date: {}, Time: {}, Price: {}, Booked: {}, Available: {}",
            self.id,
            self.name,
            self.location,
            self.date,
            self.time,
            self.price,
            self.booked_seats,
            self.remaining_seats()
        )
    }
}

/// Input for creating a new [`Event`].
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub struct EventDraft {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub price: f64,
    pub total_seats: u32,
}

impl From<EventDraft> for Event {
    fn from(draft: EventDraft) -> Self {
        Self {
            id: draft.id,
            name: draft.name,
            location: draft.location,
            date: draft.date,
            time: draft.time,
            price: draft.price,
            total_seats: draft.total_seats,
            booked_seats: 0,
        }
    }
}

/// A registered customer holding at most one booking.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    /// Full name.
    pub name: String,
    /// National identity number, the customer's key.
    pub cnic: String,
    /// Phone or email, free-form.
    pub contact: String,
    /// Name of the booked event as it was at booking time.
    pub booked_event: String,
    /// Booked event id, [`NO_EVENT_ID`] when nothing is booked.
    pub event_id: i64,
    /// Seats held by the current booking.
    pub seats_booked: u32,
    /// Set once the current booking is paid.
    pub payment_done: bool,
    /// `YYYY-MM-DD` date the current booking was made.
    pub booking_date: String,
}

impl Customer {
    /// Fresh registration with an empty booking slot.
    pub fn new(
        name: impl Into<String>,
        cnic: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            cnic: cnic.into(),
            contact: contact.into(),
            booked_event: String::new(),
            event_id: NO_EVENT_ID,
            seats_booked: 0,
            payment_done: false,
            booking_date: String::new(),
        }
    }

    /// Whether the booking slot currently references an event.
    pub fn has_booking(&self) -> bool {
        self.event_id != NO_EVENT_ID
    }

    /// Replace the booking slot. Any previous booking and its payment state are discarded.
    pub fn assign_booking(&mut self, event: &Event, seats: u32, booking_date: String) {
        self.booked_event = event.name.clone();
        self.event_id = event.id;
        self.seats_booked = seats;
        self.payment_done = false;
        self.booking_date = booking_date;
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name: {}, CNIC: {}, Contact: {}, Event: {}, Seats: {}, Paid: {}, Booking Date: {}",
            self.name,
            self.cnic,
            self.contact,
            self.booked_event,
            self.seats_booked,
            if self.payment_done { "Yes" } else { "No" },
            self.booking_date
        )
    }
}
