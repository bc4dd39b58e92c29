//! Booking engine: registration, event creation, seat allocation and payment.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use tracing::{error, info};

use crate::{
    config::AppConfig,
    error::{BookingError, BookingResult},
    models::{Customer, Event, EventDraft},
    persistence::FlatFile,
    store::RecordStore,
};

/// Most tickets a single booking may hold.
pub const MAX_TICKETS_PER_BOOKING: u32 = 5;

/// Format used to stamp booking dates.
pub const BOOKING_DATE_FORMAT: &str = "%Y-%m-%d";

/// Locations of the two backing data files.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPaths {
    /// Event file.
    pub events: PathBuf,
    /// Customer file.
    pub customers: PathBuf,
}

impl DataPaths {
    /// Resolve both files from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            events: config.events_path(),
            customers: config.customers_path(),
        }
    }
}

/// Summary of a successful booking.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingReceipt {
    /// Booked event id.
    pub event_id: i64,
    /// Booked event name.
    pub event_name: String,
    /// Seats allocated.
    pub seats: u32,
    /// Seats left on the event afterwards.
    pub remaining_seats: u32,
    /// Date stamped on the customer's booking.
    pub booking_date: String,
}

type Clock = Box<dyn Fn() -> NaiveDate>;

/// Owner of the event and customer lists and their backing files.
///
/// Every mutation is written to disk before it becomes visible in memory, so a
/// failed write leaves both the lists and the files as they were.
pub struct BookingDesk {
    pub(crate) events: RecordStore<Event>,
    pub(crate) customers: RecordStore<Customer>,
    events_file: FlatFile,
    customers_file: FlatFile,
    clock: Clock,
}

impl BookingDesk {
    /// Load both stores from disk. Missing files start empty.
    pub fn open(paths: &DataPaths) -> Result<Self> {
        let events_file = FlatFile::new(&paths.events);
        let customers_file = FlatFile::new(&paths.customers);
        let events = RecordStore::from(events_file.load::<Event>()?);
        let customers = RecordStore::from(customers_file.load::<Customer>()?);
        info!(
            events = events.len(),
            customers = customers.len(),
            "Booking desk loaded"
        );
        Ok(Self {
            events,
            customers,
            events_file,
            customers_file,
            clock: Box::new(|| Local::now().date_naive()),
        })
    }

    /// Replace the date source used to stamp bookings.
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDate + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// All events in insertion order.
    pub fn events(&self) -> &[Event] {
        self.events.as_slice()
    }

    /// All customers in registration order.
    pub fn customers(&self) -> &[Customer] {
        self.customers.as_slice()
    }

    /// Add an event with no seats booked.
    ///
    /// Ids are not checked for uniqueness. When several events share an id,
    /// lookups and bookings resolve to the one added first.
    pub fn add_event(&mut self, draft: EventDraft) -> BookingResult<Event> {
        let event = Event::from(draft);
        let mut events = self.events.clone();
        events.push(event.clone());
        self.events_file.save(events.as_slice())?;
        self.events = events;

        info!(event_id = event.id, name = %event.name, total_seats = event.total_seats, "Event added");
        Ok(event)
    }

    /// Register a customer under a CNIC no one else holds.
    pub fn register_customer(
        &mut self,
        name: &str,
        cnic: &str,
        contact: &str,
    ) -> BookingResult<Customer> {
        if self.customers.contains(|customer| customer.cnic == cnic) {
            return Err(BookingError::DuplicateCnic {
                cnic: cnic.to_string(),
            });
        }

        let customer = Customer::new(name, cnic, contact);
        let mut customers = self.customers.clone();
        customers.push(customer.clone());
        self.customers_file.save(customers.as_slice())?;
        self.customers = customers;

        info!(cnic = %customer.cnic, "Customer registered");
        Ok(customer)
    }

    /// Allocate `seats` on event `event_id` to the customer holding `cnic`.
    ///
    /// The customer's previous booking, if any, is replaced and marked unpaid.
    /// Seats from a replaced booking are not returned to their event.
    pub fn book_event(
        &mut self,
        cnic: &str,
        event_id: i64,
        seats: u32,
    ) -> BookingResult<BookingReceipt> {
        if !self.customers.contains(|customer| customer.cnic == cnic) {
            return Err(BookingError::CustomerNotRegistered {
                cnic: cnic.to_string(),
            });
        }

        let mut events = self.events.clone();
        let event = events
            .find_mut(|event| event.id == event_id)
            .ok_or(BookingError::EventNotFound { event_id })?;
        validate_seat_request(seats, event.remaining_seats())?;
        event.booked_seats += seats;
        let event = event.clone();

        let booking_date = (self.clock)().format(BOOKING_DATE_FORMAT).to_string();
        let mut customers = self.customers.clone();
        if let Some(customer) = customers.find_mut(|customer| customer.cnic == cnic) {
            customer.assign_booking(&event, seats, booking_date.clone());
        }

        self.commit_booking(events, customers)?;

        info!(cnic, event_id, seats, remaining = event.remaining_seats(), "Seats booked");
        Ok(BookingReceipt {
            event_id,
            event_name: event.name.clone(),
            seats,
            remaining_seats: event.remaining_seats(),
            booking_date,
        })
    }

    /// Mark the customer's booking as paid.
    ///
    /// Customers without a booking can still be marked paid.
    pub fn pay_for_booking(&mut self, cnic: &str) -> BookingResult<Customer> {
        let mut customers = self.customers.clone();
        let customer = customers
            .find_mut(|customer| customer.cnic == cnic)
            .ok_or_else(|| BookingError::CustomerNotFound {
                cnic: cnic.to_string(),
            })?;
        if customer.payment_done {
            return Err(BookingError::AlreadyPaid {
                cnic: cnic.to_string(),
            });
        }
        customer.payment_done = true;
        let customer = customer.clone();

        self.customers_file.save(customers.as_slice())?;
        self.customers = customers;

        info!(cnic, event_id = customer.event_id, "Payment recorded");
        Ok(customer)
    }

    fn commit_booking(
        &mut self,
        events: RecordStore<Event>,
        customers: RecordStore<Customer>,
    ) -> BookingResult<()> {
        self.events_file.save(events.as_slice())?;
        if let Err(err) = self.customers_file.save(customers.as_slice()) {
            if let Err(restore_err) = self.events_file.save(self.events.as_slice()) {
                error!(
                    ?restore_err,
                    path = %self.events_file.path().display(),
                    "Failed to restore event file after customer write failure"
                );
            }
            return Err(err.into());
        }
        self.events = events;
        self.customers = customers;
        Ok(())
    }
}

/// Check a seat request against the ticket cap and the seats left.
pub fn validate_seat_request(seats: u32, remaining: u32) -> BookingResult<()> {
    if seats == 0 || seats > MAX_TICKETS_PER_BOOKING {
        return Err(BookingError::TicketLimitExceeded {
            requested: seats,
            max: MAX_TICKETS_PER_BOOKING,
        });
    }
    if seats > remaining {
        return Err(BookingError::InsufficientSeats {
            requested: seats,
            remaining,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn fixed_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date")
    }

    fn open_desk(dir: &TempDir) -> Result<BookingDesk> {
        let paths = DataPaths {
            events: dir.path().join("event_data.txt"),
            customers: dir.path().join("customer_data.txt"),
        };
        Ok(BookingDesk::open(&paths)?.with_clock(fixed_date))
    }

    fn draft(id: i64, name: &str, total_seats: u32) -> EventDraft {
        EventDraft {
            id,
            name: name.to_string(),
            location: "Expo Centre".to_string(),
            date: "2026-12-01".to_string(),
            time: "18:00".to_string(),
            price: 1500.0,
            total_seats,
        }
    }

    #[test]
    fn added_event_starts_with_every_seat_free() -> Result<()> {
        let dir = tempdir()?;
        let mut desk = open_desk(&dir)?;
        let event = desk.add_event(draft(1, "Concert", 10))?;
        assert_eq!(event.remaining_seats(), 10);
        assert_eq!(desk.events().len(), 1);
        Ok(())
    }

    #[test]
    fn duplicate_cnic_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let mut desk = open_desk(&dir)?;
        desk.register_customer("Ali", "12345", "0300")?;

        let err = desk
            .register_customer("Someone Else", "12345", "0301")
            .unwrap_err();
        assert!(matches!(err, BookingError::DuplicateCnic { .. }));
        assert_eq!(desk.customers().len(), 1);
        assert_eq!(desk.customers()[0].name, "Ali");
        Ok(())
    }

    #[test]
    fn booking_scenario() -> Result<()> {
        let dir = tempdir()?;
        let mut desk = open_desk(&dir)?;
        desk.add_event(draft(1, "Concert", 10))?;
        desk.register_customer("Ali", "12345", "0300")?;

        let receipt = desk.book_event("12345", 1, 3)?;
        assert_eq!(receipt.remaining_seats, 7);
        assert_eq!(receipt.booking_date, "2026-10-16");
        assert_eq!(desk.events()[0].booked_seats, 3);
        let customer = &desk.customers()[0];
        assert_eq!(customer.seats_booked, 3);
        assert_eq!(customer.booked_event, "Concert");
        assert!(!customer.payment_done);

        let paid = desk.pay_for_booking("12345")?;
        assert!(paid.payment_done);

        let err = desk.book_event("12345", 1, 8).unwrap_err();
        assert!(matches!(err, BookingError::TicketLimitExceeded { .. }));
        assert_eq!(desk.events()[0].booked_seats, 3);
        assert!(desk.customers()[0].payment_done);
        Ok(())
    }

    #[test]
    fn ticket_cap_applies_even_with_free_seats() -> Result<()> {
        let dir = tempdir()?;
        let mut desk = open_desk(&dir)?;
        desk.add_event(draft(1, "Concert", 100))?;
        desk.register_customer("Ali", "12345", "0300")?;

        for seats in [0, 6] {
            let err = desk.book_event("12345", 1, seats).unwrap_err();
            assert!(matches!(err, BookingError::TicketLimitExceeded { .. }));
        }
        assert_eq!(desk.events()[0].booked_seats, 0);
        assert!(!desk.customers()[0].has_booking());
        Ok(())
    }

    #[test]
    fn cannot_book_more_than_remaining() -> Result<()> {
        let dir = tempdir()?;
        let mut desk = open_desk(&dir)?;
        desk.add_event(draft(1, "Small Room", 4))?;
        desk.register_customer("Ali", "1", "0300")?;
        desk.register_customer("Sara", "2", "0301")?;
        desk.book_event("1", 1, 3)?;

        let err = desk.book_event("2", 1, 2).unwrap_err();
        assert!(matches!(
            err,
            BookingError::InsufficientSeats {
                requested: 2,
                remaining: 1
            }
        ));
        assert_eq!(desk.events()[0].booked_seats, 3);
        assert_eq!(desk.customers()[1].seats_booked, 0);

        desk.book_event("2", 1, 1)?;
        assert_eq!(desk.events()[0].remaining_seats(), 0);
        Ok(())
    }

    #[test]
    fn unknown_customer_or_event_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let mut desk = open_desk(&dir)?;
        desk.add_event(draft(1, "Concert", 10))?;

        let err = desk.book_event("999", 1, 1).unwrap_err();
        assert!(matches!(err, BookingError::CustomerNotRegistered { .. }));

        desk.register_customer("Ali", "12345", "0300")?;
        let err = desk.book_event("12345", 42, 1).unwrap_err();
        assert!(matches!(err, BookingError::EventNotFound { event_id: 42 }));
        Ok(())
    }

    #[test]
    fn duplicate_event_ids_resolve_to_the_first_entry() -> Result<()> {
        let dir = tempdir()?;
        let mut desk = open_desk(&dir)?;
        desk.add_event(draft(1, "First", 10))?;
        desk.add_event(draft(1, "Second", 10))?;
        desk.register_customer("Ali", "12345", "0300")?;

        let receipt = desk.book_event("12345", 1, 2)?;
        assert_eq!(receipt.event_name, "First");
        assert_eq!(desk.events()[0].booked_seats, 2);
        assert_eq!(desk.events()[1].booked_seats, 0);
        Ok(())
    }

    #[test]
    fn rebooking_replaces_the_slot_and_clears_payment() -> Result<()> {
        let dir = tempdir()?;
        let mut desk = open_desk(&dir)?;
        desk.add_event(draft(1, "Concert", 10))?;
        desk.add_event(draft(2, "Play", 10))?;
        desk.register_customer("Ali", "12345", "0300")?;
        desk.book_event("12345", 1, 2)?;
        desk.pay_for_booking("12345")?;

        desk.book_event("12345", 2, 4)?;
        let customer = &desk.customers()[0];
        assert_eq!(customer.event_id, 2);
        assert_eq!(customer.booked_event, "Play");
        assert_eq!(customer.seats_booked, 4);
        assert!(!customer.payment_done);
        assert_eq!(desk.events()[0].booked_seats, 2);
        Ok(())
    }

    #[test]
    fn paying_twice_is_rejected() -> Result<()> {
        let dir = tempdir()?;
        let mut desk = open_desk(&dir)?;
        desk.register_customer("Ali", "12345", "0300")?;

        // No booking is required to pay.
        desk.pay_for_booking("12345")?;
        let err = desk.pay_for_booking("12345").unwrap_err();
        assert!(matches!(err, BookingError::AlreadyPaid { .. }));
        assert!(desk.customers()[0].payment_done);

        let err = desk.pay_for_booking("000").unwrap_err();
        assert!(matches!(err, BookingError::CustomerNotFound { .. }));
        Ok(())
    }

    #[test]
    fn state_is_reloaded_from_disk() -> Result<()> {
        let dir = tempdir()?;
        {
            let mut desk = open_desk(&dir)?;
            desk.add_event(draft(1, "Concert", 10))?;
            desk.register_customer("Ali", "12345", "0300")?;
            desk.book_event("12345", 1, 5)?;
            desk.pay_for_booking("12345")?;
        }

        let desk = open_desk(&dir)?;
        assert_eq!(desk.events()[0].booked_seats, 5);
        let customer = &desk.customers()[0];
        assert_eq!(customer.event_id, 1);
        assert!(customer.payment_done);
        assert_eq!(customer.booking_date, "2026-10-16");
        Ok(())
    }

    #[test]
    fn failed_write_leaves_memory_untouched() -> Result<()> {
        let dir = tempdir()?;
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, "not a directory")?;
        let paths = DataPaths {
            events: dir.path().join("event_data.txt"),
            customers: blocker.join("customer_data.txt"),
        };
        let mut desk = BookingDesk::open(&paths)?.with_clock(fixed_date);
        desk.add_event(draft(1, "Concert", 10))?;

        let err = desk.register_customer("Ali", "12345", "0300").unwrap_err();
        assert!(!err.is_rejection());
        assert!(desk.customers().is_empty());
        Ok(())
    }

    #[test]
    fn failed_customer_write_rolls_back_the_event_file() -> Result<()> {
        let dir = tempdir()?;
        let customers_dir = dir.path().join("customers");
        let paths = DataPaths {
            events: dir.path().join("event_data.txt"),
            customers: customers_dir.join("customer_data.txt"),
        };
        let mut desk = BookingDesk::open(&paths)?.with_clock(fixed_date);
        desk.add_event(draft(1, "Concert", 10))?;
        desk.register_customer("Ali", "12345", "0300")?;
        let events_before = fs::read_to_string(&paths.events)?;

        fs::remove_dir_all(&customers_dir)?;
        fs::write(&customers_dir, "now a file")?;

        let err = desk.book_event("12345", 1, 2).unwrap_err();
        assert!(!err.is_rejection());
        assert_eq!(desk.events()[0].booked_seats, 0);
        assert!(!desk.customers()[0].has_booking());
        assert_eq!(fs::read_to_string(&paths.events)?, events_before);
        Ok(())
    }

    #[test]
    fn seat_validation_bounds() {
        assert!(validate_seat_request(1, 1).is_ok());
        assert!(validate_seat_request(MAX_TICKETS_PER_BOOKING, 10).is_ok());
        assert!(validate_seat_request(0, 10).is_err());
        assert!(validate_seat_request(MAX_TICKETS_PER_BOOKING + 1, 10).is_err());
        assert!(validate_seat_request(3, 2).is_err());
    }
}
