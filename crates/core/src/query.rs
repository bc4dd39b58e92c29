//! Lookups and listings over the booking desk.

use crate::{
    booking::BookingDesk,
    models::{Customer, Event},
};

/// Listing shown when no events exist.
pub const NO_EVENTS: &str = "No events available.";
/// Listing shown when no customers exist.
pub const NO_CUSTOMERS: &str = "No customers registered.";

impl BookingDesk {
    /// First event with `id`.
    pub fn find_event_by_id(&self, id: i64) -> Option<&Event> {
        self.events.find(|event| event.id == id)
    }

    /// Customer registered under `cnic` (exact match).
    pub fn find_customer_by_cnic(&self, cnic: &str) -> Option<&Customer> {
        self.customers.find(|customer| customer.cnic == cnic)
    }

    /// Seats left on the first event with `id`.
    pub fn remaining_seats(&self, id: i64) -> Option<u32> {
        self.find_event_by_id(id).map(Event::remaining_seats)
    }
}

/// One line per event, or a single placeholder line when there are none.
pub fn list_events(events: &[Event]) -> Vec<String> {
    listing(events, NO_EVENTS)
}

/// One line per customer, or a single placeholder line when there are none.
pub fn list_customers(customers: &[Customer]) -> Vec<String> {
    listing(customers, NO_CUSTOMERS)
}

fn listing<T: ToString>(records: &[T], empty: &str) -> Vec<String> {
    if records.is_empty() {
        return vec![empty.to_string()];
    }
    records.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{booking::DataPaths, models::EventDraft};
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn empty_listings_use_placeholders() {
        assert_eq!(list_events(&[]), vec![NO_EVENTS.to_string()]);
        assert_eq!(list_customers(&[]), vec![NO_CUSTOMERS.to_string()]);
    }

    #[test]
    fn lookups_and_listing_reflect_bookings() -> Result<()> {
        let dir = tempdir()?;
        let mut desk = BookingDesk::open(&DataPaths {
            events: dir.path().join("events.txt"),
            customers: dir.path().join("customers.txt"),
        })?;
        desk.add_event(EventDraft {
            id: 3,
            name: "Mela".to_string(),
            location: "Lahore".to_string(),
            date: "2026-12-25".to_string(),
            time: "10:00".to_string(),
            price: 500.0,
            total_seats: 20,
        })?;
        desk.register_customer("Ali", "12345", "0300")?;
        desk.book_event("12345", 3, 4)?;

        assert_eq!(desk.remaining_seats(3), Some(16));
        assert_eq!(desk.remaining_seats(4), None);
        assert_eq!(desk.find_customer_by_cnic("12345").map(|c| c.seats_booked), Some(4));
        assert!(desk.find_customer_by_cnic("1234").is_none());

        let lines = list_events(desk.events());
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("Booked: 4, Available: 16"));

        let lines = list_customers(desk.customers());
        assert!(lines[0].contains("Event: Mela, Seats: 4, Paid: No"));
        Ok(())
    }
}
