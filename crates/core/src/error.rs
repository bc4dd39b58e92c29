//! Error types for booking-desk operations.

use thiserror::Error;

/// Outcome of a rejected or failed booking-desk operation.
///
/// Every variant except [`BookingError::Storage`] is an in-band rejection:
/// the operation was refused and no state changed. The display strings are
/// the messages shown to the user.
#[derive(Debug, Error)]
pub enum BookingError {
    /// Another customer is already registered under this CNIC.
    #[error("Customer with this CNIC already exists!")]
    DuplicateCnic {
        /// Offending CNIC.
        cnic: String,
    },

    /// Booking attempted by an unknown CNIC.
    #[error("Customer not registered. Please register first.")]
    CustomerNotRegistered {
        /// CNIC that was looked up.
        cnic: String,
    },

    /// No event carries the requested id.
    #[error("Event not found!")]
    EventNotFound {
        /// Requested event id.
        event_id: i64,
    },

    /// Seat count is zero or above the per-booking ticket cap.
    #[error("Invalid or insufficient seats.")]
    TicketLimitExceeded {
        /// Seats requested.
        requested: u32,
        /// Ticket cap per booking.
        max: u32,
    },

    /// The event does not have enough seats left.
    #[error("Invalid or insufficient seats.")]
    InsufficientSeats {
        /// Seats requested.
        requested: u32,
        /// Seats still available.
        remaining: u32,
    },

    /// Payment attempted by an unknown CNIC.
    #[error("Customer not found.")]
    CustomerNotFound {
        /// CNIC that was looked up.
        cnic: String,
    },

    /// The customer's booking is already marked as paid.
    #[error("Payment already done.")]
    AlreadyPaid {
        /// CNIC of the customer.
        cnic: String,
    },

    /// Reading or writing a data file failed.
    #[error("storage failure: {0:#}")]
    Storage(anyhow::Error),
}

impl BookingError {
    /// Whether the error is an in-band rejection rather than a storage failure.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

impl From<anyhow::Error> for BookingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Storage(err)
    }
}

/// Result alias for booking-desk operations.
pub type BookingResult<T> = Result<T, BookingError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn seat_errors_share_the_user_message() {
        let cap = BookingError::TicketLimitExceeded {
            requested: 6,
            max: 5,
        };
        let stock = BookingError::InsufficientSeats {
            requested: 3,
            remaining: 1,
        };
        assert_eq!(cap.to_string(), stock.to_string());
        assert!(cap.is_rejection());
    }

    #[test]
    fn storage_errors_keep_their_context() {
        let err = BookingError::from(anyhow!("disk full").context("failed to write events.txt"));
        assert!(!err.is_rejection());
        assert_eq!(
            err.to_string(),
            "storage failure: failed to write events.txt: disk full"
        );
    }
}
