pub mod booking;
pub mod capacity;

pub use booking::AppointmentBookingService;
pub use capacity::{SlotCapacityService, MAX_APPOINTMENTS_PER_SLOT};
