pub mod payments;
pub mod payments_in_memory;
