//! Services module for gst-service.

pub mod gstr1;
pub mod sequencer;
pub mod tax;
pub mod words;

pub use gstr1::Gstr1Builder;
pub use sequencer::DocumentSequencer;
pub use tax::{compute_tax, is_inter_state, round_money};
pub use words::amount_to_words;
