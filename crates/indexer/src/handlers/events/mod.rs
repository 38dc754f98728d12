mod post_event;

pub use post_event::{post_event, post_event_batch};
