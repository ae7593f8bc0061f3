mod state;

pub use state::{StateError, StateFile, parse_state, read_state_file};
