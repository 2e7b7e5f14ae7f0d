pub mod events;
pub mod track_state;
