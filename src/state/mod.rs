pub mod geocoding_state;
