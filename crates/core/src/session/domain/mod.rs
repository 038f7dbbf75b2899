pub mod app_state;
pub mod playlist;
pub mod song;
