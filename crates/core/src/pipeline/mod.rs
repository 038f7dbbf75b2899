pub mod import_logger;
pub mod import_songs_use_case;
