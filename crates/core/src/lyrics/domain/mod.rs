pub mod lrc_formatter;
pub mod lrc_parser;
pub mod lyric_line;
pub mod transcript_segment;
