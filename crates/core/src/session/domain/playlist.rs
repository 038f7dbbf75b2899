use super::song::Song;

/// Songs in insertion order, unique by name.
#[derive(Clone, Debug, Default)]
pub struct Playlist {
    songs: Vec<Song>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.songs.iter().position(|s| s.name() == name)
    }

    /// Append a song. Returns `false` and leaves the playlist untouched when
    /// a song with the same name is already present.
    pub fn add(&mut self, song: Song) -> bool {
        if self.contains(song.name()) {
            log::debug!("{} already in playlist, skipping", song.name());
            return false;
        }
        self.songs.push(song);
        true
    }

    pub fn get(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }

    pub fn names(&self) -> Vec<&str> {
        self.songs.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Song> {
        self.songs.iter()
    }
}
