//! Chat room list with optimistic mutation support

use crate::types::ChatRoom;

/// A removed room together with the position it occupied
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSnapshot {
    /// Index the room occupied before removal
    pub index: usize,
    /// The removed room
    pub room: ChatRoom,
}

/// Ordered room list backing the room picker
///
/// Deletions are optimistic: the room disappears before the API call, and
/// the snapshot puts it back at its original position when the call fails.
#[derive(Debug, Default)]
pub struct RoomStore {
    rooms: Vec<ChatRoom>,
}

impl RoomStore {
    /// An empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole list with the server's ordering
    pub fn replace_all(&mut self, rooms: Vec<ChatRoom>) {
        self.rooms = rooms;
    }

    /// Append a newly created room
    pub fn push(&mut self, room: ChatRoom) {
        self.rooms.push(room);
    }

    /// Replace a room in place (after the server confirmed an update)
    pub fn upsert(&mut self, room: ChatRoom) {
        match self.rooms.iter_mut().find(|r| r.id == room.id) {
            Some(existing) => *existing = room,
            None => self.rooms.push(room),
        }
    }

    /// Rename a room locally; false when the ID is unknown
    pub fn rename(&mut self, id: &str, name: &str) -> bool {
        match self.rooms.iter_mut().find(|r| r.id == id) {
            Some(room) => {
                room.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Look up a room by ID
    pub fn get(&self, id: &str) -> Option<&ChatRoom> {
        self.rooms.iter().find(|r| r.id == id)
    }

    /// Remove a room, keeping its position for a possible rollback
    pub fn remove(&mut self, id: &str) -> Option<RoomSnapshot> {
        let index = self.rooms.iter().position(|r| r.id == id)?;
        let room = self.rooms.remove(index);
        Some(RoomSnapshot { index, room })
    }

    /// Put a removed room back where it was
    ///
    /// The index is clamped so a rollback stays valid even after other
    /// rooms were removed in the meantime.
    pub fn restore(&mut self, snapshot: RoomSnapshot) {
        let index = snapshot.index.min(self.rooms.len());
        self.rooms.insert(index, snapshot.room);
    }

    /// Snapshot the whole list before a bulk operation
    pub fn snapshot_all(&self) -> Vec<ChatRoom> {
        self.rooms.clone()
    }

    /// Restore a whole-list snapshot after a failed bulk operation
    pub fn restore_all(&mut self, snapshot: Vec<ChatRoom>) {
        self.rooms = snapshot;
    }

    /// Rooms whose name contains the query, case-insensitively
    pub fn filter(&self, query: &str) -> Vec<&ChatRoom> {
        let query = query.to_lowercase();
        self.rooms
            .iter()
            .filter(|r| r.name.to_lowercase().contains(&query))
            .collect()
    }

    /// Rooms in display order, newest first
    pub fn iter_display(&self) -> impl Iterator<Item = &ChatRoom> {
        self.rooms.iter().rev()
    }

    /// All rooms in server order
    pub fn rooms(&self) -> &[ChatRoom] {
        &self.rooms
    }

    /// Number of rooms
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// True when no rooms are loaded
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
