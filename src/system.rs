use slotmap::{SlotMap, new_key_type};

use crate::character::Character;

new_key_type! {
    /// Handle to a character owned by a [`Stage`].
    pub struct CharacterKey;
}

/// Owns a set of characters and advances them together.
#[derive(Debug, Default)]
pub struct Stage {
    characters: SlotMap<CharacterKey, Character>,
}

impl Stage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, character: Character) -> CharacterKey {
        self.characters.insert(character)
    }

    pub fn remove(&mut self, key: CharacterKey) -> Option<Character> {
        self.characters.remove(key)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: CharacterKey) -> Option<&Character> {
        self.characters.get(key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: CharacterKey) -> Option<&mut Character> {
        self.characters.get_mut(key)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CharacterKey, &Character)> {
        self.characters.iter()
    }

    /// Advances every character's playback clock by `dt` seconds and poses it.
    pub fn update(&mut self, dt: f32) {
        for (_key, character) in &mut self.characters {
            character.advance(dt);
        }
    }
}
