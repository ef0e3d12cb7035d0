//! Per-batch texture slot table
//!
//! Slot 0 always holds the white texture. Slots `1..len` hold unique
//! textures in first-use order; identity is the backend handle.

use std::rc::Rc;

use crate::render::resources::Texture2D;

/// Bounded texture table for one batch
#[derive(Debug)]
pub struct TextureSlots {
    slots: Vec<Rc<Texture2D>>,
    capacity: usize,
}

impl TextureSlots {
    /// Table with `white` in slot 0
    ///
    /// # Panics
    /// If `capacity` leaves no room for a texture besides the white one.
    pub fn new(white: Rc<Texture2D>, capacity: usize) -> Self {
        assert!(capacity >= 2, "a batch needs at least two texture slots, got {capacity}");
        let mut slots = Vec::with_capacity(capacity);
        slots.push(white);
        Self { slots, capacity }
    }

    /// Slot already holding `texture`, if any
    pub fn find(&self, texture: &Texture2D) -> Option<u32> {
        self.slots
            .iter()
            .position(|slot| slot.handle() == texture.handle())
            .map(|index| index as u32)
    }

    /// Store `texture` in the next free slot and return its index
    ///
    /// # Panics
    /// If the table is full.
    pub fn insert(&mut self, texture: Rc<Texture2D>) -> u32 {
        assert!(!self.is_full(), "texture slot table overflow ({} slots)", self.capacity);
        self.slots.push(texture);
        (self.slots.len() - 1) as u32
    }

    /// Whether every slot is occupied
    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    /// Forget every texture except the white one
    pub fn reset(&mut self) {
        self.slots.truncate(1);
    }

    /// Occupied slots, slot 0 first
    pub fn textures(&self) -> &[Rc<Texture2D>] {
        &self.slots
    }

    /// Number of occupied slots, including the white one
    pub fn occupied(&self) -> usize {
        self.slots.len()
    }

    /// Maximum number of slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::command_queue::RenderContext;

    #[test]
    fn test_find_insert_and_reset() {
        let context = RenderContext::new();
        let white = Rc::new(Texture2D::white(&context));
        let a = Rc::new(Texture2D::white(&context));
        let b = Rc::new(Texture2D::white(&context));

        let mut slots = TextureSlots::new(Rc::clone(&white), 3);
        assert_eq!(slots.find(&white), Some(0));
        assert_eq!(slots.find(&a), None);

        assert_eq!(slots.insert(Rc::clone(&a)), 1);
        assert_eq!(slots.find(&a), Some(1));
        assert!(!slots.is_full());
        assert_eq!(slots.insert(Rc::clone(&b)), 2);
        assert!(slots.is_full());

        slots.reset();
        assert_eq!(slots.occupied(), 1);
        assert_eq!(slots.find(&a), None);
    }

    #[test]
    #[should_panic(expected = "texture slot table overflow")]
    fn test_insert_into_full_table_panics() {
        let context = RenderContext::new();
        let white = Rc::new(Texture2D::white(&context));
        let mut slots = TextureSlots::new(white, 2);
        slots.insert(Rc::new(Texture2D::white(&context)));
        slots.insert(Rc::new(Texture2D::white(&context)));
    }
}
