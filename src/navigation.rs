//! Which image of the sequence is current.

use crate::bitmap::ImageHandle;
use crate::error::{Result, ViewerError};

/// Non-empty, fixed list of images. Built from the caller's collection by
/// copying the handles, so later changes to that collection do not reach it.
#[derive(Debug, Clone)]
pub struct ImageSequence {
    images: Vec<ImageHandle>,
}

impl ImageSequence {
    pub fn new(images: impl IntoIterator<Item = ImageHandle>) -> Result<Self> {
        let images: Vec<ImageHandle> = images.into_iter().collect();
        if images.is_empty() {
            return Err(ViewerError::invalid("must specify at least one image"));
        }
        Ok(Self { images })
    }

    /// Like [`ImageSequence::new`], for collections that may have holes.
    /// Any absent element is rejected.
    pub fn from_slots(slots: impl IntoIterator<Item = Option<ImageHandle>>) -> Result<Self> {
        let images = slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.ok_or_else(|| ViewerError::invalid(format!("image at index {i} is absent")))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(images)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn get(&self, index: usize) -> Option<&ImageHandle> {
        self.images.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageHandle> {
        self.images.iter()
    }
}

/// Where the current index sits in the sequence. A one-image sequence is
/// [`Position::Only`]: first and last at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Only,
    AtFirst,
    Middle,
    AtLast,
}

impl Position {
    pub fn is_first(self) -> bool {
        matches!(self, Position::Only | Position::AtFirst)
    }

    pub fn is_last(self) -> bool {
        matches!(self, Position::Only | Position::AtLast)
    }
}

#[derive(Debug, Clone)]
pub struct NavigationState {
    images: ImageSequence,
    index: usize,
}

impl NavigationState {
    pub fn new(images: ImageSequence) -> Self {
        Self { images, index: 0 }
    }

    pub fn current(&self) -> usize {
        self.index
    }

    pub fn count(&self) -> usize {
        self.images.len()
    }

    pub fn current_image(&self) -> &ImageHandle {
        &self.images.images[self.index]
    }

    pub fn images(&self) -> &ImageSequence {
        &self.images
    }

    pub fn has_next(&self) -> bool {
        self.index < self.images.len() - 1
    }

    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    pub fn position(&self) -> Position {
        match (self.has_previous(), self.has_next()) {
            (false, false) => Position::Only,
            (false, true) => Position::AtFirst,
            (true, true) => Position::Middle,
            (true, false) => Position::AtLast,
        }
    }

    /// Advance one image. Returns `false` (and changes nothing) at the end.
    pub fn show_next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.move_to(self.index + 1);
        true
    }

    /// Step back one image. Returns `false` (and changes nothing) at the start.
    pub fn show_previous(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.move_to(self.index - 1);
        true
    }

    /// Indices of the images either side of the current one.
    pub fn neighbours(&self) -> impl Iterator<Item = usize> {
        let prev = self.index.checked_sub(1);
        let next = Some(self.index + 1).filter(|&i| i < self.images.len());
        prev.into_iter().chain(next)
    }

    fn move_to(&mut self, index: usize) {
        log::debug!("[nav] move {} -> {}", self.index, index);
        self.index = index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn images(n: usize) -> Vec<ImageHandle> {
        (0..n).map(|_| ImageHandle::new(RgbaImage::new(1, 1))).collect()
    }

    fn nav(n: usize) -> NavigationState {
        NavigationState::new(ImageSequence::new(images(n)).unwrap())
    }

    #[test]
    fn empty_sequence_is_rejected() {
        let err = ImageSequence::new(Vec::new()).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn absent_element_is_rejected_wherever_it_is() {
        let img = ImageHandle::new(RgbaImage::new(1, 1));
        for slots in [
            vec![None],
            vec![None, Some(img.clone())],
            vec![Some(img.clone()), None],
        ] {
            assert!(ImageSequence::from_slots(slots).unwrap_err().is_invalid_argument());
        }
        assert!(ImageSequence::from_slots(Vec::new()).unwrap_err().is_invalid_argument());
        assert_eq!(ImageSequence::from_slots(vec![Some(img)]).unwrap().len(), 1);
    }

    #[test]
    fn caller_collection_changes_do_not_leak_in() {
        let mut original = images(3);
        let seq = ImageSequence::new(original.clone()).unwrap();
        let first = original[0].clone();

        original.clear();
        original.extend(images(5));

        assert_eq!(seq.len(), 3);
        assert_eq!(seq.get(0), Some(&first));
    }

    #[test]
    fn walks_forward_and_back_within_bounds() {
        let mut nav = nav(5);
        assert_eq!(nav.current(), 0);
        assert!(!nav.has_previous());
        assert!(nav.has_next());

        assert!(nav.show_next());
        assert!(nav.show_next());
        assert_eq!(nav.current(), 2);

        assert!(nav.show_previous());
        assert!(nav.show_previous());
        assert!(!nav.show_previous());
        assert_eq!(nav.current(), 0);
    }

    #[test]
    fn stops_at_last_image() {
        let mut nav = nav(2);
        assert!(nav.show_next());
        assert!(!nav.show_next());
        assert_eq!(nav.current(), 1);
        assert_eq!(nav.position(), Position::AtLast);
    }

    #[test]
    fn single_image_is_both_first_and_last() {
        let mut nav = nav(1);
        assert_eq!(nav.position(), Position::Only);
        assert!(nav.position().is_first() && nav.position().is_last());
        assert!(!nav.show_next());
        assert!(!nav.show_previous());
    }

    #[test]
    fn positions_follow_index() {
        let mut nav = nav(3);
        assert_eq!(nav.position(), Position::AtFirst);
        nav.show_next();
        assert_eq!(nav.position(), Position::Middle);
        nav.show_next();
        assert_eq!(nav.position(), Position::AtLast);
    }

    #[test]
    fn neighbours_stay_in_range() {
        let mut nav = nav(3);
        assert_eq!(nav.neighbours().collect::<Vec<_>>(), vec![1]);
        nav.show_next();
        assert_eq!(nav.neighbours().collect::<Vec<_>>(), vec![0, 2]);
        nav.show_next();
        assert_eq!(nav.neighbours().collect::<Vec<_>>(), vec![1]);
    }
}
