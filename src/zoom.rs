//! Fixed-step magnification model.
//!
//! A [`ZoomModel`] moves through a strictly ascending list of allowed
//! magnifications. It never produces a value that is not one of its levels.

use crate::error::{Result, ViewerError};
use crate::observer::{ListenerId, Listeners};

pub const DEFAULT_ZOOM_LEVELS: [f64; 5] = [0.25, 0.5, 1.0, 2.0, 4.0];
pub const DEFAULT_ZOOM_INDEX: usize = 2;

/// Strictly ascending, positive, non-empty magnification factors.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomLevels(Vec<f64>);

impl ZoomLevels {
    pub fn new(levels: impl Into<Vec<f64>>) -> Result<Self> {
        let levels = levels.into();
        if levels.is_empty() {
            return Err(ViewerError::invalid("zoom levels cannot be empty"));
        }
        if let Some(bad) = levels.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
            return Err(ViewerError::invalid(format!(
                "zoom magnification must be a positive, finite value (got {bad})"
            )));
        }
        if levels.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ViewerError::invalid(
                "zoom levels must be in strictly ascending order",
            ));
        }
        Ok(Self(levels))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Index of the level that is bit-for-bit equal to `value`.
    pub fn position(&self, value: f64) -> Option<usize> {
        self.0.iter().position(|v| v.to_bits() == value.to_bits())
    }
}

impl Default for ZoomLevels {
    fn default() -> Self {
        Self(DEFAULT_ZOOM_LEVELS.to_vec())
    }
}

#[derive(Debug)]
pub struct ZoomModel {
    levels: ZoomLevels,
    index: usize,
    listeners: Listeners<f64>,
}

impl ZoomModel {
    pub fn new(levels: ZoomLevels, default_index: usize) -> Result<Self> {
        if default_index >= levels.len() {
            return Err(ViewerError::invalid(format!(
                "default zoom index {default_index} out of range 0..{}",
                levels.len()
            )));
        }
        Ok(Self {
            levels,
            index: default_index,
            listeners: Listeners::new(),
        })
    }

    pub fn magnification(&self) -> f64 {
        self.levels.0[self.index]
    }

    pub fn level_index(&self) -> usize {
        self.index
    }

    pub fn levels(&self) -> &ZoomLevels {
        &self.levels
    }

    pub fn is_zoom_in_possible(&self) -> bool {
        self.index < self.levels.len() - 1
    }

    pub fn is_zoom_out_possible(&self) -> bool {
        self.index > 0
    }

    /// Step to the next higher level. Returns `false` at the top.
    pub fn zoom_in(&mut self) -> bool {
        if !self.is_zoom_in_possible() {
            return false;
        }
        self.set_index(self.index + 1);
        true
    }

    /// Step to the next lower level. Returns `false` at the bottom.
    pub fn zoom_out(&mut self) -> bool {
        if !self.is_zoom_out_possible() {
            return false;
        }
        self.set_index(self.index - 1);
        true
    }

    /// Jump to an exact configured level.
    ///
    /// Returns `Ok(true)` when the level changed and listeners were notified,
    /// `Ok(false)` when `value` is already the current level.
    pub fn set_magnification(&mut self, value: f64) -> Result<bool> {
        let Some(index) = self.levels.position(value) else {
            return Err(ViewerError::invalid(format!(
                "magnification {value} is not one of the configured levels {:?}",
                self.levels.as_slice()
            )));
        };
        if index == self.index {
            return Ok(false);
        }
        self.set_index(index);
        Ok(true)
    }

    pub fn add_listener(&mut self, listener: impl FnMut(f64) + 'static) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    fn set_index(&mut self, index: usize) {
        let old = self.magnification();
        self.index = index;
        let new = self.magnification();
        log::debug!("[zoom] {:.0}% -> {:.0}%", old * 100.0, new * 100.0);
        self.listeners.notify(new);
    }
}

impl Default for ZoomModel {
    fn default() -> Self {
        Self {
            levels: ZoomLevels::default(),
            index: DEFAULT_ZOOM_INDEX,
            listeners: Listeners::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn model(index: usize) -> ZoomModel {
        let levels = ZoomLevels::new(vec![0.5, 1.0, 2.0]).expect("valid levels");
        ZoomModel::new(levels, index).expect("valid index")
    }

    #[test]
    fn starts_at_default_level() {
        assert_eq!(model(1).magnification(), 1.0);
        assert_eq!(model(0).magnification(), 0.5);
        assert_eq!(model(2).magnification(), 2.0);
    }

    #[test]
    fn rejects_malformed_levels() {
        assert!(ZoomLevels::new(Vec::<f64>::new()).unwrap_err().is_invalid_argument());
        assert!(ZoomLevels::new(vec![1.0, 0.25, 2.5]).unwrap_err().is_invalid_argument());
        assert!(ZoomLevels::new(vec![0.0, 1.0, 2.0]).unwrap_err().is_invalid_argument());
        assert!(ZoomLevels::new(vec![-1.0, 1.0, 2.0]).unwrap_err().is_invalid_argument());
        assert!(ZoomLevels::new(vec![1.0, 1.0]).unwrap_err().is_invalid_argument());
        assert!(ZoomLevels::new(vec![f64::NAN]).unwrap_err().is_invalid_argument());
        assert!(ZoomLevels::new(vec![1.0, f64::INFINITY]).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn rejects_default_index_out_of_range() {
        let levels = ZoomLevels::new(vec![0.5, 1.0, 2.0]).unwrap();
        assert!(ZoomModel::new(levels, 3).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn zoom_stops_at_boundaries() {
        let mut zoom = model(1);
        assert!(zoom.zoom_in());
        assert!(!zoom.zoom_in());
        assert_eq!(zoom.magnification(), 2.0);
        assert!(!zoom.is_zoom_in_possible());

        assert!(zoom.zoom_out());
        assert!(zoom.zoom_out());
        assert!(!zoom.zoom_out());
        assert_eq!(zoom.magnification(), 0.5);
        assert!(!zoom.is_zoom_out_possible());
    }

    #[test]
    fn zoom_in_then_out_restores_level() {
        let mut zoom = model(1);
        zoom.zoom_in();
        zoom.zoom_out();
        assert_eq!(zoom.magnification(), 1.0);
    }

    #[test]
    fn set_magnification_requires_exact_level() {
        let mut zoom = model(0);
        assert!(zoom.set_magnification(1.0).unwrap());
        assert_eq!(zoom.level_index(), 1);

        let err = zoom.set_magnification(1.5).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(zoom.magnification(), 1.0);

        assert!(zoom.set_magnification(f64::NAN).is_err());
    }

    #[test]
    fn listeners_hear_each_change_once() {
        let heard = Rc::new(RefCell::new(Vec::new()));
        let mut zoom = model(1);
        {
            let heard = Rc::clone(&heard);
            zoom.add_listener(move |m| heard.borrow_mut().push(m));
        }

        zoom.zoom_in();
        zoom.zoom_in(); // no-op at the top
        zoom.set_magnification(2.0).unwrap(); // already there
        zoom.set_magnification(0.5).unwrap();

        assert_eq!(*heard.borrow(), vec![2.0, 0.5]);
    }

    #[test]
    fn removed_listener_is_silent() {
        let heard = Rc::new(RefCell::new(0));
        let mut zoom = model(1);
        let id = {
            let heard = Rc::clone(&heard);
            zoom.add_listener(move |_| *heard.borrow_mut() += 1)
        };
        assert!(zoom.remove_listener(id));
        assert!(!zoom.remove_listener(id));

        zoom.zoom_out();
        assert_eq!(*heard.borrow(), 0);
    }

    #[test]
    fn default_model_is_one_hundred_percent() {
        let zoom = ZoomModel::default();
        assert_eq!(zoom.magnification(), 1.0);
        assert_eq!(zoom.levels().as_slice(), &DEFAULT_ZOOM_LEVELS);
    }
}
