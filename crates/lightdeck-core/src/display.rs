//! Render boundary between the controller and a screen.

use crate::store::DeviceStore;

/// A surface that can show the panel.
///
/// Implementations read whatever they need from the store. Every call must
/// be idempotent: drawing the same region twice with an unchanged store
/// produces the same picture.
pub trait Display {
    /// Redraw the header (title and sensor reading).
    fn draw_header(&mut self, store: &DeviceStore);

    /// Redraw the panel of light `index`.
    fn draw_panel(&mut self, store: &DeviceStore, index: usize);

    /// Set the backlight level (0 = off, 255 = full).
    fn set_backlight(&mut self, level: u8);

    /// Redraw everything.
    fn draw_all(&mut self, store: &DeviceStore) {
        self.draw_header(store);
        for index in 0..store.len() {
            self.draw_panel(store, index);
        }
    }
}
