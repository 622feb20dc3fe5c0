use super::{Latch, Sink, Source};
use crate::bus::Bus;

//===========================================================================//

/// The number of bytes of RAM (one per 4-bit address).
pub const RAM_SIZE: usize = 16;

const ADDR_MASK: u8 = 0x0f;

//===========================================================================//

/// The machine's 16 bytes of RAM, together with the memory address register
/// that selects which cell the RAM reads or writes.
#[derive(Clone, Debug)]
pub struct Ram {
    mar: Latch,
    cells: [u8; RAM_SIZE],
}

impl Ram {
    /// Returns a new, zeroed RAM with the MAR pointing at address zero.
    pub fn new() -> Ram {
        Ram { mar: Latch::new(ADDR_MASK), cells: [0; RAM_SIZE] }
    }

    /// Copies the given image into RAM starting at address zero, and zeroes
    /// every cell after it.  Panics if the image is larger than RAM; callers
    /// are expected to have checked the length already.
    pub fn load_image(&mut self, image: &[u8]) {
        assert!(image.len() <= RAM_SIZE);
        self.cells = [0; RAM_SIZE];
        self.cells[..image.len()].copy_from_slice(image);
    }

    /// Returns the contents of every RAM cell.
    pub fn cells(&self) -> &[u8; RAM_SIZE] {
        &self.cells
    }

    /// Returns the value of the cell currently selected by the MAR.
    pub fn addressed_cell(&self) -> u8 {
        self.cells[usize::from(self.mar.value())]
    }

    /// Returns the memory address register.
    pub fn mar(&self) -> &Latch {
        &self.mar
    }

    pub(super) fn mar_mut(&mut self) -> &mut Latch {
        &mut self.mar
    }
}

impl Default for Ram {
    fn default() -> Ram {
        Ram::new()
    }
}

impl Source for Ram {
    fn enable(&mut self, bus: &mut Bus) {
        bus.drive(self.addressed_cell());
    }
}

impl Sink for Ram {
    fn load(&mut self, bus: &Bus) {
        self.cells[usize::from(self.mar.value())] = bus.value();
    }
}

//===========================================================================//


//===========================================================================//
