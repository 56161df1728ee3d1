//! SSD1306 OLED display wrapper.
//!
//! Implements the core's `Frame` capability set (clear / set-cursor /
//! set-text-size / print-line / commit) on top of the buffered
//! graphics mode, so every page render in the core maps straight onto
//! the panel.

use cyclometer::pages::Frame;
use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

/// Type alias for the concrete display driver.
///
/// Generic over the I²C implementation so callers pass in their HAL's
/// I²C peripheral.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

pub struct Oled<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    display: Display<I2C>,
    col: u8,
    row: u8,
    size: u8,
}

impl<I2C> Oled<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Initialise the SSD1306 and clear the screen.
    pub fn new(i2c: I2C) -> Self {
        let interface = I2CDisplayInterface::new(i2c);
        let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        let _ = display.init();
        display.clear_buffer();
        let _ = display.flush();
        Self {
            display,
            col: 0,
            row: 0,
            size: 1,
        }
    }

    fn style(&self) -> MonoTextStyle<'static, BinaryColor> {
        let font = if self.size >= 2 { &FONT_10X20 } else { &FONT_6X10 };
        MonoTextStyleBuilder::new()
            .font(font)
            .text_color(BinaryColor::On)
            .build()
    }

    fn cell(&self) -> (i32, i32) {
        if self.size >= 2 {
            (10, 20)
        } else {
            (6, 12)
        }
    }
}

impl<I2C> Frame for Oled<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn clear(&mut self) {
        self.display.clear_buffer();
        self.col = 0;
        self.row = 0;
    }

    fn set_cursor(&mut self, col: u8, row: u8) {
        self.col = col;
        self.row = row;
    }

    fn set_text_size(&mut self, size: u8) {
        self.size = size;
    }

    fn print_line(&mut self, text: &str) {
        let (char_w, line_h) = self.cell();
        let x = i32::from(self.col) * char_w;
        // Text anchors at the baseline, not the cell top.
        let y = i32::from(self.row) * line_h + line_h - 2;
        let _ = Text::new(text, Point::new(x, y), self.style()).draw(&mut self.display);
        self.row += 1;
    }

    fn commit(&mut self) {
        let _ = self.display.flush();
    }
}
