//! HD44780 character LCD behind a PCF8574 I²C port expander.
//!
//! Expander wiring (the common "LCD2004 backpack"): P0 = RS, P1 = RW,
//! P2 = E, P3 = backlight, P4..P7 = D4..D7. The controller runs in 4-bit mode.

use embedded_hal::blocking::delay::{DelayMs, DelayUs};
use embedded_hal::blocking::i2c;

use crate::config::DISPLAY_COLS;
use crate::display::CharacterDisplay;
use crate::Error;

/// Address of a PCF8574 with A0..A2 pulled high.
pub const DEFAULT_ADDRESS: u8 = 0x27;

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE: u8 = 0x06; // increment, no shift
const CMD_DISPLAY_ON: u8 = 0x0c; // cursor and blink off
const CMD_FUNCTION_SET: u8 = 0x28; // 4-bit, 2 lines, 5x8
const CMD_SET_CGRAM: u8 = 0x40;
const CMD_SET_DDRAM: u8 = 0x80;

const ROW_OFFSETS: [u8; 4] = [0x00, 0x40, 0x14, 0x54];

pub struct Hd44780<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    backlight: bool,
}

impl<I2C, D> Hd44780<I2C, D>
where
    I2C: i2c::Write,
    D: DelayUs<u16> + DelayMs<u8>,
{
    /// Runs the 4-bit initialisation by instruction and leaves the display
    /// on, cleared, with the backlight lit.
    pub fn new(i2c: I2C, delay: D, address: u8) -> Result<Self, Error> {
        let mut lcd = Self {
            i2c,
            delay,
            address,
            backlight: true,
        };
        lcd.delay.delay_ms(50);
        lcd.expander(0)?;

        lcd.write4(0x03, 0)?;
        lcd.delay.delay_ms(5);
        lcd.write4(0x03, 0)?;
        lcd.delay.delay_ms(5);
        lcd.write4(0x03, 0)?;
        lcd.delay.delay_ms(1);
        lcd.write4(0x02, 0)?;

        lcd.command(CMD_FUNCTION_SET)?;
        lcd.command(CMD_DISPLAY_ON)?;
        lcd.clear()?;
        lcd.command(CMD_ENTRY_MODE)?;
        Ok(lcd)
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn expander(&mut self, bits: u8) -> Result<(), Error> {
        let bits = if self.backlight { bits | BACKLIGHT } else { bits };
        self.i2c.write(self.address, &[bits]).map_err(|_| Error::Bus)
    }

    fn write4(&mut self, nibble: u8, mode: u8) -> Result<(), Error> {
        let bits = (nibble << 4) | mode;
        self.expander(bits | EN)?;
        self.delay.delay_us(1);
        self.expander(bits)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn send(&mut self, byte: u8, mode: u8) -> Result<(), Error> {
        self.write4(byte >> 4, mode)?;
        self.write4(byte & 0x0f, mode)
    }

    fn command(&mut self, cmd: u8) -> Result<(), Error> {
        self.send(cmd, 0)
    }

    fn data(&mut self, byte: u8) -> Result<(), Error> {
        self.send(byte, RS)
    }

    fn set_cursor(&mut self, row: u8, col: u8) -> Result<(), Error> {
        let offset = ROW_OFFSETS[usize::from(row) % ROW_OFFSETS.len()];
        self.command(CMD_SET_DDRAM | (offset + col.min(DISPLAY_COLS - 1)))
    }
}

impl<I2C, D> CharacterDisplay for Hd44780<I2C, D>
where
    I2C: i2c::Write,
    D: DelayUs<u16> + DelayMs<u8>,
{
    fn clear(&mut self) -> Result<(), Error> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_ms(2);
        Ok(())
    }

    fn set_backlight(&mut self, on: bool) -> Result<(), Error> {
        self.backlight = on;
        self.expander(0)
    }

    fn print(&mut self, row: u8, col: u8, text: &str) -> Result<(), Error> {
        self.set_cursor(row, col)?;
        for c in text.chars() {
            // the character ROM is ASCII in the printable range
            let byte = if c.is_ascii() && !c.is_ascii_control() {
                c as u8
            } else {
                b'?'
            };
            self.data(byte)?;
        }
        Ok(())
    }

    fn print_glyph(&mut self, row: u8, col: u8, glyph: u8) -> Result<(), Error> {
        self.set_cursor(row, col)?;
        self.data(glyph & 0x07)
    }

    fn register_glyph(&mut self, id: u8, bitmap: &[u8; 8]) -> Result<(), Error> {
        self.command(CMD_SET_CGRAM | ((id & 0x07) << 3))?;
        for row in bitmap {
            self.data(row & 0x1f)?;
        }
        self.command(CMD_SET_DDRAM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{NoDelay, RecordingI2c};

    fn lcd() -> Hd44780<RecordingI2c, NoDelay> {
        Hd44780::new(RecordingI2c::default(), NoDelay, DEFAULT_ADDRESS).unwrap()
    }

    #[test]
    fn init_starts_with_the_reset_nibbles() {
        let (i2c, _) = lcd().release();
        assert!(i2c.writes.iter().all(|(addr, _)| *addr == DEFAULT_ADDRESS));
        let bytes = i2c.bytes();
        assert_eq!(
            &bytes[..7],
            &[0x08, 0x3c, 0x38, 0x3c, 0x38, 0x3c, 0x38]
        );
        // then the switch to 4-bit and the function set
        assert_eq!(&bytes[7..13], &[0x2c, 0x28, 0x2c, 0x28, 0x8c, 0x88]);
    }

    #[test]
    fn print_addresses_the_row_then_sends_data() {
        let mut lcd = lcd();
        lcd.i2c.writes.clear();
        lcd.print(1, 2, "A").unwrap();
        assert_eq!(
            lcd.i2c.bytes(),
            vec![0xcc, 0xc8, 0x2c, 0x28, 0x4d, 0x49, 0x1d, 0x19]
        );
    }

    #[test]
    fn cursor_column_is_clamped_to_the_last_cell() {
        let mut lcd = lcd();
        lcd.i2c.writes.clear();
        lcd.print(3, u8::MAX, "A").unwrap();
        // 0x80 | (0x54 + 19) = 0xe7
        assert_eq!(&lcd.i2c.bytes()[..4], &[0xec, 0xe8, 0x7c, 0x78]);
    }

    #[test]
    fn backlight_bit_follows_state() {
        let mut lcd = lcd();
        lcd.set_backlight(false).unwrap();
        lcd.i2c.writes.clear();
        lcd.print_glyph(0, 0, 3).unwrap();
        assert!(lcd.i2c.bytes().iter().all(|b| b & BACKLIGHT == 0));
    }

    #[test]
    fn glyph_upload_targets_cgram_slot() {
        let mut lcd = lcd();
        lcd.i2c.writes.clear();
        lcd.register_glyph(2, &[0x1f; 8]).unwrap();
        let bytes = lcd.i2c.bytes();
        // 0x40 | 2 << 3 = 0x50
        assert_eq!(&bytes[..4], &[0x5c, 0x58, 0x0c, 0x08]);
        // 8 data bytes of 4 expander writes each, then the DDRAM command
        assert_eq!(bytes.len(), 4 + 8 * 4 + 4);
    }

    #[test]
    fn bus_failure_is_reported() {
        let mut lcd = lcd();
        lcd.i2c.fail = true;
        assert_eq!(lcd.clear(), Err(Error::Bus));
    }
}
