use embedded_graphics::pixelcolor::Rgb565;

#[cfg(feature = "hardware")]
mod adc;
#[cfg(feature = "hardware")]
mod helper;
#[cfg(feature = "hardware")]
mod lcd;
#[cfg(feature = "hardware")]
mod timers;

#[cfg(feature = "hardware")]
pub use helper::*;
#[cfg(feature = "hardware")]
pub use lcd::IliError;
#[cfg(feature = "hardware")]
pub use timers::SampleTimer;

/// Free-running timer counting down towards zero and reloading at `MAX`.
pub trait DownCounter {
    /// Reload value, every reading lies in `0..=MAX`.
    const MAX: u32;
    fn now(&self) -> u32;
}

/// Converter started by software, blocks until the result is available.
pub trait OneShotAdc {
    fn convert(&mut self) -> u16;
}

/// Output toggled around timed sections for scope measurements.
pub trait ProfilePin {
    fn set_high(&mut self);
    fn set_low(&mut self);
}

/// Character and pixel operations the plot needs from a display.
///
/// Text positions are character cells, everything else is in pixels.
pub trait Surface {
    type Error;
    fn clear(&mut self, color: Rgb565) -> Result<(), Self::Error>;
    fn set_cursor(&mut self, column: u16, row: u16) -> Result<(), Self::Error>;
    fn write_str(&mut self, text: &str) -> Result<(), Self::Error>;
    /// Fills `length` pixels downwards starting at `row`. A zero length draws
    /// nothing.
    fn draw_vertical_span(
        &mut self,
        column: u16,
        row: u16,
        length: u16,
        color: Rgb565,
    ) -> Result<(), Self::Error>;
    /// Blanks the plot region, `min_y`/`max_y` are the data-space bounds it
    /// will show.
    fn clear_plot_region(&mut self, min_y: i32, max_y: i32) -> Result<(), Self::Error>;
}

impl<S> Surface for &mut S
where
    S: Surface,
{
    type Error = S::Error;

    fn clear(&mut self, color: Rgb565) -> Result<(), Self::Error> {
        (**self).clear(color)
    }

    fn set_cursor(&mut self, column: u16, row: u16) -> Result<(), Self::Error> {
        (**self).set_cursor(column, row)
    }

    fn write_str(&mut self, text: &str) -> Result<(), Self::Error> {
        (**self).write_str(text)
    }

    fn draw_vertical_span(
        &mut self,
        column: u16,
        row: u16,
        length: u16,
        color: Rgb565,
    ) -> Result<(), Self::Error> {
        (**self).draw_vertical_span(column, row, length, color)
    }

    fn clear_plot_region(&mut self, min_y: i32, max_y: i32) -> Result<(), Self::Error> {
        (**self).clear_plot_region(min_y, max_y)
    }
}

/// First and last row, both inclusive, covered by a span of `length` pixels
/// starting at `row`. `None` when there is nothing to draw.
pub fn span_rows(row: u16, length: u16) -> Option<(u16, u16)> {
    let last = row.checked_add(length.checked_sub(1)?)?;
    Some((row, last))
}
