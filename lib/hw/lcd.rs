use core::convert::Infallible;
use display_interface_parallel_gpio::WriteOnlyDataCommand;
use embedded_graphics::drawable::Drawable;
use embedded_graphics::fonts::{Font6x8, Text};
use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use embedded_graphics::prelude::{Point, Primitive};
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::style::{PrimitiveStyle, TextStyle};
use embedded_graphics::DrawTarget;
use ili9341::{DisplaySize240x320, Error, Ili9341, Orientation};
use stm32g0xx_hal::hal::blocking::delay::DelayMs;
use stm32g0xx_hal::hal::digital::v2::OutputPin;

use crate::hw::{span_rows, Surface};
use crate::plot::Region;

#[derive(Debug)]
pub struct IliError(pub Error<Infallible>);

struct Cell;

impl Cell {
    const WIDTH: i32 = 6;
    const HEIGHT: i32 = 10;
}

pub struct IliLcd<I, R> {
    ili: Ili9341<I, R>,
    cursor: Point,
}

impl<I, R> IliLcd<I, R>
where
    I: WriteOnlyDataCommand,
    R: OutputPin<Error = Infallible>,
{
    pub fn new<D>(interface: I, reset: R, delay: &mut D) -> Result<Self, IliError>
    where
        D: DelayMs<u16>,
    {
        let ili = Ili9341::new(
            interface,
            reset,
            delay,
            Orientation::Portrait,
            DisplaySize240x320,
        )
        .map_err(IliError)?;

        Ok(IliLcd {
            ili,
            cursor: Point::zero(),
        })
    }

    fn fill(&mut self, top_left: Point, bottom_right: Point, color: Rgb565) -> Result<(), IliError> {
        Rectangle::new(top_left, bottom_right)
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(&mut self.ili)
            .map_err(IliError)
    }
}

impl<I, R> Surface for IliLcd<I, R>
where
    I: WriteOnlyDataCommand,
    R: OutputPin<Error = Infallible>,
{
    type Error = IliError;

    fn clear(&mut self, color: Rgb565) -> Result<(), Self::Error> {
        self.ili.clear(color).map_err(IliError)
    }

    fn set_cursor(&mut self, column: u16, row: u16) -> Result<(), Self::Error> {
        self.cursor = Point::new(column as i32 * Cell::WIDTH, row as i32 * Cell::HEIGHT);
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> Result<(), Self::Error> {
        Text::new(text, self.cursor)
            .into_styled(TextStyle::new(Font6x8, Rgb565::WHITE))
            .draw(&mut self.ili)
            .map_err(IliError)?;
        self.cursor.x += text.len() as i32 * Cell::WIDTH;
        Ok(())
    }

    fn draw_vertical_span(
        &mut self,
        column: u16,
        row: u16,
        length: u16,
        color: Rgb565,
    ) -> Result<(), Self::Error> {
        // Rectangle corners are inclusive
        match span_rows(row, length) {
            Some((first, last)) => self.fill(
                Point::new(column as i32, first as i32),
                Point::new(column as i32, last as i32),
                color,
            ),
            None => Ok(()),
        }
    }

    fn clear_plot_region(&mut self, _min_y: i32, _max_y: i32) -> Result<(), Self::Error> {
        self.fill(
            Point::new(Region::LEFT as i32, Region::TOP as i32),
            Point::new(Region::RIGHT as i32, Region::BOTTOM as i32),
            Rgb565::BLACK,
        )
    }
}
