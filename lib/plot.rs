use core::fmt::Write;

use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use heapless::String;

use crate::error::{Error, Result};
use crate::fixed::Fixed;
use crate::hw::Surface;

/// Data-space rectangle shown by a plot, resolution 0.001.
///
/// Callers must keep `min_x < max_x` and `min_y < max_y`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlotDomain {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

/// Pixel position of a mapped point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Pixel {
    pub column: u16,
    pub row: u16,
}

pub(crate) struct Region;

impl Region {
    pub(crate) const LEFT: i64 = 0;
    pub(crate) const RIGHT: i64 = 127;
    pub(crate) const TOP: i64 = 32;
    pub(crate) const BOTTOM: i64 = 159;

    const WIDTH: i64 = Region::RIGHT - Region::LEFT;
    const HEIGHT: i64 = Region::BOTTOM - Region::TOP;
}

pub(crate) struct Color;

impl Color {
    pub(crate) const BACKGROUND: Rgb565 = Rgb565::BLACK;
    pub(crate) const DATA: Rgb565 = Rgb565::BLUE;
}

/// X-Y plot drawn as vertical bars from each point down to the bottom of the
/// plot region.
pub struct PlotSession<S>
where
    S: Surface,
{
    surface: S,
    domain: PlotDomain,
}

impl<S> PlotSession<S>
where
    S: Surface,
{
    pub fn new(surface: S, title: &str, domain: PlotDomain) -> Result<Self, S::Error> {
        let mut session = PlotSession { surface, domain };
        session.init(title, domain)?;
        Ok(session)
    }

    /// Clears the screen, writes `title` and switches to `domain`.
    pub fn init(&mut self, title: &str, domain: PlotDomain) -> Result<(), S::Error> {
        self.surface.clear(Color::BACKGROUND).map_err(Error::Lcd)?;
        self.surface.set_cursor(0, 0).map_err(Error::Lcd)?;
        self.surface.write_str(title).map_err(Error::Lcd)?;
        self.surface
            .clear_plot_region(domain.min_y, domain.max_y)
            .map_err(Error::Lcd)?;
        self.domain = domain;
        Ok(())
    }

    pub fn domain(&self) -> PlotDomain {
        self.domain
    }

    /// Pixel for a data point, `None` when the point lies outside the domain.
    pub fn map(&self, x: i32, y: i32) -> Option<Pixel> {
        let d = self.domain;
        if x < d.min_x || x > d.max_x || y < d.min_y || y > d.max_y {
            return None;
        }

        let x_span = i64::from(d.max_x) - i64::from(d.min_x);
        let y_span = i64::from(d.max_y) - i64::from(d.min_y);
        let column = Region::RIGHT - Region::WIDTH * (i64::from(d.max_x) - i64::from(x)) / x_span;
        let row = Region::TOP + Region::HEIGHT * (i64::from(d.max_y) - i64::from(y)) / y_span;

        Some(Pixel {
            column: column.max(Region::LEFT).min(Region::RIGHT) as u16,
            row: row.max(Region::TOP).min(Region::BOTTOM) as u16,
        })
    }

    /// Draws every `(xs[i], ys[i])` pair inside the domain. Extra elements of
    /// the longer slice are ignored.
    pub fn plot<X, Y>(&mut self, xs: &[X], ys: &[Y]) -> Result<(), S::Error>
    where
        X: Copy + Into<i32>,
        Y: Copy + Into<i32>,
    {
        for (x, y) in xs.iter().zip(ys.iter()) {
            if let Some(pixel) = self.map((*x).into(), (*y).into()) {
                self.draw_bar(pixel)?;
            }
        }
        Ok(())
    }

    fn draw_bar(&mut self, pixel: Pixel) -> Result<(), S::Error> {
        let length = Region::BOTTOM as u16 - pixel.row;
        self.surface
            .draw_vertical_span(pixel.column, pixel.row, length, Color::DATA)
            .map_err(Error::Lcd)
    }

    /// Writes `label` followed by a fixed-point value at a character cell.
    pub fn readout(
        &mut self,
        column: u16,
        row: u16,
        label: &str,
        value: Fixed,
    ) -> Result<(), S::Error> {
        let mut buffer = String::<24>::new();
        write!(&mut buffer, "{}{}", label, value).map_err(|_| Error::BufferWrite)?;
        self.surface.set_cursor(column, row).map_err(Error::Lcd)?;
        self.surface.write_str(&buffer).map_err(Error::Lcd)
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn release(self) -> S {
        self.surface
    }
}
