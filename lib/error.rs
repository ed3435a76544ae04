pub type Result<T, LCDER> = core::result::Result<T, Error<LCDER>>;

#[derive(Debug, PartialEq)]
pub enum Error<LCD> {
    // Display surface error
    Lcd(LCD),
    // Text did not fit the formatting buffer
    BufferWrite,
}
