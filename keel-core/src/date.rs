use crate::{Error, Result};
use std::ops::Range;
use time::{
    Date,
    error::{Parse, ParseFromDescription},
    format_description::BorrowedFormatItem,
    macros::format_description,
};

/// The only textual date layout accepted for date parameters: `DD/MM/YYYY`.
///
/// Day and month are zero padded, the year has four digits. There is no
/// localization and no lenient fallback.
pub const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day]/[month]/[year]");

/// Parse a `DD/MM/YYYY` date.
///
/// Fails with [`Error::DateFormat`] on wrong separators, non numeric fields,
/// a day that does not exist in the given month and year, or trailing input.
///
/// ```rust
/// use keel_core::parse_date;
/// use time::Month;
/// let date = parse_date("22/04/1985").unwrap();
/// assert_eq!((date.year(), date.month(), date.day()), (1985, Month::April, 22));
/// ```
pub fn parse_date(text: &str) -> Result<Date> {
    check_digits(text)
        .map_err(Parse::ParseFromDescription)
        .and_then(|_| Date::parse(text, DATE_FORMAT))
        .map_err(|source| Error::DateFormat {
            input: text.to_owned(),
            source,
        })
}

/// Every field must be plain ASCII digits, `[year]` alone also takes a sign.
fn check_digits(text: &str) -> std::result::Result<(), ParseFromDescription> {
    let bytes = text.as_bytes();
    let digits = |range: Range<usize>, component: &'static str| match bytes.get(range) {
        Some(field) if field.iter().all(u8::is_ascii_digit) => Ok(()),
        _ => Err(ParseFromDescription::InvalidComponent(component)),
    };
    digits(0..2, "day")?;
    digits(3..5, "month")?;
    digits(6..10, "year")
}
