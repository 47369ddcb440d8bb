//! The dual-handle slider that picks the amount range in the filter form.

use crate::{Error, Page, page::element_ids};

const MAX_AMOUNT_ATTRIBUTE: &str = "data-max-amount";
const CURRENT_MIN_ATTRIBUTE: &str = "data-current-min";
const CURRENT_MAX_ATTRIBUTE: &str = "data-current-max";

/// A slider with a lower and an upper handle over whole amounts.
///
/// The range runs from zero to one past the largest transaction amount so
/// the largest amount itself can be included. The handles stay inside the
/// range and never cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountSlider {
    range_max: i64,
    lower: i64,
    upper: i64,
}

impl AmountSlider {
    /// Create a slider for amounts up to `max_amount` with the handles at
    /// `current_min` and `current_max`, clamped into range.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidSliderAttribute] if `max_amount` is negative
    /// or too large to extend the range past it.
    pub fn new(max_amount: i64, current_min: i64, current_max: i64) -> Result<Self, Error> {
        let invalid_max = || Error::InvalidSliderAttribute(MAX_AMOUNT_ATTRIBUTE.to_owned());

        if max_amount < 0 {
            return Err(invalid_max());
        }

        let range_max = max_amount.checked_add(1).ok_or_else(invalid_max)?;
        let lower = current_min.clamp(0, range_max);
        let upper = current_max.clamp(lower, range_max);

        Ok(Self {
            range_max,
            lower,
            upper,
        })
    }

    /// Set up the slider from the data attributes of `#amount-range-slider`.
    ///
    /// The current handle positions default to the whole range when they
    /// are missing or not numbers.
    ///
    /// # Errors
    ///
    /// Returns an [Error::InvalidSliderAttribute] if the maximum amount is
    /// missing, not a number or negative.
    pub fn from_page(page: &impl Page) -> Result<Self, Error> {
        let attribute = |name: &str| {
            page.attribute(element_ids::AMOUNT_RANGE_SLIDER, name)
                .as_deref()
                .and_then(parse_leading_integer)
        };

        let max_amount = attribute(MAX_AMOUNT_ATTRIBUTE)
            .ok_or_else(|| Error::InvalidSliderAttribute(MAX_AMOUNT_ATTRIBUTE.to_owned()))?;
        let current_min = attribute(CURRENT_MIN_ATTRIBUTE).unwrap_or(0);
        let current_max = attribute(CURRENT_MAX_ATTRIBUTE).unwrap_or(max_amount);

        Self::new(max_amount, current_min, current_max)
    }

    /// The smallest and largest values a handle can take.
    pub fn range(&self) -> (i64, i64) {
        (0, self.range_max)
    }

    /// The positions of the lower and upper handles.
    pub fn values(&self) -> (i64, i64) {
        (self.lower, self.upper)
    }

    /// Move the lower handle, stopping at zero and at the upper handle.
    pub fn set_lower(&mut self, value: i64) {
        self.lower = value.clamp(0, self.upper);
    }

    /// Move the upper handle, stopping at the lower handle and at the end of
    /// the range.
    pub fn set_upper(&mut self, value: i64) {
        self.upper = value.clamp(self.lower, self.range_max);
    }

    /// Copy the handle positions into the `amount_min` and `amount_max`
    /// inputs of the filter form.
    pub fn write_to(&self, page: &mut impl Page) {
        page.set_field_value(element_ids::AMOUNT_MIN, &self.lower.to_string());
        page.set_field_value(element_ids::AMOUNT_MAX, &self.upper.to_string());
    }
}

/// Parse the integer at the start of `text`, ignoring leading whitespace and
/// anything after the digits, e.g., `"120.75"` is 120.
fn parse_leading_integer(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, text.strip_prefix('+').unwrap_or(text)),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());

    digits[..end].parse::<i64>().ok().map(|value| sign * value)
}
