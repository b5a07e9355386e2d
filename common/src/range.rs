//! # Hall-Ticket Ranges
//!
//! A run covers an inclusive range of numeric hall tickets. Ranges are written
//! either as two full numbers (`110624861001-110624861064`) or with an
//! abbreviated end that replaces the trailing digits of the start
//! (`110624861001-64`).

use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("range must look like START-END, got '{0}'")]
    MissingSeparator(String),
    #[error("invalid hall ticket number '{input}': {source}")]
    InvalidNumber {
        input: String,
        #[source]
        source: ParseIntError,
    },
    #[error("end of range cannot be empty: {0}")]
    EmptyEnd(String),
    #[error("end hall ticket {end} is before start {start}")]
    Reversed { start: u64, end: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TicketRange {
    pub start: u64,
    pub end: u64,
}

impl TicketRange {
    pub fn new(start: u64, end: u64) -> Result<Self, RangeError> {
        if end < start {
            return Err(RangeError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn to_iter(&self) -> impl Iterator<Item = u64> + use<> {
        self.start..=self.end
    }

    /// Hall tickets as they are submitted to the result form.
    pub fn tickets(&self) -> impl Iterator<Item = String> + use<> {
        self.to_iter().map(|ticket| ticket.to_string())
    }

    pub fn len(&self) -> u64 {
        (self.end - self.start).saturating_add(1)
    }

    /// A range always holds at least its start.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl FromStr for TicketRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some((start_str, end_str)) = s.split_once('-') else {
            return Err(RangeError::MissingSeparator(s.to_string()));
        };

        let start_str = start_str.trim();
        let start = parse_ticket(start_str)?;
        let end = parse_range_end(end_str.trim(), start_str, s)?;

        TicketRange::new(start, end)
    }
}

fn parse_ticket(s: &str) -> Result<u64, RangeError> {
    s.parse::<u64>().map_err(|source| RangeError::InvalidNumber {
        input: s.to_string(),
        source,
    })
}

/// Resolves the end of a range.
///
/// An end with at least as many digits as the start is taken verbatim,
/// a shorter one overwrites the start's trailing digits.
fn parse_range_end(end_str: &str, start_str: &str, original_s: &str) -> Result<u64, RangeError> {
    if end_str.is_empty() {
        return Err(RangeError::EmptyEnd(original_s.to_string()));
    }
    // Validate before splicing so the error names what the user typed.
    parse_ticket(end_str)?;

    if end_str.len() >= start_str.len() {
        return parse_ticket(end_str);
    }

    let prefix_len = start_str.len() - end_str.len();
    let spliced = format!("{}{}", &start_str[..prefix_len], end_str);
    parse_ticket(&spliced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_end_helper() {
        let start = "110624861001";
        let s = "110624861001-064";

        // Full end
        assert_eq!(parse_range_end("110624861064", start, s), Ok(110624861064));

        // Abbreviated ends overwrite the trailing digits
        assert_eq!(parse_range_end("64", start, s), Ok(110624861064));
        assert_eq!(parse_range_end("064", start, s), Ok(110624861064));
        assert_eq!(parse_range_end("2001", start, s), Ok(110624862001));

        // --- Error Cases ---
        assert!(matches!(
            parse_range_end("", start, s),
            Err(RangeError::EmptyEnd(_))
        ));
        assert!(matches!(
            parse_range_end("6x", start, s),
            Err(RangeError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_from_str_full_parsing() {
        assert_eq!(
            TicketRange::from_str("110624861001-110624861064"),
            Ok(TicketRange { start: 110624861001, end: 110624861064 })
        );
        assert_eq!(
            TicketRange::from_str(" 110624861001 - 64 "),
            Ok(TicketRange { start: 110624861001, end: 110624861064 })
        );
        assert_eq!(TicketRange::from_str("5-5").map(|r| r.len()), Ok(1));

        assert!(matches!(
            TicketRange::from_str("110624861001"),
            Err(RangeError::MissingSeparator(_))
        ));
        assert!(matches!(
            TicketRange::from_str("abc-10"),
            Err(RangeError::InvalidNumber { .. })
        ));
        assert!(matches!(
            TicketRange::from_str("110624861064-01"),
            Err(RangeError::Reversed { .. })
        ));
    }

    #[test]
    fn tickets_cover_range_inclusively() {
        let range = TicketRange::new(110624861001, 110624861003).unwrap();
        let tickets: Vec<String> = range.tickets().collect();

        assert_eq!(range.len(), 3);
        assert_eq!(tickets, vec!["110624861001", "110624861002", "110624861003"]);
    }

    #[test]
    fn new_rejects_reversed_bounds() {
        assert_eq!(
            TicketRange::new(10, 9),
            Err(RangeError::Reversed { start: 10, end: 9 })
        );
    }
}
