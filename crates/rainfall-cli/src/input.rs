use std::io::BufRead;

use chrono::NaiveDate;
use rainfall_core::InputError;
use rainfall_weather::cache::DATE_KEY_FORMAT;

/// Typing this at the city prompt ends the session (any letter case).
pub const EXIT_COMMAND: &str = "end";

pub fn is_exit_command(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(EXIT_COMMAND)
}

/// Parse the date prompt: blank means tomorrow, anything else must be `YYYY-MM-DD`.
pub fn parse_date_input(input: &str, today: NaiveDate) -> Result<NaiveDate, InputError> {
    let input = input.trim();
    if input.is_empty() {
        return today
            .succ_opt()
            .ok_or_else(|| InputError::MalformedDate(String::new()));
    }

    NaiveDate::parse_from_str(input, DATE_KEY_FORMAT)
        .map_err(|_| InputError::MalformedDate(input.to_string()))
}

/// One line without its terminator, or `None` at end of input.
pub fn read_line<R: BufRead>(input: &mut R) -> std::io::Result<Option<String>> {
    let mut buf = String::new();
    if input.read_line(&mut buf)? == 0 {
        return Ok(None);
    }
    Ok(Some(buf.trim_end_matches(|c| c == '\r' || c == '\n').to_string()))
}
