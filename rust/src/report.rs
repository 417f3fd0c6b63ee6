//! Text report of a calendar's contents.

use std::io::{self, Write};

use crate::calendar::Calendar;

/// Write one `clock type unit status` line per live event, in clock order.
/// Returns the number of lines written.
pub fn write_report<W: Write>(calendar: &dyn Calendar, out: &mut W) -> io::Result<usize> {
    let mut lines = 0;
    for event in calendar.events() {
        writeln!(out, "{}", event)?;
        lines += 1;
    }
    out.flush()?;
    Ok(lines)
}
