// WHY: turns raw caption text into ordered timed blocks; header and malformed cues never reach grouping

use anyhow::Result;
use regex_automata::meta::Regex;
use regex_automata::util::captures::Captures;
use std::fmt;
use tracing::{debug, warn};

use crate::error::CaptionError;

/// Millisecond offset into a video
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// `None` when the total does not fit in a `u64` of milliseconds
    pub fn from_parts(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Option<Self> {
        hours
            .checked_mul(60)?
            .checked_add(minutes)?
            .checked_mul(60)?
            .checked_add(seconds)?
            .checked_mul(1000)?
            .checked_add(millis)
            .map(Self)
    }

    pub fn millis(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.0;
        write!(
            f,
            "{:02}:{:02}:{:02}.{:03}",
            ms / 3_600_000,
            (ms / 60_000) % 60,
            (ms / 1000) % 60,
            ms % 1000
        )
    }
}

/// Closed time interval; construction guarantees `end >= start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSpan {
    start: Timestamp,
    end: Timestamp,
}

impl TimeSpan {
    pub fn new(start: Timestamp, end: Timestamp) -> Option<Self> {
        (end >= start).then_some(Self { start, end })
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// Signed distance from the end of `self` to the start of `next`; negative when they overlap in time
    pub fn gap_ms_to(&self, next: &TimeSpan) -> i64 {
        next.start.0 as i64 - self.end.0 as i64
    }

    /// Span covering both intervals, keeping `self`'s start
    pub fn extend_to(&self, later: &TimeSpan) -> TimeSpan {
        TimeSpan {
            start: self.start,
            end: later.end.max(self.start),
        }
    }
}

/// One parsed cue: its timing and the text lines under it, markup already removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub span: TimeSpan,
    pub lines: Vec<String>,
}

/// Result of parsing one caption file
#[derive(Debug, Clone, Default)]
pub struct ParsedCaptions {
    pub blocks: Vec<TextBlock>,
    /// Cues skipped because their timing line did not describe a valid span
    pub malformed_blocks: usize,
}

/// Line-oriented caption parser
pub struct CueParser {
    timing: Regex,
    markup: Regex,
}

impl CueParser {
    /// Compile the timing and markup patterns
    pub fn new() -> Result<Self> {
        // WHY: anchored prefix only; style directives after the end time are ignored
        let timing = Regex::new(
            r"^([0-9]{2,}):([0-9]{2}):([0-9]{2})\.([0-9]{3}) --> ([0-9]{2,}):([0-9]{2}):([0-9]{2})\.([0-9]{3})",
        )?;
        let markup = Regex::new(r"<.+?>")?;
        Ok(Self { timing, markup })
    }

    /// Parse the full text of one caption file into ordered blocks
    pub fn parse(&self, text: &str) -> ParsedCaptions {
        let lines: Vec<&str> = text.lines().collect();
        let timing_lines: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, line)| self.timing.is_match(line))
            .map(|(idx, _)| idx)
            .collect();

        let mut parsed = ParsedCaptions::default();
        for (pos, &timing_idx) in timing_lines.iter().enumerate() {
            let body_end = timing_lines.get(pos + 1).copied().unwrap_or(lines.len());
            let followed_by_cue = body_end < lines.len();

            let span = match self.parse_timing(lines[timing_idx], timing_idx + 1) {
                Ok(span) => span,
                Err(err) => {
                    warn!(error = %err, "Skipping malformed caption block");
                    parsed.malformed_blocks += 1;
                    continue;
                }
            };

            let mut body = &lines[timing_idx + 1..body_end];
            // Next cue's index sits directly above its timing line
            if followed_by_cue {
                if let Some((last, rest)) = body.split_last() {
                    if is_cue_index(last) {
                        body = rest;
                    }
                }
            }
            while let Some((last, rest)) = body.split_last() {
                if !last.trim().is_empty() {
                    break;
                }
                body = rest;
            }

            parsed.blocks.push(TextBlock {
                span,
                lines: body.iter().map(|line| self.clean_markup(line)).collect(),
            });
        }

        debug!(
            blocks = parsed.blocks.len(),
            malformed = parsed.malformed_blocks,
            "Parsed caption text"
        );
        parsed
    }

    /// Drop `<...>` styling tags and decode HTML entities
    pub fn clean_markup(&self, line: &str) -> String {
        let mut stripped = String::with_capacity(line.len());
        let mut last = 0;
        for m in self.markup.find_iter(line) {
            stripped.push_str(&line[last..m.start()]);
            last = m.end();
        }
        stripped.push_str(&line[last..]);
        html_escape::decode_html_entities(&stripped).into_owned()
    }

    fn parse_timing(&self, line: &str, line_no: usize) -> std::result::Result<TimeSpan, CaptionError> {
        let malformed = |reason: &str| CaptionError::MalformedBlock {
            line: line_no,
            reason: reason.to_string(),
        };

        let mut caps = self.timing.create_captures();
        self.timing.captures(line, &mut caps);
        if !caps.is_match() {
            return Err(malformed("missing time range"));
        }

        let mut fields = [0u64; 8];
        for (i, field) in fields.iter_mut().enumerate() {
            *field = capture_number(&caps, line, i + 1).ok_or_else(|| malformed("unreadable number"))?;
        }
        let [sh, sm, ss, sms, eh, em, es, ems] = fields;
        if sm >= 60 || ss >= 60 || em >= 60 || es >= 60 {
            return Err(malformed("minutes or seconds out of range"));
        }

        let start = Timestamp::from_parts(sh, sm, ss, sms).ok_or_else(|| malformed("start time out of range"))?;
        let end = Timestamp::from_parts(eh, em, es, ems).ok_or_else(|| malformed("end time out of range"))?;
        TimeSpan::new(start, end).ok_or_else(|| malformed("end precedes start"))
    }
}

fn capture_number(caps: &Captures, haystack: &str, group: usize) -> Option<u64> {
    let span = caps.get_group(group)?;
    haystack[span.range()].parse().ok()
}

fn is_cue_index(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit())
}
