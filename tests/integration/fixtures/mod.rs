// Caption fixtures with known extraction results
// WHY: Golden-file testing requires deterministic input/output pairs for validation

#![allow(dead_code)]

/// Words every fixture below relies on; all lowercase so capitalized forms read as sentence starts
pub const LEXICON_WORDS: &[&str] = &[
    "hello", "world", "there", "how", "are", "you", "this", "is", "a", "test", "speaking", "we", "went", "home",
    "then", "it", "was", "good",
];

/// Separate cues far apart in time, with header metadata, cue indices, style directives and markup
pub const DIALOG_CAPTIONS: &str = "WEBVTT
Kind: captions
Language: en

1
00:00:00.000 --> 00:00:02.000 align:start position:0%
Hello, <c.colorE5E5E5>world.</c>
This is Dr. Smith speaking.

2
00:00:05.000 --> 00:00:06.000
[Laughter]

3
00:00:09.000 --> 00:00:10.000
THIS IS A TEST
";

pub const DIALOG_EXPECTED: &str = "Hello, world.
This is Dr. Smith speaking.
This is a test
";

/// Auto-generated style: each cue repeats the previous cue's last line
pub const ROLLING_CAPTIONS: &str = "WEBVTT

00:00:00.000 --> 00:00:01.000
hello there.

00:00:01.100 --> 00:00:02.000
hello there.
how are you?

00:00:02.100 --> 00:00:03.000
how are you?
";

pub const ROLLING_EXPECTED: &str = "hello there.
how are you?
";

/// Two cues close together that do not repeat text; lines are concatenated
pub const CONTIGUOUS_CAPTIONS: &str = "WEBVTT

00:00:00.000 --> 00:00:01.000
so it was good...

00:00:01.200 --> 00:00:02.000
Then we went home.
";

pub const CONTIGUOUS_EXPECTED: &str = "so it was good...
Then we went home.
";

/// One unparsable cue between two good ones
pub const MALFORMED_CAPTIONS: &str = "WEBVTT

00:00:00.000 --> 00:00:01.000
hello there.

00:00:61.000 --> 00:00:62.000
this never appears.

00:00:05.000 --> 00:00:04.000
neither does this.

00:00:09.000 --> 00:00:10.000
how are you?
";

pub const MALFORMED_EXPECTED: &str = "hello there.
how are you?
";
