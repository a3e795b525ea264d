//! Operator input parsing.
//!
//! [`parse_line`] is total: every line maps to an [`Input`]. Malformed
//! input degrades to a literal data message instead of an error, so the
//! operator never has a keystroke sequence rejected.
//!
//! | Input                      | Result                              |
//! |----------------------------|-------------------------------------|
//! | blank                      | [`Input::Empty`]                    |
//! | `/help`, `/h`              | [`Command::Help`]                   |
//! | `/quit`, `/q`              | [`Command::Quit`]                   |
//! | `event: <name> <payload>`  | named event                         |
//! | `event:` (no name)         | data message with the whole line    |
//! | `data: <payload>`          | data message                        |
//! | anything else              | data message with the whole line    |

use super::Message;

const DATA_PREFIX: &str = "data:";
const EVENT_PREFIX: &str = "event:";

/// Console commands recognised by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Print usage.
    Help,
    /// Stop the server and leave the console.
    Quit,
}

/// Classification of one operator line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Nothing to do.
    Empty,
    /// A console command.
    Command(Command),
    /// A message to broadcast.
    Publish(Message),
}

/// Parses one raw operator line.
#[must_use]
pub fn parse_line(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }

    if let Some(command) = parse_command(line) {
        return Input::Command(command);
    }

    if let Some(rest) = strip_prefix_ignore_case(line, DATA_PREFIX) {
        return Input::Publish(Message::data(rest.trim()));
    }

    if let Some(rest) = strip_prefix_ignore_case(line, EVENT_PREFIX) {
        let rest = rest.trim();
        return match rest.split_once(char::is_whitespace) {
            Some((name, payload)) => Input::Publish(Message::named(name, payload.trim())),
            None if !rest.is_empty() => Input::Publish(Message::named(rest, "")),
            None => Input::Publish(Message::data(line)),
        };
    }

    Input::Publish(Message::data(line))
}

fn parse_command(line: &str) -> Option<Command> {
    let lower = line.to_ascii_lowercase();
    match lower.as_str() {
        "/help" | "/h" => Some(Command::Help),
        "/quit" | "/q" => Some(Command::Quit),
        _ => None,
    }
}

/// ASCII case-insensitive `strip_prefix`.
fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        line.get(prefix.len()..)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_event_with_payload() {
        assert_eq!(
            parse_line("event: alert Server down"),
            Input::Publish(Message::named("alert", "Server down"))
        );
    }

    #[test]
    fn data_prefix_and_bare_line_are_equivalent() {
        assert_eq!(parse_line("data: hi"), Input::Publish(Message::data("hi")));
        assert_eq!(parse_line("hi"), Input::Publish(Message::data("hi")));
    }

    #[test]
    fn blank_lines_are_noops() {
        assert_eq!(parse_line(""), Input::Empty);
        assert_eq!(parse_line("   \t "), Input::Empty);
    }

    #[test]
    fn commands_are_case_insensitive() {
        assert_eq!(parse_line("/help"), Input::Command(Command::Help));
        assert_eq!(parse_line(" /H "), Input::Command(Command::Help));
        assert_eq!(parse_line("/QUIT"), Input::Command(Command::Quit));
        assert_eq!(parse_line("/q"), Input::Command(Command::Quit));
    }

    #[test]
    fn prefixes_are_case_insensitive() {
        assert_eq!(parse_line("DATA: x"), Input::Publish(Message::data("x")));
        assert_eq!(
            parse_line("Event: status ok"),
            Input::Publish(Message::named("status", "ok"))
        );
    }

    #[test]
    fn event_without_payload_has_empty_payload() {
        assert_eq!(
            parse_line("event: ping"),
            Input::Publish(Message::named("ping", ""))
        );
    }

    #[test]
    fn event_without_name_falls_back_to_data() {
        assert_eq!(
            parse_line("event:"),
            Input::Publish(Message::data("event:"))
        );
        assert_eq!(
            parse_line("  event:   "),
            Input::Publish(Message::data("event:"))
        );
    }

    #[test]
    fn payload_keeps_inner_whitespace() {
        assert_eq!(
            parse_line("event: log a  b   c"),
            Input::Publish(Message::named("log", "a  b   c"))
        );
    }

    #[test]
    fn data_prefix_without_space() {
        assert_eq!(parse_line("data:hi"), Input::Publish(Message::data("hi")));
        assert_eq!(parse_line("data:"), Input::Publish(Message::data("")));
    }

    #[test]
    fn unknown_slash_command_is_data() {
        assert_eq!(
            parse_line("/unknown"),
            Input::Publish(Message::data("/unknown"))
        );
    }

    #[test]
    fn multibyte_input_does_not_split_chars() {
        assert_eq!(parse_line("héllo"), Input::Publish(Message::data("héllo")));
        assert_eq!(parse_line("é"), Input::Publish(Message::data("é")));
    }
}
