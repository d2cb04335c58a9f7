//! Message parser - splits command text into a command name and arguments

use crate::domain::entities::InboundMessage;

/// Tokenizes inbound text that starts with the command marker
#[derive(Debug, Clone)]
pub struct MessageParser {
    command_prefix: String,
    separator: String,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
            separator: separator.into(),
        }
    }

    /// Fill in `command` and `args` when the text is a command.
    ///
    /// Returns whether the message is a command. A Telegram style
    /// `/cmd@botname` is reduced to `cmd`.
    pub fn parse(&self, message: &mut InboundMessage) -> bool {
        message.command = None;
        message.args.clear();

        let Some(rest) = message.text.strip_prefix(self.command_prefix.as_str()) else {
            return false;
        };

        let mut tokens = rest.split(self.separator.as_str()).filter(|t| !t.is_empty());
        let head = tokens.next().unwrap_or_default();
        let name = head.split('@').next().unwrap_or_default();

        message.command = Some(name.to_string());
        message.args = tokens.map(str::to_string).collect();
        true
    }

    /// Build the text a user would type for `command` with `args`
    pub fn compose(&self, command: &str, args: &[String]) -> String {
        let mut text = format!("{}{}", self.command_prefix, command);
        for arg in args {
            text.push_str(&self.separator);
            text.push_str(arg);
        }
        text
    }
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::new("/", " ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(text: &str) -> InboundMessage {
        let mut msg = InboundMessage::new(1, text);
        MessageParser::default().parse(&mut msg);
        msg
    }

    #[test]
    fn test_command_with_args() {
        let msg = parsed("/cmd arg1 arg2");
        assert_eq!(msg.command.as_deref(), Some("cmd"));
        assert_eq!(msg.args, vec!["arg1", "arg2"]);
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        let msg = parsed("hello there");
        assert!(msg.command.is_none());
        assert!(msg.args.is_empty());
    }

    #[test]
    fn test_repeated_separators_are_ignored() {
        let msg = parsed("/cmd  a   b");
        assert_eq!(msg.args, vec!["a", "b"]);
    }

    #[test]
    fn test_bot_mention_is_stripped() {
        let msg = parsed("/start@my_bot now");
        assert_eq!(msg.command.as_deref(), Some("start"));
        assert_eq!(msg.args, vec!["now"]);
    }

    #[test]
    fn test_reparse_clears_previous_command() {
        let parser = MessageParser::default();
        let mut msg = InboundMessage::new(1, "/a b");
        parser.parse(&mut msg);
        msg.text = "plain".to_string();

        assert!(!parser.parse(&mut msg));
        assert!(msg.command.is_none());
        assert!(msg.args.is_empty());
    }

    #[test]
    fn test_custom_prefix_and_separator() {
        let parser = MessageParser::new("!", ",");
        let mut msg = InboundMessage::new(1, "!go,x,y");
        assert!(parser.parse(&mut msg));
        assert_eq!(msg.command.as_deref(), Some("go"));
        assert_eq!(msg.args, vec!["x", "y"]);
        assert_eq!(parser.compose("go", &msg.args), "!go,x,y");
    }

    #[test]
    fn test_compose_matches_parse() {
        let parser = MessageParser::default();
        let text = parser.compose("help", &["x".to_string()]);
        assert_eq!(text, "/help x");
        assert_eq!(parsed(&text).args, vec!["x"]);
    }
}
