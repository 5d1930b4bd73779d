//! The static ssh window transcript served by `watch_ssh_window`.

/// Separator placed between transcript lines in the rendered output.
pub const LINE_SEPARATOR: &str = "\n---\n";

/// Banner and command help as shown in an agent ssh window.
pub const WINDOW_TRANSCRIPT: &str = r#"       ______
      /\     \
     />.\_____\
   __\  /  ___/__        _ROMA__
  /\  \/__/\     \  ____/
 /O \____/*?\_____\
 \  /    \  /     /                 [A seamless solution for remote access, ensuring both efficiency and security.]
  \/_____/\/_____/
commands:use In 1s whoami awk clear exit grep help history
agent.roma ~ help
use [OPTIONS]TYPE
Switch to specified TYPE of resource,TYPE is linux,router,windows,docker,database,switch,etc.
Usage:
-h,--help Display this help message
1n [-t TYPE]RESOURCE or RESOURCE
Login the specified TYPE of resource,TYPE is linux,router,windows,docker,database,switch;RESOURCE for ls Query,etc.
Usage:
-t,--type=TYPE Resource type
-h,--help
Display this help message
1s [OPTIONS]TYPE
List the specified TYPE of resource,TYPE is linux,router,windows,docker,database,switch,etc.
Usage:
-1,--list Display detailed information
-a,--all Display all resource
-h,--help Display this help message
whoami Get user(me)information
awk [OPTIONS]PATTERN ACTION
Process the input text according to the specified PATTERN and ACTION.
Usage:
-F,--field-separator-FIELD-SEPARATOR Specify the field separator
-h,--help
Display this help message
clearClear the screen
exit Exit the program
grep Search for PATTERN in input
help -Gets more help messages for commands
history Display command history
agent.roma ~"#;

/// Re-delimit `text` line by line with [`LINE_SEPARATOR`].
///
/// Empty lines are dropped, so runs of newlines collapse into one separator.
pub fn redelimit(text: &str) -> String {
    text.split('\n')
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(LINE_SEPARATOR)
}

/// The rendered window content.
pub fn render_window() -> String {
    redelimit(WINDOW_TRANSCRIPT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_starts_with_banner() {
        let rendered = render_window();
        assert!(rendered.starts_with("       ______\n---\n      /\\     \\\n---\n"));
        assert!(rendered.ends_with("history Display command history\n---\nagent.roma ~"));
    }

    #[test]
    fn test_render_roundtrip() {
        let rendered = render_window();
        let restored = rendered
            .split(LINE_SEPARATOR)
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(restored, WINDOW_TRANSCRIPT);
    }

    #[test]
    fn test_one_separator_per_line_break() {
        let rendered = render_window();
        let lines = WINDOW_TRANSCRIPT.lines().count();
        assert_eq!(rendered.matches(LINE_SEPARATOR).count(), lines - 1);
    }

    #[test]
    fn test_redelimit_collapses_blank_lines() {
        assert_eq!(redelimit("\na\n\n\nb\n"), "a\n---\nb");
        assert_eq!(redelimit(""), "");
        assert_eq!(redelimit("single"), "single");
    }

    #[test]
    fn test_redelimit_keeps_whitespace_lines() {
        assert_eq!(redelimit("a\n  \nb"), "a\n---\n  \n---\nb");
    }
}
