use std::fmt::Write;

use crate::list::ListState;

const HEADER: &str = "What should we buy at the market?";
const FOOTER: &str = "Press q to quit.";

/// Render the list state as plain text. Pure: equal states always produce
/// the same string, so redraws and tests can compare frames directly.
#[must_use]
pub fn render(state: &ListState) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push_str("\n\n");

    for (index, item) in state.items().iter().enumerate() {
        let cursor = if index == state.cursor() { ">" } else { " " };
        let checked = if state.selection().contains(&index) {
            "x"
        } else {
            " "
        };
        let _ = writeln!(out, "{cursor} [{checked}] {}", item.text);
    }

    out.push('\n');
    out.push_str(FOOTER);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::{InputEvent, Item, ListState};

    fn sample() -> ListState {
        ListState::new(vec![
            Item {
                text: "Buy carrots".into(),
                checked: false,
            },
            Item {
                text: "Buy celery".into(),
                checked: false,
            },
            Item {
                text: "Buy kohlrabi".into(),
                checked: false,
            },
        ])
    }

    #[test]
    fn renders_cursor_and_checked_markers() {
        let mut state = sample();
        for event in [
            InputEvent::MoveDown,
            InputEvent::Toggle,
            InputEvent::MoveDown,
            InputEvent::Toggle,
        ] {
            (state, _) = state.apply(event);
        }

        let text = render(&state);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[2], "  [ ] Buy carrots");
        assert_eq!(lines[3], "  [x] Buy celery");
        assert_eq!(lines[4], "> [x] Buy kohlrabi");
        assert_eq!(lines[6], FOOTER);
        assert_eq!(text.matches("[x]").count(), 2);
    }

    #[test]
    fn render_is_stable_for_equal_states() {
        let state = sample();
        assert_eq!(render(&state), render(&state.clone()));
    }

    #[test]
    fn empty_list_renders_header_and_footer_only() {
        let text = render(&ListState::new(Vec::new()));
        assert!(text.starts_with(HEADER));
        assert!(text.trim_end().ends_with(FOOTER));
        assert!(!text.contains('['));
    }
}
