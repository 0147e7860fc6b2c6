use crate::app::App;
use crate::feed::Item;
use crate::util::{display_width, strip_control_chars, truncate_to_width};
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Render the item list, newest first.
pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    if app.list.filtered_len() == 0 {
        let msg = if app.list.items().is_empty() && app.scheduler.is_fetching() {
            "Loading feeds..."
        } else if app.list.items().is_empty() {
            "No items"
        } else {
            "No items match the filter"
        };
        let paragraph = Paragraph::new(msg)
            .style(app.palette.empty_list)
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    }

    f.render_widget(Paragraph::new(item_lines(app, area.width)), area);
}

/// Every visible item as terminal lines: badge and title, the description
/// when enabled, then a blank spacer.
pub(super) fn item_lines(app: &App, width: u16) -> Vec<Line<'static>> {
    let width = usize::from(width);
    let selected = app.list.selection_index();
    let mut lines = Vec::new();

    for (index, item) in app.list.visible_items() {
        let styles = RowStyles::for_item(app, item, selected == Some(index));
        let text_width = width.saturating_sub(app.badge_width + 1);

        lines.push(Line::from(vec![
            Span::styled(badge_text(&item.source.name, app.badge_width), styles.badge),
            Span::raw(" "),
            Span::styled(clip(&item.title, text_width), styles.title),
        ]));

        if app.config.show_descriptions {
            lines.push(Line::from(vec![
                Span::raw(" ".repeat(app.badge_width + 1)),
                Span::styled(clip(&item.description, text_width), styles.description),
            ]));
        }

        lines.push(Line::default());
    }
    lines
}

struct RowStyles {
    badge: Style,
    title: Style,
    description: Style,
}

impl RowStyles {
    /// Before the user touches a key every row gets full color. Once they're
    /// navigating, the selected title takes its source's badge colors and the
    /// other rows are dimmed.
    fn for_item(app: &App, item: &Item, is_selected: bool) -> Self {
        let palette = &app.palette;
        let badge = palette.badge(&item.source);

        if !app.interacting {
            return Self {
                badge,
                title: palette.title,
                description: palette.description,
            };
        }

        if is_selected {
            Self {
                badge,
                title: palette.title_selected.patch(badge),
                description: palette.description,
            }
        } else {
            Self {
                badge,
                title: palette.dimmed,
                description: palette.dimmed,
            }
        }
    }
}

/// Source name right-aligned in a `width`-column badge, clipped if longer.
fn badge_text(name: &str, width: usize) -> String {
    let name = strip_control_chars(name);
    let name = truncate_to_width(&name, width);
    let pad = width.saturating_sub(display_width(&name));
    format!("{}{}", " ".repeat(pad), name)
}

fn clip(text: &str, width: usize) -> String {
    let text = strip_control_chars(text);
    truncate_to_width(&text, width).into_owned()
}
