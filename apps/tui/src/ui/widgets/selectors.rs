use crate::app::{App, Focus};
use crate::ui::widgets::tables::scroll_offset;
use cap_core::GeoView;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

const FOCUS_ORDER: [Focus; 3] = [Focus::Province, Focus::City, Focus::Lever];

pub fn render_selectors(app: &App, f: &mut Frame<'_>, area: Rect) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(area);

    for (focus, chunk) in FOCUS_ORDER.into_iter().zip(layout.iter()) {
        render_selector(app, focus, f, *chunk);
    }
}

/// Whether the current view reads this selector at all.
const fn used_by_view(view: GeoView, focus: Focus) -> bool {
    match focus {
        Focus::Province => !matches!(view, GeoView::National),
        Focus::City => matches!(view, GeoView::Municipal),
        Focus::Lever => true,
    }
}

fn render_selector(app: &App, focus: Focus, f: &mut Frame<'_>, area: Rect) {
    let focused = app.focus == focus;
    let border_color = if focused {
        Color::Yellow
    } else if used_by_view(app.view, focus) {
        Color::Green
    } else {
        Color::DarkGray
    };

    let title = match app.selected_for(focus) {
        Some(value) => format!(" {}: {value} ", focus.label()),
        None => format!(" {} ", focus.label()),
    };

    let block = Block::default()
        .title(title)
        .title_style(Style::default().fg(border_color))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let options = app.options_for(focus);
    if options.is_empty() {
        let hint = match focus {
            Focus::City if app.selection.province.is_none() => "Choose a province first",
            _ => "Nothing to choose yet",
        };
        f.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().fg(Color::Gray))),
            inner,
        );
        return;
    }

    let selected = app
        .selected_for(focus)
        .and_then(|value| options.iter().position(|option| option == value));
    let visible = usize::from(inner.height);
    let offset = scroll_offset(options.len(), visible, selected.unwrap_or(0));

    let lines = options
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(index, option)| {
            if Some(index) == selected {
                TextLine::from(Span::styled(
                    format!("> {option}"),
                    Style::default()
                        .bg(Color::Rgb(0, 0, 238))
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                TextLine::from(Span::styled(
                    format!("  {option}"),
                    Style::default().fg(Color::White),
                ))
            }
        })
        .collect::<Vec<_>>();

    f.render_widget(Paragraph::new(Text::from(lines)), inner);
}
