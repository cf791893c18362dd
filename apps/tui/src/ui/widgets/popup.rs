use crate::app::state::CitySearch;
use crate::cli::CliArgs;
use crate::ui::widgets::tables::scroll_offset;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::prelude::Buffer;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Widget, Wrap};
use ratatui::Frame;

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub struct ClearWidget;

impl Widget for ClearWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        ratatui::widgets::Clear.render(area, buf);
    }
}

pub fn key_span(key: &str) -> Span<'_> {
    Span::styled(
        key,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
}

fn key_line(key: &'static str, description: &'static str) -> TextLine<'static> {
    TextLine::from(vec![
        key_span(key),
        Span::styled(format!(" - {description}"), Style::default()),
    ])
}

pub fn render_help_popup(f: &mut Frame<'_>, area: Rect) {
    let popup_area = centered_rect(80, 80, area);
    f.render_widget(ClearWidget, popup_area);

    let help_block = Block::default()
        .title("== Help & Keyboard Shortcuts ==")
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let help_paragraph = Paragraph::new(Text::from(build_help_lines()))
        .block(help_block)
        .wrap(Wrap { trim: true });
    f.render_widget(help_paragraph, popup_area);

    let hint = Paragraph::new(Span::styled(
        "Press ? or Esc to close",
        Style::default().fg(Color::Gray),
    ))
    .alignment(Alignment::Center);

    let hint_area = Rect {
        x: popup_area.x,
        y: popup_area.y + popup_area.height.saturating_sub(2),
        width: popup_area.width,
        height: 1,
    };
    f.render_widget(hint, hint_area);
}

fn build_help_lines() -> Vec<TextLine<'static>> {
    let heading = |text: &'static str| {
        TextLine::from(Span::styled(
            text,
            Style::default().add_modifier(Modifier::BOLD),
        ))
    };

    let mut lines = vec![
        TextLine::from(Span::styled(
            "Climate Action Plan Dashboard",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        TextLine::from(""),
        TextLine::from(
            "Compares how Canadian municipalities, their provinces and the country use policy levers and strategies in climate action plans.",
        ),
        TextLine::from(""),
        heading("Keyboard Shortcuts:"),
        key_line("  1 / 2 / 3", "National, provincial or municipal view"),
        key_line("  Tab", "Move focus between province, municipality and lever"),
        key_line("  Up / Down", "Change the focused selection"),
        key_line("  Backspace", "Clear the focused selection"),
        key_line("  Left / Right", "Switch chart"),
        key_line("  /", "Search municipalities"),
        key_line("  m", "Map of municipalities with a plan"),
        key_line("  ? / F1", "Toggle this help popup"),
        key_line("  q", "Quit application"),
        TextLine::from(""),
        heading("Charts:"),
        TextLine::from("  Policy levers - share of actions per lever, compared with the wider geography"),
        TextLine::from("  Strategies - strategies used within the chosen policy lever"),
        TextLine::from("  Actions by province - number of actions recorded for each province"),
        TextLine::from(""),
        heading("CLI Options:"),
    ];

    for line in CliArgs::help_text().lines() {
        if line.starts_with("Usage") || line.starts_with("Options") || line.trim().is_empty() {
            continue;
        }
        lines.push(TextLine::from(line.to_string()));
    }

    lines
}

pub fn render_search_popup(search: &CitySearch, f: &mut Frame<'_>, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    f.render_widget(ClearWidget, popup_area);

    let block = Block::default()
        .title(" Find a municipality ")
        .title_style(Style::default().fg(Color::Green))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let inner = block.inner(popup_area).inner(Margin::new(1, 0));
    f.render_widget(block, popup_area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let query = Paragraph::new(TextLine::from(vec![
        Span::styled("> ", Style::default().fg(Color::Green)),
        Span::styled(search.query.as_str(), Style::default().fg(Color::White)),
        Span::styled("█", Style::default().fg(Color::Green)),
    ]));
    f.render_widget(query, layout[0]);

    let visible = usize::from(layout[1].height);
    let offset = scroll_offset(search.matches.len(), visible, search.selected);
    let lines = if search.matches.is_empty() {
        vec![TextLine::from(Span::styled(
            "No matching municipality",
            Style::default().fg(Color::Gray),
        ))]
    } else {
        search
            .matches
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(index, entry)| {
                let style = if index == search.selected {
                    Style::default()
                        .bg(Color::Rgb(0, 0, 238))
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                TextLine::from(vec![
                    Span::styled(entry.city.clone(), style),
                    Span::styled(format!("  {}", entry.province), Style::default().fg(Color::Gray)),
                ])
            })
            .collect()
    };
    f.render_widget(Paragraph::new(Text::from(lines)), layout[1]);

    let hint = Paragraph::new(TextLine::from(vec![
        key_span("Enter"),
        Span::styled(": Select | ", Style::default().fg(Color::Gray)),
        key_span("Esc"),
        Span::styled(": Cancel", Style::default().fg(Color::Gray)),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(hint, layout[2]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_stays_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(80, 80, area);
        assert_eq!(popup.width, 80);
        assert_eq!(popup.height, 40);
        assert_eq!((popup.x, popup.y), (10, 5));
    }

    #[test]
    fn help_lists_cli_options() {
        let text = build_help_lines()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        assert!(text.contains("--data-dir"));
        assert!(!text.contains("Usage"));
    }
}
