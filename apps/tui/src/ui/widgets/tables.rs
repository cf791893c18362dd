use cap_core::PlanDetail;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

/// First row to draw so that `selected_index` stays visible.
pub const fn scroll_offset(
    total_rows: usize,
    max_visible_rows: usize,
    selected_index: usize,
) -> usize {
    if total_rows <= max_visible_rows {
        return 0;
    }

    if selected_index >= max_visible_rows {
        return selected_index.saturating_sub(max_visible_rows) + 1;
    }

    0
}

pub fn render_plan_detail(detail: Option<&PlanDetail>, f: &mut Frame<'_>, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Municipality"),
        Cell::from("Climate action plan"),
        Cell::from("Year"),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let rows = match detail {
        Some(detail) => vec![Row::new(vec![
            Cell::from(detail.municipality.clone()),
            Cell::from(detail.plan_link.clone()).style(Style::default().fg(Color::Cyan)),
            Cell::from(detail.year.clone()),
        ])],
        None => vec![Row::new(vec![
            Cell::from("Choose a municipality"),
            Cell::from(""),
            Cell::from(""),
        ])
        .style(Style::default().fg(Color::Gray))],
    };

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(30),
            Constraint::Percentage(55),
            Constraint::Percentage(15),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(" Plan ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)),
    );

    f.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::scroll_offset;

    #[test]
    fn short_lists_do_not_scroll() {
        assert_eq!(scroll_offset(5, 10, 4), 0);
    }

    #[test]
    fn selection_below_the_fold_scrolls_into_view() {
        assert_eq!(scroll_offset(30, 10, 9), 0);
        assert_eq!(scroll_offset(30, 10, 10), 1);
        assert_eq!(scroll_offset(30, 10, 29), 20);
    }
}
