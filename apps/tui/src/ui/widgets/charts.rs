use crate::app::{App, ChartTab};
use cap_core::display::segment_widths;
use cap_core::palette::series_color;
use cap_core::{DatasetKind, LoadState, LoadedDataset, StackedChart, TokenCounts};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Tabs, Wrap};
use ratatui::Frame;
use throbber_widgets_tui::Throbber;

const BAR_GLYPH: &str = "█";

pub fn render_chart_tabs(app: &App, f: &mut Frame<'_>, area: Rect) {
    let titles = ChartTab::ALL
        .iter()
        .map(|tab| TextLine::from(tab.label()))
        .collect::<Vec<_>>();

    let tabs = Tabs::new(titles)
        .select(app.chart_tab.index())
        .block(Block::default().borders(Borders::BOTTOM))
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Rgb(0, 0, 238))
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::raw("|"));

    f.render_widget(tabs, area);
}

pub fn render_chart_panel(app: &App, f: &mut Frame<'_>, area: Rect) {
    match app.chart_tab {
        ChartTab::Levers => {
            let state = app.session.state(DatasetKind::Actions);
            match app.lever_chart() {
                Some(chart) => render_stacked_chart(&chart, f, area),
                None => render_chart_placeholder(
                    app,
                    state,
                    "Choose a province (and municipality) for this view",
                    f,
                    area,
                ),
            }
        }
        ChartTab::Strategies => {
            let state = app.session.state(DatasetKind::ActionsModified);
            match app.strategy_chart() {
                Some(chart) => render_stacked_chart(&chart, f, area),
                None => render_chart_placeholder(
                    app,
                    state,
                    "Choose a policy lever and the geography to compare",
                    f,
                    area,
                ),
            }
        }
        ChartTab::Provinces => match app.province_counts() {
            Some(counts) => render_province_counts(&counts, f, area),
            None => render_chart_placeholder(
                app,
                app.session.state(DatasetKind::Actions),
                "No actions loaded",
                f,
                area,
            ),
        },
    }
}

/// Spinner while the dataset loads, the failure once it failed, otherwise
/// the hint for the selection still missing.
fn render_chart_placeholder(
    app: &App,
    state: &LoadState<LoadedDataset>,
    hint: &str,
    f: &mut Frame<'_>,
    area: Rect,
) {
    let block = Block::default()
        .title("Chart")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area).inner(Margin::new(1, 1));
    f.render_widget(block, area);

    match state {
        LoadState::Pending => {
            let throbber = Throbber::default()
                .label("Loading data...")
                .style(Style::default().fg(Color::Gray))
                .throbber_style(Style::default().fg(Color::Cyan));
            let mut throbber_state = app.throbber.clone();
            f.render_stateful_widget(throbber, inner, &mut throbber_state);
        }
        LoadState::Failed(reason) => {
            let paragraph = Paragraph::new(format!("Data unavailable: {reason}"))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            f.render_widget(paragraph, inner);
        }
        LoadState::Ready(_) => {
            let paragraph = Paragraph::new(hint)
                .style(Style::default().fg(Color::Gray))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            f.render_widget(paragraph, inner);
        }
    }
}

pub fn render_stacked_chart(chart: &StackedChart, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(chart.title.as_str())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area).inner(Margin::new(1, 0));
    f.render_widget(block, area);

    if chart.is_empty() {
        let paragraph = Paragraph::new("No actions match this selection")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center);
        f.render_widget(paragraph, inner);
        return;
    }

    let bar_rows = u16::try_from(chart.labels.len() * 2).unwrap_or(u16::MAX);
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(bar_rows),
            Constraint::Min(3),
        ])
        .split(inner);

    let description = Paragraph::new(chart.description.as_str())
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true });
    f.render_widget(description, layout[0]);

    let label_width = chart
        .labels
        .iter()
        .map(|label| label.chars().count())
        .max()
        .unwrap_or(0)
        .min(18);
    let bar_width = usize::from(layout[1].width).saturating_sub(label_width + 1);

    let mut lines = Vec::new();
    for (index, label) in chart.labels.iter().enumerate() {
        let values = chart
            .bar(index)
            .into_iter()
            .map(|(_, value)| value)
            .collect::<Vec<_>>();
        let mut spans = vec![Span::styled(
            format!("{:<label_width$} ", truncate(label, label_width)),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )];
        spans.extend(
            segment_widths(&values, bar_width)
                .into_iter()
                .enumerate()
                .filter(|(_, width)| *width > 0)
                .map(|(series, width)| {
                    Span::styled(
                        BAR_GLYPH.repeat(width),
                        Style::default().fg(rgb(series_color(chart.category, series))),
                    )
                }),
        );
        lines.push(TextLine::from(spans));
        lines.push(TextLine::from(""));
    }
    f.render_widget(Paragraph::new(Text::from(lines)), layout[1]);

    render_legend(chart, f, layout[2]);
}

fn render_legend(chart: &StackedChart, f: &mut Frame<'_>, area: Rect) {
    let mut lines = vec![TextLine::from(Span::styled(
        "Legend",
        Style::default().fg(Color::Gray),
    ))];

    for (index, series) in chart.series.iter().enumerate() {
        let shares = chart
            .labels
            .iter()
            .zip(&series.values)
            .map(|(label, value)| format!("{label} {value:.2}%"))
            .collect::<Vec<_>>()
            .join(" | ");
        lines.push(TextLine::from(vec![
            Span::styled(
                "■ ",
                Style::default().fg(rgb(series_color(chart.category, index))),
            ),
            Span::styled(series.label.clone(), Style::default().fg(Color::White)),
            Span::styled(
                format!("  {shares}"),
                Style::default().fg(Color::White).add_modifier(Modifier::DIM),
            ),
        ]));
    }

    let legend = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true });
    f.render_widget(legend, area);
}

pub fn render_province_counts(counts: &TokenCounts, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title("Actions by Province")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if counts.is_empty() {
        let paragraph = Paragraph::new("No actions available")
            .block(block)
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    }

    let bars: Vec<Bar<'_>> = counts
        .iter()
        .enumerate()
        .map(|(index, (province, count))| {
            Bar::default()
                .value(count)
                .label(TextLine::from(province.to_string()))
                .style(Style::default().fg(rgb(series_color(cap_core::Role::Lever, index))))
                .value_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        })
        .collect();

    let max_value = counts.iter().map(|(_, count)| count).max().unwrap_or(0).max(1);

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .max(max_value)
        .bar_gap(1)
        .bar_width(5);

    f.render_widget(chart, area);
}

fn truncate(label: &str, width: usize) -> String {
    if label.chars().count() <= width {
        return label.to_string();
    }
    let mut short = label.chars().take(width.saturating_sub(1)).collect::<String>();
    short.push('…');
    short
}

pub const fn rgb((red, green, blue): (u8, u8, u8)) -> Color {
    Color::Rgb(red, green, blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_labels_are_shortened() {
        assert_eq!(truncate("Newfoundland and Labrador", 8), "Newfoun…");
        assert_eq!(truncate("ON", 8), "ON");
    }
}
