use crate::app::App;
use crate::ui::widgets::popup::key_span;
use crate::ui::widgets::tables::scroll_offset;
use cap_core::markers::{CityMarker, CANADA_BOUNDS};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::canvas::{Canvas, Map, MapResolution, Points};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

pub fn render_map(app: &App, f: &mut Frame<'_>) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(1)])
        .split(f.area().inner(Margin::new(2, 1)));

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(layout[0]);

    let markers = app.markers();
    let selected = markers.get(app.marker_index);

    render_canvas(&markers, selected, f, columns[0]);

    let side = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(3)])
        .split(columns[1]);
    render_marker_detail(selected, f, side[0]);
    render_marker_list(&markers, app.marker_index, f, side[1]);

    let hint = TextLine::from(vec![
        key_span("Left/Right"),
        Span::styled(": Municipality | ", Style::default().fg(Color::Gray)),
        key_span("Enter"),
        Span::styled(": Open in dashboard | ", Style::default().fg(Color::Gray)),
        key_span("Esc"),
        Span::styled(": Back | ", Style::default().fg(Color::Gray)),
        key_span("q"),
        Span::styled(": Quit", Style::default().fg(Color::Gray)),
    ]);
    f.render_widget(Paragraph::new(hint).alignment(Alignment::Center), layout[1]);
}

fn render_canvas(markers: &[CityMarker], selected: Option<&CityMarker>, f: &mut Frame<'_>, area: Rect) {
    let coords = markers
        .iter()
        .map(|marker| (marker.longitude, marker.latitude))
        .collect::<Vec<_>>();

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(format!(" Municipalities with a plan ({}) ", markers.len()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .marker(Marker::Braille)
        .x_bounds([CANADA_BOUNDS.west, CANADA_BOUNDS.east])
        .y_bounds([CANADA_BOUNDS.south, CANADA_BOUNDS.north])
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();
            ctx.draw(&Points {
                coords: &coords,
                color: Color::Green,
            });
            if let Some(marker) = selected {
                ctx.layer();
                ctx.draw(&Points {
                    coords: &[(marker.longitude, marker.latitude)],
                    color: Color::Yellow,
                });
                ctx.print(
                    marker.longitude,
                    marker.latitude,
                    Span::styled(
                        format!(" {}", marker.name_or_unknown()),
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                );
            }
        });

    f.render_widget(canvas, area);
}

fn render_marker_detail(marker: Option<&CityMarker>, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Municipality ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let label_style = Style::default().fg(Color::Gray);
    let value_style = Style::default().fg(Color::White);
    let field = |label: &'static str, value: String| {
        TextLine::from(vec![
            Span::styled(format!("{label}: "), label_style),
            Span::styled(value, value_style),
        ])
    };

    let lines = match marker {
        Some(marker) => vec![
            TextLine::from(Span::styled(
                marker.name_or_unknown().to_string(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            field("Province", marker.province.clone().unwrap_or_default()),
            field("Population", marker.population.clone().unwrap_or_default()),
            field("Plan year", marker.plan_year.clone().unwrap_or_default()),
            field(
                "Location",
                format!("{:.3}, {:.3}", marker.latitude, marker.longitude),
            ),
        ],
        None => vec![TextLine::from(Span::styled(
            "No municipalities with coordinates",
            label_style,
        ))],
    };

    f.render_widget(
        Paragraph::new(Text::from(lines))
            .block(block)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn render_marker_list(markers: &[CityMarker], selected: usize, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" All ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let visible = usize::from(inner.height);
    let offset = scroll_offset(markers.len(), visible, selected);
    let lines = markers
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(index, marker)| {
            let style = if index == selected {
                Style::default()
                    .bg(Color::Rgb(0, 0, 238))
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            TextLine::from(vec![
                Span::styled(marker.name_or_unknown().to_string(), style),
                Span::styled(
                    format!("  {}", marker.province.as_deref().unwrap_or("")),
                    Style::default().fg(Color::Gray),
                ),
            ])
        })
        .collect::<Vec<_>>();

    f.render_widget(Paragraph::new(Text::from(lines)), inner);
}
