mod state;

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use cap_core::display::segment_widths;
use cap_core::palette::{series_color, Rgb};
use cap_core::{Dataset, DatasetKind, GeoView, LoadState, Role, StackedChart, TokenCounts};
use ratzilla::event::KeyCode;
use ratzilla::ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line as TextLine, Span, Text},
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Scrollbar,
        ScrollbarOrientation, ScrollbarState, Table, Tabs, Wrap,
    },
    Frame, Terminal,
};
use ratzilla::{DomBackend, WebRenderer};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::state::{Focus, WebState, CHART_TITLES};

fn main() -> io::Result<()> {
    let state = Rc::new(RefCell::new(WebState::default()));

    for kind in DatasetKind::ALL {
        let state = state.clone();
        spawn_local(async move {
            let outcome = fetch_dataset(kind).await;
            if let Err(error) = &outcome {
                web_sys::console::error_1(&format!("Failed to load {kind}: {error}").into());
            }
            state.borrow_mut().session.complete(kind, outcome);
        });
    }

    let backend = DomBackend::new()?;
    let mut terminal = Terminal::new(backend)?;

    terminal.on_key_event({
        let state = state.clone();
        move |event| {
            let mut state = state.borrow_mut();
            match event.code {
                KeyCode::Char(digit @ '1'..='3') => {
                    let index = digit as usize - '1' as usize;
                    if let Some(view) = GeoView::from_index(index) {
                        state.set_view(view);
                    }
                }
                KeyCode::Left => state.cycle_chart(false),
                KeyCode::Right => state.cycle_chart(true),
                KeyCode::Tab => state.focus = state.focus.next(),
                KeyCode::Up => state.cycle_selection(false),
                KeyCode::Down => state.cycle_selection(true),
                KeyCode::Backspace | KeyCode::Delete => state.clear_selection(),
                KeyCode::PageUp => state.scroll(false),
                KeyCode::PageDown => state.scroll(true),
                _ => {}
            }
        }
    });

    terminal.draw_web(move |f| {
        let area = f.area();
        let block = Block::default()
            .title("Climate Action Plans")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray));
        let inner = block.inner(area).inner(Margin::new(1, 1));
        f.render_widget(block, area);

        render_dashboard(&state.borrow(), f, inner);
    });

    Ok(())
}

fn render_dashboard(state: &WebState, f: &mut Frame<'_>, area: Rect) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(14),
            Constraint::Length(9),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(state, f, main_layout[0]);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(26), Constraint::Percentage(74)])
        .split(main_layout[1]);

    render_selectors(state, f, content[0]);
    render_chart(state, f, content[1]);
    render_plans(state, f, main_layout[2]);
    render_keys(f, main_layout[3]);
}

fn render_header(state: &WebState, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title("Overview")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let loaded = DatasetKind::ALL
        .into_iter()
        .map(|kind| match state.session.state(kind) {
            LoadState::Pending => Span::styled(
                format!("{kind}: loading  "),
                Style::default().fg(Color::Gray),
            ),
            LoadState::Ready(dataset) => Span::styled(
                format!("{kind}: {}  ", dataset.records.len()),
                Style::default().fg(Color::White),
            ),
            LoadState::Failed(_) => Span::styled(
                format!("{kind}: failed  "),
                Style::default().fg(Color::Red),
            ),
        })
        .collect::<Vec<_>>();
    f.render_widget(Paragraph::new(TextLine::from(loaded)), columns[0]);

    let views = GeoView::ALL
        .iter()
        .map(|view| TextLine::from(view.label()))
        .collect::<Vec<_>>();
    let tabs = Tabs::new(views)
        .select(state.view.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(0, 0, 238))
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::raw("|"));
    f.render_widget(tabs, columns[1]);
}

fn render_selectors(state: &WebState, f: &mut Frame<'_>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(area);

    for (focus, chunk) in Focus::ALL.into_iter().zip(chunks.iter()) {
        let color = if state.focus == focus {
            Color::Yellow
        } else {
            Color::Gray
        };
        let block = Block::default()
            .title(focus.label())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color));
        let inner = block.inner(*chunk);
        f.render_widget(block, *chunk);

        let options = state.options_for(focus);
        let selected = state
            .selected_for(focus)
            .and_then(|value| options.iter().position(|option| option == value));
        let visible = usize::from(inner.height);
        let offset = selected.map_or(0, |index| (index + 1).saturating_sub(visible));

        let lines = options
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(index, option)| {
                let style = if Some(index) == selected {
                    Style::default()
                        .fg(Color::White)
                        .bg(Color::Rgb(0, 0, 238))
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                TextLine::from(Span::styled(option.clone(), style))
            })
            .collect::<Vec<_>>();
        f.render_widget(Paragraph::new(Text::from(lines)), inner);
    }
}

fn render_chart(state: &WebState, f: &mut Frame<'_>, area: Rect) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let tabs = Tabs::new(CHART_TITLES.iter().map(|title| TextLine::from(*title)).collect::<Vec<_>>())
        .select(state.chart_index)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(0, 0, 238))
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::raw("|"));
    f.render_widget(tabs, layout[0]);

    let (chart, needs) = match state.chart_index {
        0 => (state.lever_chart(), DatasetKind::Actions),
        1 => (state.strategy_chart(), DatasetKind::ActionsModified),
        _ => {
            match state.province_counts() {
                Some(counts) => render_province_counts(&counts, f, layout[1]),
                None => render_placeholder(state, DatasetKind::Actions, f, layout[1]),
            }
            return;
        }
    };

    match chart {
        Some(chart) => render_stacked_chart(&chart, f, layout[1]),
        None => render_placeholder(state, needs, f, layout[1]),
    }
}

fn render_placeholder(state: &WebState, kind: DatasetKind, f: &mut Frame<'_>, area: Rect) {
    let message = match state.session.state(kind) {
        LoadState::Pending => format!("Loading {}...", kind.default_file_name()),
        LoadState::Failed(reason) => format!("Could not load {}: {reason}", kind.default_file_name()),
        LoadState::Ready(_) => "Choose a province, municipality or policy lever".to_string(),
    };
    let paragraph = Paragraph::new(message)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Gray)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_stacked_chart(chart: &StackedChart, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(chart.title.as_str())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area).inner(Margin::new(1, 0));
    f.render_widget(block, area);

    let split = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(64), Constraint::Percentage(36)])
        .split(inner);

    let label_width = chart
        .labels
        .iter()
        .map(|label| label.chars().count())
        .max()
        .unwrap_or(0)
        .min(16);
    let bar_width = usize::from(split[0].width).saturating_sub(label_width + 1);

    let mut lines = vec![
        TextLine::from(Span::styled(
            chart.description.clone(),
            Style::default().fg(Color::Gray),
        )),
        TextLine::from(""),
    ];
    for (index, label) in chart.labels.iter().enumerate() {
        let mut spans = vec![Span::styled(
            format!("{:<label_width$} ", label.chars().take(label_width).collect::<String>()),
            Style::default().fg(Color::White),
        )];
        let values = chart
            .bar(index)
            .into_iter()
            .map(|(_, value)| value)
            .collect::<Vec<_>>();
        for (series, width) in segment_widths(&values, bar_width).into_iter().enumerate() {
            if width > 0 {
                spans.push(Span::styled(
                    "█".repeat(width),
                    Style::default().fg(color(series_color(chart.category, series))),
                ));
            }
        }
        lines.push(TextLine::from(spans));
        lines.push(TextLine::from(""));
    }
    f.render_widget(
        Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false }),
        split[0],
    );

    let mut legend = vec![
        TextLine::from(Span::styled("Legend", Style::default().fg(Color::Gray))),
        TextLine::from(""),
    ];
    for (index, series) in chart.series.iter().enumerate() {
        let average = if series.values.is_empty() {
            0.0
        } else {
            series.values.iter().sum::<f64>() / series.values.len() as f64
        };
        legend.push(TextLine::from(vec![
            Span::styled("■ ", Style::default().fg(color(series_color(chart.category, index)))),
            Span::styled(
                series.label.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::DIM),
            ),
            Span::styled(
                format!("  avg {average:.1}%"),
                Style::default().fg(Color::White).add_modifier(Modifier::DIM),
            ),
        ]));
    }
    f.render_widget(
        Paragraph::new(Text::from(legend)).wrap(Wrap { trim: true }),
        split[1],
    );
}

fn render_province_counts(counts: &TokenCounts, f: &mut Frame<'_>, area: Rect) {
    let bars: Vec<Bar<'_>> = counts
        .iter()
        .enumerate()
        .map(|(index, (province, count))| {
            Bar::default()
                .value(count)
                .label(TextLine::from(province.to_string()))
                .style(Style::default().fg(color(series_color(Role::Lever, index))))
                .value_style(Style::default().fg(Color::White))
        })
        .collect();

    let max_value = counts.iter().map(|(_, count)| count).max().unwrap_or(0).max(1);

    let chart = BarChart::default()
        .block(
            Block::default()
                .title("Actions by Province")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Gray)),
        )
        .data(BarGroup::default().bars(&bars))
        .max(max_value)
        .bar_gap(1)
        .bar_width(6);

    f.render_widget(chart, area);
}

fn render_plans(state: &WebState, f: &mut Frame<'_>, area: Rect) {
    let rows_data = state.plan_rows();
    let detail = state.selected_plan(&rows_data);

    let header = Row::new(vec![
        Cell::from("Municipality"),
        Cell::from("Province"),
        Cell::from("Plan year"),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let rows = rows_data
        .iter()
        .enumerate()
        .skip(state.row_offset)
        .map(|(index, row)| {
            let style = if Some(index) == detail {
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Rgb(0, 0, 238))
            } else {
                Style::default().fg(Color::White)
            };
            Row::new(vec![
                Cell::from(row.city.clone()),
                Cell::from(row.province.clone()),
                Cell::from(row.year.clone()),
            ])
            .style(style)
        })
        .collect::<Vec<_>>();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(50),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(format!("Plans ({})", rows_data.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray)),
    );
    f.render_widget(table, area);

    let mut scrollbar_state = ScrollbarState::new(rows_data.len()).position(state.row_offset);
    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(None)
        .end_symbol(None);
    f.render_stateful_widget(
        scrollbar,
        area.inner(Margin::new(0, 1)),
        &mut scrollbar_state,
    );
}

fn render_keys(f: &mut Frame<'_>, area: Rect) {
    let key = |text: &'static str| {
        Span::styled(
            text,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    };
    let gray = |text: &'static str| Span::styled(text, Style::default().fg(Color::Gray));
    let line = TextLine::from(vec![
        key("1-3"),
        gray(": View | "),
        key("Tab"),
        gray(": Focus | "),
        key("Up/Down"),
        gray(": Select | "),
        key("Backspace"),
        gray(": Clear | "),
        key("Left/Right"),
        gray(": Chart | "),
        key("PgUp/PgDn"),
        gray(": Plans"),
    ]);
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

const fn color((red, green, blue): Rgb) -> Color {
    Color::Rgb(red, green, blue)
}

async fn fetch_dataset(kind: DatasetKind) -> Result<Dataset, String> {
    let window = web_sys::window().ok_or_else(|| "no browser window".to_string())?;

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::SameOrigin);

    let url = kind.default_file_name();
    let request = Request::new_with_str_and_init(url, &opts).map_err(describe)?;

    let response_value = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(describe)?;
    let response = response_value
        .dyn_into::<Response>()
        .map_err(|_| format!("{url}: not a response"))?;
    if !response.ok() {
        return Err(format!("{url}: HTTP {}", response.status()));
    }

    let json = JsFuture::from(response.json().map_err(describe)?)
        .await
        .map_err(describe)?;
    let value = serde_wasm_bindgen::from_value::<serde_json::Value>(json)
        .map_err(|error| format!("{url}: {error}"))?;

    Dataset::from_value(value).map_err(|error| format!("{url}: {error}"))
}

fn describe(error: JsValue) -> String {
    error
        .as_string()
        .unwrap_or_else(|| format!("{error:?}"))
}
