use crate::app::App;
use crate::ui::widgets::charts::{render_chart_panel, render_chart_tabs};
use crate::ui::widgets::popup::key_span;
use crate::ui::widgets::selectors::render_selectors;
use crate::ui::widgets::tables::render_plan_detail;
use cap_core::{DatasetKind, GeoView, LoadState};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs, Wrap};
use ratatui::Frame;
use throbber_widgets_tui::Throbber;

pub fn render_dashboard(app: &App, f: &mut Frame<'_>) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Title and view tabs
            Constraint::Min(10),   // Selectors and charts
            Constraint::Length(3), // Status
            Constraint::Length(1), // Shortcuts hint
        ])
        .split(f.area().inner(Margin::new(2, 1)));

    render_title_section(app, f, layout[0]);
    render_content_section(app, f, layout[1]);
    render_status_section(app, f, layout[2]);
    render_shortcuts(f, layout[3]);
}

fn render_title_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let title_block = Block::default()
        .title("== Climate Action Plans ==")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = title_block.inner(area);
    f.render_widget(title_block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(inner.inner(Margin::new(1, 0)));

    let heading = Paragraph::new(TextLine::from(vec![
        Span::styled(
            "Climate Action ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "Plan Dashboard",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    f.render_widget(heading, chunks[0]);

    let views = GeoView::ALL
        .iter()
        .map(|view| TextLine::from(format!("{} {}", view.index() + 1, view.label())))
        .collect::<Vec<_>>();
    let tabs = Tabs::new(views)
        .select(app.view.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::raw("|"));
    f.render_widget(tabs, chunks[1]);
}

fn render_content_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(28), Constraint::Percentage(72)])
        .split(area);

    render_selectors(app, f, columns[0]);

    let plan_height = if app.view == GeoView::Municipal { 5 } else { 0 };
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(6),
            Constraint::Length(plan_height),
        ])
        .split(columns[1]);

    render_chart_tabs(app, f, right[0]);
    render_chart_panel(app, f, right[1]);

    if app.view == GeoView::Municipal {
        render_plan_detail(app.plan_detail().as_ref(), f, right[2]);
    }
}

fn render_status_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let status_block = Block::default()
        .title(" Status ")
        .title_style(Style::default().fg(Color::Yellow))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = status_block.inner(area);
    f.render_widget(status_block, area);

    if app.session.is_loading() {
        let pending = DatasetKind::ALL
            .into_iter()
            .filter(|kind| matches!(app.session.state(*kind), LoadState::Pending))
            .map(DatasetKind::label)
            .collect::<Vec<_>>()
            .join(", ");
        let throbber = Throbber::default()
            .label(format!("Loading {pending}..."))
            .style(Style::default().fg(Color::Gray))
            .throbber_style(Style::default().fg(Color::Yellow));
        let mut throbber_state = app.throbber.clone();
        f.render_stateful_widget(throbber, inner, &mut throbber_state);
        return;
    }

    let style = if app.status_message.starts_with("Error") {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    };
    let status = Paragraph::new(Text::from(Span::styled(
        app.status_message.as_str(),
        style,
    )))
    .wrap(Wrap { trim: true });
    f.render_widget(status, inner);
}

fn render_shortcuts(f: &mut Frame<'_>, area: Rect) {
    let separator = |text: &'static str| Span::styled(text, Style::default().fg(Color::Gray));
    let shortcuts = TextLine::from(vec![
        key_span("?"),
        separator(": Help | "),
        key_span("1-3"),
        separator(": View | "),
        key_span("Tab"),
        separator(": Focus | "),
        key_span("Up/Down"),
        separator(": Select | "),
        key_span("Left/Right"),
        separator(": Chart | "),
        key_span("/"),
        separator(": Search | "),
        key_span("m"),
        separator(": Map | "),
        key_span("q"),
        separator(": Quit"),
    ]);
    f.render_widget(
        Paragraph::new(shortcuts).alignment(Alignment::Center),
        area,
    );
}
