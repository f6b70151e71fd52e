use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Tabs, Wrap};

use vibe_machine::app::{App, PaneFocus};
use vibe_machine::engine::Clock;
use vibe_machine::format::{format_compact, format_number};
use vibe_machine::state::{GameState, MAX_RUG_PULL_RISK, PRESTIGE_THRESHOLD};
use vibe_machine::store::KeyValueStore;

pub fn draw<S: KeyValueStore, C: Clock>(f: &mut Frame<'_>, app: &App<S, C>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(7),
        ])
        .split(f.size());

    draw_stats(f, chunks[0], app.state());
    draw_tabs(f, chunks[1], app.focus);
    match app.focus {
        PaneFocus::Mine => draw_mine(f, chunks[2], app.state()),
        PaneFocus::Upgrades => draw_upgrades(f, chunks[2], app),
        PaneFocus::Staking => draw_staking(f, chunks[2], app),
    }
    draw_footer(f, chunks[3], app);

    if app.state().is_rug_pulled {
        draw_rug_pull(f, app.state());
    } else if app.show_share {
        draw_share(f, &app.share_text());
    }
}

fn draw_stats(f: &mut Frame<'_>, area: Rect, state: &GameState) {
    let block = Block::default()
        .title("The Vibe Machine")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let mut spans = vec![
        Span::styled("$VIBE ", Style::default().fg(Color::Gray)),
        Span::styled(
            format_number(state.vibes),
            Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  Per Click "),
        Span::styled(
            format_compact(state.vibes_per_click * state.multiplier),
            Style::default().fg(Color::LightBlue),
        ),
        Span::raw("  |  Per Second "),
        Span::styled(
            format_compact(state.passive_yield()),
            Style::default().fg(Color::LightMagenta),
        ),
        Span::raw("  |  Level "),
        Span::styled(state.level.to_string(), Style::default().fg(Color::LightRed)),
    ];
    if state.prestige > 0 {
        spans.push(Span::styled(
            format!(" P{}", state.prestige),
            Style::default().fg(Color::Yellow),
        ));
    }
    let paragraph = Paragraph::new(Line::from(spans)).alignment(Alignment::Left);
    f.render_widget(block.clone(), area);
    f.render_widget(paragraph, block.inner(area));
}

fn draw_tabs(f: &mut Frame<'_>, area: Rect, focus: PaneFocus) {
    let titles: Vec<Line> = PaneFocus::ALL.iter().map(|p| Line::from(p.title())).collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL))
        .select(focus.index())
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::LightGreen)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, area);
}

fn combo_style(combo: u32) -> Style {
    let color = if combo > 20 {
        Color::LightRed
    } else if combo > 10 {
        Color::LightMagenta
    } else {
        Color::LightGreen
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn draw_mine(f: &mut Frame<'_>, area: Rect, state: &GameState) {
    let block = pane_block("Mine");
    f.render_widget(block.clone(), area);
    let inner = block.inner(area);
    let segments = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(inner);

    let mut lines = Vec::new();
    if state.combo > 0 {
        let flames = match state.combo {
            c if c > 30 => " 🔥🔥🔥",
            c if c > 20 => " 🔥🔥",
            c if c > 10 => " 🔥",
            _ => "",
        };
        lines.push(Line::from(Span::styled(
            format!("{}x COMBO{}", state.combo, flames),
            combo_style(state.combo),
        )));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[  🫠  VIBE  ]",
        combo_style(state.combo),
    )));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Next click ", Style::default().fg(Color::Gray)),
        Span::styled(
            format!("+{}", format_compact(state.click_yield())),
            Style::default().fg(Color::LightGreen),
        ),
    ]));
    lines.push(Line::from(vec![
        Span::styled("Clicks ", Style::default().fg(Color::Gray)),
        Span::raw(state.click_count.to_string()),
        Span::raw("  |  Lifetime "),
        Span::styled(
            format_number(state.total_vibes_mined),
            Style::default().fg(Color::LightCyan),
        ),
        Span::raw("  |  Multiplier "),
        Span::styled(
            format!("{:.1}x", state.multiplier),
            Style::default().fg(Color::Yellow),
        ),
    ]));

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, segments[0]);

    let ratio = (state.total_vibes_mined / PRESTIGE_THRESHOLD).clamp(0.0, 1.0);
    let label = if state.can_prestige() {
        format!("Prestige ready: P for {:.1}x", state.prestige_multiplier())
    } else {
        format!("{:.1}% to prestige", ratio * 100.0)
    };
    let gauge = Gauge::default()
        .block(Block::default().title("Prestige"))
        .ratio(ratio)
        .gauge_style(Style::default().fg(Color::Yellow).bg(Color::Black))
        .label(label);
    f.render_widget(gauge, segments[1]);
}

fn draw_upgrades<S: KeyValueStore, C: Clock>(f: &mut Frame<'_>, area: Rect, app: &App<S, C>) {
    let block = pane_block("Upgrades");
    f.render_widget(block.clone(), area);
    let inner = block.inner(area);
    let state = app.state();

    let items: Vec<ListItem> = state
        .upgrades
        .iter()
        .map(|upgrade| {
            let affordable = state.vibes >= upgrade.cost;
            let price = if upgrade.is_maxed() {
                Span::styled(" MAXED", Style::default().fg(Color::DarkGray))
            } else {
                Span::styled(
                    format!(" {}", format_number(upgrade.cost)),
                    Style::default().fg(if affordable {
                        Color::LightGreen
                    } else {
                        Color::Red
                    }),
                )
            };
            let header = Line::from(vec![
                Span::raw(format!("{} ", upgrade.emoji)),
                Span::styled(
                    format!("{:<20}", upgrade.name),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    format!(" Lv {:>2}/{:<2}", upgrade.level, upgrade.max_level),
                    Style::default().fg(Color::Gray),
                ),
                price,
            ]);
            let detail = Line::from(Span::styled(
                format!(
                    "   {}  (+{} {})",
                    upgrade.description,
                    upgrade.value,
                    upgrade.kind.label()
                ),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ));
            ListItem::new(vec![header, detail])
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::NONE))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut list_state = ListState::default();
    list_state.select(Some(app.selected_upgrade));
    f.render_stateful_widget(list, inner, &mut list_state);
}

fn draw_staking<S: KeyValueStore, C: Clock>(f: &mut Frame<'_>, area: Rect, app: &App<S, C>) {
    let block = pane_block("Staking");
    f.render_widget(block.clone(), area);
    let inner = block.inner(area);
    let state = app.state();

    let segments = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(inner);

    let lines = vec![
        Line::from(vec![
            Span::styled("Staked ", Style::default().fg(Color::Gray)),
            Span::styled(
                format_number(state.staked_vibes),
                Style::default().fg(Color::LightCyan),
            ),
            Span::raw("  |  Returns "),
            Span::styled(
                format_number(state.staked_returns),
                Style::default().fg(Color::LightGreen),
            ),
        ]),
        Line::from(vec![
            Span::styled("APY ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}%", format_compact(state.staking_apy)),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw("  |  Available "),
            Span::styled(
                format_number(state.vibes),
                Style::default().fg(Color::LightGreen),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Amount ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}▏", app.stake_input),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
    ];
    f.render_widget(Paragraph::new(lines), segments[0]);

    let risk = state.rug_pull_risk.clamp(0.0, MAX_RUG_PULL_RISK);
    let risk_color = if risk > 50.0 {
        Color::Red
    } else if risk > 20.0 {
        Color::Yellow
    } else {
        Color::Green
    };
    let gauge = Gauge::default()
        .block(Block::default().title("Rug Pull Risk"))
        .ratio(risk / 100.0)
        .gauge_style(Style::default().fg(risk_color).bg(Color::Black))
        .label(format!("{:.1}%", risk));
    f.render_widget(gauge, segments[1]);

    let help = Paragraph::new(vec![
        Line::from("0-9 . type amount  |  M max  |  Enter stake"),
        Line::from("U unstake all  |  R spin the rug-pull roulette"),
        Line::from(Span::styled(
            "Roulette: win 2-10x returns, or lose 90% of the stake.",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .wrap(Wrap { trim: true });
    f.render_widget(help, segments[2]);
}

fn draw_footer<S: KeyValueStore, C: Clock>(f: &mut Frame<'_>, area: Rect, app: &App<S, C>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Ops & Feed")
        .border_style(Style::default().fg(Color::Gray));
    f.render_widget(block.clone(), area);
    let inner = block.inner(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    let instruction_lines = vec![
        Line::from("Tab cycle tabs | P prestige | S share | Q quit"),
        Line::from("Mine: Space/Enter mine"),
        Line::from("Upgrades: ↑↓ select  Enter buy"),
        Line::from("Staking: amount + Enter  U unstake  R roulette"),
    ];
    let instruction = Paragraph::new(instruction_lines).wrap(Wrap { trim: true });
    f.render_widget(instruction, columns[0]);

    let mut message_lines: Vec<Line> = Vec::new();
    for entry in app.messages.iter() {
        message_lines.push(Line::from(vec![
            Span::styled(
                entry.at.format("%H:%M:%S").to_string(),
                Style::default().fg(Color::Gray),
            ),
            Span::raw("  "),
            Span::raw(entry.text.clone()),
        ]));
    }
    if message_lines.is_empty() {
        message_lines.push(Line::from(Span::styled(
            "Awaiting vibes...",
            Style::default().fg(Color::DarkGray),
        )));
    }
    let feed = Paragraph::new(message_lines).wrap(Wrap { trim: true });
    f.render_widget(feed, columns[1]);
}

fn draw_rug_pull(f: &mut Frame<'_>, state: &GameState) {
    let area = centered_rect(50, 40, f.size());
    let block = Block::default()
        .title(Span::styled(
            "RUG PULLED",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "🚨 The devs rugged you. 90% of your stake is gone. 🚨",
            Style::default().fg(Color::LightRed),
        )),
        Line::from(""),
        Line::from(format!(
            "Salvaged stake: {} $VIBE",
            format_number(state.staked_vibes)
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to cope",
            Style::default().fg(Color::Gray),
        )),
    ];
    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

fn draw_share(f: &mut Frame<'_>, text: &str) {
    let area = centered_rect(60, 50, f.size());
    let block = Block::default()
        .title("Share your vibes")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let mut lines: Vec<Line> = text.lines().map(|l| Line::from(l.to_string())).collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Any key to close",
        Style::default().fg(Color::DarkGray),
    )));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
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
        .split(vertical[1])[1]
}

fn pane_block<'a>(title: &'a str) -> Block<'a> {
    let border_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    Block::default()
        .title(Span::styled(title, Style::default().fg(Color::White)))
        .borders(Borders::ALL)
        .border_style(border_style)
}
