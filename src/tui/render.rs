use std::borrow::Cow;
use std::rc::Rc;

use super::state::AppState;
use crate::catalog::Product;
use crate::pipeline::ViewMode;
use crate::scroll::{Geometry, CARD_HEIGHT, CARD_WIDTH};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};

const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

const BODY: usize = 2;

fn screen_layout(area: Rect) -> Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(3), // category tabs
            Constraint::Min(0),    // products / detail
            Constraint::Length(1), // load status
            Constraint::Length(6), // activity log
            Constraint::Length(1), // key help
        ])
        .split(area)
}

/// Visible product lines and grid columns for a screen of size `area`.
pub fn catalog_viewport(area: Rect, mode: ViewMode) -> (usize, usize) {
    let body = screen_layout(area)[BODY];
    let inner_height = body.height.saturating_sub(2) as usize;
    let inner_width = body.width.saturating_sub(2) as usize;
    let rows = match mode {
        ViewMode::Grid => inner_height,
        // table header row
        ViewMode::List => inner_height.saturating_sub(1),
    };
    (rows, Geometry::columns_for_width(inner_width))
}

pub fn draw(f: &mut Frame, state: &AppState, search_input: Option<&str>, spinner_frame: u8) {
    let chunks = screen_layout(f.area());

    draw_header(f, state, search_input, chunks[0]);
    draw_categories(f, state, chunks[1]);
    if let Some(product) = &state.detail {
        draw_detail(f, state, product, chunks[BODY]);
    } else if state.products.is_empty() {
        draw_empty(f, state, chunks[BODY]);
    } else {
        match state.view.view_mode {
            ViewMode::Grid => draw_grid(f, state, chunks[BODY]),
            ViewMode::List => draw_list(f, state, chunks[BODY]),
        }
    }
    draw_status(f, state, chunks[3], spinner_frame);
    draw_logs(f, state, chunks[4]);
    draw_footer(f, state, search_input.is_some(), chunks[5]);
}

fn draw_header(f: &mut Frame, state: &AppState, search_input: Option<&str>, area: Rect) {
    let search = match search_input {
        Some(buffer) => Span::styled(
            format!("{}\u{258f}", buffer),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        None if state.view.search_query.is_empty() => {
            Span::styled("\u{2014}", Style::default().fg(Color::DarkGray))
        }
        None => Span::styled(
            state.view.search_query.clone(),
            Style::default().fg(Color::Cyan),
        ),
    };

    let cart_color = if state.cart_items > 0 { Color::Green } else { Color::DarkGray };

    let line = Line::from(vec![
        Span::raw(" Search: "),
        search,
        Span::raw(format!(
            " | Sort: {} | View: {} | ",
            state.view.sort_key.label(),
            state.view.view_mode.label(),
        )),
        Span::styled(
            format!("Cart: {} ({})", state.cart_items, format_price(state.cart_total)),
            Style::default().fg(cart_color),
        ),
        Span::raw(format!(" | Up: {}", state.uptime())),
    ]);

    let block = Block::default()
        .title(Span::styled(
            " Storefront Catalog ",
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL);
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_categories(f: &mut Frame, state: &AppState, area: Rect) {
    let titles: Vec<Line> = std::iter::once("All")
        .chain(state.categories.iter().map(|c| c.name.as_str()))
        .map(Line::from)
        .collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" Categories [c] "))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .select(state.category_tab());
    f.render_widget(tabs, area);
}

fn products_title(state: &AppState) -> String {
    format!(
        " {} [{}/{} shown \u{00b7} {} in catalog] ",
        state.category_label(),
        state.products.len(),
        state.matching,
        state.catalog_size,
    )
}

/// Bordered container used for every product card.
fn card(title: Option<String>, selected: bool) -> Block<'static> {
    let border = if selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default().borders(Borders::ALL).border_style(border);
    match title {
        Some(t) => block.title(t),
        None => block,
    }
}

fn draw_grid(f: &mut Frame, state: &AppState, area: Rect) {
    let outer = Block::default()
        .title(products_title(state))
        .borders(Borders::ALL);
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let columns = Geometry::columns_for_width(inner.width as usize);
    let first_row = state.scroll_offset / CARD_HEIGHT;
    let visible_rows = (inner.height as usize).div_ceil(CARD_HEIGHT);

    for r in 0..visible_rows {
        let y = inner.y as usize + r * CARD_HEIGHT;
        let height = CARD_HEIGHT.min(inner.bottom() as usize - y);
        for c in 0..columns {
            let index = (first_row + r) * columns + c;
            let Some(product) = state.products.get(index) else { return };
            let x = inner.x as usize + c * CARD_WIDTH;
            let width = CARD_WIDTH.min(inner.right() as usize - x);
            let rect = Rect::new(x as u16, y as u16, width as u16, height as u16);
            draw_card(f, state, product, index == state.selected, rect);
        }
    }
}

fn draw_card(f: &mut Frame, state: &AppState, product: &Product, selected: bool, area: Rect) {
    let text_width = area.width.saturating_sub(2) as usize;
    let name_style = if selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let lines = vec![
        Line::from(Span::styled(
            truncate_with_ellipsis(&product.name, text_width).into_owned(),
            name_style,
        )),
        Line::from(Span::styled(
            truncate_with_ellipsis(state.category_name(&product.category), text_width).into_owned(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            format_price(product.price),
            Style::default().fg(Color::Green),
        )),
        Line::from(vec![
            Span::styled(stars(product.rating), Style::default().fg(Color::Yellow)),
            Span::raw(format!(" {:.1} ({})", product.rating, product.reviews)),
        ]),
    ];
    f.render_widget(Paragraph::new(lines).block(card(None, selected)), area);
}

fn draw_list(f: &mut Frame, state: &AppState, area: Rect) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let visible_lines = area.height.saturating_sub(3) as usize; // borders + header row

    // Name gets what is left after the fixed columns.
    let fixed = 18 + 10 + 16 + 8;
    let name_w = inner_width.saturating_sub(fixed).max(8);

    let header = Row::new(vec!["Name", "Category", "Price", "Rating", "Reviews"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = state
        .products
        .iter()
        .enumerate()
        .skip(state.scroll_offset)
        .take(visible_lines)
        .map(|(i, p)| {
            let row = Row::new(vec![
                Cell::from(truncate_with_ellipsis(&p.name, name_w).into_owned()),
                Cell::from(state.category_name(&p.category).to_string())
                    .style(Style::default().fg(Color::DarkGray)),
                Cell::from(format_price(p.price)).style(Style::default().fg(Color::Green)),
                Cell::from(format!("{} {:.1}", stars(p.rating), p.rating))
                    .style(Style::default().fg(Color::Yellow)),
                Cell::from(p.reviews.to_string()),
            ]);
            if i == state.selected {
                row.style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
            } else {
                row
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(name_w as u16),
            Constraint::Length(18),
            Constraint::Length(10),
            Constraint::Length(16),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(Block::default().title(products_title(state)).borders(Borders::ALL));

    f.render_widget(table, area);
}

fn draw_empty(f: &mut Frame, state: &AppState, area: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "No products found",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Try a different search term or category",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];
    if state.view.has_active_filters() {
        lines.push(Line::from(vec![
            Span::styled("[x]", Style::default().fg(Color::Yellow)),
            Span::raw(" clear filters"),
        ]));
    }

    let block = Block::default().title(products_title(state)).borders(Borders::ALL);
    let para = Paragraph::new(lines).alignment(Alignment::Center).block(block);
    f.render_widget(para, area);
}

fn draw_detail(f: &mut Frame, state: &AppState, product: &Product, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let lines = vec![
        Line::from(Span::styled(
            product.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Category: ", label),
            Span::raw(state.category_name(&product.category).to_string()),
        ]),
        Line::from(vec![
            Span::styled("Price:    ", label),
            Span::styled(format_price(product.price), Style::default().fg(Color::Green)),
        ]),
        Line::from(vec![
            Span::styled("Rating:   ", label),
            Span::styled(stars(product.rating), Style::default().fg(Color::Yellow)),
            Span::raw(format!(" {:.1} from {} reviews", product.rating, product.reviews)),
        ]),
        Line::from(vec![
            Span::styled("SKU:      ", label),
            Span::raw(product.id.clone()),
        ]),
        Line::from(""),
        Line::from(product.description.clone()),
        Line::from(""),
        Line::from(vec![
            Span::styled("[a]", Style::default().fg(Color::Yellow)),
            Span::raw(" add to cart  "),
            Span::styled("[Esc]", Style::default().fg(Color::Yellow)),
            Span::raw(" back to catalog"),
        ]),
    ];
    let para = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(card(Some(" Product ".to_string()), true));
    f.render_widget(para, area);
}

fn draw_status(f: &mut Frame, state: &AppState, area: Rect, spinner_frame: u8) {
    let line = if state.view.loading {
        let ch = SPINNER_FRAMES[(spinner_frame as usize) % SPINNER_FRAMES.len()];
        Line::from(Span::styled(
            format!("  {} Loading more products...", ch),
            Style::default().fg(Color::Cyan),
        ))
    } else if state.view.has_more {
        Line::from(Span::styled(
            format!(
                "  Showing {} of {} \u{00b7} scroll for more",
                state.products.len(),
                state.matching
            ),
            Style::default().fg(Color::DarkGray),
        ))
    } else if state.matching > 0 {
        Line::from(Span::styled(
            format!("  Showing all {} products", state.matching),
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Line::from("")
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_logs(f: &mut Frame, state: &AppState, area: Rect) {
    let max_width = area.width.saturating_sub(2) as usize; // borders
    let visible_lines = area.height.saturating_sub(2) as usize;

    let lines: Vec<Line> = state
        .logs
        .iter()
        .rev()
        .take(visible_lines)
        .map(|l| {
            let color = match l.level.as_str() {
                "WARN" => Color::Yellow,
                "CART" => Color::Green,
                "LOAD" => Color::Cyan,
                _ => Color::DarkGray,
            };
            let prefix = format!(" {} [{}] ", l.time, l.level);
            let msg_max = max_width.saturating_sub(prefix.len());
            let msg = truncate_with_ellipsis(&l.message, msg_max);
            Line::from(vec![
                Span::styled(prefix, Style::default().fg(color)),
                Span::raw(msg.into_owned()),
            ])
        })
        .collect();

    let block = Block::default().title(" Activity ").borders(Borders::ALL);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(f: &mut Frame, state: &AppState, searching: bool, area: Rect) {
    let key = Style::default().fg(Color::Yellow);
    let line = if searching {
        Line::from(vec![
            Span::styled("  [Enter/Esc]", key),
            Span::raw(" done  "),
            Span::styled("[Backspace]", key),
            Span::raw(" delete  "),
        ])
    } else if state.detail.is_some() {
        Line::from(vec![
            Span::styled("  [a]", key),
            Span::raw("dd to cart  "),
            Span::styled("[Esc]", key),
            Span::raw(" back  "),
            Span::styled("[q]", key),
            Span::raw("uit  "),
        ])
    } else {
        Line::from(vec![
            Span::styled("  [/]", key),
            Span::raw(" search  "),
            Span::styled("[c]", key),
            Span::raw("ategory  "),
            Span::styled("[s]", key),
            Span::raw("ort  "),
            Span::styled("[v]", key),
            Span::raw("iew  "),
            Span::styled("[x]", key),
            Span::raw(" clear  "),
            Span::styled("[Enter]", key),
            Span::raw(" open  "),
            Span::styled("[a]", key),
            Span::raw("dd  "),
            Span::styled("[Esc]", key),
            Span::raw(" back  "),
            Span::styled("[q]", key),
            Span::raw("uit  "),
        ])
    };
    f.render_widget(Paragraph::new(line), area);
}

fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}

/// Five-star bar, rating rounded to the nearest whole star.
fn stars(rating: f64) -> String {
    let filled = (rating.round().clamp(0.0, 5.0)) as usize;
    format!("{}{}", "\u{2605}".repeat(filled), "\u{2606}".repeat(5 - filled))
}

fn truncate_with_ellipsis(s: &str, max_width: usize) -> Cow<'_, str> {
    let char_count = s.chars().count();
    if char_count <= max_width {
        Cow::Borrowed(s)
    } else if max_width <= 3 {
        Cow::Owned(".".repeat(max_width))
    } else {
        let end = s
            .char_indices()
            .nth(max_width - 3)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        Cow::Owned(format!("{}...", &s[..end]))
    }
}
