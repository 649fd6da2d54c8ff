//! Rendering logic for each TUI pane

use crate::replay::RuntimeModelState;
use crate::trace::StepKind;
use crate::ui::theme::DEFAULT_THEME;

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph, Wrap},
};

/// Simple syntax highlighting for the modeled async-JavaScript subset
fn highlight_source_code(line: &str) -> Line<'_> {
    let mut spans = Vec::new();
    let mut current_word = String::new();

    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        // Handle comments
        if c == '/' && i + 1 < chars.len() && chars[i + 1] == '/' {
            if !current_word.is_empty() {
                spans.push(Span::raw(current_word.clone()));
                current_word.clear();
            }
            spans.push(Span::styled(
                line[i..].to_string(),
                Style::default().fg(DEFAULT_THEME.comment),
            ));
            break;
        }

        // Handle strings (both quote styles)
        if c == '"' || c == '\'' {
            if !current_word.is_empty() {
                spans.push(Span::raw(current_word.clone()));
                current_word.clear();
            }
            let quote = c;
            let mut end = i + 1;
            while end < chars.len() && chars[end] != quote {
                if chars[end] == '\\' {
                    end += 2;
                } else {
                    end += 1;
                }
            }
            if end < chars.len() {
                end += 1;
            }
            let text: String = chars[i..end.min(chars.len())].iter().collect();
            spans.push(Span::styled(
                text,
                Style::default().fg(DEFAULT_THEME.string),
            ));
            i = end;
            continue;
        }

        // Handle non-alphanumeric (delimiters)
        if !c.is_alphanumeric() && c != '_' && c != '$' {
            if !current_word.is_empty() {
                let is_func = c == '(';
                let style = get_keyword_style(&current_word, is_func);
                spans.push(Span::styled(current_word.clone(), style));
                current_word.clear();
            }

            let style = match c {
                '{' | '}' | '(' | ')' | '[' | ']' => Style::default().fg(DEFAULT_THEME.primary),
                '=' if i + 1 < chars.len() && chars[i + 1] == '>' => {
                    // The arrow reads as a keyword
                    spans.push(Span::styled(
                        "=>".to_string(),
                        Style::default().fg(DEFAULT_THEME.keyword),
                    ));
                    i += 2;
                    continue;
                }
                _ => Style::default().fg(DEFAULT_THEME.fg),
            };

            spans.push(Span::styled(c.to_string(), style));
            i += 1;
            continue;
        }

        current_word.push(c);
        i += 1;
    }

    if !current_word.is_empty() {
        let style = get_keyword_style(&current_word, false);
        spans.push(Span::styled(current_word, style));
    }

    Line::from(spans)
}

fn get_keyword_style(word: &str, is_function: bool) -> Style {
    match word {
        "const" | "let" | "var" | "function" | "return" | "new" | "async" | "await" | "if"
        | "else" | "for" | "while" => Style::default()
            .fg(DEFAULT_THEME.keyword)
            .add_modifier(Modifier::BOLD),
        "console" | "Promise" | "fetch" | "setTimeout" | "clearTimeout" => {
            Style::default().fg(DEFAULT_THEME.builtin)
        }
        _ => {
            if word.chars().all(|c| c.is_ascii_digit()) {
                Style::default().fg(DEFAULT_THEME.number)
            } else if is_function {
                Style::default().fg(DEFAULT_THEME.function)
            } else {
                Style::default().fg(DEFAULT_THEME.fg)
            }
        }
    }
}

/// Render the source code pane
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source_code: &str,
    current_line: Option<usize>,
    is_focused: bool,
    scroll_offset: &mut usize,
    target_line_row: &mut Option<usize>,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Source ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines: Vec<&str> = source_code.lines().collect();
    let total_lines = lines.len();

    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    // Initialize target_line_row to center if not set
    if target_line_row.is_none() {
        *target_line_row = Some(visible_height / 2);
    }

    let target_row = target_line_row
        .unwrap_or(0)
        .min(visible_height.saturating_sub(1));
    *target_line_row = Some(target_row);

    // Keep the highlighted line at a fixed visual row while stepping
    if let Some(current) = current_line {
        if current > 0 && current <= total_lines {
            let target_line_idx = current - 1;
            *scroll_offset = target_line_idx.saturating_sub(target_row);

            if total_lines > visible_height {
                let max_scroll = total_lines - visible_height;
                *scroll_offset = (*scroll_offset).min(max_scroll);
            } else {
                *scroll_offset = 0;
            }
        }
    }

    let visible_lines: Vec<Line> = lines
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(idx, line)| {
            let line_num = idx + 1;
            let is_current = current_line == Some(line_num);

            let line_num_str = format!("{:4} ", line_num);

            let (num_style, content_bg) = if is_current {
                (
                    Style::default()
                        .fg(DEFAULT_THEME.secondary)
                        .add_modifier(Modifier::BOLD),
                    Some(DEFAULT_THEME.current_line_bg),
                )
            } else {
                (Style::default().fg(DEFAULT_THEME.comment), None)
            };

            let highlighted = highlight_source_code(line);
            let mut spans = vec![Span::styled(line_num_str, num_style)];
            spans.extend(highlighted.spans);
            let mut assembled = Line::from(spans);
            if let Some(bg) = content_bg {
                assembled = assembled.style(Style::default().bg(bg));
            }
            assembled
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}

/// Render the console output pane
pub fn render_console_pane(
    frame: &mut Frame,
    area: Rect,
    console_log: &[String],
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Console ")
        .borders(Borders::ALL)
        .border_style(border_style);

    if console_log.is_empty() {
        let paragraph = Paragraph::new("(no output yet)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let all_items: Vec<ListItem> = console_log
        .iter()
        .map(|line| {
            ListItem::new(Line::from(vec![
                Span::styled("› ", Style::default().fg(DEFAULT_THEME.comment)),
                Span::styled(line.as_str(), Style::default().fg(DEFAULT_THEME.success)),
            ]))
        })
        .collect();

    let total_items = all_items.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    if total_items > visible_height {
        let max_scroll = total_items - visible_height;
        *scroll_offset = (*scroll_offset).min(max_scroll);
    } else {
        *scroll_offset = 0;
    }

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    let list = List::new(visible_items).block(block);
    frame.render_widget(list, area);
}

/// Render the call stack pane (top frame first)
pub fn render_stack_pane(
    frame: &mut Frame,
    area: Rect,
    stack: &[String],
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Call Stack ")
        .borders(Borders::ALL)
        .border_style(border_style);

    if stack.is_empty() {
        let paragraph = Paragraph::new("(empty, the event loop may run)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let all_items: Vec<ListItem> = stack
        .iter()
        .rev()
        .enumerate()
        .map(|(i, label)| {
            let (marker, style) = if i == 0 {
                (
                    "▶ ",
                    Style::default()
                        .fg(DEFAULT_THEME.function)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ("  ", Style::default().fg(DEFAULT_THEME.fg))
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, Style::default().fg(DEFAULT_THEME.secondary)),
                Span::styled(label.as_str(), style),
            ]))
        })
        .collect();

    let total_items = all_items.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    if total_items > visible_height {
        *scroll_offset = (*scroll_offset).min(total_items - visible_height);
    } else {
        *scroll_offset = 0;
    }

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    let list = List::new(visible_items).block(block);
    frame.render_widget(list, area);
}

/// Render the queues pane: deferred registry plus both task queues
pub fn render_queues_pane(
    frame: &mut Frame,
    area: Rect,
    state: &RuntimeModelState,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(format!(" Queues (cycle {}) ", state.cycle_count))
        .borders(Borders::ALL)
        .border_style(border_style)
        .padding(Padding::new(1, 0, 0, 0));

    let header = |text: &str, color: Color| {
        ListItem::new(Span::styled(
            text.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
    };
    let empty_item = || {
        ListItem::new(Span::styled(
            "  (empty)".to_string(),
            Style::default().fg(DEFAULT_THEME.comment),
        ))
    };

    let mut all_items: Vec<ListItem> = Vec::new();

    all_items.push(header("Deferred registrations", DEFAULT_THEME.primary));
    if state.deferred_registry.is_empty() {
        all_items.push(empty_item());
    }
    for entry in &state.deferred_registry {
        all_items.push(ListItem::new(Line::from(vec![
            Span::styled("  ◷ ", Style::default().fg(DEFAULT_THEME.primary)),
            Span::styled(entry.label.as_str(), Style::default().fg(DEFAULT_THEME.fg)),
            Span::styled(
                format!(" → {}", entry.resume_target),
                Style::default().fg(DEFAULT_THEME.comment),
            ),
        ])));
    }

    all_items.push(header("Microtask queue", DEFAULT_THEME.success));
    if state.microtask_queue.is_empty() {
        all_items.push(empty_item());
    }
    for label in &state.microtask_queue {
        all_items.push(ListItem::new(Line::from(vec![
            Span::styled("  • ", Style::default().fg(DEFAULT_THEME.success)),
            Span::styled(label.as_str(), Style::default().fg(DEFAULT_THEME.fg)),
        ])));
    }

    all_items.push(header("Macrotask queue", DEFAULT_THEME.secondary));
    if state.macrotask_queue.is_empty() {
        all_items.push(empty_item());
    }
    for label in &state.macrotask_queue {
        all_items.push(ListItem::new(Line::from(vec![
            Span::styled("  • ", Style::default().fg(DEFAULT_THEME.secondary)),
            Span::styled(label.as_str(), Style::default().fg(DEFAULT_THEME.fg)),
        ])));
    }

    let total_items = all_items.len();
    let visible_height = area.height.saturating_sub(2).max(1) as usize;

    if total_items > visible_height {
        *scroll_offset = (*scroll_offset).min(total_items - visible_height);
    } else {
        *scroll_offset = 0;
    }

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    let list = List::new(visible_items).block(block);
    frame.render_widget(list, area);
}

/// Render the narrative pane explaining the current step
pub fn render_narrative_pane(
    frame: &mut Frame,
    area: Rect,
    narrative: &str,
    last_kind: Option<StepKind>,
) {
    let title = match last_kind {
        Some(kind) => format!(" What just happened: {} ", kind),
        None => " What just happened ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DEFAULT_THEME.border_normal))
        .padding(Padding::new(1, 1, 0, 0));

    let text = if narrative.is_empty() {
        Span::styled(
            "Press → to take the first step.",
            Style::default().fg(DEFAULT_THEME.comment),
        )
    } else {
        Span::styled(narrative, Style::default().fg(DEFAULT_THEME.fg))
    };

    let paragraph = Paragraph::new(Line::from(text))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

/// Render the status bar at the bottom
pub fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    message: &str,
    current_step: usize,
    total_steps: usize,
    is_playing: bool,
) {
    let layout = ratatui::layout::Layout::default()
        .direction(ratatui::layout::Direction::Horizontal)
        .constraints([
            ratatui::layout::Constraint::Percentage(50),
            ratatui::layout::Constraint::Percentage(50),
        ])
        .split(area);

    let left_spans = vec![
        Span::styled(
            format!(" Step {}/{} ", current_step, total_steps),
            Style::default()
                .bg(DEFAULT_THEME.primary)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            if is_playing { " ▶ " } else { " ⏸ " },
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.secondary),
        ),
        Span::styled(
            format!(" {} ", message),
            Style::default().bg(DEFAULT_THEME.current_line_bg).fg(
                if message.starts_with("Replay error") {
                    DEFAULT_THEME.error
                } else {
                    DEFAULT_THEME.fg
                },
            ),
        ),
    ];

    let left_paragraph = Paragraph::new(Line::from(left_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Left);

    frame.render_widget(left_paragraph, layout[0]);

    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.fg);
    let sep_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.comment);

    let right_spans = vec![
        Span::styled(" ←/→ ", key_style),
        Span::styled(" step ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ⎵ ", key_style),
        Span::styled(" play ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" ↵/⌫ ", key_style),
        Span::styled(" end/start ", desc_style),
        Span::styled("│", sep_style),
        Span::styled(" q ", key_style),
        Span::styled(" quit ", desc_style),
    ];

    let right_paragraph = Paragraph::new(Line::from(right_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Right);

    frame.render_widget(right_paragraph, layout[1]);
}
