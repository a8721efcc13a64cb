use abholi_core::model::{RequestStatus, RequestView, Role, User};
use chrono::{DateTime, Local, Utc};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, Wrap},
};

use crate::app::{App, IdPrompt, MenuItem, RegisterField, Screen, StatusKind};

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    // Title / header
    let header = Paragraph::new("abholi - match waste pickups to the nearest collector")
        .block(Block::default().borders(Borders::ALL).title("Abholi"));
    frame.render_widget(header, *header_area);

    // Main screen
    match app.screen {
        Screen::Menu => draw_menu(frame, app, *content_area),
        Screen::Register => draw_register_form(frame, app, *content_area),
        Screen::Prompt(prompt) => draw_prompt(frame, app, prompt, *content_area),
        Screen::Users => draw_users(frame, &app.users, "Registered users (r reload)", *content_area),
        Screen::Requests => draw_requests(
            frame,
            &app.requests,
            "Pickup requests (r reload)",
            *content_area,
        ),
    }

    // Status bar
    let nav_hint = match app.screen {
        Screen::Menu => "1-8 or ↑/↓ + Enter choose · q/Ctrl-C quit",
        Screen::Register => {
            "Tab/↓ next field · Shift-Tab/↑ previous · ←/→ or 1-3 role · Enter on role submits · Esc back"
        }
        Screen::Prompt(_) => "Type an ID · Enter submit · Esc back · Ctrl-C quit",
        Screen::Users | Screen::Requests => "r reload · Esc/←/b back · Ctrl-C quit",
    };

    let status_text = if app.is_loading {
        format!("Working… · {nav_hint}")
    } else if let Some(status) = &app.status {
        format!("{} · {nav_hint}", status.text)
    } else {
        nav_hint.to_owned()
    };

    let status_style = match (&app.status, app.is_loading) {
        (_, true) => Style::default().fg(Color::Yellow),
        (Some(status), false) => match status.kind {
            StatusKind::Error => Style::default().fg(Color::Red),
            StatusKind::Success => Style::default().fg(Color::Green),
            StatusKind::Info => Style::default().fg(Color::Cyan),
        },
        (None, false) => Style::default(),
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn draw_menu(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let items = MenuItem::ALL
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let prefix = if idx == app.menu_index { "> " } else { "  " };
            ListItem::new(format!("{prefix}{}. {}", idx + 1, item.label()))
        })
        .collect::<Vec<ListItem<'_>>>();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Waste Management System"),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    state.select(Some(app.menu_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_register_form(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // name
            Constraint::Length(3), // phone
            Constraint::Length(3), // location
            Constraint::Length(3), // role
            Constraint::Min(0),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [name_area, phone_area, location_area, role_area, _rest] = chunks else {
        return;
    };

    let form = &app.form;
    let fields = [
        (RegisterField::Name, "Full name", form.name.as_str(), *name_area),
        (
            RegisterField::Phone,
            "Phone number",
            form.phone.as_str(),
            *phone_area,
        ),
        (
            RegisterField::Location,
            "Location (city, country)",
            form.location.as_str(),
            *location_area,
        ),
    ];

    for (field, title, value, field_area) in fields {
        let input = Paragraph::new(value)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(focus_style(form.focus == field)),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(input, field_area);
    }

    let roles = Role::ALL
        .iter()
        .enumerate()
        .map(|(idx, role)| {
            let label = format!(" {}. {} ", idx + 1, role.label());
            if *role == form.role() {
                Span::styled(
                    label,
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED),
                )
            } else {
                Span::raw(label)
            }
        })
        .collect::<Vec<Span<'_>>>();

    let role_selector = Paragraph::new(Line::from(roles)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Role (Enter to register)")
            .border_style(focus_style(form.focus == RegisterField::Role)),
    );
    frame.render_widget(role_selector, *role_area);
}

fn draw_prompt(frame: &mut Frame<'_>, app: &App, prompt: IdPrompt, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // context table
            Constraint::Length(3), // input
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [context_area, input_area] = chunks else {
        return;
    };

    if prompt.wants_request_id() {
        draw_requests(frame, &app.requests, "Pickup requests", *context_area);
    } else {
        draw_users(frame, &app.users, "Registered users", *context_area);
    }

    let input = Paragraph::new(app.id_input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(prompt.title())
            .border_style(focus_style(true)),
    );
    frame.render_widget(input, *input_area);
}

fn draw_users(frame: &mut Frame<'_>, users: &[User], title: &str, area: Rect) {
    if users.is_empty() {
        let paragraph = Paragraph::new("No users registered yet. Choose 1 in the menu to add one.")
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let rows = users.iter().map(|user| {
        let online = if user.online { "online" } else { "offline" };
        let style = if user.online {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
        };

        Row::new(vec![
            Cell::from(user.id.to_string()),
            Cell::from(user.name.clone()),
            Cell::from(user.phone.clone()),
            Cell::from(user.location.text.clone()),
            Cell::from(Span::styled(user.role.label(), role_style(user.role))),
            Cell::from(online),
        ])
        .style(style)
    });

    let column_widths = [
        Constraint::Length(5),
        Constraint::Min(16),
        Constraint::Length(16),
        Constraint::Min(20),
        Constraint::Length(18),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["ID", "Name", "Phone", "Location", "Role", "Status"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title.to_owned()))
        .column_spacing(1);

    frame.render_widget(table, area);
}

fn draw_requests(frame: &mut Frame<'_>, requests: &[RequestView], title: &str, area: Rect) {
    if requests.is_empty() {
        let paragraph = Paragraph::new("No pickup requests yet.")
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
        return;
    }

    let rows = requests.iter().map(|view| {
        let request = &view.request;
        let collector = view.collector_name.as_deref().unwrap_or("-");
        let completed = request
            .completed_at
            .map_or_else(|| String::from("-"), format_timestamp);

        Row::new(vec![
            Cell::from(request.id.to_string()),
            Cell::from(view.creator_name.clone()),
            Cell::from(collector.to_owned()),
            Cell::from(request.status.slug()),
            Cell::from(format_timestamp(request.created_at)),
            Cell::from(completed),
        ])
        .style(Style::default().fg(status_color(request.status)))
    });

    let column_widths = [
        Constraint::Length(5),
        Constraint::Min(16),
        Constraint::Min(16),
        Constraint::Length(10),
        Constraint::Length(17),
        Constraint::Length(17),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec![
                "ID",
                "Creator",
                "Collector",
                "Status",
                "Created at",
                "Completed at",
            ])
            .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title.to_owned()))
        .column_spacing(1);

    frame.render_widget(table, area);
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

fn role_style(role: Role) -> Style {
    let color = match role {
        Role::Creator => Color::Magenta,
        Role::Collector => Color::Blue,
        Role::Recycler => Color::Cyan,
    };
    Style::default().fg(color)
}

fn status_color(status: RequestStatus) -> Color {
    match status {
        RequestStatus::Pending => Color::Yellow,
        RequestStatus::Completed => Color::Gray,
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%d.%m.%Y %H:%M")
        .to_string()
}
