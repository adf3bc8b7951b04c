//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{
    can_add_email_char, can_add_password_char, App, AppState, Focus, LoginFocus, Tab,
    PAGE_SCROLL_SIZE,
};
use crate::models::RecordFilter;

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle login overlay
    if matches!(app.state, AppState::LoggingIn) {
        return handle_login_input(app, key).await;
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle search mode
    if matches!(app.state, AppState::Searching) {
        return handle_search_input(app, key);
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('1') => {
            app.current_tab = Tab::Today;
            app.focus = Focus::List;
        }
        KeyCode::Char('2') => {
            switch_to_history(app);
        }
        KeyCode::Char('3') => {
            app.current_tab = Tab::Chart;
            app.focus = Focus::List;
        }
        KeyCode::Tab => {
            let next = app.current_tab.next();
            if next == Tab::History {
                switch_to_history(app);
            } else {
                app.current_tab = next;
                app.focus = Focus::List;
            }
        }
        KeyCode::BackTab => {
            let prev = app.current_tab.prev();
            if prev == Tab::History {
                switch_to_history(app);
            } else {
                app.current_tab = prev;
                app.focus = Focus::List;
            }
        }
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
        }
        KeyCode::Char('s') => {
            app.filter.status = app.filter.status.next();
            app.on_filter_changed();
        }
        KeyCode::Char('n') => {
            app.filter.notified = app.filter.notified.next();
            app.on_filter_changed();
        }
        KeyCode::Char('c') => {
            app.filter = RecordFilter::default();
            app.on_filter_changed();
        }
        KeyCode::Char('e') => match app.export_csv() {
            Ok(filename) => {
                app.status_message = Some(format!("Exported {}", filename));
            }
            Err(e) => {
                app.status_message = Some(format!("Export failed: {}", e));
            }
        },
        KeyCode::Char('u') => {
            if app.is_authenticated() {
                app.refresh_all_background();
            } else {
                app.start_login();
            }
        }
        KeyCode::Char('L') => {
            app.sign_out();
        }
        KeyCode::Char('h') | KeyCode::Left => {
            app.focus = Focus::List;
        }
        KeyCode::Char('l') | KeyCode::Right => {
            app.focus = Focus::Detail;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            move_selection(app, 1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            move_selection(app, -1);
        }
        KeyCode::PageDown => {
            move_selection(app, PAGE_SCROLL_SIZE as isize);
        }
        KeyCode::PageUp => {
            move_selection(app, -(PAGE_SCROLL_SIZE as isize));
        }
        KeyCode::Home => {
            set_selection(app, 0);
        }
        KeyCode::End => {
            set_selection(app, usize::MAX);
        }
        _ => {}
    }

    Ok(false)
}

/// Switch to the History tab and kick off a fetch for the selected day
fn switch_to_history(app: &mut App) {
    app.current_tab = Tab::History;
    app.focus = Focus::List;
    if let Some(date) = app.selected_date().cloned() {
        app.fetch_day_background(&date);
    }
}

/// Move the active list's selection by a signed amount, clamped to bounds
fn move_selection(app: &mut App, delta: isize) {
    let (selection, len) = active_selection(app);
    if len == 0 {
        return;
    }
    let current = selection.min(len - 1) as isize;
    let updated = (current + delta).clamp(0, len as isize - 1) as usize;
    apply_selection(app, updated);
}

/// Set the active list's selection to an absolute position, clamped
fn set_selection(app: &mut App, position: usize) {
    let (_, len) = active_selection(app);
    if len == 0 {
        return;
    }
    apply_selection(app, position.min(len - 1));
}

/// The selection index and list length the current tab/focus navigates
fn active_selection(app: &App) -> (usize, usize) {
    match (app.current_tab, app.focus) {
        (Tab::History, Focus::List) => (app.date_selection, app.archived_dates.len()),
        (Tab::History, Focus::Detail) => {
            (app.day_record_selection, app.filtered_day_records().len())
        }
        _ => (app.record_selection, app.filtered_records().len()),
    }
}

fn apply_selection(app: &mut App, updated: usize) {
    match (app.current_tab, app.focus) {
        (Tab::History, Focus::List) => {
            app.date_selection = updated;
            app.day_record_selection = 0;
            if let Some(date) = app.selected_date().cloned() {
                app.fetch_day_background(&date);
            }
        }
        (Tab::History, Focus::Detail) => {
            app.day_record_selection = updated;
        }
        _ => {
            app.record_selection = updated;
        }
    }
}

/// Handle input while the search prompt is active
fn handle_search_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.filter.name_query.clear();
            app.state = AppState::Normal;
            app.on_filter_changed();
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            app.filter.name_query.pop();
            app.on_filter_changed();
        }
        KeyCode::Char(c) => {
            if !c.is_control() {
                app.filter.name_query.push(c);
                app.on_filter_changed();
            }
        }
        _ => {}
    }
    Ok(false)
}

/// Handle input while the login overlay is active
async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Only allow dismissing the overlay when a session already exists
            if app.is_authenticated() {
                app.state = AppState::Normal;
            }
        }
        KeyCode::Tab | KeyCode::Down => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Email,
            };
        }
        KeyCode::BackTab | KeyCode::Up => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Email,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => {
                app.login_focus = LoginFocus::Password;
            }
            LoginFocus::Password | LoginFocus::Button => {
                if app.attempt_login().await.is_ok() {
                    app.refresh_all_background();
                }
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if can_add_email_char(app.login_email.len(), c) {
                    app.login_email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.len(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}
