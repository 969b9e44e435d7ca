//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState, PAGE_SCROLL_SIZE};
use crate::models::Grade;

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle reset confirmation
    if matches!(app.state, AppState::ConfirmingReset) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.reset_progress();
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

    // Normal mode
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('/') => {
            app.clear_search();
            app.state = AppState::Searching;
        }
        KeyCode::Char('g') => {
            app.toggle_grade();
        }
        KeyCode::Char('7') => {
            if app.grade != Grade::Seven {
                app.activate_grade(Grade::Seven);
            }
        }
        KeyCode::Char('8') => {
            if app.grade != Grade::Eight {
                app.activate_grade(Grade::Eight);
            }
        }
        KeyCode::Char('b') => {
            app.toggle_filter_mode();
        }
        KeyCode::Char('m') => {
            app.cycle_selected_status();
        }
        KeyCode::Char('x') => {
            app.toggle_selected_bookmark();
        }
        KeyCode::Char('e') => {
            app.export_data();
        }
        KeyCode::Char('C') => {
            app.clear_offline_cache();
        }
        KeyCode::Char('r') => {
            app.state = AppState::ConfirmingReset;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.move_selection(-1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.move_selection(1);
        }
        KeyCode::PageUp => {
            app.move_selection(-(PAGE_SCROLL_SIZE as isize));
        }
        KeyCode::PageDown => {
            app.move_selection(PAGE_SCROLL_SIZE as isize);
        }
        KeyCode::Home => {
            app.move_selection(isize::MIN / 2);
        }
        KeyCode::End => {
            app.move_selection(isize::MAX / 2);
        }
        KeyCode::Enter => {
            app.open_selected();
        }
        _ => {}
    }

    Ok(false)
}

fn handle_search_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.clear_search();
            app.state = AppState::Normal;
        }
        KeyCode::Enter => {
            app.select_search_result();
        }
        KeyCode::Up => {
            if app.search_selection > 0 {
                app.search_selection -= 1;
            }
        }
        KeyCode::Down => {
            if app.search_selection + 1 < app.search_results.len() {
                app.search_selection += 1;
            }
        }
        KeyCode::Backspace => {
            app.search_query.pop();
            app.request_search();
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            app.request_search();
        }
        _ => {}
    }

    Ok(false)
}
