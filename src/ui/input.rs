//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{
    can_add_field_char, can_add_password_char, can_add_username_char, App, AppState, Focus,
    IdentityFocus, LoginFocus, RegisterFocus, Tab, PAGE_SCROLL_SIZE,
};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle login overlay
    if matches!(app.state, AppState::LoggingIn) {
        return handle_login_input(app, key).await;
    }

    // Handle register overlay
    if matches!(app.state, AppState::Registering) {
        return handle_register_input(app, key).await;
    }

    // Handle add-identity overlay
    if matches!(app.state, AppState::AddingIdentity) {
        handle_add_identity_input(app, key);
        return Ok(false);
    }

    // Handle name edit overlay
    if matches!(app.state, AppState::EditingName) {
        handle_edit_name_input(app, key);
        return Ok(false);
    }

    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle delete confirmation
    if matches!(app.state, AppState::ConfirmingDelete) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Normal;
                app.delete_selected_identity();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
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
        handle_search_input(app, key);
        return Ok(false);
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char('1') => switch_tab(app, Tab::Overview),
        KeyCode::Char('2') => switch_tab(app, Tab::Identities),
        KeyCode::Char('3') => switch_tab(app, Tab::Scans),
        KeyCode::Char('4') => switch_tab(app, Tab::Threats),
        KeyCode::Char('5') => switch_tab(app, Tab::Sources),
        KeyCode::Char('6') => switch_tab(app, Tab::Profile),
        KeyCode::Left => {
            let prev = app.current_tab.prev();
            switch_tab(app, prev);
        }
        KeyCode::Right => {
            let next = app.current_tab.next();
            switch_tab(app, next);
        }
        KeyCode::Char('r') => {
            app.refresh_all_background();
        }
        KeyCode::Char('L') => {
            app.logout();
        }
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
            app.search_query.clear();
        }
        KeyCode::Esc => {
            if app.current_tab == Tab::Scans && app.focus == Focus::Detail {
                app.close_scan_detail();
            } else {
                app.search_query.clear();
                app.focus = Focus::List;
            }
        }
        // List navigation shared by every tab
        KeyCode::Char('j') | KeyCode::Down => app.select_next(1),
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(1),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),
        KeyCode::PageDown => app.select_next(PAGE_SCROLL_SIZE),
        KeyCode::PageUp => app.select_prev(PAGE_SCROLL_SIZE),
        _ => {
            // Tab-specific input
            match app.current_tab {
                Tab::Overview => {}
                Tab::Identities => handle_identities_input(app, key),
                Tab::Scans => handle_scans_input(app, key),
                Tab::Threats => {}
                Tab::Sources => {}
                Tab::Profile => handle_profile_input(app, key),
            }
        }
    }

    Ok(false)
}

/// Change tabs, dropping any open scan detail so its poller stops.
fn switch_tab(app: &mut App, tab: Tab) {
    if app.current_tab == Tab::Scans && tab != Tab::Scans {
        app.close_scan_detail();
    }
    app.current_tab = tab;
    app.focus = Focus::List;
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.search_query.clear();
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
            // Keep search query active
        }
        KeyCode::Backspace => {
            app.search_query.pop();
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            // Reset selection when search changes
            app.select_first();
        }
        _ => {}
    }
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Ctrl+N opens the registration form
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('n') {
        app.start_register();
        return Ok(false);
    }

    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            // Move to next field
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Username,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            // Move to previous field
            app.login_focus = match app.login_focus {
                LoginFocus::Username => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Username,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => {
            match app.login_focus {
                LoginFocus::Username => {
                    // Move to password
                    app.login_focus = LoginFocus::Password;
                }
                LoginFocus::Password => {
                    // Move to button
                    app.login_focus = LoginFocus::Button;
                }
                LoginFocus::Button => {
                    // Attempt login
                    let _ = app.attempt_login().await;
                    // If successful, state will be Normal
                    // If failed, login_error will be set
                    if app.state == AppState::Normal {
                        // Login succeeded, refresh data
                        app.refresh_all_background();
                    }
                }
            }
        }
        KeyCode::Backspace => {
            match app.login_focus {
                LoginFocus::Username => {
                    app.login_username.pop();
                }
                LoginFocus::Password => {
                    app.login_password.pop();
                }
                LoginFocus::Button => {}
            }
        }
        KeyCode::Char(c) => {
            match app.login_focus {
                LoginFocus::Username => {
                    if can_add_username_char(app.login_username.len(), c) {
                        app.login_username.push(c);
                    }
                }
                LoginFocus::Password => {
                    if can_add_password_char(app.login_password.len(), c) {
                        app.login_password.push(c);
                    }
                }
                LoginFocus::Button => {
                    // Ignore character input on button
                }
            }
        }
        _ => {}
    }
    Ok(false)
}

async fn handle_register_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.start_login();
        }
        KeyCode::Down | KeyCode::Tab => {
            app.register_focus = match app.register_focus {
                RegisterFocus::Name => RegisterFocus::Email,
                RegisterFocus::Email => RegisterFocus::Password,
                RegisterFocus::Password => RegisterFocus::Button,
                RegisterFocus::Button => RegisterFocus::Name,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.register_focus = match app.register_focus {
                RegisterFocus::Name => RegisterFocus::Button,
                RegisterFocus::Email => RegisterFocus::Name,
                RegisterFocus::Password => RegisterFocus::Email,
                RegisterFocus::Button => RegisterFocus::Password,
            };
        }
        KeyCode::Enter => match app.register_focus {
            RegisterFocus::Name => app.register_focus = RegisterFocus::Email,
            RegisterFocus::Email => app.register_focus = RegisterFocus::Password,
            RegisterFocus::Password => app.register_focus = RegisterFocus::Button,
            RegisterFocus::Button => {
                let _ = app.attempt_register().await;
            }
        },
        KeyCode::Backspace => match app.register_focus {
            RegisterFocus::Name => {
                app.register_name.pop();
            }
            RegisterFocus::Email => {
                app.register_email.pop();
            }
            RegisterFocus::Password => {
                app.register_password.pop();
            }
            RegisterFocus::Button => {}
        },
        KeyCode::Char(c) => match app.register_focus {
            RegisterFocus::Name => {
                if can_add_field_char(app.register_name.len(), c) {
                    app.register_name.push(c);
                }
            }
            RegisterFocus::Email => {
                if can_add_field_char(app.register_email.len(), c) {
                    app.register_email.push(c);
                }
            }
            RegisterFocus::Password => {
                if can_add_password_char(app.register_password.len(), c) {
                    app.register_password.push(c);
                }
            }
            RegisterFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

fn handle_add_identity_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
        }
        KeyCode::Down | KeyCode::Tab => {
            app.identity_focus = match app.identity_focus {
                IdentityFocus::Email => IdentityFocus::Name,
                IdentityFocus::Name => IdentityFocus::Button,
                IdentityFocus::Button => IdentityFocus::Email,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.identity_focus = match app.identity_focus {
                IdentityFocus::Email => IdentityFocus::Button,
                IdentityFocus::Name => IdentityFocus::Email,
                IdentityFocus::Button => IdentityFocus::Name,
            };
        }
        KeyCode::Enter => match app.identity_focus {
            IdentityFocus::Email => app.identity_focus = IdentityFocus::Name,
            IdentityFocus::Name => app.identity_focus = IdentityFocus::Button,
            IdentityFocus::Button => app.submit_add_identity(),
        },
        KeyCode::Backspace => match app.identity_focus {
            IdentityFocus::Email => {
                app.identity_email.pop();
            }
            IdentityFocus::Name => {
                app.identity_name.pop();
            }
            IdentityFocus::Button => {}
        },
        KeyCode::Char(c) => match app.identity_focus {
            IdentityFocus::Email => {
                if can_add_field_char(app.identity_email.len(), c) {
                    app.identity_email.push(c);
                }
            }
            IdentityFocus::Name => {
                if can_add_field_char(app.identity_name.len(), c) {
                    app.identity_name.push(c);
                }
            }
            IdentityFocus::Button => {}
        },
        _ => {}
    }
}

fn handle_edit_name_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
        }
        KeyCode::Enter => {
            app.submit_edit_name();
        }
        KeyCode::Backspace => {
            app.name_input.pop();
        }
        KeyCode::Char(c) => {
            if can_add_field_char(app.name_input.len(), c) {
                app.name_input.push(c);
            }
        }
        _ => {}
    }
}

fn handle_identities_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('a') => {
            app.start_add_identity();
        }
        KeyCode::Char('d') => {
            if !app.visible_identities().is_empty() {
                app.state = AppState::ConfirmingDelete;
            }
        }
        KeyCode::Char('s') => {
            app.start_scan_for_selected_identity();
        }
        _ => {}
    }
}

fn handle_scans_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            if app.focus == Focus::List {
                app.open_scan_detail();
            }
        }
        _ => {}
    }
}

fn handle_profile_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('e') => {
            app.start_edit_name();
        }
        _ => {}
    }
}
