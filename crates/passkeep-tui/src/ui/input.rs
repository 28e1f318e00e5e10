//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes. Overlay states are handled first, then the
//! current view's form or list.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{
    can_add_email_char, can_add_entry_name_char, can_add_password_char, can_add_username_char,
    App, AppState, FieldFocus, SignInFocus, SignUpFocus,
};
use crate::route::View;

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
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

    // Handle delete confirmation
    if matches!(app.state, AppState::ConfirmingDelete) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.confirm_delete();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.delete_target = None;
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    // Handle create-entry overlay
    if matches!(app.state, AppState::CreatingEntry) {
        return handle_create_input(app, key);
    }

    match app.view {
        View::SignIn => handle_sign_in_input(app, key),
        View::SignUp => handle_sign_up_input(app, key),
        View::Dashboard => handle_dashboard_input(app, key),
    }
}

fn handle_sign_in_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Down | KeyCode::Tab => {
            app.signin_focus = match app.signin_focus {
                SignInFocus::Email => SignInFocus::Password,
                SignInFocus::Password => SignInFocus::Button,
                SignInFocus::Button => SignInFocus::Link,
                SignInFocus::Link => SignInFocus::Email,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.signin_focus = match app.signin_focus {
                SignInFocus::Email => SignInFocus::Link,
                SignInFocus::Password => SignInFocus::Email,
                SignInFocus::Button => SignInFocus::Password,
                SignInFocus::Link => SignInFocus::Button,
            };
        }
        KeyCode::Enter => match app.signin_focus {
            SignInFocus::Email => app.signin_focus = SignInFocus::Password,
            SignInFocus::Password | SignInFocus::Button => app.attempt_sign_in(),
            SignInFocus::Link => app.show_sign_up(),
        },
        KeyCode::Delete => {
            App::dismiss_first(&mut app.signin_messages);
        }
        KeyCode::Backspace => match app.signin_focus {
            SignInFocus::Email => {
                app.signin_email.pop();
            }
            SignInFocus::Password => {
                app.signin_password.pop();
                app.note_signin_password_edited();
            }
            _ => {}
        },
        KeyCode::Char(c) => match app.signin_focus {
            SignInFocus::Email => {
                if can_add_email_char(&app.signin_email, c) {
                    app.signin_email.push(c);
                }
            }
            SignInFocus::Password => {
                if can_add_password_char(&app.signin_password, c) {
                    app.signin_password.push(c);
                    app.note_signin_password_edited();
                }
            }
            _ => {}
        },
        _ => {}
    }
    Ok(false)
}

fn handle_sign_up_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.show_sign_in();
        }
        KeyCode::Down | KeyCode::Tab => {
            app.signup_focus = match app.signup_focus {
                SignUpFocus::Email => SignUpFocus::Username,
                SignUpFocus::Username => SignUpFocus::Password,
                SignUpFocus::Password => SignUpFocus::Button,
                SignUpFocus::Button => SignUpFocus::Link,
                SignUpFocus::Link => SignUpFocus::Email,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.signup_focus = match app.signup_focus {
                SignUpFocus::Email => SignUpFocus::Link,
                SignUpFocus::Username => SignUpFocus::Email,
                SignUpFocus::Password => SignUpFocus::Username,
                SignUpFocus::Button => SignUpFocus::Password,
                SignUpFocus::Link => SignUpFocus::Button,
            };
        }
        KeyCode::Enter => match app.signup_focus {
            SignUpFocus::Email => app.signup_focus = SignUpFocus::Username,
            SignUpFocus::Username => app.signup_focus = SignUpFocus::Password,
            SignUpFocus::Password | SignUpFocus::Button => app.attempt_sign_up(),
            SignUpFocus::Link => app.show_sign_in(),
        },
        KeyCode::Delete => {
            App::dismiss_first(&mut app.signup_messages);
        }
        KeyCode::Backspace => match app.signup_focus {
            SignUpFocus::Email => {
                app.signup_email.pop();
            }
            SignUpFocus::Username => {
                app.signup_username.pop();
            }
            SignUpFocus::Password => {
                app.signup_password.pop();
            }
            _ => {}
        },
        KeyCode::Char(c) => match app.signup_focus {
            SignUpFocus::Email => {
                if can_add_email_char(&app.signup_email, c) {
                    app.signup_email.push(c);
                }
            }
            SignUpFocus::Username => {
                if can_add_username_char(&app.signup_username, c) {
                    app.signup_username.push(c);
                }
            }
            SignUpFocus::Password => {
                if can_add_password_char(&app.signup_password, c) {
                    app.signup_password.push(c);
                }
            }
            _ => {}
        },
        _ => {}
    }
    Ok(false)
}

fn handle_dashboard_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // An open edit form captures the keyboard until saved or cancelled
    if app.edit.is_some() {
        return handle_edit_input(app, key);
    }

    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.select_next();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.select_prev();
        }
        KeyCode::Char('n') => {
            app.open_create();
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            app.start_edit();
        }
        KeyCode::Char('d') | KeyCode::Char('x') => {
            app.request_delete();
        }
        KeyCode::Char('v') => {
            app.toggle_reveal();
        }
        KeyCode::Char('r') => {
            if !app.loading {
                app.activate_dashboard();
            }
        }
        KeyCode::Char('o') => {
            app.sign_out(None);
        }
        KeyCode::Delete => {
            app.dismiss_dashboard_message();
        }
        _ => {}
    }
    Ok(false)
}

fn handle_edit_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.cancel_edit();
            return Ok(false);
        }
        KeyCode::Delete => {
            if let Some(id) = app.edit.as_ref().map(|d| d.id.clone()) {
                if let Some(messages) = app.entry_messages.get_mut(&id) {
                    App::dismiss_first(messages);
                    if messages.is_empty() {
                        app.entry_messages.remove(&id);
                    }
                }
            }
            return Ok(false);
        }
        KeyCode::Enter => {
            let advance = app.edit.as_ref().map(|d| d.focus);
            match advance {
                Some(FieldFocus::Name) => {
                    if let Some(ref mut draft) = app.edit {
                        draft.focus = FieldFocus::Password;
                    }
                }
                Some(FieldFocus::Password) | Some(FieldFocus::Button) => app.save_edit(),
                None => {}
            }
            return Ok(false);
        }
        _ => {}
    }

    let Some(ref mut draft) = app.edit else {
        return Ok(false);
    };

    match key.code {
        KeyCode::Down | KeyCode::Tab => {
            draft.focus = match draft.focus {
                FieldFocus::Name => FieldFocus::Password,
                FieldFocus::Password => FieldFocus::Button,
                FieldFocus::Button => FieldFocus::Name,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            draft.focus = match draft.focus {
                FieldFocus::Name => FieldFocus::Button,
                FieldFocus::Password => FieldFocus::Name,
                FieldFocus::Button => FieldFocus::Password,
            };
        }
        KeyCode::Backspace => match draft.focus {
            FieldFocus::Name => {
                draft.name.pop();
            }
            FieldFocus::Password => {
                draft.password.pop();
            }
            FieldFocus::Button => {}
        },
        KeyCode::Char(c) => match draft.focus {
            FieldFocus::Name => {
                if can_add_entry_name_char(&draft.name, c) {
                    draft.name.push(c);
                }
            }
            FieldFocus::Password => {
                if can_add_password_char(&draft.password, c) {
                    draft.password.push(c);
                }
            }
            FieldFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

fn handle_create_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            if !app.create_busy {
                app.state = AppState::Normal;
            }
        }
        KeyCode::Down | KeyCode::Tab => {
            app.create_focus = match app.create_focus {
                FieldFocus::Name => FieldFocus::Password,
                FieldFocus::Password => FieldFocus::Button,
                FieldFocus::Button => FieldFocus::Name,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.create_focus = match app.create_focus {
                FieldFocus::Name => FieldFocus::Button,
                FieldFocus::Password => FieldFocus::Name,
                FieldFocus::Button => FieldFocus::Password,
            };
        }
        KeyCode::Enter => match app.create_focus {
            FieldFocus::Name => app.create_focus = FieldFocus::Password,
            FieldFocus::Password | FieldFocus::Button => app.attempt_create(),
        },
        KeyCode::Delete => {
            App::dismiss_first(&mut app.create_messages);
        }
        KeyCode::Backspace => match app.create_focus {
            FieldFocus::Name => {
                app.create_name.pop();
            }
            FieldFocus::Password => {
                app.create_password.pop();
            }
            FieldFocus::Button => {}
        },
        KeyCode::Char(c) => match app.create_focus {
            FieldFocus::Name => {
                if can_add_entry_name_char(&app.create_name, c) {
                    app.create_name.push(c);
                }
            }
            FieldFocus::Password => {
                if can_add_password_char(&app.create_password, c) {
                    app.create_password.push(c);
                }
            }
            FieldFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}
