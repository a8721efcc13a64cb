use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, IdPrompt, MenuItem, RegisterField, Screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Quit,
    /// Run `service.users`()
    LoadUsers,
    /// Run `service.requests`()
    LoadRequests,
    /// Run `service.register_user`(...) with the filled-in form
    Register,
    /// Run the operation behind the prompt with the typed id
    SubmitId(IdPrompt),
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{BackTab, Backspace, Char, Down, Enter, Esc, Left, Right, Tab, Up};

    // Global quit shortcut
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    let typing = !key.modifiers.contains(KeyModifiers::CONTROL)
        && !key.modifiers.contains(KeyModifiers::ALT);

    let mut action = Action::None;

    match app.screen {
        Screen::Menu => match key.code {
            Char('q') | Esc => action = Action::Quit,
            Up | Char('k') => {
                if app.menu_index > 0 {
                    app.menu_index -= 1;
                }
            }
            Down | Char('j') => {
                if app.menu_index + 1 < MenuItem::ALL.len() {
                    app.menu_index += 1;
                }
            }
            Char(digit @ '1'..='9') => {
                let index = digit.to_digit(10).map_or(0, |number| number as usize) - 1;
                if let Some(item) = MenuItem::ALL.get(index).copied() {
                    app.menu_index = index;
                    action = choose(item, app);
                }
            }
            Enter | Char(' ') => {
                action = choose(app.current_menu_item(), app);
            }
            _ => {}
        },

        Screen::Register => match key.code {
            Esc => app.back_to_menu(),
            Tab | Down => app.form.focus = app.form.focus.next(),
            BackTab | Up => app.form.focus = app.form.focus.previous(),
            Enter => {
                if app.form.focus == RegisterField::Role {
                    action = Action::Register;
                } else {
                    app.form.focus = app.form.focus.next();
                }
            }
            Left if app.form.focus == RegisterField::Role => app.form.previous_role(),
            Right if app.form.focus == RegisterField::Role => app.form.next_role(),
            Char(digit @ '1'..='3') if app.form.focus == RegisterField::Role => {
                app.form.role_index = digit.to_digit(10).map_or(0, |number| number as usize) - 1;
            }
            Char(character) if typing => {
                if let Some(text) = app.form.focused_text_mut() {
                    text.push(character);
                }
            }
            Backspace => {
                if let Some(text) = app.form.focused_text_mut() {
                    text.pop();
                }
            }
            _ => {}
        },

        Screen::Prompt(prompt) => match key.code {
            Esc | Left => app.back_to_menu(),
            Enter => action = Action::SubmitId(prompt),
            Char(character) if typing => app.id_input.push(character),
            Backspace => {
                app.id_input.pop();
            }
            _ => {}
        },

        Screen::Users => match key.code {
            Esc | Left | Char('b') => app.back_to_menu(),
            Char('r') => action = Action::LoadUsers,
            _ => {}
        },

        Screen::Requests => match key.code {
            Esc | Left | Char('b') => app.back_to_menu(),
            Char('r') => action = Action::LoadRequests,
            _ => {}
        },
    }
    action
}

/// Switch to the screen behind a menu entry and return what to load for it.
fn choose(item: MenuItem, app: &mut App) -> Action {
    match item {
        MenuItem::Register => {
            app.open_register_form();
            Action::None
        }
        MenuItem::ToggleStatus => {
            app.open_prompt(IdPrompt::ToggleStatus);
            Action::LoadUsers
        }
        MenuItem::CreateRequest => {
            app.open_prompt(IdPrompt::CreateRequest);
            Action::LoadUsers
        }
        MenuItem::ListUsers => {
            app.screen = Screen::Users;
            Action::LoadUsers
        }
        MenuItem::ListRequests => {
            app.screen = Screen::Requests;
            Action::LoadRequests
        }
        MenuItem::CompletePickup => {
            app.open_prompt(IdPrompt::CompleteRequest);
            Action::LoadRequests
        }
        MenuItem::CompleteNextForCollector => {
            app.open_prompt(IdPrompt::CompleteNextForCollector);
            Action::LoadUsers
        }
        MenuItem::Exit => Action::Quit,
    }
}

#[cfg(test)]
mod tests {
    use abholi_core::model::Role;

    use super::*;

    fn press(app: &mut App, code: KeyCode) -> Action {
        handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), app)
    }

    fn type_text(app: &mut App, text: &str) {
        for character in text.chars() {
            press(app, KeyCode::Char(character));
        }
    }

    #[test]
    fn digits_jump_to_menu_entries() {
        let mut app = App::new();

        assert_eq!(press(&mut app, KeyCode::Char('4')), Action::LoadUsers);
        assert_eq!(app.screen, Screen::Users);

        press(&mut app, KeyCode::Esc);
        assert_eq!(
            press(&mut app, KeyCode::Char('6')),
            Action::LoadRequests
        );
        assert_eq!(app.screen, Screen::Prompt(IdPrompt::CompleteRequest));

        press(&mut app, KeyCode::Esc);
        assert_eq!(press(&mut app, KeyCode::Char('8')), Action::Quit);
        assert_eq!(press(&mut app, KeyCode::Char('9')), Action::None);
    }

    #[test]
    fn arrows_and_enter_select_the_highlighted_entry() {
        let mut app = App::new();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.current_menu_item(), MenuItem::CreateRequest);

        assert_eq!(press(&mut app, KeyCode::Enter), Action::LoadUsers);
        assert_eq!(app.screen, Screen::Prompt(IdPrompt::CreateRequest));
    }

    #[test]
    fn registration_form_is_filled_field_by_field() {
        let mut app = App::new();
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.screen, Screen::Register);

        type_text(&mut app, "Ama Owusu");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "+233 20 1234567");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "Accra, Ghanaa");
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.form.focus, RegisterField::Role);

        press(&mut app, KeyCode::Char('2'));
        assert_eq!(press(&mut app, KeyCode::Enter), Action::Register);

        let registration = app.form.to_registration();
        assert_eq!(registration.name, "Ama Owusu");
        assert_eq!(registration.phone, "+233 20 1234567");
        assert_eq!(registration.location_text, "Accra, Ghana");
        assert_eq!(registration.role, Role::Collector);
    }

    #[test]
    fn q_is_text_inside_forms_and_quits_only_from_the_menu() {
        let mut app = App::new();
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(press(&mut app, KeyCode::Char('q')), Action::None);
        assert_eq!(app.form.name, "q");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.screen, Screen::Menu);
        assert_eq!(press(&mut app, KeyCode::Char('q')), Action::Quit);
    }

    #[test]
    fn ctrl_c_quits_from_anywhere() {
        let mut app = App::new();
        press(&mut app, KeyCode::Char('2'));
        let action = handle_key_event(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            &mut app,
        );
        assert_eq!(action, Action::Quit);
    }

    #[test]
    fn prompt_collects_the_id_and_submits() {
        let mut app = App::new();
        press(&mut app, KeyCode::Char('7'));
        type_text(&mut app, "13");
        press(&mut app, KeyCode::Backspace);
        type_text(&mut app, "2");

        assert_eq!(
            press(&mut app, KeyCode::Enter),
            Action::SubmitId(IdPrompt::CompleteNextForCollector)
        );
        assert_eq!(app.id_input, "12");
    }
}
