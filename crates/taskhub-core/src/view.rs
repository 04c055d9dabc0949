//! Which containers are visible.
//!
//! Every transition bumps the view epoch. Loads issued for a view carry
//! the epoch they were issued under, and their results are only applied
//! while it is still current. Task-list reloads inside the task view
//! bump a separate list generation so a newer list wins without
//! invalidating other loads of the same view.

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthForm {
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Tasks,
    Profile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    SignedOut { form: AuthForm },
    SignedIn { view: View },
}

/// Load the caller must start after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewLoad {
    Tasks { generation: u64 },
    Profile { epoch: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewController {
    screen: Screen,
    password_panel: bool,
    epoch: u64,
    list_generation: u64,
}

impl Default for ViewController {
    fn default() -> Self {
        Self {
            screen: Screen::SignedOut {
                form: AuthForm::Login,
            },
            password_panel: false,
            epoch: 0,
            list_generation: 0,
        }
    }
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        self.epoch == epoch
    }

    pub fn list_generation(&self) -> u64 {
        self.list_generation
    }

    /// True while `generation` is the newest list load of the task view.
    pub fn is_current_list(&self, generation: u64) -> bool {
        self.list_generation == generation && self.active_view() == Some(View::Tasks)
    }

    pub fn active_view(&self) -> Option<View> {
        match self.screen {
            Screen::SignedIn { view } => Some(view),
            Screen::SignedOut { .. } => None,
        }
    }

    pub fn auth_form(&self) -> Option<AuthForm> {
        match self.screen {
            Screen::SignedOut { form } => Some(form),
            Screen::SignedIn { .. } => None,
        }
    }

    pub fn password_panel_open(&self) -> bool {
        self.password_panel
    }

    /// Shows whichever shell matches the login state.
    pub fn sync(&mut self, authenticated: bool) -> Option<ViewLoad> {
        if authenticated {
            Some(self.show_authenticated_shell())
        } else {
            self.show_login_prompt();
            None
        }
    }

    /// Signed-in chrome, opening on the task view.
    pub fn show_authenticated_shell(&mut self) -> ViewLoad {
        self.enter(Screen::SignedIn { view: View::Tasks });
        self.next_list_load()
    }

    pub fn show_login_prompt(&mut self) {
        self.enter(Screen::SignedOut {
            form: AuthForm::Login,
        });
    }

    pub fn show_task_view(&mut self, authenticated: bool) -> Option<ViewLoad> {
        if !authenticated {
            self.show_login_prompt();
            return None;
        }
        self.enter(Screen::SignedIn { view: View::Tasks });
        Some(self.next_list_load())
    }

    /// Also closes the password panel.
    pub fn show_profile_view(&mut self, authenticated: bool) -> Option<ViewLoad> {
        if !authenticated {
            self.show_login_prompt();
            return None;
        }
        self.enter(Screen::SignedIn {
            view: View::Profile,
        });
        Some(ViewLoad::Profile { epoch: self.epoch })
    }

    /// A fresh list load inside the task view (search, after a
    /// mutation). Older list responses become stale; the view epoch
    /// stays put.
    pub fn reload_tasks(&mut self) -> Option<ViewLoad> {
        if self.active_view() != Some(View::Tasks) {
            return None;
        }
        Some(self.next_list_load())
    }

    pub fn show_register_form(&mut self) {
        if let Screen::SignedOut { .. } = self.screen {
            self.screen = Screen::SignedOut {
                form: AuthForm::Register,
            };
        }
    }

    pub fn show_login_form(&mut self) {
        if let Screen::SignedOut { .. } = self.screen {
            self.screen = Screen::SignedOut {
                form: AuthForm::Login,
            };
        }
    }

    pub fn toggle_password_panel(&mut self) -> bool {
        if self.active_view() == Some(View::Profile) {
            self.password_panel = !self.password_panel;
        }
        self.password_panel
    }

    fn next_list_load(&mut self) -> ViewLoad {
        self.list_generation += 1;
        ViewLoad::Tasks {
            generation: self.list_generation,
        }
    }

    fn enter(&mut self, screen: Screen) {
        self.epoch += 1;
        self.password_panel = false;
        debug!(from = ?self.screen, to = ?screen, epoch = self.epoch, "view transition");
        self.screen = screen;
    }
}
