use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use std::time::{Duration, Instant};

use crate::board::Board;
use crate::config::AppConfig;
use crate::document::ElementId;
use crate::theme::Theme;

/// How long a status message stays in the info line
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Alert,  // Modal message raised by the document
    Help,
}

pub struct App {
    pub popup: Popup,
    pub board: Board,
    pub theme: Theme,

    // Focus over the buttons: one per account, then the total button
    pub selected: usize,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,
}

impl App {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            popup: Popup::None,
            board: Board::from_config(config)?,
            theme: Theme::from_config(&config.theme),
            selected: 0,
            status_message: None,
            status_message_time: None,
        })
    }

    /// Set a status message (auto-clears after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Focusable buttons in display order
    pub fn buttons(&self) -> Vec<ElementId> {
        self.board
            .views
            .iter()
            .map(|v| v.pay_button)
            .chain(std::iter::once(self.board.total_button))
            .collect()
    }

    pub fn focused_button(&self) -> ElementId {
        self.buttons()
            .get(self.selected)
            .copied()
            .unwrap_or(self.board.total_button)
    }

    /// Index of the focused account, if focus is on a pay button
    pub fn focused_account(&self) -> Option<usize> {
        (self.selected < self.board.views.len()).then_some(self.selected)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle popups first
        if self.popup != Popup::None {
            return self.handle_popup_key(key);
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.buttons().len() - 1,

            // Activate whatever has focus
            KeyCode::Char(' ') | KeyCode::Enter => self.activate(self.focused_button())?,

            KeyCode::Char('p') => {
                if let Some(index) = self.focused_account() {
                    self.activate(self.board.views[index].pay_button)?;
                }
            }
            KeyCode::Char('t') => self.activate(self.board.total_button)?,

            // Help (? or h)
            KeyCode::Char('?') | KeyCode::Char('h') => self.popup = Popup::Help,

            _ => {}
        }
        Ok(())
    }

    fn handle_popup_key(&mut self, key: KeyEvent) -> Result<()> {
        let dismiss = matches!(
            key.code,
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('q')
        );
        match self.popup {
            Popup::Alert if dismiss => {
                self.board.doc.take_alert();
                // Queued alerts are shown one after another
                if self.board.doc.pending_alert().is_none() {
                    self.popup = Popup::None;
                }
            }
            Popup::Help if dismiss || matches!(key.code, KeyCode::Char('?') | KeyCode::Char('h')) => {
                self.popup = Popup::None;
            }
            _ => {}
        }
        Ok(())
    }

    fn move_down(&mut self) {
        let last = self.buttons().len() - 1;
        self.selected = (self.selected + 1).min(last);
    }

    fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Click a button and surface what it did
    fn activate(&mut self, button: ElementId) -> Result<()> {
        let paid = self.board.views.iter().position(|v| v.pay_button == button);
        let before = paid.map(|index| self.board.ledger.accounts()[index].borrow().money);

        self.board.doc.click(button)?;

        if let (Some(index), Some(before)) = (paid, before) {
            let (name, after) = {
                let account = self.board.ledger.accounts()[index].borrow();
                (account.name.clone(), account.money)
            };
            let balance = self.board.displayed_balance(index).unwrap_or("?").to_string();
            self.set_status(format!(
                "Paid {} to {}, balance {}",
                after - before,
                name,
                balance
            ));
        }

        if self.board.doc.pending_alert().is_some() {
            self.popup = Popup::Alert;
        }
        Ok(())
    }

    /// Periodic housekeeping between input events
    pub fn tick(&mut self) {
        if let Some(at) = self.status_message_time {
            if at.elapsed() >= STATUS_TIMEOUT {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AccountSeed;
    use crossterm::event::KeyModifiers;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    fn app() -> App {
        App::new(&AppConfig::default()).unwrap()
    }

    #[test]
    fn test_enter_pays_focused_account() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.board.ledger.accounts()[0].borrow().money, 110);
        assert_eq!(app.board.displayed_balance(0), Some("110"));
        assert_eq!(app.board.displayed_balance(1), Some("100"));
        assert_eq!(app.status_message.as_deref(), Some("Paid 10 to Bob, balance 110"));
        assert_eq!(app.popup, Popup::None);
    }

    #[test]
    fn test_status_reports_amount_actually_added() {
        let config = AppConfig {
            accounts: vec![AccountSeed {
                name: "Reginald".to_string(),
                money: u64::MAX - 4,
            }],
            ..AppConfig::default()
        };
        let mut app = App::new(&config).unwrap();

        press(&mut app, KeyCode::Enter);
        assert_eq!(
            app.status_message.as_deref(),
            Some(format!("Paid 4 to Reginald, balance {}", u64::MAX).as_str())
        );

        press(&mut app, KeyCode::Enter);
        assert_eq!(
            app.status_message.as_deref(),
            Some(format!("Paid 0 to Reginald, balance {}", u64::MAX).as_str())
        );
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut app = app();
        press(&mut app, KeyCode::Up);
        assert_eq!(app.selected, 0);

        for _ in 0..20 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(app.selected, 6);
        assert_eq!(app.focused_button(), app.board.total_button);
        assert_eq!(app.focused_account(), None);

        // 'p' does nothing on the total button
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.board.ledger.total(), 600);
    }

    #[test]
    fn test_total_alert_is_modal() {
        let mut app = app();
        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Char('t'));

        assert_eq!(app.popup, Popup::Alert);
        assert_eq!(app.board.doc.pending_alert(), Some("Sum: 610"));

        // Other keys are swallowed while the alert is up
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.board.ledger.total(), 610);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.popup, Popup::None);
        assert_eq!(app.board.doc.pending_alert(), None);
    }

    #[test]
    fn test_focused_total_button() {
        let mut app = app();
        press(&mut app, KeyCode::End);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.popup, Popup::Alert);
        assert_eq!(app.board.doc.pending_alert(), Some("Sum: 600"));
        assert_eq!(app.status_message, None);
    }

    #[test]
    fn test_help_toggle() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.popup, Popup::Help);
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.popup, Popup::None);
    }

    #[test]
    fn test_status_clears() {
        let mut app = app();
        app.set_status("Paid");
        app.tick();
        assert!(app.status_message.is_some());

        app.status_message_time = Instant::now().checked_sub(STATUS_TIMEOUT);
        app.tick();
        assert_eq!(app.status_message, None);
    }
}
