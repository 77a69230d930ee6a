use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};

use crate::accounts::{self, AccountView, Ledger};
use crate::config::AppConfig;
use crate::document::{Document, ElementId};

/// A ledger rendered into its own document: account rows followed by the
/// total button.
pub struct Board {
    pub doc: Document,
    pub ledger: Ledger,
    pub views: Vec<AccountView>,
    pub total_button: ElementId,
}

impl Board {
    pub fn new(ledger: Ledger) -> Result<Self> {
        let mut doc = Document::new();
        let page = doc.root();
        let views = accounts::render_accounts(&ledger, &mut doc, page)
            .context("Failed to render accounts")?;
        let total_button = accounts::render_total_button(&ledger, &mut doc, page)
            .context("Failed to render total button")?;

        tracing::info!("Board ready with {} accounts", views.len());
        Ok(Self {
            doc,
            ledger,
            views,
            total_button,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(Ledger::from_config(config))
    }

    /// Click the pay button of the account at `index`
    pub fn pay(&mut self, index: usize) -> Result<()> {
        let view = self
            .views
            .get(index)
            .ok_or_else(|| anyhow!("No account at position {}", index))?;
        self.doc.click(view.pay_button)?;
        Ok(())
    }

    /// Click the pay button of the first account called `name`
    pub fn pay_by_name(&mut self, name: &str) -> Result<()> {
        let index = self
            .ledger
            .find(name)
            .ok_or_else(|| anyhow!("No account named '{}'", name))?;
        self.pay(index)
    }

    /// Click the total button and dismiss the alert it raises
    pub fn print_total(&mut self) -> Result<String> {
        self.doc.click(self.total_button)?;
        self.doc
            .take_alert()
            .ok_or_else(|| anyhow!("Total button raised no alert"))
    }

    /// Balances and total as `{ "total", "accounts": [{ "name", "money" }] }`
    pub fn to_json(&self) -> Value {
        let accounts: Vec<Value> = self
            .ledger
            .accounts()
            .iter()
            .map(|a| {
                let a = a.borrow();
                json!({ "name": a.name, "money": a.money })
            })
            .collect();
        json!({
            "total": self.ledger.total(),
            "accounts": accounts,
        })
    }

    /// Text of the label showing the balance at `index`
    pub fn displayed_balance(&self, index: usize) -> Option<&str> {
        let view = self.views.get(index)?;
        self.doc.text(view.label).ok()
    }
}
