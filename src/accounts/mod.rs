//! Account records and their rows on the board.
//!
//! Every pay button owns a clone of the account it pays. Clicking it mutates
//! that account and rewrites the one label the account points at; nothing
//! else on the board is touched.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::{AccountSeed, AppConfig};
use crate::document::{Document, DocumentError, ElementId, ElementKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub name: String,
    pub money: u64,
    /// Label currently showing this account's balance, once rendered
    pub label: Option<ElementId>,
}

impl Account {
    pub fn new(name: impl Into<String>, money: u64) -> Self {
        Self {
            name: name.into(),
            money,
            label: None,
        }
    }

    /// Add `amount` and refresh the balance label, if any.
    fn pay(&mut self, amount: u64, doc: &mut Document) -> Result<(), DocumentError> {
        self.money = self.money.saturating_add(amount);
        if let Some(label) = self.label {
            doc.set_text(label, self.money.to_string())?;
        }
        tracing::debug!("Paid {} to {}, balance {}", amount, self.name, self.money);
        Ok(())
    }
}

pub type SharedAccount = Rc<RefCell<Account>>;

/// The fixed list of accounts on the board.
pub struct Ledger {
    accounts: Vec<SharedAccount>,
    pay_amount: u64,
}

impl Ledger {
    pub fn new(seeds: &[AccountSeed], pay_amount: u64) -> Self {
        let accounts = seeds
            .iter()
            .map(|seed| Rc::new(RefCell::new(Account::new(&seed.name, seed.money))))
            .collect();
        Self {
            accounts,
            pay_amount,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.accounts, config.pay_amount)
    }

    pub fn accounts(&self) -> &[SharedAccount] {
        &self.accounts
    }

    pub fn pay_amount(&self) -> u64 {
        self.pay_amount
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// First account with this name
    pub fn find(&self, name: &str) -> Option<usize> {
        self.accounts.iter().position(|a| a.borrow().name == name)
    }

    /// Sum of all balances as they are right now.
    pub fn total(&self) -> u64 {
        sum(&self.accounts)
    }
}

fn sum(accounts: &[SharedAccount]) -> u64 {
    accounts
        .iter()
        .fold(0u64, |acc, a| acc.saturating_add(a.borrow().money))
}

/// Handles of one rendered account row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountView {
    pub label: ElementId,
    pub pay_button: ElementId,
}

/// Append one row per account to `parent`, each looking like
/// `Bob: 100 [Pay!]`.
pub fn render_accounts(
    ledger: &Ledger,
    doc: &mut Document,
    parent: ElementId,
) -> Result<Vec<AccountView>, DocumentError> {
    let mut views = Vec::with_capacity(ledger.len());

    for account in ledger.accounts() {
        let row = doc.create_element(ElementKind::Row);
        let row = doc.append_child(parent, row)?;

        let name = doc.create_text_node(format!("{}:", account.borrow().name));
        doc.append_child(row, name)?;

        let label = doc.create_element(ElementKind::Label);
        let label = doc.append_child(row, label)?;
        doc.set_text(label, account.borrow().money.to_string())?;
        account.borrow_mut().label = Some(label);

        let pay_button = doc.create_element(ElementKind::Button);
        let pay_button = doc.append_child(row, pay_button)?;
        doc.set_text(pay_button, "Pay!")?;

        let account = Rc::clone(account);
        let amount = ledger.pay_amount();
        doc.on_click(pay_button, move |doc| account.borrow_mut().pay(amount, doc))?;

        views.push(AccountView {
            label,
            pay_button,
        });
    }

    Ok(views)
}

/// Append the "Print Total!" button. Clicking it raises `Sum: <total>` as an
/// alert, summed at click time.
pub fn render_total_button(
    ledger: &Ledger,
    doc: &mut Document,
    parent: ElementId,
) -> Result<ElementId, DocumentError> {
    let button = doc.create_element(ElementKind::Button);
    let button = doc.append_child(parent, button)?;
    doc.set_text(button, "Print Total!")?;

    let accounts = ledger.accounts().to_vec();
    doc.on_click(button, move |doc| {
        doc.alert(format!("Sum: {}", sum(&accounts)));
        Ok(())
    })?;

    Ok(button)
}
