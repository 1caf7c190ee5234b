//! Bank account domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::{EntityId, EntityKind, InputModel};
use crate::errors::{Error, Result, ValidationError};
use crate::users::{AuditTrail, Related};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BankAccountStatus {
    #[default]
    Active,
    Inactive,
}

/// Domain model representing a bank account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    pub id: EntityId,
    pub account_name: String,
    pub bank_name: String,
    pub account_holder_name: String,
    pub account_number: String,
    pub last_balance: Decimal,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_balance_date: DateTime<Utc>,
    pub status: BankAccountStatus,
    #[serde(flatten)]
    pub audit: AuditTrail,
    /// Balance history; entries not loaded yet are left as ids.
    #[serde(default)]
    pub balances: Vec<Related<BankAccountBalance>>,
}

impl BankAccount {
    pub fn is_active(&self) -> bool {
        self.status == BankAccountStatus::Active && !self.audit.is_deleted()
    }

    /// Loaded balances, oldest first.
    pub fn balance_history(&self) -> Vec<&BankAccountBalance> {
        let mut history: Vec<&BankAccountBalance> =
            self.balances.iter().filter_map(Related::loaded).collect();
        history.sort_by_key(|balance| balance.date);
        history
    }
}

/// A snapshot of a bank account's balance at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankAccountBalance {
    pub id: EntityId,
    pub bank_account_id: EntityId,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    pub balance: Decimal,
    #[serde(flatten)]
    pub audit: AuditTrail,
}

/// Input model for creating or updating a bank account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankAccountInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub account_name: String,
    pub bank_name: String,
    pub account_holder_name: String,
    pub account_number: String,
    pub last_balance: Decimal,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_balance_date: DateTime<Utc>,
    pub status: BankAccountStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub balances: Vec<BankAccountBalanceInput>,
}

impl BankAccountInput {
    /// Validates the bank account data.
    pub fn validate(&self) -> Result<()> {
        if self.account_name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Account name cannot be empty".to_string(),
            )));
        }
        if self.bank_name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Bank name cannot be empty".to_string(),
            )));
        }
        if self.last_balance.is_sign_negative() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Last balance cannot be negative".to_string(),
            )));
        }
        for balance in &self.balances {
            balance.validate_amount()?;
        }
        Ok(())
    }
}

impl From<&BankAccount> for BankAccountInput {
    fn from(account: &BankAccount) -> Self {
        Self {
            id: Some(account.id.clone()),
            account_name: account.account_name.clone(),
            bank_name: account.bank_name.clone(),
            account_holder_name: account.account_holder_name.clone(),
            account_number: account.account_number.clone(),
            last_balance: account.last_balance,
            last_balance_date: account.last_balance_date,
            status: account.status,
            balances: Vec::new(),
        }
    }
}

/// Input model for creating or updating a balance entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankAccountBalanceInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub bank_account_id: Option<EntityId>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub date: DateTime<Utc>,
    pub balance: Decimal,
}

impl BankAccountBalanceInput {
    /// Validates a standalone balance entry, which must name its account.
    pub fn validate(&self) -> Result<()> {
        if self.bank_account_id.as_ref().map_or(true, EntityId::is_empty) {
            return Err(Error::Validation(ValidationError::MissingField(
                "bankAccountId".to_string(),
            )));
        }
        self.validate_amount()
    }

    fn validate_amount(&self) -> Result<()> {
        if self.balance.is_sign_negative() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Balance cannot be negative".to_string(),
            )));
        }
        Ok(())
    }
}

impl InputModel for BankAccountInput {
    const KIND: EntityKind = EntityKind::BankAccounts;

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn validate(&self) -> Result<()> {
        BankAccountInput::validate(self)
    }
}

impl InputModel for BankAccountBalanceInput {
    const KIND: EntityKind = EntityKind::BankAccountBalances;

    fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    fn validate(&self) -> Result<()> {
        BankAccountBalanceInput::validate(self)
    }
}
