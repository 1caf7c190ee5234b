//! Bank accounts module - account and balance history models.

mod bank_accounts_model;


pub use bank_accounts_model::{
    BankAccount, BankAccountBalance, BankAccountBalanceInput, BankAccountInput, BankAccountStatus,
};
