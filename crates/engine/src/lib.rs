//! Ledger and settlement engine for shared group expenses.
//!
//! Members of a group record expenses (one member pays for everyone) and
//! payments (one member hands money to another). The engine turns each
//! expense into per-member debts, keeps those debts in sync when the expense
//! is edited, and nets debts and payments into pairwise balances.
//!
//! Every operation runs inside one scoped store transaction.

pub use commands::{CreateExpenseCmd, CreatePaymentCmd, EditExpenseCmd, EditPaymentCmd};
pub use debts::Debt;
pub use error::EngineError;
pub use expenses::Expense;
pub use groups::Group;
pub use memberships::Member;
pub use money::MoneyCents;
pub use ops::{Balance, Engine, EngineBuilder};
pub use payments::Payment;
pub use split::{DebtShare, split_evenly};
pub use transactions::{Transaction, TransactionDetail, TransactionKind};
pub use users::User;

mod commands;
mod debts;
mod error;
mod expenses;
mod groups;
mod memberships;
mod money;
mod ops;
mod payments;
mod split;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
