//! Command structs for ledger writes.
//!
//! These types group parameters for expense and payment operations, keeping
//! call sites readable and avoiding long argument lists. Edit commands carry
//! optional fields: an unset field keeps its stored value.

use uuid::Uuid;

use crate::MoneyCents;

/// Record a new expense paid on behalf of the group.
#[derive(Clone, Debug)]
pub struct CreateExpenseCmd {
    pub group_id: Uuid,
    pub caller: Uuid,
    pub description: String,
    pub amount: MoneyCents,
    /// Defaults to the caller.
    pub paid_by: Option<Uuid>,
}

impl CreateExpenseCmd {
    #[must_use]
    pub fn new(
        group_id: Uuid,
        caller: Uuid,
        description: impl Into<String>,
        amount: MoneyCents,
    ) -> Self {
        Self {
            group_id,
            caller,
            description: description.into(),
            amount,
            paid_by: None,
        }
    }

    #[must_use]
    pub fn paid_by(mut self, user_id: Uuid) -> Self {
        self.paid_by = Some(user_id);
        self
    }

    pub(crate) fn payer(&self) -> Uuid {
        self.paid_by.unwrap_or(self.caller)
    }
}

/// Edit an existing expense. Its debts are always recomputed.
#[derive(Clone, Debug)]
pub struct EditExpenseCmd {
    pub group_id: Uuid,
    pub transaction_id: Uuid,
    pub caller: Uuid,
    pub description: Option<String>,
    pub amount: Option<MoneyCents>,
    pub paid_by: Option<Uuid>,
}

impl EditExpenseCmd {
    #[must_use]
    pub fn new(group_id: Uuid, transaction_id: Uuid, caller: Uuid) -> Self {
        Self {
            group_id,
            transaction_id,
            caller,
            description: None,
            amount: None,
            paid_by: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: MoneyCents) -> Self {
        self.amount = Some(amount);
        self
    }

    #[must_use]
    pub fn paid_by(mut self, user_id: Uuid) -> Self {
        self.paid_by = Some(user_id);
        self
    }
}

/// Record money handed from one member to another.
#[derive(Clone, Debug)]
pub struct CreatePaymentCmd {
    pub group_id: Uuid,
    pub caller: Uuid,
    /// Defaults to the caller.
    pub paid_by: Option<Uuid>,
    pub paid_to: Uuid,
    pub amount: MoneyCents,
}

impl CreatePaymentCmd {
    #[must_use]
    pub fn new(group_id: Uuid, caller: Uuid, paid_to: Uuid, amount: MoneyCents) -> Self {
        Self {
            group_id,
            caller,
            paid_by: None,
            paid_to,
            amount,
        }
    }

    #[must_use]
    pub fn paid_by(mut self, user_id: Uuid) -> Self {
        self.paid_by = Some(user_id);
        self
    }

    pub(crate) fn payer(&self) -> Uuid {
        self.paid_by.unwrap_or(self.caller)
    }
}

/// Edit an existing payment.
#[derive(Clone, Debug)]
pub struct EditPaymentCmd {
    pub group_id: Uuid,
    pub transaction_id: Uuid,
    pub caller: Uuid,
    pub paid_by: Option<Uuid>,
    pub paid_to: Option<Uuid>,
    pub amount: Option<MoneyCents>,
}

impl EditPaymentCmd {
    #[must_use]
    pub fn new(group_id: Uuid, transaction_id: Uuid, caller: Uuid) -> Self {
        Self {
            group_id,
            transaction_id,
            caller,
            paid_by: None,
            paid_to: None,
            amount: None,
        }
    }

    #[must_use]
    pub fn paid_by(mut self, user_id: Uuid) -> Self {
        self.paid_by = Some(user_id);
        self
    }

    #[must_use]
    pub fn paid_to(mut self, user_id: Uuid) -> Self {
        self.paid_to = Some(user_id);
        self
    }

    #[must_use]
    pub fn amount(mut self, amount: MoneyCents) -> Self {
        self.amount = Some(amount);
        self
    }
}
