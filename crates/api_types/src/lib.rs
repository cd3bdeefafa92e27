//! Request and response bodies of the HTTP API.
//!
//! Amounts are sent as decimal strings (`"12.34"`, `,` also accepted) and
//! returned both as integer cents (`amount_minor`) and formatted (`amount`).
//! Users are referenced by username wherever a person types them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generic error body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PasswordChange {
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub username: String,
    }
}

pub mod group {
    use super::*;

    /// Request body for creating or renaming a group.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupName {
        pub name: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupView {
        pub id: Uuid,
        pub name: String,
        pub owner_id: Uuid,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct GroupsResponse {
        pub groups: Vec<GroupView>,
    }
}

pub mod membership {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberAdd {
        pub username: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MemberView {
        pub user_id: Uuid,
        pub username: String,
        pub joined_at: DateTime<Utc>,
    }

    /// Members in membership order.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MembersResponse {
        pub members: Vec<MemberView>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub description: String,
        pub amount: String,
        /// Username of the payer. Defaults to the caller.
        pub paid_by: Option<String>,
    }

    /// Absent fields keep their current value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub description: Option<String>,
        pub amount: Option<String>,
        pub paid_by: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentNew {
        /// Username of the payer. Defaults to the caller.
        pub paid_by: Option<String>,
        pub paid_to: String,
        pub amount: String,
    }

    /// Absent fields keep their current value.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PaymentUpdate {
        pub paid_by: Option<String>,
        pub paid_to: Option<String>,
        pub amount: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DebtView {
        pub owed_by: Uuid,
        pub owed_to: Uuid,
        pub amount_minor: i64,
        pub amount: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(tag = "kind", rename_all = "snake_case")]
    pub enum TransactionDetailView {
        Expense {
            description: String,
            paid_by: Uuid,
            amount_minor: i64,
            amount: String,
            debts: Vec<DebtView>,
        },
        Payment {
            paid_by: Uuid,
            paid_to: Uuid,
            amount_minor: i64,
            amount: String,
        },
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub group_id: Uuid,
        pub created_by: Option<Uuid>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        #[serde(flatten)]
        pub detail: TransactionDetailView,
    }

    /// Newest first.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }
}

pub mod balance {
    use super::*;

    /// Positive `amount_minor` means the caller owes `other_user_id`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceView {
        pub other_user_id: Uuid,
        pub amount_minor: i64,
        pub amount: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalancesResponse {
        pub balances: Vec<BalanceView>,
    }
}
