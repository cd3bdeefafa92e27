//! Split calculator.
//!
//! Turns an expense (amount + payer + current members) into the debts the
//! other members owe the payer. The amount is divided evenly across *all*
//! members, payer included; the payer's own share is never materialized.
//!
//! Division happens on integer cents. When the amount does not divide evenly,
//! the leftover cents (always fewer than the member count) are handed out one
//! by one to the non-payers in membership order, so the debts always sum to
//! exactly `amount - floor(amount / n)`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

/// One obligation produced by a split, before it is persisted as a debt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DebtShare {
    pub owed_by: Uuid,
    pub owed_to: Uuid,
    pub amount: MoneyCents,
}

/// Splits `amount` evenly across `members` (payer included).
///
/// `members` is treated as a set in membership order: duplicates are ignored
/// and the first occurrence decides the position.
pub fn split_evenly(
    amount: MoneyCents,
    payer: Uuid,
    members: &[Uuid],
) -> ResultEngine<Vec<DebtShare>> {
    if amount.is_negative() {
        return Err(EngineError::InvalidAmount(
            "amount must be >= 0".to_string(),
        ));
    }

    let mut ordered: Vec<Uuid> = Vec::with_capacity(members.len());
    for member in members {
        if !ordered.contains(member) {
            ordered.push(*member);
        }
    }

    if ordered.is_empty() {
        return Err(EngineError::InvalidInput(
            "cannot split across an empty member set".to_string(),
        ));
    }
    if !ordered.contains(&payer) {
        return Err(EngineError::InvalidPayer(
            "payer is not a group member".to_string(),
        ));
    }

    let (base, mut leftover) = amount.divide(ordered.len()).ok_or_else(|| {
        EngineError::InvalidInput("cannot split across an empty member set".to_string())
    })?;

    let mut shares = Vec::with_capacity(ordered.len() - 1);
    for member in ordered.into_iter().filter(|m| *m != payer) {
        let mut share = base;
        if leftover > 0 {
            share += MoneyCents::new(1);
            leftover -= 1;
        }
        shares.push(DebtShare {
            owed_by: member,
            owed_to: payer,
            amount: share,
        });
    }

    Ok(shares)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn three_way_split_owes_payer_a_third_each() {
        let members = ids(3);
        let (a, b, c) = (members[0], members[1], members[2]);

        let shares = split_evenly(MoneyCents::new(30_00), a, &members).unwrap();

        assert_eq!(
            shares,
            vec![
                DebtShare {
                    owed_by: b,
                    owed_to: a,
                    amount: MoneyCents::new(10_00)
                },
                DebtShare {
                    owed_by: c,
                    owed_to: a,
                    amount: MoneyCents::new(10_00)
                },
            ]
        );
    }

    #[test]
    fn leftover_cents_go_to_debtors_in_membership_order() {
        let members = ids(3);
        let shares = split_evenly(MoneyCents::new(100), members[1], &members).unwrap();

        let amounts: Vec<i64> = shares.iter().map(|s| s.amount.cents()).collect();
        assert_eq!(amounts, vec![34, 33]);
        assert_eq!(shares[0].owed_by, members[0]);
        assert_eq!(shares[1].owed_by, members[2]);
    }

    #[test]
    fn debts_sum_to_amount_minus_payer_share() {
        for n in 1..=7usize {
            for cents in [0i64, 1, 2, 99, 100, 101, 1_000, 12_345, 99_999] {
                let members = ids(n);
                let payer = members[n / 2];
                let shares = split_evenly(MoneyCents::new(cents), payer, &members).unwrap();

                assert_eq!(shares.len(), n - 1);
                let total: MoneyCents = shares.iter().map(|s| s.amount).sum();
                let payer_share = cents / n as i64;
                assert_eq!(total.cents(), cents - payer_share, "n={n} cents={cents}");

                for share in &shares {
                    assert_ne!(share.owed_by, share.owed_to);
                    assert_eq!(share.owed_to, payer);
                    let diff = share.amount.cents() - payer_share;
                    assert!(diff == 0 || diff == 1);
                }
            }
        }
    }

    #[test]
    fn single_member_group_produces_no_debts() {
        let members = ids(1);
        let shares = split_evenly(MoneyCents::new(42_00), members[0], &members).unwrap();
        assert!(shares.is_empty());
    }

    #[test]
    fn duplicate_members_count_once() {
        let members = ids(2);
        let with_dupes = vec![members[0], members[1], members[1], members[0]];
        let shares = split_evenly(MoneyCents::new(10_00), members[0], &with_dupes).unwrap();
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].amount, MoneyCents::new(5_00));
    }

    #[test]
    fn rejects_payer_outside_members() {
        let members = ids(2);
        let err = split_evenly(MoneyCents::new(10_00), Uuid::new_v4(), &members).unwrap_err();
        assert!(matches!(err, EngineError::InvalidPayer(_)));
    }

    #[test]
    fn rejects_empty_members_and_negative_amounts() {
        let payer = Uuid::new_v4();
        let err = split_evenly(MoneyCents::new(10_00), payer, &[]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));

        let err = split_evenly(MoneyCents::new(-1), payer, &[payer]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
    }
}
