//! Settle-up: turning a counterparty balance into a payment expense.
//!
//! A payment is a pure transfer, not a cost split: exactly two shares,
//! `+total` on the payer and `-total` on the receiver. Once folded by the
//! aggregator it drives the pairwise balance toward zero.
//!
//! Registering the payment and moving real money are decoupled, trust-based
//! steps: the optional Swish deep link only helps with the second one and
//! never gates the first.

use crate::{
    Currency, EngineError, Money,
    expenses::NewExpense,
    shares::NewShare,
    users::User,
};

/// A settle-up proposal, pre-filled from a balance entry and editable
/// before submission (partial settlement is allowed).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettleUp {
    pub payer_id: i32,
    pub receiver_id: i32,
    pub total: Money,
    pub currency: Currency,
}

impl SettleUp {
    /// Suggests a settlement for the caller against one counterparty
    /// position: whoever is in deficit pays, and the suggested amount is the
    /// outstanding balance.
    #[must_use]
    pub fn from_balance(balance: &crate::balance::FlatBalance, me: i32) -> Self {
        let (payer_id, receiver_id) = if balance.balance.is_negative() {
            // The counterparty owes the group; they pay me.
            (balance.user_id, me)
        } else {
            (me, balance.user_id)
        };
        Self {
            payer_id,
            receiver_id,
            total: balance.balance.abs(),
            currency: balance.currency,
        }
    }

    /// Builds the payment expense for this settlement.
    ///
    /// Looks the payer and receiver up in `users` to render the display
    /// name; a missing user is a caller bug and fails immediately.
    pub fn into_expense(self, users: &[User]) -> Result<NewExpense, EngineError> {
        if !self.total.is_positive() {
            return Err(EngineError::InvalidAmount(
                "settlement amount must be positive".to_string(),
            ));
        }
        if self.payer_id == self.receiver_id {
            return Err(EngineError::InvalidShares(
                "payer and receiver must differ".to_string(),
            ));
        }
        let payer = find_user(users, self.payer_id)?;
        let receiver = find_user(users, self.receiver_id)?;

        Ok(NewExpense {
            name: format!(
                "{} payed {} to {}",
                payer.name,
                self.total.display(self.currency),
                receiver.name
            ),
            created_at: None,
            paid_by: payer.id,
            total: self.total,
            currency: self.currency,
            category_id: None,
            is_payment: true,
            shares: vec![
                NewShare {
                    user_id: receiver.id,
                    share: -self.total,
                },
                NewShare {
                    user_id: payer.id,
                    share: self.total,
                },
            ],
        })
    }
}

fn find_user(users: &[User], id: i32) -> Result<&User, EngineError> {
    users
        .iter()
        .find(|user| user.id == id)
        .ok_or_else(|| EngineError::KeyNotFound(format!("user {id}")))
}

/// Builds a Swish deep link for paying `receiver` out-of-band.
///
/// Swish only moves SEK and needs the receiver's registered phone number;
/// either missing makes this fail, but the payment expense is recorded
/// independently of it.
pub fn swish_uri(
    receiver: &User,
    total: Money,
    currency: Currency,
    message: &str,
) -> Result<String, EngineError> {
    if currency != Currency::Sek {
        return Err(EngineError::CurrencyMismatch(format!(
            "Swish only supports SEK, got {currency}"
        )));
    }
    if !total.is_positive() {
        return Err(EngineError::InvalidAmount(
            "settlement amount must be positive".to_string(),
        ));
    }
    let phone = receiver
        .phone_number
        .as_deref()
        .filter(|phone| !phone.trim().is_empty())
        .ok_or_else(|| EngineError::MissingPhoneNumber(receiver.name.clone()))?;

    Ok(format!(
        "https://app.swish.nu/1/p/sw/?sw={}&amt={}&cur={}&msg={}&src=qr",
        percent_encode(phone.trim()),
        total.major_string(currency),
        currency.code(),
        percent_encode(message),
    ))
}

/// Minimal RFC 3986 percent-encoding for query values.
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char);
            }
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}
