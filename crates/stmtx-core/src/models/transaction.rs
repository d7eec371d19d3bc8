//! Transaction records extracted from bank statement pages.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transaction id given to opening-balance carryover records.
pub const CARRYOVER_TRANSACTION_ID: &str = "BALANCE_TRANSFER";

/// Description given to opening-balance carryover records.
pub const CARRYOVER_DESCRIPTION: &str = "Balance transfer from previous period";

/// A single transaction found on a statement page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Booking date. Absent for carryover records.
    pub date: Option<NaiveDate>,

    /// Bank transaction identifier.
    pub transaction_id: String,

    /// Category derived from the description.
    pub category: TransactionCategory,

    /// Description exactly as matched on the line.
    pub description: String,

    /// Signed amount. Zero for carryover records.
    pub amount: Decimal,

    /// Account balance after this transaction.
    pub balance: Decimal,

    /// Supplementary fields found on the following lines.
    #[serde(flatten)]
    pub details: TransactionDetails,

    /// File name of the statement this record came from.
    pub source_file: String,

    /// Page number (1-indexed).
    pub page: u32,

    /// The trimmed line that produced this record.
    pub raw_line: String,

    /// Which pattern rule produced this record.
    pub pattern_used: RuleId,
}

impl Transaction {
    /// Whether this is a synthetic opening-balance record.
    pub fn is_carryover(&self) -> bool {
        self.pattern_used == RuleId::BalanceTransfer
    }
}

/// Identifier of a line-level pattern rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleId {
    /// Card purchase, web payment or BLIK refund.
    CardTransaction,
    /// Outgoing or incoming transfer.
    TransferTransaction,
    /// Currency exchange debit or credit.
    CurrencyExchange,
    /// Any other five-field transaction line.
    MainTransaction,
    /// Opening balance brought forward.
    BalanceTransfer,
}

impl RuleId {
    /// Stable name used in output files.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::CardTransaction => "card_transaction",
            RuleId::TransferTransaction => "transfer_transaction",
            RuleId::CurrencyExchange => "currency_exchange",
            RuleId::MainTransaction => "main_transaction",
            RuleId::BalanceTransfer => "balance_transfer",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction category labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransactionCategory {
    /// Purchase with a payment card (zakup przy użyciu karty).
    #[serde(rename = "Card Purchase")]
    CardPurchase,
    /// Online payment (płatność web).
    #[serde(rename = "Web Payment")]
    WebPayment,
    /// BLIK refund (zwrot BLIK).
    #[serde(rename = "BLIK Refund")]
    BlikRefund,
    /// Outgoing transfer (przelew wychodzący).
    #[serde(rename = "Outgoing Transfer")]
    OutgoingTransfer,
    /// Incoming transfer (przelew przychodzący).
    #[serde(rename = "Incoming Transfer")]
    IncomingTransfer,
    /// Currency exchange (wymiana w kantorze).
    #[serde(rename = "Currency Exchange")]
    CurrencyExchange,
    /// Opening balance carried over from the previous period.
    #[serde(rename = "Saldo z przeniesienia")]
    BalanceCarryover,
    /// Anything else.
    #[default]
    #[serde(rename = "Other")]
    Other,
}

impl TransactionCategory {
    /// Human-readable label, as written to output files.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionCategory::CardPurchase => "Card Purchase",
            TransactionCategory::WebPayment => "Web Payment",
            TransactionCategory::BlikRefund => "BLIK Refund",
            TransactionCategory::OutgoingTransfer => "Outgoing Transfer",
            TransactionCategory::IncomingTransfer => "Incoming Transfer",
            TransactionCategory::CurrencyExchange => "Currency Exchange",
            TransactionCategory::BalanceCarryover => "Saldo z przeniesienia",
            TransactionCategory::Other => "Other",
        }
    }
}

impl fmt::Display for TransactionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Supplementary fields picked up from lines following a transaction.
///
/// Each detail pattern fills its own subset of fields. Merging never
/// overwrites a field that is already set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionDetails {
    /// Masked card number (e.g. `123456****7890`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,

    /// Merchant location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Phone number used for a web payment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Time of day of a web payment (`HH:MM:SS`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    /// Amount before conversion, in PLN.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_amount: Option<Decimal>,

    /// Currency pair of an exchange (e.g. `EUR/PLN`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_pair: Option<String>,

    /// Exchange rate applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<Decimal>,

    /// PLN side of an exchange.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pln_amount: Option<Decimal>,

    /// Foreign side of an exchange.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_amount: Option<Decimal>,

    /// Foreign currency code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreign_currency: Option<String>,

    /// Counterparty account number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,

    /// Transfer recipient.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,

    /// Internal order reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

macro_rules! detail_fields {
    ($($field:ident),* $(,)?) => {
        impl TransactionDetails {
            /// Names of all detail fields, in output column order.
            pub const FIELD_NAMES: &'static [&'static str] = &[$(stringify!($field)),*];

            /// Move every field of `other` that is still empty here.
            ///
            /// Details are merged nearest line first, so the nearest line
            /// wins a shared key such as `location`.
            ///
            /// Returns the names of fields `other` tried to set that were
            /// already populated; those values are dropped.
            pub fn merge(&mut self, other: TransactionDetails) -> Vec<&'static str> {
                let mut conflicts = Vec::new();
                $(
                    if let Some(value) = other.$field {
                        if self.$field.is_some() {
                            conflicts.push(stringify!($field));
                        } else {
                            self.$field = Some(value);
                        }
                    }
                )*
                conflicts
            }

            /// Field value rendered as text, looked up by name.
            pub fn get(&self, name: &str) -> Option<String> {
                match name {
                    $(stringify!($field) => self.$field.as_ref().map(|v| v.to_string()),)*
                    _ => None,
                }
            }

            /// Names of the fields that are set.
            pub fn present(&self) -> Vec<&'static str> {
                let mut names = Vec::new();
                $(
                    if self.$field.is_some() {
                        names.push(stringify!($field));
                    }
                )*
                names
            }
        }
    };
}

detail_fields!(
    card_number,
    location,
    phone,
    time,
    original_amount,
    currency_pair,
    exchange_rate,
    pln_amount,
    foreign_amount,
    foreign_currency,
    account_number,
    recipient,
    reference,
);

impl TransactionDetails {
    /// Check if no detail field is set.
    pub fn is_empty(&self) -> bool {
        self.present().is_empty()
    }
}
