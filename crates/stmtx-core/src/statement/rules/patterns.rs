//! Regex patterns for Polish bank statement lines.
//!
//! Every pattern is anchored at the start of the line. Transaction patterns
//! are also anchored at the end so a row is never matched inside free text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Transaction rows: date, id, description, signed amount, balance
    pub static ref CARD_TRANSACTION: Regex = Regex::new(
        r"^(\d{2}\.\d{2}\.\d{4})\s+([A-Z0-9]+)\s+(ZAKUP PRZY UŻYCIU KARTY|PŁATNOŚĆ WEB|ZWROT BLIK)\s+(-?\d{1,3}(?:\s?\d{3})*,\d{2})\s+(\d{1,3}(?:\s?\d{3})*,\d{2})$"
    ).unwrap();

    pub static ref TRANSFER_TRANSACTION: Regex = Regex::new(
        r"^(\d{2}\.\d{2}\.\d{4})\s+([A-Z0-9]+)\s+(PRZELEW WYCHODZĄCY|PRZELEW PRZYCHODZĄCY)\s+(-?\d{1,3}(?:\s?\d{3})*,\d{2})\s+(\d{1,3}(?:\s?\d{3})*,\d{2})$"
    ).unwrap();

    pub static ref CURRENCY_EXCHANGE: Regex = Regex::new(
        r"^(\d{2}\.\d{2}\.\d{4})\s+([A-Z0-9]+)\s+(WYMIANA W KANTORZE - UZNANIE|WYMIANA W KANTORZE - OBCIĄŻENIE)\s+(-?\d{1,3}(?:\s?\d{3})*,\d{2})\s+(\d{1,3}(?:\s?\d{3})*,\d{2})$"
    ).unwrap();

    pub static ref MAIN_TRANSACTION: Regex = Regex::new(
        r"^(\d{2}\.\d{2}\.\d{4})\s+([A-Z0-9]+)\s+(.+?)\s+(-?\d{1,3}(?:\s?\d{3})*,\d{2})\s+(\d{1,3}(?:\s?\d{3})*,\d{2})$"
    ).unwrap();

    // Opening balance
    pub static ref BALANCE_TRANSFER: Regex = Regex::new(
        r"^Saldo z przeniesienia\s+(\d{1,3}(?:\s?\d{3})*,\d{2})$"
    ).unwrap();

    // Detail lines following a transaction row
    pub static ref CARD_DETAILS: Regex = Regex::new(
        r"^(\d{2}\.\d{2}\.\d{4})\s+Karta:(\d{6}\*{4}\d{4})\s+Lokalizacja:\s*(.+?)\s+Nr ref:"
    ).unwrap();

    pub static ref WEB_PAYMENT_DETAILS: Regex = Regex::new(
        r"^(\d{2}\.\d{2}\.\d{4})\s+Tel:(\d+)\s+Godz\.(\d{2}:\d{2}:\d{2})\s+Lokalizacja:\s*(.+?)\s+Nr ref:"
    ).unwrap();

    pub static ref ORIGINAL_AMOUNT: Regex = Regex::new(
        r"^Kwota oryg\.:\s+(\d{1,3}(?:\s?\d{3})*,\d{2})\s+PLN"
    ).unwrap();

    pub static ref CURRENCY_DETAILS: Regex = Regex::new(
        r"^(\d{2}\.\d{2}\.\d{4})\s+([A-Z0-9]+)\s+([A-Z]{3}/[A-Z]{3})\s+(\d+\.\d+)\s+(-?\d{1,3}(?:\s?\d{3})*,\d{2})\s+PLN\s+(-?\d{1,3}(?:\s?\d{3})*,\d{2})\s+([A-Z]{3})"
    ).unwrap();

    pub static ref TRANSFER_DETAILS: Regex = Regex::new(
        r"^(\d{10,})\s+(.+?)\s+Ref\. wł\. zlec\.:\s+(\d+)"
    ).unwrap();
}
