//! Display surfaces where a deferral period may be shown

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Surface {
    OrderConfirmation,
    Emails,
    MyAccount,
    Subscriptions,
    PdfInvoice,
}

impl Surface {
    pub const ALL: [Surface; 5] = [
        Surface::OrderConfirmation,
        Surface::Emails,
        Surface::MyAccount,
        Surface::Subscriptions,
        Surface::PdfInvoice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::OrderConfirmation => "order-confirmation",
            Surface::Emails => "emails",
            Surface::MyAccount => "my-account",
            Surface::Subscriptions => "subscriptions",
            Surface::PdfInvoice => "pdf-invoice",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "order-confirmation" => Some(Surface::OrderConfirmation),
            "emails" => Some(Surface::Emails),
            "my-account" => Some(Surface::MyAccount),
            "subscriptions" => Some(Surface::Subscriptions),
            "pdf-invoice" => Some(Surface::PdfInvoice),
            _ => None,
        }
    }
}
