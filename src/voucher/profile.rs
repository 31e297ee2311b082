//! Per-category field layout.
//!
//! A profile is the ordered list of voucher fields a deployment records. It
//! drives the spreadsheet header, the appended row and the optional lines of
//! the receipt, so the three deployments share one orchestration path.

use super::models::Voucher;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoucherField {
    VoucherNo,
    Date,
    Filter,
    PayTo,
    AccountHead,
    PaidBy,
    Towards,
    Amount,
    AmountInWords,
    PreparedBy,
    CheckedBy,
    ApprovedBy,
    ReceiverSignature,
    PdfLink,
}

impl VoucherField {
    pub fn header(&self) -> &'static str {
        match self {
            Self::VoucherNo => "Voucher No.",
            Self::Date => "Date",
            Self::Filter => "Filter",
            Self::PayTo => "Pay to",
            Self::AccountHead => "Account Head",
            Self::PaidBy => "Paid by",
            Self::Towards => "Towards",
            Self::Amount => "The Sum",
            Self::AmountInWords => "Amount Rs.",
            Self::PreparedBy => "Prepared By",
            Self::CheckedBy => "Checked By",
            Self::ApprovedBy => "Approved By",
            Self::ReceiverSignature => "Receiver Signature",
            Self::PdfLink => "PDF Link",
        }
    }

    fn cell(&self, voucher: &Voucher, pdf_link: &str) -> String {
        match self {
            Self::VoucherNo => voucher.voucher_no.clone(),
            Self::Date => voucher.date.clone(),
            Self::Filter => voucher.category.name().to_string(),
            Self::PayTo => voucher.pay_to.clone(),
            Self::AccountHead => voucher.account_head.clone(),
            Self::PaidBy => voucher.paid_by.clone().unwrap_or_default(),
            Self::Towards => voucher.towards.clone(),
            Self::Amount => voucher.amount.clone(),
            Self::AmountInWords => voucher.amount_in_words.clone(),
            Self::PreparedBy => voucher.prepared_by.clone().unwrap_or_default(),
            Self::CheckedBy => voucher.checked_by.clone(),
            Self::ApprovedBy => voucher.approved_by.clone(),
            // Only a marker is recorded, never the image payload.
            Self::ReceiverSignature => {
                if voucher.is_signed() {
                    "Signed".to_string()
                } else {
                    String::new()
                }
            }
            Self::PdfLink => pdf_link.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherProfile {
    fields: Vec<VoucherField>,
}

impl Default for VoucherProfile {
    fn default() -> Self {
        Self::standard()
    }
}

impl VoucherProfile {
    /// The twelve-column layout without optional fields.
    pub fn standard() -> Self {
        Self::with_optional(false, false)
    }

    pub fn with_optional(paid_by: bool, prepared_by: bool) -> Self {
        use VoucherField::*;

        let mut fields = vec![VoucherNo, Date, Filter, PayTo, AccountHead];
        if paid_by {
            fields.push(PaidBy);
        }
        fields.extend([Towards, Amount, AmountInWords]);
        if prepared_by {
            fields.push(PreparedBy);
        }
        fields.extend([CheckedBy, ApprovedBy, ReceiverSignature, PdfLink]);

        Self { fields }
    }

    /// Parse a comma-separated list of optional fields (`paidBy`, `preparedBy`).
    pub fn from_optional_list(list: &str) -> Result<Self, String> {
        let mut paid_by = false;
        let mut prepared_by = false;

        for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match item {
                "paidBy" => paid_by = true,
                "preparedBy" => prepared_by = true,
                other => return Err(format!("unknown optional field '{}'", other)),
            }
        }

        Ok(Self::with_optional(paid_by, prepared_by))
    }

    pub fn fields(&self) -> &[VoucherField] {
        &self.fields
    }

    pub fn includes(&self, field: VoucherField) -> bool {
        self.fields.contains(&field)
    }

    pub fn header_row(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.header().to_string()).collect()
    }

    pub fn row_for(&self, voucher: &Voucher, pdf_link: &str) -> Vec<String> {
        self.fields
            .iter()
            .map(|f| f.cell(voucher, pdf_link))
            .collect()
    }

    /// Column letter holding `field`, if the profile records it.
    pub fn column_of(&self, field: VoucherField) -> Option<String> {
        self.fields
            .iter()
            .position(|f| *f == field)
            .map(column_letter)
    }

    pub fn last_column(&self) -> String {
        column_letter(self.fields.len().saturating_sub(1))
    }

    /// Number of signature slots on the receipt.
    pub fn signer_count(&self) -> usize {
        if self.includes(VoucherField::PreparedBy) {
            4
        } else {
            3
        }
    }
}

/// Zero-based column index to A1 notation (`0` → `A`, `26` → `AA`).
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}
