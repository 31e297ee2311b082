use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::category::Category;

/// Form body posted to `/submit`.
#[derive(Debug, Deserialize, Clone, Default, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct VoucherForm {
    #[schema(example = "Surfboard")]
    pub filter: String,
    #[schema(example = "2025-03-14")]
    pub date: String,
    /// Previously issued by `/get-voucher-no`; allocated on submit when blank.
    #[schema(example = "SU-2025-008")]
    pub voucher_no: String,
    #[schema(example = "Acme Stationers")]
    pub pay_to: String,
    #[schema(example = "Office Supplies")]
    pub account_head: String,
    pub paid_by: Option<String>,
    /// "Towards" narration.
    #[schema(example = "Printer cartridges")]
    pub account: String,
    #[schema(example = "1250")]
    pub amount: String,
    #[schema(example = "One thousand two hundred fifty only")]
    pub amount_rs: String,
    pub prepared_by: Option<String>,
    pub checked_by: String,
    pub approved_by: String,
    /// `data:image/png;base64,...`
    pub receiver_signature: Option<String>,
}

/// A voucher ready to be rendered and recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Voucher {
    pub category: Category,
    pub voucher_no: String,
    pub date: String,
    pub pay_to: String,
    pub account_head: String,
    pub paid_by: Option<String>,
    pub towards: String,
    pub amount: String,
    pub amount_in_words: String,
    pub prepared_by: Option<String>,
    pub checked_by: String,
    pub approved_by: String,
    pub receiver_signature: Option<String>,
}

impl Voucher {
    pub fn from_form(category: Category, voucher_no: String, form: VoucherForm) -> Self {
        Self {
            category,
            voucher_no,
            date: form.date,
            pay_to: form.pay_to,
            account_head: form.account_head,
            paid_by: non_empty(form.paid_by),
            towards: form.account,
            amount: form.amount,
            amount_in_words: form.amount_rs,
            prepared_by: non_empty(form.prepared_by),
            checked_by: form.checked_by,
            approved_by: form.approved_by,
            receiver_signature: non_empty(form.receiver_signature),
        }
    }

    pub fn is_signed(&self) -> bool {
        self.receiver_signature.is_some()
    }

    /// Name of the transient PDF, `<Category>_<VoucherNo>.pdf`.
    pub fn document_filename(&self) -> String {
        sanitize_filename::sanitize(format!(
            "{}_{}.pdf",
            self.category.name(),
            self.voucher_no
        ))
    }
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FilterQuery {
    /// Category name, e.g. `Surfboard`.
    pub filter: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PingResponse {
    #[schema(example = "Server is active")]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoucherNoResponse {
    #[schema(example = "SU-2025-008")]
    pub voucher_no: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsResponse {
    pub pay_to_suggestions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    #[schema(example = "Data submitted successfully and PDF uploaded!")]
    pub message: String,
    #[serde(rename = "sheetURL")]
    pub sheet_url: String,
    pub pdf_file_id: String,
}
